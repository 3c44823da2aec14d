//! Plain-text and markdown table rendering for report output.

use std::fmt::Write;

/// Render an aligned plain-text table with a dashed rule under the header.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::table::text_table;
///
/// let out = text_table(&["Type", "Count"], &[vec!["Bug".into(), "3".into()]]);
/// assert!(out.starts_with("Type  Count\n"));
/// assert!(out.contains("Bug   3"));
/// ```
pub fn text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = column_widths(headers, rows);
    let mut out = String::new();

    push_line(&mut out, headers.iter().copied(), &widths, "  ");
    let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths, "  ");
    }
    out
}

/// Render a GitHub-flavored markdown table.
///
/// Pipe characters inside cells are escaped.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::table::markdown_table;
///
/// let out = markdown_table(&["Label", "Issues"], &[vec!["status/triage".into(), "4".into()]]);
/// assert_eq!(out, "| Label | Issues |\n|---|---|\n| status/triage | 4 |\n");
/// ```
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}", "---|".repeat(headers.len()));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn push_line<'a>(
    out: &mut String,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    separator: &str,
) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join(separator).trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_columns_align_on_widest_cell() {
        let rows = vec![
            vec!["Dependency".to_string(), "12".to_string()],
            vec!["Bug".to_string(), "3".to_string()],
        ];
        let out = text_table(&["Type", "Count"], &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Type        Count");
        assert_eq!(lines[1], "-".repeat(17));
        assert_eq!(lines[2], "Dependency  12");
        assert_eq!(lines[3], "Bug         3");
    }

    #[test]
    fn width_counts_chars_not_bytes() {
        let rows = vec![vec!["abc…".to_string()]];
        let out = text_table(&["T"], &rows);
        assert_eq!(out.lines().nth(1), Some("----"));
    }

    #[test]
    fn markdown_escapes_pipes() {
        let rows = vec![vec!["a|b".to_string()]];
        let out = markdown_table(&["Title"], &rows);
        assert!(out.contains("| a\\|b |"));
    }
}
