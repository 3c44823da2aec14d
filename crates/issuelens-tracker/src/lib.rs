//! Issue-tracker export analysis: classification, activity scoring, and reports.
//!
//! Loads a JSON export of issues with their labels and timeline events, maps
//! each issue onto a fixed category taxonomy, scores how active it was in a
//! period, and builds the most-active-categories, multi-area impact, and
//! resolution-time reports.

pub mod activity;
pub mod classify;
pub mod impact;
pub mod labels;
pub mod model;
pub mod report;
pub mod resolution;
pub mod table;
