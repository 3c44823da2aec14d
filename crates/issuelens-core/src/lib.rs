//! Core types, configuration, and error handling for issuelens.
//!
//! This crate provides the shared foundation used by the other issuelens crates:
//! - [`IssueLensError`]: unified error type using `thiserror`
//! - [`IssueLensConfig`]: configuration loaded from `.issuelens.toml`
//! - Shared types: [`Category`], [`IssueState`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{ActivityConfig, DataConfig, ImpactConfig, IssueLensConfig, ResolutionConfig};
pub use error::IssueLensError;
pub use types::{Category, IssueState, OutputFormat};

/// A convenience `Result` type for issuelens operations.
pub type Result<T> = std::result::Result<T, IssueLensError>;
