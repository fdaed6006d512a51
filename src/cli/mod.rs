//! CLI module for the campaign-loader binary

pub mod commands;
pub mod error;
pub mod output;
pub mod progress;
pub mod prompt;

pub use error::CliError;
