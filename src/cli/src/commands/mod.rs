//! Subcommand implementations.

pub mod config;
pub mod health;
pub mod history;
pub mod intent;
pub mod model;
pub mod prompt;
pub mod run;
pub mod workflow;
