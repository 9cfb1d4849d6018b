pub mod commands;
pub mod context;
pub mod interaction;
pub mod output;
pub mod registry;
pub mod runner;
mod shell;
pub mod submission;

pub use shell::{run_cli, SCRIPT_ENV};
