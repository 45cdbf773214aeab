#![forbid(unsafe_code)]

//! Library half of the `sheen` command-line highlighter.

pub mod cli;
pub mod run;

pub use cli::{Command, Opts};
pub use run::{CliError, run};
