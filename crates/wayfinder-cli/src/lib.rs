//! Wayfinder CLI library.
//!
//! Argument parsing helpers, subcommand handlers and output rendering for
//! the `wayfinder` binary.

pub mod args;
pub mod commands;
pub mod output;
