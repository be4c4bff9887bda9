//! Interview CLI library.
//!
//! Command-line interface and interactive REPL for guided interviews.

pub mod cli;
pub mod commands;
pub mod output;
pub mod repl;
