//! Activator CLI library.
//!
//! Command-line interface and interactive REPL over the command pipeline.

pub mod cli;
pub mod commands;
pub mod repl;
