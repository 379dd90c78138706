//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `transcript-md` command,
//! keeping `cli.rs` focused on argument definitions while the handlers share
//! input loading.

pub mod completions;
pub mod export;
pub mod input;
pub mod turns;
pub mod version;
