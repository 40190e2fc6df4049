//! Command-line interface definitions and helpers.
//!
//! This module contains argument parsing for both tools and the handlers the
//! binaries delegate to.

mod args;
mod commands;

pub use args::{LipsyncArgs, Text2ImageArgs};
pub use commands::{run_lipsync, run_text2image, EXIT_CANCELLED, EXIT_FAILURE, EXIT_SUCCESS};
