//! Text-to-image generation.
//!
//! A single synchronous request: the prompt and an options object go out, the
//! generated image data comes back inline in the JSON response.

mod client;
mod options;

pub use client::{ImageClient, ImageError, DEFAULT_GENERATE_URL};
pub use options::{default_options, resolve_options};
