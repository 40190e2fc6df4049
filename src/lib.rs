//! gaimin-tools library crate.
//!
//! Clients for the Gaimin lip-sync and text-to-image APIs, shared by the
//! `lipsync-job` and `text2image` binaries and exposed for integration testing.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod lipsync;
pub mod text2image;

/// Initialize `env_logger` with a `warn` default, overridable by `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}
