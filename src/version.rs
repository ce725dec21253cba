// src/version.rs

/// Crate version, surfaced by the CLI and the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
