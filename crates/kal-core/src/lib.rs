//! # kal-core
//!
//! Error definitions and settings shared across all crates in the kalender-rs
//! workspace.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure_date!` macro.
pub mod errors;

/// Runtime configuration (holiday masks, display and timing knobs).
pub mod settings;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use settings::Settings;
