//! Ambient utilities shared by every decoder.

pub mod utf8;

pub use utf8::{sanitize_input, sanitize_input_with_stats, InputSource, SanitizeStats};
