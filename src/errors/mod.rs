//! Error types for scanning and generation.
//!
//! This module defines the error taxonomy shared by the scanner runtime
//! and by generated scanner source:
//!
//! - Scan-time failures (unmatched input, unrecognized state)
//! - Structural failures (malformed action results)
//! - Pattern rejection by the target regex engine
//! - I/O errors propagated from `parse_file`

pub mod errors;

#[cfg(test)]
mod tests;
