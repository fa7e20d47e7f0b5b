//! Scanner runtime for generated and in-process lexers.
//!
//! This module implements the runtime contract the synthesizer's output
//! targets. It handles:
//!
//! - The cursor engine over an input buffer (non-consuming prefix test,
//!   consuming match and skip)
//! - Token values and the reserved state-switch result shape
//! - The token loop: state dispatch, first-match arm attempts, line and
//!   column bookkeeping, and the fatal error taxonomy

pub mod cursor;
pub mod scanner;
