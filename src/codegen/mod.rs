//! Code synthesis for the lexer generator.
//!
//! This module walks the dispatch groups and per-label arm plans and
//! renders a complete Rust scanner source file implementing the runtime
//! contract: macro constants, anchored pattern statics, the scanner
//! struct, the token loop with its error arms, and the option-gated
//! driver/trace/stub sections. Pattern text, macro references, and action
//! code are never evaluated here; they pass through verbatim.

pub mod codegen;

#[cfg(test)]
mod tests;
