#![allow(clippy::module_inception)]

//! A lexer generator in the rex family: an ordered set of lexical rules
//! (patterns, optional guard states or predicates, optional prefix groups,
//! macros) is analyzed into per-state dispatch groups and synthesized into a
//! scanner that tokenizes on the _first_ match, never the longest.
//!
//! The pipeline is: populate a [`Grammar`] through its builder operations,
//! then either render Rust scanner source with [`generate`] or execute the
//! grammar in-process with a [`Scanner`].

pub mod analyzer;
pub mod codegen;
pub mod errors;
pub mod grammar;
pub mod matcher;
pub mod scanner;

extern crate regex;

pub use codegen::codegen::generate;
pub use errors::errors::ScanError;
pub use grammar::grammar::Grammar;
pub use scanner::cursor::StrScanner;
pub use scanner::scanner::{Scanner, Token, Value};
