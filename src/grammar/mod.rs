//! Grammar model for the lexer generator.
//!
//! This module contains the passive data model a grammar front-end
//! populates before generation:
//!
//! - Macros, rules, and prefix groups, in declaration order
//! - Class/header/footer/inner/start text carried verbatim into output
//! - Generator options
//! - Append-only builder operations mirroring the grammar lexemes

pub mod grammar;
