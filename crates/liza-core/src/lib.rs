// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Liza compiler front end.
//!
//! This crate contains the language front end:
//! - Lexical analysis (tokenization with automatic statement termination)
//! - Parsing (AST construction with error recovery)
//!
//! Later stages (semantic analysis, code generation) consume the AST
//! produced here; nothing in this crate performs name resolution or
//! type checking.

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod parse;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Decl, Expr, File, Stmt, Type};
    pub use crate::parse::{parse, Diagnostic, Parser, Position, Token, TokenType};
}
