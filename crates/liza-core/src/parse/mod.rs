// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for Liza source code.
//!
//! This module contains the tokenizer, the parser, and their shared
//! value types.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source bytes into a stream of [`Token`]s. Each
//! token carries its source [`Position`] and the exact source text it
//! was scanned from. The lexer also implements Liza's automatic
//! statement termination: a line break is surfaced as an explicit
//! `NEWLINE` token only after a token that can legally end a statement.
//!
//! ```
//! use liza_core::parse::{Lexer, Mode, TokenType};
//!
//! let mut lexer = Lexer::new("demo.lz", b"answer := 42", None, Mode::default());
//! let token = lexer.next_token();
//! assert_eq!(token.ty, TokenType::Ident);
//! assert_eq!(token.content, "answer");
//! ```
//!
//! # Parsing
//!
//! The [`Parser`] drives a lexer one token at a time and builds the AST
//! defined in [`crate::ast`]. Parsing never fails outright; it returns a
//! best-effort tree plus an ordered list of [`Diagnostic`]s.
//!
//! ```
//! use liza_core::parse::parse;
//!
//! let (file, diagnostics) = parse("demo.lz", b"package demo\n");
//! assert!(diagnostics.is_empty());
//! assert_eq!(file.package.name.content, "demo");
//! ```

mod error;
mod lexer;
mod parser;
mod position;
mod token;

pub use error::Diagnostic;
pub use lexer::{ErrorHandler, Lexer, Mode};
pub use parser::{parse, Parser};
pub use position::Position;
pub use token::{Token, TokenType};
