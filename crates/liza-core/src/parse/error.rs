// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics for the Liza front end.
//!
//! Lexical and syntactic errors are plain values, never panics: the
//! lexer reports through its error callback and the parser accumulates
//! an ordered list. The type integrates with [`miette`] so callers can
//! render diagnostics with standard error-reporting machinery.

use ecow::EcoString;

use super::Position;

/// A single diagnostic produced while tokenizing or parsing.
///
/// Renders as `<file>:<line>:<column>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("{pos}: {message}")]
#[diagnostic()]
pub struct Diagnostic {
    /// Where the error was detected.
    pub pos: Position,
    /// A human-readable description of the error.
    pub message: EcoString,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(pos: Position, message: impl Into<EcoString>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}
