// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tokens and token types.
//!
//! [`TokenType`] is the closed set of lexical token types of the Liza
//! programming language. [`Token`] pairs a type with the exact source
//! text it was scanned from and the position of its first character.

use std::fmt;

use ecow::EcoString;

use super::Position;

/// The set of lexical token types of the Liza programming language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Special tokens
    Illegal,
    Eof,
    Comment,
    Newline,

    // Identifiers and basic type literals
    /// An identifier, e.g. `main`.
    Ident,
    /// An integer literal, e.g. `12345`.
    Int,
    /// A floating-point literal, e.g. `123.45`.
    Float,
    /// A string literal, e.g. `"abc"`.
    String,

    // Operators and delimiters
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Rem, // %

    And, // &
    Or,  // |
    Xor, // ^
    Shl, // <<
    Shr, // >>

    AddAssign, // +=
    SubAssign, // -=
    MulAssign, // *=
    DivAssign, // /=
    RemAssign, // %=

    AndAssign, // &=
    OrAssign,  // |=
    XorAssign, // ^=
    ShlAssign, // <<=
    ShrAssign, // >>=

    Land, // &&
    Lor,  // ||
    Inc,  // ++
    Dec,  // --

    Eql,    // ==
    Lss,    // <
    Gtr,    // >
    Assign, // =
    Not,    // !

    Neq,    // !=
    Leq,    // <=
    Geq,    // >=
    Define, // :=

    Lparen,      // (
    Lbrack,      // [
    Lbrace,      // {
    Comma,       // ,
    Period,      // .
    Colon,       // :
    DoubleColon, // ::
    Semicolon,   // ;

    Rparen, // )
    Rbrack, // ]
    Rbrace, // }

    // Keywords
    As,
    Break,
    Case,
    Class,
    Const,
    Continue,
    Default,
    Else,
    Enum,
    For,
    Fun,
    If,
    Implements,
    Import,
    Interface,
    Match,
    Package,
    Public,
    Return,
    Var,
}

impl TokenType {
    /// Returns the token type for an identifier spelling: the keyword
    /// type if `ident` is a reserved word, [`TokenType::Ident`]
    /// otherwise.
    #[must_use]
    pub fn lookup_keyword(ident: &str) -> Self {
        match ident {
            "as" => Self::As,
            "break" => Self::Break,
            "case" => Self::Case,
            "class" => Self::Class,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "default" => Self::Default,
            "else" => Self::Else,
            "enum" => Self::Enum,
            "for" => Self::For,
            "fun" => Self::Fun,
            "if" => Self::If,
            "implements" => Self::Implements,
            "import" => Self::Import,
            "interface" => Self::Interface,
            "match" => Self::Match,
            "package" => Self::Package,
            "public" => Self::Public,
            "return" => Self::Return,
            "var" => Self::Var,
            _ => Self::Ident,
        }
    }

    /// Returns `true` for identifiers and basic type literals.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::Ident | Self::Int | Self::Float | Self::String)
    }

    /// Returns `true` for keyword token types.
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::As
                | Self::Break
                | Self::Case
                | Self::Class
                | Self::Const
                | Self::Continue
                | Self::Default
                | Self::Else
                | Self::Enum
                | Self::For
                | Self::Fun
                | Self::If
                | Self::Implements
                | Self::Import
                | Self::Interface
                | Self::Match
                | Self::Package
                | Self::Public
                | Self::Return
                | Self::Var
        )
    }

    /// Returns `true` if a token of this type can legally end a
    /// statement.
    ///
    /// This is the set that drives automatic statement termination: a
    /// line break immediately following one of these tokens is surfaced
    /// as an explicit `NEWLINE` token.
    #[must_use]
    pub const fn can_end_statement(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Int
                | Self::Float
                | Self::String
                | Self::Break
                | Self::Continue
                | Self::Return
                | Self::Inc
                | Self::Dec
                | Self::Rparen
                | Self::Rbrack
                | Self::Rbrace
        )
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
            Self::Comment => "COMMENT",
            Self::Newline => "NEWLINE",
            Self::Ident => "IDENT",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Rem => "REM",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
            Self::AddAssign => "ADDASSIGN",
            Self::SubAssign => "SUBASSIGN",
            Self::MulAssign => "MULASSIGN",
            Self::DivAssign => "DIVASSIGN",
            Self::RemAssign => "REMASSIGN",
            Self::AndAssign => "ANDASSIGN",
            Self::OrAssign => "ORASSIGN",
            Self::XorAssign => "XORASSIGN",
            Self::ShlAssign => "SHLASSIGN",
            Self::ShrAssign => "SHRASSIGN",
            Self::Land => "LAND",
            Self::Lor => "LOR",
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Eql => "EQL",
            Self::Lss => "LSS",
            Self::Gtr => "GTR",
            Self::Assign => "ASSIGN",
            Self::Not => "NOT",
            Self::Neq => "NEQ",
            Self::Leq => "LEQ",
            Self::Geq => "GEQ",
            Self::Define => "DEFINE",
            Self::Lparen => "LPAREN",
            Self::Lbrack => "LBRACK",
            Self::Lbrace => "LBRACE",
            Self::Comma => "COMMA",
            Self::Period => "PERIOD",
            Self::Colon => "COLON",
            Self::DoubleColon => "DOUBLECOLON",
            Self::Semicolon => "SEMICOLON",
            Self::Rparen => "RPAREN",
            Self::Rbrack => "RBRACK",
            Self::Rbrace => "RBRACE",
            Self::As => "AS",
            Self::Break => "BREAK",
            Self::Case => "CASE",
            Self::Class => "CLASS",
            Self::Const => "CONST",
            Self::Continue => "CONTINUE",
            Self::Default => "DEFAULT",
            Self::Else => "ELSE",
            Self::Enum => "ENUM",
            Self::For => "FOR",
            Self::Fun => "FUN",
            Self::If => "IF",
            Self::Implements => "IMPLEMENTS",
            Self::Import => "IMPORT",
            Self::Interface => "INTERFACE",
            Self::Match => "MATCH",
            Self::Package => "PACKAGE",
            Self::Public => "PUBLIC",
            Self::Return => "RETURN",
            Self::Var => "VAR",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token type.
    pub ty: TokenType,
    /// The position of the token's first character.
    pub position: Position,
    /// The exact source text of the token. String and comment tokens
    /// keep their delimiters; escape sequences are not decoded.
    pub content: EcoString,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(ty: TokenType, position: Position, content: impl Into<EcoString>) -> Self {
        Self {
            ty,
            position,
            content: content.into(),
        }
    }

    /// Returns the position one past the token's last character.
    #[must_use]
    pub fn end(&self) -> Position {
        Position {
            filename: self.position.filename.clone(),
            line: self.position.line,
            column: self.position.column + self.content.chars().count() as u32,
        }
    }
}
