// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Liza source code.
//!
//! This module converts source bytes into a stream of [`Token`]s. The
//! lexer is hand-written for maximum control over error recovery and
//! the automatic statement-termination rule.
//!
//! # Design Principles
//!
//! - **Error recovery**: never panic on malformed input; report through
//!   the error callback and keep producing best-effort tokens
//! - **Automatic statement termination**: a line break becomes an
//!   explicit `NEWLINE` token only after a token that can legally end a
//!   statement; everywhere else it is ordinary whitespace
//! - **Precise positions**: every token carries the 1-based line and
//!   character column of its first character
//!
//! # Example
//!
//! ```
//! use liza_core::parse::{Lexer, Mode, TokenType};
//!
//! let mut lexer = Lexer::new("demo.lz", b"x := 1\n", None, Mode::default());
//! let types: Vec<_> = std::iter::from_fn(|| {
//!     let token = lexer.next_token();
//!     (token.ty != TokenType::Eof).then_some(token.ty)
//! })
//! .collect();
//! assert_eq!(
//!     types,
//!     vec![TokenType::Ident, TokenType::Define, TokenType::Int, TokenType::Newline]
//! );
//! ```

use ecow::EcoString;

use super::{Position, Token, TokenType};

/// Byte order mark, only permitted as the very first character.
const BOM: char = '\u{feff}';

/// Callback invoked for each lexical error, synchronously and in source
/// order.
pub type ErrorHandler<'a> = Box<dyn FnMut(Position, &str) + 'a>;

/// Lexer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// Emit comments as [`TokenType::Comment`] tokens instead of
    /// skipping them.
    pub scan_comments: bool,
}

/// The scanner's position state.
///
/// Kept as one small copyable value so speculative scans (the comment
/// lookahead) can snapshot and restore it wholesale.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    /// Current character; `None` at end of input.
    ch: Option<char>,
    /// Byte offset of the current character.
    offset: usize,
    /// Byte offset after the current character.
    rd_offset: usize,
    /// Current line, 1-based.
    line: u32,
    /// Column of the current character, 1-based, in characters.
    col: u32,
}

/// A lexer that tokenizes Liza source code.
///
/// The lexer pulls one token at a time via [`Lexer::next_token`]. Once
/// it returns an `EOF` token, every subsequent call returns `EOF` at the
/// same position.
pub struct Lexer<'src> {
    // immutable state
    filename: EcoString,
    src: &'src [u8],
    err_handler: Option<ErrorHandler<'src>>,
    mode: Mode,

    // scanning state
    cur: Cursor,
    /// Whether the next literal line break is insignificant whitespace.
    ignore_newline: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("filename", &self.filename)
            .field("offset", &self.cur.offset)
            .field("line", &self.cur.line)
            .field("col", &self.cur.col)
            .field("ignore_newline", &self.ignore_newline)
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source bytes.
    ///
    /// `err_handler` is called for every lexical error, in source
    /// order. A leading byte order mark is consumed silently.
    #[must_use]
    pub fn new(
        filename: impl Into<EcoString>,
        src: &'src [u8],
        err_handler: Option<ErrorHandler<'src>>,
        mode: Mode,
    ) -> Self {
        let mut lexer = Self {
            filename: filename.into(),
            src,
            err_handler,
            mode,
            cur: Cursor {
                ch: None,
                offset: 0,
                rd_offset: 0,
                line: 1,
                col: 0,
            },
            ignore_newline: true,
        };

        // read in the first character
        lexer.next_char();
        if lexer.cur.ch == Some(BOM) {
            lexer.next_char(); // ignore BOM at file beginning
        }

        lexer
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let (token, ignore_newline) = self.scan();
        self.ignore_newline = ignore_newline;
        token
    }

    /// Scans one token and returns it together with the
    /// `ignore_newline` state for the next call.
    fn scan(&mut self) -> (Token, bool) {
        loop {
            self.skip_whitespace();

            let pos = self.position();
            let start = self.cur.offset;

            match self.cur.ch {
                Some(ch) if is_letter(ch) => {
                    let content = self.scan_identifier();
                    let ty = TokenType::lookup_keyword(&content);
                    let ignore = !ty.can_end_statement();
                    return (Token::new(ty, pos, content), ignore);
                }
                Some(ch) if ch.is_ascii_digit() => {
                    let (ty, content) = self.scan_number(false);
                    return (Token::new(ty, pos, content), false);
                }
                None => {
                    if !self.ignore_newline {
                        // one synthetic terminator before switching to EOF
                        return (Token::new(TokenType::Newline, pos, "\n"), true);
                    }
                    return (Token::new(TokenType::Eof, pos, ""), true);
                }
                Some(ch) => {
                    let start_cursor = self.cur;
                    self.next_char();

                    let (ty, content) = match ch {
                        '\n' => {
                            // only reached when ignore_newline was false
                            // and skip_whitespace left the line break
                            return (Token::new(TokenType::Newline, pos, "\n"), true);
                        }
                        '/' => {
                            if matches!(self.cur.ch, Some('/' | '*')) {
                                // if the upcoming comments hide a line break,
                                // surface the NEWLINE first and re-scan the
                                // comment on the next call
                                if !self.ignore_newline && self.find_newline_in_comments() {
                                    self.cur = start_cursor;
                                    return (Token::new(TokenType::Newline, pos, "\n"), true);
                                }
                                let content = self.scan_comment();
                                if !self.mode.scan_comments {
                                    // a NEWLINE owed before this comment was
                                    // already emitted above
                                    self.ignore_newline = true;
                                    continue;
                                }
                                return (Token::new(TokenType::Comment, pos, content), true);
                            }
                            let ty = self.switch2(TokenType::Div, TokenType::DivAssign);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '.' => {
                            if matches!(self.cur.ch, Some(ch) if ch.is_ascii_digit()) {
                                let (ty, content) = self.scan_number(true);
                                return (Token::new(ty, pos, content), false);
                            }
                            (TokenType::Period, EcoString::from("."))
                        }
                        '"' => {
                            let content = self.scan_string();
                            return (Token::new(TokenType::String, pos, content), false);
                        }
                        '`' => {
                            let content = self.scan_raw_string();
                            return (Token::new(TokenType::String, pos, content), false);
                        }
                        '+' => {
                            let ty =
                                self.switch3(TokenType::Add, TokenType::AddAssign, '+', TokenType::Inc);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '-' => {
                            let ty =
                                self.switch3(TokenType::Sub, TokenType::SubAssign, '-', TokenType::Dec);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '*' => {
                            let ty = self.switch2(TokenType::Mul, TokenType::MulAssign);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '%' => {
                            let ty = self.switch2(TokenType::Rem, TokenType::RemAssign);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '&' => {
                            let ty =
                                self.switch3(TokenType::And, TokenType::AndAssign, '&', TokenType::Land);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '|' => {
                            let ty =
                                self.switch3(TokenType::Or, TokenType::OrAssign, '|', TokenType::Lor);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '^' => {
                            let ty = self.switch2(TokenType::Xor, TokenType::XorAssign);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '<' => {
                            let ty = self.switch4(
                                TokenType::Lss,
                                TokenType::Leq,
                                '<',
                                TokenType::Shl,
                                TokenType::ShlAssign,
                            );
                            (ty, self.text(start, self.cur.offset))
                        }
                        '>' => {
                            let ty = self.switch4(
                                TokenType::Gtr,
                                TokenType::Geq,
                                '>',
                                TokenType::Shr,
                                TokenType::ShrAssign,
                            );
                            (ty, self.text(start, self.cur.offset))
                        }
                        '=' => {
                            let ty = self.switch2(TokenType::Assign, TokenType::Eql);
                            (ty, self.text(start, self.cur.offset))
                        }
                        '!' => {
                            let ty = self.switch2(TokenType::Not, TokenType::Neq);
                            (ty, self.text(start, self.cur.offset))
                        }
                        ':' => match self.cur.ch {
                            Some('=') => {
                                self.next_char();
                                (TokenType::Define, self.text(start, self.cur.offset))
                            }
                            Some(':') => {
                                self.next_char();
                                (TokenType::DoubleColon, self.text(start, self.cur.offset))
                            }
                            _ => (TokenType::Colon, EcoString::from(":")),
                        },
                        '(' => (TokenType::Lparen, EcoString::from("(")),
                        ')' => (TokenType::Rparen, EcoString::from(")")),
                        '[' => (TokenType::Lbrack, EcoString::from("[")),
                        ']' => (TokenType::Rbrack, EcoString::from("]")),
                        '{' => (TokenType::Lbrace, EcoString::from("{")),
                        '}' => (TokenType::Rbrace, EcoString::from("}")),
                        ',' => (TokenType::Comma, EcoString::from(",")),
                        ';' => (TokenType::Semicolon, EcoString::from(";")),
                        ch => {
                            // an unexpected BOM is already reported in
                            // next_char, don't repeat it here
                            if ch != BOM {
                                let col = self.cur.col.saturating_sub(1);
                                let msg =
                                    format!("illegal character U+{:04X} {:?}", ch as u32, ch);
                                self.report(self.cur.line, col, &msg);
                            }
                            let token =
                                Token::new(TokenType::Illegal, pos, ch.to_string());
                            return (token, self.ignore_newline);
                        }
                    };

                    let ignore = !ty.can_end_statement();
                    return (Token::new(ty, pos, content), ignore);
                }
            }
        }
    }

    /// Reads the next character into the cursor. `cur.ch` becomes `None`
    /// at end of input, after which the cursor no longer moves.
    fn next_char(&mut self) {
        if self.cur.ch == Some('\n') {
            self.cur.line += 1;
            self.cur.col = 0;
        }

        if self.cur.rd_offset == self.src.len() {
            // entering end of input advances the column once; the
            // cursor then stays put so EOF repeats at one position
            if self.cur.ch.is_some() || self.cur.col == 0 {
                self.cur.col += 1;
            }
            self.cur.ch = None;
            self.cur.offset = self.src.len();
            return;
        }

        self.cur.offset = self.cur.rd_offset;
        self.cur.col += 1;

        let byte = self.src[self.cur.rd_offset];
        let (ch, width) = if byte == 0 {
            self.report(self.cur.line, self.cur.col, "illegal character NULL");
            ('\0', 1)
        } else if byte < 0x80 {
            (byte as char, 1)
        } else {
            match decode_char(&self.src[self.cur.rd_offset..]) {
                Some((ch, width)) => {
                    if ch == BOM && self.cur.offset > 0 {
                        self.report(self.cur.line, self.cur.col, "illegal byte order mark");
                    }
                    (ch, width)
                }
                None => {
                    self.report(self.cur.line, self.cur.col, "illegal UTF-8 encoding");
                    (char::REPLACEMENT_CHARACTER, 1)
                }
            }
        };

        self.cur.ch = Some(ch);
        self.cur.rd_offset += width;
    }

    fn report(&mut self, line: u32, col: u32, msg: &str) {
        if let Some(handler) = self.err_handler.as_mut() {
            let pos = Position {
                filename: self.filename.clone(),
                line,
                column: col,
            };
            handler(pos, msg);
        }
    }

    fn position(&self) -> Position {
        Position {
            filename: self.filename.clone(),
            line: self.cur.line,
            column: self.cur.col,
        }
    }

    /// Returns the source text in `[from, to)` as a string.
    fn text(&self, from: usize, to: usize) -> EcoString {
        EcoString::from(String::from_utf8_lossy(&self.src[from..to]).as_ref())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cur.ch, Some(' ' | '\t' | '\r'))
            || (self.cur.ch == Some('\n') && self.ignore_newline)
        {
            self.next_char();
        }
    }

    /// Reports whether a `NEWLINE` would be reached before any
    /// non-comment, non-whitespace token.
    ///
    /// Called with the initial `/` of a comment already consumed and
    /// `ignore_newline` false. The cursor is fully restored afterwards,
    /// whatever the speculative scan consumed.
    fn find_newline_in_comments(&mut self) -> bool {
        let saved = self.cur;
        let found = self.look_for_newline();
        self.cur = saved;
        found
    }

    fn look_for_newline(&mut self) -> bool {
        // read ahead until a newline, EOF, or non-comment token is found
        while matches!(self.cur.ch, Some('/' | '*')) {
            if self.cur.ch == Some('/') {
                // a line comment always runs to a line break or EOF
                return true;
            }

            // block comment: look for a line break before its end
            self.next_char();
            while let Some(ch) = self.cur.ch {
                if ch == '\n' {
                    return true;
                }
                self.next_char();
                if ch == '*' && self.cur.ch == Some('/') {
                    // end of this comment, continue searching
                    self.next_char();
                    break;
                }
            }

            self.skip_whitespace(); // ignore_newline is false
            match self.cur.ch {
                None | Some('\n') => return true,
                Some('/') => self.next_char(), // consume '/', maybe another comment
                Some(_) => return false,       // non-comment token
            }
        }

        // non-comment token
        false
    }

    /// Scans a comment. The initial `/` is already consumed and the
    /// current character is `/` or `*`.
    fn scan_comment(&mut self) -> EcoString {
        let offset = self.cur.offset - 1;
        let line = self.cur.line;
        let col = self.cur.col - 1;
        let mut has_cr = false;

        if self.cur.ch == Some('/') {
            // line comment
            while let Some(ch) = self.cur.ch {
                if ch == '\n' {
                    break;
                }
                if ch == '\r' {
                    has_cr = true;
                }
                self.next_char();
            }
        } else {
            // block comment
            self.next_char();
            let mut terminated = false;
            while let Some(ch) = self.cur.ch {
                if ch == '\r' {
                    has_cr = true;
                }
                self.next_char();
                if ch == '*' && self.cur.ch == Some('/') {
                    self.next_char();
                    terminated = true;
                    break;
                }
            }
            if !terminated {
                self.report(line, col, "comment not terminated");
            }
        }

        let content = self.text(offset, self.cur.offset);
        if has_cr {
            strip_cr(&content)
        } else {
            content
        }
    }

    fn scan_identifier(&mut self) -> EcoString {
        let offset = self.cur.offset;
        while matches!(self.cur.ch, Some(ch) if is_letter(ch) || is_digit(ch)) {
            self.next_char();
        }
        self.text(offset, self.cur.offset)
    }

    fn scan_mantissa(&mut self, base: u32) {
        while digit_value(self.cur.ch) < base {
            self.next_char();
        }
    }

    /// Scans a numeric literal. `seen_decimal_point` is true when the
    /// caller already consumed a leading `.` followed by a digit.
    fn scan_number(&mut self, seen_decimal_point: bool) -> (TokenType, EcoString) {
        let mut offset = self.cur.offset;
        let line = self.cur.line;
        let col = self.cur.col;
        let mut ty = TokenType::Int;

        if seen_decimal_point {
            offset -= 1; // include the already-consumed '.'
            ty = TokenType::Float;
            self.scan_mantissa(10);
            self.scan_exponent(&mut ty, line, col);
            return (ty, self.text(offset, self.cur.offset));
        }

        if self.cur.ch == Some('0') {
            self.next_char();
            match self.cur.ch {
                Some('x' | 'X') => {
                    // hexadecimal int
                    self.next_char();
                    self.scan_mantissa(16);
                    if self.cur.offset - offset <= 2 {
                        // only scanned "0x" or "0X"
                        self.report(line, col, "illegal hexadecimal number");
                    }
                }
                Some('b' | 'B') => {
                    // binary int
                    self.next_char();
                    self.scan_mantissa(2);
                    if self.cur.offset - offset <= 2 {
                        // only scanned "0b" or "0B"
                        self.report(line, col, "illegal binary number");
                    }
                }
                _ => {
                    // octal int, or a float with a leading zero
                    let mut seen_decimal_digit = false;
                    self.scan_mantissa(8);
                    if matches!(self.cur.ch, Some('8' | '9')) {
                        seen_decimal_digit = true;
                        self.scan_mantissa(10);
                    }
                    if matches!(self.cur.ch, Some('.' | 'e' | 'E')) {
                        self.scan_fraction(&mut ty);
                        self.scan_exponent(&mut ty, line, col);
                    } else if seen_decimal_digit {
                        self.report(line, col, "illegal octal number");
                    }
                }
            }
            return (ty, self.text(offset, self.cur.offset));
        }

        // decimal int or float
        self.scan_mantissa(10);
        self.scan_fraction(&mut ty);
        self.scan_exponent(&mut ty, line, col);
        (ty, self.text(offset, self.cur.offset))
    }

    fn scan_fraction(&mut self, ty: &mut TokenType) {
        if self.cur.ch == Some('.') {
            *ty = TokenType::Float;
            self.next_char();
            self.scan_mantissa(10);
        }
    }

    fn scan_exponent(&mut self, ty: &mut TokenType, line: u32, col: u32) {
        if matches!(self.cur.ch, Some('e' | 'E')) {
            *ty = TokenType::Float;
            self.next_char();
            if matches!(self.cur.ch, Some('-' | '+')) {
                self.next_char();
            }
            if digit_value(self.cur.ch) < 10 {
                self.scan_mantissa(10);
            } else {
                self.report(line, col, "illegal floating-point exponent");
            }
        }
    }

    /// Scans one escape sequence after a backslash. Returns whether the
    /// sequence was valid; the scan continues either way.
    fn scan_escape(&mut self, quote: char) -> bool {
        let line = self.cur.line;
        let col = self.cur.col;

        let (digits, base, max): (u32, u32, u32) = match self.cur.ch {
            Some(ch) if ch == quote => {
                self.next_char();
                return true;
            }
            Some('a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\') => {
                self.next_char();
                return true;
            }
            Some('0'..='7') => (3, 8, 255),
            Some('x') => {
                self.next_char();
                (2, 16, 255)
            }
            Some('u') => {
                self.next_char();
                (4, 16, char::MAX as u32)
            }
            Some('U') => {
                self.next_char();
                (8, 16, char::MAX as u32)
            }
            Some(_) => {
                self.report(line, col, "unknown escape sequence");
                return false;
            }
            None => {
                self.report(line, col, "escape sequence not terminated");
                return false;
            }
        };

        let mut value: u32 = 0;
        let mut digits = digits;
        while digits > 0 {
            let digit = digit_value(self.cur.ch);
            if digit >= base {
                match self.cur.ch {
                    Some(ch) => {
                        let msg = format!(
                            "illegal character U+{:04X} {:?} in escape sequence",
                            ch as u32, ch
                        );
                        self.report(line, col, &msg);
                    }
                    None => self.report(line, col, "escape sequence not terminated"),
                }
                return false;
            }
            value = value * base + digit;
            self.next_char();
            digits -= 1;
        }

        if value > max || (0xD800..0xE000).contains(&value) {
            self.report(line, col, "escape sequence is invalid Unicode code point");
            return false;
        }

        true
    }

    /// Scans a string literal. The opening `"` is already consumed; the
    /// returned content keeps both delimiters and raw escape text.
    fn scan_string(&mut self) -> EcoString {
        let offset = self.cur.offset - 1;
        let line = self.cur.line;
        let col = self.cur.col - 1;

        loop {
            let Some(ch) = self.cur.ch else {
                self.report(line, col, "string literal not terminated");
                break;
            };
            if ch == '\n' {
                self.report(line, col, "string literal not terminated");
                break;
            }
            self.next_char();
            if ch == '"' {
                break;
            }
            if ch == '\\' {
                self.scan_escape('"');
            }
        }

        self.text(offset, self.cur.offset)
    }

    /// Scans a raw string literal. The opening backtick is already
    /// consumed; the literal spans lines verbatim with CR stripped.
    fn scan_raw_string(&mut self) -> EcoString {
        let offset = self.cur.offset - 1;
        let line = self.cur.line;
        let col = self.cur.col - 1;

        let mut has_cr = false;
        loop {
            let Some(ch) = self.cur.ch else {
                self.report(line, col, "raw string literal not terminated");
                break;
            };
            self.next_char();
            if ch == '`' {
                break;
            }
            if ch == '\r' {
                has_cr = true;
            }
        }

        let content = self.text(offset, self.cur.offset);
        if has_cr {
            strip_cr(&content)
        } else {
            content
        }
    }

    fn switch2(&mut self, ty0: TokenType, ty1: TokenType) -> TokenType {
        if self.cur.ch == Some('=') {
            self.next_char();
            return ty1;
        }
        ty0
    }

    fn switch3(&mut self, ty0: TokenType, ty1: TokenType, ch2: char, ty2: TokenType) -> TokenType {
        if self.cur.ch == Some('=') {
            self.next_char();
            return ty1;
        }
        if self.cur.ch == Some(ch2) {
            self.next_char();
            return ty2;
        }
        ty0
    }

    fn switch4(
        &mut self,
        ty0: TokenType,
        ty1: TokenType,
        ch2: char,
        ty2: TokenType,
        ty3: TokenType,
    ) -> TokenType {
        if self.cur.ch == Some('=') {
            self.next_char();
            return ty1;
        }
        if self.cur.ch == Some(ch2) {
            self.next_char();
            if self.cur.ch == Some('=') {
                self.next_char();
                return ty3;
            }
            return ty2;
        }
        ty0
    }
}

/// Decodes the first character of `bytes`, or `None` if the bytes do
/// not start with a valid UTF-8 sequence.
fn decode_char(bytes: &[u8]) -> Option<(char, usize)> {
    let len = bytes.len().min(4);
    let valid = match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => s,
        Err(err) => match err.valid_up_to() {
            0 => return None,
            n => match std::str::from_utf8(&bytes[..n]) {
                Ok(s) => s,
                Err(_) => return None,
            },
        },
    };
    valid.chars().next().map(|ch| (ch, ch.len_utf8()))
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || (!ch.is_ascii() && ch.is_alphabetic())
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit() || (!ch.is_ascii() && ch.is_numeric())
}

fn digit_value(ch: Option<char>) -> u32 {
    match ch {
        Some(ch @ '0'..='9') => ch as u32 - '0' as u32,
        Some(ch @ 'a'..='z') => ch as u32 - 'a' as u32 + 10,
        Some(ch @ 'A'..='Z') => ch as u32 - 'A' as u32 + 10,
        _ => 16, // larger than any legal digit value
    }
}

fn strip_cr(s: &str) -> EcoString {
    s.chars().filter(|&ch| ch != '\r').collect::<String>().into()
}
