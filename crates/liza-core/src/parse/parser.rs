// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Liza source code.
//!
//! The parser pulls tokens from a [`Lexer`] and builds the AST defined
//! in [`crate::ast`].
//!
//! # Design Philosophy
//!
//! - **Error recovery is mandatory** - parsing a file always produces a
//!   tree, however malformed the input
//! - **Multiple errors** - report all errors, don't stop at the first
//! - **Precise positions** - every diagnostic points to a source
//!   location, and diagnostics stay in detection order
//! - **Synchronization points** - top-level recovery restarts at the
//!   next declaration keyword and records a [`BadDecl`] for the
//!   skipped span
//!
//! # Expression Precedence
//!
//! Binary expressions use precedence climbing: a minimum binding level
//! threads through the recursion, so the whole operator grammar lives
//! in one table ([`precedence`]).
//!
//! | Level | Operators |
//! |-------|-----------------------|
//! | 1 | `\|\|` |
//! | 2 | `&&` |
//! | 3 | `==` `<` `>` `!=` `<=` `>=` |
//! | 4 | `+` `-` `\|` `^` |
//! | 5 | `*` `/` `%` `&` `<<` `>>` |
//!
//! Unary prefix operators (`-` `^` `!`) bind tighter than any binary
//! operator. Everything else terminates climbing.
//!
//! # Usage
//!
//! ```
//! use liza_core::parse::parse;
//!
//! let (file, diagnostics) = parse("demo.lz", b"package demo\n");
//! assert!(diagnostics.is_empty());
//! assert_eq!(file.package.name.content, "demo");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use ecow::EcoString;

use crate::ast::{
    ArrayLit, ArrayType, AssignStmt, BadDecl, BasicLit, BasicType, BinaryExpr, BlockStmt,
    BranchStmt, CallExpr, CaseClause, ClassDecl, ConstDecl, Decl, DeclStmt, ElseStmt, Expr,
    ExprStmt, File, ForStmt, FuncDecl, FuncDef, Ident, IfStmt, ImportDecl, ImportPath,
    IncDecStmt, IndexExpr, InterfaceDecl, KeyValueExpr, MapLit, MapType, MatchStmt, PackageDecl,
    ParameterDef, ReturnStmt, SelectorExpr, SelectorType, Stmt, TupleLit, TupleType, Type,
    UnaryExpr, VarDecl,
};
use crate::parse::{Diagnostic, ErrorHandler, Lexer, Mode, Position, Token, TokenType};

/// Binding level for tokens that are not binary operators.
const LOWEST_PREC: u8 = 0;

/// Returns the binding level of `op` as a binary operator.
///
/// Higher levels bind tighter; all binary operators are
/// left-associative. Tokens that are not binary operators (including
/// the postfix `++`/`--`) return [`LOWEST_PREC`], which terminates
/// precedence climbing.
fn precedence(op: TokenType) -> u8 {
    match op {
        TokenType::Lor => 1,
        TokenType::Land => 2,
        TokenType::Eql
        | TokenType::Lss
        | TokenType::Gtr
        | TokenType::Neq
        | TokenType::Leq
        | TokenType::Geq => 3,
        TokenType::Add | TokenType::Sub | TokenType::Or | TokenType::Xor => 4,
        TokenType::Mul
        | TokenType::Div
        | TokenType::Rem
        | TokenType::And
        | TokenType::Shl
        | TokenType::Shr => 5,
        _ => LOWEST_PREC,
    }
}

/// Parses a complete source file.
///
/// This is the main entry point. It always returns a [`File`], even if
/// there are syntax errors; check the returned diagnostics.
///
/// # Examples
///
/// ```
/// use liza_core::parse::parse;
///
/// let (file, diagnostics) = parse("demo.lz", b"package demo\nimport io\n");
/// assert!(diagnostics.is_empty());
/// assert_eq!(file.imports.len(), 1);
/// ```
#[must_use]
pub fn parse(filename: impl Into<EcoString>, src: &[u8]) -> (File, Vec<Diagnostic>) {
    let mut parser = Parser::new(filename, src);
    let file = parser.parse_file();
    let diagnostics = parser.diagnostics();
    (file, diagnostics)
}

/// The parser state.
///
/// The parser owns its lexer (always in comment-scanning mode) and
/// filters `COMMENT` tokens out at the cursor, so grammar rules never
/// see them.
pub struct Parser<'src> {
    lexer: Lexer<'src>,

    /// Current token.
    tok: Token,
    /// Buffered lookahead tokens, oldest first.
    lookahead: Vec<Token>,

    /// Diagnostics shared with the lexer's error callback so lexical
    /// and syntactic errors stay in detection order.
    diagnostics: Rc<RefCell<Vec<Diagnostic>>>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source bytes.
    #[must_use]
    pub fn new(filename: impl Into<EcoString>, src: &'src [u8]) -> Self {
        let filename: EcoString = filename.into();
        let diagnostics = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&diagnostics);
        let handler: ErrorHandler<'src> = Box::new(move |pos, msg| {
            sink.borrow_mut().push(Diagnostic::new(pos, msg));
        });
        let mut lexer = Lexer::new(filename, src, Some(handler), Mode { scan_comments: true });
        let tok = Self::next_non_comment(&mut lexer);

        Self {
            lexer,
            tok,
            lookahead: Vec::new(),
            diagnostics,
        }
    }

    /// Returns the diagnostics accumulated so far, in detection order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    fn next_non_comment(lexer: &mut Lexer<'src>) -> Token {
        loop {
            let token = lexer.next_token();
            if token.ty != TokenType::Comment {
                return token;
            }
        }
    }

    /// Advances to the next non-comment token.
    fn next(&mut self) {
        self.tok = if self.lookahead.is_empty() {
            Self::next_non_comment(&mut self.lexer)
        } else {
            self.lookahead.remove(0)
        };
    }

    /// Peeks `n` non-comment tokens past the current one.
    fn peek_nth(&mut self, n: usize) -> &Token {
        while self.lookahead.len() <= n {
            let token = Self::next_non_comment(&mut self.lexer);
            self.lookahead.push(token);
        }
        &self.lookahead[n]
    }

    /// Consumes the current token, recording a diagnostic if its type
    /// is not `ty`. Always advances, guaranteeing forward progress.
    fn expect(&mut self, ty: TokenType) -> Token {
        let current = self.tok.clone();
        if current.ty != ty {
            self.error_expected(current.position.clone(), &format!("<{ty}>"));
        }
        self.next(); // make progress
        current
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    fn error_expected(&mut self, pos: Position, expected: &str) {
        let mut msg = format!("expected {expected}");
        if pos == self.tok.position {
            // the error happens at the current position: be specific
            msg.push_str(&format!(", found <{}> {}", self.tok.ty, self.tok.content));
        }
        self.diagnostics.borrow_mut().push(Diagnostic::new(pos, msg));
    }

    /// Skips tokens until the next top-level declaration keyword or EOF.
    fn sync_top_level_decl(&mut self) {
        loop {
            match self.tok.ty {
                TokenType::Public
                | TokenType::Const
                | TokenType::Class
                | TokenType::Interface
                | TokenType::Eof => return,
                _ => self.next(),
            }
        }
    }

    // ========================================================================
    // File & Declarations
    // ========================================================================

    /// Parses a complete source file: a package declaration, imports,
    /// and top-level declarations.
    pub fn parse_file(&mut self) -> File {
        let package = self.parse_package_decl();

        let mut imports = Vec::new();
        while self.tok.ty == TokenType::Import {
            imports.push(self.parse_import_decl());
        }

        let mut decls = Vec::new();
        while self.tok.ty != TokenType::Eof {
            decls.push(self.parse_top_level_decl());
        }

        File {
            package,
            imports,
            decls,
        }
    }

    /// Parses `package Name`.
    pub fn parse_package_decl(&mut self) -> PackageDecl {
        let package = self.expect(TokenType::Package).position;
        let name = self.expect(TokenType::Ident);
        self.expect(TokenType::Newline);
        PackageDecl { package, name }
    }

    /// Parses `import [Library ::] seg [/ seg]* [as Alias]`.
    pub fn parse_import_decl(&mut self) -> ImportDecl {
        let import = self.expect(TokenType::Import).position;
        let path = self.parse_import_path();

        let (as_pos, alias) = if self.tok.ty == TokenType::As {
            let as_pos = self.expect(TokenType::As).position;
            let alias = self.expect(TokenType::Ident);
            (Some(as_pos), Some(alias))
        } else {
            (None, None)
        };
        self.expect(TokenType::Newline);

        ImportDecl {
            import,
            path,
            as_pos,
            alias,
        }
    }

    fn parse_import_path(&mut self) -> ImportPath {
        let mut library = None;
        let mut ident = self.expect(TokenType::Ident);
        if self.tok.ty == TokenType::DoubleColon {
            library = Some(ident);
            self.expect(TokenType::DoubleColon);
            ident = self.expect(TokenType::Ident);
        }

        let mut path = vec![ident];
        while self.tok.ty == TokenType::Div {
            self.expect(TokenType::Div);
            path.push(self.expect(TokenType::Ident));
        }

        ImportPath { library, path }
    }

    /// Parses one top-level declaration: an optional `public` marker
    /// followed by `const`, `class`, or `interface`. Anything else is
    /// recovered into a [`BadDecl`] spanning the skipped range.
    pub fn parse_top_level_decl(&mut self) -> Decl {
        let visibility =
            (self.tok.ty == TokenType::Public).then(|| self.expect(TokenType::Public));

        match self.tok.ty {
            TokenType::Const => {
                let decl = self.parse_const_decl(visibility);
                self.expect(TokenType::Newline);
                Decl::Const(decl)
            }
            TokenType::Class => {
                let decl = self.parse_class_decl(visibility);
                self.expect(TokenType::Newline);
                Decl::Class(decl)
            }
            TokenType::Interface => {
                let decl = self.parse_interface_decl(visibility);
                self.expect(TokenType::Newline);
                Decl::Interface(decl)
            }
            _ => {
                let from = self.tok.position.clone();
                self.error_expected(from.clone(), "declaration");
                self.sync_top_level_decl();
                Decl::Bad(BadDecl {
                    from,
                    to: self.tok.position.clone(),
                })
            }
        }
    }

    /// Parses `const Ident [Type] := Expr`. The terminator is consumed
    /// by the caller (`NEWLINE` in most contexts, `,`/`;` inside a
    /// `for` header).
    pub fn parse_const_decl(&mut self, visibility: Option<Token>) -> ConstDecl {
        let const_pos = self.expect(TokenType::Const).position;
        let ident = self.expect(TokenType::Ident);
        let ty = (self.tok.ty != TokenType::Define).then(|| self.parse_type());
        self.expect(TokenType::Define);
        let value = self.parse_expr();
        ConstDecl {
            visibility,
            const_pos,
            ident,
            ty,
            value,
        }
    }

    /// Parses `Ident [Type] := Expr`. The terminator is consumed by the
    /// caller, as for [`Parser::parse_const_decl`].
    pub fn parse_var_decl(&mut self) -> VarDecl {
        let ident = self.expect(TokenType::Ident);
        let ty = (self.tok.ty != TokenType::Define).then(|| self.parse_type());
        self.expect(TokenType::Define);
        let value = self.parse_expr();
        VarDecl { ident, ty, value }
    }

    /// Reports whether the current `IDENT` starts a variable
    /// declaration rather than an expression statement.
    ///
    /// `IDENT` followed by `:=`, an identifier, or `{` can only be a
    /// declaration; `IDENT [` is one only when the brackets are empty
    /// (an array type). `IDENT (` always parses as a call, so
    /// tuple-typed variable declarations are not recognized here.
    fn at_var_decl(&mut self) -> bool {
        if self.tok.ty != TokenType::Ident {
            return false;
        }
        match self.peek_nth(0).ty {
            TokenType::Define | TokenType::Ident | TokenType::Lbrace => true,
            TokenType::Lbrack => self.peek_nth(1).ty == TokenType::Rbrack,
            _ => false,
        }
    }

    /// Parses a class declaration with its `implements` clause and
    /// brace-delimited body of const, variable, and method members.
    pub fn parse_class_decl(&mut self, visibility: Option<Token>) -> ClassDecl {
        let class = self.expect(TokenType::Class).position;
        let name = self.expect(TokenType::Ident);

        let mut implements = Vec::new();
        if self.tok.ty == TokenType::Implements {
            self.expect(TokenType::Implements);
            implements.push(self.parse_ident_type());
            while self.tok.ty == TokenType::Comma {
                self.expect(TokenType::Comma);
                implements.push(self.parse_ident_type());
            }
        }

        let lbrace = self.expect(TokenType::Lbrace).position;

        let mut consts = Vec::new();
        let mut vars = Vec::new();
        let mut methods = Vec::new();
        while !matches!(self.tok.ty, TokenType::Rbrace | TokenType::Eof) {
            let member_visibility =
                (self.tok.ty == TokenType::Public).then(|| self.expect(TokenType::Public));
            let at_var = member_visibility.is_none() && self.at_var_decl();

            match self.tok.ty {
                TokenType::Const => {
                    consts.push(self.parse_const_decl(member_visibility));
                    self.expect(TokenType::Newline);
                }
                TokenType::Fun => {
                    methods.push(self.parse_func_decl(member_visibility));
                    self.expect(TokenType::Newline);
                }
                TokenType::Ident if at_var => {
                    vars.push(self.parse_var_decl());
                    self.expect(TokenType::Newline);
                }
                _ => {
                    self.error_expected(self.tok.position.clone(), "declaration");
                    // a stray visibility marker may leave the cursor on
                    // the closing brace; don't consume it
                    if !matches!(self.tok.ty, TokenType::Rbrace | TokenType::Eof) {
                        self.next(); // make progress
                    }
                }
            }
        }
        let rbrace = self.expect(TokenType::Rbrace).position;

        ClassDecl {
            visibility,
            class,
            name,
            implements,
            lbrace,
            consts,
            vars,
            methods,
            rbrace,
        }
    }

    /// Parses an interface declaration: a brace-delimited body of const
    /// members and method signatures.
    pub fn parse_interface_decl(&mut self, visibility: Option<Token>) -> InterfaceDecl {
        let interface = self.expect(TokenType::Interface).position;
        let name = self.expect(TokenType::Ident);
        let lbrace = self.expect(TokenType::Lbrace).position;

        let mut consts = Vec::new();
        let mut funcs = Vec::new();
        while !matches!(self.tok.ty, TokenType::Rbrace | TokenType::Eof) {
            match self.tok.ty {
                TokenType::Const => {
                    consts.push(self.parse_const_decl(None));
                    self.expect(TokenType::Newline);
                }
                TokenType::Fun => {
                    funcs.push(self.parse_func_def());
                    self.expect(TokenType::Newline);
                }
                _ => {
                    self.error_expected(self.tok.position.clone(), "declaration");
                    self.next(); // make progress
                }
            }
        }
        let rbrace = self.expect(TokenType::Rbrace).position;

        InterfaceDecl {
            visibility,
            interface,
            name,
            lbrace,
            consts,
            funcs,
            rbrace,
        }
    }

    /// Parses a class method: a function signature with a block body.
    pub fn parse_func_decl(&mut self, visibility: Option<Token>) -> FuncDecl {
        let (fun, name, params, _rparen, return_type) = self.parse_func_signature();
        let body = self.parse_block_stmt();
        FuncDecl {
            visibility,
            fun,
            name,
            params,
            return_type,
            body,
        }
    }

    /// Parses an interface method: a bare function signature.
    pub fn parse_func_def(&mut self) -> FuncDef {
        let (fun, name, params, rparen, return_type) = self.parse_func_signature();
        FuncDef {
            fun,
            name,
            params,
            rparen,
            return_type,
        }
    }

    /// Parses `fun Name ( ParamList ) [: ReturnType]`.
    fn parse_func_signature(
        &mut self,
    ) -> (Position, Token, Vec<ParameterDef>, Position, Option<Type>) {
        let fun = self.expect(TokenType::Fun).position;
        let name = self.expect(TokenType::Ident);
        self.expect(TokenType::Lparen);

        let mut params = Vec::new();
        if !matches!(self.tok.ty, TokenType::Rparen | TokenType::Eof) {
            params.push(self.parse_parameter_def());
            while self.tok.ty == TokenType::Comma {
                self.expect(TokenType::Comma);
                params.push(self.parse_parameter_def());
            }
        }
        let rparen = self.expect(TokenType::Rparen).position;

        let return_type = (self.tok.ty == TokenType::Colon).then(|| {
            self.expect(TokenType::Colon);
            self.parse_type()
        });

        (fun, name, params, rparen, return_type)
    }

    fn parse_parameter_def(&mut self) -> ParameterDef {
        let name = self.expect(TokenType::Ident);
        let ty = self.parse_type();
        ParameterDef { name, ty }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Parses a type, dispatching on the lookahead token: `[` for an
    /// array type, `{` for a map type, `(` for a tuple type, and an
    /// identifier for a basic or selector type.
    pub fn parse_type(&mut self) -> Type {
        match self.tok.ty {
            TokenType::Lbrack => {
                let lbrack = self.expect(TokenType::Lbrack).position;
                let rbrack = self.expect(TokenType::Rbrack).position;
                let elt = Box::new(self.parse_type());
                Type::Array(ArrayType { lbrack, rbrack, elt })
            }
            TokenType::Lbrace => {
                let lbrace = self.expect(TokenType::Lbrace).position;
                let key = Box::new(self.parse_type());
                self.expect(TokenType::Colon);
                let value = Box::new(self.parse_type());
                let rbrace = self.expect(TokenType::Rbrace).position;
                Type::Map(MapType {
                    lbrace,
                    key,
                    value,
                    rbrace,
                })
            }
            TokenType::Lparen => {
                let lparen = self.expect(TokenType::Lparen).position;
                let mut elts = Vec::new();
                if !matches!(self.tok.ty, TokenType::Rparen | TokenType::Eof) {
                    elts.push(self.parse_type());
                    while self.tok.ty == TokenType::Comma {
                        self.expect(TokenType::Comma);
                        elts.push(self.parse_type());
                    }
                }
                let rparen = self.expect(TokenType::Rparen).position;
                Type::Tuple(TupleType {
                    lparen,
                    elts,
                    rparen,
                })
            }
            _ => self.parse_ident_type(),
        }
    }

    /// Parses `Ident` or `Ident . Ident`.
    fn parse_ident_type(&mut self) -> Type {
        let ident = self.expect(TokenType::Ident);
        if self.tok.ty == TokenType::Period {
            self.expect(TokenType::Period);
            let sel = self.expect(TokenType::Ident);
            Type::Selector(SelectorType {
                package: ident,
                sel,
            })
        } else {
            Type::Basic(BasicType { ident })
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parses one statement, including its terminating `NEWLINE`.
    pub fn parse_stmt(&mut self) -> Stmt {
        let at_var = self.at_var_decl();
        let stmt = match self.tok.ty {
            TokenType::Const => {
                let decl = self.parse_const_decl(None);
                Stmt::Decl(DeclStmt {
                    decl: Decl::Const(decl),
                })
            }
            TokenType::Ident if at_var => {
                let decl = self.parse_var_decl();
                Stmt::Decl(DeclStmt {
                    decl: Decl::Var(decl),
                })
            }
            TokenType::Return => Stmt::Return(self.parse_return_stmt()),
            TokenType::Break | TokenType::Continue => {
                let ty = self.tok.ty;
                Stmt::Branch(BranchStmt {
                    tok: self.expect(ty),
                })
            }
            TokenType::Lbrace => Stmt::Block(self.parse_block_stmt()),
            TokenType::If => Stmt::If(self.parse_if_stmt()),
            TokenType::Match => Stmt::Match(self.parse_match_stmt()),
            TokenType::For => Stmt::For(self.parse_for_stmt()),
            _ => self.parse_simple_stmt(),
        };
        self.expect(TokenType::Newline);
        stmt
    }

    /// Parses an expression statement, an inc/dec statement, or an
    /// assignment. No terminator is consumed, so this production also
    /// serves as a `for` loop's post clause.
    fn parse_simple_stmt(&mut self) -> Stmt {
        let expr = self.parse_expr();

        match self.tok.ty {
            TokenType::Inc | TokenType::Dec => {
                let ty = self.tok.ty;
                let op = self.expect(ty);
                Stmt::IncDec(IncDecStmt { expr, op })
            }
            TokenType::Assign
            | TokenType::AddAssign
            | TokenType::SubAssign
            | TokenType::MulAssign
            | TokenType::DivAssign
            | TokenType::RemAssign
            | TokenType::AndAssign
            | TokenType::OrAssign
            | TokenType::XorAssign
            | TokenType::ShlAssign
            | TokenType::ShrAssign => {
                let ty = self.tok.ty;
                let assign = self.expect(ty);
                let rhs = self.parse_expr();
                Stmt::Assign(AssignStmt {
                    lhs: expr,
                    assign,
                    rhs,
                })
            }
            _ => Stmt::Expr(ExprStmt { expr }),
        }
    }

    fn parse_return_stmt(&mut self) -> ReturnStmt {
        let ret = self.expect(TokenType::Return);
        let value = (self.tok.ty != TokenType::Newline).then(|| self.parse_expr());
        ReturnStmt { ret, value }
    }

    /// Parses a brace-delimited statement list.
    pub fn parse_block_stmt(&mut self) -> BlockStmt {
        let lbrace = self.expect(TokenType::Lbrace).position;
        let mut stmts = Vec::new();
        while !matches!(self.tok.ty, TokenType::Rbrace | TokenType::Eof) {
            stmts.push(self.parse_stmt());
        }
        let rbrace = self.expect(TokenType::Rbrace).position;
        BlockStmt {
            lbrace,
            stmts,
            rbrace,
        }
    }

    /// Parses an `if` statement and its `else`/`else if` chain. The
    /// terminating `NEWLINE` is expected only at the outermost level,
    /// by [`Parser::parse_stmt`].
    fn parse_if_stmt(&mut self) -> IfStmt {
        let if_pos = self.expect(TokenType::If).position;
        let cond = self.parse_expr();
        let body = self.parse_block_stmt();
        let else_stmt =
            (self.tok.ty == TokenType::Else).then(|| Box::new(self.parse_else_stmt()));
        IfStmt {
            if_pos,
            cond,
            body,
            else_stmt,
        }
    }

    fn parse_else_stmt(&mut self) -> ElseStmt {
        let else_pos = self.expect(TokenType::Else).position;
        if self.tok.ty == TokenType::If {
            ElseStmt {
                else_pos,
                if_stmt: Some(Box::new(self.parse_if_stmt())),
                body: None,
            }
        } else {
            ElseStmt {
                else_pos,
                if_stmt: None,
                body: Some(self.parse_block_stmt()),
            }
        }
    }

    /// Parses `match Expr { case Pattern: ... default: ... }`.
    fn parse_match_stmt(&mut self) -> MatchStmt {
        let match_pos = self.expect(TokenType::Match).position;
        let expr = self.parse_expr();
        let lbrace = self.expect(TokenType::Lbrace).position;

        let mut cases = Vec::new();
        while matches!(self.tok.ty, TokenType::Case | TokenType::Default) {
            cases.push(self.parse_case_clause());
        }
        let rbrace = self.expect(TokenType::Rbrace).position;

        MatchStmt {
            match_pos,
            expr,
            lbrace,
            cases,
            rbrace,
        }
    }

    /// Parses one `case Pattern:` or `default:` clause; its body runs
    /// to the next clause or the closing brace.
    fn parse_case_clause(&mut self) -> CaseClause {
        let (case_pos, pattern) = if self.tok.ty == TokenType::Case {
            let pos = self.expect(TokenType::Case).position;
            (pos, Some(self.parse_expr()))
        } else {
            (self.expect(TokenType::Default).position, None)
        };
        let colon = self.expect(TokenType::Colon).position;

        let mut body = Vec::new();
        while !matches!(
            self.tok.ty,
            TokenType::Case | TokenType::Default | TokenType::Rbrace | TokenType::Eof
        ) {
            body.push(self.parse_stmt());
        }

        CaseClause {
            case_pos,
            pattern,
            colon,
            body,
        }
    }

    /// Parses a `for` loop in one of its three forms: bodyless infinite
    /// (`for { }`), condition-only (`for cond { }`), and classic
    /// three-clause (`for decls; cond; post { }`).
    fn parse_for_stmt(&mut self) -> ForStmt {
        let for_pos = self.expect(TokenType::For).position;

        if self.tok.ty == TokenType::Lbrace {
            let body = self.parse_block_stmt();
            return ForStmt {
                for_pos,
                decls: Vec::new(),
                cond: None,
                post: None,
                body,
            };
        }

        if self.at_for_init_decl() {
            let mut decls = vec![self.parse_for_init_decl()];
            while self.tok.ty == TokenType::Comma {
                self.expect(TokenType::Comma);
                decls.push(self.parse_for_init_decl());
            }
            self.expect(TokenType::Semicolon);

            let cond = (self.tok.ty != TokenType::Semicolon).then(|| self.parse_expr());
            self.expect(TokenType::Semicolon);

            let post =
                (self.tok.ty != TokenType::Lbrace).then(|| Box::new(self.parse_simple_stmt()));
            let body = self.parse_block_stmt();
            return ForStmt {
                for_pos,
                decls,
                cond,
                post,
                body,
            };
        }

        let cond = Some(self.parse_expr());
        let body = self.parse_block_stmt();
        ForStmt {
            for_pos,
            decls: Vec::new(),
            cond,
            post: None,
            body,
        }
    }

    /// Reports whether the token after `for` starts a three-clause
    /// header. Unlike [`Parser::at_var_decl`], a `{` after the
    /// identifier opens the loop body here, not a map type.
    fn at_for_init_decl(&mut self) -> bool {
        self.tok.ty == TokenType::Const
            || (self.at_var_decl() && self.peek_nth(0).ty != TokenType::Lbrace)
    }

    /// Parses one init clause of a classic `for` loop. A clause that is
    /// neither a const nor a variable declaration is recorded as a
    /// [`BadDecl`] over the offending token.
    fn parse_for_init_decl(&mut self) -> Decl {
        if self.tok.ty == TokenType::Const {
            return Decl::Const(self.parse_const_decl(None));
        }
        if self.at_var_decl() {
            return Decl::Var(self.parse_var_decl());
        }

        let from = self.tok.position.clone();
        self.error_expected(from.clone(), "declaration");
        self.next(); // make progress
        Decl::Bad(BadDecl {
            from,
            to: self.tok.position.clone(),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parses an expression.
    pub fn parse_expr(&mut self) -> Expr {
        self.parse_binary_expr(LOWEST_PREC + 1)
    }

    /// Precedence climbing: parses binary expressions whose operators
    /// bind at least as tightly as `min_prec`. Left associativity
    /// comes from recursing with `prec + 1`.
    fn parse_binary_expr(&mut self, min_prec: u8) -> Expr {
        let mut x = self.parse_unary_expr();
        loop {
            let prec = precedence(self.tok.ty);
            if prec < min_prec {
                return x;
            }
            let ty = self.tok.ty;
            let op = self.expect(ty);
            let y = self.parse_binary_expr(prec + 1);
            x = Expr::Binary(BinaryExpr {
                x: Box::new(x),
                op,
                y: Box::new(y),
            });
        }
    }

    /// Parses a unary expression: `- ^ !` prefixes are right-associative
    /// and bind tighter than any binary operator.
    fn parse_unary_expr(&mut self) -> Expr {
        match self.tok.ty {
            TokenType::Sub | TokenType::Xor | TokenType::Not => {
                let ty = self.tok.ty;
                let op = self.expect(ty);
                let x = Box::new(self.parse_unary_expr());
                Expr::Unary(UnaryExpr { op, x })
            }
            _ => self.parse_primary_expr(),
        }
    }

    /// Parses an operand followed by any chain of postfix selectors,
    /// index expressions, and calls.
    fn parse_primary_expr(&mut self) -> Expr {
        let mut x = self.parse_operand();
        loop {
            match self.tok.ty {
                TokenType::Period => {
                    self.expect(TokenType::Period);
                    let sel = Ident {
                        token: self.expect(TokenType::Ident),
                    };
                    x = Expr::Selector(SelectorExpr { x: Box::new(x), sel });
                }
                TokenType::Lbrack => {
                    let lbrack = self.expect(TokenType::Lbrack).position;
                    let index = Box::new(self.parse_expr());
                    let rbrack = self.expect(TokenType::Rbrack).position;
                    x = Expr::Index(IndexExpr {
                        x: Box::new(x),
                        lbrack,
                        index,
                        rbrack,
                    });
                }
                TokenType::Lparen => {
                    let lparen = self.expect(TokenType::Lparen).position;
                    let mut args = Vec::new();
                    if !matches!(self.tok.ty, TokenType::Rparen | TokenType::Eof) {
                        args.push(self.parse_expr());
                        while self.tok.ty == TokenType::Comma {
                            self.expect(TokenType::Comma);
                            args.push(self.parse_expr());
                        }
                    }
                    let rparen = self.expect(TokenType::Rparen).position;
                    x = Expr::Call(CallExpr {
                        fun: Box::new(x),
                        lparen,
                        args,
                        rparen,
                    });
                }
                _ => return x,
            }
        }
    }

    /// Parses an operand: an identifier, a literal, or an array, map,
    /// or tuple literal.
    fn parse_operand(&mut self) -> Expr {
        match self.tok.ty {
            TokenType::Ident => Expr::Ident(Ident {
                token: self.expect(TokenType::Ident),
            }),
            TokenType::Int | TokenType::Float | TokenType::String => {
                let ty = self.tok.ty;
                Expr::Basic(BasicLit {
                    token: self.expect(ty),
                })
            }
            TokenType::Lbrack => self.parse_array_lit(),
            TokenType::Lbrace => self.parse_map_lit(),
            TokenType::Lparen => self.parse_tuple_lit(),
            _ => {
                // best-effort recovery: report, consume the offending
                // token, and wrap it so parsing can continue
                let bad = self.tok.clone();
                self.error_expected(bad.position.clone(), "expression");
                self.next();
                Expr::Ident(Ident { token: bad })
            }
        }
    }

    fn parse_array_lit(&mut self) -> Expr {
        let lbrack = self.expect(TokenType::Lbrack).position;
        let mut elts = Vec::new();
        if !matches!(self.tok.ty, TokenType::Rbrack | TokenType::Eof) {
            elts.push(self.parse_expr());
            while self.tok.ty == TokenType::Comma {
                self.expect(TokenType::Comma);
                elts.push(self.parse_expr());
            }
        }
        let rbrack = self.expect(TokenType::Rbrack).position;
        Expr::Array(ArrayLit {
            lbrack,
            elts,
            rbrack,
        })
    }

    fn parse_map_lit(&mut self) -> Expr {
        let lbrace = self.expect(TokenType::Lbrace).position;
        let mut entries = Vec::new();
        if !matches!(self.tok.ty, TokenType::Rbrace | TokenType::Eof) {
            entries.push(self.parse_key_value());
            while self.tok.ty == TokenType::Comma {
                self.expect(TokenType::Comma);
                entries.push(self.parse_key_value());
            }
        }
        let rbrace = self.expect(TokenType::Rbrace).position;
        Expr::Map(MapLit {
            lbrace,
            entries,
            rbrace,
        })
    }

    fn parse_key_value(&mut self) -> KeyValueExpr {
        let key = self.parse_expr();
        let colon = self.expect(TokenType::Colon).position;
        let value = self.parse_expr();
        KeyValueExpr { key, colon, value }
    }

    /// Parses a parenthesized group. The grammar cannot tell a
    /// mathematical grouping from a one-element tuple, so every group
    /// is a [`TupleLit`]; disambiguation is left to a later phase.
    fn parse_tuple_lit(&mut self) -> Expr {
        let lparen = self.expect(TokenType::Lparen).position;
        let mut elts = Vec::new();
        if !matches!(self.tok.ty, TokenType::Rparen | TokenType::Eof) {
            elts.push(self.parse_expr());
            while self.tok.ty == TokenType::Comma {
                self.expect(TokenType::Comma);
                elts.push(self.parse_expr());
            }
        }
        let rparen = self.expect(TokenType::Rparen).position;
        Expr::Tuple(TupleLit {
            lparen,
            elts,
            rparen,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const FILENAME: &str = "test.lz";

    fn pos(line: u32, col: u32) -> Position {
        Position::new(FILENAME, line, col)
    }

    fn tok(ty: TokenType, content: &str, line: u32, col: u32) -> Token {
        Token::new(ty, pos(line, col), content)
    }

    fn ident(name: &str, line: u32, col: u32) -> Token {
        tok(TokenType::Ident, name, line, col)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    #[test]
    fn package_decl_round_trip() {
        for src in [&b"package test\n"[..], &b"package test"[..]] {
            let mut parser = Parser::new(FILENAME, src);
            let decl = parser.parse_package_decl();
            assert_eq!(
                decl,
                PackageDecl {
                    package: pos(1, 1),
                    name: ident("test", 1, 9),
                },
                "source {:?}",
                std::str::from_utf8(src)
            );
            assert!(parser.diagnostics().is_empty());
        }
    }

    #[test]
    fn import_decl_with_library_and_alias() {
        let mut parser = Parser::new(FILENAME, b"import lib::simple/beautydate as date\n");
        let decl = parser.parse_import_decl();
        assert_eq!(
            decl,
            ImportDecl {
                import: pos(1, 1),
                path: ImportPath {
                    library: Some(ident("lib", 1, 8)),
                    path: vec![ident("simple", 1, 13), ident("beautydate", 1, 20)],
                },
                as_pos: Some(pos(1, 31)),
                alias: Some(ident("date", 1, 34)),
            }
        );
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn const_decl_with_and_without_type() {
        let mut parser = Parser::new(FILENAME, b"const a := 1\n");
        let decl = parser.parse_const_decl(None);
        assert_eq!(decl.ident, ident("a", 1, 7));
        assert!(decl.ty.is_none());
        assert_eq!(
            decl.value,
            Expr::Basic(BasicLit {
                token: tok(TokenType::Int, "1", 1, 12)
            })
        );
        assert!(parser.diagnostics().is_empty());

        let mut parser = Parser::new(FILENAME, b"const b int := 2\n");
        let decl = parser.parse_const_decl(None);
        assert_eq!(
            decl.ty,
            Some(Type::Basic(BasicType {
                ident: ident("int", 1, 9)
            }))
        );
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn class_decl_with_implements() {
        let (file, diagnostics) =
            parse(FILENAME, b"package t\nclass C implements a.B, C2 {\n}\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Some(Decl::Class(class)) = file.decls.first() else {
            panic!("expected a class declaration, got {:?}", file.decls);
        };
        assert_eq!(class.name.content, "C");
        assert_eq!(
            class.implements,
            vec![
                Type::Selector(SelectorType {
                    package: ident("a", 2, 20),
                    sel: ident("B", 2, 22),
                }),
                Type::Basic(BasicType {
                    ident: ident("C2", 2, 25)
                }),
            ]
        );
    }

    #[test]
    fn class_body_is_partitioned_by_kind() {
        let src = b"package t
class C {
\tcount int := 0
\tpublic const limit := 10
\tpublic fun get(): int {
\t\treturn count
\t}
}
";
        let (file, diagnostics) = parse(FILENAME, src);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Some(Decl::Class(class)) = file.decls.first() else {
            panic!("expected a class declaration, got {:?}", file.decls);
        };
        assert_eq!(class.vars.len(), 1);
        assert_eq!(class.vars[0].ident.content, "count");
        assert_eq!(class.consts.len(), 1);
        assert_eq!(class.consts[0].ident.content, "limit");
        assert!(class.consts[0].visibility.is_some());
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name.content, "get");
        assert!(class.methods[0].return_type.is_some());
    }

    #[test]
    fn interface_decl_members() {
        let src = b"package t
interface Reader {
\tconst bufSize := 4096
\tfun read(buf []byte): int
\tfun close()
}
";
        let (file, diagnostics) = parse(FILENAME, src);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Some(Decl::Interface(interface)) = file.decls.first() else {
            panic!("expected an interface declaration, got {:?}", file.decls);
        };
        assert_eq!(interface.name.content, "Reader");
        assert_eq!(interface.consts.len(), 1);
        assert_eq!(interface.funcs.len(), 2);
        assert_eq!(interface.funcs[0].name.content, "read");
        assert_eq!(interface.funcs[0].params.len(), 1);
        assert!(interface.funcs[0].return_type.is_some());
        assert!(interface.funcs[1].return_type.is_none());
    }

    #[test]
    fn top_level_error_recovery() {
        let src = b"package t
fun orphan()
public class Good {
}
";
        let (file, diagnostics) = parse(FILENAME, src);
        assert_eq!(file.decls.len(), 2, "{:?}", file.decls);
        assert_eq!(
            file.decls[0],
            Decl::Bad(BadDecl {
                from: pos(2, 1),
                to: pos(3, 1),
            })
        );
        let Decl::Class(class) = &file.decls[1] else {
            panic!("expected the class to survive recovery, got {:?}", file.decls[1]);
        };
        assert_eq!(class.name.content, "Good");
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(
            diagnostics[0].to_string(),
            "test.lz:2:1: expected declaration, found <FUN> fun"
        );
    }

    // ------------------------------------------------------------------
    // The example program
    // ------------------------------------------------------------------

    #[test]
    fn example_file() {
        let src = b"package example

import io
import lib::simple/beautydate as date

public class Example {
\tpublic fun main(args []string) {
\t\tio.print(date.now())
\t}
}";
        let (file, diagnostics) = parse("example.lz", src);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let p = |line, col| Position::new("example.lz", line, col);
        let id = |name: &str, line, col| Token::new(TokenType::Ident, p(line, col), name);

        let expected = File {
            package: PackageDecl {
                package: p(1, 1),
                name: id("example", 1, 9),
            },
            imports: vec![
                ImportDecl {
                    import: p(3, 1),
                    path: ImportPath {
                        library: None,
                        path: vec![id("io", 3, 8)],
                    },
                    as_pos: None,
                    alias: None,
                },
                ImportDecl {
                    import: p(4, 1),
                    path: ImportPath {
                        library: Some(id("lib", 4, 8)),
                        path: vec![id("simple", 4, 13), id("beautydate", 4, 20)],
                    },
                    as_pos: Some(p(4, 31)),
                    alias: Some(id("date", 4, 34)),
                },
            ],
            decls: vec![Decl::Class(ClassDecl {
                visibility: Some(Token::new(TokenType::Public, p(6, 1), "public")),
                class: p(6, 8),
                name: id("Example", 6, 14),
                implements: Vec::new(),
                lbrace: p(6, 22),
                consts: Vec::new(),
                vars: Vec::new(),
                methods: vec![FuncDecl {
                    visibility: Some(Token::new(TokenType::Public, p(7, 2), "public")),
                    fun: p(7, 9),
                    name: id("main", 7, 13),
                    params: vec![ParameterDef {
                        name: id("args", 7, 18),
                        ty: Type::Array(ArrayType {
                            lbrack: p(7, 23),
                            rbrack: p(7, 24),
                            elt: Box::new(Type::Basic(BasicType {
                                ident: id("string", 7, 25),
                            })),
                        }),
                    }],
                    return_type: None,
                    body: BlockStmt {
                        lbrace: p(7, 33),
                        stmts: vec![Stmt::Expr(ExprStmt {
                            expr: Expr::Call(CallExpr {
                                fun: Box::new(Expr::Selector(SelectorExpr {
                                    x: Box::new(Expr::Ident(Ident {
                                        token: id("io", 8, 3),
                                    })),
                                    sel: Ident {
                                        token: id("print", 8, 6),
                                    },
                                })),
                                lparen: p(8, 11),
                                args: vec![Expr::Call(CallExpr {
                                    fun: Box::new(Expr::Selector(SelectorExpr {
                                        x: Box::new(Expr::Ident(Ident {
                                            token: id("date", 8, 12),
                                        })),
                                        sel: Ident {
                                            token: id("now", 8, 17),
                                        },
                                    })),
                                    lparen: p(8, 20),
                                    args: Vec::new(),
                                    rparen: p(8, 21),
                                })],
                                rparen: p(8, 22),
                            }),
                        })],
                        rbrace: p(9, 2),
                    },
                }],
                rbrace: p(10, 1),
            })],
        };

        assert_eq!(file, expected);
    }

    #[test]
    fn example_file_ranges_contain_children() {
        let src = b"package example

import io
import lib::simple/beautydate as date

public class Example {
\tpublic fun main(args []string) {
\t\tcount := 0
\t\tfor const i := 0; i < 10; i++ {
\t\t\tcount += i * 2
\t\t}
\t\tif count > 10 {
\t\t\treturn
\t\t} else {
\t\t\tio.print([count], {count: \"big\"}, (1, 2))
\t\t}
\t}
}";
        let (file, diagnostics) = parse("example.lz", src);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        check_file(&file);
    }

    // --- range containment walker -------------------------------------

    fn at_or_before(a: &Position, b: &Position) -> bool {
        (a.line, a.column) <= (b.line, b.column)
    }

    fn check_contains(parent: (&Position, &Position), child: (Position, Position)) {
        assert!(
            at_or_before(parent.0, &child.0) && at_or_before(&child.1, parent.1),
            "child range {}..{} escapes parent range {}..{}",
            child.0,
            child.1,
            parent.0,
            parent.1,
        );
    }

    fn check_file(file: &File) {
        let range = (file.pos(), file.end());
        let range = (&range.0, &range.1);
        check_contains(range, (file.package.pos(), file.package.end()));
        for decl in &file.decls {
            check_contains(range, (decl.pos(), decl.end()));
            check_decl(decl);
        }
    }

    fn check_decl(decl: &Decl) {
        let range = (decl.pos(), decl.end());
        let range = (&range.0, &range.1);
        match decl {
            Decl::Const(decl) => {
                check_contains(range, (decl.value.pos(), decl.value.end()));
                check_expr(&decl.value);
            }
            Decl::Var(decl) => {
                check_contains(range, (decl.value.pos(), decl.value.end()));
                check_expr(&decl.value);
            }
            Decl::Class(class) => {
                for member in &class.consts {
                    check_contains(range, (member.pos(), member.end()));
                }
                for member in &class.vars {
                    check_contains(range, (member.pos(), member.end()));
                }
                for method in &class.methods {
                    check_contains(range, (method.pos(), method.end()));
                    check_stmts(&method.body.stmts, (&method.body.pos(), &method.body.end()));
                }
            }
            Decl::Interface(interface) => {
                for member in &interface.consts {
                    check_contains(range, (member.pos(), member.end()));
                }
                for func in &interface.funcs {
                    check_contains(range, (func.pos(), func.end()));
                }
            }
            Decl::Func(func) => {
                check_contains(range, (func.body.pos(), func.body.end()));
            }
            _ => {}
        }
    }

    fn check_stmts(stmts: &[Stmt], parent: (&Position, &Position)) {
        for stmt in stmts {
            check_contains(parent, (stmt.pos(), stmt.end()));
            check_stmt(stmt);
        }
    }

    fn check_stmt(stmt: &Stmt) {
        let range = (stmt.pos(), stmt.end());
        let range = (&range.0, &range.1);
        match stmt {
            Stmt::Decl(decl_stmt) => check_decl(&decl_stmt.decl),
            Stmt::Expr(expr_stmt) => {
                check_contains(range, (expr_stmt.expr.pos(), expr_stmt.expr.end()));
                check_expr(&expr_stmt.expr);
            }
            Stmt::IncDec(inc_dec) => {
                check_contains(range, (inc_dec.expr.pos(), inc_dec.expr.end()));
            }
            Stmt::Assign(assign) => {
                check_contains(range, (assign.lhs.pos(), assign.lhs.end()));
                check_contains(range, (assign.rhs.pos(), assign.rhs.end()));
                check_expr(&assign.lhs);
                check_expr(&assign.rhs);
            }
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    check_contains(range, (value.pos(), value.end()));
                    check_expr(value);
                }
            }
            Stmt::Block(block) => check_stmts(&block.stmts, range),
            Stmt::If(if_stmt) => {
                check_contains(range, (if_stmt.cond.pos(), if_stmt.cond.end()));
                check_contains(range, (if_stmt.body.pos(), if_stmt.body.end()));
                check_stmts(&if_stmt.body.stmts, (&if_stmt.body.pos(), &if_stmt.body.end()));
                if let Some(else_stmt) = &if_stmt.else_stmt {
                    check_contains(range, (else_stmt.pos(), else_stmt.end()));
                    if let Some(body) = &else_stmt.body {
                        check_stmts(&body.stmts, (&body.pos(), &body.end()));
                    }
                }
            }
            Stmt::Match(match_stmt) => {
                check_contains(range, (match_stmt.expr.pos(), match_stmt.expr.end()));
                for case in &match_stmt.cases {
                    check_contains(range, (case.pos(), case.end()));
                    check_stmts(&case.body, (&case.pos(), &case.end()));
                }
            }
            Stmt::For(for_stmt) => {
                for decl in &for_stmt.decls {
                    check_contains(range, (decl.pos(), decl.end()));
                }
                if let Some(cond) = &for_stmt.cond {
                    check_contains(range, (cond.pos(), cond.end()));
                }
                if let Some(post) = &for_stmt.post {
                    check_contains(range, (post.pos(), post.end()));
                }
                check_stmts(&for_stmt.body.stmts, (&for_stmt.body.pos(), &for_stmt.body.end()));
            }
            Stmt::Branch(_) => {}
        }
    }

    fn check_expr(expr: &Expr) {
        let range = (expr.pos(), expr.end());
        let range = (&range.0, &range.1);
        match expr {
            Expr::Array(array) => {
                for elt in &array.elts {
                    check_contains(range, (elt.pos(), elt.end()));
                    check_expr(elt);
                }
            }
            Expr::Map(map) => {
                for entry in &map.entries {
                    check_contains(range, (entry.pos(), entry.end()));
                    check_expr(&entry.key);
                    check_expr(&entry.value);
                }
            }
            Expr::Tuple(tuple) => {
                for elt in &tuple.elts {
                    check_contains(range, (elt.pos(), elt.end()));
                    check_expr(elt);
                }
            }
            Expr::Paren(paren) => {
                check_contains(range, (paren.expr.pos(), paren.expr.end()));
                check_expr(&paren.expr);
            }
            Expr::Selector(selector) => {
                check_contains(range, (selector.x.pos(), selector.x.end()));
                check_expr(&selector.x);
            }
            Expr::Index(index) => {
                check_contains(range, (index.x.pos(), index.x.end()));
                check_contains(range, (index.index.pos(), index.index.end()));
                check_expr(&index.x);
                check_expr(&index.index);
            }
            Expr::Call(call) => {
                check_contains(range, (call.fun.pos(), call.fun.end()));
                check_expr(&call.fun);
                for arg in &call.args {
                    check_contains(range, (arg.pos(), arg.end()));
                    check_expr(arg);
                }
            }
            Expr::Unary(unary) => {
                check_contains(range, (unary.x.pos(), unary.x.end()));
                check_expr(&unary.x);
            }
            Expr::Binary(binary) => {
                check_contains(range, (binary.x.pos(), binary.x.end()));
                check_contains(range, (binary.y.pos(), binary.y.end()));
                check_expr(&binary.x);
                check_expr(&binary.y);
            }
            Expr::Ident(_) | Expr::Basic(_) => {}
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    #[test]
    fn precedence_table() {
        assert_eq!(precedence(TokenType::Lor), 1);
        assert_eq!(precedence(TokenType::Land), 2);
        for ty in [
            TokenType::Eql,
            TokenType::Lss,
            TokenType::Gtr,
            TokenType::Neq,
            TokenType::Leq,
            TokenType::Geq,
        ] {
            assert_eq!(precedence(ty), 3, "{ty}");
        }
        for ty in [TokenType::Add, TokenType::Sub, TokenType::Or, TokenType::Xor] {
            assert_eq!(precedence(ty), 4, "{ty}");
        }
        for ty in [
            TokenType::Mul,
            TokenType::Div,
            TokenType::Rem,
            TokenType::And,
            TokenType::Shl,
            TokenType::Shr,
        ] {
            assert_eq!(precedence(ty), 5, "{ty}");
        }
        assert_eq!(precedence(TokenType::Inc), LOWEST_PREC);
        assert_eq!(precedence(TokenType::Assign), LOWEST_PREC);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let mut parser = Parser::new(FILENAME, b"a + 1 * b");
        let expr = parser.parse_expr();
        assert!(parser.diagnostics().is_empty());

        let Expr::Binary(add) = expr else {
            panic!("expected a binary expression, got {expr:?}");
        };
        assert_eq!(add.op.ty, TokenType::Add);
        assert_eq!(
            *add.x,
            Expr::Ident(Ident {
                token: ident("a", 1, 1)
            })
        );
        let Expr::Binary(mul) = *add.y else {
            panic!("expected `1 * b` on the right, got {:?}", add.y);
        };
        assert_eq!(mul.op.ty, TokenType::Mul);
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let mut parser = Parser::new(FILENAME, b"a - b - c");
        let Expr::Binary(outer) = parser.parse_expr() else {
            panic!("expected a binary expression");
        };
        // (a - b) - c
        assert!(matches!(*outer.x, Expr::Binary(_)));
        assert!(matches!(
            *outer.y,
            Expr::Ident(Ident { ref token }) if token.content == "c"
        ));
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        let mut parser = Parser::new(FILENAME, b"-a * b");
        let Expr::Binary(mul) = parser.parse_expr() else {
            panic!("expected a binary expression");
        };
        assert_eq!(mul.op.ty, TokenType::Mul);
        assert!(matches!(*mul.x, Expr::Unary(_)));
    }

    #[test]
    fn postfix_chain() {
        let mut parser = Parser::new(FILENAME, b"a.b[0](c)");
        let expr = parser.parse_expr();
        assert!(parser.diagnostics().is_empty());

        let Expr::Call(call) = expr else {
            panic!("expected a call, got {expr:?}");
        };
        assert_eq!(call.args.len(), 1);
        let Expr::Index(index) = *call.fun else {
            panic!("expected an index expression under the call");
        };
        let Expr::Selector(selector) = *index.x else {
            panic!("expected a selector under the index");
        };
        assert_eq!(selector.sel.token.content, "b");
    }

    #[test]
    fn parenthesized_group_is_always_a_tuple() {
        for (src, len) in [(&b"()"[..], 0), (&b"(a)"[..], 1), (&b"(a, b)"[..], 2)] {
            let mut parser = Parser::new(FILENAME, src);
            let expr = parser.parse_expr();
            let Expr::Tuple(tuple) = expr else {
                panic!("expected a tuple literal for {src:?}, got {expr:?}");
            };
            assert_eq!(tuple.elts.len(), len);
            assert!(parser.diagnostics().is_empty());
        }
    }

    #[test]
    fn array_and_map_literals() {
        let mut parser = Parser::new(FILENAME, b"[1, 2]");
        let Expr::Array(array) = parser.parse_expr() else {
            panic!("expected an array literal");
        };
        assert_eq!(array.elts.len(), 2);
        assert_eq!(array.lbrack, pos(1, 1));
        assert_eq!(array.rbrack, pos(1, 6));

        let mut parser = Parser::new(FILENAME, b"{a: 1, b: 2}");
        let Expr::Map(map) = parser.parse_expr() else {
            panic!("expected a map literal");
        };
        assert_eq!(map.entries.len(), 2);
        assert_eq!(map.entries[0].colon, pos(1, 3));
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn malformed_operand_recovers() {
        let mut parser = Parser::new(FILENAME, b"a + ,");
        let expr = parser.parse_expr();
        assert!(matches!(expr, Expr::Binary(_)));
        let diagnostics = parser.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "test.lz:1:5: expected expression, found <COMMA> ,"
        );
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    #[test]
    fn type_dispatch() {
        let mut parser = Parser::new(FILENAME, b"int");
        assert_eq!(
            parser.parse_type(),
            Type::Basic(BasicType {
                ident: ident("int", 1, 1)
            })
        );

        let mut parser = Parser::new(FILENAME, b"pkg.Type");
        assert_eq!(
            parser.parse_type(),
            Type::Selector(SelectorType {
                package: ident("pkg", 1, 1),
                sel: ident("Type", 1, 5),
            })
        );

        let mut parser = Parser::new(FILENAME, b"[]int");
        assert_eq!(
            parser.parse_type(),
            Type::Array(ArrayType {
                lbrack: pos(1, 1),
                rbrack: pos(1, 2),
                elt: Box::new(Type::Basic(BasicType {
                    ident: ident("int", 1, 3)
                })),
            })
        );

        let mut parser = Parser::new(FILENAME, b"{string: int}");
        assert_eq!(
            parser.parse_type(),
            Type::Map(MapType {
                lbrace: pos(1, 1),
                key: Box::new(Type::Basic(BasicType {
                    ident: ident("string", 1, 2)
                })),
                value: Box::new(Type::Basic(BasicType {
                    ident: ident("int", 1, 10)
                })),
                rbrace: pos(1, 13),
            })
        );

        let mut parser = Parser::new(FILENAME, b"(int, []string)");
        let Type::Tuple(tuple) = parser.parse_type() else {
            panic!("expected a tuple type");
        };
        assert_eq!(tuple.elts.len(), 2);
        assert!(matches!(tuple.elts[1], Type::Array(_)));
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    #[test]
    fn var_decl_statements() {
        let mut parser = Parser::new(FILENAME, b"x := 1\n");
        let Stmt::Decl(DeclStmt { decl: Decl::Var(var) }) = parser.parse_stmt() else {
            panic!("expected a variable declaration");
        };
        assert_eq!(var.ident.content, "x");
        assert!(var.ty.is_none());

        let mut parser = Parser::new(FILENAME, b"x []int := y\n");
        let Stmt::Decl(DeclStmt { decl: Decl::Var(var) }) = parser.parse_stmt() else {
            panic!("expected a typed variable declaration");
        };
        assert!(matches!(var.ty, Some(Type::Array(_))));
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn index_assignment_is_not_a_var_decl() {
        let mut parser = Parser::new(FILENAME, b"a[0] = 1\n");
        let Stmt::Assign(assign) = parser.parse_stmt() else {
            panic!("expected an assignment");
        };
        assert_eq!(assign.assign.ty, TokenType::Assign);
        assert!(matches!(assign.lhs, Expr::Index(_)));
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn compound_assignment_and_inc_dec() {
        let mut parser = Parser::new(FILENAME, b"a <<= 2\n");
        let Stmt::Assign(assign) = parser.parse_stmt() else {
            panic!("expected an assignment");
        };
        assert_eq!(assign.assign.ty, TokenType::ShlAssign);

        let mut parser = Parser::new(FILENAME, b"i++\n");
        let Stmt::IncDec(inc_dec) = parser.parse_stmt() else {
            panic!("expected an inc/dec statement");
        };
        assert_eq!(inc_dec.op.ty, TokenType::Inc);
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn return_statements() {
        let mut parser = Parser::new(FILENAME, b"return\n");
        let Stmt::Return(ret) = parser.parse_stmt() else {
            panic!("expected a return statement");
        };
        assert!(ret.value.is_none());

        let mut parser = Parser::new(FILENAME, b"return x + 1\n");
        let Stmt::Return(ret) = parser.parse_stmt() else {
            panic!("expected a return statement");
        };
        assert!(matches!(ret.value, Some(Expr::Binary(_))));
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn branch_statements() {
        let mut parser = Parser::new(FILENAME, b"break\n");
        let Stmt::Branch(branch) = parser.parse_stmt() else {
            panic!("expected a branch statement");
        };
        assert_eq!(branch.tok.ty, TokenType::Break);

        let mut parser = Parser::new(FILENAME, b"continue\n");
        let Stmt::Branch(branch) = parser.parse_stmt() else {
            panic!("expected a branch statement");
        };
        assert_eq!(branch.tok.ty, TokenType::Continue);
    }

    #[test]
    fn if_else_chain() {
        let src = b"if a < b {
\tc = d
} else if e {
} else {
}
";
        let mut parser = Parser::new(FILENAME, src);
        let Stmt::If(if_stmt) = parser.parse_stmt() else {
            panic!("expected an if statement");
        };
        assert!(parser.diagnostics().is_empty());

        assert_eq!(if_stmt.body.stmts.len(), 1);
        let else_stmt = if_stmt.else_stmt.expect("expected an else clause");
        let nested = else_stmt.if_stmt.expect("expected an else-if");
        assert!(nested.else_stmt.is_some());
        let last = nested.else_stmt.expect("expected the final else");
        assert!(last.if_stmt.is_none());
        assert!(last.body.is_some());
    }

    #[test]
    fn match_statement() {
        let src = b"match x {
case 1:
\ty = 2
case other:
default:
\tz = 3
}
";
        let mut parser = Parser::new(FILENAME, src);
        let Stmt::Match(match_stmt) = parser.parse_stmt() else {
            panic!("expected a match statement");
        };
        assert!(parser.diagnostics().is_empty());

        assert_eq!(match_stmt.cases.len(), 3);
        assert!(match_stmt.cases[0].pattern.is_some());
        assert_eq!(match_stmt.cases[0].body.len(), 1);
        assert!(match_stmt.cases[1].body.is_empty());
        assert!(match_stmt.cases[2].pattern.is_none());
        assert_eq!(match_stmt.cases[2].body.len(), 1);
    }

    #[test]
    fn for_statement_forms() {
        let mut parser = Parser::new(FILENAME, b"for {\n}\n");
        let Stmt::For(for_stmt) = parser.parse_stmt() else {
            panic!("expected a for statement");
        };
        assert!(for_stmt.decls.is_empty());
        assert!(for_stmt.cond.is_none());
        assert!(for_stmt.post.is_none());

        let mut parser = Parser::new(FILENAME, b"for a < b {\n}\n");
        let Stmt::For(for_stmt) = parser.parse_stmt() else {
            panic!("expected a for statement");
        };
        assert!(for_stmt.decls.is_empty());
        assert!(matches!(for_stmt.cond, Some(Expr::Binary(_))));

        // a bare identifier condition opens the body, not a map type
        let mut parser = Parser::new(FILENAME, b"for running {\n}\n");
        let Stmt::For(for_stmt) = parser.parse_stmt() else {
            panic!("expected a for statement");
        };
        assert!(for_stmt.decls.is_empty());
        assert!(matches!(for_stmt.cond, Some(Expr::Ident(_))));
        assert!(parser.diagnostics().is_empty());

        let mut parser =
            Parser::new(FILENAME, b"for i := 0, const max := 10; i < max; i++ {\n}\n");
        let Stmt::For(for_stmt) = parser.parse_stmt() else {
            panic!("expected a for statement");
        };
        assert_eq!(for_stmt.decls.len(), 2);
        assert!(matches!(for_stmt.decls[0], Decl::Var(_)));
        assert!(matches!(for_stmt.decls[1], Decl::Const(_)));
        assert!(for_stmt.cond.is_some());
        assert!(matches!(for_stmt.post.as_deref(), Some(Stmt::IncDec(_))));
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn malformed_for_init_clause_records_bad_decl() {
        let mut parser = Parser::new(FILENAME, b"for i := 0, 2; i < 3; {\n}\n");
        let Stmt::For(for_stmt) = parser.parse_stmt() else {
            panic!("expected a for statement");
        };
        assert_eq!(for_stmt.decls.len(), 2);
        assert!(matches!(for_stmt.decls[1], Decl::Bad(_)));
        assert!(for_stmt.post.is_none());

        let diagnostics = parser.diagnostics();
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(
            diagnostics[0].to_string(),
            "test.lz:1:13: expected declaration, found <INT> 2"
        );
    }

    #[test]
    fn comments_are_invisible_to_the_grammar() {
        let src = b"package t // trailing comment
/* leading
comment */
import io
";
        let (file, diagnostics) = parse(FILENAME, src);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(file.package.name.content, "t");
        assert_eq!(file.imports.len(), 1);
    }

    #[test]
    fn lexical_errors_surface_through_the_parser() {
        let (_, diagnostics) = parse(FILENAME, b"package t\nconst a := 0x\n");
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(
            diagnostics[0].to_string(),
            "test.lz:2:12: illegal hexadecimal number"
        );
    }

    #[test]
    fn parse_file_is_total_on_garbage() {
        let (_, diagnostics) = parse(FILENAME, b"+ ) } ] :: fun if else\n\n!");
        assert!(!diagnostics.is_empty());
    }

    proptest! {
        /// Parsing always completes and returns a tree, whatever the
        /// input.
        #[test]
        fn parser_is_total(src in "[ -~\\n\\t]{0,200}") {
            let (file, _) = parse("fuzz.lz", src.as_bytes());
            prop_assert_eq!(file.package.pos().filename, "fuzz.lz");
        }
    }
}
