// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Liza.
//!
//! The AST represents the structure of a Liza source file after
//! parsing. Nodes fall into four closed families — declarations
//! ([`Decl`]), expressions ([`Expr`]), statements ([`Stmt`]), and type
//! annotations ([`Type`]) — each a tagged union so consumers match
//! exhaustively over every node kind.
//!
//! # Source Ranges
//!
//! Every node spans a half-open range `[pos, end)` of source
//! [`Position`]s: `pos()` is the position of the node's first character
//! and `end()` is one past its last character. Ranges are always
//! derived from the node's tokens and children, never stored
//! separately, so a node's range contains the ranges of all of its
//! children by construction. For bracket-delimited nodes the end is the
//! closing delimiter's column plus one.
//!
//! # Construction
//!
//! Nodes are built exclusively by the parser and are immutable
//! afterwards; the tree is strictly ownership-shaped with no
//! back-references.

use crate::parse::{Position, Token};

/// Returns the position one column past `pos`.
fn one_past(pos: &Position) -> Position {
    Position {
        filename: pos.filename.clone(),
        line: pos.line,
        column: pos.column + 1,
    }
}

// ============================================================================
// File
// ============================================================================

/// A parsed source file: one package declaration, its imports, and the
/// top-level declarations in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: PackageDecl,
    pub imports: Vec<ImportDecl>,
    /// Top-level declarations: const, class, interface, or bad.
    pub decls: Vec<Decl>,
}

impl File {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.package.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match self.decls.last() {
            Some(decl) => decl.end(),
            None => self.package.end(),
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// A declaration node.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Const(ConstDecl),
    Var(VarDecl),
    Package(PackageDecl),
    Import(ImportDecl),
    Func(FuncDecl),
    FuncDef(FuncDef),
    Parameter(ParameterDef),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Bad(BadDecl),
}

impl Decl {
    /// Returns the position of the first character of the declaration.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Const(decl) => decl.pos(),
            Self::Var(decl) => decl.pos(),
            Self::Package(decl) => decl.pos(),
            Self::Import(decl) => decl.pos(),
            Self::Func(decl) => decl.pos(),
            Self::FuncDef(decl) => decl.pos(),
            Self::Parameter(decl) => decl.pos(),
            Self::Class(decl) => decl.pos(),
            Self::Interface(decl) => decl.pos(),
            Self::Bad(decl) => decl.pos(),
        }
    }

    /// Returns the position one past the last character of the
    /// declaration.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            Self::Const(decl) => decl.end(),
            Self::Var(decl) => decl.end(),
            Self::Package(decl) => decl.end(),
            Self::Import(decl) => decl.end(),
            Self::Func(decl) => decl.end(),
            Self::FuncDef(decl) => decl.end(),
            Self::Parameter(decl) => decl.end(),
            Self::Class(decl) => decl.end(),
            Self::Interface(decl) => decl.end(),
            Self::Bad(decl) => decl.end(),
        }
    }
}

/// A constant declaration: `const name [Type] := value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    /// The `public` token, if any.
    pub visibility: Option<Token>,
    /// Position of the `const` keyword.
    pub const_pos: Position,
    pub ident: Token,
    /// Declared type; absent when inferred from the value.
    pub ty: Option<Type>,
    pub value: Expr,
}

impl ConstDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        match &self.visibility {
            Some(visibility) => visibility.position.clone(),
            None => self.const_pos.clone(),
        }
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.value.end()
    }
}

/// A variable declaration: `name [Type] := value`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ident: Token,
    /// Declared type; absent when inferred from the value.
    pub ty: Option<Type>,
    pub value: Expr,
}

impl VarDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.ident.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.value.end()
    }
}

/// A package declaration: `package name`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    /// Position of the `package` keyword.
    pub package: Position,
    pub name: Token,
}

impl PackageDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.package.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.name.end()
    }
}

/// An import declaration: `import [lib ::] seg [/ seg]* [as alias]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Position of the `import` keyword.
    pub import: Position,
    pub path: ImportPath,
    /// Position of the `as` keyword, if any.
    pub as_pos: Option<Position>,
    /// The alias identifier, if any.
    pub alias: Option<Token>,
}

impl ImportDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.import.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match &self.alias {
            Some(alias) => alias.end(),
            None => self.path.end(),
        }
    }
}

/// The path of an import declaration: an optional library name before
/// `::`, then one or more `/`-separated segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPath {
    pub library: Option<Token>,
    /// Path segments; the parser always produces at least one.
    pub path: Vec<Token>,
}

impl ImportPath {
    #[must_use]
    pub fn pos(&self) -> Position {
        match (&self.library, self.path.first()) {
            (Some(library), _) => library.position.clone(),
            (None, Some(first)) => first.position.clone(),
            (None, None) => Position::new("", 1, 1),
        }
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match (self.path.last(), &self.library) {
            (Some(last), _) => last.end(),
            (None, Some(library)) => library.end(),
            (None, None) => Position::new("", 1, 1),
        }
    }
}

/// A class method: a function signature with a block body.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// The `public` token, if any.
    pub visibility: Option<Token>,
    /// Position of the `fun` keyword.
    pub fun: Position,
    pub name: Token,
    pub params: Vec<ParameterDef>,
    pub return_type: Option<Type>,
    pub body: BlockStmt,
}

impl FuncDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        match &self.visibility {
            Some(visibility) => visibility.position.clone(),
            None => self.fun.clone(),
        }
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.body.end()
    }
}

/// An interface method: a bare function signature terminated by a
/// newline.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    /// Position of the `fun` keyword.
    pub fun: Position,
    pub name: Token,
    pub params: Vec<ParameterDef>,
    /// Position of the closing `)` of the parameter list.
    pub rparen: Position,
    pub return_type: Option<Type>,
}

impl FuncDef {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.fun.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match &self.return_type {
            Some(ty) => ty.end(),
            None => one_past(&self.rparen),
        }
    }
}

/// One parameter of a function signature: `name Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDef {
    pub name: Token,
    pub ty: Type,
}

impl ParameterDef {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.name.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.ty.end()
    }
}

/// A class declaration. The body's members are partitioned by kind,
/// each list in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// The `public` token, if any.
    pub visibility: Option<Token>,
    /// Position of the `class` keyword.
    pub class: Position,
    pub name: Token,
    /// Interfaces named in the `implements` clause.
    pub implements: Vec<Type>,
    pub lbrace: Position,
    pub consts: Vec<ConstDecl>,
    pub vars: Vec<VarDecl>,
    pub methods: Vec<FuncDecl>,
    pub rbrace: Position,
}

impl ClassDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        match &self.visibility {
            Some(visibility) => visibility.position.clone(),
            None => self.class.clone(),
        }
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrace)
    }
}

/// An interface declaration. As for classes, body members are
/// partitioned by kind.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    /// The `public` token, if any.
    pub visibility: Option<Token>,
    /// Position of the `interface` keyword.
    pub interface: Position,
    pub name: Token,
    pub lbrace: Position,
    pub consts: Vec<ConstDecl>,
    pub funcs: Vec<FuncDef>,
    pub rbrace: Position,
}

impl InterfaceDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        match &self.visibility {
            Some(visibility) => visibility.position.clone(),
            None => self.interface.clone(),
        }
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrace)
    }
}

/// A placeholder for a top-level span the parser had to skip while
/// recovering from a syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct BadDecl {
    pub from: Position,
    pub to: Position,
}

impl BadDecl {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.from.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.to.clone()
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Basic(BasicLit),
    Array(ArrayLit),
    Map(MapLit),
    Tuple(TupleLit),
    Paren(ParenExpr),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Call(CallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
}

impl Expr {
    /// Returns the position of the first character of the expression.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Ident(expr) => expr.pos(),
            Self::Basic(expr) => expr.pos(),
            Self::Array(expr) => expr.pos(),
            Self::Map(expr) => expr.pos(),
            Self::Tuple(expr) => expr.pos(),
            Self::Paren(expr) => expr.pos(),
            Self::Selector(expr) => expr.pos(),
            Self::Index(expr) => expr.pos(),
            Self::Call(expr) => expr.pos(),
            Self::Unary(expr) => expr.pos(),
            Self::Binary(expr) => expr.pos(),
        }
    }

    /// Returns the position one past the last character of the
    /// expression.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            Self::Ident(expr) => expr.end(),
            Self::Basic(expr) => expr.end(),
            Self::Array(expr) => expr.end(),
            Self::Map(expr) => expr.end(),
            Self::Tuple(expr) => expr.end(),
            Self::Paren(expr) => expr.end(),
            Self::Selector(expr) => expr.end(),
            Self::Index(expr) => expr.end(),
            Self::Call(expr) => expr.end(),
            Self::Unary(expr) => expr.end(),
            Self::Binary(expr) => expr.end(),
        }
    }
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub token: Token,
}

impl Ident {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.token.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.token.end()
    }
}

/// A literal of a basic type: an integer, float, or string token.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub token: Token,
}

impl BasicLit {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.token.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.token.end()
    }
}

/// An array literal: `[elt, elt, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub lbrack: Position,
    pub elts: Vec<Expr>,
    pub rbrack: Position,
}

impl ArrayLit {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lbrack.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrack)
    }
}

/// A map literal: `{key: value, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLit {
    pub lbrace: Position,
    pub entries: Vec<KeyValueExpr>,
    pub rbrace: Position,
}

impl MapLit {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lbrace.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrace)
    }
}

/// One `key: value` entry of a map literal.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    pub key: Expr,
    /// Position of the `:` between key and value.
    pub colon: Position,
    pub value: Expr,
}

impl KeyValueExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.key.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.value.end()
    }
}

/// A tuple literal: `(elt, elt, ...)`.
///
/// The parser produces a tuple for *every* parenthesized group,
/// including zero- and one-element ones; whether a one-element tuple is
/// really a mathematical grouping is decided by a later phase.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleLit {
    pub lparen: Position,
    pub elts: Vec<Expr>,
    pub rparen: Position,
}

impl TupleLit {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lparen.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rparen)
    }
}

/// A parenthesized expression.
///
/// Defined for downstream phases; the parser itself never produces one
/// (see [`TupleLit`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub lparen: Position,
    pub expr: Box<Expr>,
    pub rparen: Position,
}

impl ParenExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lparen.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rparen)
    }
}

/// A selector expression: `x.sel`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub x: Box<Expr>,
    pub sel: Ident,
}

impl SelectorExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.x.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.sel.end()
    }
}

/// An index expression: `x[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub x: Box<Expr>,
    pub lbrack: Position,
    pub index: Box<Expr>,
    pub rbrack: Position,
}

impl IndexExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.x.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrack)
    }
}

/// A call expression: `fun(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub lparen: Position,
    pub args: Vec<Expr>,
    pub rparen: Position,
}

impl CallExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.fun.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rparen)
    }
}

/// A unary expression: `-x`, `^x`, or `!x`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Token,
    pub x: Box<Expr>,
}

impl UnaryExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.op.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.x.end()
    }
}

/// A binary expression: `x op y`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub x: Box<Expr>,
    pub op: Token,
    pub y: Box<Expr>,
}

impl BinaryExpr {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.x.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.y.end()
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Decl(DeclStmt),
    Expr(ExprStmt),
    IncDec(IncDecStmt),
    Assign(AssignStmt),
    Return(ReturnStmt),
    Branch(BranchStmt),
    Block(BlockStmt),
    If(IfStmt),
    Match(MatchStmt),
    For(ForStmt),
}

impl Stmt {
    /// Returns the position of the first character of the statement.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Decl(stmt) => stmt.pos(),
            Self::Expr(stmt) => stmt.pos(),
            Self::IncDec(stmt) => stmt.pos(),
            Self::Assign(stmt) => stmt.pos(),
            Self::Return(stmt) => stmt.pos(),
            Self::Branch(stmt) => stmt.pos(),
            Self::Block(stmt) => stmt.pos(),
            Self::If(stmt) => stmt.pos(),
            Self::Match(stmt) => stmt.pos(),
            Self::For(stmt) => stmt.pos(),
        }
    }

    /// Returns the position one past the last character of the
    /// statement.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            Self::Decl(stmt) => stmt.end(),
            Self::Expr(stmt) => stmt.end(),
            Self::IncDec(stmt) => stmt.end(),
            Self::Assign(stmt) => stmt.end(),
            Self::Return(stmt) => stmt.end(),
            Self::Branch(stmt) => stmt.end(),
            Self::Block(stmt) => stmt.end(),
            Self::If(stmt) => stmt.end(),
            Self::Match(stmt) => stmt.end(),
            Self::For(stmt) => stmt.end(),
        }
    }
}

/// A statement holding a const or variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    /// The declaration; always a const or variable declaration.
    pub decl: Decl,
}

impl DeclStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.decl.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.decl.end()
    }
}

/// A standalone expression in statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
}

impl ExprStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.expr.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.expr.end()
    }
}

/// An increment or decrement statement: `expr++` or `expr--`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncDecStmt {
    pub expr: Expr,
    /// The `++` or `--` token.
    pub op: Token,
}

impl IncDecStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.expr.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.op.end()
    }
}

/// An assignment statement: `lhs op rhs` for `=` or a compound
/// assignment operator.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Expr,
    /// The assignment token.
    pub assign: Token,
    pub rhs: Expr,
}

impl AssignStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lhs.pos()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.rhs.end()
    }
}

/// A return statement with an optional value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    /// The `return` token.
    pub ret: Token,
    pub value: Option<Expr>,
}

impl ReturnStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.ret.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match &self.value {
            Some(value) => value.end(),
            None => self.ret.end(),
        }
    }
}

/// A break or continue statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    /// The `break` or `continue` keyword token.
    pub tok: Token,
}

impl BranchStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.tok.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.tok.end()
    }
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub lbrace: Position,
    pub stmts: Vec<Stmt>,
    pub rbrace: Position,
}

impl BlockStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lbrace.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrace)
    }
}

/// An if statement with an optional else clause.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// Position of the `if` keyword.
    pub if_pos: Position,
    pub cond: Expr,
    pub body: BlockStmt,
    pub else_stmt: Option<Box<ElseStmt>>,
}

impl IfStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.if_pos.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match &self.else_stmt {
            Some(else_stmt) => else_stmt.end(),
            None => self.body.end(),
        }
    }
}

/// The else clause of an if statement: either a nested `if` or a block,
/// never both.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseStmt {
    /// Position of the `else` keyword.
    pub else_pos: Position,
    /// The nested `else if`, if this clause chains.
    pub if_stmt: Option<Box<IfStmt>>,
    /// The else body; `None` when `if_stmt` is set.
    pub body: Option<BlockStmt>,
}

impl ElseStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.else_pos.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        if let Some(if_stmt) = &self.if_stmt {
            return if_stmt.end();
        }
        match &self.body {
            Some(body) => body.end(),
            // a clause with neither arm spans just the keyword
            None => Position {
                filename: self.else_pos.filename.clone(),
                line: self.else_pos.line,
                column: self.else_pos.column + 4,
            },
        }
    }
}

/// A match statement with its ordered case clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStmt {
    /// Position of the `match` keyword.
    pub match_pos: Position,
    pub expr: Expr,
    pub lbrace: Position,
    pub cases: Vec<CaseClause>,
    pub rbrace: Position,
}

impl MatchStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.match_pos.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrace)
    }
}

/// One `case pattern:` or `default:` clause of a match statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    /// Position of the `case` or `default` keyword.
    pub case_pos: Position,
    /// The matched pattern; `None` for `default`.
    pub pattern: Option<Expr>,
    /// Position of the `:` after the pattern.
    pub colon: Position,
    pub body: Vec<Stmt>,
}

impl CaseClause {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.case_pos.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        match self.body.last() {
            Some(stmt) => stmt.end(),
            None => self.colon.clone(),
        }
    }
}

/// A for loop in any of its three forms; unused clauses are empty or
/// `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// Position of the `for` keyword.
    pub for_pos: Position,
    /// Init clauses of the classic form: const or variable
    /// declarations.
    pub decls: Vec<Decl>,
    pub cond: Option<Expr>,
    /// Post-iteration statement of the classic form.
    pub post: Option<Box<Stmt>>,
    pub body: BlockStmt,
}

impl ForStmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.for_pos.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.body.end()
    }
}

// ============================================================================
// Types
// ============================================================================

/// A type annotation node.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Basic(BasicType),
    Selector(SelectorType),
    Array(ArrayType),
    Map(MapType),
    Tuple(TupleType),
}

impl Type {
    /// Returns the position of the first character of the type.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Basic(ty) => ty.pos(),
            Self::Selector(ty) => ty.pos(),
            Self::Array(ty) => ty.pos(),
            Self::Map(ty) => ty.pos(),
            Self::Tuple(ty) => ty.pos(),
        }
    }

    /// Returns the position one past the last character of the type.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            Self::Basic(ty) => ty.end(),
            Self::Selector(ty) => ty.end(),
            Self::Array(ty) => ty.end(),
            Self::Map(ty) => ty.end(),
            Self::Tuple(ty) => ty.end(),
        }
    }
}

/// A type named by a bare identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicType {
    pub ident: Token,
}

impl BasicType {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.ident.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.ident.end()
    }
}

/// A type from another package: `package.Name`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorType {
    pub package: Token,
    pub sel: Token,
}

impl SelectorType {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.package.position.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.sel.end()
    }
}

/// An array type: `[]Elt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub lbrack: Position,
    pub rbrack: Position,
    pub elt: Box<Type>,
}

impl ArrayType {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lbrack.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        self.elt.end()
    }
}

/// A map type: `{Key: Value}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub lbrace: Position,
    pub key: Box<Type>,
    pub value: Box<Type>,
    pub rbrace: Position,
}

impl MapType {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lbrace.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rbrace)
    }
}

/// A tuple type: `(T, U, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleType {
    pub lparen: Position,
    pub elts: Vec<Type>,
    pub rparen: Position,
}

impl TupleType {
    #[must_use]
    pub fn pos(&self) -> Position {
        self.lparen.clone()
    }

    #[must_use]
    pub fn end(&self) -> Position {
        one_past(&self.rparen)
    }
}
