//! AST node definitions for the Adder front end
//!
//! Nodes are tagged sum types stored in the [`AstArena`](crate::parser::arena::AstArena)
//! and referred to through copyable handles ([`ExprRef`], [`StmtRef`]).
//! Every statement and expression carries a [`Span`] with 1-based line
//! numbers and 0-based column offsets, exactly as the tokenizer stamps them.

use crate::runtime::ValueRef;

/// Source span of a token or node.
///
/// `lineno`/`end_lineno` are 1-based; the column offsets are 0-based counts
/// from the start of the corresponding line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub lineno: usize,
    pub col_offset: usize,
    pub end_lineno: usize,
    pub end_col_offset: usize,
}

impl Span {
    pub fn new(lineno: usize, col_offset: usize, end_lineno: usize, end_col_offset: usize) -> Self {
        Self {
            lineno,
            col_offset,
            end_lineno,
            end_col_offset,
        }
    }
}

/// Handle to an expression stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprRef(pub(crate) u32);

/// Handle to a statement stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StmtRef(pub(crate) u32);

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

/// Module-level AST root, tagged by the parse mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ModNode {
    /// Whole-file input.
    Module { body: Vec<StmtRef> },
    /// A single interactive statement.
    Interactive { body: Vec<StmtRef> },
    /// A single expression (eval or string mode).
    Expression { body: ExprRef },
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement kinds the grammar subset can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An expression evaluated for its value.
    Expr { value: ExprRef },
    /// No-op; also synthesized for a bare newline in interactive mode.
    Pass,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression kinds the grammar subset can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    BinOp {
        left: ExprRef,
        op: Operator,
        right: ExprRef,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: ExprRef,
    },
    /// A literal constant. `kind` is reserved for literal-kind tags (the
    /// `u` string prefix); plain literals leave it empty.
    Constant {
        value: ValueRef,
        kind: Option<String>,
    },
    Name {
        id: String,
    },
}
