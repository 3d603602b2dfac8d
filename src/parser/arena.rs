//! Arena storage for AST nodes and literal values
//!
//! The original design hands out raw bump-allocated node pointers and keeps a
//! side list of heap objects to release when the arena dies. Here the arena
//! is an index-based handle table: nodes live in typed vectors, handles are
//! small copyable indices that stay valid as the vectors grow, and the
//! owned-value list holds one [`ValueRef`] per adopted literal so a single
//! drop releases node storage and values uniformly.
//!
//! The builder methods double as the validation layer: a handle that does
//! not belong to this arena, an empty identifier, or a constant value that
//! was never [`adopt`](AstArena::adopt)ed is reported as a `ValueError`
//! naming the offending field and node kind. The parser treats such an error
//! as hard and aborts all in-flight backtracking.

use crate::parser::ast::{Expr, ExprKind, ExprRef, ModNode, Operator, Span, Stmt, StmtKind, StmtRef, UnaryOperator};
use crate::runtime::{ParseError, Value, ValueRef};
use std::rc::Rc;

/// Owns every AST node and every literal value of one parse.
#[derive(Debug, Default)]
pub struct AstArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    values: Vec<ValueRef>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal value with the arena and get back the shared
    /// handle to embed in a `Constant` node. The arena keeps its own
    /// reference until it is dropped.
    pub fn adopt(&mut self, value: Value) -> ValueRef {
        let rc = Rc::new(value);
        self.values.push(Rc::clone(&rc));
        rc
    }

    /// Number of values the arena currently owns.
    pub fn owned_values(&self) -> usize {
        self.values.len()
    }

    /// Look up an expression node.
    pub fn expr(&self, r: ExprRef) -> &Expr {
        &self.exprs[r.0 as usize]
    }

    /// Look up a statement node.
    pub fn stmt(&self, r: StmtRef) -> &Stmt {
        &self.stmts[r.0 as usize]
    }

    fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprRef {
        let r = ExprRef(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, span });
        r
    }

    fn push_stmt(&mut self, kind: StmtKind, span: Span) -> StmtRef {
        let r = StmtRef(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        r
    }

    fn check_expr_field(&self, r: ExprRef, field: &str, node: &str) -> Result<(), ParseError> {
        if (r.0 as usize) < self.exprs.len() {
            Ok(())
        } else {
            Err(ParseError::value(format!(
                "field '{}' is required for {}",
                field, node
            )))
        }
    }

    fn check_stmt_field(&self, r: StmtRef, field: &str, node: &str) -> Result<(), ParseError> {
        if (r.0 as usize) < self.stmts.len() {
            Ok(())
        } else {
            Err(ParseError::value(format!(
                "field '{}' is required for {}",
                field, node
            )))
        }
    }

    /// Build a binary operation node.
    pub fn bin_op(
        &mut self,
        left: ExprRef,
        op: Operator,
        right: ExprRef,
        span: Span,
    ) -> Result<ExprRef, ParseError> {
        self.check_expr_field(left, "left", "BinOp")?;
        self.check_expr_field(right, "right", "BinOp")?;
        Ok(self.push_expr(ExprKind::BinOp { left, op, right }, span))
    }

    /// Build a unary operation node.
    pub fn unary_op(
        &mut self,
        op: UnaryOperator,
        operand: ExprRef,
        span: Span,
    ) -> Result<ExprRef, ParseError> {
        self.check_expr_field(operand, "operand", "UnaryOp")?;
        Ok(self.push_expr(ExprKind::UnaryOp { op, operand }, span))
    }

    /// Build a constant node. `value` must have been handed out by
    /// [`adopt`](AstArena::adopt) on this arena.
    pub fn constant(
        &mut self,
        value: ValueRef,
        kind: Option<String>,
        span: Span,
    ) -> Result<ExprRef, ParseError> {
        if !self.values.iter().any(|v| Rc::ptr_eq(v, &value)) {
            return Err(ParseError::value(
                "field 'value' is required for Constant",
            ));
        }
        Ok(self.push_expr(ExprKind::Constant { value, kind }, span))
    }

    /// Build a name node.
    pub fn name(&mut self, id: String, span: Span) -> Result<ExprRef, ParseError> {
        if id.is_empty() {
            return Err(ParseError::value("field 'id' is required for Name"));
        }
        Ok(self.push_expr(ExprKind::Name { id }, span))
    }

    /// Build an expression statement.
    pub fn expr_stmt(&mut self, value: ExprRef, span: Span) -> Result<StmtRef, ParseError> {
        self.check_expr_field(value, "value", "Expr")?;
        Ok(self.push_stmt(StmtKind::Expr { value }, span))
    }

    /// Build a pass statement.
    pub fn pass_stmt(&mut self, span: Span) -> StmtRef {
        self.push_stmt(StmtKind::Pass, span)
    }

    /// Build the root for whole-file input.
    pub fn module(&self, body: Vec<StmtRef>) -> Result<ModNode, ParseError> {
        for s in &body {
            self.check_stmt_field(*s, "body", "Module")?;
        }
        Ok(ModNode::Module { body })
    }

    /// Build the root for a single interactive statement.
    pub fn interactive(&self, body: Vec<StmtRef>) -> Result<ModNode, ParseError> {
        for s in &body {
            self.check_stmt_field(*s, "body", "Interactive")?;
        }
        Ok(ModNode::Interactive { body })
    }

    /// Build the root for a single expression.
    pub fn expression(&self, body: ExprRef) -> Result<ModNode, ParseError> {
        self.check_expr_field(body, "body", "Expression")?;
        Ok(ModNode::Expression { body })
    }
}
