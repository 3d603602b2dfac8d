//! Statement and entry-mode grammar rules
//!
//! The four entry rules (one per [`ParseMode`](crate::parser::parse::ParseMode))
//! and the statement layer above expressions. Compound statements are not in
//! the implemented subset: a statement is one simple statement terminated by
//! a newline.

use crate::parser::ast::{ModNode, StmtRef};
use crate::parser::parse::{Parser, Rule};
use crate::parser::token::TokenKind;

impl Parser {
    // file: statements? $
    pub(crate) fn file_mode(&mut self) -> Option<ModNode> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(r) = self.alt(mark, |p| {
            let inner = p.mark;
            let body = match p.statements() {
                Some(b) => b,
                None => {
                    p.mark = inner;
                    Vec::new()
                }
            };
            if p.error_indicator {
                return None;
            }
            p.expect(TokenKind::EndMarker)?;
            let root = p.arena.module(body);
            p.build(root)
        }) {
            return Some(r);
        }
        None
    }

    // interactive: statement_newline
    pub(crate) fn interactive_mode(&mut self) -> Option<ModNode> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(body) = self.alt(mark, |p| p.statement_newline()) {
            let root = self.arena.interactive(body);
            return self.build(root);
        }
        None
    }

    // eval: expressions NEWLINE* $
    pub(crate) fn eval_mode(&mut self) -> Option<ModNode> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(r) = self.alt(mark, |p| {
            let body = p.star_expressions()?;
            while p.expect(TokenKind::Newline).is_some() {}
            if p.error_indicator {
                return None;
            }
            p.expect(TokenKind::EndMarker)?;
            let root = p.arena.expression(body);
            p.build(root)
        }) {
            return Some(r);
        }
        None
    }

    // string: star_expressions
    pub(crate) fn string_mode(&mut self) -> Option<ModNode> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(body) = self.alt(mark, |p| p.star_expressions()) {
            let root = self.arena.expression(body);
            return self.build(root);
        }
        None
    }

    // statements: statement+
    pub(crate) fn statements(&mut self) -> Option<Vec<StmtRef>> {
        if self.error_indicator {
            return None;
        }
        let mut all = Vec::new();
        loop {
            let mark = self.mark;
            match self.statement() {
                Some(seq) => all.extend(seq),
                None => {
                    self.mark = mark;
                    break;
                }
            }
            if self.error_indicator {
                return None;
            }
        }
        if all.is_empty() {
            None
        } else {
            Some(all)
        }
    }

    // statement: compound_stmt | simple_stmts
    //
    // Compound statements are not in the subset yet.
    pub(crate) fn statement(&mut self) -> Option<Vec<StmtRef>> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(r) = self.alt(mark, |p| p.simple_statements()) {
            return Some(r);
        }
        None
    }

    // statement_newline: compound_stmt NEWLINE | simple_stmts | NEWLINE | $
    pub(crate) fn statement_newline(&mut self) -> Option<Vec<StmtRef>> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        let start = self.rule_start()?;
        if let Some(r) = self.alt(mark, |p| p.simple_statements()) {
            return Some(r);
        }
        if let Some(r) = self.alt(mark, |p| {
            p.expect(TokenKind::Newline)?;
            let span = p.node_span(start)?;
            let stmt = p.arena.pass_stmt(span);
            Some(vec![stmt])
        }) {
            return Some(r);
        }
        if let Some(r) = self.alt(mark, |p| {
            p.expect(TokenKind::EndMarker)?;
            p.interactive_exit()
        }) {
            return Some(r);
        }
        None
    }

    // simple_statements: simple_statement NEWLINE
    pub(crate) fn simple_statements(&mut self) -> Option<Vec<StmtRef>> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(r) = self.alt(mark, |p| {
            let stmt = p.simple_statement()?;
            p.expect(TokenKind::Newline)?;
            Some(vec![stmt])
        }) {
            return Some(r);
        }
        None
    }

    // simple_statement:
    //     | assignment
    //     | star_expressions
    //     | &'return' return_statement
    //     | 'pass'
    //     | 'break'
    //     | 'continue'
    pub(crate) fn simple_statement(&mut self) -> Option<StmtRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_stmt(Rule::SimpleStatement) {
            return hit;
        }
        let mark = self.mark;
        let start = self.rule_start()?;
        if let Some(r) = self.alt(mark, |p| p.assignment()) {
            return self.memo_done_stmt(mark, Rule::SimpleStatement, Some(r));
        }
        if let Some(r) = self.alt(mark, |p| {
            let value = p.star_expressions()?;
            let span = p.node_span(start)?;
            let stmt = p.arena.expr_stmt(value, span);
            p.build(stmt)
        }) {
            return self.memo_done_stmt(mark, Rule::SimpleStatement, Some(r));
        }
        self.memo_done_stmt(mark, Rule::SimpleStatement, None)
    }

    // assignment:
    //     | NAME ':' expression ['=' annotated_rhs]
    //     | ((star_targets '='))+ (yield_expr | star_expressions) !'='
    //     | single_target augassign ~ (yield_expr | star_expressions)
    //
    // No alternative is implemented yet; the rule never matches.
    pub(crate) fn assignment(&mut self) -> Option<StmtRef> {
        if self.error_indicator {
            return None;
        }
        self.rule_start()?;
        None
    }
}
