//! Expression grammar rules
//!
//! One method per grammar production, PEG semantics: alternatives are tried
//! in declaration order, the first full match wins, and a failed alternative
//! rewinds the mark before the next one runs. Binary-operator chains are
//! left-recursive and go through the seed-growing engine in `parse`; the
//! `raw_*` bodies keep the left-recursive shape of the grammar and bottom
//! out through the memo.
//!
//! The grammar is the currently implemented subset: boolean operators,
//! comparisons, lambdas, comprehensions and the postfix primary forms are
//! not wired up yet, so the rules for them delegate straight through to the
//! next precedence level.

use crate::parser::ast::{ExprRef, Operator, Span, UnaryOperator};
use crate::parser::literals;
use crate::parser::parse::{Parser, Rule};
use crate::parser::token::TokenKind;
use crate::runtime::Value;

impl Parser {
    // star_expressions:
    //     | star_expression ((',' star_expression))+ ','?
    //     | star_expression ','
    //     | star_expression
    pub(crate) fn star_expressions(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(r) = self.alt(mark, |p| p.star_expression()) {
            return Some(r);
        }
        None
    }

    // star_expression: '*' bitwise_or | expression
    pub(crate) fn star_expression(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::StarExpression) {
            return hit;
        }
        let mark = self.mark;
        let result = self.alt(mark, |p| p.expression());
        self.memo_done_expr(mark, Rule::StarExpression, result)
    }

    // expression: disjunction 'if' disjunction 'else' expression | disjunction | lambdef
    pub(crate) fn expression(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::Expression) {
            return hit;
        }
        let mark = self.mark;
        let result = self.alt(mark, |p| p.disjunction());
        self.memo_done_expr(mark, Rule::Expression, result)
    }

    // disjunction: conjunction (('or' conjunction))+ | conjunction
    pub(crate) fn disjunction(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::Disjunction) {
            return hit;
        }
        let mark = self.mark;
        let result = self.alt(mark, |p| p.conjunction());
        self.memo_done_expr(mark, Rule::Disjunction, result)
    }

    // conjunction: inversion (('and' inversion))+ | inversion
    pub(crate) fn conjunction(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::Conjunction) {
            return hit;
        }
        let mark = self.mark;
        let result = self.alt(mark, |p| p.inversion());
        self.memo_done_expr(mark, Rule::Conjunction, result)
    }

    // inversion: 'not' inversion | comparison
    pub(crate) fn inversion(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::Inversion) {
            return hit;
        }
        let mark = self.mark;
        let result = self.alt(mark, |p| p.comparison());
        self.memo_done_expr(mark, Rule::Inversion, result)
    }

    // comparison: bitwise_or compare_op_bitwise_or_pair+ | bitwise_or
    pub(crate) fn comparison(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        if let Some(r) = self.alt(mark, |p| p.bitwise_or()) {
            return Some(r);
        }
        None
    }

    // Left-recursive
    // bitwise_or: bitwise_or '|' bitwise_xor | bitwise_xor
    fn raw_bitwise_or(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        let start = p.rule_start()?;
        if let Some(r) = p.alt(mark, |p| {
            let a = p.bitwise_or()?;
            p.expect(TokenKind::VBar)?;
            let b = p.bitwise_xor()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::BitOr, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| p.bitwise_xor()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn bitwise_or(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::BitwiseOr, Self::raw_bitwise_or)
    }

    // Left-recursive
    // bitwise_xor: bitwise_xor '^' bitwise_and | bitwise_and
    fn raw_bitwise_xor(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        let start = p.rule_start()?;
        if let Some(r) = p.alt(mark, |p| {
            let a = p.bitwise_xor()?;
            p.expect(TokenKind::Circumflex)?;
            let b = p.bitwise_and()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::BitXor, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| p.bitwise_and()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn bitwise_xor(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::BitwiseXor, Self::raw_bitwise_xor)
    }

    // Left-recursive
    // bitwise_and: bitwise_and '&' shift_expr | shift_expr
    fn raw_bitwise_and(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        let start = p.rule_start()?;
        if let Some(r) = p.alt(mark, |p| {
            let a = p.bitwise_and()?;
            p.expect(TokenKind::Amper)?;
            let b = p.shift_expr()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::BitAnd, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| p.shift_expr()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn bitwise_and(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::BitwiseAnd, Self::raw_bitwise_and)
    }

    // Left-recursive
    // shift_expr: shift_expr '<<' sum | shift_expr '>>' sum | sum
    fn raw_shift_expr(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        let start = p.rule_start()?;
        if let Some(r) = p.alt(mark, |p| {
            let a = p.shift_expr()?;
            p.expect(TokenKind::LeftShift)?;
            let b = p.sum()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::LShift, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| {
            let a = p.shift_expr()?;
            p.expect(TokenKind::RightShift)?;
            let b = p.sum()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::RShift, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| p.sum()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn shift_expr(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::ShiftExpr, Self::raw_shift_expr)
    }

    // Left-recursive
    // sum: sum '+' term | sum '-' term | term
    fn raw_sum(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        let start = p.rule_start()?;
        if let Some(r) = p.alt(mark, |p| {
            let a = p.sum()?;
            p.expect(TokenKind::Plus)?;
            let b = p.term()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::Add, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| {
            let a = p.sum()?;
            p.expect(TokenKind::Minus)?;
            let b = p.term()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::Sub, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = p.alt(mark, |p| p.term()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn sum(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::Sum, Self::raw_sum)
    }

    // Left-recursive
    // term:
    //     | term '*' factor
    //     | term '/' factor
    //     | term '//' factor
    //     | term '%' factor
    //     | term '@' factor
    //     | factor
    fn raw_term(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        let start = p.rule_start()?;
        let ops = [
            (TokenKind::Star, Operator::Mult),
            (TokenKind::Slash, Operator::Div),
            (TokenKind::DoubleSlash, Operator::FloorDiv),
            (TokenKind::Percent, Operator::Mod),
            (TokenKind::At, Operator::MatMult),
        ];
        for (kind, op) in ops {
            if let Some(r) = p.alt(mark, |p| {
                let a = p.term()?;
                p.expect(kind)?;
                let b = p.factor()?;
                let span = p.node_span(start)?;
                let node = p.arena.bin_op(a, op, b, span);
                p.build(node)
            }) {
                return Some(r);
            }
        }
        if let Some(r) = p.alt(mark, |p| p.factor()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn term(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::Term, Self::raw_term)
    }

    // factor: '+' factor | '-' factor | '~' factor | power
    pub(crate) fn factor(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::Factor) {
            return hit;
        }
        let mark = self.mark;
        let start = self.rule_start()?;
        let ops = [
            (TokenKind::Plus, UnaryOperator::UAdd),
            (TokenKind::Minus, UnaryOperator::USub),
            (TokenKind::Tilde, UnaryOperator::Invert),
        ];
        for (kind, op) in ops {
            if let Some(r) = self.alt(mark, |p| {
                p.expect(kind)?;
                let a = p.factor()?;
                let span = p.node_span(start)?;
                let node = p.arena.unary_op(op, a, span);
                p.build(node)
            }) {
                return self.memo_done_expr(mark, Rule::Factor, Some(r));
            }
        }
        if let Some(r) = self.alt(mark, |p| p.power()) {
            return self.memo_done_expr(mark, Rule::Factor, Some(r));
        }
        self.memo_done_expr(mark, Rule::Factor, None)
    }

    // power: await_primary '**' factor | await_primary
    pub(crate) fn power(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        let start = self.rule_start()?;
        if let Some(r) = self.alt(mark, |p| {
            let a = p.await_primary()?;
            p.expect(TokenKind::DoubleStar)?;
            let b = p.factor()?;
            let span = p.node_span(start)?;
            let node = p.arena.bin_op(a, Operator::Pow, b, span);
            p.build(node)
        }) {
            return Some(r);
        }
        if let Some(r) = self.alt(mark, |p| p.await_primary()) {
            return Some(r);
        }
        None
    }

    // await_primary: AWAIT primary | primary
    pub(crate) fn await_primary(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::AwaitPrimary) {
            return hit;
        }
        let mark = self.mark;
        let result = self.alt(mark, |p| p.primary());
        self.memo_done_expr(mark, Rule::AwaitPrimary, result)
    }

    // Left-recursive
    // primary:
    //     | primary '.' NAME
    //     | primary genexp
    //     | primary '(' arguments? ')'
    //     | primary '[' slices ']'
    //     | atom
    fn raw_primary(p: &mut Parser) -> Option<ExprRef> {
        if p.error_indicator {
            return None;
        }
        let mark = p.mark;
        p.rule_start()?;
        if let Some(r) = p.alt(mark, |p| p.atom()) {
            return Some(r);
        }
        None
    }

    pub(crate) fn primary(&mut self) -> Option<ExprRef> {
        self.left_rec(Rule::Primary, Self::raw_primary)
    }

    // atom:
    //     | NAME
    //     | 'True'
    //     | 'False'
    //     | 'Null'
    //     | &STRING strings
    //     | NUMBER
    pub(crate) fn atom(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        let mark = self.mark;
        let start = self.rule_start()?;
        let keywords = [
            (TokenKind::True, Value::Bool(true)),
            (TokenKind::False, Value::Bool(false)),
            (TokenKind::Null, Value::Null),
        ];
        for (kind, value) in keywords {
            if let Some(r) = self.alt(mark, |p| {
                p.expect(kind)?;
                let span = p.node_span(start)?;
                let vref = p.arena.adopt(value.clone());
                let node = p.arena.constant(vref, None, span);
                p.build(node)
            }) {
                return Some(r);
            }
        }
        if let Some(r) = self.alt(mark, |p| {
            if !p.lookahead(true, |p| p.string_token()) {
                return None;
            }
            p.strings()
        }) {
            return Some(r);
        }
        if let Some(r) = self.alt(mark, |p| p.number_token()) {
            return Some(r);
        }
        if let Some(r) = self.alt(mark, |p| p.name_token()) {
            return Some(r);
        }
        None
    }

    /// Consume a STRING token, for the `&STRING` lookahead and the strings
    /// loop.
    pub(crate) fn string_token(&mut self) -> Option<usize> {
        self.expect(TokenKind::Str)
    }

    /// Consume a NUMBER token and build its constant node.
    pub(crate) fn number_token(&mut self) -> Option<ExprRef> {
        let i = self.expect(TokenKind::Number)?;
        let t = self.token(i);
        let (text, span) = (t.lexeme.clone(), t.span);
        let value = match literals::parse_number(&text) {
            Ok(v) => v,
            Err(e) => {
                self.raise(e);
                return None;
            }
        };
        let vref = self.arena.adopt(value);
        let node = self.arena.constant(vref, None, span);
        self.build(node)
    }

    /// Consume a NAME token and build its name node.
    pub(crate) fn name_token(&mut self) -> Option<ExprRef> {
        let i = self.expect(TokenKind::Name)?;
        let t = self.token(i);
        let (id, span) = (t.lexeme.clone(), t.span);
        let node = self.arena.name(id, span);
        self.build(node)
    }

    // strings: STRING+
    //
    // Adjacent string literals concatenate into a single constant; mixing
    // bytes and non-bytes literals is an error.
    pub(crate) fn strings(&mut self) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(Rule::Strings) {
            return hit;
        }
        let mark = self.mark;
        let mut result = None;
        if let Some(indices) = self.loop_string() {
            let first = self.token(indices[0]).span;
            let last = self.token(*indices.last().unwrap_or(&indices[0])).span;
            let span = Span::new(
                first.lineno,
                first.col_offset,
                last.end_lineno,
                last.end_col_offset,
            );
            let texts: Vec<String> = indices
                .iter()
                .map(|&i| self.token(i).lexeme.clone())
                .collect();
            match literals::concat_strings(&texts, first.lineno) {
                Ok((value, kind)) => {
                    let vref = self.arena.adopt(value);
                    let node = self.arena.constant(vref, kind, span);
                    result = self.build(node);
                }
                Err(e) => self.raise(e),
            }
        } else {
            self.mark = mark;
        }
        self.memo_done_expr(mark, Rule::Strings, result)
    }

    // loop_string: STRING
    fn loop_string(&mut self) -> Option<Vec<usize>> {
        if self.error_indicator {
            return None;
        }
        let mut children = Vec::new();
        while let Some(i) = self.string_token() {
            children.push(i);
        }
        if children.is_empty() || self.error_indicator {
            return None;
        }
        Some(children)
    }
}
