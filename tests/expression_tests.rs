// Grammar shape tests: associativity, precedence and literal handling.

use adder::parser::ast::{ExprKind, ExprRef, ModNode, Operator, UnaryOperator};
use adder::parser::{ParseMode, ParseTree, Parser};
use adder::runtime::Value;

fn parse_eval(source: &str) -> ParseTree {
    Parser::from_text(source, ParseMode::Eval)
        .parse()
        .expect("parse failed")
}

fn root_expr(tree: &ParseTree) -> ExprRef {
    match &tree.root {
        ModNode::Expression { body } => *body,
        other => panic!("expected expression root, got {:?}", other),
    }
}

fn expect_int(tree: &ParseTree, e: ExprRef, expected: i64) {
    match &tree.arena.expr(e).kind {
        ExprKind::Constant { value, .. } => assert_eq!(value.as_int(), Some(expected)),
        other => panic!("expected constant {}, got {:?}", expected, other),
    }
}

#[test]
fn test_sum_is_left_associative() {
    let tree = parse_eval("1 + 2 + 3\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { left, op, right } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::Add);
    expect_int(&tree, right, 3);
    let ExprKind::BinOp { left: ll, op: lop, right: lr } = tree.arena.expr(left).kind else {
        panic!("expected nested binop on the left");
    };
    assert_eq!(lop, Operator::Add);
    expect_int(&tree, ll, 1);
    expect_int(&tree, lr, 2);
}

#[test]
fn test_term_binds_tighter_than_sum() {
    let tree = parse_eval("1 + 2 * 3\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { left, op, right } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::Add);
    expect_int(&tree, left, 1);
    let ExprKind::BinOp { left: rl, op: rop, right: rr } = tree.arena.expr(right).kind else {
        panic!("expected nested binop on the right");
    };
    assert_eq!(rop, Operator::Mult);
    expect_int(&tree, rl, 2);
    expect_int(&tree, rr, 3);
}

#[test]
fn test_mixed_sum_and_sub_stay_left_associative() {
    // 1 - 2 + 3 must parse as (1 - 2) + 3
    let tree = parse_eval("1 - 2 + 3\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { left, op, right } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::Add);
    expect_int(&tree, right, 3);
    let ExprKind::BinOp { op: lop, .. } = tree.arena.expr(left).kind else {
        panic!("expected nested binop on the left");
    };
    assert_eq!(lop, Operator::Sub);
}

#[test]
fn test_power_is_right_associative() {
    let tree = parse_eval("2 ** 3 ** 2\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { left, op, right } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::Pow);
    expect_int(&tree, left, 2);
    let ExprKind::BinOp { op: rop, .. } = tree.arena.expr(right).kind else {
        panic!("expected nested binop on the right");
    };
    assert_eq!(rop, Operator::Pow);
}

#[test]
fn test_bitwise_precedence_chain() {
    // '|' is the loosest of the binary operators
    let tree = parse_eval("1 | 2 & 3\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { op, right, .. } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::BitOr);
    let ExprKind::BinOp { op: rop, .. } = tree.arena.expr(right).kind else {
        panic!("expected nested binop on the right");
    };
    assert_eq!(rop, Operator::BitAnd);
}

#[test]
fn test_shift_and_floordiv() {
    let tree = parse_eval("16 >> 2 // 2\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { op, right, .. } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::RShift);
    let ExprKind::BinOp { op: rop, .. } = tree.arena.expr(right).kind else {
        panic!("expected floordiv on the right");
    };
    assert_eq!(rop, Operator::FloorDiv);
}

#[test]
fn test_unary_operators() {
    let tree = parse_eval("~-1\n");
    let root = root_expr(&tree);
    let ExprKind::UnaryOp { op, operand } = tree.arena.expr(root).kind else {
        panic!("expected unary root");
    };
    assert_eq!(op, UnaryOperator::Invert);
    let ExprKind::UnaryOp { op: inner_op, operand: inner } = tree.arena.expr(operand).kind else {
        panic!("expected nested unary");
    };
    assert_eq!(inner_op, UnaryOperator::USub);
    expect_int(&tree, inner, 1);
}

#[test]
fn test_unary_binds_tighter_than_mult() {
    // -1 * 2 is (-1) * 2
    let tree = parse_eval("-1 * 2\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { left, op, .. } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::Mult);
    assert!(matches!(
        tree.arena.expr(left).kind,
        ExprKind::UnaryOp {
            op: UnaryOperator::USub,
            ..
        }
    ));
}

#[test]
fn test_matmult_operator() {
    let tree = parse_eval("a @ b\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { op, .. } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::MatMult);
}

#[test]
fn test_number_literals_round_trip() {
    for (source, expected) in [
        ("0x_1F\n", Value::Int(0x1F)),
        ("1_000\n", Value::Int(1000)),
        ("0o17\n", Value::Int(0o17)),
        ("0b101\n", Value::Int(0b101)),
        ("1e10\n", Value::Float(1e10)),
        (
            "1j\n",
            Value::Complex {
                real: 0.0,
                imag: 1.0,
            },
        ),
    ] {
        let tree = parse_eval(source);
        let root = root_expr(&tree);
        match &tree.arena.expr(root).kind {
            ExprKind::Constant { value, .. } => {
                assert_eq!(**value, expected, "literal {:?}", source)
            }
            other => panic!("expected constant for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_legacy_octal_is_rejected() {
    let err = Parser::from_text("007\n", ParseMode::Eval)
        .parse()
        .unwrap_err();
    assert!(err.to_string().contains("use an 0o prefix"), "{}", err);
}

#[test]
fn test_keyword_constants() {
    for (source, expected) in [
        ("True\n", Value::Bool(true)),
        ("False\n", Value::Bool(false)),
        ("Null\n", Value::Null),
    ] {
        let tree = parse_eval(source);
        let root = root_expr(&tree);
        match &tree.arena.expr(root).kind {
            ExprKind::Constant { value, .. } => assert_eq!(**value, expected),
            other => panic!("expected constant for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_name_atom() {
    let tree = parse_eval("spam\n");
    let root = root_expr(&tree);
    match &tree.arena.expr(root).kind {
        ExprKind::Name { id } => assert_eq!(id, "spam"),
        other => panic!("expected name, got {:?}", other),
    }
}

#[test]
fn test_empty_string_constant() {
    let tree = parse_eval("''\n");
    let root = root_expr(&tree);
    match &tree.arena.expr(root).kind {
        ExprKind::Constant { value, .. } => {
            assert_eq!(value.as_str(), Some(""));
        }
        other => panic!("expected constant, got {:?}", other),
    }
}

#[test]
fn test_adjacent_strings_concatenate() {
    let tree = parse_eval("'ab' \"cd\" 'ef'\n");
    let root = root_expr(&tree);
    match &tree.arena.expr(root).kind {
        ExprKind::Constant { value, .. } => {
            assert_eq!(value.as_str(), Some("abcdef"));
        }
        other => panic!("expected constant, got {:?}", other),
    }
}

#[test]
fn test_mixing_bytes_and_str_fails() {
    let err = Parser::from_text("b'ab' 'cd'\n", ParseMode::Eval)
        .parse()
        .unwrap_err();
    assert!(
        err.to_string().contains("cannot mix bytes and nonbytes"),
        "{}",
        err
    );
}

#[test]
fn test_string_in_expression() {
    let tree = parse_eval("'ab' + 'cd'\n");
    let root = root_expr(&tree);
    let ExprKind::BinOp { left, op, right } = tree.arena.expr(root).kind else {
        panic!("expected binop root");
    };
    assert_eq!(op, Operator::Add);
    for side in [left, right] {
        assert!(matches!(
            tree.arena.expr(side).kind,
            ExprKind::Constant { .. }
        ));
    }
}

#[test]
fn test_node_spans() {
    let tree = parse_eval("1 + 23\n");
    let root = root_expr(&tree);
    let span = tree.arena.expr(root).span;
    assert_eq!(span.lineno, 1);
    assert_eq!(span.col_offset, 0);
    assert_eq!(span.end_lineno, 1);
    assert_eq!(span.end_col_offset, 6);
}
