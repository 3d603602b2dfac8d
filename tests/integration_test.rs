// Integration tests for the Adder front end: parse modes, the driver's
// diagnostic re-parse and the interactive loop protocol.

use std::cell::RefCell;
use std::rc::Rc;

use adder::parser::ast::{ExprKind, ModNode, StmtKind};
use adder::parser::{ParseMode, ParseTree, Parser, ReadLine, Tokenizer};
use adder::runtime::ParseError;

/// Scripted line source standing in for a terminal.
struct ScriptReader {
    lines: Vec<Option<String>>,
    next: usize,
    prompts: Rc<RefCell<Vec<String>>>,
}

impl ScriptReader {
    fn new(lines: &[Option<&str>]) -> ScriptReader {
        ScriptReader {
            lines: lines.iter().map(|l| l.map(str::to_string)).collect(),
            next: 0,
            prompts: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl ReadLine for ScriptReader {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let i = self.next;
        self.next += 1;
        // Past the script, report end of input.
        self.lines.get(i).cloned().unwrap_or(Some(String::new()))
    }
}

fn parse_text(source: &str, mode: ParseMode) -> Result<ParseTree, ParseError> {
    Parser::from_text(source, mode).parse()
}

fn parse_interactive(lines: &[Option<&str>]) -> Result<ParseTree, ParseError> {
    let reader = ScriptReader::new(lines);
    let tok = Tokenizer::interactive(Box::new(reader), ">>> ", "... ");
    Parser::new(tok, ParseMode::Single).parse()
}

#[test]
fn test_file_mode_parses_statements() {
    let tree = parse_text("1 + 1\n2 + 2\nspam\n", ParseMode::File).unwrap();
    let ModNode::Module { body } = &tree.root else {
        panic!("expected module root, got {:?}", tree.root);
    };
    assert_eq!(body.len(), 3);
    for s in body {
        assert!(matches!(tree.arena.stmt(*s).kind, StmtKind::Expr { .. }));
    }
}

#[test]
fn test_file_mode_accepts_empty_input() {
    let tree = parse_text("", ParseMode::File).unwrap();
    let ModNode::Module { body } = &tree.root else {
        panic!("expected module root, got {:?}", tree.root);
    };
    assert!(body.is_empty());
}

#[test]
fn test_file_mode_skips_blank_and_comment_lines() {
    let tree = parse_text("1\n\n# nothing here\n\n2\n", ParseMode::File).unwrap();
    let ModNode::Module { body } = &tree.root else {
        panic!("expected module root");
    };
    assert_eq!(body.len(), 2);
}

#[test]
fn test_eval_mode_wraps_expression() {
    let tree = parse_text("40 + 2\n", ParseMode::Eval).unwrap();
    let ModNode::Expression { body } = tree.root else {
        panic!("expected expression root, got {:?}", tree.root);
    };
    assert!(matches!(tree.arena.expr(body).kind, ExprKind::BinOp { .. }));
}

#[test]
fn test_string_mode_needs_no_newline() {
    let tree = parse_text("1 + 2", ParseMode::StringExpr).unwrap();
    assert!(matches!(tree.root, ModNode::Expression { .. }));
}

#[test]
fn test_single_mode_statement() {
    let tree = parse_text("1 + 1\n", ParseMode::Single).unwrap();
    let ModNode::Interactive { body } = &tree.root else {
        panic!("expected interactive root, got {:?}", tree.root);
    };
    assert_eq!(body.len(), 1);
    assert!(matches!(
        tree.arena.stmt(body[0]).kind,
        StmtKind::Expr { .. }
    ));
}

#[test]
fn test_multiple_statements_rejected() {
    let err = parse_text("1 + 1\n2 + 2\n", ParseMode::Single).unwrap_err();
    assert!(
        err.to_string()
            .contains("multiple statements found while compiling a single statement"),
        "{}",
        err
    );
}

#[test]
fn test_trailing_comment_is_a_single_statement() {
    let tree = parse_text("1 + 1  # comment\n", ParseMode::Single).unwrap();
    assert!(matches!(tree.root, ModNode::Interactive { .. }));
}

#[test]
fn test_continued_line_is_a_single_statement() {
    let tree = parse_text("1 + \\\n2\n", ParseMode::Single).unwrap();
    let ModNode::Interactive { body } = &tree.root else {
        panic!("expected interactive root");
    };
    assert_eq!(body.len(), 1);
}

#[test]
fn test_newline_inside_string_is_a_single_statement() {
    let tree = parse_text("'''ab\ncd'''\n", ParseMode::Single).unwrap();
    assert!(matches!(tree.root, ModNode::Interactive { .. }));
}

#[test]
fn test_interactive_statement_over_two_lines() {
    let tree = parse_interactive(&[Some("1 + \\\n"), Some("2\n")]).unwrap();
    let ModNode::Interactive { body } = &tree.root else {
        panic!("expected interactive root");
    };
    assert_eq!(body.len(), 1);
}

#[test]
fn test_interactive_prompt_switches_after_first_line() {
    let reader = ScriptReader::new(&[Some("1 + \\\n"), Some("2\n")]);
    let prompts = Rc::clone(&reader.prompts);
    let tok = Tokenizer::interactive(Box::new(reader), ">>> ", "... ");
    Parser::new(tok, ParseMode::Single).parse().unwrap();
    let seen = prompts.borrow();
    assert_eq!(seen[0], ">>> ");
    assert!(seen[1..].iter().all(|p| p == "... "), "{:?}", seen);
}

#[test]
fn test_interactive_blank_line_is_pass() {
    let tree = parse_interactive(&[Some("\n")]).unwrap();
    let ModNode::Interactive { body } = &tree.root else {
        panic!("expected interactive root");
    };
    assert_eq!(body.len(), 1);
    assert!(matches!(tree.arena.stmt(body[0]).kind, StmtKind::Pass));
}

#[test]
fn test_interactive_clean_eof() {
    let err = parse_interactive(&[Some("")]).unwrap_err();
    assert!(err.is_end_of_input(), "{}", err);
}

#[test]
fn test_end_of_text_input_is_clean_eof() {
    let err = parse_text("", ParseMode::Single).unwrap_err();
    assert!(err.is_end_of_input(), "{}", err);
}

#[test]
fn test_interactive_interrupt() {
    let err = parse_interactive(&[None]).unwrap_err();
    assert_eq!(err, ParseError::Interrupted);
}

#[test]
fn test_unexpected_indent_diagnostic() {
    let err = parse_text("    1\n", ParseMode::File).unwrap_err();
    assert!(matches!(err, ParseError::Indentation { .. }), "{}", err);
    assert!(err.to_string().contains("unexpected indent"), "{}", err);
}

#[test]
fn test_invalid_syntax_diagnostic() {
    let err = parse_text("1 +\n", ParseMode::Eval).unwrap_err();
    assert!(err.to_string().contains("invalid syntax"), "{}", err);
}

#[test]
fn test_unexpected_eof_diagnostic() {
    let err = parse_text("", ParseMode::Eval).unwrap_err();
    assert!(
        err.to_string().contains("unexpected EOF while parsing"),
        "{}",
        err
    );
}

#[test]
fn test_eol_in_string_diagnostic() {
    let err = parse_text("'abc\n", ParseMode::Eval).unwrap_err();
    assert!(
        err.to_string().contains("EOL while scanning string literal"),
        "{}",
        err
    );
}

#[test]
fn test_eof_in_triple_string_diagnostic() {
    let err = parse_text("'''abc\n", ParseMode::Eval).unwrap_err();
    assert!(
        err.to_string()
            .contains("EOF while scanning triple-quoted string literal"),
        "{}",
        err
    );
}

#[test]
fn test_bad_continuation_diagnostic() {
    let err = parse_text("1 \\x\n", ParseMode::Eval).unwrap_err();
    assert!(
        err.to_string()
            .contains("unexpected character after line continuation character"),
        "{}",
        err
    );
}

#[test]
fn test_error_messages_name_their_kind() {
    let err = parse_text("    1\n", ParseMode::File).unwrap_err();
    assert!(err.to_string().starts_with("IndentationError:"), "{}", err);
    let err = parse_text("1 +\n", ParseMode::Eval).unwrap_err();
    assert!(err.to_string().starts_with("SyntaxError:"), "{}", err);
}
