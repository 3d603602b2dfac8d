// Adder front end driver: parse a file, or run the interactive loop.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use adder::parser::ast::{ExprKind, ModNode, StmtKind};
use adder::parser::{ParseMode, ParseTree, Parser, ReadLine, Tokenizer};
use adder::runtime::ParseError;

/// Line reader over stdin with a prompt, for the interactive loop.
struct StdinReader;

impl ReadLine for StdinReader {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => Some(String::new()), // end of input
            Ok(_) => Some(line),
            Err(_) => None,
        }
    }
}

/// Render a parse tree as an indented outline.
fn dump(tree: &ParseTree) -> String {
    let mut out = String::new();
    match &tree.root {
        ModNode::Module { body } => {
            out.push_str("Module\n");
            for s in body {
                dump_stmt(tree, *s, 1, &mut out);
            }
        }
        ModNode::Interactive { body } => {
            out.push_str("Interactive\n");
            for s in body {
                dump_stmt(tree, *s, 1, &mut out);
            }
        }
        ModNode::Expression { body } => {
            out.push_str("Expression\n");
            dump_expr(tree, *body, 1, &mut out);
        }
    }
    out
}

fn dump_stmt(tree: &ParseTree, s: adder::parser::ast::StmtRef, depth: usize, out: &mut String) {
    let stmt = tree.arena.stmt(s);
    let pad = "  ".repeat(depth);
    match &stmt.kind {
        StmtKind::Expr { value } => {
            out.push_str(&format!("{}Expr (line {})\n", pad, stmt.span.lineno));
            dump_expr(tree, *value, depth + 1, out);
        }
        StmtKind::Pass => {
            out.push_str(&format!("{}Pass (line {})\n", pad, stmt.span.lineno));
        }
    }
}

fn dump_expr(tree: &ParseTree, e: adder::parser::ast::ExprRef, depth: usize, out: &mut String) {
    let expr = tree.arena.expr(e);
    let pad = "  ".repeat(depth);
    match &expr.kind {
        ExprKind::BinOp { left, op, right } => {
            out.push_str(&format!("{}BinOp {:?}\n", pad, op));
            dump_expr(tree, *left, depth + 1, out);
            dump_expr(tree, *right, depth + 1, out);
        }
        ExprKind::UnaryOp { op, operand } => {
            out.push_str(&format!("{}UnaryOp {:?}\n", pad, op));
            dump_expr(tree, *operand, depth + 1, out);
        }
        ExprKind::Constant { value, .. } => {
            out.push_str(&format!("{}Constant {}\n", pad, value));
        }
        ExprKind::Name { id } => {
            out.push_str(&format!("{}Name {}\n", pad, id));
        }
    }
}

/// Parse single statements from stdin until a clean end of input, printing
/// each tree or error as it comes.
fn interactive_loop() -> ExitCode {
    loop {
        let tok = Tokenizer::interactive(Box::new(StdinReader), ">>> ", "... ");
        let parser = Parser::new(tok, ParseMode::Single);
        match parser.parse() {
            Ok(tree) => print!("{}", dump(&tree)),
            Err(err) if err.is_end_of_input() => {
                println!();
                return ExitCode::SUCCESS;
            }
            Err(ParseError::Interrupted) => {
                eprintln!("KeyboardInterrupt");
            }
            Err(err) => eprintln!("{}", err),
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("Error: cannot read '{}': {}", path, err);
            return ExitCode::FAILURE;
        }
    };
    let parser = Parser::new(Tokenizer::from_text(&source), ParseMode::File);
    match parser.parse() {
        Ok(tree) => {
            print!("{}", dump(&tree));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {}", path, err);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        None => interactive_loop(),
        Some("-h") | Some("--help") => {
            let program = args.first().map(|s| s.as_str()).unwrap_or("adder");
            eprintln!("Usage: {} [file.ad]", program);
            eprintln!();
            eprintln!("With no file, reads single statements from stdin.");
            ExitCode::SUCCESS
        }
        Some(path) => run_file(path),
    }
}
