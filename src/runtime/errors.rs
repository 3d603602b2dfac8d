//! Error taxonomy for the front end
//!
//! This module defines [`ParseError`], covering every failure the pipeline
//! can surface to a caller. The kinds mirror the exception classes of the
//! runtime: syntax, indentation and tab errors from the tokenizer and
//! grammar, value errors from AST field validation, and system errors for
//! internal invariant violations.
//!
//! A purely structural "no alternative matched" is *not* an error — the
//! parser converts it into one of these only on its diagnostic re-parse.

use thiserror::Error;

/// Errors raised while tokenizing and parsing a source.
///
/// Each variant carries the message the runtime would attach to the
/// corresponding exception object. `line` is the tokenizer's current line
/// where that is meaningful (1-based; 0 before any input was read).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("SyntaxError: {message} (line {line})")]
    Syntax { message: String, line: usize },

    #[error("IndentationError: {message} (line {line})")]
    Indentation { message: String, line: usize },

    #[error("TabError: {message} (line {line})")]
    Tab { message: String, line: usize },

    /// AST builder field validation failure.
    #[error("ValueError: {message}")]
    Value { message: String },

    /// Internal invariant violation.
    #[error("SystemError: {message}")]
    System { message: String },

    /// The interactive line reader was interrupted.
    #[error("KeyboardInterrupt")]
    Interrupted,

    /// Clean end of interactive input: the entry rule saw the end marker
    /// before any statement. The REPL loop uses this to terminate; it is not
    /// reported to the user.
    #[error("SyntaxError: unexpected EOF while parsing (line {line})")]
    EndOfInput { line: usize },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        ParseError::Syntax {
            message: message.into(),
            line,
        }
    }

    pub fn indentation(message: impl Into<String>, line: usize) -> Self {
        ParseError::Indentation {
            message: message.into(),
            line,
        }
    }

    pub fn tab(message: impl Into<String>, line: usize) -> Self {
        ParseError::Tab {
            message: message.into(),
            line,
        }
    }

    pub fn value(message: impl Into<String>) -> Self {
        ParseError::Value {
            message: message.into(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        ParseError::System {
            message: message.into(),
        }
    }

    /// True for the clean end-of-interactive-input condition.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, ParseError::EndOfInput { .. })
    }
}
