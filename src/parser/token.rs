//! Token definitions for the Adder lexer
//!
//! Converts the classification side of tokenization into data: the
//! [`TokenKind`] sum type, the one/two/three-character operator tables, and
//! the keyword table bucketed by name length. The tokenizer itself only ever
//! produces `Name`; reclassification into keyword kinds happens when the
//! parser copies a token into its buffer.

use crate::parser::ast::Span;
use std::fmt;

/// All token kinds produced by the tokenizer and the keyword pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    EndMarker,
    Newline,
    Name,
    Number,
    Str,

    // Keywords
    If,
    Do,
    For,
    Else,
    Func,
    Null,
    True,
    While,
    Class,
    Async,
    Await,
    False,
    Extension,

    /// Blank operator value, often means unknown operator
    Op,
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Backslash,    // \
    Comma,        // ,
    Dot,          // .
    Equal,        // =
    Greater,      // >
    Less,         // <
    At,           // @
    Percent,      // %
    Amper,        // &
    Colon,        // :
    Semi,         // ;
    Circumflex,   // ^
    Tilde,        // ~
    VBar,         // |
    LPar,         // (
    RPar,         // )
    LSqb,         // [
    RSqb,         // ]
    LBrace,       // {
    RBrace,       // }

    // Two-character operators
    NotEqual,     // != or <>
    PlusEqual,    // +=
    MinusEqual,   // -=
    StarEqual,    // *=
    SlashEqual,   // /=
    GreaterEqual, // >=
    LessEqual,    // <=
    PlusPlus,     // ++
    MinusMinus,   // --
    Ellipsis,     // ..
    DoubleStar,   // **
    DoubleSlash,  // //
    LeftShift,    // <<
    RightShift,   // >>

    Indent,
    Dedent,
    TypeIgnore,
    TypeComment,
    ErrorToken,
}

impl TokenKind {
    /// Classify a single-character operator. Unknown characters map to
    /// [`TokenKind::Op`], which no grammar rule accepts.
    pub fn one_char(c1: char) -> TokenKind {
        match c1 {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '\\' => TokenKind::Backslash,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '=' => TokenKind::Equal,
            '>' => TokenKind::Greater,
            '<' => TokenKind::Less,
            '@' => TokenKind::At,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Amper,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            '^' => TokenKind::Circumflex,
            '~' => TokenKind::Tilde,
            '|' => TokenKind::VBar,
            '(' => TokenKind::LPar,
            ')' => TokenKind::RPar,
            '[' => TokenKind::LSqb,
            ']' => TokenKind::RSqb,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            _ => TokenKind::Op,
        }
    }

    /// Classify a two-character operator, or [`TokenKind::Op`] if the pair
    /// is not one.
    pub fn two_chars(c1: char, c2: char) -> TokenKind {
        match (c1, c2) {
            ('+', '=') => TokenKind::PlusEqual,
            ('+', '+') => TokenKind::PlusPlus,
            ('-', '=') => TokenKind::MinusEqual,
            ('-', '-') => TokenKind::MinusMinus,
            ('*', '*') => TokenKind::DoubleStar,
            ('*', '=') => TokenKind::StarEqual,
            ('/', '/') => TokenKind::DoubleSlash,
            ('/', '=') => TokenKind::SlashEqual,
            ('!', '=') => TokenKind::NotEqual,
            ('>', '=') => TokenKind::GreaterEqual,
            ('>', '>') => TokenKind::RightShift,
            ('<', '=') => TokenKind::LessEqual,
            ('<', '<') => TokenKind::LeftShift,
            ('<', '>') => TokenKind::NotEqual,
            ('.', '.') => TokenKind::Ellipsis,
            _ => TokenKind::Op,
        }
    }

    /// Classify a three-character operator. The language currently has
    /// none, so every triple maps to [`TokenKind::Op`].
    pub fn three_chars(_c1: char, _c2: char, _c3: char) -> TokenKind {
        TokenKind::Op
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::EndMarker => "end of file",
            TokenKind::Newline => "newline",
            TokenKind::Name => "identifier",
            TokenKind::Number => "number literal",
            TokenKind::Str => "string literal",
            TokenKind::If => "'if'",
            TokenKind::Do => "'do'",
            TokenKind::For => "'for'",
            TokenKind::Else => "'else'",
            TokenKind::Func => "'func'",
            TokenKind::Null => "'Null'",
            TokenKind::True => "'True'",
            TokenKind::While => "'while'",
            TokenKind::Class => "'class'",
            TokenKind::Async => "'async'",
            TokenKind::Await => "'await'",
            TokenKind::False => "'False'",
            TokenKind::Extension => "'extension'",
            TokenKind::Op => "operator",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Backslash => "'\\'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Equal => "'='",
            TokenKind::Greater => "'>'",
            TokenKind::Less => "'<'",
            TokenKind::At => "'@'",
            TokenKind::Percent => "'%'",
            TokenKind::Amper => "'&'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Circumflex => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::VBar => "'|'",
            TokenKind::LPar => "'('",
            TokenKind::RPar => "')'",
            TokenKind::LSqb => "'['",
            TokenKind::RSqb => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::NotEqual => "'!='",
            TokenKind::PlusEqual => "'+='",
            TokenKind::MinusEqual => "'-='",
            TokenKind::StarEqual => "'*='",
            TokenKind::SlashEqual => "'/='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::LessEqual => "'<='",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Ellipsis => "'..'",
            TokenKind::DoubleStar => "'**'",
            TokenKind::DoubleSlash => "'//'",
            TokenKind::LeftShift => "'<<'",
            TokenKind::RightShift => "'>>'",
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::TypeIgnore => "type ignore comment",
            TokenKind::TypeComment => "type comment",
            TokenKind::ErrorToken => "error token",
        };
        f.write_str(text)
    }
}

/// Keyword table bucketed by name length: only the bucket matching the
/// candidate's length is scanned.
static KEYWORDS: [&[(&str, TokenKind)]; 10] = [
    &[],
    &[],
    &[("if", TokenKind::If), ("do", TokenKind::Do)],
    &[("for", TokenKind::For)],
    &[
        ("else", TokenKind::Else),
        ("func", TokenKind::Func),
        ("Null", TokenKind::Null),
        ("True", TokenKind::True),
    ],
    &[
        ("while", TokenKind::While),
        ("class", TokenKind::Class),
        ("async", TokenKind::Async),
        ("await", TokenKind::Await),
        ("False", TokenKind::False),
    ],
    &[],
    &[],
    &[],
    &[("extension", TokenKind::Extension)],
];

/// Reclassify a completed name as a keyword, or leave it as
/// [`TokenKind::Name`].
pub fn keyword_or_name(name: &str) -> TokenKind {
    debug_assert!(!name.is_empty());
    match KEYWORDS.get(name.len()) {
        Some(bucket) => bucket
            .iter()
            .find(|(kw, _)| *kw == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(TokenKind::Name),
        None => TokenKind::Name,
    }
}

/// A classified token with its source text and span.
///
/// Immutable once filled into the parser's buffer, except for the memo chain
/// the packrat engine attaches to it (owned by the parser, not stored here).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Name => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::Number => write!(f, "number literal {}", self.lexeme),
            TokenKind::Str => write!(f, "string literal {}", self.lexeme),
            _ => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_char_operators() {
        assert_eq!(TokenKind::one_char('+'), TokenKind::Plus);
        assert_eq!(TokenKind::one_char('('), TokenKind::LPar);
        assert_eq!(TokenKind::one_char('}'), TokenKind::RBrace);
        assert_eq!(TokenKind::one_char('$'), TokenKind::Op);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(TokenKind::two_chars('*', '*'), TokenKind::DoubleStar);
        assert_eq!(TokenKind::two_chars('<', '>'), TokenKind::NotEqual);
        assert_eq!(TokenKind::two_chars('.', '.'), TokenKind::Ellipsis);
        assert_eq!(TokenKind::two_chars('+', '-'), TokenKind::Op);
    }

    #[test]
    fn test_keyword_buckets() {
        assert_eq!(keyword_or_name("if"), TokenKind::If);
        assert_eq!(keyword_or_name("func"), TokenKind::Func);
        assert_eq!(keyword_or_name("extension"), TokenKind::Extension);
        // Same length as a keyword, different spelling
        assert_eq!(keyword_or_name("fi"), TokenKind::Name);
        // Longer than any bucket
        assert_eq!(keyword_or_name("extensions"), TokenKind::Name);
        // Case matters
        assert_eq!(keyword_or_name("true"), TokenKind::Name);
    }
}
