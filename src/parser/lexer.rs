//! Tokenizer for Adder source text
//!
//! A stateful, indentation-sensitive tokenizer. One logical line at a time is
//! windowed into a growable character buffer; the cursor walks the window and
//! can push characters back. At the beginning of each logical line the
//! leading whitespace is measured twice — once with the real tab size and
//! once with an alternate tab size of 1 — so that tab/space mixes that would
//! be ambiguous under a different tab width are rejected rather than
//! silently accepted.
//!
//! The tokenizer only classifies; it never interprets. String escapes are
//! skipped verbatim, number texts are validated but not converted, and
//! identifiers are reported as [`TokenKind::Name`] — keyword reclassification
//! happens when the parser fills its token buffer.

use crate::parser::token::TokenKind;

/// Maximum amount of indentation levels.
pub const MAX_INDENT: usize = 100;
/// Maximum bracket nesting depth.
pub const MAX_PAREN: usize = 200;
/// Tab spacing used for real indentation columns.
pub const TAB_SIZE: usize = 8;
/// Alternate tab spacing, used only to detect inconsistent tab/space mixes.
const ALT_TAB_SIZE: usize = 1;

/// Tokenizer completion status. [`TokStatus::Ok`] while producing tokens;
/// anything else describes why an error token (or the end marker) was
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokStatus {
    Ok,
    /// End of input reached cleanly.
    Eof,
    /// A syntax error with a stored message.
    Error,
    /// An invalid token (e.g. a non-ASCII identifier).
    BadToken,
    /// End of input inside a triple-quoted string.
    EofInString,
    /// End of line inside a single-quoted string.
    EolInString,
    /// Dedent to a column matching no outer indentation level.
    DedentMismatch,
    /// Inconsistent use of tabs and spaces.
    TabSpace,
    /// More than [`MAX_INDENT`] indentation levels.
    TooDeep,
    /// A `\` not followed by a newline.
    BadContinuation,
    /// The interactive reader was interrupted.
    Interrupted,
    /// Trailing content after a single interactive statement (set by the
    /// parser driver, not the tokenizer).
    BadSingle,
}

/// Line source for interactive input.
///
/// `None` means the read was interrupted; an empty string means end of
/// input; anything else is one line of text (newline optional).
pub trait ReadLine {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

enum Source {
    /// Complete text supplied up front, windowed line by line.
    Text,
    /// Prompt-driven input appended to the buffer one line at a time.
    Interactive {
        reader: Box<dyn ReadLine>,
        prompt: String,
        next_prompt: String,
    },
}

/// A raw classified token: its kind and, when meaningful, the half-open
/// buffer range of its text.
pub(crate) struct Raw {
    pub kind: TokenKind,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl Raw {
    fn span(kind: TokenKind, start: usize, end: usize) -> Raw {
        Raw {
            kind,
            start: Some(start),
            end: Some(end),
        }
    }

    fn bare(kind: TokenKind) -> Raw {
        Raw {
            kind,
            start: None,
            end: None,
        }
    }

    fn error() -> Raw {
        Raw::bare(TokenKind::ErrorToken)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase() || c == '_' || (c as u32) >= 128
}

fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

fn is_digit(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

fn is_xdigit(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_hexdigit())
}

/// Normalize `\r\n` and bare `\r` to `\n`; for non-interactive input also
/// guarantee a trailing newline.
fn translate_newlines(s: &str, exec_input: bool) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    if exec_input && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// The tokenizer state machine.
pub struct Tokenizer {
    buf: Vec<char>,
    /// Next character to read.
    cur: usize,
    /// End of the data windowed in so far; `cur <= inp`.
    inp: usize,
    /// Start of the token currently being scanned.
    start: Option<usize>,
    pub(crate) done: TokStatus,
    err_msg: Option<String>,
    source: Source,
    tab_size: usize,
    /// Stack of indentation columns; index 0 is always column 0.
    indents: Vec<usize>,
    /// Parallel stack of alternate-tab-size columns.
    alt_indents: Vec<usize>,
    at_bol: bool,
    /// Pending indents (if > 0) or dedents (if < 0).
    pending: i32,
    pub(crate) lineno: usize,
    /// First line of the current (possibly multi-line) string token.
    pub(crate) first_lineno: usize,
    /// Open brackets with the line each was opened on.
    paren_stack: Vec<(char, usize)>,
    pub(crate) line_start: usize,
    /// Start of the first line of the current string token.
    pub(crate) multi_line_start: usize,
    type_comments: bool,
    async_hacks: bool,
    async_def: bool,
    async_def_indent: usize,
    async_def_nl: bool,
}

impl Tokenizer {
    fn new(source: Source) -> Tokenizer {
        Tokenizer {
            buf: Vec::new(),
            cur: 0,
            inp: 0,
            start: None,
            done: TokStatus::Ok,
            err_msg: None,
            source,
            tab_size: TAB_SIZE,
            indents: vec![0],
            alt_indents: vec![0],
            at_bol: true,
            pending: 0,
            lineno: 0,
            first_lineno: 0,
            paren_stack: Vec::new(),
            line_start: 0,
            multi_line_start: 0,
            type_comments: false,
            async_hacks: false,
            async_def: false,
            async_def_indent: 0,
            async_def_nl: false,
        }
    }

    /// Tokenizer over complete source text (file or string input).
    pub fn from_text(text: &str) -> Tokenizer {
        let mut tok = Tokenizer::new(Source::Text);
        tok.buf = translate_newlines(text, true).chars().collect();
        tok
    }

    /// Tokenizer over prompt-driven interactive input.
    pub fn interactive(reader: Box<dyn ReadLine>, prompt: &str, next_prompt: &str) -> Tokenizer {
        Tokenizer::new(Source::Interactive {
            reader,
            prompt: prompt.to_string(),
            next_prompt: next_prompt.to_string(),
        })
    }

    /// Enable recognition of `# type: ` comments.
    pub fn with_type_comments(mut self, on: bool) -> Tokenizer {
        self.type_comments = on;
        self
    }

    /// Resolve `async`/`await` via one-token lookahead instead of treating
    /// them as unconditional keywords.
    pub fn with_async_hacks(mut self, on: bool) -> Tokenizer {
        self.async_hacks = on;
        self
    }

    pub(crate) fn is_interactive(&self) -> bool {
        matches!(self.source, Source::Interactive { .. })
    }

    /// Current indentation depth (number of open INDENT levels).
    pub(crate) fn indent_depth(&self) -> usize {
        self.indents.len() - 1
    }

    /// Queue dedents for every open indentation level.
    pub(crate) fn force_pending_dedents(&mut self) {
        self.pending -= self.indent_depth() as i32;
        self.indents.truncate(1);
        self.alt_indents.truncate(1);
    }

    /// Text of a buffer range.
    pub(crate) fn text(&self, start: usize, end: usize) -> String {
        self.buf[start..end].iter().collect()
    }

    /// The raw character buffer, for the driver's trailing-content scan.
    pub(crate) fn buffer(&self) -> &[char] {
        &self.buf
    }

    pub(crate) fn take_message(&mut self) -> Option<String> {
        self.err_msg.take()
    }

    fn nesting(&self) -> usize {
        self.paren_stack.len()
    }

    /// Pull the next character, windowing in more input as needed.
    fn next_char(&mut self) -> Option<char> {
        loop {
            if self.cur != self.inp {
                let c = self.buf[self.cur];
                self.cur += 1;
                return Some(c);
            }
            if self.done != TokStatus::Ok {
                return None;
            }
            match &mut self.source {
                Source::Text => {
                    if self.inp == self.buf.len() {
                        self.done = TokStatus::Eof;
                        return None;
                    }
                    let mut end = self.inp;
                    while end < self.buf.len() && self.buf[end] != '\n' {
                        end += 1;
                    }
                    if end < self.buf.len() {
                        end += 1; // include the newline
                    }
                    self.line_start = self.cur;
                    self.lineno += 1;
                    self.inp = end;
                }
                Source::Interactive {
                    reader,
                    prompt,
                    next_prompt,
                } => {
                    let line = reader.read_line(prompt);
                    if prompt != next_prompt {
                        *prompt = next_prompt.clone();
                    }
                    match line {
                        None => {
                            self.done = TokStatus::Interrupted;
                            return None;
                        }
                        Some(s) if s.is_empty() => {
                            self.done = TokStatus::Eof;
                            return None;
                        }
                        Some(s) => {
                            let translated = translate_newlines(&s, false);
                            self.lineno += 1;
                            self.line_start = self.cur;
                            self.buf.extend(translated.chars());
                            self.inp = self.buf.len();
                        }
                    }
                }
            }
        }
    }

    /// Push one character back onto the cursor.
    fn back_char(&mut self, c: Option<char>) {
        if let Some(c) = c {
            debug_assert!(self.cur > 0, "tokenizer at beginning of buffer");
            if self.cur > 0 {
                self.cur -= 1;
                if self.buf[self.cur] != c {
                    self.buf[self.cur] = c;
                }
            }
        }
    }

    fn syntax_error(&mut self, msg: &str) -> Raw {
        self.err_msg = Some(msg.to_string());
        self.done = TokStatus::Error;
        Raw::error()
    }

    fn indent_error(&mut self) -> Raw {
        self.done = TokStatus::TabSpace;
        self.cur = self.inp;
        Raw::error()
    }

    fn status_error(&mut self, status: TokStatus) -> Raw {
        self.done = status;
        self.cur = self.inp;
        Raw::error()
    }

    /// Produce the next raw token.
    pub(crate) fn get(&mut self) -> Raw {
        'nextline: loop {
            self.start = None;
            let mut blankline = false;

            // Measure indentation at the beginning of a logical line.
            if self.at_bol {
                self.at_bol = false;
                let mut col = 0usize;
                let mut altcol = 0usize;
                let mut c;
                loop {
                    c = self.next_char();
                    match c {
                        Some(' ') => {
                            col += 1;
                            altcol += 1;
                        }
                        Some('\t') => {
                            col = (col / self.tab_size + 1) * self.tab_size;
                            altcol = (altcol / ALT_TAB_SIZE + 1) * ALT_TAB_SIZE;
                        }
                        Some('\x0c') => {
                            // Control-L (formfeed), for Emacs users
                            col = 0;
                            altcol = 0;
                        }
                        _ => break,
                    }
                }
                self.back_char(c);
                if matches!(c, Some('#') | Some('\n') | Some('\\')) {
                    // Lines with only whitespace, comments or a continuation
                    // character do not affect indentation and produce no
                    // NEWLINE token, except totally empty lines in
                    // interactive mode, which end a command group.
                    if col == 0 && c == Some('\n') && self.is_interactive() {
                        blankline = false;
                    } else if self.is_interactive() && self.lineno == 1 {
                        // First interactive line with only spaces or a
                        // comment goes through as-is.
                        blankline = false;
                        col = 0;
                        altcol = 0;
                    } else {
                        blankline = true;
                    }
                }
                if !blankline && self.nesting() == 0 {
                    let top = *self.indents.last().unwrap_or(&0);
                    let alt_top = *self.alt_indents.last().unwrap_or(&0);
                    if col == top {
                        // No change
                        if altcol != alt_top {
                            return self.indent_error();
                        }
                    } else if col > top {
                        // Indent -- always one
                        if self.indents.len() >= MAX_INDENT {
                            return self.status_error(TokStatus::TooDeep);
                        }
                        if altcol <= alt_top {
                            return self.indent_error();
                        }
                        self.pending += 1;
                        self.indents.push(col);
                        self.alt_indents.push(altcol);
                    } else {
                        // Dedent -- any number, must be consistent
                        while self.indents.len() > 1 && col < *self.indents.last().unwrap_or(&0) {
                            self.pending -= 1;
                            self.indents.pop();
                            self.alt_indents.pop();
                        }
                        if col != *self.indents.last().unwrap_or(&0) {
                            return self.status_error(TokStatus::DedentMismatch);
                        }
                        if altcol != *self.alt_indents.last().unwrap_or(&0) {
                            return self.indent_error();
                        }
                    }
                }
            }

            self.start = Some(self.cur);

            // Drain pending indents/dedents one at a time.
            if self.pending != 0 {
                if self.pending < 0 {
                    self.pending += 1;
                    return Raw::bare(TokenKind::Dedent);
                } else {
                    self.pending -= 1;
                    return Raw::bare(TokenKind::Indent);
                }
            }

            // Check if we are closing an async function: we need a
            // non-newline character at an indentation level at or above the
            // one the definition opened at.
            let peeked = self.next_char();
            self.back_char(peeked);
            if self.async_def
                && !blankline
                && peeked != Some('\n')
                && self.nesting() == 0
                && self.async_def_nl
                && self.async_def_indent >= self.indent_depth()
            {
                self.async_def = false;
                self.async_def_indent = 0;
                self.async_def_nl = false;
            }

            'again: loop {
                self.start = None;
                let mut c = self.next_char();
                while matches!(c, Some(' ') | Some('\t') | Some('\x0c')) {
                    c = self.next_char();
                }
                self.start = Some(if c.is_some() { self.cur - 1 } else { self.cur });

                // Skip comment, unless it's a type comment.
                if c == Some('#') {
                    while !matches!(c, None | Some('\n')) {
                        c = self.next_char();
                    }
                    if self.type_comments {
                        if let Some(raw) = self.type_comment(c, blankline) {
                            return raw;
                        }
                    }
                }

                // Check for EOF and errors now.
                let ch = match c {
                    None => {
                        return if self.done == TokStatus::Eof {
                            Raw::bare(TokenKind::EndMarker)
                        } else {
                            Raw::error()
                        };
                    }
                    Some(ch) => ch,
                };

                // Identifier (most frequent token!)
                if is_identifier_start(ch) {
                    return self.name_token(ch);
                }

                // Newline
                if ch == '\n' {
                    self.at_bol = true;
                    if blankline || self.nesting() > 0 {
                        continue 'nextline;
                    }
                    if self.async_def {
                        // Inside an 'async func' signature we have now seen
                        // the NEWLINE after the header.
                        self.async_def_nl = true;
                    }
                    let start = self.start.unwrap_or(self.cur);
                    // Leave '\n' out of the text
                    return Raw::span(TokenKind::Newline, start, self.cur - 1);
                }

                // Period or number starting with period?
                if ch == '.' {
                    let c2 = self.next_char();
                    if is_digit(c2) {
                        return self.number_fraction(c2);
                    } else if c2 == Some('.') {
                        let c3 = self.next_char();
                        if c3 == Some('.') {
                            let start = self.start.unwrap_or(self.cur);
                            return Raw::span(TokenKind::Ellipsis, start, self.cur);
                        }
                        self.back_char(c3);
                        self.back_char(Some('.'));
                    } else {
                        self.back_char(c2);
                    }
                    let start = self.start.unwrap_or(self.cur);
                    return Raw::span(TokenKind::Dot, start, self.cur);
                }

                // Number
                if ch.is_ascii_digit() {
                    return self.number_token(ch);
                }

                // String
                if ch == '\'' || ch == '"' {
                    return self.string_token(ch);
                }

                // Line continuation
                if ch == '\\' {
                    let c2 = self.next_char();
                    if c2 != Some('\n') {
                        return self.status_error(TokStatus::BadContinuation);
                    }
                    let c3 = self.next_char();
                    if c3.is_none() {
                        return self.status_error(TokStatus::Eof);
                    }
                    self.back_char(c3);
                    continue 'again; // Read next line
                }

                // Check for two-character token.
                if let Some(c2) = self.next_char() {
                    let token = TokenKind::two_chars(ch, c2);
                    if token != TokenKind::Op {
                        let mut kind = token;
                        let c3 = self.next_char();
                        if let Some(c3v) = c3 {
                            let token3 = TokenKind::three_chars(ch, c2, c3v);
                            if token3 != TokenKind::Op {
                                kind = token3;
                            } else {
                                self.back_char(c3);
                            }
                        }
                        let start = self.start.unwrap_or(self.cur);
                        return Raw::span(kind, start, self.cur);
                    }
                    self.back_char(Some(c2));
                }

                // Keep track of bracket nesting level.
                match ch {
                    '(' | '[' | '{' => {
                        if self.nesting() >= MAX_PAREN {
                            return self.syntax_error("too many nested parentheses");
                        }
                        self.paren_stack.push((ch, self.lineno));
                    }
                    ')' | ']' | '}' => {
                        let Some((opening, line)) = self.paren_stack.pop() else {
                            return self.syntax_error("unmatched paren");
                        };
                        let matched = matches!(
                            (opening, ch),
                            ('(', ')') | ('[', ']') | ('{', '}')
                        );
                        if !matched {
                            let msg = if line == self.lineno {
                                "closing parenthesis does not match opening parenthesis"
                                    .to_string()
                            } else {
                                format!(
                                    "closing parenthesis does not match opening \
                                     parenthesis on line {}",
                                    line
                                )
                            };
                            return self.syntax_error(&msg);
                        }
                    }
                    _ => {}
                }

                // Punctuation character.
                let start = self.start.unwrap_or(self.cur);
                return Raw::span(TokenKind::one_char(ch), start, self.cur);
            }
        }
    }

    /// Recognize `# type: ...` comments after the comment body has been
    /// consumed. `c` is the (unconsumed-by-caller) newline or EOF that ended
    /// the comment.
    fn type_comment(&mut self, c: Option<char>, blankline: bool) -> Option<Raw> {
        const PREFIX: &str = "# type: ";
        let start = self.start?;
        let mut p = start;
        let mut prefix = PREFIX.chars().peekable();
        while let Some(&pc) = prefix.peek() {
            if p >= self.cur {
                break;
            }
            if pc == ' ' {
                // A space in the prefix means zero or more spaces or tabs.
                while p < self.cur && (self.buf[p] == ' ' || self.buf[p] == '\t') {
                    p += 1;
                }
            } else if self.buf[p] == pc {
                p += 1;
            } else {
                break;
            }
            prefix.next();
        }
        if prefix.peek().is_some() {
            return None;
        }
        // This is a type comment.
        self.back_char(c); // don't eat the newline or EOF
        let type_start = p;
        let ignore_end = p + 6;
        // A TYPE_IGNORE is "type: ignore" followed by the end of the token
        // or anything ASCII and non-alphanumeric.
        let is_type_ignore = self.cur >= ignore_end
            && self.buf[p..ignore_end].iter().copied().eq("ignore".chars())
            && !(self.cur > ignore_end
                && ((self.buf[ignore_end] as u32) >= 128
                    || self.buf[ignore_end].is_ascii_alphanumeric()));
        if is_type_ignore {
            let raw = Raw::span(TokenKind::TypeIgnore, ignore_end, self.cur);
            // If this type ignore is the only thing on the line, consume the
            // newline also.
            if blankline {
                self.next_char();
                self.at_bol = true;
            }
            Some(raw)
        } else {
            Some(Raw::span(TokenKind::TypeComment, type_start, self.cur))
        }
    }

    /// Scan a name, handling string literal prefixes and the async/await
    /// soft keywords. `first` has already been consumed.
    fn name_token(&mut self, first: char) -> Raw {
        // Process the various legal combinations of b"", r"", u"" and f"".
        let (mut saw_b, mut saw_r, mut saw_u, mut saw_f) = (false, false, false, false);
        let mut c = Some(first);
        loop {
            let cc = match c {
                Some(cc) => cc,
                None => break,
            };
            if !(saw_b || saw_u || saw_f) && (cc == 'b' || cc == 'B') {
                saw_b = true;
            } else if !(saw_b || saw_u || saw_r || saw_f) && (cc == 'u' || cc == 'U') {
                saw_u = true;
            } else if !(saw_r || saw_u) && (cc == 'r' || cc == 'R') {
                saw_r = true;
            } else if !(saw_f || saw_b || saw_u) && (cc == 'f' || cc == 'F') {
                saw_f = true;
            } else {
                break;
            }
            c = self.next_char();
            if let Some(q @ ('"' | '\'')) = c {
                return self.string_token(q);
            }
        }
        let mut nonascii = false;
        while c.is_some_and(is_identifier_char) {
            if c.is_some_and(|c| (c as u32) >= 128) {
                nonascii = true;
            }
            c = self.next_char();
        }
        self.back_char(c);
        if nonascii {
            self.done = TokStatus::BadToken;
            return Raw::error();
        }

        let start = self.start.unwrap_or(self.cur);
        let end = self.cur;

        // async/await soft keywords. When async_hacks is off they are
        // recognized unconditionally; when on, 'async' is only recognized in
        // front of 'func' and either one inside an 'async func' body.
        if end - start == 5 && self.buf[start] == 'a' {
            let matches_kw = |kw: &str| self.buf[start..end].iter().copied().eq(kw.chars());
            if !self.async_hacks || self.async_def {
                if matches_kw("async") {
                    return Raw::span(TokenKind::Async, start, end);
                }
                if matches_kw("await") {
                    return Raw::span(TokenKind::Await, start, end);
                }
            } else if matches_kw("async") && self.ahead_is_func() {
                // The next token is going to be 'func', so instead of
                // returning a plain NAME, return ASYNC and start tracking
                // the definition's indentation.
                self.async_def_indent = self.indent_depth();
                self.async_def = true;
                return Raw::span(TokenKind::Async, start, end);
            }
        }

        Raw::span(TokenKind::Name, start, end)
    }

    /// Look ahead (within the current line window) for a `func` keyword
    /// after optional spaces.
    fn ahead_is_func(&self) -> bool {
        let mut p = self.cur;
        while p < self.inp && (self.buf[p] == ' ' || self.buf[p] == '\t') {
            p += 1;
        }
        let start = p;
        while p < self.inp && is_identifier_char(self.buf[p]) {
            p += 1;
        }
        p - start == 4 && self.buf[start..p].iter().copied().eq("func".chars())
    }

    /// Consume digits interleaved with single underscores; an underscore
    /// must be followed by a digit.
    fn decimal_tail(&mut self) -> Result<Option<char>, Raw> {
        let mut c;
        loop {
            loop {
                c = self.next_char();
                if !is_digit(c) {
                    break;
                }
            }
            if c != Some('_') {
                break;
            }
            c = self.next_char();
            if !is_digit(c) {
                self.back_char(c);
                return Err(self.syntax_error("invalid decimal literal"));
            }
        }
        Ok(c)
    }

    fn finish_number(&mut self) -> Raw {
        let start = self.start.unwrap_or(self.cur);
        Raw::span(TokenKind::Number, start, self.cur)
    }

    /// Scan a number; `first` (a digit) has already been consumed.
    fn number_token(&mut self, first: char) -> Raw {
        if first == '0' {
            // Hex, octal or binary -- maybe.
            let mut c = self.next_char();
            match c {
                Some('x') | Some('X') => {
                    c = self.next_char();
                    loop {
                        if c == Some('_') {
                            c = self.next_char();
                        }
                        if !is_xdigit(c) {
                            self.back_char(c);
                            return self.syntax_error("invalid hexadecimal literal");
                        }
                        loop {
                            c = self.next_char();
                            if !is_xdigit(c) {
                                break;
                            }
                        }
                        if c != Some('_') {
                            break;
                        }
                    }
                    self.back_char(c);
                    self.finish_number()
                }
                Some('o') | Some('O') => {
                    c = self.next_char();
                    loop {
                        if c == Some('_') {
                            c = self.next_char();
                        }
                        if !c.is_some_and(|d| ('0'..'8').contains(&d)) {
                            self.back_char(c);
                            return if is_digit(c) {
                                self.syntax_error("invalid digit in octal literal")
                            } else {
                                self.syntax_error("invalid octal literal")
                            };
                        }
                        loop {
                            c = self.next_char();
                            if !c.is_some_and(|d| ('0'..'8').contains(&d)) {
                                break;
                            }
                        }
                        if c != Some('_') {
                            break;
                        }
                    }
                    if is_digit(c) {
                        return self.syntax_error("invalid digit in octal literal");
                    }
                    self.back_char(c);
                    self.finish_number()
                }
                Some('b') | Some('B') => {
                    c = self.next_char();
                    loop {
                        if c == Some('_') {
                            c = self.next_char();
                        }
                        if !matches!(c, Some('0') | Some('1')) {
                            self.back_char(c);
                            return if is_digit(c) {
                                self.syntax_error("invalid digit in binary literal")
                            } else {
                                self.syntax_error("invalid binary literal")
                            };
                        }
                        loop {
                            c = self.next_char();
                            if !matches!(c, Some('0') | Some('1')) {
                                break;
                            }
                        }
                        if c != Some('_') {
                            break;
                        }
                    }
                    if is_digit(c) {
                        return self.syntax_error("invalid digit in binary literal");
                    }
                    self.back_char(c);
                    self.finish_number()
                }
                _ => {
                    // Maybe old-style octal; in any case allow '0' itself.
                    let mut nonzero = false;
                    loop {
                        if c == Some('_') {
                            c = self.next_char();
                            if !is_digit(c) {
                                self.back_char(c);
                                return self.syntax_error("invalid decimal literal");
                            }
                        }
                        if c != Some('0') {
                            break;
                        }
                        c = self.next_char();
                    }
                    if is_digit(c) {
                        nonzero = true;
                        c = match self.decimal_tail() {
                            Ok(c) => c,
                            Err(raw) => return raw,
                        };
                    }
                    if c == Some('.') {
                        let c2 = self.next_char();
                        self.number_fraction(c2)
                    } else if matches!(c, Some('e') | Some('E')) {
                        self.number_exponent(c)
                    } else if matches!(c, Some('j') | Some('J')) {
                        self.number_imaginary()
                    } else if nonzero {
                        // Old-style octal: now disallowed.
                        self.back_char(c);
                        self.syntax_error(
                            "leading zeros in decimal integer literals are not permitted; \
                             use an 0o prefix for octal integers",
                        )
                    } else {
                        self.back_char(c);
                        self.finish_number()
                    }
                }
            }
        } else {
            let c = match self.decimal_tail() {
                Ok(c) => c,
                Err(raw) => return raw,
            };
            if c == Some('.') {
                let c2 = self.next_char();
                self.number_fraction(c2)
            } else {
                self.number_exponent(c)
            }
        }
    }

    /// Fraction part; `c` is the first character after the dot.
    fn number_fraction(&mut self, mut c: Option<char>) -> Raw {
        if is_digit(c) {
            c = match self.decimal_tail() {
                Ok(c) => c,
                Err(raw) => return raw,
            };
        }
        self.number_exponent(c)
    }

    /// Exponent part (if `c` starts one), then the imaginary suffix.
    fn number_exponent(&mut self, mut c: Option<char>) -> Raw {
        if matches!(c, Some('e') | Some('E')) {
            let e = c;
            c = self.next_char();
            if matches!(c, Some('+') | Some('-')) {
                c = self.next_char();
                if !is_digit(c) {
                    self.back_char(c);
                    return self.syntax_error("invalid decimal literal");
                }
            } else if !is_digit(c) {
                // A bare 'e' after the digits is not an exponent: give both
                // characters back and end the number before them.
                self.back_char(c);
                self.back_char(e);
                return self.finish_number();
            }
            c = match self.decimal_tail() {
                Ok(c) => c,
                Err(raw) => return raw,
            };
        }
        if matches!(c, Some('j') | Some('J')) {
            return self.number_imaginary();
        }
        self.back_char(c);
        self.finish_number()
    }

    /// Imaginary suffix; the 'j' has already been consumed.
    fn number_imaginary(&mut self) -> Raw {
        let c = self.next_char();
        self.back_char(c);
        self.finish_number()
    }

    /// Scan a string literal; the opening quote has been consumed. The token
    /// text keeps any prefix letters, the quotes and the raw (unescaped)
    /// body.
    fn string_token(&mut self, quote: char) -> Raw {
        let mut quote_size = 1usize; // 1 or 3
        let mut end_quote_size = 0usize;

        // Multi-line strings need the starting line number and column of
        // their first line for the token span.
        self.first_lineno = self.lineno;
        self.multi_line_start = self.line_start;

        // Find the quote size and start of string.
        let mut c = self.next_char();
        if c == Some(quote) {
            c = self.next_char();
            if c == Some(quote) {
                quote_size = 3;
            } else {
                end_quote_size = 1; // empty string found
            }
        }
        if c != Some(quote) {
            self.back_char(c);
        }

        // Get the rest of the string.
        while end_quote_size != quote_size {
            c = self.next_char();
            match c {
                None => {
                    let status = if quote_size == 3 {
                        TokStatus::EofInString
                    } else {
                        TokStatus::EolInString
                    };
                    return self.status_error(status);
                }
                Some('\n') if quote_size == 1 => {
                    return self.status_error(TokStatus::EolInString);
                }
                Some(ch) if ch == quote => {
                    end_quote_size += 1;
                }
                Some('\\') => {
                    end_quote_size = 0;
                    self.next_char(); // skip escaped char
                }
                Some(_) => {
                    end_quote_size = 0;
                }
            }
        }

        let start = self.start.unwrap_or(self.cur);
        Raw::span(TokenKind::Str, start, self.cur)
    }
}
