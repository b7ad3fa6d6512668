//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Every byte of the input ends up in exactly one token, so the parser can
//! build a lossless tree: `parse(source).text() == source`.
//!
//! String templates are lexed with a small mode stack: entering `"` or `"""`
//! switches to string mode, `${` switches back to code mode until the matching
//! `}` closes the template entry.

use crate::cst::KotlinSyntaxKind;
use std::ops::Range;

/// Simple span representing a range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: KotlinSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: KotlinSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Regular code; `braces` counts `{` opened inside a `${ ... }` entry
    Code { braces: usize },
    /// Inside a string literal
    Str { raw: bool },
}

/// Multi-character punctuation, longest first
const PUNCTUATION: &[(&str, KotlinSyntaxKind)] = &[
    ("===", KotlinSyntaxKind::EqEqEq),
    ("!==", KotlinSyntaxKind::ExclEqEq),
    ("..<", KotlinSyntaxKind::RangeUntil),
    ("?.", KotlinSyntaxKind::SafeAccess),
    ("?:", KotlinSyntaxKind::Elvis),
    ("!!", KotlinSyntaxKind::ExclExcl),
    ("::", KotlinSyntaxKind::ColonColon),
    ("->", KotlinSyntaxKind::Arrow),
    ("==", KotlinSyntaxKind::EqEq),
    ("!=", KotlinSyntaxKind::ExclEq),
    ("<=", KotlinSyntaxKind::LtEq),
    (">=", KotlinSyntaxKind::GtEq),
    ("&&", KotlinSyntaxKind::AndAnd),
    ("||", KotlinSyntaxKind::OrOr),
    ("++", KotlinSyntaxKind::PlusPlus),
    ("--", KotlinSyntaxKind::MinusMinus),
    ("+=", KotlinSyntaxKind::PlusEq),
    ("-=", KotlinSyntaxKind::MinusEq),
    ("*=", KotlinSyntaxKind::StarEq),
    ("/=", KotlinSyntaxKind::SlashEq),
    ("%=", KotlinSyntaxKind::PercentEq),
    ("..", KotlinSyntaxKind::Range),
    ("(", KotlinSyntaxKind::LParen),
    (")", KotlinSyntaxKind::RParen),
    ("[", KotlinSyntaxKind::LBracket),
    ("]", KotlinSyntaxKind::RBracket),
    (",", KotlinSyntaxKind::Comma),
    (".", KotlinSyntaxKind::Dot),
    ("?", KotlinSyntaxKind::Question),
    ("!", KotlinSyntaxKind::Excl),
    (":", KotlinSyntaxKind::Colon),
    (";", KotlinSyntaxKind::Semicolon),
    ("=", KotlinSyntaxKind::Eq),
    ("<", KotlinSyntaxKind::Lt),
    (">", KotlinSyntaxKind::Gt),
    ("+", KotlinSyntaxKind::Plus),
    ("-", KotlinSyntaxKind::Minus),
    ("*", KotlinSyntaxKind::Star),
    ("/", KotlinSyntaxKind::Slash),
    ("%", KotlinSyntaxKind::Percent),
    ("@", KotlinSyntaxKind::At),
    ("&", KotlinSyntaxKind::Ampersand),
];

/// Lex input preserving ALL trivia for CST construction
///
/// - Whitespace runs become `Whitespace` tokens, line breaks `Newline` tokens
/// - `//`, `/* */` and `/** */` comments are kept (block comments nest)
/// - String literals are split into template tokens
///
/// Malformed input (unterminated strings, stray characters) is reported in the
/// error list but still produces tokens covering the text.
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut lexer = Lexer::new(input);
    lexer.run();
    (lexer.tokens, lexer.errors)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    modes: Vec<Mode>,
    tokens: Vec<CstToken>,
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            modes: vec![Mode::Code { braces: 0 }],
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        if self.input.starts_with("#!") {
            let end = self.line_end(0);
            self.push(KotlinSyntaxKind::Shebang, 0, end);
        }

        while self.pos < self.input.len() {
            match self.modes.last().copied() {
                Some(Mode::Str { raw }) => self.lex_string_part(raw),
                _ => self.lex_code(),
            }
        }

        if let Some(Mode::Str { .. }) = self.modes.last() {
            self.errors.push(LexerError::new(
                "Unterminated string literal",
                span(self.input.len(), self.input.len()),
            ));
        }
    }

    fn lex_code(&mut self) {
        let input = self.input;
        let start = self.pos;
        let rest = &input[start..];
        let Some(current) = rest.chars().next() else {
            return;
        };

        match current {
            '\n' => self.push(KotlinSyntaxKind::Newline, start, start + 1),
            '\r' => {
                let end = if rest.starts_with("\r\n") {
                    start + 2
                } else {
                    start + 1
                };
                self.push(KotlinSyntaxKind::Newline, start, end);
            }
            c if c.is_whitespace() => {
                let end = self.scan_while(start, |c| c.is_whitespace() && c != '\n' && c != '\r');
                self.push(KotlinSyntaxKind::Whitespace, start, end);
            }
            '/' if rest.starts_with("//") => {
                let end = self.line_end(start);
                self.push(KotlinSyntaxKind::CommentLine, start, end);
            }
            '/' if rest.starts_with("/*") => self.lex_block_comment(start),
            '"' => {
                if rest.starts_with("\"\"\"") {
                    self.push(KotlinSyntaxKind::RawStringOpen, start, start + 3);
                    self.modes.push(Mode::Str { raw: true });
                } else {
                    self.push(KotlinSyntaxKind::StringOpen, start, start + 1);
                    self.modes.push(Mode::Str { raw: false });
                }
            }
            '\'' => self.lex_char_literal(start),
            '`' => {
                let end = match rest[1..].find(['`', '\n']) {
                    Some(offset) if rest[1 + offset..].starts_with('`') => start + offset + 2,
                    _ => {
                        let end = self.line_end(start);
                        self.errors
                            .push(LexerError::new("Unterminated quoted identifier", span(start, end)));
                        end
                    }
                };
                self.push(KotlinSyntaxKind::Ident, start, end);
            }
            '{' => {
                if let Some(Mode::Code { braces }) = self.modes.last_mut() {
                    *braces += 1;
                }
                self.push(KotlinSyntaxKind::LBrace, start, start + 1);
            }
            '}' => {
                let closes_entry = self.modes.len() > 1
                    && matches!(self.modes.last(), Some(Mode::Code { braces: 0 }));
                if closes_entry {
                    self.modes.pop();
                    self.push(KotlinSyntaxKind::LongTemplateEntryEnd, start, start + 1);
                } else {
                    if let Some(Mode::Code { braces }) = self.modes.last_mut() {
                        *braces = braces.saturating_sub(1);
                    }
                    self.push(KotlinSyntaxKind::RBrace, start, start + 1);
                }
            }
            c if c.is_ascii_digit() => self.lex_number(start),
            c if is_ident_start(c) => self.lex_word(start),
            '!' if starts_with_word(&rest[1..], "is") => {
                self.push(KotlinSyntaxKind::NotIsKw, start, start + 3);
            }
            '!' if starts_with_word(&rest[1..], "in") => {
                self.push(KotlinSyntaxKind::NotInKw, start, start + 3);
            }
            _ => {
                if let Some((text, kind)) = PUNCTUATION.iter().find(|(p, _)| rest.starts_with(p)) {
                    self.push(*kind, start, start + text.len());
                } else {
                    let end = start + current.len_utf8();
                    self.errors.push(LexerError::new(
                        format!("Unexpected character '{current}'"),
                        span(start, end),
                    ));
                    self.push(KotlinSyntaxKind::Unknown, start, end);
                }
            }
        }
    }

    fn lex_block_comment(&mut self, start: usize) {
        let input = self.input;
        let bytes = input.as_bytes();
        let rest = &input[start..];
        let is_doc = rest.starts_with("/**") && !rest.starts_with("/**/");
        let mut depth = 0usize;
        let mut i = start;
        let mut terminated = false;

        while i < bytes.len() {
            if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                depth += 1;
                i += 2;
            } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    terminated = true;
                    break;
                }
            } else {
                i += 1;
            }
        }

        if !terminated {
            self.errors
                .push(LexerError::new("Unterminated block comment", span(start, i)));
        }

        let kind = if is_doc {
            KotlinSyntaxKind::DocComment
        } else {
            KotlinSyntaxKind::CommentBlock
        };
        self.push(kind, start, i);
    }

    fn lex_char_literal(&mut self, start: usize) {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut i = start + 1;
        let mut terminated = false;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'\'' => {
                    i += 1;
                    terminated = true;
                    break;
                }
                b'\n' | b'\r' => break,
                _ => i += 1,
            }
        }

        let end = i.min(bytes.len());
        let end = self.char_boundary(end);
        if !terminated {
            self.errors
                .push(LexerError::new("Unterminated character literal", span(start, end)));
        }
        self.push(KotlinSyntaxKind::CharLiteral, start, end);
    }

    fn lex_number(&mut self, start: usize) {
        let input = self.input;
        let rest = &input[start..];
        let bytes = input.as_bytes();

        if rest.starts_with("0x") || rest.starts_with("0X") {
            let end = self.scan_while(start + 2, |c| c.is_ascii_hexdigit() || c == '_');
            let end = self.scan_integer_suffix(end);
            self.push(KotlinSyntaxKind::IntegerLiteral, start, end);
            return;
        }
        if rest.starts_with("0b") || rest.starts_with("0B") {
            let end = self.scan_while(start + 2, |c| c == '0' || c == '1' || c == '_');
            let end = self.scan_integer_suffix(end);
            self.push(KotlinSyntaxKind::IntegerLiteral, start, end);
            return;
        }

        let mut end = self.scan_while(start, |c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;

        // `1.5` is a float, `1..5` is a range and `1.foo()` is a call
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            is_float = true;
            end = self.scan_while(end + 1, |c| c.is_ascii_digit() || c == '_');
        }

        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                is_float = true;
                end = self.scan_while(exp, |c| c.is_ascii_digit() || c == '_');
            }
        }

        if matches!(bytes.get(end), Some(b'f') | Some(b'F')) {
            self.push(KotlinSyntaxKind::FloatLiteral, start, end + 1);
            return;
        }

        if is_float {
            self.push(KotlinSyntaxKind::FloatLiteral, start, end);
        } else {
            let end = self.scan_integer_suffix(end);
            self.push(KotlinSyntaxKind::IntegerLiteral, start, end);
        }
    }

    fn scan_integer_suffix(&self, mut end: usize) -> usize {
        let bytes = self.input.as_bytes();
        if matches!(bytes.get(end), Some(b'u') | Some(b'U')) {
            end += 1;
        }
        if bytes.get(end) == Some(&b'L') {
            end += 1;
        }
        end
    }

    fn lex_word(&mut self, start: usize) {
        let input = self.input;
        let end = self.scan_while(start, is_ident_continue);
        let text = &input[start..end];

        if text == "as" && input[end..].starts_with('?') {
            self.push(KotlinSyntaxKind::AsSafeKw, start, end + 1);
            return;
        }

        let kind = KotlinSyntaxKind::keyword_from_text(text).unwrap_or(KotlinSyntaxKind::Ident);
        self.push(kind, start, end);
    }

    fn lex_string_part(&mut self, raw: bool) {
        let input = self.input;
        let start = self.pos;
        let rest = &input[start..];

        if raw && rest.starts_with("\"\"\"") {
            // In `""""x""""` the closing delimiter is the last three quotes of the run
            let run = rest.bytes().take_while(|b| *b == b'"').count();
            if run > 3 {
                self.push(KotlinSyntaxKind::StringText, start, start + run - 3);
            }
            let close = self.pos;
            self.push(KotlinSyntaxKind::RawStringClose, close, close + 3);
            self.modes.pop();
            return;
        }

        if !raw && rest.starts_with('"') {
            self.push(KotlinSyntaxKind::StringClose, start, start + 1);
            self.modes.pop();
            return;
        }

        if !raw && (rest.starts_with('\n') || rest.starts_with('\r')) {
            self.errors.push(LexerError::new(
                "Unterminated string literal",
                span(start, start),
            ));
            self.modes.pop();
            return;
        }

        if !raw && rest.starts_with('\\') {
            let end = self.escape_end(start);
            self.push(KotlinSyntaxKind::StringEscape, start, end);
            return;
        }

        if rest.starts_with("${") {
            self.push(KotlinSyntaxKind::LongTemplateEntryStart, start, start + 2);
            self.modes.push(Mode::Code { braces: 0 });
            return;
        }

        if rest.starts_with('$') && rest[1..].chars().next().is_some_and(is_ident_start) {
            self.push(KotlinSyntaxKind::ShortTemplateEntryStart, start, start + 1);
            let name_start = start + 1;
            let name_end = self.scan_while(name_start, is_ident_continue);
            let kind = match &input[name_start..name_end] {
                "this" => KotlinSyntaxKind::ThisKw,
                _ => KotlinSyntaxKind::Ident,
            };
            self.push(kind, name_start, name_end);
            return;
        }

        // Plain text run; a lone `$` is literal text
        let mut end = start;
        for (offset, c) in rest.char_indices() {
            let at = start + offset;
            let tail = &input[at..];
            let stop = match c {
                '"' => !raw || tail.starts_with("\"\"\""),
                '\\' => !raw,
                '\n' | '\r' => !raw,
                '$' => {
                    tail.starts_with("${") || tail[1..].chars().next().is_some_and(is_ident_start)
                }
                _ => false,
            };
            if stop && at > start {
                break;
            }
            end = at + c.len_utf8();
            if stop {
                break;
            }
        }

        self.push(KotlinSyntaxKind::StringText, start, end);
    }

    fn escape_end(&self, start: usize) -> usize {
        let rest = &self.input[start..];
        let mut chars = rest.char_indices().skip(1);
        match chars.next() {
            Some((_, 'u')) => {
                let hex = rest[2..]
                    .chars()
                    .take(4)
                    .take_while(char::is_ascii_hexdigit)
                    .count();
                start + 2 + hex
            }
            Some((offset, c)) if c != '\n' && c != '\r' => start + offset + c.len_utf8(),
            _ => start + 1,
        }
    }

    fn push(&mut self, kind: KotlinSyntaxKind, start: usize, end: usize) {
        self.tokens
            .push(CstToken::new(kind, &self.input[start..end], span(start, end)));
        self.pos = end;
    }

    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        let mut end = from;
        for c in self.input[from..].chars() {
            if !pred(c) {
                break;
            }
            end += c.len_utf8();
        }
        end
    }

    fn line_end(&self, from: usize) -> usize {
        self.input[from..]
            .find(['\n', '\r'])
            .map(|offset| from + offset)
            .unwrap_or(self.input.len())
    }

    fn char_boundary(&self, mut index: usize) -> usize {
        while index < self.input.len() && !self.input.is_char_boundary(index) {
            index += 1;
        }
        index.min(self.input.len())
    }
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// `rest` starts with `word` and the word is not a prefix of a longer identifier
fn starts_with_word(rest: &str, word: &str) -> bool {
    rest.starts_with(word)
        && !rest[word.len()..]
            .chars()
            .next()
            .is_some_and(is_ident_continue)
}
