use std::ops::Range;
use std::sync::Arc;

use crate::Result;
use crate::cst::KtSyntaxNode;
use crate::cst::ast::{AstNode, SourceFile};

/// Outcome of parsing Kotlin content.
#[derive(Debug)]
pub struct ParseResult {
    /// Original source that was parsed.
    pub source: Arc<str>,
    /// Parsed CST root node.
    pub cst: KtSyntaxNode,
    /// Combined lexer and parser errors.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn cst(&self) -> &KtSyntaxNode {
        &self.cst
    }

    /// Typed view of the root node
    pub fn source_file(&self) -> Option<SourceFile> {
        SourceFile::cast(self.cst.clone())
    }
}

/// Stateless Kotlin parser, safe to call from many threads at once
#[derive(Debug, Default)]
pub struct KotlinParser;

impl KotlinParser {
    /// Parse Kotlin content
    ///
    /// Never fails on malformed input: errors are reported on the result and
    /// the tree still covers every byte of the source.
    pub fn parse_content(content: &str) -> Result<ParseResult> {
        let source: Arc<str> = Arc::from(content);

        let (cst, lex_errors, parse_errors) = crate::cst::parse_kotlin(&source);

        let mut errors = Vec::with_capacity(lex_errors.len() + parse_errors.len());
        for error in lex_errors {
            errors.push(ParseError::from_span(
                &source,
                error.message,
                error.span,
                ParseErrorKind::Lexer,
            ));
        }
        for error in parse_errors {
            errors.push(ParseError::from_span(
                &source,
                error.message,
                error.span,
                ParseErrorKind::Parser,
            ));
        }
        errors.sort_by_key(|error| error.offset);

        Ok(ParseResult {
            source,
            cst,
            errors,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Zero-based line
    pub line: usize,
    /// Zero-based column, in characters
    pub column: usize,
    pub offset: usize,
    pub length: usize,
    pub span: Range<usize>,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lexer,
    Parser,
}

impl ParseError {
    fn from_span(source: &str, message: String, span: Range<usize>, kind: ParseErrorKind) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        let length = span.end.saturating_sub(span.start);
        Self {
            message,
            line,
            column,
            offset: span.start,
            length,
            span,
            kind,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line + 1, self.column + 1, self.message)
    }
}

fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0usize;
    let mut column = 0usize;
    let mut current = 0usize;

    for ch in source.chars() {
        if current >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }

        current += ch.len_utf8();
    }

    (line, column)
}
