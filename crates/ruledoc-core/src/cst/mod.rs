//! Concrete Syntax Tree (CST) for Kotlin sources
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace, comments
//! and KDoc blocks, so collectors can read documentation and exact literal
//! text straight from the tree.
//!
//! ## Architecture
//!
//! The CST uses Rowan's green/red tree pattern:
//!
//! - **Green Tree**: Immutable, position-independent storage
//!   - Stores actual source text with trivia (whitespace, comments)
//!   - Cheap to clone (uses Arc internally)
//!
//! - **Red Tree**: Dynamically constructed view with parent pointers
//!   - Created on-demand for traversal
//!   - Wrapped by the typed API in [`ast`]
//!
//! ## Trivia Handling
//!
//! Trivia tokens are attached to the innermost node that is open when they
//! are reached. A KDoc comment directly in front of a declaration belongs to
//! that declaration's node, which is how [`ast::ClassOrObject::doc_comment`]
//! finds it.
//!
//! This enables lossless representation: `parse(source).text() == source`
//!
//! ## Example
//!
//! ```rust,ignore
//! use ruledoc_core::cst::{KotlinSyntaxKind, parse_kotlin};
//!
//! let (cst, _lexer_errors, errors) = parse_kotlin("class A : RuleSetProvider // provider\n");
//! assert!(errors.is_empty());
//!
//! for token in cst.descendants_with_tokens() {
//!     if let Some(comment) = token.as_token() {
//!         if comment.kind() == KotlinSyntaxKind::CommentLine {
//!             println!("Found comment: {}", comment.text());
//!         }
//!     }
//! }
//! ```

mod builder;
mod language;
mod lexer;
mod nodes;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod visitor;

pub use builder::{CstBuilder, build_cst_from_tokens};
pub use language::KotlinLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use nodes::*;
pub use parser::{SyntaxError, parse_kotlin};
pub use syntax_kind::KotlinSyntaxKind;
