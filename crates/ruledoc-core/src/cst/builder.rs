//! Green tree builder used by the parser
//!
//! Thin wrapper around `rowan::GreenNodeBuilder` that speaks in
//! `KotlinSyntaxKind` and `CstToken` terms.

use rowan::{Checkpoint, GreenNodeBuilder};

use super::{CstToken, KotlinSyntaxKind, KtSyntaxNode};

/// Incremental CST builder
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            inner: GreenNodeBuilder::new(),
        }
    }

    /// Open a new node; every call must be paired with `finish_node`
    pub fn start_node(&mut self, kind: KotlinSyntaxKind) {
        self.inner.start_node(kind.into());
    }

    /// Open a node that wraps everything added since `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: KotlinSyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    /// Add a raw token
    pub fn token(&mut self, kind: KotlinSyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    /// Add a lexed token verbatim
    pub fn add_token(&mut self, token: &CstToken) {
        self.inner.token(token.kind.into(), &token.text);
    }

    pub fn finish(self) -> KtSyntaxNode {
        KtSyntaxNode::new_root(self.inner.finish())
    }
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a flat CST (every token directly under `SourceFile`)
///
/// Useful for inspecting lexer output as a tree.
pub fn build_cst_from_tokens(tokens: &[CstToken]) -> KtSyntaxNode {
    let mut builder = CstBuilder::new();
    builder.start_node(KotlinSyntaxKind::SourceFile);
    for token in tokens {
        builder.add_token(token);
    }
    builder.finish_node();
    builder.finish()
}
