//! Type aliases and utilities for Kotlin CST nodes
//!
//! These types are built on top of Rowan's generic tree types, parameterized
//! with our `KotlinLanguage`.

use super::{KotlinLanguage, KotlinSyntaxKind};

/// A node in the Kotlin concrete syntax tree
///
/// Provides parent/child navigation, lossless text reconstruction and kind
/// queries. The newtype exists so the tree can be handed to worker threads.
///
/// # Example
///
/// ```rust,ignore
/// use ruledoc_core::cst::{KtSyntaxNode, KotlinSyntaxKind};
///
/// fn class_names(root: &KtSyntaxNode) -> Vec<String> {
///     root.descendants()
///         .filter(|node| node.kind() == KotlinSyntaxKind::ClassDecl)
///         .map(|node| node.text().to_string())
///         .collect()
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct KtSyntaxNode(rowan::SyntaxNode<KotlinLanguage>);

impl KtSyntaxNode {
    pub fn new(node: rowan::SyntaxNode<KotlinLanguage>) -> Self {
        Self(node)
    }

    pub fn new_root(green: rowan::GreenNode) -> Self {
        Self(rowan::SyntaxNode::new_root(green))
    }

    // Wrapper methods that return KtSyntaxNode instead of rowan::SyntaxNode
    pub fn parent(&self) -> Option<KtSyntaxNode> {
        self.0.parent().map(KtSyntaxNode::from)
    }

    pub fn children(&self) -> impl Iterator<Item = KtSyntaxNode> + '_ {
        self.0.children().map(KtSyntaxNode::from)
    }

    pub fn first_child(&self) -> Option<KtSyntaxNode> {
        self.0.first_child().map(KtSyntaxNode::from)
    }

    pub fn next_sibling(&self) -> Option<KtSyntaxNode> {
        self.0.next_sibling().map(KtSyntaxNode::from)
    }

    pub fn descendants(&self) -> impl Iterator<Item = KtSyntaxNode> + '_ {
        self.0.descendants().map(KtSyntaxNode::from)
    }

    pub fn ancestors(&self) -> impl Iterator<Item = KtSyntaxNode> + '_ {
        self.0.ancestors().map(KtSyntaxNode::from)
    }

    pub fn kind(&self) -> KotlinSyntaxKind {
        self.0.kind()
    }

    pub fn text_range(&self) -> TextRange {
        self.0.text_range()
    }

    pub fn text(&self) -> rowan::SyntaxText {
        self.0.text()
    }

    pub fn children_with_tokens(&self) -> rowan::SyntaxElementChildren<KotlinLanguage> {
        self.0.children_with_tokens()
    }

    pub fn descendants_with_tokens(&self) -> impl Iterator<Item = KtSyntaxElement> + '_ {
        self.0.descendants_with_tokens()
    }

    pub fn preorder(&self) -> impl Iterator<Item = WalkEvent<KtSyntaxNode>> + '_ {
        self.0
            .preorder()
            .map(|event| event.map(KtSyntaxNode::from))
    }
}

impl std::ops::Deref for KtSyntaxNode {
    type Target = rowan::SyntaxNode<KotlinLanguage>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<rowan::SyntaxNode<KotlinLanguage>> for KtSyntaxNode {
    fn from(node: rowan::SyntaxNode<KotlinLanguage>) -> Self {
        Self(node)
    }
}

impl AsRef<rowan::SyntaxNode<KotlinLanguage>> for KtSyntaxNode {
    fn as_ref(&self) -> &rowan::SyntaxNode<KotlinLanguage> {
        &self.0
    }
}

// SAFETY: Rowan nodes are immutable after creation and use Arc internally
unsafe impl Send for KtSyntaxNode {}
unsafe impl Sync for KtSyntaxNode {}

/// A token in the Kotlin concrete syntax tree
pub type KtSyntaxToken = rowan::SyntaxToken<KotlinLanguage>;

/// Either a node or a token in the CST
pub type KtSyntaxElement = rowan::SyntaxElement<KotlinLanguage>;

pub use rowan::{NodeOrToken, TextRange, TextSize, WalkEvent};

/// Extension trait for KtSyntaxNode with Kotlin-specific helpers
pub trait KtSyntaxNodeExt {
    /// Check if this node matches the given kind
    fn is_kind(&self, kind: KotlinSyntaxKind) -> bool;

    /// Find the first child node of a specific kind
    fn child_of_kind(&self, kind: KotlinSyntaxKind) -> Option<KtSyntaxNode>;

    /// Find all child nodes of a specific kind
    fn children_of_kind(&self, kind: KotlinSyntaxKind) -> Vec<KtSyntaxNode>;

    /// Find the first child token of a specific kind
    fn token_of_kind(&self, kind: KotlinSyntaxKind) -> Option<KtSyntaxToken>;

    /// Get the node text without leading/trailing whitespace
    fn trimmed_text(&self) -> String;

    /// Get the node text with all trivia tokens dropped
    fn text_without_trivia(&self) -> String;
}

impl KtSyntaxNodeExt for KtSyntaxNode {
    fn is_kind(&self, kind: KotlinSyntaxKind) -> bool {
        self.kind() == kind
    }

    fn child_of_kind(&self, kind: KotlinSyntaxKind) -> Option<KtSyntaxNode> {
        self.children().find(|child| child.kind() == kind)
    }

    fn children_of_kind(&self, kind: KotlinSyntaxKind) -> Vec<KtSyntaxNode> {
        self.children()
            .filter(|child| child.kind() == kind)
            .collect()
    }

    fn token_of_kind(&self, kind: KotlinSyntaxKind) -> Option<KtSyntaxToken> {
        self.children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == kind)
    }

    fn trimmed_text(&self) -> String {
        self.text().to_string().trim().to_string()
    }

    fn text_without_trivia(&self) -> String {
        self.descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| !token.kind().is_trivia())
            .map(|token| token.text().to_string())
            .collect()
    }
}

/// Extension trait for KtSyntaxToken with Kotlin-specific helpers
pub trait KtSyntaxTokenExt {
    /// Check if this token matches the given kind
    fn is_kind(&self, kind: KotlinSyntaxKind) -> bool;

    /// Check if this is a trivia token (whitespace, comment)
    fn is_trivia(&self) -> bool;
}

impl KtSyntaxTokenExt for KtSyntaxToken {
    fn is_kind(&self, kind: KotlinSyntaxKind) -> bool {
        self.kind() == kind
    }

    fn is_trivia(&self) -> bool {
        self.kind().is_trivia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::GreenNodeBuilder;

    fn build_test_tree() -> KtSyntaxNode {
        let mut builder = GreenNodeBuilder::new();

        builder.start_node(KotlinSyntaxKind::ClassDecl.into());
        builder.token(KotlinSyntaxKind::ClassKw.into(), "class");
        builder.token(KotlinSyntaxKind::Whitespace.into(), " ");
        builder.token(KotlinSyntaxKind::Ident.into(), "StyleProvider");
        builder.token(KotlinSyntaxKind::Whitespace.into(), " ");
        builder.finish_node();

        KtSyntaxNode::new_root(builder.finish())
    }

    #[test]
    fn test_node_kind() {
        let tree = build_test_tree();
        assert_eq!(tree.kind(), KotlinSyntaxKind::ClassDecl);
        assert!(tree.is_kind(KotlinSyntaxKind::ClassDecl));
        assert!(!tree.is_kind(KotlinSyntaxKind::ObjectDecl));
    }

    #[test]
    fn test_token_extraction() {
        let tree = build_test_tree();

        let ident = tree.token_of_kind(KotlinSyntaxKind::Ident);
        assert_eq!(ident.unwrap().text(), "StyleProvider");
        assert!(tree.token_of_kind(KotlinSyntaxKind::ObjectKw).is_none());
    }

    #[test]
    fn test_text_helpers() {
        let tree = build_test_tree();
        assert_eq!(tree.text().to_string(), "class StyleProvider ");
        assert_eq!(tree.trimmed_text(), "class StyleProvider");
        assert_eq!(tree.text_without_trivia(), "classStyleProvider");
    }

    #[test]
    fn test_trivia_detection() {
        let tree = build_test_tree();

        let whitespace = tree.token_of_kind(KotlinSyntaxKind::Whitespace).unwrap();
        assert!(whitespace.is_trivia());

        let keyword = tree.token_of_kind(KotlinSyntaxKind::ClassKw).unwrap();
        assert!(!keyword.is_trivia());
    }
}
