//! Depth-first traversal with typed callbacks
//!
//! [`walk`] visits every node of a tree in document order. Each node is
//! classified into an [`Element`] so visitors match on the constructs they
//! care about and ignore the rest. `enter` fires before a node's children,
//! `leave` after them; the first error stops the walk.

use super::ast::{AstNode, CallExpr, ClassOrObject, Property, SuperTypeList};
use super::{KtSyntaxNode, WalkEvent};

/// A syntax node classified by the constructs visitors react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    ClassOrObject(ClassOrObject),
    SuperTypeList(SuperTypeList),
    Property(Property),
    Call(CallExpr),
    Other(KtSyntaxNode),
}

impl Element {
    pub fn from_node(node: KtSyntaxNode) -> Self {
        ClassOrObject::cast(node.clone())
            .map(Self::ClassOrObject)
            .or_else(|| SuperTypeList::cast(node.clone()).map(Self::SuperTypeList))
            .or_else(|| Property::cast(node.clone()).map(Self::Property))
            .or_else(|| CallExpr::cast(node.clone()).map(Self::Call))
            .unwrap_or(Self::Other(node))
    }

    pub fn syntax(&self) -> &KtSyntaxNode {
        match self {
            Self::ClassOrObject(class) => class.syntax(),
            Self::SuperTypeList(list) => list.syntax(),
            Self::Property(property) => property.syntax(),
            Self::Call(call) => call.syntax(),
            Self::Other(node) => node,
        }
    }
}

/// Callbacks invoked by [`walk`]
pub trait Visitor {
    type Error;

    fn enter(&mut self, _element: &Element) -> Result<(), Self::Error> {
        Ok(())
    }

    fn leave(&mut self, _element: &Element) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walk `root` and all its descendants in preorder
pub fn walk<V: Visitor>(root: &KtSyntaxNode, visitor: &mut V) -> Result<(), V::Error> {
    for event in root.preorder() {
        match event {
            WalkEvent::Enter(node) => visitor.enter(&Element::from_node(node))?,
            WalkEvent::Leave(node) => visitor.leave(&Element::from_node(node))?,
        }
    }
    Ok(())
}
