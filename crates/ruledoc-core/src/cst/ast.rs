//! Typed AST layer over CST
//!
//! This module provides ergonomic, type-safe wrappers over the raw CST nodes.
//! Each wrapper implements a `cast()` method to safely convert from CST nodes.
//! Only the constructs the collectors read are modelled; everything else is
//! reachable through [`AstNode::syntax`].
//!
//! # Example
//!
//! ```ignore
//! use ruledoc_core::cst::{parse_kotlin, ast::{AstNode, SourceFile}};
//!
//! let (cst, _, _) = parse_kotlin("class StyleProvider : RuleSetProvider");
//! let file = SourceFile::cast(cst).unwrap();
//! let class = file.classes_or_objects().next().unwrap();
//!
//! assert_eq!(class.name().unwrap(), "StyleProvider");
//! ```

use super::{KotlinSyntaxKind, KtSyntaxNode, KtSyntaxNodeExt, KtSyntaxToken};
use crate::kdoc::KDoc;

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: KotlinSyntaxKind) -> bool;
    fn cast(node: KtSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &KtSyntaxNode;
}

/// Helper function to get the text of the first direct identifier token
fn ident_text(node: &KtSyntaxNode) -> Option<String> {
    node.token_of_kind(KotlinSyntaxKind::Ident)
        .map(|token| token.text().to_string())
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            syntax: KtSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: KotlinSyntaxKind) -> bool {
                matches!(kind, $(KotlinSyntaxKind::$kind)|+)
            }

            fn cast(node: KtSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &KtSyntaxNode {
                &self.syntax
            }
        }
    };
}

// ============================================================================
// Source file
// ============================================================================

ast_node!(
    /// Root of one Kotlin source unit
    SourceFile,
    SourceFile
);

impl SourceFile {
    /// Every class, object and enum entry in the file, nested ones included
    pub fn classes_or_objects(&self) -> impl Iterator<Item = ClassOrObject> + '_ {
        self.syntax.descendants().filter_map(ClassOrObject::cast)
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(
    /// Class, interface, object (named, companion or literal) or enum entry
    ClassOrObject,
    ClassDecl | ObjectDecl | EnumEntry
);

impl ClassOrObject {
    /// Declared name; `None` for anonymous and unnamed companion objects
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn is_object(&self) -> bool {
        self.syntax.kind() == KotlinSyntaxKind::ObjectDecl
    }

    pub fn modifier_list(&self) -> Option<ModifierList> {
        self.syntax
            .child_of_kind(KotlinSyntaxKind::ModifierList)
            .and_then(ModifierList::cast)
    }

    /// The KDoc comment attached in front of the declaration
    pub fn doc_comment(&self) -> Option<KtSyntaxToken> {
        self.syntax
            .children_with_tokens()
            .map_while(|element| element.into_token().filter(|token| token.kind().is_trivia()))
            .filter(|token| token.kind() == KotlinSyntaxKind::DocComment)
            .last()
    }

    /// Parsed form of [`Self::doc_comment`]
    pub fn kdoc(&self) -> Option<KDoc> {
        self.doc_comment().map(|token| KDoc::parse(token.text()))
    }

    pub fn super_type_list(&self) -> Option<SuperTypeList> {
        self.syntax
            .child_of_kind(KotlinSyntaxKind::SuperTypeList)
            .and_then(SuperTypeList::cast)
    }

    pub fn body(&self) -> Option<KtSyntaxNode> {
        self.syntax.child_of_kind(KotlinSyntaxKind::ClassBody)
    }

    /// Properties declared directly in the body
    pub fn properties(&self) -> Vec<Property> {
        self.body()
            .map(|body| body.children().filter_map(Property::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(SuperTypeList, SuperTypeList);

impl SuperTypeList {
    pub fn entries(&self) -> impl Iterator<Item = SuperTypeEntry> + '_ {
        self.syntax.children().filter_map(SuperTypeEntry::cast)
    }
}

ast_node!(
    /// One supertype: `Base`, `Base(args)` or `Base by delegate`
    SuperTypeEntry,
    SuperTypeEntry
);

impl SuperTypeEntry {
    pub fn type_reference(&self) -> Option<KtSyntaxNode> {
        self.syntax.child_of_kind(KotlinSyntaxKind::TypeReference)
    }

    /// Simple name of the referenced user type
    ///
    /// For `io.gitlab.api.RuleSetProvider<T>?` this is `RuleSetProvider`.
    /// Function types have no referenced name.
    pub fn referenced_name(&self) -> Option<String> {
        let mut node = self.type_reference()?;
        loop {
            let next = node.children().find(|child| {
                matches!(
                    child.kind(),
                    KotlinSyntaxKind::UserType | KotlinSyntaxKind::NullableType
                )
            })?;
            node = next;
            if node.kind() == KotlinSyntaxKind::UserType {
                break;
            }
        }

        node.children_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| token.kind() == KotlinSyntaxKind::Ident)
            .last()
            .map(|token| token.text().to_string())
    }

    /// Constructor call arguments, as in `Base(config)`
    pub fn value_arguments(&self) -> Vec<ValueArgument> {
        value_arguments_of(&self.syntax)
    }
}

ast_node!(
    /// `val`/`var` declaration, member or local
    Property,
    PropertyDecl
);

impl Property {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn modifier_list(&self) -> Option<ModifierList> {
        self.syntax
            .child_of_kind(KotlinSyntaxKind::ModifierList)
            .and_then(ModifierList::cast)
    }

    pub fn is_override(&self) -> bool {
        self.modifier_list()
            .is_some_and(|modifiers| modifiers.has_modifier("override"))
    }

    /// Expression after `=`
    pub fn initializer(&self) -> Option<Expr> {
        self.syntax
            .children_with_tokens()
            .skip_while(|element| element.kind() != KotlinSyntaxKind::Eq)
            .filter_map(|element| element.into_node())
            .next()
            .and_then(|node| Expr::cast(KtSyntaxNode::from(node)))
    }

    /// Closest class or object around this property
    pub fn containing_class_or_object(&self) -> Option<ClassOrObject> {
        self.syntax
            .ancestors()
            .skip(1)
            .find_map(ClassOrObject::cast)
    }
}

ast_node!(
    /// Annotations and modifier keywords of a declaration
    ModifierList,
    ModifierList
);

impl ModifierList {
    /// Check for a modifier keyword such as `override` or `private`
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers().any(|word| word == modifier)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = String> + '_ {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| token.kind() == KotlinSyntaxKind::Ident)
            .map(|token| token.text().to_string())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Any expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Reference(ReferenceExpr),
    Call(CallExpr),
    StringTemplate(StringTemplate),
    Other(KtSyntaxNode),
}

impl AstNode for Expr {
    fn can_cast(kind: KotlinSyntaxKind) -> bool {
        use KotlinSyntaxKind as K;
        matches!(
            kind,
            K::CallExpr
                | K::LambdaExpr
                | K::ReferenceExpr
                | K::DotQualifiedExpr
                | K::SafeQualifiedExpr
                | K::CallableReferenceExpr
                | K::IndexExpr
                | K::PrefixExpr
                | K::PostfixExpr
                | K::BinaryExpr
                | K::BinaryWithTypeExpr
                | K::IsExpr
                | K::ParenExpr
                | K::StringTemplate
                | K::ConstantExpr
                | K::ThisExpr
                | K::SuperExpr
                | K::IfExpr
                | K::WhenExpr
                | K::TryExpr
                | K::ForExpr
                | K::WhileExpr
                | K::DoWhileExpr
                | K::ReturnExpr
                | K::ThrowExpr
                | K::BreakExpr
                | K::ContinueExpr
                | K::ObjectLiteralExpr
                | K::CollectionLiteralExpr
                | K::FunctionDecl
        )
    }

    fn cast(node: KtSyntaxNode) -> Option<Self> {
        if !Self::can_cast(node.kind()) {
            return None;
        }
        let expr = match node.kind() {
            KotlinSyntaxKind::ReferenceExpr => Self::Reference(ReferenceExpr { syntax: node }),
            KotlinSyntaxKind::CallExpr => Self::Call(CallExpr { syntax: node }),
            KotlinSyntaxKind::StringTemplate => Self::StringTemplate(StringTemplate { syntax: node }),
            _ => Self::Other(node),
        };
        Some(expr)
    }

    fn syntax(&self) -> &KtSyntaxNode {
        match self {
            Self::Reference(reference) => reference.syntax(),
            Self::Call(call) => call.syntax(),
            Self::StringTemplate(template) => template.syntax(),
            Self::Other(node) => node,
        }
    }
}

impl Expr {
    /// The reference this expression names: itself for a simple name, the
    /// callee for a call on a simple name (`RuleA(config)`), otherwise `None`
    pub fn reference_expression(&self) -> Option<ReferenceExpr> {
        match self {
            Self::Reference(reference) => Some(reference.clone()),
            Self::Call(call) => match call.callee()? {
                Self::Reference(reference) => Some(reference),
                _ => None,
            },
            Self::StringTemplate(_) | Self::Other(_) => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallExpr> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_string_template(&self) -> Option<&StringTemplate> {
        match self {
            Self::StringTemplate(template) => Some(template),
            _ => None,
        }
    }

    /// Source text without surrounding whitespace
    pub fn text(&self) -> String {
        self.syntax().trimmed_text()
    }
}

ast_node!(
    /// A simple name used as an expression
    ReferenceExpr,
    ReferenceExpr
);

impl ReferenceExpr {
    pub fn name(&self) -> String {
        self.syntax.trimmed_text()
    }
}

ast_node!(
    /// Call with value arguments and/or a trailing lambda
    CallExpr,
    CallExpr
);

impl CallExpr {
    /// The called expression (`RuleSet` in `RuleSet(id, rules)`)
    pub fn callee(&self) -> Option<Expr> {
        self.syntax.first_child().and_then(Expr::cast)
    }

    /// Callee source text, empty when the callee is missing
    pub fn callee_text(&self) -> String {
        self.callee().map(|callee| callee.text()).unwrap_or_default()
    }

    /// Arguments inside the parentheses, in source order
    pub fn value_arguments(&self) -> Vec<ValueArgument> {
        value_arguments_of(&self.syntax)
    }
}

fn value_arguments_of(node: &KtSyntaxNode) -> Vec<ValueArgument> {
    node.child_of_kind(KotlinSyntaxKind::ValueArgumentList)
        .map(|list| list.children().filter_map(ValueArgument::cast).collect())
        .unwrap_or_default()
}

ast_node!(ValueArgument, ValueArgument);

impl ValueArgument {
    /// Name of a named argument (`name = value`)
    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_of_kind(KotlinSyntaxKind::ValueArgumentName)
            .and_then(|name| ident_text(&name))
    }

    pub fn expression(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(
    /// String literal, possibly with `$name` / `${...}` entries
    StringTemplate,
    StringTemplate
);

impl StringTemplate {
    pub fn entries(&self) -> Vec<StringTemplateEntry> {
        self.syntax
            .children()
            .filter_map(StringTemplateEntry::cast)
            .collect()
    }

    pub fn has_interpolation(&self) -> bool {
        self.entries().iter().any(StringTemplateEntry::is_interpolation)
    }
}

/// One segment of a string template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringTemplateEntry {
    /// Plain text
    Literal(KtSyntaxNode),
    /// `\n`, `A`, ...
    Escape(KtSyntaxNode),
    /// `$name`
    Short(KtSyntaxNode),
    /// `${expression}`
    Long(KtSyntaxNode),
}

impl StringTemplateEntry {
    pub fn cast(node: KtSyntaxNode) -> Option<Self> {
        let entry = match node.kind() {
            KotlinSyntaxKind::LiteralStringTemplateEntry => Self::Literal(node),
            KotlinSyntaxKind::EscapeStringTemplateEntry => Self::Escape(node),
            KotlinSyntaxKind::ShortStringTemplateEntry => Self::Short(node),
            KotlinSyntaxKind::LongStringTemplateEntry => Self::Long(node),
            _ => return None,
        };
        Some(entry)
    }

    pub fn syntax(&self) -> &KtSyntaxNode {
        match self {
            Self::Literal(node) | Self::Escape(node) | Self::Short(node) | Self::Long(node) => node,
        }
    }

    /// Source text of the segment, exactly as written
    pub fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    pub fn is_interpolation(&self) -> bool {
        matches!(self, Self::Short(_) | Self::Long(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_kotlin;

    fn source_file(source: &str) -> SourceFile {
        let (cst, _, errors) = parse_kotlin(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        SourceFile::cast(cst).unwrap()
    }

    fn first<N: AstNode>(file: &SourceFile) -> N {
        file.syntax().descendants().find_map(N::cast).unwrap()
    }

    #[test]
    fn test_class_name_and_doc_comment() {
        let file = source_file("/** First */\n/** Second */\n@Suppress(\"x\")\nclass Foo\n");
        let class = file.classes_or_objects().next().unwrap();

        assert_eq!(class.name().as_deref(), Some("Foo"));
        assert_eq!(class.doc_comment().unwrap().text(), "/** Second */");
        assert!(class.modifier_list().is_some());
    }

    #[test]
    fn test_class_without_doc_comment() {
        let file = source_file("// not a doc\nobject Registry\n");
        let object = file.classes_or_objects().next().unwrap();

        assert!(object.is_object());
        assert!(object.doc_comment().is_none());
        assert!(object.kdoc().is_none());
    }

    #[test]
    fn test_super_type_referenced_names() {
        let file = source_file(
            "class A : io.api.RuleSetProvider, Base(config), Generic<Int>?, (Int) -> Unit\n",
        );
        let list: SuperTypeList = first(&file);
        let names: Vec<_> = list.entries().map(|entry| entry.referenced_name()).collect();

        assert_eq!(
            names,
            vec![
                Some("RuleSetProvider".to_string()),
                Some("Base".to_string()),
                Some("Generic".to_string()),
                None,
            ]
        );
        let base = list.entries().nth(1).unwrap();
        assert_eq!(base.value_arguments().len(), 1);
    }

    #[test]
    fn test_property_accessors() {
        let file = source_file(
            "class P : Base {\n    override val ruleSetId: String = \"style\"\n    private var other by lazy { 1 }\n}\n",
        );
        let class = file.classes_or_objects().next().unwrap();
        let properties = class.properties();
        assert_eq!(properties.len(), 2);

        let id = &properties[0];
        assert!(id.is_override());
        assert_eq!(id.name().as_deref(), Some("ruleSetId"));
        let initializer = id.initializer().unwrap();
        assert_eq!(initializer.text(), "\"style\"");
        assert_eq!(
            id.containing_class_or_object().unwrap().name().as_deref(),
            Some("P")
        );

        let other = &properties[1];
        assert!(!other.is_override());
        assert!(other.initializer().is_none());
    }

    #[test]
    fn test_call_arguments_and_references() {
        let file = source_file(
            "val x = RuleSet(id, listOf(RuleA(config), RuleB, a.b.C(config), \"s\", name = Rule))\n",
        );
        let call: CallExpr = first(&file);
        assert_eq!(call.callee_text(), "RuleSet");

        let arguments = call.value_arguments();
        assert_eq!(arguments.len(), 2);
        let list = arguments[1].expression().unwrap();
        assert_eq!(
            list.reference_expression().map(|reference| reference.name()),
            Some("listOf".to_string())
        );

        let rules: Vec<_> = list
            .as_call()
            .unwrap()
            .value_arguments()
            .iter()
            .map(|argument| {
                argument
                    .expression()
                    .and_then(|expr| expr.reference_expression())
                    .map(|reference| reference.name())
            })
            .collect();
        assert_eq!(
            rules,
            vec![
                Some("RuleA".to_string()),
                Some("RuleB".to_string()),
                None,
                None,
                Some("Rule".to_string()),
            ]
        );
        assert_eq!(
            list.as_call().unwrap().value_arguments()[4].name().as_deref(),
            Some("name")
        );
    }

    #[test]
    fn test_string_template_entries() {
        let file = source_file("val a = \"plain\"\nval b = \"id-$suffix\"\nval c = \"\"\n");
        let templates: Vec<StringTemplate> = file
            .syntax()
            .descendants()
            .filter_map(StringTemplate::cast)
            .collect();

        assert_eq!(templates[0].entries().len(), 1);
        assert_eq!(templates[0].entries()[0].text(), "plain");
        assert!(!templates[0].has_interpolation());

        assert!(templates[1].has_interpolation());
        assert!(templates[2].entries().is_empty());
    }
}
