//! Hierarchical parser for Kotlin sources
//!
//! Builds a structured CST from the trivia-preserving token stream. The
//! parser covers the declaration and expression grammar needed to walk real
//! Kotlin files: classes, objects, functions, properties, calls, lambdas,
//! string templates and control flow. Anything it does not understand is
//! wrapped in `Error` nodes so the tree always reproduces the input text.
//!
//! Newlines are significant inside blocks and class bodies (they terminate
//! expressions) and insignificant inside parentheses, brackets and type
//! argument lists. The parser tracks this with a small context stack.

use rowan::Checkpoint;

use super::lexer::CstSpan;
use super::{CstBuilder, CstToken, KotlinSyntaxKind as K, KtSyntaxNode, LexerError};

/// A structural error found while building the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: CstSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse Kotlin source into a hierarchical CST
///
/// Returns the tree together with lexer and parser errors. The tree is
/// lossless even when errors are reported.
///
/// # Example
///
/// ```rust,ignore
/// use ruledoc_core::cst::parse_kotlin;
///
/// let source = "class StyleProvider : RuleSetProvider\n";
/// let (cst, lex_errors, parse_errors) = parse_kotlin(source);
/// assert!(lex_errors.is_empty() && parse_errors.is_empty());
/// assert_eq!(cst.text().to_string(), source);
/// ```
pub fn parse_kotlin(source: &str) -> (KtSyntaxNode, Vec<LexerError>, Vec<SyntaxError>) {
    let (tokens, lex_errors) = super::lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    let (cst, errors) = parser.finish();
    (cst, lex_errors, errors)
}

/// Soft keywords that act as modifiers when followed by a declaration
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "abstract",
    "final",
    "open",
    "override",
    "sealed",
    "data",
    "enum",
    "annotation",
    "companion",
    "inner",
    "lateinit",
    "const",
    "inline",
    "noinline",
    "crossinline",
    "reified",
    "vararg",
    "suspend",
    "tailrec",
    "operator",
    "infix",
    "external",
    "expect",
    "actual",
    "value",
    "out",
];

/// Identifiers that never act as infix function names
const NON_INFIX: &[&str] = &["by", "where", "get", "set", "constructor", "init"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Class,
    Object,
    Function,
    Property,
    TypeAlias,
    SecondaryConstructor,
    Initializer,
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: CstBuilder,
    errors: Vec<SyntaxError>,
    /// `true` when newlines are insignificant in the current context
    ctx: Vec<bool>,
    /// Set while parsing `by` delegates in supertype lists, where `{` opens the body
    no_lambda: bool,
    /// Index of the dot that ends a receiver type (`fun Foo.bar()`)
    type_limit: Option<usize>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
            ctx: vec![false],
            no_lambda: false,
            type_limit: None,
        }
    }

    fn finish(self) -> (KtSyntaxNode, Vec<SyntaxError>) {
        (self.builder.finish(), self.errors)
    }

    // Top level

    /// Grammar: fileAnnotation* packageHeader? importList statement*
    fn parse_source_file(&mut self) {
        self.builder.start_node(K::SourceFile);

        while self.at_any(K::At) && self.nth_text(1) == "file" && self.nth(2) == K::Colon {
            self.parse_annotation();
        }

        if self.at_any(K::PackageKw) {
            self.parse_package();
        }

        if self.at_any(K::ImportKw) {
            self.start(K::ImportList);
            while self.at_any(K::ImportKw) {
                self.parse_import();
                while self.at_any(K::Semicolon) {
                    self.bump();
                }
            }
            self.finish_node();
        }

        self.parse_statements(true);

        self.flush_trivia();
        self.builder.finish_node(); // SOURCE_FILE
    }

    fn parse_package(&mut self) {
        self.start(K::PackageDirective);
        self.bump();
        self.parse_qualified_name();
        self.finish_node();
    }

    fn parse_import(&mut self) {
        self.start(K::ImportDirective);
        self.bump();
        self.parse_qualified_name();
        if self.at(K::AsKw) {
            self.start(K::ImportAlias);
            self.bump();
            self.expect(K::Ident);
            self.finish_node();
        }
        self.finish_node();
    }

    fn parse_qualified_name(&mut self) {
        self.start(K::QualifiedName);
        self.expect(K::Ident);
        while self.at(K::Dot) {
            match self.nth(1) {
                K::Ident => {
                    self.bump();
                    self.bump();
                }
                K::Star => {
                    self.bump();
                    self.bump();
                    break;
                }
                _ => break,
            }
        }
        self.finish_node();
    }

    // Statements

    fn parse_statements(&mut self, top_level: bool) {
        loop {
            while self.at_any(K::Semicolon) {
                self.bump();
            }
            match self.peek_any_line() {
                K::Eof => break,
                K::RBrace | K::LongTemplateEntryEnd if !top_level => break,
                _ => {}
            }

            let before = self.nth_index(0);
            self.parse_statement(!top_level);
            if self.nth_index(0) == before {
                self.bump_error();
            }
        }
    }

    fn parse_statement(&mut self, local: bool) {
        if let Some(decl) = self.declaration_ahead(false) {
            self.parse_declaration(decl, local);
            return;
        }

        let checkpoint = self.checkpoint();
        self.parse_expression();
        if matches!(
            self.peek(),
            K::Eq | K::PlusEq | K::MinusEq | K::StarEq | K::SlashEq | K::PercentEq
        ) {
            self.start_at(checkpoint, K::BinaryExpr);
            self.bump();
            self.parse_expression();
            self.finish_node();
        }
    }

    fn parse_declaration(&mut self, decl: DeclKind, local: bool) {
        match decl {
            DeclKind::Class => self.parse_class(),
            DeclKind::Object => self.parse_object(),
            DeclKind::Function => self.parse_function(),
            DeclKind::Property => self.parse_property(local),
            DeclKind::TypeAlias => self.parse_type_alias(),
            DeclKind::SecondaryConstructor => self.parse_secondary_constructor(),
            DeclKind::Initializer => self.parse_initializer(),
        }
    }

    /// Look past annotations and modifiers for a declaration keyword
    fn declaration_ahead(&self, member: bool) -> Option<DeclKind> {
        let mut i = self.nth_index(0);
        let mut prefixed = false;
        loop {
            let next = self.kind_at(self.skip_trivia_from(i + 1));
            match self.kind_at(i) {
                K::At => {
                    i = self.skip_trivia_from(self.skip_annotation(i));
                    prefixed = true;
                }
                K::Ident if self.is_modifier_at(i) => {
                    i = self.skip_trivia_from(i + 1);
                    prefixed = true;
                }
                K::ClassKw | K::InterfaceKw => return Some(DeclKind::Class),
                K::FunKw if next == K::InterfaceKw => return Some(DeclKind::Class),
                K::FunKw if next == K::LParen && !prefixed => return None,
                K::FunKw => return Some(DeclKind::Function),
                K::ObjectKw if !prefixed && matches!(next, K::Colon | K::LBrace) => return None,
                K::ObjectKw => return Some(DeclKind::Object),
                K::ValKw | K::VarKw => return Some(DeclKind::Property),
                K::TypealiasKw => return Some(DeclKind::TypeAlias),
                K::Ident if member && self.text_at(i) == "constructor" => {
                    return Some(DeclKind::SecondaryConstructor);
                }
                K::Ident if member && self.text_at(i) == "init" && next == K::LBrace => {
                    return Some(DeclKind::Initializer);
                }
                _ => return None,
            }
        }
    }

    // Declarations

    /// Grammar: modifiers? ('class' | 'interface' | 'fun interface') Ident
    ///          typeParameters? primaryConstructor? (':' superTypes)? classBody?
    fn parse_class(&mut self) {
        self.start_decl(K::ClassDecl);

        let modifiers = self.parse_modifier_list();
        let is_enum = modifiers.iter().any(|modifier| modifier == "enum");

        if self.at_any(K::FunKw) {
            self.bump();
        }
        if self.at_any(K::ClassKw) || self.at_any(K::InterfaceKw) {
            self.bump();
        } else {
            self.expect(K::ClassKw);
        }
        self.expect(K::Ident);

        if self.at(K::Lt) {
            self.parse_type_parameter_list();
        }
        if self.primary_constructor_ahead() {
            self.parse_primary_constructor();
        }
        if self.at_any(K::Colon) {
            self.parse_super_type_list();
        }
        if self.at_soft("where") {
            self.parse_type_constraints();
        }
        if self.at_any(K::LBrace) {
            self.parse_class_body(is_enum);
        }

        self.finish_node(); // CLASS_DECL
    }

    /// Also used for object literals and companion objects
    fn parse_object(&mut self) {
        self.start_decl(K::ObjectDecl);

        self.parse_modifier_list();
        self.expect(K::ObjectKw);
        if self.at(K::Ident) {
            self.bump();
        }
        if self.at_any(K::Colon) {
            self.parse_super_type_list();
        }
        if self.at_any(K::LBrace) {
            self.parse_class_body(false);
        }

        self.finish_node(); // OBJECT_DECL
    }

    fn primary_constructor_ahead(&self) -> bool {
        if self.peek() == K::Newline {
            return false;
        }
        let mut i = self.nth_index(0);
        loop {
            match self.kind_at(i) {
                K::LParen => return true,
                K::At => i = self.skip_trivia_from(self.skip_annotation(i)),
                K::Ident if self.text_at(i) == "constructor" => return true,
                K::Ident if self.is_modifier_at(i) => i = self.skip_trivia_from(i + 1),
                _ => return false,
            }
        }
    }

    fn parse_primary_constructor(&mut self) {
        self.start(K::PrimaryConstructor);
        self.parse_modifier_list();
        if self.at_soft("constructor") {
            self.bump();
        }
        self.parse_parameter_list();
        self.finish_node();
    }

    /// Grammar: ':' superTypeEntry (',' superTypeEntry)*
    fn parse_super_type_list(&mut self) {
        self.start(K::SuperTypeList);
        self.bump(); // :
        loop {
            self.parse_super_type_entry();
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.finish_node();
    }

    fn parse_super_type_entry(&mut self) {
        self.start(K::SuperTypeEntry);
        self.parse_type_reference();
        if self.at(K::LParen) {
            self.parse_value_argument_list();
        }
        if self.peek() == K::Ident && self.nth_text(0) == "by" {
            self.bump();
            let no_lambda = std::mem::replace(&mut self.no_lambda, true);
            self.parse_expression();
            self.no_lambda = no_lambda;
        }
        self.finish_node();
    }

    fn parse_class_body(&mut self, is_enum: bool) {
        self.start(K::ClassBody);
        self.bump(); // {
        self.ctx.push(false);

        if is_enum {
            self.parse_enum_entries();
        }
        self.parse_members();

        self.ctx.pop();
        self.expect_closing(K::RBrace);
        self.finish_node();
    }

    fn parse_members(&mut self) {
        loop {
            while self.at_any(K::Semicolon) {
                self.bump();
            }
            if matches!(
                self.peek_any_line(),
                K::RBrace | K::Eof | K::LongTemplateEntryEnd
            ) {
                break;
            }

            let before = self.nth_index(0);
            match self.declaration_ahead(true) {
                Some(decl) => self.parse_declaration(decl, false),
                None => self.error_and_recover("Expected a member declaration", &[], true),
            }
            if self.nth_index(0) == before {
                self.bump_error();
            }
        }
    }

    fn parse_enum_entries(&mut self) {
        loop {
            let entry_start = matches!(self.peek_any_line(), K::Ident | K::At);
            if !entry_start || self.declaration_ahead(true).is_some() {
                break;
            }

            self.start_decl(K::EnumEntry);
            self.parse_modifier_list();
            self.expect(K::Ident);
            if self.at(K::LParen) {
                self.parse_value_argument_list();
            }
            if self.at(K::LBrace) {
                self.parse_class_body(false);
            }
            self.finish_node();

            if !self.eat_any(K::Comma) {
                break;
            }
        }
        self.eat_any(K::Semicolon);
    }

    /// Grammar: modifiers? 'fun' typeParameters? (receiverType '.')? Ident?
    ///          valueParameters (':' type)? typeConstraints? functionBody?
    fn parse_function(&mut self) {
        self.start_decl(K::FunctionDecl);

        self.parse_modifier_list();
        self.expect(K::FunKw);
        if self.at(K::Lt) {
            self.parse_type_parameter_list();
        }
        self.parse_receiver_type();

        // Anonymous functions have no name
        if self.at(K::Ident) {
            self.bump();
        } else if !self.at(K::LParen) {
            self.error("Expected function name");
        }

        if self.at_any(K::LParen) {
            self.parse_parameter_list();
        } else {
            self.error("Expected parameter list");
        }
        if self.at_any(K::Colon) {
            self.bump();
            self.parse_type_reference();
        }
        if self.at_soft("where") {
            self.parse_type_constraints();
        }

        if self.at_any(K::Eq) {
            self.bump();
            self.parse_expression();
        } else if self.at_any(K::LBrace) {
            self.parse_block();
        }

        self.finish_node(); // FUNCTION_DECL
    }

    /// Grammar: modifiers? ('val' | 'var') typeParameters? (receiverType '.')?
    ///          (Ident | destructuring) (':' type)? ('=' expr | 'by' expr)? accessors?
    fn parse_property(&mut self, local: bool) {
        self.start_decl(K::PropertyDecl);

        self.parse_modifier_list();
        self.bump(); // val/var
        if self.at(K::Lt) {
            self.parse_type_parameter_list();
        }

        if self.at(K::LParen) {
            self.parse_delimited(K::ParameterList, K::RParen, Self::parse_binding_parameter);
        } else {
            self.parse_receiver_type();
            self.expect(K::Ident);
        }

        if self.at_any(K::Colon) {
            self.bump();
            self.parse_type_reference();
        }
        if self.at_soft("where") {
            self.parse_type_constraints();
        }

        if self.at_any(K::Eq) {
            self.bump();
            self.parse_expression();
        } else if self.at_soft("by") {
            self.start(K::PropertyDelegate);
            self.bump();
            self.parse_expression();
            self.finish_node();
        }

        if !local {
            self.parse_property_accessors();
        }

        self.finish_node(); // PROPERTY_DECL
    }

    fn parse_property_accessors(&mut self) {
        for _ in 0..2 {
            if !self.accessor_ahead() {
                break;
            }

            self.start_decl(K::PropertyAccessor);
            self.parse_modifier_list();
            self.bump(); // get/set
            if self.at(K::LParen) {
                self.parse_parameter_list();
                if self.at_any(K::Colon) {
                    self.bump();
                    self.parse_type_reference();
                }
            }
            if self.at_any(K::Eq) {
                self.bump();
                self.parse_expression();
            } else if self.at_any(K::LBrace) {
                self.parse_block();
            }
            self.finish_node();
        }
    }

    fn accessor_ahead(&self) -> bool {
        let mut i = self.nth_index(0);
        loop {
            match self.kind_at(i) {
                K::At => i = self.skip_trivia_from(self.skip_annotation(i)),
                K::Ident if matches!(self.text_at(i), "get" | "set") => return true,
                K::Ident if self.is_modifier_at(i) => i = self.skip_trivia_from(i + 1),
                _ => return false,
            }
        }
    }

    fn parse_type_alias(&mut self) {
        self.start_decl(K::TypeAlias);
        self.parse_modifier_list();
        self.bump(); // typealias
        self.expect(K::Ident);
        if self.at(K::Lt) {
            self.parse_type_parameter_list();
        }
        self.expect(K::Eq);
        self.parse_type_reference();
        self.finish_node();
    }

    fn parse_secondary_constructor(&mut self) {
        self.start_decl(K::SecondaryConstructor);
        self.parse_modifier_list();
        self.bump(); // constructor
        self.parse_parameter_list();

        if self.at_any(K::Colon) {
            self.start(K::ConstructorDelegationCall);
            self.bump();
            if self.at_any(K::ThisKw) || self.at_any(K::SuperKw) {
                self.bump();
            } else {
                self.error("Expected 'this' or 'super'");
            }
            if self.at(K::LParen) {
                self.parse_value_argument_list();
            }
            self.finish_node();
        }

        if self.at_any(K::LBrace) {
            self.parse_block();
        }
        self.finish_node();
    }

    fn parse_initializer(&mut self) {
        self.start_decl(K::AnonymousInitializer);
        self.bump(); // init
        self.parse_block();
        self.finish_node();
    }

    /// Parse annotations and modifier keywords, returning the modifier words
    fn parse_modifier_list(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        if !self.at_any(K::At) && !self.is_modifier_at(self.nth_index(0)) {
            return modifiers;
        }

        self.start(K::ModifierList);
        loop {
            let i = self.nth_index(0);
            if self.kind_at(i) == K::At {
                self.parse_annotation();
            } else if self.is_modifier_at(i) {
                modifiers.push(self.text_at(i).to_string());
                self.bump();
            } else {
                break;
            }
        }
        self.finish_node();

        modifiers
    }

    /// Grammar: '@' (target ':')? userType valueArguments? | '@' '[' entry+ ']'
    fn parse_annotation(&mut self) {
        self.start(K::Annotation);
        self.bump(); // @

        if self.kind_at(self.pos) == K::LBracket {
            self.bump();
            self.ctx.push(true);
            while self.at_any(K::Ident) {
                self.parse_annotation_entry();
            }
            self.ctx.pop();
            self.expect_closing(K::RBracket);
        } else {
            self.parse_annotation_entry();
        }

        self.finish_node();
    }

    fn parse_annotation_entry(&mut self) {
        self.flush_trivia();

        // Use-site target: `@get:JvmName`, `@file:Suppress`
        if self.kind_at(self.pos) == K::Ident && self.kind_at(self.pos + 1) == K::Colon {
            self.bump();
            self.bump();
        }
        if self.kind_at(self.pos) != K::Ident {
            self.error("Expected annotation name");
            return;
        }

        self.start(K::TypeReference);
        self.start(K::UserType);
        self.bump();
        while self.kind_at(self.pos) == K::Dot && self.kind_at(self.pos + 1) == K::Ident {
            self.bump();
            self.bump();
        }
        if self.kind_at(self.pos) == K::Lt {
            self.parse_type_argument_list();
        }
        self.finish_node();
        self.finish_node();

        if self.kind_at(self.pos) == K::LParen {
            self.parse_value_argument_list();
        }
    }

    fn parse_parameter_list(&mut self) {
        if self.at_any(K::LParen) {
            self.parse_delimited(K::ParameterList, K::RParen, Self::parse_parameter);
        } else {
            self.expect(K::LParen);
        }
    }

    /// Grammar: modifiers? ('val' | 'var')? Ident (':' type)? ('=' expr)?
    fn parse_parameter(&mut self) {
        self.start(K::Parameter);
        self.parse_modifier_list();
        if self.at_any(K::ValKw) || self.at_any(K::VarKw) {
            self.bump();
        }
        self.expect(K::Ident);
        if self.at_any(K::Colon) {
            self.bump();
            self.parse_type_reference();
        }
        if self.at_any(K::Eq) {
            self.bump();
            self.parse_expression();
        }
        self.finish_node();
    }

    /// Lambda, loop and destructuring parameters: `a`, `a: T`, `(a, b)`
    fn parse_binding_parameter(&mut self) {
        self.start(K::Parameter);
        self.parse_modifier_list();
        if self.at_any(K::LParen) {
            self.parse_delimited(K::ParameterList, K::RParen, Self::parse_binding_parameter);
        } else {
            self.expect(K::Ident);
        }
        if self.eat_any(K::Colon) {
            self.parse_type_reference();
        }
        self.finish_node();
    }

    fn parse_type_parameter_list(&mut self) {
        self.parse_delimited(K::TypeParameterList, K::Gt, Self::parse_type_parameter);
    }

    fn parse_type_parameter(&mut self) {
        self.start(K::TypeParameter);
        self.parse_modifier_list();
        if self.at_any(K::InKw) {
            self.bump();
        }
        self.expect(K::Ident);
        if self.eat_any(K::Colon) {
            self.parse_type_reference();
        }
        self.finish_node();
    }

    /// Grammar: 'where' Ident ':' type (',' Ident ':' type)*
    fn parse_type_constraints(&mut self) {
        self.start(K::TypeConstraintList);
        self.bump(); // where
        loop {
            self.start(K::TypeConstraint);
            self.expect(K::Ident);
            self.expect(K::Colon);
            self.parse_type_reference();
            self.finish_node();
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.finish_node();
    }

    /// Parse `Receiver.` in front of an extension function or property name
    fn parse_receiver_type(&mut self) {
        if let Some(dot) = self.receiver_dot_ahead() {
            self.type_limit = Some(dot);
            self.parse_type_reference();
            self.type_limit = None;
            self.expect(K::Dot);
        }
    }

    /// Index of the dot separating a receiver type from the declared name
    fn receiver_dot_ahead(&self) -> Option<usize> {
        let mut i = self.nth_index(0);
        if self.kind_at(i) != K::Ident {
            return None;
        }

        let mut last_dot = None;
        loop {
            i += 1;
            if self.kind_at(i) == K::Lt {
                i = self.skip_balanced(i);
            }
            if self.kind_at(i) == K::Dot && self.kind_at(i + 1) == K::Ident {
                last_dot = Some(i);
                i += 1;
            } else {
                break;
            }
        }
        last_dot
    }

    // Types

    fn parse_type_reference(&mut self) {
        self.start(K::TypeReference);

        if self.at_any(K::At) || self.at_suspend_modifier() {
            self.start(K::ModifierList);
            loop {
                if self.at_any(K::At) {
                    self.parse_annotation();
                } else if self.at_suspend_modifier() {
                    self.bump();
                } else {
                    break;
                }
            }
            self.finish_node();
        }

        self.parse_type();
        self.finish_node(); // TYPE_REFERENCE
    }

    fn at_suspend_modifier(&self) -> bool {
        self.at_soft("suspend") && self.nth(1) == K::LParen
    }

    fn parse_type(&mut self) {
        let checkpoint = self.checkpoint();

        match self.peek_any_line() {
            K::LParen if self.function_type_ahead() => {
                self.parse_function_type(checkpoint);
                return;
            }
            K::LParen => {
                self.bump();
                self.parse_type();
                self.expect_closing(K::RParen);
            }
            K::Ident => {
                self.parse_user_type();
                // Function type with receiver: `Foo.() -> Unit`
                if self.kind_at(self.pos) == K::Dot && self.kind_at(self.pos + 1) == K::LParen {
                    self.start_at(checkpoint, K::FunctionTypeReceiver);
                    self.finish_node();
                    self.bump();
                    self.parse_function_type(checkpoint);
                    return;
                }
            }
            _ => {
                self.error("Expected a type");
                return;
            }
        }

        while self.at(K::Question) {
            self.start_at(checkpoint, K::NullableType);
            self.bump();
            self.finish_node();
        }
    }

    fn function_type_ahead(&self) -> bool {
        let close = self.skip_balanced(self.nth_index(0));
        self.kind_at(self.skip_trivia_from(close)) == K::Arrow
    }

    /// Grammar: '(' parameters ')' '->' type
    fn parse_function_type(&mut self, checkpoint: Checkpoint) {
        self.start_at(checkpoint, K::FunctionType);
        self.parse_delimited(K::ParameterList, K::RParen, Self::parse_function_type_parameter);
        self.expect(K::Arrow);
        self.parse_type_reference();
        self.finish_node();
    }

    fn parse_function_type_parameter(&mut self) {
        self.start(K::Parameter);
        if self.at_any(K::Ident) && self.nth(1) == K::Colon {
            self.bump();
            self.bump();
        }
        self.parse_type_reference();
        self.finish_node();
    }

    /// Grammar: Ident typeArguments? ('.' Ident typeArguments?)*
    fn parse_user_type(&mut self) {
        self.start(K::UserType);
        self.expect(K::Ident);
        loop {
            if self.kind_at(self.pos) == K::Lt {
                self.parse_type_argument_list();
            }
            let qualified = self.kind_at(self.pos) == K::Dot
                && self.kind_at(self.pos + 1) == K::Ident
                && self.type_limit != Some(self.pos);
            if !qualified {
                break;
            }
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    fn parse_type_argument_list(&mut self) {
        self.parse_delimited(K::TypeArgumentList, K::Gt, Self::parse_type_projection);
    }

    fn parse_type_projection(&mut self) {
        self.start(K::TypeProjection);
        if self.at_any(K::Star) {
            self.bump();
        } else {
            if self.at_any(K::InKw) {
                self.bump();
            } else if self.at_soft("out") && !matches!(self.nth(1), K::Comma | K::Gt) {
                self.bump();
            }
            self.parse_type_reference();
        }
        self.finish_node();
    }

    // Expressions

    fn parse_expression(&mut self) {
        self.parse_binary(1);
    }

    /// Precedence climbing over binary operators
    fn parse_binary(&mut self, min_precedence: u8) {
        let checkpoint = self.checkpoint();
        self.parse_prefix();

        while let Some(precedence) = self.binary_precedence() {
            if precedence < min_precedence {
                break;
            }

            match self.peek_any_line() {
                K::AsKw | K::AsSafeKw => {
                    self.start_at(checkpoint, K::BinaryWithTypeExpr);
                    self.bump();
                    self.parse_type_reference();
                }
                K::IsKw | K::NotIsKw => {
                    self.start_at(checkpoint, K::IsExpr);
                    self.bump();
                    self.parse_type_reference();
                }
                _ => {
                    self.start_at(checkpoint, K::BinaryExpr);
                    self.bump();
                    self.parse_binary(precedence + 1);
                }
            }
            self.finish_node();
        }
    }

    fn binary_precedence(&self) -> Option<u8> {
        let kind = match self.peek() {
            // Only these operators may start a continuation line
            K::Newline => match self.peek_any_line() {
                kind @ (K::OrOr | K::AndAnd | K::Elvis) => kind,
                _ => return None,
            },
            kind => kind,
        };

        let precedence = match kind {
            K::OrOr => 1,
            K::AndAnd => 2,
            K::EqEq | K::ExclEq | K::EqEqEq | K::ExclEqEq => 3,
            K::Lt | K::Gt | K::LtEq | K::GtEq => 4,
            K::InKw | K::NotInKw | K::IsKw | K::NotIsKw => 5,
            K::Elvis => 6,
            K::Ident if !NON_INFIX.contains(&self.nth_text(0)) => 7,
            K::Range | K::RangeUntil => 8,
            K::Plus | K::Minus => 9,
            K::Star | K::Slash | K::Percent => 10,
            K::AsKw | K::AsSafeKw => 11,
            _ => return None,
        };
        Some(precedence)
    }

    fn parse_prefix(&mut self) {
        let i = self.nth_index(0);
        match self.kind_at(i) {
            K::Minus | K::Plus | K::Excl | K::PlusPlus | K::MinusMinus => {
                self.start(K::PrefixExpr);
                self.bump();
                self.parse_prefix();
                self.finish_node();
            }
            K::At => {
                self.start(K::PrefixExpr);
                self.parse_annotation();
                self.parse_prefix();
                self.finish_node();
            }
            // `loop@ for (...)`
            K::Ident if self.kind_at(i + 1) == K::At => {
                self.start(K::PrefixExpr);
                self.start(K::LabelQualifier);
                self.bump();
                self.bump();
                self.finish_node();
                self.parse_prefix();
                self.finish_node();
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) {
        let checkpoint = self.checkpoint();
        let is_name = self.parse_primary();
        self.parse_call_suffixes(checkpoint, is_name);

        loop {
            let kind = match self.peek() {
                // Member access may continue on the next line
                K::Newline => match self.peek_any_line() {
                    kind @ (K::Dot | K::SafeAccess) => kind,
                    _ => break,
                },
                kind => kind,
            };

            match kind {
                K::Dot | K::SafeAccess => {
                    let node = if kind == K::Dot {
                        K::DotQualifiedExpr
                    } else {
                        K::SafeQualifiedExpr
                    };
                    self.start_at(checkpoint, node);
                    self.bump();
                    let selector = self.checkpoint();
                    if self.parse_selector() {
                        self.parse_call_suffixes(selector, true);
                    }
                    self.finish_node();
                }
                K::LParen => self.parse_call_suffixes(checkpoint, false),
                K::LBracket => {
                    self.start_at(checkpoint, K::IndexExpr);
                    self.parse_delimited(K::IndexList, K::RBracket, Self::parse_expression);
                    self.finish_node();
                }
                K::ExclExcl | K::PlusPlus | K::MinusMinus => {
                    self.start_at(checkpoint, K::PostfixExpr);
                    self.bump();
                    self.finish_node();
                }
                K::ColonColon => {
                    self.start_at(checkpoint, K::CallableReferenceExpr);
                    self.bump();
                    if self.at_any(K::ClassKw) {
                        self.bump();
                    } else {
                        self.expect(K::Ident);
                    }
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    /// Selector after `.` or `?.`; returns true when it is a simple name
    fn parse_selector(&mut self) -> bool {
        match self.peek_any_line() {
            K::Ident => {
                self.start(K::ReferenceExpr);
                self.bump();
                self.finish_node();
                true
            }
            K::ClassKw => {
                self.start(K::ReferenceExpr);
                self.bump();
                self.finish_node();
                false
            }
            K::ThisKw | K::SuperKw => {
                self.parse_primary();
                false
            }
            _ => {
                self.error("Expected a member name");
                false
            }
        }
    }

    /// Call suffixes: type arguments, value arguments and a trailing lambda
    fn parse_call_suffixes(&mut self, checkpoint: Checkpoint, allow_lambda: bool) {
        let allow_lambda = allow_lambda && !self.no_lambda;
        loop {
            match self.peek() {
                K::Lt if self.type_arguments_ahead() => {
                    self.start_at(checkpoint, K::CallExpr);
                    self.parse_type_argument_list();
                    if self.at(K::LParen) {
                        self.parse_value_argument_list();
                    }
                    let lambda = allow_lambda && self.at(K::LBrace);
                    if lambda {
                        self.parse_lambda_argument();
                    }
                    self.finish_node();
                    if lambda {
                        break;
                    }
                }
                K::LParen => {
                    self.start_at(checkpoint, K::CallExpr);
                    self.parse_value_argument_list();
                    let lambda = allow_lambda && self.at(K::LBrace);
                    if lambda {
                        self.parse_lambda_argument();
                    }
                    self.finish_node();
                    if lambda {
                        break;
                    }
                }
                K::LBrace if allow_lambda => {
                    self.start_at(checkpoint, K::CallExpr);
                    self.parse_lambda_argument();
                    self.finish_node();
                    break;
                }
                _ => break,
            }
        }
    }

    /// `<` opens call type arguments when a balanced `>` is followed by a call
    fn type_arguments_ahead(&self) -> bool {
        let mut i = self.nth_index(0);
        let mut depth = 0usize;
        loop {
            match self.kind_at(i) {
                K::Lt => depth += 1,
                K::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        let next = self.kind_at(self.skip_trivia_from(i + 1));
                        return matches!(next, K::LParen | K::LBrace | K::ColonColon);
                    }
                }
                K::Ident | K::Comma | K::Dot | K::Question | K::Star | K::InKw | K::At => {}
                kind if kind.is_trivia() => {}
                _ => return false,
            }
            i += 1;
        }
    }

    fn parse_value_argument_list(&mut self) {
        self.parse_delimited(K::ValueArgumentList, K::RParen, Self::parse_value_argument);
    }

    /// Grammar: (Ident '=')? '*'? expression
    fn parse_value_argument(&mut self) {
        self.start(K::ValueArgument);
        if self.at_any(K::Ident) && self.nth(1) == K::Eq {
            self.start(K::ValueArgumentName);
            self.bump();
            self.finish_node();
            self.bump(); // =
        }
        if self.at_any(K::Star) {
            self.bump();
        }
        self.parse_expression();
        self.finish_node();
    }

    fn parse_lambda_argument(&mut self) {
        self.start(K::LambdaArgument);
        self.parse_lambda();
        self.finish_node();
    }

    /// Grammar: '{' (parameters '->')? statements '}'
    fn parse_lambda(&mut self) {
        self.start(K::LambdaExpr);
        self.bump(); // {
        self.ctx.push(false);
        let no_lambda = std::mem::replace(&mut self.no_lambda, false);

        if self.lambda_parameters_ahead() {
            if !self.at_any(K::Arrow) {
                self.start(K::LambdaParameterList);
                loop {
                    self.parse_binding_parameter();
                    if !self.eat_any(K::Comma) {
                        break;
                    }
                }
                self.finish_node();
            }
            self.expect(K::Arrow);
        }

        self.start(K::Block);
        self.parse_statements(false);
        self.finish_node();

        self.no_lambda = no_lambda;
        self.ctx.pop();
        self.expect_closing(K::RBrace);
        self.finish_node(); // LAMBDA_EXPR
    }

    fn lambda_parameters_ahead(&self) -> bool {
        let mut i = self.nth_index(0);
        let mut depth = 0usize;
        loop {
            match self.kind_at(i) {
                K::Arrow if depth == 0 => return true,
                K::LParen | K::Lt => depth += 1,
                K::RParen | K::Gt => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                K::Ident | K::Comma | K::Colon | K::Dot | K::Question | K::Star => {}
                kind if kind.is_trivia() => {}
                _ => return false,
            }
            i += 1;
        }
    }

    /// Primary expression; returns true when it is a simple name that may be called
    fn parse_primary(&mut self) -> bool {
        match self.peek_any_line() {
            K::Ident => {
                self.start(K::ReferenceExpr);
                self.bump();
                self.finish_node();
                return true;
            }
            K::ThisKw => {
                self.start(K::ThisExpr);
                self.bump();
                self.parse_label();
                self.finish_node();
            }
            K::SuperKw => {
                self.start(K::SuperExpr);
                self.bump();
                if self.kind_at(self.pos) == K::Lt {
                    self.parse_type_argument_list();
                }
                self.parse_label();
                self.finish_node();
            }
            kind if kind.is_constant() => {
                self.start(K::ConstantExpr);
                self.bump();
                self.finish_node();
            }
            K::StringOpen | K::RawStringOpen => self.parse_string_template(),
            K::LParen => {
                self.start(K::ParenExpr);
                self.bump();
                self.ctx.push(true);
                let no_lambda = std::mem::replace(&mut self.no_lambda, false);
                self.parse_expression();
                self.no_lambda = no_lambda;
                self.ctx.pop();
                self.expect_closing(K::RParen);
                self.finish_node();
            }
            K::LBracket => {
                self.parse_delimited(K::CollectionLiteralExpr, K::RBracket, Self::parse_expression);
            }
            K::LBrace => self.parse_lambda(),
            K::IfKw => self.parse_if(),
            K::WhenKw => self.parse_when(),
            K::TryKw => self.parse_try(),
            K::ForKw => self.parse_for(),
            K::WhileKw => self.parse_while(),
            K::DoKw => self.parse_do_while(),
            K::ReturnKw => self.parse_jump(K::ReturnExpr, true),
            K::BreakKw => self.parse_jump(K::BreakExpr, false),
            K::ContinueKw => self.parse_jump(K::ContinueExpr, false),
            K::ThrowKw => {
                self.start(K::ThrowExpr);
                self.bump();
                self.parse_expression();
                self.finish_node();
            }
            K::ObjectKw => {
                self.start(K::ObjectLiteralExpr);
                self.parse_object();
                self.finish_node();
            }
            K::FunKw => self.parse_function(),
            K::ColonColon => {
                self.start(K::CallableReferenceExpr);
                self.bump();
                if self.at_any(K::ClassKw) {
                    self.bump();
                } else {
                    self.expect(K::Ident);
                }
                self.finish_node();
            }
            _ => self.error("Expected an expression"),
        }
        false
    }

    /// `@label` directly attached to the previous token
    fn parse_label(&mut self) {
        if self.kind_at(self.pos) == K::At && self.kind_at(self.pos + 1) == K::Ident {
            self.start(K::LabelQualifier);
            self.bump();
            self.bump();
            self.finish_node();
        }
    }

    fn parse_jump(&mut self, node: K, with_value: bool) {
        self.start(node);
        self.bump();
        self.parse_label();
        if with_value && self.at_expression_start() {
            self.parse_expression();
        }
        self.finish_node();
    }

    fn at_expression_start(&self) -> bool {
        let kind = self.peek();
        kind.is_constant()
            || matches!(
                kind,
                K::Ident
                    | K::StringOpen
                    | K::RawStringOpen
                    | K::LParen
                    | K::LBracket
                    | K::LBrace
                    | K::Minus
                    | K::Plus
                    | K::Excl
                    | K::PlusPlus
                    | K::MinusMinus
                    | K::At
                    | K::ColonColon
                    | K::ThisKw
                    | K::SuperKw
                    | K::IfKw
                    | K::WhenKw
                    | K::TryKw
                    | K::ObjectKw
                    | K::FunKw
                    | K::ReturnKw
                    | K::ThrowKw
                    | K::BreakKw
                    | K::ContinueKw
                    | K::ForKw
                    | K::WhileKw
                    | K::DoKw
            )
    }

    /// Grammar: '"' (text | escape | '$' name | '${' expr '}')* '"'
    fn parse_string_template(&mut self) {
        self.start(K::StringTemplate);
        self.bump(); // opening quote

        loop {
            match self.kind_at(self.pos) {
                K::StringText => self.raw_node(K::LiteralStringTemplateEntry),
                K::StringEscape => self.raw_node(K::EscapeStringTemplateEntry),
                K::ShortTemplateEntryStart => {
                    self.builder.start_node(K::ShortStringTemplateEntry);
                    self.bump_raw();
                    match self.kind_at(self.pos) {
                        K::Ident => self.raw_node(K::ReferenceExpr),
                        K::ThisKw => self.raw_node(K::ThisExpr),
                        _ => {}
                    }
                    self.finish_node();
                }
                K::LongTemplateEntryStart => {
                    self.builder.start_node(K::LongStringTemplateEntry);
                    self.bump_raw();
                    self.ctx.push(true);
                    let no_lambda = std::mem::replace(&mut self.no_lambda, false);
                    self.parse_expression();
                    self.no_lambda = no_lambda;
                    self.ctx.pop();
                    self.expect_closing(K::LongTemplateEntryEnd);
                    self.finish_node();
                }
                K::StringClose | K::RawStringClose => {
                    self.bump_raw();
                    break;
                }
                // Unterminated; the lexer already reported it
                _ => break,
            }
        }

        self.finish_node(); // STRING_TEMPLATE
    }

    /// Grammar: 'if' '(' expr ')' body ('else' body)?
    fn parse_if(&mut self) {
        self.start(K::IfExpr);
        self.bump();
        self.parse_condition();
        self.parse_control_body();
        if self.at_any(K::ElseKw) {
            self.start(K::ElseBranch);
            self.bump();
            self.parse_control_body();
            self.finish_node();
        }
        self.finish_node();
    }

    /// Grammar: 'when' ('(' subject ')')? '{' entry* '}'
    fn parse_when(&mut self) {
        self.start(K::WhenExpr);
        self.bump();

        if self.at(K::LParen) {
            self.bump();
            self.ctx.push(true);
            if self.at_any(K::ValKw) {
                self.parse_property(true);
            } else {
                self.parse_expression();
            }
            self.ctx.pop();
            self.expect_closing(K::RParen);
        }

        if self.at_any(K::LBrace) {
            self.bump();
            self.ctx.push(false);
            loop {
                while self.at_any(K::Semicolon) {
                    self.bump();
                }
                if matches!(
                    self.peek_any_line(),
                    K::RBrace | K::Eof | K::LongTemplateEntryEnd
                ) {
                    break;
                }
                let before = self.nth_index(0);
                self.parse_when_entry();
                if self.nth_index(0) == before {
                    self.bump_error();
                }
            }
            self.ctx.pop();
            self.expect_closing(K::RBrace);
        } else {
            self.expect(K::LBrace);
        }

        self.finish_node();
    }

    fn parse_when_entry(&mut self) {
        self.start(K::WhenEntry);
        if self.at_any(K::ElseKw) {
            self.bump();
        } else {
            loop {
                self.parse_when_condition();
                if !self.eat_any(K::Comma) {
                    break;
                }
            }
        }
        self.expect(K::Arrow);
        self.parse_control_body();
        self.finish_node();
    }

    fn parse_when_condition(&mut self) {
        self.start(K::WhenCondition);
        match self.peek_any_line() {
            K::InKw | K::NotInKw => {
                self.bump();
                self.parse_expression();
            }
            K::IsKw | K::NotIsKw => {
                self.bump();
                self.parse_type_reference();
            }
            _ => self.parse_expression(),
        }
        self.finish_node();
    }

    /// Grammar: 'try' block catch* finally?
    fn parse_try(&mut self) {
        self.start(K::TryExpr);
        self.bump();
        self.parse_block();
        while self.at_any(K::CatchKw) {
            self.start(K::CatchClause);
            self.bump();
            self.parse_parameter_list();
            self.parse_block();
            self.finish_node();
        }
        if self.at_any(K::FinallyKw) {
            self.start(K::FinallyClause);
            self.bump();
            self.parse_block();
            self.finish_node();
        }
        self.finish_node();
    }

    /// Grammar: 'for' '(' parameter 'in' expr ')' body
    fn parse_for(&mut self) {
        self.start(K::ForExpr);
        self.bump();
        self.expect(K::LParen);
        self.ctx.push(true);
        self.parse_binding_parameter();
        self.expect(K::InKw);
        self.parse_expression();
        self.ctx.pop();
        self.expect_closing(K::RParen);
        self.parse_control_body();
        self.finish_node();
    }

    fn parse_while(&mut self) {
        self.start(K::WhileExpr);
        self.bump();
        self.parse_condition();
        self.parse_control_body();
        self.finish_node();
    }

    fn parse_do_while(&mut self) {
        self.start(K::DoWhileExpr);
        self.bump();
        self.parse_control_body();
        self.expect(K::WhileKw);
        self.parse_condition();
        self.finish_node();
    }

    fn parse_condition(&mut self) {
        self.expect(K::LParen);
        self.ctx.push(true);
        let no_lambda = std::mem::replace(&mut self.no_lambda, false);
        self.start(K::Condition);
        self.parse_expression();
        self.finish_node();
        self.no_lambda = no_lambda;
        self.ctx.pop();
        self.expect_closing(K::RParen);
    }

    /// Body of `if`, `when` entries and loops: a block or a single statement
    fn parse_control_body(&mut self) {
        match self.peek_any_line() {
            K::LBrace => self.parse_block(),
            K::RBrace | K::Eof | K::ElseKw | K::Semicolon => {}
            _ => self.parse_statement(true),
        }
    }

    fn parse_block(&mut self) {
        self.start(K::Block);
        self.expect(K::LBrace);
        self.ctx.push(false);
        let no_lambda = std::mem::replace(&mut self.no_lambda, false);
        self.parse_statements(false);
        self.no_lambda = no_lambda;
        self.ctx.pop();
        self.expect_closing(K::RBrace);
        self.finish_node(); // BLOCK
    }

    /// Parse `open item (',' item)* close` as a node of the given kind
    fn parse_delimited(&mut self, node: K, close: K, item: fn(&mut Self)) {
        self.start(node);
        self.bump(); // opener
        self.ctx.push(true);
        let no_lambda = std::mem::replace(&mut self.no_lambda, false);

        loop {
            let kind = self.peek_any_line();
            if kind == close || kind == K::Eof || is_closer(kind) {
                break;
            }

            item(self);

            if self.eat_any(K::Comma) {
                continue;
            }
            let kind = self.peek_any_line();
            if kind == close || kind == K::Eof {
                break;
            }
            self.error_and_recover(&format!("Expected ',' or {close}"), &[K::Comma, close], false);
            if !self.eat_any(K::Comma) {
                break;
            }
        }

        self.no_lambda = no_lambda;
        self.ctx.pop();
        self.expect_closing(close);
        self.finish_node();
    }

    // Helper methods

    fn newlines_significant(&self) -> bool {
        !self.ctx.last().copied().unwrap_or(false)
    }

    fn kind_at(&self, index: usize) -> K {
        self.tokens
            .get(index)
            .map(|token| token.kind)
            .unwrap_or(K::Eof)
    }

    fn text_at(&self, index: usize) -> &'a str {
        let tokens: &'a [CstToken] = self.tokens;
        tokens
            .get(index)
            .map(|token| token.text.as_str())
            .unwrap_or("")
    }

    /// Index of the first non-trivia token at or after `from`
    fn skip_trivia_from(&self, from: usize) -> usize {
        let mut index = from;
        while index < self.tokens.len() && self.tokens[index].kind.is_trivia() {
            index += 1;
        }
        index
    }

    /// Index of the `n`th significant token, looking across newlines
    fn nth_index(&self, n: usize) -> usize {
        let mut index = self.skip_trivia_from(self.pos);
        for _ in 0..n {
            index = self.skip_trivia_from(index + 1);
        }
        index
    }

    fn nth(&self, n: usize) -> K {
        self.kind_at(self.nth_index(n))
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.text_at(self.nth_index(n))
    }

    /// Next significant kind; `Newline` when a line break ends the construct
    fn peek(&self) -> K {
        let significant = self.newlines_significant();
        for token in &self.tokens[self.pos.min(self.tokens.len())..] {
            match token.kind {
                K::Newline if significant => return K::Newline,
                kind if kind.is_trivia() => continue,
                kind => return kind,
            }
        }
        K::Eof
    }

    fn peek_any_line(&self) -> K {
        self.nth(0)
    }

    fn at(&self, kind: K) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kind: K) -> bool {
        self.peek_any_line() == kind
    }

    /// Check for a soft keyword such as `by`, `where` or `constructor`
    fn at_soft(&self, word: &str) -> bool {
        self.at_any(K::Ident) && self.nth_text(0) == word
    }

    fn eat(&mut self, kind: K) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_any(&mut self, kind: K) -> bool {
        if self.at_any(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn is_modifier_at(&self, index: usize) -> bool {
        if self.kind_at(index) != K::Ident || !MODIFIERS.contains(&self.text_at(index)) {
            return false;
        }
        matches!(
            self.kind_at(self.skip_trivia_from(index + 1)),
            K::Ident
                | K::At
                | K::ClassKw
                | K::InterfaceKw
                | K::FunKw
                | K::ObjectKw
                | K::ValKw
                | K::VarKw
                | K::TypealiasKw
        )
    }

    /// Index just past the annotation starting at `at`
    fn skip_annotation(&self, at: usize) -> usize {
        let mut index = at + 1;
        if self.kind_at(index) == K::LBracket {
            return self.skip_balanced(index);
        }
        if self.kind_at(index) == K::Ident && self.kind_at(index + 1) == K::Colon {
            index += 2;
        }
        if self.kind_at(index) != K::Ident {
            return index;
        }
        index += 1;
        while self.kind_at(index) == K::Dot && self.kind_at(index + 1) == K::Ident {
            index += 2;
        }
        if self.kind_at(index) == K::Lt {
            index = self.skip_balanced(index);
        }
        if self.kind_at(index) == K::LParen {
            index = self.skip_balanced(index);
        }
        index
    }

    /// Index just past the bracket matching the opener at `at`
    fn skip_balanced(&self, at: usize) -> usize {
        let open = self.kind_at(at);
        let close = match open {
            K::LParen => K::RParen,
            K::LBracket => K::RBracket,
            K::LBrace => K::RBrace,
            K::Lt => K::Gt,
            _ => return at + 1,
        };

        let mut depth = 0usize;
        let mut index = at;
        while index < self.tokens.len() {
            let kind = self.tokens[index].kind;
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    return index + 1;
                }
            }
            index += 1;
        }
        self.tokens.len()
    }

    fn newline_ahead(&self) -> bool {
        let end = self.skip_trivia_from(self.pos);
        self.tokens[self.pos.min(end)..end]
            .iter()
            .any(|token| token.kind == K::Newline)
    }

    fn flush_trivia(&mut self) {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.add_token(token);
            self.pos += 1;
        }
    }

    /// Add pending trivia and the next significant token
    fn bump(&mut self) {
        self.flush_trivia();
        self.bump_raw();
    }

    fn bump_raw(&mut self) {
        let tokens = self.tokens;
        if let Some(token) = tokens.get(self.pos) {
            self.builder.add_token(token);
            self.pos += 1;
        }
    }

    /// Wrap the current raw token in its own node
    fn raw_node(&mut self, kind: K) {
        self.builder.start_node(kind);
        self.bump_raw();
        self.builder.finish_node();
    }

    fn start(&mut self, kind: K) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    /// Start a declaration node; its KDoc comment becomes part of the node
    fn start_decl(&mut self, kind: K) {
        let end = self.skip_trivia_from(self.pos);
        let doc = (self.pos..end)
            .rev()
            .find(|index| self.tokens[*index].kind == K::DocComment);

        match doc {
            Some(doc) => {
                let tokens = self.tokens;
                while self.pos < doc {
                    self.builder.add_token(&tokens[self.pos]);
                    self.pos += 1;
                }
            }
            None => self.flush_trivia(),
        }

        self.builder.start_node(kind);
        self.flush_trivia();
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: K) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn error(&mut self, message: impl Into<String>) {
        let index = self.nth_index(0);
        let span = match self.tokens.get(index) {
            Some(token) => token.span.clone(),
            None => {
                let end = self.tokens.last().map(|token| token.span.end).unwrap_or(0);
                end..end
            }
        };
        self.errors.push(SyntaxError::new(message, span));
    }

    fn expect(&mut self, kind: K) {
        if self.at_any(kind) {
            self.bump();
        } else {
            self.error(format!("Expected {kind}"));
            // Create error token
            self.builder.token(K::Error, "");
        }
    }

    /// Expect a closing token, skipping anything left before it
    fn expect_closing(&mut self, close: K) {
        if !self.at_any(close) {
            self.error_and_recover(&format!("Expected {close}"), &[close], false);
        }
        if self.at_any(close) {
            self.bump();
        } else {
            self.builder.token(K::Error, "");
        }
    }

    /// Consume the next token as an `Error` node
    fn bump_error(&mut self) {
        if self.at_any(K::Eof) {
            return;
        }
        self.start(K::Error);
        self.bump();
        self.finish_node();
    }

    /// Record an error and skip tokens until a stop token, an unmatched
    /// closing bracket or (optionally) the end of the line
    fn error_and_recover(&mut self, message: &str, stops: &[K], stop_at_line: bool) {
        self.error(message);

        let first = self.peek_any_line();
        if first == K::Eof || is_closer(first) {
            return;
        }

        self.start(K::Error);
        let mut depth = 0usize;
        let mut consumed = false;
        loop {
            let kind = self.peek_any_line();
            if kind == K::Eof {
                break;
            }
            if consumed
                && depth == 0
                && (stops.contains(&kind) || (stop_at_line && self.newline_ahead()))
            {
                break;
            }
            match kind {
                K::LParen | K::LBrace | K::LBracket | K::LongTemplateEntryStart => depth += 1,
                K::RParen | K::RBrace | K::RBracket | K::LongTemplateEntryEnd => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
            consumed = true;
        }
        self.finish_node(); // ERROR
    }
}

fn is_closer(kind: K) -> bool {
    matches!(
        kind,
        K::RParen | K::RBrace | K::RBracket | K::LongTemplateEntryEnd
    )
}
