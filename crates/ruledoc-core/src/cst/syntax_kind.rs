//! Syntax kind enumeration for the Kotlin CST
//!
//! This module defines all node and token types in the Kotlin syntax tree.
//! Only the subset of the language needed for declaration metadata is modelled
//! structurally; everything else still round-trips through `Error` nodes.

use std::fmt;

/// Syntax kind for Kotlin language elements
///
/// Values are grouped in ranges:
/// - Trivia (0-9)
/// - Hard keywords (10-99)
/// - Punctuation and operators (100-199)
/// - Literals, identifiers and string template tokens (200-249)
/// - Declaration and type nodes (300-399)
/// - Expression nodes (400-499)
/// - Special tokens (900+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum KotlinSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Whitespace (spaces, tabs)
    Whitespace = 0,
    /// Line comment starting with //
    CommentLine = 1,
    /// Block comment /* ... */
    CommentBlock = 2,
    /// Newline character
    Newline = 3,
    /// KDoc comment /** ... */
    DocComment = 4,
    /// Shebang line (#!...) at the start of a script
    Shebang = 5,

    // ==================
    // Keywords (10-99)
    // ==================
    PackageKw = 10,
    ImportKw = 11,
    ClassKw = 12,
    InterfaceKw = 13,
    ObjectKw = 14,
    FunKw = 15,
    ValKw = 16,
    VarKw = 17,
    TypealiasKw = 18,
    ReturnKw = 19,
    ThrowKw = 20,
    IfKw = 21,
    ElseKw = 22,
    WhenKw = 23,
    TryKw = 24,
    CatchKw = 25,
    FinallyKw = 26,
    ForKw = 27,
    WhileKw = 28,
    DoKw = 29,
    BreakKw = 30,
    ContinueKw = 31,
    ThisKw = 32,
    SuperKw = 33,
    NullKw = 34,
    TrueKw = 35,
    FalseKw = 36,
    IsKw = 37,
    /// `!is`
    NotIsKw = 38,
    AsKw = 39,
    /// `as?`
    AsSafeKw = 40,
    InKw = 41,
    /// `!in`
    NotInKw = 42,

    // ==================
    // Punctuation (100-199)
    // ==================
    LParen = 100,
    RParen = 101,
    LBrace = 102,
    RBrace = 103,
    LBracket = 104,
    RBracket = 105,
    Comma = 106,
    Dot = 107,
    /// `?.`
    SafeAccess = 108,
    /// `?:`
    Elvis = 109,
    Question = 110,
    /// `!!`
    ExclExcl = 111,
    Excl = 112,
    Colon = 113,
    /// `::`
    ColonColon = 114,
    Semicolon = 115,
    /// `->`
    Arrow = 116,
    Eq = 117,
    /// `==`
    EqEq = 118,
    /// `===`
    EqEqEq = 119,
    /// `!=`
    ExclEq = 120,
    /// `!==`
    ExclEqEq = 121,
    Lt = 122,
    Gt = 123,
    /// `<=`
    LtEq = 124,
    /// `>=`
    GtEq = 125,
    /// `&&`
    AndAnd = 126,
    /// `||`
    OrOr = 127,
    Plus = 128,
    Minus = 129,
    Star = 130,
    Slash = 131,
    Percent = 132,
    /// `++`
    PlusPlus = 133,
    /// `--`
    MinusMinus = 134,
    /// `+=`
    PlusEq = 135,
    /// `-=`
    MinusEq = 136,
    /// `*=`
    StarEq = 137,
    /// `/=`
    SlashEq = 138,
    /// `%=`
    PercentEq = 139,
    /// `..`
    Range = 140,
    /// `..<`
    RangeUntil = 141,
    At = 142,
    Ampersand = 143,

    // ==================
    // Literals & identifiers (200-249)
    // ==================
    Ident = 200,
    IntegerLiteral = 201,
    FloatLiteral = 202,
    CharLiteral = 203,
    /// Opening `"`
    StringOpen = 204,
    /// Closing `"`
    StringClose = 205,
    /// Opening `"""`
    RawStringOpen = 206,
    /// Closing `"""`
    RawStringClose = 207,
    /// Literal text inside a string template
    StringText = 208,
    /// Escape sequence inside a string template (`\n`, `\u0041`, ...)
    StringEscape = 209,
    /// `$` introducing `$name`
    ShortTemplateEntryStart = 210,
    /// `${`
    LongTemplateEntryStart = 211,
    /// `}` closing `${`
    LongTemplateEntryEnd = 212,

    // ==================
    // Declaration & type nodes (300-399)
    // ==================
    SourceFile = 300,
    PackageDirective = 301,
    ImportList = 302,
    ImportDirective = 303,
    ModifierList = 304,
    Annotation = 305,
    /// `class` or `interface` declaration
    ClassDecl = 306,
    /// `object` or `companion object` declaration
    ObjectDecl = 307,
    FunctionDecl = 308,
    PropertyDecl = 309,
    PropertyAccessor = 310,
    PropertyDelegate = 311,
    TypeAlias = 312,
    ClassBody = 313,
    EnumEntry = 314,
    PrimaryConstructor = 315,
    SecondaryConstructor = 316,
    ConstructorDelegationCall = 317,
    AnonymousInitializer = 318,
    ParameterList = 319,
    Parameter = 320,
    TypeParameterList = 321,
    TypeParameter = 322,
    TypeConstraintList = 323,
    TypeConstraint = 324,
    TypeReference = 325,
    UserType = 326,
    NullableType = 327,
    FunctionType = 328,
    FunctionTypeReceiver = 329,
    TypeArgumentList = 330,
    TypeProjection = 331,
    SuperTypeList = 332,
    SuperTypeEntry = 333,
    Block = 334,
    QualifiedName = 335,
    ImportAlias = 336,

    // ==================
    // Expression nodes (400-499)
    // ==================
    CallExpr = 400,
    ValueArgumentList = 401,
    ValueArgument = 402,
    ValueArgumentName = 403,
    LambdaArgument = 404,
    LambdaExpr = 405,
    LambdaParameterList = 406,
    ReferenceExpr = 407,
    DotQualifiedExpr = 408,
    SafeQualifiedExpr = 409,
    CallableReferenceExpr = 410,
    IndexExpr = 411,
    IndexList = 412,
    PrefixExpr = 413,
    PostfixExpr = 414,
    BinaryExpr = 415,
    BinaryWithTypeExpr = 416,
    IsExpr = 417,
    ParenExpr = 418,
    StringTemplate = 419,
    LiteralStringTemplateEntry = 420,
    EscapeStringTemplateEntry = 421,
    ShortStringTemplateEntry = 422,
    LongStringTemplateEntry = 423,
    ConstantExpr = 424,
    ThisExpr = 425,
    SuperExpr = 426,
    IfExpr = 427,
    ElseBranch = 428,
    WhenExpr = 429,
    WhenEntry = 430,
    WhenCondition = 431,
    TryExpr = 432,
    CatchClause = 433,
    FinallyClause = 434,
    ForExpr = 435,
    WhileExpr = 436,
    DoWhileExpr = 437,
    ReturnExpr = 438,
    ThrowExpr = 439,
    BreakExpr = 440,
    ContinueExpr = 441,
    ObjectLiteralExpr = 442,
    Condition = 443,
    LabelQualifier = 444,
    CollectionLiteralExpr = 445,

    // ==================
    // Special (900+)
    // ==================
    /// Error node/token produced by recovery
    Error = 900,
    /// End of input
    Eof = 901,
    /// Unrecognised character
    Unknown = 902,

    /// Tombstone marker for deleted nodes
    Tombstone = 999,
}

impl KotlinSyntaxKind {
    /// Check if this is a trivia kind (whitespace, comments, newlines)
    ///
    /// KDoc comments count as trivia; the parser attaches them to the
    /// declaration they document.
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::CommentLine
                | Self::CommentBlock
                | Self::Newline
                | Self::DocComment
                | Self::Shebang
        )
    }

    /// Check if this is a hard keyword
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 100
    }

    /// Check if this is punctuation
    pub const fn is_punct(self) -> bool {
        (self as u16) >= 100 && (self as u16) < 200
    }

    /// Check if this is a structural (non-token) kind
    pub const fn is_node(self) -> bool {
        (self as u16) >= 300 && (self as u16) < 500
    }

    /// Check if this kind starts a constant literal expression
    pub const fn is_constant(self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral
                | Self::FloatLiteral
                | Self::CharLiteral
                | Self::TrueKw
                | Self::FalseKw
                | Self::NullKw
        )
    }

    /// Map identifier text to a hard keyword
    ///
    /// Soft keywords and modifiers (`override`, `by`, `get`, ...) are lexed as
    /// identifiers and recognised by the parser in context.
    pub fn keyword_from_text(text: &str) -> Option<Self> {
        let kind = match text {
            "package" => Self::PackageKw,
            "import" => Self::ImportKw,
            "class" => Self::ClassKw,
            "interface" => Self::InterfaceKw,
            "object" => Self::ObjectKw,
            "fun" => Self::FunKw,
            "val" => Self::ValKw,
            "var" => Self::VarKw,
            "typealias" => Self::TypealiasKw,
            "return" => Self::ReturnKw,
            "throw" => Self::ThrowKw,
            "if" => Self::IfKw,
            "else" => Self::ElseKw,
            "when" => Self::WhenKw,
            "try" => Self::TryKw,
            "catch" => Self::CatchKw,
            "finally" => Self::FinallyKw,
            "for" => Self::ForKw,
            "while" => Self::WhileKw,
            "do" => Self::DoKw,
            "break" => Self::BreakKw,
            "continue" => Self::ContinueKw,
            "this" => Self::ThisKw,
            "super" => Self::SuperKw,
            "null" => Self::NullKw,
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "is" => Self::IsKw,
            "as" => Self::AsKw,
            "in" => Self::InKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Get the text representation of keyword tokens
    pub const fn keyword_text(self) -> Option<&'static str> {
        match self {
            Self::PackageKw => Some("package"),
            Self::ImportKw => Some("import"),
            Self::ClassKw => Some("class"),
            Self::InterfaceKw => Some("interface"),
            Self::ObjectKw => Some("object"),
            Self::FunKw => Some("fun"),
            Self::ValKw => Some("val"),
            Self::VarKw => Some("var"),
            Self::TypealiasKw => Some("typealias"),
            Self::ReturnKw => Some("return"),
            Self::ThrowKw => Some("throw"),
            Self::IfKw => Some("if"),
            Self::ElseKw => Some("else"),
            Self::WhenKw => Some("when"),
            Self::TryKw => Some("try"),
            Self::CatchKw => Some("catch"),
            Self::FinallyKw => Some("finally"),
            Self::ForKw => Some("for"),
            Self::WhileKw => Some("while"),
            Self::DoKw => Some("do"),
            Self::BreakKw => Some("break"),
            Self::ContinueKw => Some("continue"),
            Self::ThisKw => Some("this"),
            Self::SuperKw => Some("super"),
            Self::NullKw => Some("null"),
            Self::TrueKw => Some("true"),
            Self::FalseKw => Some("false"),
            Self::IsKw => Some("is"),
            Self::NotIsKw => Some("!is"),
            Self::AsKw => Some("as"),
            Self::AsSafeKw => Some("as?"),
            Self::InKw => Some("in"),
            Self::NotInKw => Some("!in"),
            _ => None,
        }
    }
}

impl fmt::Display for KotlinSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<KotlinSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: KotlinSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(KotlinSyntaxKind::Whitespace.is_trivia());
        assert!(KotlinSyntaxKind::CommentLine.is_trivia());
        assert!(KotlinSyntaxKind::DocComment.is_trivia());
        assert!(!KotlinSyntaxKind::ClassKw.is_trivia());
    }

    #[test]
    fn test_keyword_classification() {
        assert!(KotlinSyntaxKind::ClassKw.is_keyword());
        assert!(KotlinSyntaxKind::NotInKw.is_keyword());
        assert!(!KotlinSyntaxKind::Ident.is_keyword());
        assert!(!KotlinSyntaxKind::Whitespace.is_keyword());
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(
            KotlinSyntaxKind::keyword_from_text("object"),
            Some(KotlinSyntaxKind::ObjectKw)
        );
        assert_eq!(KotlinSyntaxKind::keyword_from_text("override"), None);
        assert_eq!(KotlinSyntaxKind::keyword_from_text("by"), None);
        assert_eq!(KotlinSyntaxKind::ValKw.keyword_text(), Some("val"));
        assert_eq!(KotlinSyntaxKind::Ident.keyword_text(), None);
    }

    #[test]
    fn test_node_classification() {
        assert!(KotlinSyntaxKind::ClassDecl.is_node());
        assert!(KotlinSyntaxKind::CallExpr.is_node());
        assert!(!KotlinSyntaxKind::Ident.is_node());
        assert!(!KotlinSyntaxKind::Error.is_node());
    }
}
