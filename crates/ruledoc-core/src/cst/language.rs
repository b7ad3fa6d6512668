//! Rowan language implementation for Kotlin
//!
//! This module implements the `rowan::Language` trait for Kotlin, which connects
//! our KotlinSyntaxKind enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::KotlinSyntaxKind;

/// Language implementation for Kotlin sources
///
/// This is a zero-sized type that implements `rowan::Language` to provide
/// the connection between our syntax kinds and Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KotlinLanguage;

impl Language for KotlinLanguage {
    type Kind = KotlinSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            // Trivia
            0 => KotlinSyntaxKind::Whitespace,
            1 => KotlinSyntaxKind::CommentLine,
            2 => KotlinSyntaxKind::CommentBlock,
            3 => KotlinSyntaxKind::Newline,
            4 => KotlinSyntaxKind::DocComment,
            5 => KotlinSyntaxKind::Shebang,

            // Keywords (10-99)
            10 => KotlinSyntaxKind::PackageKw,
            11 => KotlinSyntaxKind::ImportKw,
            12 => KotlinSyntaxKind::ClassKw,
            13 => KotlinSyntaxKind::InterfaceKw,
            14 => KotlinSyntaxKind::ObjectKw,
            15 => KotlinSyntaxKind::FunKw,
            16 => KotlinSyntaxKind::ValKw,
            17 => KotlinSyntaxKind::VarKw,
            18 => KotlinSyntaxKind::TypealiasKw,
            19 => KotlinSyntaxKind::ReturnKw,
            20 => KotlinSyntaxKind::ThrowKw,
            21 => KotlinSyntaxKind::IfKw,
            22 => KotlinSyntaxKind::ElseKw,
            23 => KotlinSyntaxKind::WhenKw,
            24 => KotlinSyntaxKind::TryKw,
            25 => KotlinSyntaxKind::CatchKw,
            26 => KotlinSyntaxKind::FinallyKw,
            27 => KotlinSyntaxKind::ForKw,
            28 => KotlinSyntaxKind::WhileKw,
            29 => KotlinSyntaxKind::DoKw,
            30 => KotlinSyntaxKind::BreakKw,
            31 => KotlinSyntaxKind::ContinueKw,
            32 => KotlinSyntaxKind::ThisKw,
            33 => KotlinSyntaxKind::SuperKw,
            34 => KotlinSyntaxKind::NullKw,
            35 => KotlinSyntaxKind::TrueKw,
            36 => KotlinSyntaxKind::FalseKw,
            37 => KotlinSyntaxKind::IsKw,
            38 => KotlinSyntaxKind::NotIsKw,
            39 => KotlinSyntaxKind::AsKw,
            40 => KotlinSyntaxKind::AsSafeKw,
            41 => KotlinSyntaxKind::InKw,
            42 => KotlinSyntaxKind::NotInKw,

            // Punctuation (100-199)
            100 => KotlinSyntaxKind::LParen,
            101 => KotlinSyntaxKind::RParen,
            102 => KotlinSyntaxKind::LBrace,
            103 => KotlinSyntaxKind::RBrace,
            104 => KotlinSyntaxKind::LBracket,
            105 => KotlinSyntaxKind::RBracket,
            106 => KotlinSyntaxKind::Comma,
            107 => KotlinSyntaxKind::Dot,
            108 => KotlinSyntaxKind::SafeAccess,
            109 => KotlinSyntaxKind::Elvis,
            110 => KotlinSyntaxKind::Question,
            111 => KotlinSyntaxKind::ExclExcl,
            112 => KotlinSyntaxKind::Excl,
            113 => KotlinSyntaxKind::Colon,
            114 => KotlinSyntaxKind::ColonColon,
            115 => KotlinSyntaxKind::Semicolon,
            116 => KotlinSyntaxKind::Arrow,
            117 => KotlinSyntaxKind::Eq,
            118 => KotlinSyntaxKind::EqEq,
            119 => KotlinSyntaxKind::EqEqEq,
            120 => KotlinSyntaxKind::ExclEq,
            121 => KotlinSyntaxKind::ExclEqEq,
            122 => KotlinSyntaxKind::Lt,
            123 => KotlinSyntaxKind::Gt,
            124 => KotlinSyntaxKind::LtEq,
            125 => KotlinSyntaxKind::GtEq,
            126 => KotlinSyntaxKind::AndAnd,
            127 => KotlinSyntaxKind::OrOr,
            128 => KotlinSyntaxKind::Plus,
            129 => KotlinSyntaxKind::Minus,
            130 => KotlinSyntaxKind::Star,
            131 => KotlinSyntaxKind::Slash,
            132 => KotlinSyntaxKind::Percent,
            133 => KotlinSyntaxKind::PlusPlus,
            134 => KotlinSyntaxKind::MinusMinus,
            135 => KotlinSyntaxKind::PlusEq,
            136 => KotlinSyntaxKind::MinusEq,
            137 => KotlinSyntaxKind::StarEq,
            138 => KotlinSyntaxKind::SlashEq,
            139 => KotlinSyntaxKind::PercentEq,
            140 => KotlinSyntaxKind::Range,
            141 => KotlinSyntaxKind::RangeUntil,
            142 => KotlinSyntaxKind::At,
            143 => KotlinSyntaxKind::Ampersand,

            // Literals & identifiers (200-249)
            200 => KotlinSyntaxKind::Ident,
            201 => KotlinSyntaxKind::IntegerLiteral,
            202 => KotlinSyntaxKind::FloatLiteral,
            203 => KotlinSyntaxKind::CharLiteral,
            204 => KotlinSyntaxKind::StringOpen,
            205 => KotlinSyntaxKind::StringClose,
            206 => KotlinSyntaxKind::RawStringOpen,
            207 => KotlinSyntaxKind::RawStringClose,
            208 => KotlinSyntaxKind::StringText,
            209 => KotlinSyntaxKind::StringEscape,
            210 => KotlinSyntaxKind::ShortTemplateEntryStart,
            211 => KotlinSyntaxKind::LongTemplateEntryStart,
            212 => KotlinSyntaxKind::LongTemplateEntryEnd,

            // Declarations & types (300-399)
            300 => KotlinSyntaxKind::SourceFile,
            301 => KotlinSyntaxKind::PackageDirective,
            302 => KotlinSyntaxKind::ImportList,
            303 => KotlinSyntaxKind::ImportDirective,
            304 => KotlinSyntaxKind::ModifierList,
            305 => KotlinSyntaxKind::Annotation,
            306 => KotlinSyntaxKind::ClassDecl,
            307 => KotlinSyntaxKind::ObjectDecl,
            308 => KotlinSyntaxKind::FunctionDecl,
            309 => KotlinSyntaxKind::PropertyDecl,
            310 => KotlinSyntaxKind::PropertyAccessor,
            311 => KotlinSyntaxKind::PropertyDelegate,
            312 => KotlinSyntaxKind::TypeAlias,
            313 => KotlinSyntaxKind::ClassBody,
            314 => KotlinSyntaxKind::EnumEntry,
            315 => KotlinSyntaxKind::PrimaryConstructor,
            316 => KotlinSyntaxKind::SecondaryConstructor,
            317 => KotlinSyntaxKind::ConstructorDelegationCall,
            318 => KotlinSyntaxKind::AnonymousInitializer,
            319 => KotlinSyntaxKind::ParameterList,
            320 => KotlinSyntaxKind::Parameter,
            321 => KotlinSyntaxKind::TypeParameterList,
            322 => KotlinSyntaxKind::TypeParameter,
            323 => KotlinSyntaxKind::TypeConstraintList,
            324 => KotlinSyntaxKind::TypeConstraint,
            325 => KotlinSyntaxKind::TypeReference,
            326 => KotlinSyntaxKind::UserType,
            327 => KotlinSyntaxKind::NullableType,
            328 => KotlinSyntaxKind::FunctionType,
            329 => KotlinSyntaxKind::FunctionTypeReceiver,
            330 => KotlinSyntaxKind::TypeArgumentList,
            331 => KotlinSyntaxKind::TypeProjection,
            332 => KotlinSyntaxKind::SuperTypeList,
            333 => KotlinSyntaxKind::SuperTypeEntry,
            334 => KotlinSyntaxKind::Block,
            335 => KotlinSyntaxKind::QualifiedName,
            336 => KotlinSyntaxKind::ImportAlias,

            // Expressions (400-499)
            400 => KotlinSyntaxKind::CallExpr,
            401 => KotlinSyntaxKind::ValueArgumentList,
            402 => KotlinSyntaxKind::ValueArgument,
            403 => KotlinSyntaxKind::ValueArgumentName,
            404 => KotlinSyntaxKind::LambdaArgument,
            405 => KotlinSyntaxKind::LambdaExpr,
            406 => KotlinSyntaxKind::LambdaParameterList,
            407 => KotlinSyntaxKind::ReferenceExpr,
            408 => KotlinSyntaxKind::DotQualifiedExpr,
            409 => KotlinSyntaxKind::SafeQualifiedExpr,
            410 => KotlinSyntaxKind::CallableReferenceExpr,
            411 => KotlinSyntaxKind::IndexExpr,
            412 => KotlinSyntaxKind::IndexList,
            413 => KotlinSyntaxKind::PrefixExpr,
            414 => KotlinSyntaxKind::PostfixExpr,
            415 => KotlinSyntaxKind::BinaryExpr,
            416 => KotlinSyntaxKind::BinaryWithTypeExpr,
            417 => KotlinSyntaxKind::IsExpr,
            418 => KotlinSyntaxKind::ParenExpr,
            419 => KotlinSyntaxKind::StringTemplate,
            420 => KotlinSyntaxKind::LiteralStringTemplateEntry,
            421 => KotlinSyntaxKind::EscapeStringTemplateEntry,
            422 => KotlinSyntaxKind::ShortStringTemplateEntry,
            423 => KotlinSyntaxKind::LongStringTemplateEntry,
            424 => KotlinSyntaxKind::ConstantExpr,
            425 => KotlinSyntaxKind::ThisExpr,
            426 => KotlinSyntaxKind::SuperExpr,
            427 => KotlinSyntaxKind::IfExpr,
            428 => KotlinSyntaxKind::ElseBranch,
            429 => KotlinSyntaxKind::WhenExpr,
            430 => KotlinSyntaxKind::WhenEntry,
            431 => KotlinSyntaxKind::WhenCondition,
            432 => KotlinSyntaxKind::TryExpr,
            433 => KotlinSyntaxKind::CatchClause,
            434 => KotlinSyntaxKind::FinallyClause,
            435 => KotlinSyntaxKind::ForExpr,
            436 => KotlinSyntaxKind::WhileExpr,
            437 => KotlinSyntaxKind::DoWhileExpr,
            438 => KotlinSyntaxKind::ReturnExpr,
            439 => KotlinSyntaxKind::ThrowExpr,
            440 => KotlinSyntaxKind::BreakExpr,
            441 => KotlinSyntaxKind::ContinueExpr,
            442 => KotlinSyntaxKind::ObjectLiteralExpr,
            443 => KotlinSyntaxKind::Condition,
            444 => KotlinSyntaxKind::LabelQualifier,
            445 => KotlinSyntaxKind::CollectionLiteralExpr,

            // Special tokens (900+)
            900 => KotlinSyntaxKind::Error,
            901 => KotlinSyntaxKind::Eof,
            902 => KotlinSyntaxKind::Unknown,

            // Tombstone
            999 => KotlinSyntaxKind::Tombstone,

            // Unknown value - the builder only ever emits kinds from the enum
            _ => {
                tracing::warn!("Unknown syntax kind: {}", raw.0);
                KotlinSyntaxKind::Unknown
            }
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            KotlinSyntaxKind::Whitespace,
            KotlinSyntaxKind::DocComment,
            KotlinSyntaxKind::ClassKw,
            KotlinSyntaxKind::NotInKw,
            KotlinSyntaxKind::SafeAccess,
            KotlinSyntaxKind::Ident,
            KotlinSyntaxKind::LongTemplateEntryEnd,
            KotlinSyntaxKind::SuperTypeList,
            KotlinSyntaxKind::CallExpr,
            KotlinSyntaxKind::CollectionLiteralExpr,
            KotlinSyntaxKind::Error,
            KotlinSyntaxKind::Tombstone,
        ];

        for &kind in &kinds {
            let raw = KotlinLanguage::kind_to_raw(kind);
            let back = KotlinLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_kind_values() {
        assert_eq!(KotlinLanguage::kind_to_raw(KotlinSyntaxKind::Whitespace).0, 0);
        assert_eq!(KotlinLanguage::kind_to_raw(KotlinSyntaxKind::PackageKw).0, 10);
        assert_eq!(KotlinLanguage::kind_to_raw(KotlinSyntaxKind::LParen).0, 100);
        assert_eq!(KotlinLanguage::kind_to_raw(KotlinSyntaxKind::SourceFile).0, 300);
    }

    #[test]
    fn test_unknown_raw_kind() {
        let kind = KotlinLanguage::kind_from_raw(rowan::SyntaxKind(777));
        assert_eq!(kind, KotlinSyntaxKind::Unknown);
    }
}
