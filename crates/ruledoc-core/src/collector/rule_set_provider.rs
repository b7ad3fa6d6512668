//! Rule set provider collector
//!
//! Finds declarations that implement `RuleSetProvider` and reads their rule
//! set id, KDoc description, `@active` tag and the rules handed to
//! `RuleSet(id, listOf(...))`.

use serde::{Deserialize, Serialize};

use super::Collector;
use crate::cst::ast::{AstNode, CallExpr, ClassOrObject, Expr, Property, SourceFile, SuperTypeList};
use crate::cst::visitor::{Element, Visitor, walk};
use crate::error::InvalidProviderError;

const PROVIDER_TYPE: &str = "RuleSetProvider";
const RULE_SET_ID_PROPERTY: &str = "ruleSetId";
const RULE_SET_CALL: &str = "RuleSet";
const RULE_LIST_CALL: &str = "listOf";
const ACTIVE_TAG: &str = "active";

/// Metadata of one rule set provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetProvider {
    pub name: String,
    pub description: String,
    pub active: bool,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Collects at most one [`RuleSetProvider`] per visited file
#[derive(Debug, Clone)]
pub struct RuleSetProviderCollector {
    items: Vec<RuleSetProvider>,
    warn_missing_description: bool,
}

impl RuleSetProviderCollector {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            warn_missing_description: true,
        }
    }

    /// Toggle the warning logged for providers without a description
    pub fn with_missing_description_warning(mut self, enabled: bool) -> Self {
        self.warn_missing_description = enabled;
        self
    }
}

impl Default for RuleSetProviderCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for RuleSetProviderCollector {
    type Item = RuleSetProvider;

    fn visit(&mut self, file: &SourceFile) -> Result<(), InvalidProviderError> {
        let mut visitor = ProviderVisitor::default();
        walk(file.syntax(), &mut visitor)?;

        if !visitor.contains_rule_set_provider {
            return Ok(());
        }

        if visitor.description.is_empty() && self.warn_missing_description {
            tracing::warn!("Missing description for RuleSet {}", visitor.name);
        }
        tracing::debug!(
            "Collected RuleSet {} with {} rules",
            visitor.name,
            visitor.rules.len()
        );

        self.items.push(RuleSetProvider {
            name: visitor.name,
            description: visitor.description,
            active: visitor.active,
            rules: visitor.rules,
        });
        Ok(())
    }

    fn items(&self) -> &[RuleSetProvider] {
        &self.items
    }

    fn into_items(self) -> Vec<RuleSetProvider> {
        self.items
    }
}

/// State accumulated over one file
#[derive(Default)]
struct ProviderVisitor {
    contains_rule_set_provider: bool,
    name: String,
    description: String,
    active: bool,
    rules: Vec<String>,
}

impl Visitor for ProviderVisitor {
    type Error = InvalidProviderError;

    fn enter(&mut self, element: &Element) -> Result<(), Self::Error> {
        match element {
            Element::SuperTypeList(list) => self.visit_super_type_list(list),
            Element::ClassOrObject(class) => self.visit_class_or_object(class),
            _ => {}
        }
        Ok(())
    }

    fn leave(&mut self, element: &Element) -> Result<(), Self::Error> {
        match element {
            Element::Property(property) => self.visit_property(property),
            Element::Call(call) => self.visit_call(call),
            _ => Ok(()),
        }
    }
}

impl ProviderVisitor {
    fn visit_super_type_list(&mut self, list: &SuperTypeList) {
        self.contains_rule_set_provider = list
            .entries()
            .any(|entry| entry.referenced_name().as_deref() == Some(PROVIDER_TYPE));
    }

    fn visit_class_or_object(&mut self, class: &ClassOrObject) {
        match class.kdoc() {
            Some(kdoc) => {
                let section = kdoc.default_section();
                self.description = section.content.trim().to_string();
                self.active = section.has_tag(ACTIVE_TAG);
            }
            None => {
                self.description.clear();
                self.active = false;
            }
        }
    }

    fn visit_property(&mut self, property: &Property) -> Result<(), InvalidProviderError> {
        if !property.is_override() || property.name().as_deref() != Some(RULE_SET_ID_PROPERTY) {
            return Ok(());
        }

        match property.initializer().as_ref().and_then(literal_text) {
            Some(name) => {
                self.name = name;
                Ok(())
            }
            None => Err(InvalidProviderError::MissingNameLiteral {
                class_name: property
                    .containing_class_or_object()
                    .and_then(|class| class.name())
                    .unwrap_or_default(),
            }),
        }
    }

    fn visit_call(&mut self, call: &CallExpr) -> Result<(), InvalidProviderError> {
        if call.callee_text() != RULE_SET_CALL {
            return Ok(());
        }

        let rule_list = call
            .value_arguments()
            .iter()
            .filter_map(|argument| argument.expression())
            .find_map(|expr| match expr {
                Expr::Call(list) if list.callee_text() == RULE_LIST_CALL => Some(list),
                _ => None,
            })
            .ok_or_else(|| InvalidProviderError::MissingRuleList {
                rule_set: self.name.clone(),
            })?;

        let rules = rule_list
            .value_arguments()
            .into_iter()
            .filter_map(|argument| argument.expression())
            .filter_map(|expr| expr.reference_expression())
            .map(|reference| reference.name());
        self.rules.extend(rules);
        Ok(())
    }
}

/// Text of the first segment of a string literal without interpolation
fn literal_text(expr: &Expr) -> Option<String> {
    let template = expr.as_string_template()?;
    if template.has_interpolation() {
        return None;
    }
    template.entries().first().map(|entry| entry.text())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::parser::KotlinParser;

    fn collect(source: &str) -> Result<Vec<RuleSetProvider>, InvalidProviderError> {
        let mut collector = RuleSetProviderCollector::new();
        collector.visit(&source_file(source))?;
        Ok(collector.into_items())
    }

    fn source_file(source: &str) -> SourceFile {
        KotlinParser::parse_content(source)
            .unwrap()
            .source_file()
            .unwrap()
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }

    const FOO_PROVIDER: &str = r#"
/**
 * Foo rules
 *
 * @active
 */
class FooProvider : RuleSetProvider {
    override val ruleSetId: String = "foo"

    override fun instance(config: Config) = RuleSet(ruleSetId, listOf(RuleA(config), RuleB(config)))
}
"#;

    #[test]
    fn test_collects_complete_provider() {
        let providers = collect(FOO_PROVIDER).unwrap();

        assert_eq!(
            providers,
            vec![RuleSetProvider {
                name: "foo".to_string(),
                description: "Foo rules".to_string(),
                active: true,
                rules: vec!["RuleA".to_string(), "RuleB".to_string()],
            }]
        );
    }

    #[test]
    fn test_no_marker_no_record() {
        let providers = collect(
            "class Other : SomethingElse {\n    override val ruleSetId = \"x\"\n    fun f() = RuleSet(ruleSetId, listOf(A))\n}\n",
        )
        .unwrap();
        assert!(providers.is_empty());

        let providers = collect("class Plain\n").unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn test_non_literal_rule_set_id() {
        let error = collect(
            "class FooProvider : RuleSetProvider {\n    override val ruleSetId: String = someVariable\n}\n",
        )
        .unwrap_err();

        assert_eq!(
            error,
            InvalidProviderError::MissingNameLiteral {
                class_name: "FooProvider".to_string()
            }
        );
    }

    #[test]
    fn test_interpolated_or_empty_rule_set_id() {
        for initializer in ["\"foo-$suffix\"", "\"${prefix}foo\"", "\"\""] {
            let source = format!(
                "class FooProvider : RuleSetProvider {{\n    override val ruleSetId = {initializer}\n}}\n"
            );
            assert!(
                matches!(
                    collect(&source),
                    Err(InvalidProviderError::MissingNameLiteral { .. })
                ),
                "{initializer} should be rejected"
            );
        }
    }

    #[test]
    fn test_rule_set_id_must_be_overridden() {
        let providers = collect(
            "class FooProvider : RuleSetProvider {\n    val ruleSetId = someVariable\n    override val other = \"x\"\n}\n",
        )
        .unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "");
    }

    #[test]
    fn test_missing_rule_list() {
        let error = collect(
            "class FooProvider : RuleSetProvider {\n    override val ruleSetId = \"foo\"\n    override fun instance(config: Config) = RuleSet(ruleSetId, arrayOf(RuleA()))\n}\n",
        )
        .unwrap_err();

        assert_eq!(
            error,
            InvalidProviderError::MissingRuleList {
                rule_set: "foo".to_string()
            }
        );
    }

    #[test]
    fn test_missing_rule_list_names_current_rule_set() {
        // ruleSetId is declared after the call
        let error = collect(
            "class FooProvider : RuleSetProvider {\n    override fun instance(config: Config) = RuleSet(ruleSetId, rules)\n    override val ruleSetId = \"foo\"\n}\n",
        )
        .unwrap_err();

        assert_eq!(
            error,
            InvalidProviderError::MissingRuleList {
                rule_set: String::new()
            }
        );
    }

    #[test]
    fn test_rule_order_and_duplicates() {
        let providers = collect(
            "class P : RuleSetProvider {\n    override val ruleSetId = \"p\"\n    fun instance(c: Config) = RuleSet(\n        ruleSetId,\n        listOf(\n            RuleB(c),\n            RuleA(c),\n            RuleB(c),\n        )\n    )\n}\n",
        )
        .unwrap();

        assert_eq!(providers[0].rules, vec!["RuleB", "RuleA", "RuleB"]);
    }

    #[test]
    fn test_nullable_generic_marker_and_rules_across_calls() {
        let providers = collect(
            "class P : api.RuleSetProvider<Config>? {\n    override val ruleSetId = \"p\"\n    fun first(c: Config) = RuleSet(ruleSetId, listOf(RuleA(c)))\n    fun second(c: Config) = RuleSet(ruleSetId, listOf(RuleB(c), RuleC))\n}\n",
        )
        .unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].rules, vec!["RuleA", "RuleB", "RuleC"]);
    }

    #[test]
    fn test_non_reference_rule_arguments_are_skipped() {
        let providers = collect(
            "class P : RuleSetProvider {\n    override val ruleSetId = \"p\"\n    fun instance(c: Config) = RuleSet(ruleSetId, listOf(RuleA(c), rules.RuleB(c), \"literal\", { RuleC(c) }, RuleD))\n}\n",
        )
        .unwrap();

        assert_eq!(providers[0].rules, vec!["RuleA", "RuleD"]);
    }

    #[test]
    fn test_missing_description_warns() {
        let (providers, logs) = with_captured_logs(|| {
            collect(
                "class P : RuleSetProvider {\n    override val ruleSetId = \"p\"\n    fun instance(c: Config) = RuleSet(ruleSetId, listOf())\n}\n",
            )
        });
        let providers = providers.unwrap();

        assert_eq!(providers[0].description, "");
        assert!(!providers[0].active);
        assert!(providers[0].rules.is_empty());
        assert!(logs.contains("Missing description for RuleSet p"), "logs: {logs}");
    }

    #[test]
    fn test_missing_description_warning_can_be_disabled() {
        let (_, logs) = with_captured_logs(|| {
            let mut collector =
                RuleSetProviderCollector::new().with_missing_description_warning(false);
            collector
                .visit(&source_file("class P : RuleSetProvider\n"))
                .unwrap();
            assert_eq!(collector.items().len(), 1);
        });

        assert!(!logs.contains("Missing description"));
    }

    #[test]
    fn test_collecting_twice_yields_equal_records() {
        let file = source_file(FOO_PROVIDER);
        let mut collector = RuleSetProviderCollector::new();
        collector.visit(&file).unwrap();
        collector.visit(&file).unwrap();

        let items = collector.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], items[1]);
    }

    #[test]
    fn test_qualified_marker_and_last_super_type_list_wins() {
        let providers = collect("class P : io.gitlab.api.RuleSetProvider\n").unwrap();
        assert_eq!(providers.len(), 1);

        let providers = collect(
            "class P : RuleSetProvider {\n    class Nested : Other\n}\n",
        )
        .unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn test_nested_declarations_reassign_description() {
        let providers = collect(
            "/**\n * Outer docs\n * @active\n */\nclass P : RuleSetProvider {\n    companion object\n}\n",
        )
        .unwrap();

        assert_eq!(providers[0].description, "");
        assert!(!providers[0].active);
    }

    #[test]
    fn test_description_from_object_provider() {
        let providers = collect(
            "/**\n * Object provider.\n */\nobject P : RuleSetProvider {\n    override val ruleSetId = \"obj\"\n}\n",
        )
        .unwrap();

        assert_eq!(providers[0].name, "obj");
        assert_eq!(providers[0].description, "Object provider.");
    }

    #[test]
    fn test_active_tag_outside_default_section() {
        let providers = collect(
            "/**\n * Docs\n * @property ruleSetId the id\n * @active\n */\nclass P : RuleSetProvider\n",
        )
        .unwrap();

        assert_eq!(providers[0].description, "Docs");
        assert!(!providers[0].active);
    }

    #[test]
    fn test_serde_shape() {
        let provider = RuleSetProvider {
            name: "foo".to_string(),
            description: "Foo rules".to_string(),
            active: true,
            rules: vec!["RuleA".to_string()],
        };
        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "foo",
                "description": "Foo rules",
                "active": true,
                "rules": ["RuleA"],
            })
        );

        let parsed: RuleSetProvider =
            serde_json::from_str(r#"{"name":"x","description":"","active":false}"#).unwrap();
        assert!(parsed.rules.is_empty());
    }
}
