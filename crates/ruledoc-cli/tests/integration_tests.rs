//! Integration tests for the ruledoc CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const STYLE_PROVIDER: &str = r#"package io.gitlab.arturbosch.detekt.rules.style

/**
 * The Style ruleset provides rules that assert the style of the code.
 *
 * @active since v1.0.0
 */
class StyleGuideProvider : RuleSetProvider {
    override val ruleSetId: String = "style"

    override fun instance(config: Config): RuleSet = RuleSet(
        ruleSetId,
        listOf(
            MagicNumber(config),
            WildcardImport(config)
        )
    )
}
"#;

const BROKEN_PROVIDER: &str = r#"class NamingProvider : RuleSetProvider {
    override val ruleSetId: String = NAME
    override fun instance(config: Config) = RuleSet(ruleSetId, listOf(ClassNaming(config)))
}
"#;

/// Helper function to create a test CLI command
#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("ruledoc").unwrap()
}

/// Helper function to create a temporary directory with test files
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let rules = temp_dir.path().join("rules");
    fs::create_dir_all(&rules).unwrap();
    fs::write(rules.join("StyleGuideProvider.kt"), STYLE_PROVIDER).unwrap();
    fs::write(
        rules.join("MagicNumber.kt"),
        "class MagicNumber(config: Config) : Rule(config)\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("ruledoc.json"), "{}").unwrap();
    temp_dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ruledoc scans Kotlin sources for RuleSetProvider implementations",
        ))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_version_detailed() {
    cli()
        .args(["version", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("ruledoc {VERSION}")))
        .stdout(predicate::str::contains("Build information:"));
}

#[test]
fn test_collect_json() {
    let temp_dir = create_test_project();
    let output = cli()
        .args(["collect", temp_dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let providers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        providers,
        serde_json::json!([{
            "name": "style",
            "description": "The Style ruleset provides rules that assert the style of the code.",
            "active": true,
            "rules": ["MagicNumber", "WildcardImport"]
        }])
    );
}

#[test]
fn test_collect_yaml() {
    let temp_dir = create_test_project();
    cli()
        .args(["collect", temp_dir.path().to_str().unwrap(), "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: style"))
        .stdout(predicate::str::contains("- WildcardImport"));
}

#[test]
fn test_collect_human() {
    let temp_dir = create_test_project();
    cli()
        .args(["--no-color", "collect", temp_dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("style (active)"))
        .stdout(predicate::str::contains(
            "Rules (2): MagicNumber, WildcardImport",
        ))
        .stdout(predicate::str::contains("Files scanned: 2"))
        .stdout(predicate::str::contains("Providers found: 1"));
}

#[test]
fn test_collect_invalid_provider_fails() {
    let temp_dir = create_test_project();
    fs::write(temp_dir.path().join("NamingProvider.kt"), BROKEN_PROVIDER).unwrap();

    cli()
        .args(["--no-color", "collect", temp_dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "RuleSetProvider class NamingProvider doesn't provide a literal ruleSetId.",
        ))
        .stdout(predicate::str::contains("style (active)"));
}

#[test]
fn test_collect_exclude_override() {
    let temp_dir = create_test_project();
    fs::write(temp_dir.path().join("NamingProvider.kt"), BROKEN_PROVIDER).unwrap();

    cli()
        .args([
            "collect",
            temp_dir.path().to_str().unwrap(),
            "--exclude",
            "NamingProvider.kt",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"style\""));
}

#[test]
fn test_collect_missing_description_warning() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("EmptyProvider.kt"),
        "class EmptyCodeProvider : RuleSetProvider {\n    override val ruleSetId = \"empty-blocks\"\n    override fun instance(config: Config) = RuleSet(ruleSetId, listOf(EmptyCatchBlock(config)))\n}\n",
    )
    .unwrap();

    cli()
        .args(["collect", temp_dir.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"empty-blocks\""))
        .stderr(predicate::str::contains(
            "Missing description for RuleSet empty-blocks",
        ));
}

#[test]
fn test_collect_nonexistent_path() {
    cli()
        .args(["collect", "/nonexistent/path"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_collect_with_progress() {
    let temp_dir = create_test_project();
    cli()
        .args(["collect", temp_dir.path().to_str().unwrap(), "--progress"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Collecting Complete!"));
}

#[test]
fn test_inspect() {
    let temp_dir = create_test_project();
    let file = temp_dir.path().join("rules/StyleGuideProvider.kt");

    cli()
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("SourceFile@"))
        .stdout(predicate::str::contains("No syntax errors"));
}

#[test]
fn test_inspect_tokens() {
    let temp_dir = create_test_project();
    let file = temp_dir.path().join("rules/MagicNumber.kt");

    cli()
        .args(["inspect", "--tokens", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ClassKw@0..5"))
        .stdout(predicate::str::contains("SuperTypeList").not());
}

#[test]
fn test_config_init() {
    let temp_dir = TempDir::new().unwrap();
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    let content = fs::read_to_string(temp_dir.path().join(".ruledocrc.json")).unwrap();
    assert!(content.contains("\"warnMissingDescription\": true"));
}

#[test]
fn test_config_init_toml_format() {
    let temp_dir = TempDir::new().unwrap();
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--format", "toml"])
        .assert()
        .success();

    assert!(temp_dir.path().join(".ruledocrc.toml").exists());
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".ruledocrc.json"), "{}").unwrap();

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init"])
        .assert()
        .failure();

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_validate_specific_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ruledoc.yaml");
    fs::write(&config_path, "collector:\n  failFast: true\n").unwrap();

    cli()
        .args(["config", "validate", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Fail fast: true"));
}

#[test]
fn test_config_validate_bad_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ruledoc.json");
    fs::write(&config_path, r#"{"files": {"include": ["["]}}"#).unwrap();

    cli()
        .args(["config", "validate", config_path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_config_validate_nonexistent() {
    cli()
        .args(["config", "validate", "/nonexistent/ruledoc.json"])
        .assert()
        .failure();
}

#[test]
fn test_config_show_resolved() {
    let temp_dir = create_test_project();
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "show", "--resolved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved Configuration:"))
        .stdout(predicate::str::contains("\"failFast\": false"));
}

#[test]
fn test_config_schema() {
    cli()
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"collector\""));
}

#[test]
fn test_shell_completion_bash() {
    cli()
        .args(["--generate-completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ruledoc"));
}

#[test]
fn test_invalid_command() {
    cli()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
