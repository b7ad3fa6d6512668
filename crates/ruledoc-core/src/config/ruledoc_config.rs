//! Configuration types for ruledoc

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuledocConfig {
    /// JSON schema reference for editor support
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "JSON schema reference")]
    pub schema: Option<String>,

    /// Source discovery configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Which Kotlin sources to scan")]
    pub files: Option<FilesConfiguration>,

    /// Collector behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Collector behaviour")]
    pub collector: Option<CollectorConfiguration>,

    /// Worker thread count
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Number of worker threads (default: number of CPU cores)")]
    pub threads: Option<usize>,
}

/// Files configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesConfiguration {
    /// Glob patterns to include
    #[schemars(description = "Glob patterns for files to include")]
    pub include: Option<Vec<String>>,

    /// Glob patterns to exclude
    #[schemars(description = "Glob patterns for files to exclude")]
    pub exclude: Option<Vec<String>>,

    /// Custom ignore files to respect
    #[schemars(description = "Ignore files with one glob per line, relative to each input directory")]
    pub ignore_files: Option<Vec<String>>,
}

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorConfiguration {
    /// Stop at the first invalid provider
    #[schemars(description = "Stop at the first invalid provider instead of reporting all")]
    pub fail_fast: Option<bool>,

    /// Warn about providers without KDoc description
    #[schemars(description = "Log a warning for providers without a description")]
    pub warn_missing_description: Option<bool>,
}

impl RuledocConfig {
    /// Load configuration from file
    ///
    /// The format follows the extension: `.json`, `.toml`, `.yaml` or `.yml`.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err("Unsupported file extension (expected .json, .toml, .yaml, or .yml)".into()),
        }
    }

    /// Get files configuration with defaults
    pub fn files_config(&self) -> FilesConfiguration {
        let defaults = FilesConfiguration::default();
        let files = self.files.clone().unwrap_or_default();
        FilesConfiguration {
            include: files.include.or(defaults.include),
            exclude: files.exclude.or(defaults.exclude),
            ignore_files: files.ignore_files.or(defaults.ignore_files),
        }
    }

    /// Get collector configuration with defaults
    pub fn collector_config(&self) -> CollectorConfiguration {
        let defaults = CollectorConfiguration::default();
        let collector = self.collector.clone().unwrap_or_default();
        CollectorConfiguration {
            fail_fast: collector.fail_fast.or(defaults.fail_fast),
            warn_missing_description: collector
                .warn_missing_description
                .or(defaults.warn_missing_description),
        }
    }

    pub fn fail_fast(&self) -> bool {
        self.collector_config().fail_fast.unwrap_or(false)
    }

    pub fn warn_missing_description(&self) -> bool {
        self.collector_config()
            .warn_missing_description
            .unwrap_or(true)
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(RuledocConfig)).unwrap_or_default()
    }
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            include: Some(vec!["**/*.kt".to_string(), "**/*.kts".to_string()]),
            exclude: Some(vec!["**/build/**".to_string()]),
            ignore_files: Some(vec![".ruledocignore".to_string()]),
        }
    }
}

impl Default for CollectorConfiguration {
    fn default() -> Self {
        Self {
            fail_fast: Some(false),
            warn_missing_description: Some(true),
        }
    }
}
