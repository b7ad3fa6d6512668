//! Configuration file discovery and loading

use super::RuledocConfig;
use crate::error::RuledocError;
use std::path::{Path, PathBuf};

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, RuledocError>;

/// Config file names, in lookup priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".ruledocrc.json",
    ".ruledocrc.toml",
    "ruledoc.yaml",
    "ruledoc.yml",
    "ruledoc.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// Looks for each name in [`CONFIG_FILE_NAMES`] in turn, starting from the
    /// given directory and moving up until a config is found or the
    /// filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| RuledocError::ConfigError {
                message: format!("Invalid path '{}': {e}", start_path.display()),
            })?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<RuledocConfig> {
        RuledocConfig::load(path).map_err(|e| RuledocError::ConfigError {
            message: format!("Failed to load config from '{}': {}", path.display(), e),
        })
    }

    /// Load config from path or auto-discover
    ///
    /// An explicit path must exist. Without one, the nearest config above
    /// `start_dir` (or the current directory) is used, falling back to the
    /// defaults when there is none.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<RuledocConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(RuledocError::ConfigError {
                    message: format!("Config file not found: {}", path.display()),
                });
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(RuledocConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "ruledoc.json",
            r#"{
                "collector": {
                    "failFast": true
                }
            }"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert!(config.fail_fast());
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            ".ruledocrc.toml",
            r#"
threads = 4

[files]
include = ["rules/**/*.kt"]
"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.threads, Some(4));
        assert_eq!(
            config.files_config().include,
            Some(vec!["rules/**/*.kt".to_string()])
        );
    }

    #[test]
    fn test_load_from_file_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "ruledoc.yaml",
            "files:\n  exclude:\n    - \"**/test/**\"\n",
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(
            config.files_config().exclude,
            Some(vec!["**/test/**".to_string()])
        );
    }

    #[test]
    fn test_auto_discover() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();

        create_temp_config(temp_dir.path(), "ruledoc.json", "{}");

        let found = ConfigLoader::auto_discover(&nested).unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), "ruledoc.json");
    }

    #[test]
    fn test_auto_discover_priority() {
        let temp_dir = TempDir::new().unwrap();

        create_temp_config(temp_dir.path(), ".ruledocrc.json", "{}");
        create_temp_config(temp_dir.path(), "ruledoc.yaml", "threads: 1\n");
        create_temp_config(temp_dir.path(), "ruledoc.json", "{}");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), ".ruledocrc.json");
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load(None, Some(temp_dir.path())).unwrap();

        // A config further up the real filesystem could be picked up; only
        // assert on a value every default provides.
        assert!(config.files_config().include.is_some());
    }

    #[test]
    fn test_load_missing_custom_path() {
        let result = ConfigLoader::load(Some(Path::new("missing/ruledoc.json")), None);
        assert!(matches!(result, Err(RuledocError::ConfigError { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path =
            create_temp_config(temp_dir.path(), "invalid.json", r#"{ invalid json }"#);

        let result = ConfigLoader::load_from_file(&config_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(temp_dir.path(), "ruledoc.ini", "threads=1");

        let error = ConfigLoader::load_from_file(&config_path).unwrap_err();
        assert!(error.to_string().contains("Unsupported file extension"));
    }
}
