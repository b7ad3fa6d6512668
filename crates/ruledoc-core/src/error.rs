//! Error types and handling for metadata collection

use std::path::PathBuf;
use thiserror::Error;

/// A provider declaration that cannot be turned into a metadata record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProviderError {
    /// `RuleSet(...)` without a `listOf(...)` argument
    #[error("RuleSetProvider {rule_set} doesn't provide list of rules.")]
    MissingRuleList { rule_set: String },

    /// `ruleSetId` initialised with something other than a plain string literal
    #[error("RuleSetProvider class {class_name} doesn't provide a literal ruleSetId.")]
    MissingNameLiteral { class_name: String },
}

/// Main error type for ruledoc operations
#[derive(Debug, Error)]
pub enum RuledocError {
    /// Provider declarations the collector rejected
    #[error("Invalid provider in '{}': {source}", path.display())]
    InvalidProvider {
        path: PathBuf,
        #[source]
        source: InvalidProviderError,
    },

    /// Source text that could not be parsed
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input path expansion errors
    #[error("Discovery error: {message}")]
    DiscoveryError { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidProvider,
    Parse,
    Config,
    Io,
    Discovery,
    Internal,
}

impl RuledocError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuledocError::InvalidProvider { .. } => ErrorKind::InvalidProvider,
            RuledocError::ParseError { .. } => ErrorKind::Parse,
            RuledocError::ConfigError { .. } => ErrorKind::Config,
            RuledocError::IoError { .. } => ErrorKind::Io,
            RuledocError::DiscoveryError { .. } => ErrorKind::Discovery,
            RuledocError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidProvider | ErrorKind::Parse | ErrorKind::Io
        )
    }

    /// Create an invalid provider error with path context
    pub fn invalid_provider(path: impl Into<PathBuf>, source: InvalidProviderError) -> Self {
        Self::InvalidProvider {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a discovery error
    pub fn discovery_error(message: impl Into<String>) -> Self {
        Self::DiscoveryError {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from InvalidProviderError when no path is known
impl From<InvalidProviderError> for RuledocError {
    fn from(err: InvalidProviderError) -> Self {
        Self::InvalidProvider {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for RuledocError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_provider_messages() {
        let missing_rules = InvalidProviderError::MissingRuleList {
            rule_set: "style".to_string(),
        };
        assert_eq!(
            missing_rules.to_string(),
            "RuleSetProvider style doesn't provide list of rules."
        );

        let missing_name = InvalidProviderError::MissingNameLiteral {
            class_name: "StyleProvider".to_string(),
        };
        assert_eq!(
            missing_name.to_string(),
            "RuleSetProvider class StyleProvider doesn't provide a literal ruleSetId."
        );
    }

    #[test]
    fn test_error_kinds_and_recovery() {
        let error: RuledocError = InvalidProviderError::MissingRuleList {
            rule_set: String::new(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::InvalidProvider);
        assert!(error.is_recoverable());

        let error = RuledocError::config_error("bad glob");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(!error.is_recoverable());
        assert_eq!(error.to_string(), "Configuration error: bad glob");

        let error = RuledocError::io_error(
            "Missing.kt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(error.kind(), ErrorKind::Io);
        assert_eq!(error.to_string(), "IO error for path 'Missing.kt': gone");
    }
}
