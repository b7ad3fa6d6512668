//! Ruledoc Core
//!
//! Collects documentation metadata from detekt-style Kotlin sources.
//! This crate parses Kotlin into a lossless syntax tree, finds every
//! `RuleSetProvider` declaration and reports its rule set id, KDoc
//! description, `@active` flag and the rules it registers.

pub mod collector;
pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod discovery;
pub mod error;
pub mod executor;
pub mod kdoc;
pub mod parser;
pub mod result;

// Re-export commonly used types
pub use collector::{Collector, RuleSetProvider, RuleSetProviderCollector};
// Configuration system
pub use config::{
    CONFIG_FILE_NAMES, CollectorConfiguration, ConfigLoader, FilesConfiguration, RuledocConfig,
};
pub use discovery::SourceDiscovery;
pub use error::{ErrorKind, InvalidProviderError, RuledocError};
pub use executor::{
    CollectionExecutor, ExecutionContext, FileCollection, ProgressCallback, ProgressInfo,
};
pub use kdoc::{KDoc, KDocSection, KDocTag};
pub use parser::{KotlinParser, ParseError, ParseErrorKind, ParseResult};
pub use result::{Result, ResultExt};

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so collected metadata on stdout stays machine-readable.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ruledoc=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
