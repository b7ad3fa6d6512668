//! Metadata collectors
//!
//! A collector walks the syntax tree of one source file per [`Collector::visit`]
//! call and keeps every record it builds. Collectors never read files; callers
//! parse the source (see [`crate::parser::KotlinParser`]) and hand over the
//! typed root.

mod rule_set_provider;

pub use rule_set_provider::{RuleSetProvider, RuleSetProviderCollector};

use crate::cst::ast::SourceFile;
use crate::error::InvalidProviderError;

/// Gathers metadata records from source files
pub trait Collector {
    /// Record produced per matching declaration
    type Item;

    /// Collect from one source file, appending to [`Collector::items`]
    fn visit(&mut self, file: &SourceFile) -> Result<(), InvalidProviderError>;

    /// Records collected so far, in visit order
    fn items(&self) -> &[Self::Item];

    fn into_items(self) -> Vec<Self::Item>;
}
