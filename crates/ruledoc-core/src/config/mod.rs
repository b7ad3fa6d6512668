//! Configuration system for ruledoc
//!
//! Settings come from an optional config file found by walking up from the
//! scanned directory. JSON, TOML and YAML are accepted; keys are camelCase.
//!
//! ## Configuration Files
//!
//! Looked up in this order in every directory:
//! - `.ruledocrc.json`
//! - `.ruledocrc.toml`
//! - `ruledoc.yaml` / `ruledoc.yml`
//! - `ruledoc.json`
//!
//! ## Example Configuration
//!
//! ```json
//! {
//!   "files": {
//!     "include": ["**/*.kt"],
//!     "exclude": ["**/build/**", "**/test/**"]
//!   },
//!   "collector": {
//!     "failFast": false,
//!     "warnMissingDescription": true
//!   },
//!   "threads": 4
//! }
//! ```

mod loader;
mod ruledoc_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use ruledoc_config::{CollectorConfiguration, FilesConfiguration, RuledocConfig};
