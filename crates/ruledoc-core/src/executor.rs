//! Parallel collection engine
//!
//! Reads and parses every discovered file on the rayon pool, runs the rule
//! set provider collector over each tree and returns the per-file outcomes
//! in input order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{
    Arc, Once,
    atomic::{AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{Level, debug, error, info, span, warn};

use crate::collector::{Collector, RuleSetProvider, RuleSetProviderCollector};
use crate::parser::{KotlinParser, ParseError};
use crate::result::ResultExt;
use crate::{Result, RuledocConfig, RuledocError};

/// Initialize the global Rayon thread pool once
static THREAD_POOL_INIT: Once = Once::new();

fn init_global_thread_pool(threads: usize) {
    THREAD_POOL_INIT.call_once(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("ruledoc-worker-{index}"))
            .build_global()
            .unwrap_or_else(|e| {
                warn!(
                    "Could not configure global thread pool (may already be initialized): {}",
                    e
                );
            });
        info!(
            "Configured global rayon thread pool with {} threads",
            threads
        );
    });
}

/// Progress reporting callback type
pub type ProgressCallback = Arc<dyn Fn(ProgressInfo) + Send + Sync>;

/// Information about collection progress
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Total number of files to process
    pub total_files: usize,
    /// Number of files completed
    pub completed_files: usize,
    /// File that just finished, if any
    pub current_file: Option<PathBuf>,
    /// Elapsed time since start
    pub elapsed: Duration,
    /// Estimated time remaining (if available)
    pub estimated_remaining: Option<Duration>,
}

impl ProgressInfo {
    /// Calculate completion percentage (0.0 to 1.0)
    pub fn completion_percentage(&self) -> f64 {
        if self.total_files == 0 {
            1.0
        } else {
            self.completed_files as f64 / self.total_files as f64
        }
    }
}

/// Execution context containing configuration and shared resources
pub struct ExecutionContext {
    pub config: RuledocConfig,
    /// Overrides `threads` from the configuration
    pub thread_pool_size: Option<usize>,
    pub progress_callback: Option<ProgressCallback>,
}

impl ExecutionContext {
    pub fn new(config: RuledocConfig) -> Self {
        Self {
            config,
            thread_pool_size: None,
            progress_callback: None,
        }
    }

    /// Set the thread pool size
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Set progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Outcome of collecting a single file
#[derive(Debug)]
pub struct FileCollection {
    pub file_path: PathBuf,
    /// Empty when the file declares no provider or the provider was invalid
    pub providers: Vec<RuleSetProvider>,
    /// Syntax errors found while parsing; they never stop collection
    pub parse_errors: Vec<ParseError>,
    pub execution_time: Duration,
    /// Read failure or invalid provider
    pub error: Option<RuledocError>,
}

impl FileCollection {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Providers of this file, or the error that prevented collecting them
    pub fn into_result(self) -> Result<Vec<RuleSetProvider>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.providers),
        }
    }
}

/// Runs the collector over many files in parallel
pub struct CollectionExecutor {
    context: ExecutionContext,
}

impl CollectionExecutor {
    pub fn new(context: ExecutionContext) -> Self {
        let thread_count = context
            .thread_pool_size
            .or(context.config.threads)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|p| p.get())
                    .unwrap_or(4)
            });

        info!("Initializing executor with {} threads", thread_count);
        init_global_thread_pool(thread_count);

        Self { context }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Read and collect one file
    pub fn collect_file(&self, file_path: &Path) -> FileCollection {
        let start_time = Instant::now();
        let span = span!(Level::DEBUG, "collect_file", file = %file_path.display());
        let _enter = span.enter();

        match fs::read_to_string(file_path) {
            Ok(content) => {
                let mut result = self.collect_source(file_path, &content);
                result.execution_time = start_time.elapsed();
                result
            }
            Err(io_error) => {
                let error = RuledocError::io_error(file_path, io_error);
                error!("Failed to read file {}: {}", file_path.display(), error);
                FileCollection {
                    file_path: file_path.to_path_buf(),
                    providers: vec![],
                    parse_errors: vec![],
                    execution_time: start_time.elapsed(),
                    error: Some(error),
                }
            }
        }
    }

    /// Collect from source text already in memory
    ///
    /// `file_path` is only used to label errors and the result.
    pub fn collect_source(&self, file_path: &Path, content: &str) -> FileCollection {
        let start_time = Instant::now();
        debug!("Collecting from {}", file_path.display());

        let parse_result = match KotlinParser::parse_content(content) {
            Ok(result) => result,
            Err(error) => {
                error!("Failed to parse file {}: {}", file_path.display(), error);
                return FileCollection {
                    file_path: file_path.to_path_buf(),
                    providers: vec![],
                    parse_errors: vec![],
                    execution_time: start_time.elapsed(),
                    error: Some(error),
                };
            }
        };

        for parse_error in parse_result.errors() {
            debug!("{}:{}", file_path.display(), parse_error);
        }

        let mut collector = RuleSetProviderCollector::new()
            .with_missing_description_warning(self.context.config.warn_missing_description());

        let error = match parse_result.source_file() {
            Some(source_file) => collector
                .visit(&source_file)
                .err()
                .map(|e| RuledocError::invalid_provider(file_path, e)),
            None => Some(RuledocError::internal_error(format!(
                "Syntax tree of {} has no source file root",
                file_path.display()
            ))),
        };

        let execution_time = start_time.elapsed();
        debug!(
            "Completed collecting {} in {:?}",
            file_path.display(),
            execution_time
        );

        FileCollection {
            file_path: file_path.to_path_buf(),
            providers: collector.into_items(),
            parse_errors: parse_result.errors,
            execution_time,
            error,
        }
    }

    /// Collect every file on the thread pool, keeping input order
    ///
    /// With `failFast` set, the result ends at the first failing file in
    /// input order; files after it may be skipped.
    pub fn execute_parallel(&self, files: &[PathBuf]) -> Vec<FileCollection> {
        let total_files = files.len();
        let start_time = Instant::now();
        let fail_fast = self.context.config.fail_fast();

        let completed_count = AtomicUsize::new(0);
        let failed_at = AtomicUsize::new(usize::MAX);

        let mut indexed_results: Vec<(usize, FileCollection)> = files
            .par_iter()
            .enumerate()
            .filter_map(|(index, file_path)| {
                if fail_fast && index > failed_at.load(Ordering::Acquire) {
                    return None;
                }

                let result = self.collect_file(file_path);
                if fail_fast && !result.is_success() {
                    failed_at.fetch_min(index, Ordering::AcqRel);
                }

                let completed = completed_count.fetch_add(1, Ordering::Relaxed) + 1;
                let elapsed = start_time.elapsed();
                let estimated_remaining = {
                    let avg_time_per_file = elapsed / completed as u32;
                    let remaining_files = total_files.saturating_sub(completed);
                    Some(avg_time_per_file * remaining_files as u32)
                };

                self.report_progress(ProgressInfo {
                    total_files,
                    completed_files: completed,
                    current_file: Some(file_path.clone()),
                    elapsed,
                    estimated_remaining,
                });

                Some((index, result))
            })
            .collect();

        // Sort by original index to maintain deterministic ordering
        indexed_results.sort_by_key(|(index, _)| *index);

        let first_failure = failed_at.load(Ordering::Acquire);
        if fail_fast && first_failure != usize::MAX {
            indexed_results.retain(|(index, _)| *index <= first_failure);
            info!("Stopped after first failure in file #{}", first_failure + 1);
        }

        let total_time = start_time.elapsed();
        info!(
            "Completed collection of {} files in {:?}",
            total_files, total_time
        );

        self.report_progress(ProgressInfo {
            total_files,
            completed_files: total_files,
            current_file: None,
            elapsed: total_time,
            estimated_remaining: Some(Duration::ZERO),
        });

        indexed_results
            .into_iter()
            .map(|(_, result)| result)
            .collect()
    }

    /// Collect providers from every file into one list
    ///
    /// Failures are logged and skipped, or returned as the error when
    /// `failFast` is set.
    pub fn collect_all(&self, files: &[PathBuf]) -> Result<Vec<RuleSetProvider>> {
        let mut providers = Vec::new();

        for result in self.execute_parallel(files) {
            let file_result = result.into_result();
            if self.context.config.fail_fast() {
                providers.extend(file_result?);
            } else if let Some(found) = file_result.log_and_continue() {
                providers.extend(found);
            }
        }

        Ok(providers)
    }

    fn report_progress(&self, info: ProgressInfo) {
        if let Some(ref callback) = self.context.progress_callback {
            callback(info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectorConfiguration;
    use crate::error::InvalidProviderError;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const PROVIDER: &str = r#"
/**
 * Style rules
 * @active
 */
class StyleProvider : RuleSetProvider {
    override val ruleSetId: String = "style"
    override fun instance(config: Config) = RuleSet(ruleSetId, listOf(MagicNumber(config), WildcardImport(config)))
}
"#;

    const BROKEN_PROVIDER: &str = r#"
class BrokenProvider : RuleSetProvider {
    override val ruleSetId: String = "broken"
    override fun instance(config: Config) = RuleSet(ruleSetId, rules())
}
"#;

    fn executor(fail_fast: bool) -> CollectionExecutor {
        let config = RuledocConfig {
            collector: Some(CollectorConfiguration {
                fail_fast: Some(fail_fast),
                warn_missing_description: Some(false),
            }),
            ..Default::default()
        };
        CollectionExecutor::new(ExecutionContext::new(config).with_thread_pool_size(2))
    }

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_progress_info_completion_percentage() {
        let progress = ProgressInfo {
            total_files: 100,
            completed_files: 25,
            current_file: None,
            elapsed: Duration::from_secs(10),
            estimated_remaining: None,
        };

        assert_eq!(progress.completion_percentage(), 0.25);
    }

    #[test]
    fn test_progress_info_completion_percentage_zero_total() {
        let progress = ProgressInfo {
            total_files: 0,
            completed_files: 0,
            current_file: None,
            elapsed: Duration::from_secs(0),
            estimated_remaining: None,
        };

        assert_eq!(progress.completion_percentage(), 1.0);
    }

    #[test]
    fn test_execution_context_builder() {
        let context = ExecutionContext::new(RuledocConfig::default()).with_thread_pool_size(4);

        assert_eq!(context.thread_pool_size, Some(4));
        assert!(context.progress_callback.is_none());
    }

    #[test]
    fn test_collect_source() {
        let result = executor(false).collect_source(Path::new("Style.kt"), PROVIDER);

        assert!(result.is_success());
        assert!(result.parse_errors.is_empty());
        assert_eq!(
            result.providers,
            vec![RuleSetProvider {
                name: "style".to_string(),
                description: "Style rules".to_string(),
                active: true,
                rules: vec!["MagicNumber".to_string(), "WildcardImport".to_string()],
            }]
        );
    }

    #[test]
    fn test_collect_source_without_provider() {
        let result = executor(false).collect_source(Path::new("Rule.kt"), "class Rule : Base()\n");

        assert!(result.is_success());
        assert!(result.providers.is_empty());
    }

    #[test]
    fn test_collect_source_invalid_provider() {
        let result = executor(false).collect_source(Path::new("Broken.kt"), BROKEN_PROVIDER);

        assert!(result.providers.is_empty());
        match result.error {
            Some(RuledocError::InvalidProvider { path, source }) => {
                assert_eq!(path, PathBuf::from("Broken.kt"));
                assert_eq!(
                    source,
                    InvalidProviderError::MissingRuleList {
                        rule_set: "broken".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors_do_not_stop_collection() {
        let source = format!("{PROVIDER}\nfun broken( {{\n");
        let result = executor(false).collect_source(Path::new("Style.kt"), &source);

        assert!(!result.parse_errors.is_empty());
        assert_eq!(result.providers.len(), 1);
    }

    #[test]
    fn test_collect_missing_file() {
        let result = executor(false).collect_file(Path::new("does/not/exist.kt"));

        assert!(matches!(result.error, Some(RuledocError::IoError { .. })));
    }

    #[test]
    fn test_execute_parallel_keeps_input_order() {
        let temp_dir = TempDir::new().unwrap();
        let sources: Vec<(String, String)> = (0..12)
            .map(|i| {
                (
                    format!("P{i}.kt"),
                    PROVIDER.replace("\"style\"", &format!("\"set{i}\"")),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = sources
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
            .collect();
        let files = write_files(temp_dir.path(), &borrowed);

        let results = executor(false).execute_parallel(&files);

        let names: Vec<_> = results
            .iter()
            .map(|r| r.providers[0].name.clone())
            .collect();
        let expected: Vec<_> = (0..12).map(|i| format!("set{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_execute_parallel_reports_progress() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(
            temp_dir.path(),
            &[("A.kt", PROVIDER), ("B.kt", "class B\n")],
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let context = ExecutionContext::new(RuledocConfig::default()).with_progress_callback(
            Arc::new(move |info: ProgressInfo| {
                seen_clone.lock().unwrap().push(info.completed_files);
            }),
        );

        CollectionExecutor::new(context).execute_parallel(&files);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last(), Some(&2));
    }

    #[test]
    fn test_collect_all_skips_failures() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(
            temp_dir.path(),
            &[("A.kt", BROKEN_PROVIDER), ("B.kt", PROVIDER)],
        );

        let providers = executor(false).collect_all(&files).unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "style");
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(
            temp_dir.path(),
            &[
                ("A.kt", PROVIDER),
                ("B.kt", BROKEN_PROVIDER),
                ("C.kt", PROVIDER),
            ],
        );

        let executor = executor(true);
        let results = executor.execute_parallel(&files);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());

        let error = executor.collect_all(&files).unwrap_err();
        assert!(error.to_string().contains("doesn't provide list of rules"));
    }
}
