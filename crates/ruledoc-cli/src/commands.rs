//! CLI command implementations

use ruledoc_core::cst::{build_cst_from_tokens, lex_with_trivia};
use ruledoc_core::{
    CollectionExecutor, ConfigLoader, ExecutionContext, KotlinParser, ProgressInfo, Result,
    RuledocConfig, RuledocError, SourceDiscovery,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::output::{CollectSummary, FailedFile, OutputFormatter, ProgressReporter};
use crate::{ConfigFormat, OutputFormat};

/// Arguments of the collect command
pub struct CollectOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub fail_fast: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub progress: bool,
    pub threads: Option<usize>,
    pub use_colors: bool,
    pub config_path: Option<PathBuf>,
}

/// Collect command implementation
pub fn collect_command(options: CollectOptions) -> Result<()> {
    debug!("Running collect command on paths: {:?}", options.paths);

    let mut config = load_config(options.config_path.as_deref(), &options.paths)?;

    // Apply CLI overrides to configuration
    if !options.include.is_empty() {
        config.files.get_or_insert_with(Default::default).include = Some(options.include);
    }
    if !options.exclude.is_empty() {
        config.files.get_or_insert_with(Default::default).exclude = Some(options.exclude);
    }
    if options.fail_fast {
        config.collector.get_or_insert_with(Default::default).fail_fast = Some(true);
    }

    let start_time = Instant::now();

    let files = SourceDiscovery::from_config(&config)?.discover(&options.paths)?;
    debug!("Found {} Kotlin files to scan", files.len());

    let reporter = Arc::new(ProgressReporter::new(options.progress, files.len()));
    let mut context = ExecutionContext::new(config);
    if let Some(threads) = options.threads {
        context = context.with_thread_pool_size(threads);
    }
    if options.progress {
        let reporter = Arc::clone(&reporter);
        context = context.with_progress_callback(Arc::new(move |info: ProgressInfo| {
            reporter.update(info.completed_files, "Collecting");
        }));
    }

    let executor = CollectionExecutor::new(context);
    let results = executor.execute_parallel(&files);
    reporter.finish("Collecting");

    let mut providers = Vec::new();
    let mut summary = CollectSummary {
        files_scanned: results.len(),
        ..Default::default()
    };

    for result in results {
        if !result.parse_errors.is_empty() {
            summary.files_with_parse_errors += 1;
        }
        match result.error {
            Some(error) => {
                error!("Error processing {}: {}", result.file_path.display(), error);
                let message = match &error {
                    RuledocError::InvalidProvider { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                summary.failures.push(FailedFile {
                    file_path: result.file_path,
                    message,
                });
            }
            None => providers.extend(result.providers),
        }
    }
    summary.providers = providers.len();
    summary.duration = start_time.elapsed();

    info!(
        "Collected {} providers from {} files",
        summary.providers, summary.files_scanned
    );

    let use_colors = options.use_colors
        && std::env::var("NO_COLOR").is_err()
        && std::io::stdout().is_terminal();
    let formatter = OutputFormatter::new(options.format, use_colors);
    formatter.print_results(&providers, &summary)?;

    if summary.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Inspect command implementation
pub fn inspect_command(file: &Path, tokens: bool) -> Result<()> {
    debug!("Inspecting {}", file.display());

    let content =
        std::fs::read_to_string(file).map_err(|e| RuledocError::io_error(file, e))?;

    if tokens {
        let (lexed, errors) = lex_with_trivia(&content);
        println!("{:#?}", &*build_cst_from_tokens(&lexed));
        for error in errors {
            println!("  {}: lexer error at {:?}: {}", file.display(), error.span, error.message);
        }
        return Ok(());
    }

    let parse_result = KotlinParser::parse_content(&content)?;

    println!("{:#?}", &*parse_result.cst);

    if parse_result.is_valid() {
        println!("✅ No syntax errors");
    } else {
        println!("Syntax errors:");
        for parse_error in parse_result.errors() {
            println!("  {}:{}", file.display(), parse_error);
        }
    }

    Ok(())
}

/// Config init command implementation
pub fn config_init_command(format: ConfigFormat, force: bool) -> Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let filename = match format {
        ConfigFormat::Json => ".ruledocrc.json",
        ConfigFormat::Toml => ".ruledocrc.toml",
        ConfigFormat::Yaml => "ruledoc.yaml",
    };

    let config_path = PathBuf::from(filename);

    // Check if file already exists
    if config_path.exists() && !force {
        error!(
            "Configuration file '{}' already exists. Use --force to overwrite.",
            filename
        );
        return Err(RuledocError::config_error(format!(
            "Configuration file '{filename}' already exists"
        )));
    }

    let default_config = create_default_config();

    let config_content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&default_config)
            .map_err(|e| RuledocError::config_error(format!("Failed to serialize JSON: {e}")))?,
        ConfigFormat::Toml => toml::to_string_pretty(&default_config)
            .map_err(|e| RuledocError::config_error(format!("Failed to serialize TOML: {e}")))?,
        ConfigFormat::Yaml => serde_yaml::to_string(&default_config)
            .map_err(|e| RuledocError::config_error(format!("Failed to serialize YAML: {e}")))?,
    };

    std::fs::write(&config_path, config_content)
        .map_err(|e| RuledocError::io_error(&config_path, e))?;

    println!("✅ Created configuration file: {filename}");
    println!("   Edit the file to customize which sources are scanned.");

    Ok(())
}

/// Config validate command implementation
pub fn config_validate_command(path: Option<PathBuf>) -> Result<()> {
    debug!("Validating configuration file: {:?}", path);

    let loaded = match path {
        Some(p) => ConfigLoader::load(Some(&p), None),
        None => ConfigLoader::load(None, None),
    };

    match loaded.and_then(|config| {
        SourceDiscovery::from_config(&config)?;
        Ok(config)
    }) {
        Ok(config) => {
            println!("✅ Configuration is valid");
            let files = config.files_config();
            println!(
                "   Include: {}",
                files.include.unwrap_or_default().join(", ")
            );
            println!(
                "   Exclude: {}",
                files.exclude.unwrap_or_default().join(", ")
            );
            println!("   Fail fast: {}", config.fail_fast());
        }
        Err(e) => {
            error!("❌ Configuration validation failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

/// Config show command implementation
pub fn config_show_command(resolved: bool, config_path: Option<PathBuf>) -> Result<()> {
    debug!("Showing configuration (resolved: {})", resolved);

    let mut config = ConfigLoader::load(config_path.as_deref(), None)?;

    if resolved {
        config.files = Some(config.files_config());
        config.collector = Some(config.collector_config());
        println!("Resolved Configuration:");
        println!("======================");
    } else {
        println!("Configuration:");
        println!("==============");
    }

    let config_json = serde_json::to_string_pretty(&config)
        .map_err(|e| RuledocError::config_error(format!("Failed to serialize config: {e}")))?;
    println!("{config_json}");

    Ok(())
}

/// Config schema command implementation
pub fn config_schema_command() -> Result<()> {
    let schema = serde_json::to_string_pretty(&RuledocConfig::json_schema())
        .map_err(|e| RuledocError::internal_error(format!("Failed to serialize schema: {e}")))?;
    println!("{schema}");
    Ok(())
}

/// Config lookup starts next to the first scanned path
fn load_config(custom_path: Option<&Path>, paths: &[PathBuf]) -> Result<RuledocConfig> {
    let start_path = match paths.first() {
        Some(path) if path.is_file() => match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        },
        Some(path) if path.is_dir() => path.as_path(),
        _ => Path::new("."),
    };

    ConfigLoader::load(custom_path, Some(start_path))
}

/// Create a default configuration with every section filled in
fn create_default_config() -> serde_json::Value {
    serde_json::json!({
        "files": {
            "include": ["**/*.kt", "**/*.kts"],
            "exclude": ["**/build/**"],
            "ignoreFiles": [".ruledocignore"]
        },
        "collector": {
            "failFast": false,
            "warnMissingDescription": true
        }
    })
}
