//! Ruledoc CLI
//!
//! Command-line interface for collecting rule set provider metadata

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use ruledoc_core::{Result, init_tracing};
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "ruledoc")]
#[command(about = "ruledoc: Collect documentation metadata from Kotlin rule set providers")]
#[command(version = ruledoc_core::VERSION)]
#[command(
    long_about = "ruledoc scans Kotlin sources for RuleSetProvider implementations and reports\n\
their rule set id, KDoc description, @active flag and registered rules.\n\
\n\
Examples:\n  \
ruledoc collect                      # Collect from current directory\n  \
ruledoc collect rules/ --format json # Machine-readable output\n  \
ruledoc inspect StyleProvider.kt     # Show the syntax tree of a file\n  \
ruledoc config init                  # Initialize configuration file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.ruledocrc.json/.ruledocrc.toml/ruledoc.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect rule set provider metadata from Kotlin sources
    Collect {
        /// Files or directories to scan
        #[arg(help = "Files or directories to scan (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,

        /// Stop at the first invalid provider
        #[arg(long, help = "Stop at the first invalid provider")]
        fail_fast: bool,

        /// Include patterns (glob syntax)
        #[arg(
            long,
            help = "Include files matching pattern (can be used multiple times)"
        )]
        include: Vec<String>,

        /// Exclude patterns (glob syntax)
        #[arg(
            long,
            help = "Exclude files matching pattern (can be used multiple times)"
        )]
        exclude: Vec<String>,

        /// Show progress for long-running operations
        #[arg(long, help = "Show progress on stderr for large projects")]
        progress: bool,
    },

    /// Print the syntax tree and parse errors of a Kotlin file
    Inspect {
        /// File to inspect
        #[arg(help = "Kotlin file to inspect")]
        file: PathBuf,

        /// Print the flat token stream instead of the tree
        #[arg(long, help = "Print lexer tokens instead of the parsed tree")]
        tokens: bool,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(help = "Path to configuration file (default: search for .ruledocrc)")]
        path: Option<PathBuf>,
    },

    /// Show current configuration
    Show {
        /// Show configuration with defaults filled in
        #[arg(long, help = "Show configuration with defaults filled in")]
        resolved: bool,
    },

    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON array of providers
    Json,
    /// YAML list of providers
    Yaml,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
    /// YAML configuration format
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return Ok(());
    }

    // Initialize colored output
    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "ruledoc=warn", // Warnings (missing descriptions) by default
        1 => "ruledoc=info",
        2 => "ruledoc=debug",
        _ => "ruledoc=trace",
    };
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    init_tracing();

    match run_command(cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("ruledoc failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Collect {
            paths,
            format,
            fail_fast,
            include,
            exclude,
            progress,
        }) => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            commands::collect_command(commands::CollectOptions {
                paths,
                format,
                fail_fast,
                include,
                exclude,
                progress,
                threads: cli.threads,
                use_colors: !cli.no_color,
                config_path: cli.config,
            })
        }

        Some(Commands::Inspect { file, tokens }) => commands::inspect_command(&file, tokens),

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => commands::config_init_command(format, force),
            ConfigAction::Validate { path } => commands::config_validate_command(path),
            ConfigAction::Show { resolved } => commands::config_show_command(resolved, cli.config),
            ConfigAction::Schema => commands::config_schema_command(),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("ruledoc {}", ruledoc_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                if let Ok(profile) = std::env::var("PROFILE") {
                    println!("  Profile: {profile}");
                }
            } else {
                println!("{}", ruledoc_core::VERSION);
            }
            Ok(())
        }

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
