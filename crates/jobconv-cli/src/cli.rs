//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use jobconv_core::FallbackPolicy;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Mapping document looked up in the working directory when none is given
pub const DEFAULT_MAPPING_FILE: &str = "jobins_yaml_mapping.yaml";

/// jobconv - convert job posting CSV files for JOBINS
///
/// Reads a source CSV, applies the field mapping and filter from a YAML
/// mapping document, classifies each posting into the job taxonomy and
/// writes a BOM-prefixed UTF-8 CSV.
#[derive(Parser, Debug)]
#[command(
    name = "jobconv",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "JOBCONV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a source CSV into the target layout
    Convert(ConvertArgs),

    /// Classify free text into a minor job category
    Classify(ClassifyArgs),

    /// Load a mapping document and show the compiled rules
    Validate(ValidateArgs),

    /// List the job category taxonomy
    Taxonomy(TaxonomyArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Options shared by every command that classifies text
#[derive(Parser, Debug, Clone, Default)]
pub struct ClassifierArgs {
    /// Taxonomy CSV (major, minor, optional link key); embedded table if omitted
    #[arg(long, value_name = "CSV")]
    pub taxonomy: Option<PathBuf>,

    /// Never call the classification oracle
    #[arg(long)]
    pub no_oracle: bool,

    /// Label used when the oracle is unavailable or fails
    #[arg(long, value_enum)]
    pub fallback: Option<FallbackArg>,

    /// Restrict oracle options to taxonomy rows with this link key
    #[arg(long, value_name = "KEY")]
    pub link_key: Option<String>,

    /// Upper bound on one oracle call, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Source CSV file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Mapping document (YAML)
    #[arg(short, long, value_name = "MAPPING", default_value = DEFAULT_MAPPING_FILE)]
    pub mapping: PathBuf,

    /// Output CSV path (generated next to the input if not specified)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Directory for the generated output file
    #[arg(long, value_name = "DIR", conflicts_with = "save_to")]
    pub output_dir: Option<PathBuf>,

    /// Records converted concurrently
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

/// Arguments for the classify command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Texts to classify, typically job titles
    #[arg(value_name = "TEXT", required = true, num_args = 1..)]
    pub texts: Vec<String>,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Mapping document (YAML)
    #[arg(value_name = "MAPPING", default_value = DEFAULT_MAPPING_FILE)]
    pub mapping: PathBuf,
}

/// Arguments for the taxonomy command
#[derive(Parser, Debug)]
pub struct TaxonomyArgs {
    /// Taxonomy CSV; embedded table if omitted
    #[arg(long, value_name = "CSV")]
    pub taxonomy: Option<PathBuf>,

    /// Only list minor categories under this major category
    #[arg(long, value_name = "NAME")]
    pub major: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration with secrets redacted
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write the user config (<config dir>/jobconv/config.toml) instead of .jobconv.toml
    #[arg(long)]
    pub user: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Fallback policy as accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FallbackArg {
    /// Full keyword classifier
    Heuristic,
    /// Always その他営業関連職
    DefaultLabel,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Commands {
    /// Subcommand name as typed, for log spans
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Convert(_) => "convert",
            Commands::Classify(_) => "classify",
            Commands::Validate(_) => "validate",
            Commands::Taxonomy(_) => "taxonomy",
            Commands::Config(_) => "config",
            Commands::Completions(_) => "completions",
        }
    }
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Heuristic => FallbackPolicy::Heuristic,
            FallbackArg::DefaultLabel => FallbackPolicy::DefaultLabel,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
