//! hedl CLI - A command-line tool for the HEDL document language.
//!
//! This is the main entry point for the hedl CLI application.
//! It uses clap for argument parsing and dispatches to appropriate
//! command handlers based on user input.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    check::{run_check, CheckArgs},
    convert::{run_convert, ConvertArgs},
    fmt::{run_fmt, FmtArgs},
    init::{run_init, InitArgs},
    lint::{run_lint, LintArgs},
};
use config::Config;
use error::{HedlCliError, Result};

/// hedl - A CLI tool for the HEDL document language
///
/// hedl provides utilities for initializing documents, validating them
/// against the resolver and linter, canonicalizing their text form, and
/// converting them into foreign formats.
#[derive(Parser, Debug)]
#[command(name = "hedl")]
#[command(author = "HEDL Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A CLI tool for the HEDL document language", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "HEDL_VERBOSE")]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HEDL_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "HEDL_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the hedl CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new HEDL project
    ///
    /// Creates a starter document and configuration file in the
    /// specified or current directory.
    Init(InitCommand),

    /// Parse, resolve, and lint a document
    ///
    /// Reports every diagnostic raised by the resolver and, unless
    /// --no-lint is given, the linter.
    Check(CheckCommand),

    /// Canonicalize a document
    ///
    /// Resolves a document and re-emits it in canonical form.
    Fmt(FmtCommand),

    /// Run the advisory linter over a document
    Lint(LintCommand),

    /// Render a document's root item to a foreign format
    ///
    /// Converts a resolved root item to JSON, YAML, XML, CSV, Cypher,
    /// or Parquet through the read-only Traversal API.
    Convert(ConvertCommand),
}

/// Arguments for the init subcommand.
#[derive(Parser, Debug)]
struct InitCommand {
    /// Name of the starter document, without extension
    #[arg(short, long)]
    name: Option<String>,

    /// Directory to initialize (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Force initialization even if directory is not empty
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the check subcommand.
#[derive(Parser, Debug)]
struct CheckCommand {
    /// Document to check
    input: PathBuf,

    /// Resolve in lenient mode instead of strict mode
    #[arg(long)]
    lenient: bool,

    /// Skip the advisory lint pass
    #[arg(long)]
    no_lint: bool,
}

/// Arguments for the fmt subcommand.
#[derive(Parser, Debug)]
struct FmtCommand {
    /// Document to canonicalize
    input: PathBuf,

    /// Overwrite the input file instead of printing to stdout
    #[arg(short, long)]
    write: bool,

    /// Fail instead of writing when the file isn't already canonical
    #[arg(long)]
    check: bool,
}

/// Arguments for the lint subcommand.
#[derive(Parser, Debug)]
struct LintCommand {
    /// Document to lint
    input: PathBuf,

    /// Resolve in lenient mode instead of strict mode
    #[arg(long)]
    lenient: bool,
}

/// Arguments for the convert subcommand.
#[derive(Parser, Debug)]
struct ConvertCommand {
    /// Document to convert
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: json, yaml, xml, csv, cypher, parquet
    #[arg(short = 'F', long)]
    format: Option<String>,

    /// Root item to render, required when the document has more than one
    #[arg(short, long)]
    root: Option<String>,

    /// Name of the synthetic root element for the XML renderer
    #[arg(long, default_value = "root")]
    xml_root_name: String,

    /// Overwrite an existing output file
    #[arg(long)]
    force: bool,
}

/// Main entry point for the hedl CLI.
fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color)?;
    let config = load_config(cli.config.as_deref())?;

    execute_command(cli.command, cli.verbose, config)
}

/// Initialize the logging system.
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };

    let subscriber =
        fmt::layer().with_ansi(!no_color).with_target(false).with_thread_ids(false).with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| HedlCliError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

/// Execute the selected command.
fn execute_command(command: Commands, verbose: bool, _config: Config) -> Result<()> {
    match command {
        Commands::Init(args) => execute_init(args, verbose),
        Commands::Check(args) => execute_check(args, verbose),
        Commands::Fmt(args) => execute_fmt(args, verbose),
        Commands::Lint(args) => execute_lint(args, verbose),
        Commands::Convert(args) => execute_convert(args, verbose),
    }
}

fn execute_init(args: InitCommand, verbose: bool) -> Result<()> {
    run_init(InitArgs { verbose, force: args.force, path: args.path, name: args.name })
}

fn execute_check(args: CheckCommand, verbose: bool) -> Result<()> {
    run_check(CheckArgs { verbose, input: args.input, lenient: args.lenient, no_lint: args.no_lint })
}

fn execute_fmt(args: FmtCommand, verbose: bool) -> Result<()> {
    run_fmt(FmtArgs { verbose, input: args.input, write: args.write, check: args.check })
}

fn execute_lint(args: LintCommand, verbose: bool) -> Result<()> {
    run_lint(LintArgs { verbose, input: args.input, lenient: args.lenient })
}

fn execute_convert(args: ConvertCommand, verbose: bool) -> Result<()> {
    run_convert(ConvertArgs {
        verbose,
        input: args.input,
        output: args.output,
        format: args.format,
        root: args.root,
        xml_root_name: args.xml_root_name,
        force: args.force,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["hedl", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_parse_init_with_name() {
        let cli = Cli::parse_from(["hedl", "init", "--name", "catalog"]);
        if let Commands::Init(args) = cli.command {
            assert_eq!(args.name, Some("catalog".to_string()));
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn test_cli_parse_init_with_path() {
        let cli = Cli::parse_from(["hedl", "init", "--path", "/tmp/test"]);
        if let Commands::Init(args) = cli.command {
            assert_eq!(args.path, Some(PathBuf::from("/tmp/test")));
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn test_cli_parse_init_with_force() {
        let cli = Cli::parse_from(["hedl", "init", "--force"]);
        if let Commands::Init(args) = cli.command {
            assert!(args.force);
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::parse_from(["hedl", "check", "doc.hedl"]);
        if let Commands::Check(args) = cli.command {
            assert_eq!(args.input, PathBuf::from("doc.hedl"));
            assert!(!args.lenient);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_parse_check_with_lenient() {
        let cli = Cli::parse_from(["hedl", "check", "doc.hedl", "--lenient"]);
        if let Commands::Check(args) = cli.command {
            assert!(args.lenient);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_parse_fmt_with_write() {
        let cli = Cli::parse_from(["hedl", "fmt", "doc.hedl", "--write"]);
        if let Commands::Fmt(args) = cli.command {
            assert!(args.write);
        } else {
            panic!("Expected Fmt command");
        }
    }

    #[test]
    fn test_cli_parse_lint() {
        let cli = Cli::parse_from(["hedl", "lint", "doc.hedl"]);
        assert!(matches!(cli.command, Commands::Lint(_)));
    }

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from(["hedl", "convert", "doc.hedl"]);
        assert!(matches!(cli.command, Commands::Convert(_)));
    }

    #[test]
    fn test_cli_parse_convert_with_format() {
        let cli = Cli::parse_from(["hedl", "convert", "doc.hedl", "--format", "yaml"]);
        if let Commands::Convert(args) = cli.command {
            assert_eq!(args.format, Some("yaml".to_string()));
        } else {
            panic!("Expected Convert command");
        }
    }

    #[test]
    fn test_cli_parse_convert_with_root() {
        let cli = Cli::parse_from(["hedl", "convert", "doc.hedl", "--root", "users"]);
        if let Commands::Convert(args) = cli.command {
            assert_eq!(args.root, Some("users".to_string()));
        } else {
            panic!("Expected Convert command");
        }
    }

    #[test]
    fn test_cli_parse_convert_with_force() {
        let cli = Cli::parse_from(["hedl", "convert", "doc.hedl", "--force"]);
        if let Commands::Convert(args) = cli.command {
            assert!(args.force);
        } else {
            panic!("Expected Convert command");
        }
    }

    #[test]
    fn test_cli_parse_global_verbose() {
        let cli = Cli::parse_from(["hedl", "--verbose", "init"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_global_config() {
        let cli = Cli::parse_from(["hedl", "--config", "/path/to/config.toml", "init"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
    }

    #[test]
    fn test_cli_parse_global_no_color() {
        let cli = Cli::parse_from(["hedl", "--no-color", "init"]);
        assert!(cli.no_color);
    }
}
