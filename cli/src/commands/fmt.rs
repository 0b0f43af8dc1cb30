//! Fmt command implementation.
//!
//! Canonicalizes a document and either prints the
//! result or writes it back in place.

use std::path::PathBuf;
use std::time::Instant;

use crate::commands::document::load_document;
use crate::commands::traits::{Command, CommandDescription};
use crate::config::Config;
use crate::error::{HedlCliError, Result};

/// Arguments for the fmt command.
#[derive(Debug, Clone)]
pub struct FmtArgs {
    /// Enable verbose output.
    pub verbose: bool,
    /// Document to canonicalize.
    pub input: PathBuf,
    /// Overwrite the input file instead of printing to stdout.
    pub write: bool,
    /// Fail instead of writing when the file isn't already canonical.
    pub check: bool,
}

/// Fmt command handler.
pub struct FmtCommand {
    args: FmtArgs,
    config: Config,
}

impl FmtCommand {
    /// Create a new FmtCommand.
    pub fn new(args: FmtArgs) -> Self {
        Self { args, config: Config::default() }
    }

    /// Execute the command.
    pub fn run(&self) -> Result<()> {
        let start_time = Instant::now();
        let doc = load_document(&self.args.input, self.config.strict)?;
        let canonical = hedl_fmt::canonicalize(&doc)
            .map_err(|e| HedlCliError::CommandExecution(e.to_string()))?;

        if self.args.check {
            let original = std::fs::read_to_string(&self.args.input)?;
            if original != canonical {
                return Err(HedlCliError::Validation(format!(
                    "{} is not in canonical form",
                    self.args.input.display()
                )));
            }
            return Ok(());
        }

        if self.args.write {
            std::fs::write(&self.args.input, &canonical)?;
        } else {
            print!("{}", canonical);
        }

        if self.args.verbose {
            eprintln!(
                "✅ formatted {} in {:.2}s",
                self.args.input.display(),
                start_time.elapsed().as_secs_f64()
            );
        }

        Ok(())
    }
}

impl Command for FmtCommand {
    type Args = FmtArgs;
    type Output = ();

    fn new(args: Self::Args) -> Self {
        Self { args, config: Config::default() }
    }

    fn execute(&self) -> Result<Self::Output> {
        self.run()
    }

    fn name() -> &'static str {
        "fmt"
    }
}

impl CommandDescription for FmtCommand {
    fn description() -> &'static str {
        "Canonicalize a HEDL document"
    }

    fn help() -> &'static str {
        "Resolves a document and re-emits it in canonical form: sorted \
         directives, minimal escaping, and the flow-vs-block width heuristic."
    }
}

/// Run the fmt command.
pub fn run_fmt(args: FmtArgs) -> Result<()> {
    let command = FmtCommand::new(args);
    command.run()
}
