//! Check command implementation.
//!
//! Parses and resolves a document, optionally running the linter
//! afterwards, and reports every diagnostic it collects.

use std::path::PathBuf;
use std::time::Instant;

use crate::commands::common::format_diagnostic;
use crate::commands::traits::{Command, CommandDescription};
use crate::commands::document::load_document;
use crate::config::Config;
use crate::error::{HedlCliError, Result};

/// Arguments for the check command.
#[derive(Debug, Clone)]
pub struct CheckArgs {
    /// Enable verbose output.
    pub verbose: bool,
    /// Document to check.
    pub input: PathBuf,
    /// Resolve in lenient mode instead of strict mode.
    pub lenient: bool,
    /// Skip the advisory lint pass.
    pub no_lint: bool,
}

/// Check command handler.
pub struct CheckCommand {
    args: CheckArgs,
    config: Config,
}

impl CheckCommand {
    /// Create a new CheckCommand.
    pub fn new(args: CheckArgs) -> Self {
        Self { args, config: Config::default() }
    }

    /// Execute the command.
    pub fn run(&self) -> Result<()> {
        let start_time = Instant::now();
        let strict = !self.args.lenient && self.config.strict;
        let doc = load_document(&self.args.input, strict)?;

        let mut diagnostics: Vec<_> = doc.diagnostics.clone();
        if !self.args.no_lint && self.config.check.lint {
            diagnostics.extend(hedl_lint::lint(&doc));
        }
        diagnostics.sort_by_key(|d| d.primary_span.start);

        for diag in &diagnostics {
            eprintln!("{}", format_diagnostic(diag));
        }

        if self.args.verbose {
            eprintln!(
                "ℹ️ checked {} in {:.2}s ({} schema(s), {} alias(es), {} root item(s))",
                self.args.input.display(),
                start_time.elapsed().as_secs_f64(),
                doc.schema_count(),
                doc.alias_count(),
                doc.root_item_count(),
            );
        }

        let has_errors = diagnostics.iter().any(|d| d.severity == hedl_util::Severity::Error);
        if has_errors {
            return Err(HedlCliError::CommandExecution(format!(
                "{} diagnostic(s) at error severity",
                diagnostics.iter().filter(|d| d.severity == hedl_util::Severity::Error).count()
            )));
        }

        Ok(())
    }
}

impl Command for CheckCommand {
    type Args = CheckArgs;
    type Output = ();

    fn new(args: Self::Args) -> Self {
        Self { args, config: Config::default() }
    }

    fn execute(&self) -> Result<Self::Output> {
        self.run()
    }

    fn name() -> &'static str {
        "check"
    }
}

impl CommandDescription for CheckCommand {
    fn description() -> &'static str {
        "Parse, resolve, and lint a HEDL document"
    }

    fn help() -> &'static str {
        "Reads a HEDL document, resolves it, and reports every diagnostic \
         raised by the resolver and (unless --no-lint is given) the linter."
    }
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<()> {
    let command = CheckCommand::new(args);
    command.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn check_command_name() {
        assert_eq!(<CheckCommand as Command>::name(), "check");
    }

    #[test]
    fn check_accepts_a_well_formed_document() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "doc.hedl", "%VERSION: 1.0\n---\nname: Alice\nage: 30\n");

        let args = CheckArgs { verbose: false, input: path, lenient: false, no_lint: false };
        let result = CheckCommand::new(args).run();
        assert!(result.is_ok());
    }

    #[test]
    fn check_rejects_a_strict_unresolved_reference() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "doc.hedl", "%VERSION: 1.0\n---\nref: @missing\n");

        let args = CheckArgs { verbose: false, input: path, lenient: false, no_lint: true };
        let result = CheckCommand::new(args).run();
        assert!(result.is_err());
    }

    #[test]
    fn check_lenient_mode_surfaces_unresolved_reference_as_a_lint_error() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "doc.hedl", "%VERSION: 1.0\n---\nref: @missing\n");

        let args = CheckArgs { verbose: false, input: path, lenient: true, no_lint: false };
        let result = CheckCommand::new(args).run();
        assert!(result.is_err());
    }

    #[test]
    fn check_reports_missing_file() {
        let args = CheckArgs {
            verbose: false,
            input: PathBuf::from("/nonexistent/doc.hedl"),
            lenient: false,
            no_lint: false,
        };
        let result = CheckCommand::new(args).run();
        assert!(result.is_err());
    }
}
