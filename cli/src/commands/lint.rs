//! Lint command implementation.
//!
//! Runs the advisory linter over an already-resolved
//! document and reports every hint, warning, and error it finds.

use std::path::PathBuf;

use hedl_util::Severity;

use crate::commands::common::format_diagnostic;
use crate::commands::document::load_document;
use crate::commands::traits::{Command, CommandDescription};
use crate::config::Config;
use crate::error::{HedlCliError, Result};

/// Arguments for the lint command.
#[derive(Debug, Clone)]
pub struct LintArgs {
    /// Enable verbose output.
    pub verbose: bool,
    /// Document to lint.
    pub input: PathBuf,
    /// Resolve in lenient mode instead of strict mode.
    pub lenient: bool,
}

/// Lint command handler.
pub struct LintCommand {
    args: LintArgs,
    config: Config,
}

impl LintCommand {
    /// Create a new LintCommand.
    pub fn new(args: LintArgs) -> Self {
        Self { args, config: Config::default() }
    }

    /// Execute the command.
    pub fn run(&self) -> Result<()> {
        let strict = !self.args.lenient && self.config.strict;
        let doc = load_document(&self.args.input, strict)?;
        let findings = hedl_lint::lint(&doc);

        for diag in &findings {
            println!("{}", format_diagnostic(diag));
        }

        if self.args.verbose {
            eprintln!("ℹ️ {} finding(s) in {}", findings.len(), self.args.input.display());
        }

        if findings.iter().any(|d| d.severity == Severity::Error) {
            return Err(HedlCliError::CommandExecution(
                "lint reported diagnostic(s) at error severity".to_string(),
            ));
        }

        Ok(())
    }
}

impl Command for LintCommand {
    type Args = LintArgs;
    type Output = ();

    fn new(args: Self::Args) -> Self {
        Self { args, config: Config::default() }
    }

    fn execute(&self) -> Result<Self::Output> {
        self.run()
    }

    fn name() -> &'static str {
        "lint"
    }
}

impl CommandDescription for LintCommand {
    fn description() -> &'static str {
        "Run the advisory linter over a HEDL document"
    }

    fn help() -> &'static str {
        "Reports unused aliases and schemas, duplicate alias values, \
         flat lists shaped like matrices, deep nesting, and (in lenient \
         mode) references that never resolved."
    }
}

/// Run the lint command.
pub fn run_lint(args: LintArgs) -> Result<()> {
    let command = LintCommand::new(args);
    command.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lint_command_name() {
        assert_eq!(<LintCommand as Command>::name(), "lint");
    }

    #[test]
    fn lint_flags_an_unused_alias_as_a_warning_not_a_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.hedl");
        std::fs::write(&path, "%VERSION: 1.0\n%ALIAS: unused = 1\n---\nk: 2\n").unwrap();

        let args = LintArgs { verbose: false, input: path, lenient: false };
        let result = LintCommand::new(args).run();
        assert!(result.is_ok());
    }

    #[test]
    fn lint_fails_on_a_lenient_unresolved_reference() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.hedl");
        std::fs::write(&path, "%VERSION: 1.0\n---\nref: @missing\n").unwrap();

        let args = LintArgs { verbose: false, input: path, lenient: true };
        let result = LintCommand::new(args).run();
        assert!(result.is_err());
    }
}
