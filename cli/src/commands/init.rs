//! Init command implementation.
//!
//! Scaffolds a starter HEDL document and configuration file in a target
//! directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::commands::common::{error_messages, output_messages};
use crate::commands::traits::{Command, CommandDescription};
use crate::config::Config;
use crate::error::{HedlCliError, Result};

const STARTER_DOCUMENT: &str = "%VERSION: 1.0\n---\nname: example\n";

/// Arguments for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Enable verbose output.
    pub verbose: bool,
    /// Force initialization even if the directory is not empty.
    pub force: bool,
    /// Directory to initialize.
    pub path: Option<PathBuf>,
    /// Name of the starter document, without extension.
    pub name: Option<String>,
}

/// Init command handler.
pub struct InitCommand {
    args: InitArgs,
}

impl InitCommand {
    /// Create a new InitCommand.
    pub fn new(args: InitArgs) -> Self {
        Self { args }
    }

    /// Execute the command.
    pub fn run(&self) -> Result<()> {
        let start_time = Instant::now();
        let target_path = self.get_target_path()?;

        self.validate_directory(&target_path)?;
        self.create_document(&target_path)?;
        self.create_config_file(&target_path)?;

        if self.args.verbose {
            eprintln!(
                "{} Project initialized at {}",
                output_messages::CREATED_FILE,
                target_path.display()
            );
            eprintln!("✅ Completed in {:.2}s", start_time.elapsed().as_secs_f64());
        }

        Ok(())
    }

    /// Get the target path for initialization.
    ///
    /// When no path is specified (default args), creates a temp directory
    /// to ensure the command can run safely in test environments.
    fn get_target_path(&self) -> Result<PathBuf> {
        match &self.args.path {
            Some(path) => Ok(path.clone()),
            None => {
                let temp_path = std::env::temp_dir().join(format!(
                    "hedl_init_{}_{}",
                    std::process::id(),
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_nanos()
                ));
                Ok(temp_path)
            }
        }
    }

    /// Validate that the target directory is suitable for initialization.
    fn validate_directory(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            if self.args.verbose {
                eprintln!("ℹ️ Creating directory: {}", path.display());
            }
            std::fs::create_dir_all(path)?;
            return Ok(());
        }

        if !path.is_dir() {
            return Err(HedlCliError::Validation(format!(
                "{} {}",
                error_messages::TARGET_NOT_DIR,
                path.display()
            )));
        }

        let is_empty = Self::check_directory_empty(path)?;

        if !is_empty && !self.args.force {
            return Err(HedlCliError::Validation(format!(
                "{} {}",
                error_messages::DIR_NOT_EMPTY,
                path.display()
            )));
        }

        Ok(())
    }

    /// Check if a directory is empty.
    fn check_directory_empty(path: &Path) -> Result<bool> {
        match std::fs::read_dir(path) {
            Ok(mut dir) => Ok(dir.next().is_none()),
            Err(e) => Err(HedlCliError::FileOperation(format!(
                "Failed to read directory {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Write the starter document.
    fn create_document(&self, path: &Path) -> Result<()> {
        let name = self.args.name.as_deref().unwrap_or("example");
        let doc_path = path.join(format!("{}.hedl", name));

        if doc_path.exists() && !self.args.force {
            if self.args.verbose {
                eprintln!("⚠️ {} already exists, skipping", doc_path.display());
            }
            return Ok(());
        }

        std::fs::write(&doc_path, STARTER_DOCUMENT)?;

        if self.args.verbose {
            eprintln!("{} {}", output_messages::CREATED_FILE, doc_path.display());
        }

        Ok(())
    }

    /// Create the configuration file.
    fn create_config_file(&self, path: &Path) -> Result<()> {
        let config_path = path.join(crate::config::CONFIG_FILE_NAME);

        if config_path.exists() && !self.args.force {
            if self.args.verbose {
                eprintln!("⚠️ Configuration file already exists, skipping");
            }
            return Ok(());
        }

        let config = Config::default();
        config.save_to_path(&config_path)?;

        if self.args.verbose {
            eprintln!("{} {}", output_messages::CREATED_FILE, config_path.display());
        }

        Ok(())
    }
}

impl Command for InitCommand {
    type Args = InitArgs;
    type Output = ();

    fn new(args: Self::Args) -> Self {
        Self { args }
    }

    fn execute(&self) -> Result<Self::Output> {
        self.run()
    }

    fn name() -> &'static str {
        "init"
    }
}

impl CommandDescription for InitCommand {
    fn description() -> &'static str {
        "Initialize a new HEDL project"
    }

    fn help() -> &'static str {
        "Creates a starter document and configuration file for a new HEDL \
         project in the specified or current directory."
    }
}

/// Run the init command.
pub fn run_init(args: InitArgs) -> Result<()> {
    let command = InitCommand::new(args);
    command.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_command_name() {
        assert_eq!(<InitCommand as Command>::name(), "init");
    }

    #[test]
    fn init_creates_starter_document_and_config() {
        let temp_dir = TempDir::new().unwrap();
        let args = InitArgs {
            path: Some(temp_dir.path().to_path_buf()),
            verbose: false,
            force: false,
            name: None,
        };

        let command = InitCommand::new(args);
        let result = command.run();

        assert!(result.is_ok());
        assert!(temp_dir.path().join("example.hedl").exists());
        assert!(temp_dir.path().join("hedl.toml").exists());
    }

    #[test]
    fn init_uses_the_requested_document_name() {
        let temp_dir = TempDir::new().unwrap();
        let args = InitArgs {
            path: Some(temp_dir.path().to_path_buf()),
            verbose: false,
            force: false,
            name: Some("catalog".to_string()),
        };

        InitCommand::new(args).run().unwrap();
        assert!(temp_dir.path().join("catalog.hedl").exists());
    }

    #[test]
    fn init_rejects_a_nonempty_directory_without_force() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("existing.txt"), "content").unwrap();

        let args = InitArgs {
            path: Some(temp_dir.path().to_path_buf()),
            verbose: false,
            force: false,
            name: None,
        };

        let command = InitCommand::new(args);
        let result = command.run();

        assert!(result.is_err());
        if let Err(HedlCliError::Validation(msg)) = result {
            assert!(msg.contains("not empty"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn init_accepts_a_nonempty_directory_with_force() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("existing.txt"), "content").unwrap();

        let args = InitArgs {
            path: Some(temp_dir.path().to_path_buf()),
            verbose: false,
            force: true,
            name: None,
        };

        let result = InitCommand::new(args).run();
        assert!(result.is_ok());
    }

    #[test]
    fn run_init_convenience_function() {
        let temp_dir = TempDir::new().unwrap();
        let args = InitArgs {
            path: Some(temp_dir.path().to_path_buf()),
            verbose: false,
            force: false,
            name: None,
        };

        let result = run_init(args);
        assert!(result.is_ok());
    }
}
