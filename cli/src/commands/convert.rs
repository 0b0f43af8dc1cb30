//! Convert command implementation.
//!
//! Renders a root item of a resolved document to one of the foreign
//! formats the engine supports: JSON, YAML, XML, CSV,
//! Cypher, or Parquet. Every renderer reaches the document exclusively
//! through the read-only Traversal API.

use std::path::PathBuf;
use std::time::Instant;

use hedl_traverse::DocumentView;

use crate::commands::common::{error_messages, RenderFormat};
use crate::commands::document::load_document;
use crate::commands::traits::{Command, CommandDescription};
use crate::config::Config;
use crate::error::{HedlCliError, Result};

/// Arguments for the convert command.
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Enable verbose output.
    pub verbose: bool,
    /// Input document to convert.
    pub input: PathBuf,
    /// Output file path. Printed to stdout when absent.
    pub output: Option<PathBuf>,
    /// Output format. Falls back to the configured default.
    pub format: Option<String>,
    /// Which root item to render. Required when the document has more
    /// than one; defaults to the only one otherwise.
    pub root: Option<String>,
    /// Name of the synthetic root element for the XML renderer.
    pub xml_root_name: String,
    /// Force overwrite of an existing output file.
    pub force: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            verbose: false,
            input: PathBuf::new(),
            output: None,
            format: None,
            root: None,
            xml_root_name: "root".to_string(),
            force: false,
        }
    }
}

/// Convert command handler.
pub struct ConvertCommand {
    args: ConvertArgs,
    config: Config,
}

impl ConvertCommand {
    /// Create a new ConvertCommand.
    pub fn new(args: ConvertArgs) -> Self {
        Self { args, config: Config::default() }
    }

    /// Execute the command.
    pub fn run(&self) -> Result<()> {
        let start_time = Instant::now();
        let format = self.determine_format()?;
        self.check_output_writable()?;

        let doc = load_document(&self.args.input, self.config.strict)?;
        let view = DocumentView::new(&doc);
        let handle = self.select_root_value(&view)?;

        let rendered = match format {
            RenderFormat::Json if self.config.render.pretty => hedl_render::json::to_string_pretty(handle)?,
            RenderFormat::Json => hedl_render::json::to_string(handle)?,
            RenderFormat::Yaml => hedl_render::yaml::to_string(handle)?,
            RenderFormat::Xml => hedl_render::xml::to_string(&self.args.xml_root_name, handle)?,
            RenderFormat::Csv => hedl_render::tabular::to_string(handle)?,
            RenderFormat::Cypher => hedl_render::cypher::to_string(handle)?,
            RenderFormat::Parquet => {
                let bytes = hedl_render::parquet::to_bytes(handle)?;
                return self.write_bytes(&bytes, start_time);
            }
        };

        match &self.args.output {
            Some(path) => std::fs::write(path, &rendered)?,
            None => print!("{}", rendered),
        }

        self.log_completion(start_time);
        Ok(())
    }

    fn write_bytes(&self, bytes: &[u8], start_time: Instant) -> Result<()> {
        match &self.args.output {
            Some(path) => std::fs::write(path, bytes)?,
            None => {
                use std::io::Write;
                std::io::stdout().write_all(bytes)?;
            }
        }
        self.log_completion(start_time);
        Ok(())
    }

    fn log_completion(&self, start_time: Instant) {
        if self.args.verbose {
            eprintln!(
                "✅ converted {} in {:.2}s",
                self.args.input.display(),
                start_time.elapsed().as_secs_f64()
            );
        }
    }

    fn determine_format(&self) -> Result<RenderFormat> {
        let format_str = self.args.format.as_deref().unwrap_or(&self.config.render.format);
        RenderFormat::from_str(format_str)
            .ok_or_else(|| HedlCliError::Validation(format!("{} {}", error_messages::UNKNOWN_FORMAT, format_str)))
    }

    fn check_output_writable(&self) -> Result<()> {
        if let Some(output) = &self.args.output {
            if output.exists() && !self.args.force {
                return Err(HedlCliError::Validation(format!(
                    "{} {}",
                    error_messages::OUTPUT_FILE_EXISTS,
                    output.display()
                )));
            }
        }
        Ok(())
    }

    fn select_root_value<'a>(&self, view: &DocumentView<'a>) -> Result<hedl_traverse::ValueHandle<'a>> {
        if let Some(name) = &self.args.root {
            return view
                .root_items()
                .find(|item| item.key() == name)
                .map(|item| item.value())
                .ok_or_else(|| HedlCliError::Validation(format!("{} {}", error_messages::NO_ROOT_ITEM, name)));
        }

        let mut items = view.root_items();
        let first = items
            .next()
            .ok_or_else(|| HedlCliError::Validation(error_messages::NO_INPUT_FILES.to_string()))?;
        if items.next().is_some() {
            return Err(HedlCliError::Validation(
                "document has more than one root item; pass --root to choose one".to_string(),
            ));
        }
        Ok(first.value())
    }
}

impl Command for ConvertCommand {
    type Args = ConvertArgs;
    type Output = ();

    fn new(args: Self::Args) -> Self {
        Self { args, config: Config::default() }
    }

    fn execute(&self) -> Result<Self::Output> {
        self.run()
    }

    fn name() -> &'static str {
        "convert"
    }
}

impl CommandDescription for ConvertCommand {
    fn description() -> &'static str {
        "Render a document's root item to a foreign format"
    }

    fn help() -> &'static str {
        "Resolves a document and renders one root item through the \
         Traversal API to JSON, YAML, XML, CSV, Cypher, or Parquet."
    }
}

/// Run the convert command.
pub fn run_convert(args: ConvertArgs) -> Result<()> {
    let command = ConvertCommand::new(args);
    command.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("doc.hedl");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn convert_command_name() {
        assert_eq!(<ConvertCommand as Command>::name(), "convert");
    }

    #[test]
    fn convert_unknown_format_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = write_doc(&dir, "%VERSION: 1.0\n---\nname: Alice\n");
        let args = ConvertArgs { input, format: Some("docx".to_string()), ..ConvertArgs::default() };
        let result = ConvertCommand::new(args).run();
        assert!(result.is_err());
    }

    #[test]
    fn convert_renders_a_single_root_item_to_json() {
        let dir = TempDir::new().unwrap();
        let input = write_doc(&dir, "%VERSION: 1.0\n---\nname: Alice\nage: 30\n");
        let output = dir.path().join("out.json");
        let args = ConvertArgs {
            input,
            output: Some(output.clone()),
            format: Some("json".to_string()),
            force: true,
            ..ConvertArgs::default()
        };
        ConvertCommand::new(args).run().unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["age"], 30);
    }

    #[test]
    fn convert_requires_root_selector_for_multi_item_documents() {
        let dir = TempDir::new().unwrap();
        let input = write_doc(&dir, "%VERSION: 1.0\n---\na: 1\nb: 2\n");
        let args = ConvertArgs { input, format: Some("json".to_string()), ..ConvertArgs::default() };
        let result = ConvertCommand::new(args).run();
        assert!(result.is_err());
    }

    #[test]
    fn convert_honors_explicit_root_selector() {
        let dir = TempDir::new().unwrap();
        let input = write_doc(&dir, "%VERSION: 1.0\n---\na: 1\nb: 2\n");
        let output = dir.path().join("out.json");
        let args = ConvertArgs {
            input,
            output: Some(output.clone()),
            format: Some("json".to_string()),
            root: Some("b".to_string()),
            force: true,
            ..ConvertArgs::default()
        };
        ConvertCommand::new(args).run().unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text, "2");
    }

    #[test]
    fn convert_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let input = write_doc(&dir, "%VERSION: 1.0\n---\nname: Alice\n");
        let output = dir.path().join("out.json");
        std::fs::write(&output, "existing").unwrap();
        let args = ConvertArgs { input, output: Some(output), format: Some("json".to_string()), ..ConvertArgs::default() };
        let result = ConvertCommand::new(args).run();
        assert!(result.is_err());
    }
}
