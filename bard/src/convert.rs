//! Orchestration for `bard convert`: markdown draft → HTML document.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::error::ConfigError;
use crate::io::init::Workspace;
use crate::io::render::render_document;
use crate::io::storage::{read_text, write_text};

/// Inputs for conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Markdown file, relative to the workspace root unless absolute.
    pub md_file: PathBuf,
    /// Output name; only its file name is used, under `html/`.
    pub output_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub html_path: PathBuf,
    pub elapsed: Duration,
}

/// Render the draft, wrap it in the output template, and write it under `html/`.
///
/// The output file is written only once the whole document is assembled.
#[instrument(skip_all, fields(md_file = %options.md_file.display()))]
pub fn run_convert(workspace: &Workspace, options: &ConvertOptions) -> Result<ConvertOutcome> {
    let start = Instant::now();
    let md_path = workspace.paths.resolve(&options.md_file);
    let markdown = read_text(&md_path).context("read markdown file")?;

    let template_path = workspace.template_path();
    if !template_path.is_file() {
        return Err(ConfigError::Template(format!(
            "missing template file {}",
            template_path.display()
        ))
        .into());
    }
    let template = read_text(&template_path).context("read template file")?;

    let document = render_document(&markdown, &template)
        .with_context(|| format!("render {}", md_path.display()))?;

    let html_path = workspace.paths.html_path(&options.output_file);
    write_text(&html_path, &document)?;
    info!(path = %html_path.display(), bytes = document.len(), "html written");

    Ok(ConvertOutcome {
        html_path,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DEFAULT_TEMPLATE, TestWorkspace};

    fn options() -> ConvertOptions {
        ConvertOptions {
            md_file: PathBuf::from("md/story.md"),
            output_file: PathBuf::from("story.html"),
        }
    }

    #[test]
    fn convert_wraps_rendered_markdown_in_template() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write("md/story.md", "\n\n# The Storm\n\nRain fell.")
            .expect("md");

        let outcome = run_convert(ws.workspace(), &options()).expect("convert");

        assert_eq!(outcome.html_path, ws.path().join("html/story.html"));
        let html = ws.read("html/story.html").expect("html");
        let (prefix, suffix) = DEFAULT_TEMPLATE.split_once("%s").expect("placeholder");
        assert!(html.starts_with(&prefix.replace("%%", "%")));
        assert!(html.ends_with(suffix));
        assert!(html.contains("width: 100%;"));
        assert!(html.contains("<h1 id=\"the-storm\">The Storm</h1>"));
        assert!(html.contains("<p>Rain fell.</p>"));
    }

    #[test]
    fn missing_template_is_a_config_error() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write("md/story.md", "# Hi").expect("md");
        std::fs::remove_file(ws.path().join("output.template")).expect("remove template");

        let err = run_convert(ws.workspace(), &options()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Template(msg)) if msg.contains("missing template")
        ));
        assert!(!ws.path().join("html/story.html").exists());
    }

    #[test]
    fn template_without_placeholder_writes_nothing() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write("md/story.md", "# Hi").expect("md");
        ws.write("output.template", "<html></html>").expect("template");

        let err = run_convert(ws.workspace(), &options()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Template(_))
        ));
        assert!(!ws.path().join("html/story.html").exists());
    }

    #[test]
    fn missing_markdown_file_is_reported() {
        let ws = TestWorkspace::new().expect("workspace");

        let err = run_convert(ws.workspace(), &options()).unwrap_err();

        assert!(format!("{err:#}").contains("read markdown file"));
    }
}
