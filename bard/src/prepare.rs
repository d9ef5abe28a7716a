//! Orchestration for `bard prepare`: seed → plot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::core::provider::ProviderRoute;
use crate::core::types::RandomSeed;
use crate::io::completion::{CompletionRequest, ProviderFactory, complete_text, connect_model};
use crate::io::init::Workspace;
use crate::io::prompt::StoryPrompts;
use crate::io::storage::{read_text, write_text};

/// Inputs for plot preparation.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// Seed file, relative to the workspace root unless absolute.
    pub seed_file: PathBuf,
    /// Story title; names the plot file.
    pub title: String,
    pub model: String,
}

/// Result of plot preparation.
#[derive(Debug, Clone)]
pub struct PrepareOutcome {
    pub plot_path: PathBuf,
    pub plot: String,
    pub route: ProviderRoute,
    pub elapsed: Duration,
}

/// Elaborate the seed into a plot and write it to `plots/<title>.txt`.
///
/// Any failure stops the run; the plot file is only written after a
/// successful completion.
#[instrument(skip_all, fields(model = %options.model, seed_file = %options.seed_file.display()))]
pub fn run_prepare<F: ProviderFactory>(
    workspace: &Workspace,
    factory: &F,
    options: &PrepareOptions,
) -> Result<PrepareOutcome> {
    let start = Instant::now();
    let seed_path = workspace.paths.resolve(&options.seed_file);
    let seed_text = read_text(&seed_path).context("read seed file")?;

    let prompts = StoryPrompts::new()?;
    let prompt = prompts.plot(&seed_text)?;

    let (route, completer) = connect_model(
        factory,
        &options.model,
        &workspace.config.dispatch_policy(),
    )?;
    let request = CompletionRequest::new(prompt, RandomSeed::generate(), &workspace.config);
    let plot = complete_text(completer.as_ref(), &request).context("generate plot")?;

    let plot_path = workspace.paths.plot_path(&options.title);
    write_text(&plot_path, &plot)?;
    info!(path = %plot_path.display(), bytes = plot.len(), "plot written");

    Ok(PrepareOutcome {
        plot_path,
        plot,
        route,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::ProviderKind;
    use crate::error::ProviderError;
    use crate::test_support::{Scripted, ScriptedFactory, TestWorkspace};

    fn options(model: &str) -> PrepareOptions {
        PrepareOptions {
            seed_file: PathBuf::from("seed.txt"),
            title: "The Lighthouse".to_string(),
            model: model.to_string(),
        }
    }

    #[test]
    fn prepare_writes_plot_verbatim() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write("seed.txt", "A keeper finds a map.").expect("seed");
        let factory = ScriptedFactory::new(vec![Scripted::text("Plot: the map leads north.")]);

        let outcome = run_prepare(ws.workspace(), &factory, &options("llama3.1")).expect("prepare");

        assert_eq!(outcome.plot, "Plot: the map leads north.");
        assert_eq!(outcome.plot_path, ws.path().join("plots/the-lighthouse.txt"));
        assert_eq!(
            ws.read("plots/the-lighthouse.txt").expect("plot file"),
            "Plot: the map leads north."
        );
        let calls = factory.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("A keeper finds a map."));
        assert_eq!(calls[0].max_tokens, 4096);
        assert_eq!(calls[0].min_length, 2048);
    }

    #[test]
    fn prepare_routes_by_model_prefix() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write("seed.txt", "seed").expect("seed");
        let factory = ScriptedFactory::new(vec![Scripted::text("plot")]);

        let outcome =
            run_prepare(ws.workspace(), &factory, &options("gemini-1.5-pro")).expect("prepare");

        assert_eq!(outcome.route.kind, ProviderKind::Gemini);
        assert_eq!(factory.routes()[0].kind, ProviderKind::Gemini);
    }

    #[test]
    fn missing_seed_file_fails_before_connecting() {
        let ws = TestWorkspace::new().expect("workspace");
        let factory = ScriptedFactory::new(vec![Scripted::text("plot")]);

        let err = run_prepare(ws.workspace(), &factory, &options("llama3.1")).unwrap_err();

        assert!(format!("{err:#}").contains("read seed file"));
        assert!(factory.routes().is_empty());
    }

    #[test]
    fn completion_failure_writes_no_plot() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write("seed.txt", "seed").expect("seed");
        let factory = ScriptedFactory::new(vec![Scripted::fail("model overloaded")]);

        let err = run_prepare(ws.workspace(), &factory, &options("llama3.1")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Request { .. })
        ));
        assert!(!ws.path().join("plots/the-lighthouse.txt").exists());
    }
}
