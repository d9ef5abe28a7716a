//! Orchestration for `bard generate`: plot → multi-part markdown draft.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::draft::Draft;
use crate::core::provider::ProviderRoute;
use crate::core::types::{PartCount, RandomSeed, SectionKind};
use crate::io::completion::{CompletionRequest, ProviderFactory, complete_text, connect_model};
use crate::io::init::Workspace;
use crate::io::prompt::StoryPrompts;
use crate::io::storage::{read_text, write_text};

/// Inputs for section generation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Plot file, relative to the workspace root unless absolute.
    pub plot_file: PathBuf,
    /// Story title; names the draft file.
    pub title: String,
    pub model: String,
    pub parts: PartCount,
}

/// Progress notifications emitted while generating.
#[derive(Debug, Clone, Copy)]
pub enum GenerateEvent<'a> {
    /// About to request part `index` (1-based) of `total`.
    SectionStarted {
        index: u32,
        total: u32,
        kind: SectionKind,
    },
    /// Part `index` was generated and appended to the draft.
    SectionFinished {
        index: u32,
        total: u32,
        kind: SectionKind,
        text: &'a str,
        /// Time spent on this part's completion call.
        elapsed: Duration,
    },
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub draft_path: PathBuf,
    pub sections: Vec<SectionKind>,
    pub draft_bytes: usize,
    pub route: ProviderRoute,
    pub seed: RandomSeed,
    pub elapsed: Duration,
}

/// Generate every part of the story in order and write the draft to
/// `md/<title>.md`.
///
/// All calls share one random seed. The first failure stops the run: later
/// parts are not requested and the draft file is not written.
#[instrument(skip_all, fields(model = %options.model, parts = options.parts.get()))]
pub fn run_generate<F, C>(
    workspace: &Workspace,
    factory: &F,
    options: &GenerateOptions,
    mut on_event: C,
) -> Result<GenerateOutcome>
where
    F: ProviderFactory,
    C: FnMut(GenerateEvent<'_>),
{
    let start = Instant::now();
    let plot_path = workspace.paths.resolve(&options.plot_file);
    let plot = read_text(&plot_path).context("read plot file")?;

    let prompts = StoryPrompts::new()?;
    let (route, completer) = connect_model(
        factory,
        &options.model,
        &workspace.config.dispatch_policy(),
    )?;
    let seed = RandomSeed::generate();
    debug!(seed = seed.get(), "seed chosen for run");

    let plan = options.parts.plan();
    let total = options.parts.get();
    let mut draft = Draft::new();
    for (index, kind) in (1..=total).zip(plan) {
        on_event(GenerateEvent::SectionStarted { index, total, kind });

        let prompt = prompts.section(kind, &plot, draft.as_str())?;
        let request = CompletionRequest::new(prompt, seed, &workspace.config);
        let call_start = Instant::now();
        let section = complete_text(completer.as_ref(), &request)
            .with_context(|| format!("generate part {index} of {total} ({kind})"))?;
        draft.append(kind, &section)?;
        info!(index, total, %kind, bytes = section.len(), "part generated");

        on_event(GenerateEvent::SectionFinished {
            index,
            total,
            kind,
            text: &section,
            elapsed: call_start.elapsed(),
        });
    }

    let draft_path = workspace.paths.draft_path(&options.title);
    let sections = draft.sections().to_vec();
    let text = draft.into_text();
    write_text(&draft_path, &text)?;
    info!(path = %draft_path.display(), bytes = text.len(), "draft written");

    Ok(GenerateOutcome {
        draft_path,
        sections,
        draft_bytes: text.len(),
        route,
        seed,
        elapsed: start.elapsed(),
    })
}
