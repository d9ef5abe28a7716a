//! Prompt templates for each phase of story generation.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::types::SectionKind;

const PLOT_TEMPLATE: &str = include_str!("prompts/plot.md");
const CONTEXT_TEMPLATE: &str = include_str!("prompts/context.md");
const OPENING_TEMPLATE: &str = include_str!("prompts/opening.md");
const CONTINUATION_TEMPLATE: &str = include_str!("prompts/continuation.md");
const CLOSING_TEMPLATE: &str = include_str!("prompts/closing.md");

/// Template engine wrapper around minijinja.
pub struct StoryPrompts {
    env: Environment<'static>,
}

impl StoryPrompts {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("plot", PLOT_TEMPLATE)
            .context("parse plot template")?;
        env.add_template("context", CONTEXT_TEMPLATE)
            .context("parse context template")?;
        env.add_template("opening", OPENING_TEMPLATE)
            .context("parse opening template")?;
        env.add_template("continuation", CONTINUATION_TEMPLATE)
            .context("parse continuation template")?;
        env.add_template("closing", CLOSING_TEMPLATE)
            .context("parse closing template")?;
        Ok(Self { env })
    }

    /// Prompt asking the model to elaborate a seed into a plot.
    pub fn plot(&self, seed: &str) -> Result<String> {
        let template = self.env.get_template("plot")?;
        let rendered = template
            .render(context! { seed => seed.trim() })
            .context("render plot prompt")?;
        Ok(rendered)
    }

    /// Prompt for the next section, given the plot and the draft so far.
    ///
    /// The opening prompt never carries the draft.
    pub fn section(&self, kind: SectionKind, plot: &str, draft: &str) -> Result<String> {
        let story = match kind {
            SectionKind::Opening => None,
            SectionKind::Continuation | SectionKind::Closing => {
                Some(draft.trim()).filter(|s| !s.is_empty())
            }
        };
        let template = self.env.get_template(kind.as_str())?;
        let rendered = template
            .render(context! {
                plot => plot.trim(),
                story => story,
            })
            .with_context(|| format!("render {kind} prompt"))?;
        Ok(rendered)
    }
}
