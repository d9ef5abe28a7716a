//! Story generation with large language models.
//!
//! A story is built in three commands: `prepare` turns a seed into a plot,
//! `generate` writes a multi-part markdown draft from the plot, and `convert`
//! renders the draft into an HTML page.
//!
//! - **[`core`]**: Pure logic (section plans, draft assembly, model routing,
//!   slugs, template filling). No I/O.
//! - **[`io`]**: Side effects (startup, config, prompts, provider HTTP calls,
//!   markdown rendering, file storage).
//!
//! Orchestration modules ([`prepare`], [`generate`], [`convert`]) coordinate
//! core logic with I/O to implement the CLI commands.

pub mod convert;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod generate;
pub mod io;
pub mod logging;
pub mod prepare;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
