//! Story generation CLI.
//!
//! `prepare` elaborates a seed into a plot, `generate` writes a story draft
//! part by part, and `convert` renders the draft into an HTML page. All files
//! live under the current directory (`plots/`, `md/`, `html/`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bard::convert::{ConvertOptions, run_convert};
use bard::core::types::PartCount;
use bard::exit_codes;
use bard::generate::{GenerateEvent, GenerateOptions, run_generate};
use bard::io::init::{Workspace, init_workspace};
use bard::io::providers::HttpProviderFactory;
use bard::logging;
use bard::prepare::{PrepareOptions, run_prepare};
use clap::{Parser, Subcommand};

const DEFAULT_TITLE: &str = "My AI Generated Story";
const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Parser)]
#[command(name = "bard", version, about = "Using AI to create stories")]
struct Cli {
    /// Story title; names the plot and draft files.
    #[arg(long, global = true, default_value = DEFAULT_TITLE)]
    title: String,

    /// Model name; the prefix picks the provider (gpt-, gemini-, claude-, else local).
    #[arg(short, long, global = true, default_value = DEFAULT_MODEL)]
    model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prepare a plot for the story from a seed file.
    Prepare {
        /// Seed file to elaborate.
        #[arg(long)]
        seedfile: PathBuf,
    },
    /// Generate the story draft from a plot file.
    Generate {
        /// Number of parts; at least 4.
        #[arg(
            short = 'n',
            long = "num_chapters",
            visible_alias = "num_parts",
            default_value_t = PartCount::MIN,
            value_parser = clap::value_parser!(u32).range(i64::from(PartCount::MIN)..)
        )]
        parts: u32,

        /// Plot file to write from.
        #[arg(long)]
        plotfile: PathBuf,

        /// Print each part as it is generated.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Convert a markdown draft into an HTML page.
    Convert {
        /// Markdown file to convert.
        #[arg(long)]
        mdfile: PathBuf,

        /// Output file name, written under `html/`.
        #[arg(long)]
        outputfile: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FATAL);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let root = std::env::current_dir().context("resolve current directory")?;
    let workspace = init_workspace(&root)?;

    match cli.command {
        Command::Prepare { seedfile } => cmd_prepare(&workspace, seedfile, cli.title, cli.model),
        Command::Generate {
            parts,
            plotfile,
            verbose,
        } => cmd_generate(&workspace, plotfile, parts, verbose, cli.title, cli.model),
        Command::Convert { mdfile, outputfile } => cmd_convert(&workspace, mdfile, outputfile),
    }
}

fn provider_factory(workspace: &Workspace) -> HttpProviderFactory {
    HttpProviderFactory::new(
        workspace.credentials.clone(),
        workspace.config.endpoints.clone(),
        workspace.config.request_timeout_secs.map(Duration::from_secs),
    )
}

fn cmd_prepare(
    workspace: &Workspace,
    seed_file: PathBuf,
    title: String,
    model: String,
) -> Result<()> {
    let factory = provider_factory(workspace);
    let options = PrepareOptions {
        seed_file,
        title,
        model,
    };
    println!("Preparing the plot with {}...", options.model);
    let outcome = run_prepare(workspace, &factory, &options)?;
    println!("{}", plot_report(&outcome.plot));
    println!(
        "Plot {} generated in {}",
        outcome.plot_path.display(),
        format_elapsed(outcome.elapsed)
    );
    Ok(())
}

fn cmd_generate(
    workspace: &Workspace,
    plot_file: PathBuf,
    parts: u32,
    verbose: bool,
    title: String,
    model: String,
) -> Result<()> {
    let factory = provider_factory(workspace);
    let options = GenerateOptions {
        plot_file,
        title,
        model,
        parts: PartCount::new(parts)?,
    };
    println!(
        "Generating story with {} parts using {}...",
        options.parts, options.model
    );
    let outcome = run_generate(workspace, &factory, &options, |event| {
        println!("{}", section_report(event, verbose));
    })?;
    println!(
        "Story {} generated in {}",
        outcome.draft_path.display(),
        format_elapsed(outcome.elapsed)
    );
    Ok(())
}

fn cmd_convert(workspace: &Workspace, md_file: PathBuf, output_file: PathBuf) -> Result<()> {
    let options = ConvertOptions {
        md_file,
        output_file,
    };
    let outcome = run_convert(workspace, &options)?;
    println!(
        "HTML {} converted in {}",
        outcome.html_path.display(),
        format_elapsed(outcome.elapsed)
    );
    Ok(())
}

/// The generated plot as shown after `prepare`.
fn plot_report(plot: &str) -> String {
    format!("> This is the plot used in the story.\n\n{}\n", plot.trim_end())
}

/// One progress line per generation event; `verbose` adds the section text.
fn section_report(event: GenerateEvent<'_>, verbose: bool) -> String {
    match event {
        GenerateEvent::SectionStarted { index, total, .. } if index == total => {
            format!("> part {index} (final part)")
        }
        GenerateEvent::SectionStarted { index, .. } => format!("> part {index}"),
        GenerateEvent::SectionFinished {
            index,
            text,
            elapsed,
            ..
        } => {
            let timing = format!("  part {index} generated in {}", format_elapsed(elapsed));
            if verbose {
                format!("{}\n\n{timing}", text.trim_end())
            } else {
                timing
            }
        }
    }
}

/// Human-readable duration using its largest whole unit, e.g. `3 minutes`.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (value, unit) = if secs >= 3600 {
        (secs / 3600, "hour")
    } else if secs >= 60 {
        (secs / 60, "minute")
    } else if secs > 0 {
        (secs, "second")
    } else {
        (u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX), "millisecond")
    };
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}
