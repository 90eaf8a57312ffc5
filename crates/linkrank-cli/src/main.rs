//! linkrank CLI
//!
//! Guilt-by-association ranking over source→target relationship events:
//! label a sample population, feed it observed edges, and rank targets by
//! how disproportionately sample members touch them versus the control
//! population.
//!
//! The engine itself lives in `linkrank-core`; this binary is the driver:
//! read a JSON input document, run label → link → analyze, and print the
//! ranked results as a colored text report or as JSON lines.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use linkrank_core::{Linker, LinkerConfig};

mod input;
mod report;

use input::AnalysisInput;

#[derive(Parser)]
#[command(name = "linkrank")]
#[command(
    author,
    version,
    about = "Rank targets by sample/control association skew"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the label → link → analyze pipeline over a JSON input document.
    ///
    /// The document lists the sample population and the observed edges:
    /// `{"sample": ["10.0.0.1"], "links": [["10.0.0.1", "6.6.6.6"]]}`.
    /// Everything that appears as a link source without being listed in
    /// `sample` counts as control.
    Analyze {
        /// Input JSON document.
        input: PathBuf,

        /// Output path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format: text|json (json = one result record per line).
        #[arg(long, default_value = "text")]
        format: String,

        /// Sample population label; composes output field names.
        #[arg(long, default_value = "sample")]
        sample_label: String,

        /// Control population label; composes output field names.
        #[arg(long, default_value = "control")]
        control_label: String,

        /// Hypothetical minimum control observations assumed for targets
        /// with none (keeps their ratio finite).
        #[arg(long, default_value_t = 1.0)]
        min_control_observations: f64,

        /// Explicit control population size; 0 means "use the observed
        /// count".
        #[arg(long, default_value_t = 0)]
        control_size: u64,

        /// Number of ranked rows in the text report (0 = all).
        #[arg(long, default_value_t = 0)]
        top: usize,
    },

    /// Replay the built-in infected/clean walkthrough and print JSON lines.
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            out,
            format,
            sample_label,
            control_label,
            min_control_observations,
            control_size,
            top,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let doc = AnalysisInput::from_json(&text)?;

            let mut linker = Linker::new(LinkerConfig {
                sample_label,
                control_label,
                minimum_control_observations: min_control_observations,
                control_size,
            })?;
            for entity in &doc.sample {
                linker.label(entity);
            }
            for (source, target) in &doc.links {
                linker.link(source, target);
            }
            linker.analyze()?;

            let rendered = match format.as_str() {
                "json" => report::render_json(&linker)?,
                "text" => report::render_text(&linker, top)?,
                other => bail!("unknown format: {other} (expected text|json)"),
            };

            match out {
                Some(path) => fs::write(&path, rendered)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{rendered}"),
            }
            Ok(())
        }
        Commands::Demo => demo(),
    }
}

/// The canonical walkthrough: three infected IPs, one malicious endpoint
/// they share, one popular benign endpoint, one control-only endpoint.
fn demo() -> Result<()> {
    let mut linker = Linker::with_labels("infected", "clean");

    linker.label("10.0.0.1");
    linker.label("10.0.0.2");
    linker.label("10.0.0.3");

    // 6.6.6.6 is the fictitious malicious IP: only infected hosts touch it.
    linker.link("10.0.0.1", "6.6.6.6");
    linker.link("10.0.0.2", "6.6.6.6");

    // 8.8.8.8 is benign: every host, infected or not, touches it.
    linker.link("10.0.0.1", "8.8.8.8");
    linker.link("10.0.0.2", "8.8.8.8");
    linker.link("10.0.0.3", "8.8.8.8");
    linker.link("10.0.0.4", "8.8.8.8");
    linker.link("10.0.0.5", "8.8.8.8");
    linker.link("10.0.0.6", "8.8.8.8");

    // 9.9.9.9 is benign too: one clean host touches it.
    linker.link("10.0.0.6", "9.9.9.9");

    linker.analyze()?;

    let mut summary = String::new();
    writeln!(
        summary,
        "{} {}",
        "Observed sample members:".bold(),
        linker.observed_sample_count()
    )?;
    writeln!(
        summary,
        "{} {}",
        "Observed control members:".bold(),
        linker.observed_control_count()
    )?;
    writeln!(summary, "Sample group: {}", linker.samples().join(", "))?;
    writeln!(summary, "Control group: {}", linker.controls().join(", "))?;
    print!("{summary}");

    println!("{}", "Analysis results:".bold());
    print!("{}", report::render_json(&linker)?);
    Ok(())
}
