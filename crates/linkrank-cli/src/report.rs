//! Report rendering for ranked results.
//!
//! Two shapes, mirroring the other report-emitting tools in this workspace:
//! - `json`: one serialized result record per line, schema keyed by the
//!   configured population labels,
//! - `text`: a colored human-readable summary plus a ranked table.

use anyhow::Result;
use colored::Colorize;
use std::fmt::Write as _;

use linkrank_core::Linker;

/// One result record per line, `json.dumps`-style.
pub fn render_json(linker: &Linker) -> Result<String> {
    let mut out = String::new();
    for score in linker.results()? {
        out.push_str(&serde_json::to_string(&score)?);
        out.push('\n');
    }
    Ok(out)
}

/// Colored summary plus ranked table. `top` caps the table rows (0 = all).
pub fn render_text(linker: &Linker, top: usize) -> Result<String> {
    let config = linker.config();
    let results = linker.results()?;

    let mut out = String::new();
    writeln!(out, "{}", "Association analysis".bold())?;
    writeln!(
        out,
        "  {} population ({}): {} observed",
        config.sample_label.green(),
        "sample".dimmed(),
        linker.observed_sample_count()
    )?;
    writeln!(out, "    {}", linker.samples().join(", "))?;
    writeln!(
        out,
        "  {} population ({}): {} observed",
        config.control_label.cyan(),
        "control".dimmed(),
        linker.observed_control_count()
    )?;
    writeln!(out, "    {}", linker.controls().join(", "))?;
    writeln!(out, "  targets: {}", linker.observed_target_count())?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<24} {:>10} {:>10} {:>8} {:>9} {:>8} {:>9}",
        "target".bold(),
        "ratio",
        "z-score",
        format!("{}#", config.sample_label),
        format!("{}%", config.sample_label),
        format!("{}#", config.control_label),
        format!("{}%", config.control_label),
    )?;

    let shown = if top > 0 {
        results.len().min(top)
    } else {
        results.len()
    };
    for score in &results[..shown] {
        let z = match score.deviations_from_mean {
            Some(z) => format!("{z:>10.4}"),
            None => format!("{:>10}", "n/a"),
        };
        // Targets far above the mean are the interesting ones.
        let ratio = if score.deviations_from_mean.unwrap_or(0.0) > 1.0 {
            format!("{:>10.4}", score.ratio).red().to_string()
        } else {
            format!("{:>10.4}", score.ratio)
        };
        writeln!(
            out,
            "{:<24} {} {} {:>8} {:>9.4} {:>8} {:>9.4}",
            score.target,
            ratio,
            z,
            score.sample_count,
            score.sample_percent,
            score.control_count,
            score.control_percent,
        )?;
    }
    if shown < results.len() {
        writeln!(out, "… {} more targets", results.len() - shown)?;
    }

    Ok(out)
}
