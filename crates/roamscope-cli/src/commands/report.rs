use crate::OutputFormat;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use roamscope_core::ReportConfig;
use roamscope_core::report::{Datasets, HtmlRenderer, Report, ReportBuilder, ReportWriter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a report run produced, for scripting
#[derive(Debug, Serialize)]
pub struct ReportOutcome {
    pub output: PathBuf,
    pub sections: Vec<&'static str>,
    pub charts: Vec<&'static str>,
    pub rssi_error: Option<String>,
    pub handover_error: Option<String>,
    pub flow_error: Option<String>,
}

impl ReportOutcome {
    fn new(report: &Report, output: PathBuf) -> Self {
        let analysis = &report.analysis;
        let sections = [
            ("rssi", analysis.rssi.is_some()),
            ("handovers", analysis.handovers.is_some()),
            ("flows", analysis.flows.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        Self {
            output,
            sections,
            charts: report.charts.iter().map(|c| c.id).collect(),
            rssi_error: report.rssi_error.clone(),
            handover_error: report.handover_error.clone(),
            flow_error: report.flow_error.clone(),
        }
    }
}

/// Load, analyze, render and write; returns the built report
pub fn generate_report(config: ReportConfig) -> Result<Report> {
    let progress = ProgressBar::new(4);
    progress.set_style(
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?,
    );

    progress.set_message("Loading datasets");
    let datasets = Datasets::load(&config);
    if datasets.is_empty() {
        tracing::warn!("No input dataset found, the report will only contain the summary");
    }
    progress.inc(1);

    progress.set_message("Analyzing");
    let output_path = config.output_path.clone();
    let report = ReportBuilder::new(config).build(&datasets)?;
    progress.inc(1);

    progress.set_message("Rendering HTML");
    let html = HtmlRenderer::render(&report);
    progress.inc(1);

    progress.set_message("Writing report");
    ReportWriter::to_file(&html, &output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    progress.inc(1);
    progress.finish_and_clear();

    Ok(report)
}

pub fn execute(config: ReportConfig, show: bool, format: OutputFormat) -> Result<()> {
    tracing::info!("Generating report {}", config.output_path.display());

    let output = config.output_path.clone();
    let report = generate_report(config)?;
    let outcome = ReportOutcome::new(&report, output);

    match format {
        OutputFormat::Json => output_json(&outcome)?,
        OutputFormat::Table => output_table(&outcome),
        OutputFormat::Pretty => output_pretty(&outcome),
    }

    if show {
        open_in_browser(&outcome.output)?;
    }

    Ok(())
}

fn output_pretty(outcome: &ReportOutcome) {
    use console::style;

    println!(
        "\n{} {}",
        style("Report written to").bold().green(),
        outcome.output.display()
    );
    if outcome.sections.is_empty() {
        println!("  {}", style("No dataset available").yellow());
    } else {
        println!("  Sections: {}", outcome.sections.join(", "));
    }
    println!("  Charts:   {}", outcome.charts.len());
    let skipped = [
        ("rssi", &outcome.rssi_error),
        ("handover", &outcome.handover_error),
        ("flow", &outcome.flow_error),
    ];
    for (section, error) in skipped {
        if let Some(error) = error {
            println!(
                "  {} {} section skipped: {}",
                style("[WARN]").yellow(),
                section,
                error
            );
        }
    }
    println!();
}

fn output_json(outcome: &ReportOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    println!("{}", json);
    Ok(())
}

fn output_table(outcome: &ReportOutcome) {
    println!("Metric,Value");
    println!("Output,{}", outcome.output.display());
    println!("Sections,{}", outcome.sections.join(" "));
    println!("Charts,{}", outcome.charts.len());
}

/// Open the report with the platform opener, if one is installed
fn open_in_browser(path: &Path) -> Result<()> {
    let opener = ["xdg-open", "open", "start"]
        .into_iter()
        .find(|name| which::which(name).is_ok());

    let Some(opener) = opener else {
        println!(
            "⚠️  No browser opener found, open {} manually",
            path.display()
        );
        return Ok(());
    };

    tracing::debug!("Opening report with {}", opener);
    Command::new(opener)
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to launch {}", opener))?;
    Ok(())
}
