use crate::OutputFormat;
use anyhow::{Result, bail};
use roamscope_core::analysis::{
    AnalysisReport, Analyzer, FlowAnalyzer, InterruptionExtractor, RssiAnalyzer,
};
use roamscope_core::config::{DEFAULT_FLOW_FILE, DEFAULT_HANDOVER_FILE, DEFAULT_RSSI_FILE};
use roamscope_core::dataset::DatasetReader;
use std::path::{Path, PathBuf};

/// Input files for a stats run
///
/// Explicit paths must exist. When no path is given at all, the default file
/// names are tried and missing ones are skipped.
#[derive(Debug, Default)]
pub struct StatsInputs {
    pub rssi: Option<PathBuf>,
    pub handover: Option<PathBuf>,
    pub flow: Option<PathBuf>,
}

impl StatsInputs {
    pub fn new(rssi: Option<&Path>, handover: Option<&Path>, flow: Option<&Path>) -> Result<Self> {
        if rssi.is_none() && handover.is_none() && flow.is_none() {
            let existing = |name: &str| Some(PathBuf::from(name)).filter(|p| p.exists());
            return Ok(Self {
                rssi: existing(DEFAULT_RSSI_FILE),
                handover: existing(DEFAULT_HANDOVER_FILE),
                flow: existing(DEFAULT_FLOW_FILE),
            });
        }

        for path in [rssi, handover, flow].into_iter().flatten() {
            if !path.exists() {
                bail!("File not found: {}", path.display());
            }
        }

        Ok(Self {
            rssi: rssi.map(Path::to_path_buf),
            handover: handover.map(Path::to_path_buf),
            flow: flow.map(Path::to_path_buf),
        })
    }
}

/// Run every analyzer whose dataset is present
pub fn collect_stats(inputs: &StatsInputs) -> Result<AnalysisReport> {
    let mut report = AnalysisReport::default();

    if let Some(path) = &inputs.rssi {
        let samples = DatasetReader::rssi_from_file(path)?;
        report.rssi = Some(RssiAnalyzer.analyze(&samples)?);
    }
    if let Some(path) = &inputs.handover {
        let records = DatasetReader::events_from_file(path)?;
        report.handovers = Some(InterruptionExtractor.analyze(&records)?);
    }
    if let Some(path) = &inputs.flow {
        let records = DatasetReader::flows_from_file(path)?;
        report.flows = Some(FlowAnalyzer.analyze(&records)?);
    }

    Ok(report)
}

pub fn execute(
    rssi: Option<&Path>,
    handover: Option<&Path>,
    flow: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let inputs = StatsInputs::new(rssi, handover, flow)?;
    tracing::info!("Extracting statistics from {:?}", inputs);

    let report = collect_stats(&inputs)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{:.2} {}", v, unit))
        .unwrap_or_else(|| "N/A".to_string())
}

fn output_pretty(report: &AnalysisReport) {
    use console::style;

    println!("\n{}", style("Dataset Statistics").bold().cyan());
    println!("{}", style("==================").cyan());

    if let Some(rssi) = &report.rssi {
        println!("\n{}", style("RSSI:").bold());
        println!("  Samples:          {}", rssi.total_samples);
        println!("  Stations:         {}", rssi.stations);
        println!("  Access Points:    {}", rssi.access_points);
        println!("  Duration:         {:.2} s", rssi.sim_duration);
        println!("  Mean RSSI:        {}", fmt_opt(rssi.mean_rssi, "dBm"));
        println!("  Min RSSI:         {}", fmt_opt(rssi.min_rssi, "dBm"));
        println!("  Max RSSI:         {}", fmt_opt(rssi.max_rssi, "dBm"));
    }

    if let Some(handovers) = &report.handovers {
        let summary = &handovers.summary;
        println!("\n{}", style("Handovers:").bold());
        println!("  Events:           {}", summary.total_events);
        println!("  Handovers:        {}", summary.total_handovers);
        println!("  Interruptions:    {}", handovers.interruptions.len());
        println!(
            "  Mean Interruption: {:.4} s",
            summary.mean_interruption_duration
        );
    }

    if let Some(flows) = &report.flows {
        let stats = &flows.stats;
        println!("\n{}", style("Flows:").bold());
        println!("  Flows:            {}", stats.total_flows);
        println!("  Avg Throughput:   {}", fmt_opt(stats.avg_throughput_kbps, "kbps"));
        println!("  Max Throughput:   {}", fmt_opt(stats.max_throughput_kbps, "kbps"));
        println!("  Avg Delay:        {}", fmt_opt(stats.avg_delay, "s"));
        println!(
            "  Packets:          {} sent, {} received, {} lost",
            stats.total_tx_packets, stats.total_rx_packets, stats.total_lost_packets
        );
        println!("  Loss Rate:        {:.2} %", stats.packet_loss_rate);
    }

    if report.rssi.is_none() && report.handovers.is_none() && report.flows.is_none() {
        println!("\n  {}", style("No dataset found").yellow());
    }

    println!();
}

fn output_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &AnalysisReport) {
    println!("Dataset,Metric,Value");

    if let Some(rssi) = &report.rssi {
        println!("rssi,Samples,{}", rssi.total_samples);
        println!("rssi,Stations,{}", rssi.stations);
        println!("rssi,Access Points,{}", rssi.access_points);
        println!("rssi,Duration (s),{}", rssi.sim_duration);
        if let Some(mean) = rssi.mean_rssi {
            println!("rssi,Mean RSSI (dBm),{:.4}", mean);
        }
    }

    if let Some(handovers) = &report.handovers {
        println!("handovers,Events,{}", handovers.summary.total_events);
        println!("handovers,Handovers,{}", handovers.summary.total_handovers);
        println!("handovers,Interruptions,{}", handovers.interruptions.len());
        println!(
            "handovers,Mean Interruption (s),{:.6}",
            handovers.summary.mean_interruption_duration
        );
    }

    if let Some(flows) = &report.flows {
        println!("flows,Flows,{}", flows.stats.total_flows);
        println!("flows,Lost Packets,{}", flows.stats.total_lost_packets);
        println!("flows,Loss Rate (%),{:.4}", flows.stats.packet_loss_rate);
    }
}
