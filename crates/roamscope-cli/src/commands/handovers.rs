use crate::OutputFormat;
use anyhow::Result;
use roamscope_core::analysis::{HandoverAnalysis, InterruptionExtractor};
use roamscope_core::dataset::DatasetReader;
use std::path::Path;

/// Read an event table and extract its handover interruptions
pub fn analyze_handovers(file: &Path) -> Result<HandoverAnalysis> {
    tracing::debug!("Reading handover events: {}", file.display());

    let records = DatasetReader::events_from_file(file)?;
    let analysis = InterruptionExtractor::extract_records(&records)?;

    Ok(analysis)
}

pub fn execute(file: &Path, interruptions: bool, format: OutputFormat) -> Result<()> {
    tracing::info!("Analyzing handover events: {}", file.display());

    let analysis = analyze_handovers(file)?;

    match format {
        OutputFormat::Json => output_json(&analysis, interruptions)?,
        OutputFormat::Table => output_table(&analysis, interruptions),
        OutputFormat::Pretty => output_pretty(&analysis, interruptions),
    }

    Ok(())
}

fn fmt_time(time: Option<f64>) -> String {
    time.map(|t| format!("{:.4} s", t))
        .unwrap_or_else(|| "-".to_string())
}

fn output_pretty(analysis: &HandoverAnalysis, include_interruptions: bool) {
    use console::style;

    let summary = &analysis.summary;

    println!("\n{}", style("Handover Analysis").bold().cyan());
    println!("{}", style("=================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Events:                    {}", summary.total_events);
    println!("  Stations:                  {}", summary.total_stations);
    println!("  Total Handovers:           {}", summary.total_handovers);
    println!("  Stations With Handovers:   {}", summary.stations_with_handovers);
    println!(
        "  Handovers Per Station:     {:.2}",
        summary.mean_handovers_per_station
    );
    println!("  First Handover:            {}", fmt_time(summary.first_handover_time));
    println!("  Last Handover:             {}", fmt_time(summary.last_handover_time));
    println!(
        "  Mean Time Between:         {:.4} s",
        summary.mean_time_between_handovers
    );

    println!("\n{}", style("Interruptions:").bold());
    println!("  Count:                     {}", analysis.interruptions.len());
    println!(
        "  Mean Duration:             {:.4} s",
        summary.mean_interruption_duration
    );

    if include_interruptions && !analysis.interruptions.is_empty() {
        println!();
        for (i, interruption) in analysis.interruptions.iter().enumerate() {
            println!(
                "  {}. station {} [{:.4} s -> {:.4} s] {} (ended by {})",
                i + 1,
                style(&interruption.station_id).yellow(),
                interruption.start_time,
                interruption.end_time,
                style(format!("{:.4} s", interruption.duration)).bold(),
                interruption.ended_by.as_str()
            );
        }
    }

    println!();
}

fn output_json(analysis: &HandoverAnalysis, include_interruptions: bool) -> Result<()> {
    let json = if include_interruptions {
        serde_json::to_string_pretty(analysis)?
    } else {
        serde_json::to_string_pretty(&analysis.summary)?
    };
    println!("{}", json);
    Ok(())
}

fn output_table(analysis: &HandoverAnalysis, include_interruptions: bool) {
    let summary = &analysis.summary;

    if include_interruptions {
        println!("Station,Start,End,Duration,EndedBy");
        for interruption in &analysis.interruptions {
            println!(
                "{},{},{},{:.6},{}",
                interruption.station_id,
                interruption.start_time,
                interruption.end_time,
                interruption.duration,
                interruption.ended_by.token()
            );
        }
        return;
    }

    println!("Metric,Value");
    println!("Total Events,{}", summary.total_events);
    println!("Stations,{}", summary.total_stations);
    println!("Total Handovers,{}", summary.total_handovers);
    println!("Stations With Handovers,{}", summary.stations_with_handovers);
    println!(
        "Handovers Per Station,{:.2}",
        summary.mean_handovers_per_station
    );
    if let Some(first) = summary.first_handover_time {
        println!("First Handover (s),{}", first);
    }
    if let Some(last) = summary.last_handover_time {
        println!("Last Handover (s),{}", last);
    }
    println!("Interruptions,{}", analysis.interruptions.len());
    println!(
        "Mean Interruption (s),{:.6}",
        summary.mean_interruption_duration
    );
}
