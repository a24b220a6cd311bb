use super::Report;
use super::charts::{Chart, Section};
use crate::analysis::{FlowAnalysis, HandoverAnalysis, RssiStats};
use std::fmt::Write;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Renders a report as a single static HTML page
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn render(report: &Report) -> String {
        tracing::debug!("Rendering HTML report with {} charts", report.charts.len());

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>WiFi Roaming Analysis Report</title>
    <script src="{cdn}"></script>
    <style>{css}</style>
</head>
<body>
    <h1>WiFi Roaming Analysis Report</h1>
{summary}{rssi}{handover}{flow}
    <div class="footer">
        <p>Report generated on {generated_at}</p>
    </div>
    <script>
{scripts}    </script>
</body>
</html>
"#,
            cdn = PLOTLY_CDN,
            css = inline_css(),
            summary = render_summary(report),
            rssi = match (&report.rssi_error, &report.analysis.rssi) {
                (Some(error), _) => render_unavailable("rssi", "RSSI Analysis", "RSSI samples", error),
                (None, Some(stats)) => render_rssi(stats, &report.charts),
                (None, None) => String::new(),
            },
            handover = render_handover(report),
            flow = match (&report.flow_error, &report.analysis.flows) {
                (Some(error), _) => render_unavailable("flows", "Flow Analysis", "Flow statistics", error),
                (None, Some(flows)) => render_flow(flows, &report.charts),
                (None, None) => String::new(),
            },
            generated_at = escape_html(&report.generated_at),
            scripts = render_scripts(&report.charts),
        )
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Serialize a value for embedding inside a `<script>` element
fn script_json(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

fn fmt_num(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| fmt_num(v, decimals))
        .unwrap_or_else(|| "N/A".to_string())
}

fn render_summary(report: &Report) -> String {
    let config = &report.config;
    let analysis = &report.analysis;
    let mut points = vec![format!("Generated: {}", report.generated_at)];

    if let Some(rssi) = &analysis.rssi {
        points.push(format!("Simulation duration: {} s", fmt_num(rssi.sim_duration, 2)));
        points.push(format!("Stations: {}", rssi.stations));
        points.push(format!("RSSI samples: {}", rssi.total_samples));
    }
    points.push(format!(
        "ON/OFF ratio: ON={}s, OFF={}s ({}% ON)",
        config.on_time,
        config.off_time,
        config.on_ratio()
    ));
    if let Some(handovers) = &analysis.handovers {
        points.push(format!("Handovers: {}", handovers.summary.total_handovers));
        points.push(format!(
            "Mean handover interruption: {} s",
            fmt_num(handovers.summary.mean_interruption_duration, 4)
        ));
    }
    if let Some(flows) = &analysis.flows {
        points.push(format!("Flows analyzed: {}", flows.stats.total_flows));
        if let Some(throughput) = flows.stats.avg_throughput_kbps {
            points.push(format!("Average throughput: {} kbps", fmt_num(throughput, 2)));
        }
        points.push(format!(
            "Packet loss rate: {} %",
            fmt_num(flows.stats.packet_loss_rate, 2)
        ));
    }

    let mut html = String::new();
    html.push_str("    <div class=\"section\">\n        <h2>Summary</h2>\n");
    html.push_str("        <p>Input files:</p>\n        <ul>\n");
    for (label, path) in [
        ("RSSI", &config.rssi_path),
        ("Handover", &config.handover_path),
        ("Flow", &config.flow_path),
    ] {
        let _ = writeln!(
            html,
            "            <li>{} file: {}</li>",
            label,
            escape_html(&path.display().to_string())
        );
    }
    html.push_str("        </ul>\n        <div class=\"summary-box\">\n            <h3>Key points</h3>\n            <ul>\n");
    for point in points {
        let _ = writeln!(html, "                <li>{}</li>", escape_html(&point));
    }
    html.push_str("            </ul>\n        </div>\n    </div>\n");
    html
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("        <table>\n            <thead>\n                <tr>");
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n            </thead>\n            <tbody>\n");
    for row in rows {
        html.push_str("                <tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("            </tbody>\n        </table>\n");
    html
}

fn metric_rows(metrics: Vec<(&str, String)>) -> Vec<Vec<String>> {
    metrics
        .into_iter()
        .map(|(name, value)| vec![name.to_string(), value])
        .collect()
}

fn render_plots(charts: &[Chart], section: Section) -> String {
    let mut html = String::new();
    for chart in charts.iter().filter(|c| c.section == section) {
        let _ = writeln!(
            html,
            "        <h3>{}</h3>\n        <div class=\"plot\" id=\"{}_plot\"></div>",
            escape_html(&chart.title),
            chart.id
        );
    }
    html
}

fn render_rssi(stats: &RssiStats, charts: &[Chart]) -> String {
    let rows: Vec<Vec<String>> = stats
        .links
        .iter()
        .map(|link| {
            vec![
                link.station_id.to_string(),
                link.ap_id.to_string(),
                link.samples.to_string(),
                fmt_num(link.mean, 2),
                fmt_num(link.min, 2),
                fmt_num(link.max, 2),
            ]
        })
        .collect();

    format!(
        "    <div class=\"section\" id=\"rssi\">\n        <h2>RSSI Analysis</h2>\n        \
         <p>Received signal strength of every station towards every access point.</p>\n        \
         <h3>RSSI per station and access point</h3>\n{}{}    </div>\n",
        render_table(
            &["Station", "AP", "Samples", "Mean RSSI (dBm)", "Min RSSI (dBm)", "Max RSSI (dBm)"],
            &rows
        ),
        render_plots(charts, Section::Rssi)
    )
}

/// Section placeholder for a dataset that was present but unusable
fn render_unavailable(id: &str, title: &str, label: &str, error: &str) -> String {
    format!(
        "    <div class=\"section\" id=\"{}\">\n        <h2>{}</h2>\n        \
         <div class=\"summary-box warning\">{} could not be analyzed: {}</div>\n    </div>\n",
        id,
        title,
        label,
        escape_html(error)
    )
}

fn render_handover(report: &Report) -> String {
    if let Some(error) = &report.handover_error {
        return render_unavailable("handovers", "Handover Analysis", "Handover events", error);
    }

    let Some(analysis) = &report.analysis.handovers else {
        return String::new();
    };
    render_handover_section(analysis, &report.charts)
}

fn render_handover_section(analysis: &HandoverAnalysis, charts: &[Chart]) -> String {
    let summary = &analysis.summary;
    let metrics = metric_rows(vec![
        ("Total handovers", summary.total_handovers.to_string()),
        ("Stations with handovers", summary.stations_with_handovers.to_string()),
        (
            "Mean handovers per station",
            fmt_num(summary.mean_handovers_per_station, 2),
        ),
        ("First handover (s)", fmt_opt(summary.first_handover_time, 4)),
        ("Last handover (s)", fmt_opt(summary.last_handover_time, 4)),
        (
            "Mean time between handovers (s)",
            fmt_num(summary.mean_time_between_handovers, 4),
        ),
        ("Interruptions", analysis.interruptions.len().to_string()),
        (
            "Mean interruption (s)",
            fmt_num(summary.mean_interruption_duration, 4),
        ),
    ]);

    let interruptions = if analysis.interruptions.is_empty() {
        "        <p>No service interruption detected.</p>\n".to_string()
    } else {
        let rows: Vec<Vec<String>> = analysis
            .interruptions
            .iter()
            .map(|i| {
                vec![
                    i.station_id.to_string(),
                    fmt_num(i.start_time, 4),
                    fmt_num(i.end_time, 4),
                    fmt_num(i.duration, 4),
                    i.ended_by.as_str().to_string(),
                ]
            })
            .collect();
        render_table(
            &["Station", "Start (s)", "End (s)", "Duration (s)", "Ended by"],
            &rows,
        )
    };

    format!(
        "    <div class=\"section\" id=\"handovers\">\n        <h2>Handover Analysis</h2>\n        \
         <p>Association, disassociation and handover events observed during the simulation.</p>\n        \
         <h3>Handover statistics</h3>\n{}        <h3>Service interruptions</h3>\n{}{}    </div>\n",
        render_table(&["Metric", "Value"], &metrics),
        interruptions,
        render_plots(charts, Section::Handover)
    )
}

fn render_flow(analysis: &FlowAnalysis, charts: &[Chart]) -> String {
    let stats = &analysis.stats;
    let metrics = metric_rows(vec![
        ("Total flows", stats.total_flows.to_string()),
        ("Average throughput (kbps)", fmt_opt(stats.avg_throughput_kbps, 4)),
        ("Max throughput (kbps)", fmt_opt(stats.max_throughput_kbps, 4)),
        ("Average loss rate (%)", fmt_opt(stats.avg_loss_rate, 4)),
        ("Average delay (s)", fmt_opt(stats.avg_delay, 4)),
        ("Transmitted packets", stats.total_tx_packets.to_string()),
        ("Received packets", stats.total_rx_packets.to_string()),
        ("Lost packets", stats.total_lost_packets.to_string()),
        ("Packet loss rate (%)", fmt_num(stats.packet_loss_rate, 2)),
    ]);

    let rows: Vec<Vec<String>> = analysis
        .flows
        .iter()
        .map(|flow| {
            vec![
                flow.flow_id.to_string(),
                flow.source.clone().unwrap_or_default(),
                flow.destination.clone().unwrap_or_default(),
                fmt_opt(flow.throughput_kbps, 2),
                fmt_opt(flow.loss_rate, 2),
                fmt_opt(flow.mean_delay, 4),
            ]
        })
        .collect();

    format!(
        "    <div class=\"section\" id=\"flows\">\n        <h2>Flow Analysis</h2>\n        \
         <p>Network performance of the simulated traffic flows.</p>\n        \
         <h3>Flow statistics</h3>\n{}        <h3>Per-flow metrics</h3>\n{}{}    </div>\n",
        render_table(&["Metric", "Value"], &metrics),
        render_table(
            &[
                "Flow",
                "Source",
                "Destination",
                "Throughput (kbps)",
                "Loss rate (%)",
                "Mean delay (s)"
            ],
            &rows
        ),
        render_plots(charts, Section::Flow)
    )
}

fn render_scripts(charts: &[Chart]) -> String {
    let mut js = String::new();
    for chart in charts {
        let _ = writeln!(
            js,
            "        var {id}_data = {json};\n        Plotly.newPlot('{id}_plot', {id}_data.data, {id}_data.layout);",
            id = chart.id,
            json = script_json(&chart.figure)
        );
    }
    js
}

fn inline_css() -> &'static str {
    r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; }
        h1, h2, h3 { color: #2c5282; }
        h1 { text-align: center; border-bottom: 2px solid #2c5282; padding-bottom: 10px; }
        .section { margin-bottom: 40px; padding: 20px; background-color: #f8f9fa; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
        .plot { width: 100%; height: auto; margin: 20px 0; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { border: 1px solid #ddd; padding: 8px 12px; text-align: left; }
        th { background-color: #f2f2f2; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        .footer { margin-top: 50px; text-align: center; font-size: 0.9em; color: #666; }
        .summary-box { background-color: #e6f7ff; border-left: 4px solid #1890ff; padding: 15px; margin: 20px 0; }
        .warning { background-color: #fff7e6; border-left: 4px solid #ffa940; }
    "#
}
