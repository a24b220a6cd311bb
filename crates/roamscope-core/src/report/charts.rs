//! Plotly figure specifications
//!
//! Every chart is a plain `{ "data": [...], "layout": {...} }` document that
//! the HTML page hands to `Plotly.newPlot`.

use crate::analysis::{
    FlowAnalysis, FlowMetrics, HandoverPosition, HandoverSummary, Interruption, RssiHeatmap,
};
use crate::dataset::{EventKind, NodeId, RssiSample, StationEvent};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Report section a chart belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Rssi,
    Handover,
    Flow,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub id: &'static str,
    pub title: String,
    pub section: Section,
    pub figure: Value,
}

impl Chart {
    fn new(id: &'static str, title: &str, section: Section, data: Vec<Value>, layout: Value) -> Self {
        Self {
            id,
            title: title.to_string(),
            section,
            figure: json!({ "data": data, "layout": layout }),
        }
    }
}

fn base_layout(title: &str, x_title: &str, y_title: &str) -> Map<String, Value> {
    let mut layout = Map::new();
    layout.insert("title".into(), json!({ "text": title }));
    layout.insert("xaxis".into(), json!({ "title": { "text": x_title } }));
    layout.insert("yaxis".into(), json!({ "title": { "text": y_title } }));
    layout.insert("plot_bgcolor".into(), json!("white"));
    layout.insert("hovermode".into(), json!("closest"));
    layout
}

/// Axis reference suffix of a subplot row: "", "2", "3", ...
fn axis_suffix(row: usize) -> String {
    if row == 0 {
        String::new()
    } else {
        (row + 1).to_string()
    }
}

/// Lay out `titles.len()` subplots stacked vertically, one x/y axis pair each
fn stack_rows(layout: &mut Map<String, Value>, titles: &[String], x_title: &str, y_title: &str) {
    let rows = titles.len().max(1);
    let height = 1.0 / rows as f64;
    let gap = if rows > 1 { 0.08 } else { 0.0 };
    let mut annotations = Vec::new();

    for (row, subtitle) in titles.iter().enumerate() {
        let suffix = axis_suffix(row);
        let top = 1.0 - row as f64 * height;
        let bottom = top - height;
        let domain = [bottom + gap / 2.0, top - gap / 2.0];

        layout.insert(
            format!("xaxis{}", suffix),
            json!({ "anchor": format!("y{}", suffix), "title": { "text": x_title } }),
        );
        layout.insert(
            format!("yaxis{}", suffix),
            json!({
                "anchor": format!("x{}", suffix),
                "domain": domain,
                "title": { "text": y_title },
            }),
        );
        annotations.push(json!({
            "text": subtitle,
            "xref": "paper",
            "yref": "paper",
            "x": 0.5,
            "y": domain[1],
            "xanchor": "center",
            "yanchor": "bottom",
            "showarrow": false,
        }));
    }

    layout.insert("annotations".into(), Value::Array(annotations));
    layout.insert("height".into(), json!(300 * rows));
}

/// RSSI over time, one subplot per station, with handover markers
pub fn rssi_evolution(
    samples: &[RssiSample],
    events: Option<&[StationEvent]>,
    threshold: f64,
    max_stations: usize,
) -> Option<Chart> {
    let mut by_station: BTreeMap<&NodeId, BTreeMap<&NodeId, Vec<&RssiSample>>> = BTreeMap::new();
    for sample in samples {
        by_station
            .entry(&sample.station_id)
            .or_default()
            .entry(&sample.ap_id)
            .or_default()
            .push(sample);
    }

    let stations: Vec<&NodeId> = by_station.keys().copied().take(max_stations).collect();
    if stations.is_empty() {
        return None;
    }

    let mut data = Vec::new();
    let mut shapes = Vec::new();
    let mut marker_legend_shown = false;

    for (row, station) in stations.iter().enumerate() {
        let suffix = axis_suffix(row);
        for (ap, track) in &by_station[station] {
            let mut track = track.clone();
            track.sort_by(|a, b| a.time.total_cmp(&b.time));
            data.push(json!({
                "type": "scatter",
                "mode": "lines",
                "name": format!("STA{}→AP{}", station, ap),
                "x": track.iter().map(|s| s.time).collect::<Vec<_>>(),
                "y": track.iter().map(|s| s.rssi).collect::<Vec<_>>(),
                "line": { "width": 2 },
                "hovertemplate": "T: %{x:.2f}s<br>RSSI: %{y:.2f} dBm",
                "xaxis": format!("x{}", suffix),
                "yaxis": format!("y{}", suffix),
            }));
        }

        let handover_times: Vec<f64> = events
            .unwrap_or_default()
            .iter()
            .filter(|e| e.kind == EventKind::Handover && &e.station_id == *station)
            .map(|e| e.time)
            .collect();
        if !handover_times.is_empty() {
            data.push(json!({
                "type": "scatter",
                "mode": "markers",
                "name": "Handover",
                "legendgroup": "handover",
                "showlegend": !marker_legend_shown,
                "x": handover_times,
                "y": vec![threshold; handover_times.len()],
                "marker": { "size": 14, "color": "orange", "symbol": "star" },
                "hovertemplate": format!("Handover STA{} at t=%{{x:.2f}}s", station),
                "xaxis": format!("x{}", suffix),
                "yaxis": format!("y{}", suffix),
            }));
            marker_legend_shown = true;
        }

        shapes.push(json!({
            "type": "line",
            "xref": format!("x{} domain", suffix),
            "yref": format!("y{}", suffix),
            "x0": 0,
            "x1": 1,
            "y0": threshold,
            "y1": threshold,
            "line": { "color": "red", "width": 1, "dash": "dash" },
        }));
    }

    let titles: Vec<String> = stations.iter().map(|s| format!("Station {}", s)).collect();
    let mut layout = base_layout("RSSI over time", "Time (s)", "RSSI (dBm)");
    stack_rows(&mut layout, &titles, "Time (s)", "RSSI (dBm)");
    layout.insert("shapes".into(), Value::Array(shapes));
    layout.insert("legend".into(), json!({ "title": { "text": "Link" } }));

    Some(Chart::new(
        "rssi_evolution",
        "RSSI over time",
        Section::Rssi,
        data,
        Value::Object(layout),
    ))
}

/// Overlaid RSSI histograms, one per access point
pub fn rssi_distribution(samples: &[RssiSample], threshold: f64) -> Chart {
    let mut by_ap: BTreeMap<&NodeId, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        by_ap.entry(&sample.ap_id).or_default().push(sample.rssi);
    }

    let data = by_ap
        .into_iter()
        .map(|(ap, values)| {
            json!({
                "type": "histogram",
                "name": format!("AP{}", ap),
                "x": values,
                "opacity": 0.7,
                "nbinsx": 30,
            })
        })
        .collect();

    let mut layout = base_layout("RSSI distribution", "RSSI (dBm)", "Samples");
    layout.insert("barmode".into(), json!("overlay"));
    layout.insert("legend".into(), json!({ "title": { "text": "Access point" } }));
    layout.insert(
        "shapes".into(),
        json!([{
            "type": "line",
            "xref": "x",
            "yref": "paper",
            "x0": threshold,
            "x1": threshold,
            "y0": 0,
            "y1": 1,
            "line": { "color": "red", "width": 2, "dash": "dash" },
        }]),
    );
    layout.insert(
        "annotations".into(),
        json!([{
            "text": "Typical threshold",
            "xref": "x",
            "yref": "paper",
            "x": threshold,
            "y": 1,
            "xshift": 10,
            "showarrow": false,
        }]),
    );

    Chart::new(
        "rssi_distribution",
        "RSSI distribution",
        Section::Rssi,
        data,
        Value::Object(layout),
    )
}

/// Mean RSSI per position cell, one stacked subplot per access point
pub fn rssi_heatmap(heatmap: &RssiHeatmap) -> Chart {
    let data = heatmap
        .layers
        .iter()
        .enumerate()
        .map(|(row, layer)| {
            let suffix = axis_suffix(row);
            json!({
                "type": "heatmap",
                "name": format!("AP{}", layer.ap_id),
                "z": layer.cells,
                "x": (0..heatmap.x_bins).collect::<Vec<_>>(),
                "y": (0..heatmap.y_bins).collect::<Vec<_>>(),
                "colorscale": "Viridis",
                "zmin": -90,
                "zmax": -30,
                "showscale": row == 0,
                "colorbar": { "title": { "text": "RSSI (dBm)" } },
                "xaxis": format!("x{}", suffix),
                "yaxis": format!("y{}", suffix),
            })
        })
        .collect();

    let title = format!("RSSI heatmap for station {}", heatmap.station_id);
    let titles: Vec<String> = heatmap
        .layers
        .iter()
        .map(|layer| format!("AP {}", layer.ap_id))
        .collect();
    let mut layout = base_layout(&title, "Position X (cell)", "Position Y (cell)");
    stack_rows(&mut layout, &titles, "Position X (cell)", "Position Y (cell)");

    Chart::new("rssi_heatmap", &title, Section::Rssi, data, Value::Object(layout))
}

/// Association, disassociation and handover events over time
pub fn event_timeline(events: &[StationEvent]) -> Chart {
    let styles = [
        (EventKind::Association, "circle", "blue", 10),
        (EventKind::Disassociation, "x", "red", 10),
        (EventKind::Handover, "star", "green", 15),
    ];

    let data = styles
        .iter()
        .filter_map(|(kind, symbol, color, size)| {
            let selected: Vec<&StationEvent> = events.iter().filter(|e| e.kind == *kind).collect();
            if selected.is_empty() {
                return None;
            }

            let mut trace = json!({
                "type": "scatter",
                "mode": "markers",
                "name": kind.as_str(),
                "x": selected.iter().map(|e| e.time).collect::<Vec<_>>(),
                "y": selected.iter().map(|e| &e.station_id).collect::<Vec<_>>(),
                "marker": { "symbol": symbol, "color": color, "size": size },
                "hovertemplate": format!("{} at %{{x:.2f}}s<br>Station %{{y}}", kind.as_str()),
            });
            if *kind == EventKind::Handover {
                trace["customdata"] = json!(
                    selected
                        .iter()
                        .map(|e| [
                            e.from_ap.as_deref().unwrap_or("?"),
                            e.to_ap.as_deref().unwrap_or("?"),
                        ])
                        .collect::<Vec<_>>()
                );
                trace["hovertemplate"] = json!(
                    "Handover at %{x:.2f}s<br>Station %{y}<br>From %{customdata[0]} to %{customdata[1]}"
                );
            }
            Some(trace)
        })
        .collect();

    let mut layout = base_layout("Event timeline", "Time (s)", "Station");
    layout.insert(
        "yaxis".into(),
        json!({ "title": { "text": "Station" }, "type": "category" }),
    );
    layout.insert("legend".into(), json!({ "title": { "text": "Event" } }));

    Chart::new(
        "handover_timeline",
        "Event timeline",
        Section::Handover,
        data,
        Value::Object(layout),
    )
}

pub fn handovers_by_station(summary: &HandoverSummary) -> Option<Chart> {
    if summary.handovers_by_station.is_empty() {
        return None;
    }

    let data = vec![json!({
        "type": "bar",
        "name": "Handovers",
        "x": summary
            .handovers_by_station
            .iter()
            .map(|s| s.station_id.to_string())
            .collect::<Vec<_>>(),
        "y": summary
            .handovers_by_station
            .iter()
            .map(|s| s.handovers)
            .collect::<Vec<_>>(),
    })];

    let mut layout = base_layout("Handovers per station", "Station", "Handovers");
    layout.insert(
        "xaxis".into(),
        json!({ "title": { "text": "Station" }, "type": "category" }),
    );

    Some(Chart::new(
        "handovers_by_station",
        "Handovers per station",
        Section::Handover,
        data,
        Value::Object(layout),
    ))
}

/// Station positions at the moment of each handover
pub fn handover_map(positions: &[HandoverPosition]) -> Option<Chart> {
    if positions.is_empty() {
        return None;
    }

    let mut by_station: BTreeMap<&NodeId, Vec<&HandoverPosition>> = BTreeMap::new();
    for position in positions {
        by_station.entry(&position.station_id).or_default().push(position);
    }

    let data = by_station
        .into_iter()
        .map(|(station, points)| {
            json!({
                "type": "scatter",
                "mode": "markers",
                "name": format!("STA{}", station),
                "x": points.iter().map(|p| p.pos_x).collect::<Vec<_>>(),
                "y": points.iter().map(|p| p.pos_y).collect::<Vec<_>>(),
                "text": points
                    .iter()
                    .map(|p| format!(
                        "t={:.2}s {} → {}",
                        p.time,
                        p.from_ap.as_deref().unwrap_or("?"),
                        p.to_ap.as_deref().unwrap_or("?")
                    ))
                    .collect::<Vec<_>>(),
                "marker": { "size": 12 },
            })
        })
        .collect();

    let layout = base_layout("Station positions at handover", "Position X (m)", "Position Y (m)");

    Some(Chart::new(
        "handover_map",
        "Station positions at handover",
        Section::Handover,
        data,
        Value::Object(layout),
    ))
}

pub fn interruption_durations(interruptions: &[Interruption]) -> Option<Chart> {
    if interruptions.is_empty() {
        return None;
    }

    let mut by_station: BTreeMap<&NodeId, Vec<&Interruption>> = BTreeMap::new();
    for interruption in interruptions {
        by_station
            .entry(&interruption.station_id)
            .or_default()
            .push(interruption);
    }

    let data = by_station
        .into_iter()
        .map(|(station, gaps)| {
            json!({
                "type": "scatter",
                "mode": "markers",
                "name": format!("STA{}", station),
                "x": gaps.iter().map(|g| g.start_time).collect::<Vec<_>>(),
                "y": gaps.iter().map(|g| g.duration).collect::<Vec<_>>(),
                "hovertemplate": "Start %{x:.2f}s<br>Interruption %{y:.4f}s",
            })
        })
        .collect();

    let layout = base_layout("Service interruptions", "Start time (s)", "Duration (s)");

    Some(Chart::new(
        "interruptions",
        "Service interruptions",
        Section::Handover,
        data,
        Value::Object(layout),
    ))
}

/// Bar chart of one per-flow metric, one trace per flow source
fn flow_bars(
    id: &'static str,
    title: &str,
    y_title: &str,
    analysis: &FlowAnalysis,
    metric: impl Fn(&FlowMetrics) -> Option<f64>,
) -> Option<Chart> {
    let mut by_source: BTreeMap<String, (Vec<String>, Vec<f64>)> = BTreeMap::new();
    for flow in &analysis.flows {
        if let Some(value) = metric(flow) {
            let source = flow.source.clone().unwrap_or_else(|| "unknown".to_string());
            let (x, y) = by_source.entry(source).or_default();
            x.push(flow.flow_id.to_string());
            y.push(value);
        }
    }

    if by_source.is_empty() {
        return None;
    }

    let data = by_source
        .into_iter()
        .map(|(source, (x, y))| json!({ "type": "bar", "name": source, "x": x, "y": y }))
        .collect();

    let mut layout = base_layout(title, "Flow", y_title);
    layout.insert(
        "xaxis".into(),
        json!({ "title": { "text": "Flow" }, "type": "category" }),
    );
    layout.insert("legend".into(), json!({ "title": { "text": "Source" } }));

    Some(Chart::new(id, title, Section::Flow, data, Value::Object(layout)))
}

pub fn flow_throughput(analysis: &FlowAnalysis) -> Option<Chart> {
    flow_bars("throughput", "Throughput per flow", "Throughput (kbps)", analysis, |f| {
        f.throughput_kbps
    })
}

pub fn flow_loss_rate(analysis: &FlowAnalysis) -> Option<Chart> {
    flow_bars("packet_loss", "Loss rate per flow", "Loss rate (%)", analysis, |f| f.loss_rate)
}

pub fn flow_delay(analysis: &FlowAnalysis) -> Option<Chart> {
    flow_bars("delay", "Mean delay per flow", "Mean delay (s)", analysis, |f| f.mean_delay)
}

/// Received versus lost packets across all flows
pub fn packet_delivery(analysis: &FlowAnalysis) -> Option<Chart> {
    let stats = &analysis.stats;
    if stats.total_tx_packets == 0 {
        return None;
    }

    let data = vec![json!({
        "type": "pie",
        "labels": ["Received", "Lost"],
        "values": [stats.total_rx_packets, stats.total_lost_packets],
        "hole": 0.5,
        "textinfo": "percent+value",
        "marker": { "colors": ["#3D9970", "#FF4136"] },
    })];

    let layout = json!({
        "title": { "text": "Received vs lost packets" },
        "annotations": [{
            "text": format!("Loss rate: {:.2}%", stats.packet_loss_rate),
            "x": 0.5,
            "y": 0.5,
            "font": { "size": 15 },
            "showarrow": false,
        }],
    });

    Some(Chart::new(
        "packet_delivery",
        "Received vs lost packets",
        Section::Flow,
        data,
        layout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, FlowAnalyzer, InterruptionExtractor};
    use crate::dataset::FlowRecord;

    fn sample(time: f64, station: u64, ap: u64, rssi: f64) -> RssiSample {
        RssiSample {
            time,
            station_id: NodeId::from(station),
            ap_id: NodeId::from(ap),
            pos_x: time,
            pos_y: 0.0,
            rssi,
        }
    }

    #[test]
    fn test_rssi_evolution_limits_stations() {
        let samples: Vec<RssiSample> = (0..7)
            .flat_map(|station| vec![sample(0.0, station, 0, -50.0), sample(1.0, station, 1, -60.0)])
            .collect();

        let chart = rssi_evolution(&samples, None, -70.0, 5).unwrap();

        let traces = chart.figure["data"].as_array().unwrap();
        assert_eq!(traces.len(), 10);
        assert_eq!(chart.figure["layout"]["height"], json!(1500));
        assert!(chart.figure["layout"].get("yaxis5").is_some());
        assert!(chart.figure["layout"].get("yaxis6").is_none());
        assert_eq!(chart.figure["layout"]["shapes"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_rssi_evolution_marks_handovers() {
        let samples = vec![sample(0.0, 0, 0, -50.0), sample(1.0, 0, 0, -55.0)];
        let events = vec![StationEvent::new(0u64, 0.5, EventKind::Handover)];

        let chart = rssi_evolution(&samples, Some(&events), -70.0, 5).unwrap();

        let traces = chart.figure["data"].as_array().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[1]["name"], json!("Handover"));
        assert_eq!(traces[1]["y"], json!([-70.0]));
    }

    #[test]
    fn test_event_timeline_skips_absent_kinds() {
        let events = vec![
            StationEvent::new(0u64, 1.0, EventKind::Association),
            StationEvent::new(0u64, 2.0, EventKind::Handover),
        ];

        let chart = event_timeline(&events);
        let traces = chart.figure["data"].as_array().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[1]["customdata"], json!([["?", "?"]]));
    }

    #[test]
    fn test_handover_charts_need_data() {
        let analysis = InterruptionExtractor::extract(&[]);
        assert!(handovers_by_station(&analysis.summary).is_none());
        assert!(interruption_durations(&analysis.interruptions).is_none());
        assert!(handover_map(&[]).is_none());
    }

    #[test]
    fn test_flow_bars_group_by_source() {
        let records = vec![
            FlowRecord {
                flow_id: NodeId::Numeric(1),
                source: Some("10.1.1.1".to_string()),
                throughput_kbps: Some(100.0),
                tx_packets: Some(10),
                rx_packets: Some(9),
                lost_packets: Some(1),
                ..Default::default()
            },
            FlowRecord {
                flow_id: NodeId::Numeric(2),
                source: Some("10.1.1.2".to_string()),
                throughput_kbps: Some(50.0),
                ..Default::default()
            },
        ];
        let analysis = FlowAnalyzer.analyze(&records).unwrap();

        let chart = flow_throughput(&analysis).unwrap();
        assert_eq!(chart.figure["data"].as_array().unwrap().len(), 2);
        assert!(flow_delay(&analysis).is_none());

        let donut = packet_delivery(&analysis).unwrap();
        assert_eq!(donut.figure["data"][0]["values"], json!([9, 1]));
    }
}
