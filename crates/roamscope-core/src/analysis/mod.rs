mod flow;
mod heatmap;
mod interruption;
mod positions;
mod rssi;

pub use flow::FlowAnalyzer;
pub use heatmap::RssiHeatmapBuilder;
pub use interruption::InterruptionExtractor;
pub use positions::HandoverPositionLocator;
pub use rssi::RssiAnalyzer;

use crate::dataset::{EventKind, NodeId};
use serde::{Deserialize, Serialize};

/// Statistics of every dataset that was available for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<RssiStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handovers: Option<HandoverAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<FlowAnalysis>,
}

/// A gap in connectivity between a disassociation and the next reconnect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interruption {
    pub station_id: NodeId,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    /// Event that restored connectivity
    pub ended_by: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationHandovers {
    pub station_id: NodeId,
    pub handovers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverSummary {
    pub total_events: usize,
    pub total_stations: usize,
    pub total_handovers: usize,
    pub stations_with_handovers: usize,
    pub mean_handovers_per_station: f64,
    pub first_handover_time: Option<f64>,
    pub last_handover_time: Option<f64>,
    pub mean_interruption_duration: f64,
    /// Observed event time span divided by the handover count (at least 1)
    pub mean_time_between_handovers: f64,
    pub handovers_by_station: Vec<StationHandovers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverAnalysis {
    pub interruptions: Vec<Interruption>,
    pub summary: HandoverSummary,
}

/// RSSI aggregates for one station/access point pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRssi {
    pub station_id: NodeId,
    pub ap_id: NodeId,
    pub samples: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiStats {
    pub total_samples: usize,
    pub stations: usize,
    pub access_points: usize,
    pub min_rssi: Option<f64>,
    pub max_rssi: Option<f64>,
    pub mean_rssi: Option<f64>,
    /// Latest sample time, in seconds
    pub sim_duration: f64,
    pub links: Vec<LinkRssi>,
}

/// Mean RSSI per position cell, one layer per access point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiHeatmap {
    pub station_id: NodeId,
    pub x_bins: usize,
    pub y_bins: usize,
    pub layers: Vec<HeatmapLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapLayer {
    pub ap_id: NodeId,
    /// `cells[y][x]`, `None` where the station never reported from
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Where a station was when it handed over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverPosition {
    pub time: f64,
    pub station_id: NodeId,
    pub pos_x: f64,
    pub pos_y: f64,
    pub from_ap: Option<String>,
    pub to_ap: Option<String>,
}

/// Metrics of one flow, read from the table or derived from its counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub flow_id: NodeId,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub throughput_kbps: Option<f64>,
    pub loss_rate: Option<f64>,
    pub mean_delay: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStats {
    pub total_flows: usize,
    pub avg_throughput_kbps: Option<f64>,
    pub max_throughput_kbps: Option<f64>,
    pub avg_loss_rate: Option<f64>,
    pub avg_delay: Option<f64>,
    pub total_tx_packets: u64,
    pub total_rx_packets: u64,
    pub total_lost_packets: u64,
    /// Lost over transmitted packets across all flows, in percent
    pub packet_loss_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAnalysis {
    pub flows: Vec<FlowMetrics>,
    pub stats: FlowStats,
}

pub trait Analyzer {
    type Input: ?Sized;
    type Output;

    fn analyze(&self, input: &Self::Input) -> crate::Result<Self::Output>;
}

/// Arithmetic mean, `None` for an empty input
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
