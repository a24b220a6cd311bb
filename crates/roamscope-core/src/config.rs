use crate::dataset::NodeId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_RSSI_FILE: &str = "rssi_measurements.csv";
pub const DEFAULT_HANDOVER_FILE: &str = "handover_events.csv";
pub const DEFAULT_FLOW_FILE: &str = "flow_stats.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "wifi_analysis_report.html";

/// Inputs and rendering knobs of one report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub rssi_path: PathBuf,
    pub handover_path: PathBuf,
    pub flow_path: PathBuf,
    pub output_path: PathBuf,
    /// ON duration of the traffic generator, in seconds
    pub on_time: f64,
    /// OFF duration of the traffic generator, in seconds
    pub off_time: f64,
    /// Typical roaming threshold drawn on RSSI charts (dBm)
    pub rssi_threshold_dbm: f64,
    /// Number of stations plotted in the RSSI evolution chart
    pub max_rssi_stations: usize,
    pub heatmap_station: NodeId,
    pub heatmap_x_bins: usize,
    pub heatmap_y_bins: usize,
    /// Abort instead of omitting the handover section on invalid events
    pub strict: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rssi_path: PathBuf::from(DEFAULT_RSSI_FILE),
            handover_path: PathBuf::from(DEFAULT_HANDOVER_FILE),
            flow_path: PathBuf::from(DEFAULT_FLOW_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            on_time: 1.0,
            off_time: 0.0,
            rssi_threshold_dbm: -70.0,
            max_rssi_stations: 5,
            heatmap_station: NodeId::Numeric(0),
            heatmap_x_bins: 20,
            heatmap_y_bins: 10,
            strict: false,
        }
    }
}

impl ReportConfig {
    /// Share of time the traffic generator is ON, in percent (one decimal)
    pub fn on_ratio(&self) -> f64 {
        let total = self.on_time + self.off_time;
        if total > 0.0 {
            (1000.0 * self.on_time / total).round() / 10.0
        } else {
            100.0
        }
    }
}
