pub mod charts;
mod html;
mod writer;

pub use charts::{Chart, Section};
pub use html::{HtmlRenderer, escape_html};
pub use writer::ReportWriter;

use crate::analysis::{
    AnalysisReport, Analyzer, FlowAnalyzer, HandoverPosition, HandoverPositionLocator,
    InterruptionExtractor, RssiAnalyzer, RssiHeatmap, RssiHeatmapBuilder,
};
use crate::dataset::{
    DatasetReader, EventRecord, FlowRecord, RssiSample, StationEvent, validate_events,
};
use crate::{Error, ReportConfig, Result};
use std::path::Path;

/// The three simulation tables, each optional
///
/// A table that exists but cannot be read is kept as an error message in
/// `errors`, so that the report builder decides whether the run goes on.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub rssi: Option<Vec<RssiSample>>,
    pub events: Option<Vec<EventRecord>>,
    pub flows: Option<Vec<FlowRecord>>,
    pub errors: LoadErrors,
}

/// Read failures of the datasets whose file was present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadErrors {
    pub rssi: Option<String>,
    pub events: Option<String>,
    pub flows: Option<String>,
}

impl Datasets {
    /// Load every dataset named by the configuration, skipping missing files
    pub fn load(config: &ReportConfig) -> Self {
        let mut errors = LoadErrors::default();
        let rssi = load_optional(
            &config.rssi_path,
            "RSSI",
            DatasetReader::rssi_from_file,
            &mut errors.rssi,
        );
        let events = load_optional(
            &config.handover_path,
            "handover",
            DatasetReader::events_from_file,
            &mut errors.events,
        );
        let flows = load_optional(
            &config.flow_path,
            "flow",
            DatasetReader::flows_from_file,
            &mut errors.flows,
        );

        Self {
            rssi,
            events,
            flows,
            errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rssi.is_none() && self.events.is_none() && self.flows.is_none()
    }
}

fn load_optional<T>(
    path: &Path,
    label: &str,
    read: impl FnOnce(&Path) -> Result<Vec<T>>,
    error: &mut Option<String>,
) -> Option<Vec<T>> {
    if !path.exists() {
        tracing::warn!(
            "{} file {} not found, skipping its section",
            label,
            path.display()
        );
        return None;
    }
    match read(path) {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::error!("Failed to load {} file {}: {}", label, path.display(), e);
            *error = Some(e.to_string());
            None
        }
    }
}

/// Everything the HTML page needs, computed once
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: String,
    pub config: ReportConfig,
    pub analysis: AnalysisReport,
    pub heatmap: Option<RssiHeatmap>,
    pub handover_positions: Vec<HandoverPosition>,
    /// Set when the RSSI table was present but could not be read
    pub rssi_error: Option<String>,
    /// Set when the event table was present but could not be read or validated
    pub handover_error: Option<String>,
    /// Set when the flow table was present but could not be read
    pub flow_error: Option<String>,
    pub charts: Vec<Chart>,
}

impl Report {
    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }
}

pub struct ReportBuilder {
    config: ReportConfig,
}

impl ReportBuilder {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, datasets: &Datasets) -> Result<Report> {
        let config = &self.config;
        let mut analysis = AnalysisReport::default();

        let rssi_error = self.load_error("RSSI", &datasets.errors.rssi)?;
        let mut handover_error = self.load_error("handover", &datasets.errors.events)?;
        let flow_error = self.load_error("flow", &datasets.errors.flows)?;

        // Empty RSSI and flow tables carry nothing to plot
        let rssi = datasets.rssi.as_deref().filter(|s| !s.is_empty());
        let flows = datasets.flows.as_deref().filter(|f| !f.is_empty());

        let events: Option<Vec<StationEvent>> = match datasets.events.as_deref() {
            Some(records) => match validate_events(records) {
                Ok(events) => Some(events),
                Err(e) if !config.strict => {
                    tracing::error!("Skipping handover analysis: {}", e);
                    handover_error = Some(e.to_string());
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        if let Some(samples) = rssi {
            analysis.rssi = Some(RssiAnalyzer.analyze(samples)?);
        }
        if let Some(events) = &events {
            analysis.handovers = Some(InterruptionExtractor::extract(events));
        }
        if let Some(records) = flows {
            analysis.flows = Some(FlowAnalyzer.analyze(records)?);
        }

        let heatmap = match rssi {
            Some(samples) => RssiHeatmapBuilder::new(
                config.heatmap_station.clone(),
                config.heatmap_x_bins,
                config.heatmap_y_bins,
            )
            .analyze(samples)?,
            None => None,
        };

        let handover_positions = match (&events, rssi) {
            (Some(events), Some(samples)) => HandoverPositionLocator::locate(events, samples),
            _ => Vec::new(),
        };

        let mut charts = Vec::new();

        if let Some(samples) = rssi {
            charts.extend(charts::rssi_evolution(
                samples,
                events.as_deref(),
                config.rssi_threshold_dbm,
                config.max_rssi_stations,
            ));
            charts.push(charts::rssi_distribution(samples, config.rssi_threshold_dbm));
            if let Some(heatmap) = &heatmap {
                charts.push(charts::rssi_heatmap(heatmap));
            }
        }

        if let (Some(events), Some(handovers)) = (&events, &analysis.handovers) {
            charts.push(charts::event_timeline(events));
            charts.extend(charts::handovers_by_station(&handovers.summary));
            charts.extend(charts::handover_map(&handover_positions));
            charts.extend(charts::interruption_durations(&handovers.interruptions));
        }

        if let Some(flows) = &analysis.flows {
            charts.extend(charts::flow_throughput(flows));
            charts.extend(charts::flow_loss_rate(flows));
            charts.extend(charts::packet_delivery(flows));
            charts.extend(charts::flow_delay(flows));
        }

        tracing::debug!("Built {} charts", charts.len());

        Ok(Report {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            config: config.clone(),
            analysis,
            heatmap,
            handover_positions,
            rssi_error,
            handover_error,
            flow_error,
            charts,
        })
    }

    /// Degrade a dataset read failure into a section message, or abort in strict mode
    fn load_error(&self, label: &str, error: &Option<String>) -> Result<Option<String>> {
        match error {
            Some(message) if self.config.strict => Err(Error::Report(format!(
                "{} dataset could not be loaded: {}",
                label, message
            ))),
            Some(message) => {
                tracing::error!("Skipping {} analysis: {}", label, message);
                Ok(Some(message.clone()))
            }
            None => Ok(None),
        }
    }
}
