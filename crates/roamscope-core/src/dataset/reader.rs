use super::types::{EventRecord, FlowRecord, RssiSample};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Required columns of each table, each with its accepted spellings
const EVENT_COLUMNS: &[&[&str]] = &[&["Time"], &["EventType", "Event"], &["StationID", "Station"]];
const RSSI_COLUMNS: &[&[&str]] = &[
    &["Time"],
    &["StationID"],
    &["APID"],
    &["PosX"],
    &["PosY"],
    &["RSSI"],
];
const FLOW_COLUMNS: &[&[&str]] = &[&["FlowID"]];

pub struct DatasetReader;

impl DatasetReader {
    /// Read the raw handover events table from the given path
    pub fn events_from_file(path: &Path) -> Result<Vec<EventRecord>> {
        tracing::debug!("Reading handover events from: {}", path.display());
        let records = Self::events_from_reader(BufReader::new(File::open(path)?))?;
        tracing::info!("Loaded {} events from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn events_from_str(content: &str) -> Result<Vec<EventRecord>> {
        Self::events_from_reader(content.as_bytes())
    }

    /// Rows are kept raw so that validation can report the offending line
    pub fn events_from_reader<R: Read>(reader: R) -> Result<Vec<EventRecord>> {
        let rows = read_table::<EventRecord, R>("handover events", EVENT_COLUMNS, reader)?;
        Ok(rows
            .into_iter()
            .map(|(line, mut record)| {
                record.line = line;
                record
            })
            .collect())
    }

    /// Read RSSI samples from the given path
    pub fn rssi_from_file(path: &Path) -> Result<Vec<RssiSample>> {
        tracing::debug!("Reading RSSI samples from: {}", path.display());
        let samples = Self::rssi_from_reader(BufReader::new(File::open(path)?))?;
        tracing::info!("Loaded {} RSSI samples from {}", samples.len(), path.display());
        Ok(samples)
    }

    pub fn rssi_from_str(content: &str) -> Result<Vec<RssiSample>> {
        Self::rssi_from_reader(content.as_bytes())
    }

    pub fn rssi_from_reader<R: Read>(reader: R) -> Result<Vec<RssiSample>> {
        let rows = read_table::<RssiSample, R>("RSSI measurements", RSSI_COLUMNS, reader)?;
        Ok(rows.into_iter().map(|(_, sample)| sample).collect())
    }

    /// Read flow statistics from the given path
    pub fn flows_from_file(path: &Path) -> Result<Vec<FlowRecord>> {
        tracing::debug!("Reading flow statistics from: {}", path.display());
        let flows = Self::flows_from_reader(BufReader::new(File::open(path)?))?;
        tracing::info!("Loaded {} flow records from {}", flows.len(), path.display());
        Ok(flows)
    }

    pub fn flows_from_str(content: &str) -> Result<Vec<FlowRecord>> {
        Self::flows_from_reader(content.as_bytes())
    }

    pub fn flows_from_reader<R: Read>(reader: R) -> Result<Vec<FlowRecord>> {
        let rows = read_table::<FlowRecord, R>("flow statistics", FLOW_COLUMNS, reader)?;
        Ok(rows.into_iter().map(|(_, flow)| flow).collect())
    }
}

/// Deserialize every row of a headed CSV table, paired with its line number
fn read_table<T, R>(dataset: &'static str, required: &[&[&'static str]], reader: R) -> Result<Vec<(u64, T)>>
where
    T: DeserializeOwned,
    R: Read,
{
    // Association rows carry fewer access point columns than handover rows
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for spellings in required {
        if !headers.iter().any(|h| spellings.iter().any(|s| *s == h)) {
            return Err(Error::MissingColumn {
                dataset,
                column: spellings[0],
            });
        }
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: T = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }

    tracing::debug!("Parsed {} rows of {}", rows.len(), dataset);
    Ok(rows)
}
