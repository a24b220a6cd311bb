use crate::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a station or access point
///
/// Simulators export plain integers, but hand-written datasets often use
/// labels such as `STA1`. Numeric ids sort before named ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    Numeric(u64),
    Named(String),
}

impl NodeId {
    /// Parse a raw cell value, preferring the numeric form
    ///
    /// Integral float spellings such as `1.0` are numeric, so an id written
    /// by a float column matches the same id written as an integer.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<u64>() {
            return NodeId::Numeric(n);
        }
        match trimmed.parse::<f64>().ok().and_then(integral) {
            Some(n) => NodeId::Numeric(n),
            None => NodeId::Named(trimmed.to_string()),
        }
    }
}

/// The value of a float holding a non-negative integer that fits in a `u64`
fn integral(v: f64) -> Option<u64> {
    (v.is_finite() && v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64).then_some(v as u64)
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId::Numeric(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::parse(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Numeric(n) => write!(f, "{}", n),
            NodeId::Named(name) => f.write_str(name),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NodeId::Numeric(n) => serializer.serialize_u64(*n),
            NodeId::Named(name) => serializer.serialize_str(name),
        }
    }
}

struct NodeIdVisitor;

impl Visitor<'_> for NodeIdVisitor {
    type Value = NodeId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or string identifier")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<NodeId, E> {
        Ok(NodeId::Numeric(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<NodeId, E> {
        match u64::try_from(v) {
            Ok(n) => Ok(NodeId::Numeric(n)),
            Err(_) => Ok(NodeId::Named(v.to_string())),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<NodeId, E> {
        Ok(match integral(v) {
            Some(n) => NodeId::Numeric(n),
            None => NodeId::Named(v.to_string()),
        })
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<NodeId, E> {
        if v.trim().is_empty() {
            return Err(E::custom("empty identifier"));
        }
        Ok(NodeId::parse(v))
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NodeIdVisitor)
    }
}

/// Kind of a station state-transition event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Association,
    Disassociation,
    Handover,
}

impl EventKind {
    /// Parse the token written in the `EventType` column (case-insensitive)
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "ASSOC" | "ASSOCIATION" => Some(EventKind::Association),
            "DEASSOC" | "DISASSOC" | "DISASSOCIATION" => Some(EventKind::Disassociation),
            "HANDOVER" => Some(EventKind::Handover),
            _ => None,
        }
    }

    /// Token used by the simulator when exporting this kind
    pub fn token(&self) -> &'static str {
        match self {
            EventKind::Association => "ASSOC",
            EventKind::Disassociation => "DEASSOC",
            EventKind::Handover => "HANDOVER",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Association => "Association",
            EventKind::Disassociation => "Disassociation",
            EventKind::Handover => "Handover",
        }
    }

    /// Whether this event restores connectivity after a disassociation
    pub fn is_reconnect(&self) -> bool {
        matches!(self, EventKind::Association | EventKind::Handover)
    }
}

/// Raw row of the handover events table, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    /// Line of the row in its source file (header is line 1)
    #[serde(skip)]
    pub line: u64,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "EventType", alias = "Event", default)]
    pub event_kind: Option<String>,
    #[serde(rename = "StationID", alias = "Station", default)]
    pub station_id: Option<String>,
    #[serde(rename = "AccessPoint1", default)]
    pub access_point1: Option<String>,
    #[serde(rename = "AccessPoint2", default)]
    pub access_point2: Option<String>,
}

impl EventRecord {
    /// Validate the row into a typed event
    pub fn validate(&self) -> Result<StationEvent> {
        let station_id = non_empty(&self.station_id)
            .map(NodeId::parse)
            .ok_or_else(|| self.invalid("missing StationID".to_string()))?;

        let raw_time = non_empty(&self.time)
            .ok_or_else(|| self.invalid("missing Time".to_string()))?;
        let time: f64 = raw_time
            .parse()
            .map_err(|_| self.invalid(format!("Time '{}' is not a number", raw_time)))?;
        if !time.is_finite() {
            return Err(self.invalid(format!("Time '{}' is not finite", raw_time)));
        }

        let raw_kind = non_empty(&self.event_kind)
            .ok_or_else(|| self.invalid("missing EventType".to_string()))?;
        let kind = EventKind::parse(raw_kind)
            .ok_or_else(|| self.invalid(format!("unrecognized EventType '{}'", raw_kind)))?;

        Ok(StationEvent {
            station_id,
            time,
            kind,
            from_ap: non_empty(&self.access_point1).map(str::to_string),
            to_ap: non_empty(&self.access_point2).map(str::to_string),
        })
    }

    fn invalid(&self, message: String) -> Error {
        Error::Validation {
            line: self.line,
            message,
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validate a whole event table; the first malformed row aborts
pub fn validate_events(records: &[EventRecord]) -> Result<Vec<StationEvent>> {
    records.iter().map(EventRecord::validate).collect()
}

/// One observed state-transition event for a station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationEvent {
    pub station_id: NodeId,
    pub time: f64,
    pub kind: EventKind,
    /// Access point left (handover) or attached to/detached from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_ap: Option<String>,
    /// Destination access point of a handover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_ap: Option<String>,
}

impl StationEvent {
    pub fn new(station_id: impl Into<NodeId>, time: f64, kind: EventKind) -> Self {
        Self {
            station_id: station_id.into(),
            time,
            kind,
            from_ap: None,
            to_ap: None,
        }
    }
}

/// Signal strength sample of one station towards one access point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiSample {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "StationID")]
    pub station_id: NodeId,
    #[serde(rename = "APID")]
    pub ap_id: NodeId,
    #[serde(rename = "PosX")]
    pub pos_x: f64,
    #[serde(rename = "PosY")]
    pub pos_y: f64,
    #[serde(rename = "RSSI")]
    pub rssi: f64,
}

/// Per-flow statistics exported by the flow monitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "FlowID")]
    pub flow_id: NodeId,
    #[serde(rename = "Source", default)]
    pub source: Option<String>,
    #[serde(rename = "Destination", default)]
    pub destination: Option<String>,
    #[serde(rename = "TxPackets", default)]
    pub tx_packets: Option<u64>,
    #[serde(rename = "RxPackets", default)]
    pub rx_packets: Option<u64>,
    #[serde(rename = "LostPackets", default)]
    pub lost_packets: Option<u64>,
    #[serde(rename = "DelaySum", default)]
    pub delay_sum: Option<f64>,
    #[serde(rename = "JitterSum", default)]
    pub jitter_sum: Option<f64>,
    #[serde(rename = "LastDelay", default)]
    pub last_delay: Option<f64>,
    #[serde(rename = "TxBytes", default)]
    pub tx_bytes: Option<u64>,
    #[serde(rename = "RxBytes", default)]
    pub rx_bytes: Option<u64>,
    #[serde(rename = "Duration", default)]
    pub duration: Option<f64>,
    #[serde(rename = "Throughput(Kbps)", alias = "Throughput", default)]
    pub throughput_kbps: Option<f64>,
    #[serde(rename = "LossRate", default)]
    pub loss_rate: Option<f64>,
    #[serde(rename = "MeanDelay", default)]
    pub mean_delay: Option<f64>,
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::Numeric(0)
    }
}
