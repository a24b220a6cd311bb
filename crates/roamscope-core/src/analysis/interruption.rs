use super::{Analyzer, HandoverAnalysis, HandoverSummary, Interruption, StationHandovers, mean};
use crate::Result;
use crate::dataset::{EventKind, EventRecord, NodeId, StationEvent, validate_events};
use std::collections::BTreeMap;

/// Detects handover-caused service interruptions in a station event table
///
/// Each station's events are ordered by time (input order on ties) and
/// scanned pairwise: a disassociation immediately followed by an
/// association or a handover is one interruption. A disassociation that is
/// never followed by a reconnect has no end time and is not reported.
pub struct InterruptionExtractor;

impl InterruptionExtractor {
    /// Validate raw rows, then extract; any malformed row fails the whole run
    pub fn extract_records(records: &[EventRecord]) -> Result<HandoverAnalysis> {
        tracing::debug!("Validating {} event rows", records.len());
        let events = validate_events(records)?;
        Ok(Self::extract(&events))
    }

    pub fn extract(events: &[StationEvent]) -> HandoverAnalysis {
        tracing::debug!("Extracting interruptions from {} events", events.len());

        let timelines = station_timelines(events);
        let interruptions = scan_interruptions(&timelines);
        let summary = summarize(events, timelines.len(), &interruptions);

        tracing::info!(
            "Handover analysis complete: {} handovers, {} interruptions, mean interruption={:.4}s",
            summary.total_handovers,
            interruptions.len(),
            summary.mean_interruption_duration
        );

        HandoverAnalysis {
            interruptions,
            summary,
        }
    }
}

impl Analyzer for InterruptionExtractor {
    type Input = [EventRecord];
    type Output = HandoverAnalysis;

    fn analyze(&self, records: &[EventRecord]) -> Result<Self::Output> {
        Self::extract_records(records)
    }
}

/// Partition events by station, each partition sorted by time
fn station_timelines(events: &[StationEvent]) -> BTreeMap<&NodeId, Vec<&StationEvent>> {
    let mut timelines: BTreeMap<&NodeId, Vec<&StationEvent>> = BTreeMap::new();
    for event in events {
        timelines.entry(&event.station_id).or_default().push(event);
    }

    // sort_by is stable, so equal times keep their input order
    for timeline in timelines.values_mut() {
        timeline.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    timelines
}

fn scan_interruptions(timelines: &BTreeMap<&NodeId, Vec<&StationEvent>>) -> Vec<Interruption> {
    let mut interruptions = Vec::new();

    for (station_id, timeline) in timelines {
        for pair in timeline.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if previous.kind == EventKind::Disassociation && current.kind.is_reconnect() {
                interruptions.push(Interruption {
                    station_id: (*station_id).clone(),
                    start_time: previous.time,
                    end_time: current.time,
                    duration: current.time - previous.time,
                    ended_by: current.kind,
                });
            }
        }
    }

    interruptions
}

fn summarize(
    events: &[StationEvent],
    total_stations: usize,
    interruptions: &[Interruption],
) -> HandoverSummary {
    let handovers: Vec<&StationEvent> = events
        .iter()
        .filter(|e| e.kind == EventKind::Handover)
        .collect();

    let mut by_station: BTreeMap<&NodeId, usize> = BTreeMap::new();
    for handover in &handovers {
        *by_station.entry(&handover.station_id).or_default() += 1;
    }

    let total_handovers = handovers.len();
    let stations_with_handovers = by_station.len();
    let mean_handovers_per_station = if stations_with_handovers > 0 {
        total_handovers as f64 / stations_with_handovers as f64
    } else {
        0.0
    };

    let first_handover_time = handovers.iter().map(|e| e.time).reduce(f64::min);
    let last_handover_time = handovers.iter().map(|e| e.time).reduce(f64::max);

    let mean_interruption_duration = mean(interruptions.iter().map(|i| i.duration)).unwrap_or(0.0);

    let span = match (
        events.iter().map(|e| e.time).reduce(f64::min),
        events.iter().map(|e| e.time).reduce(f64::max),
    ) {
        (Some(start), Some(end)) => end - start,
        _ => 0.0,
    };
    let mean_time_between_handovers = span / total_handovers.max(1) as f64;

    HandoverSummary {
        total_events: events.len(),
        total_stations,
        total_handovers,
        stations_with_handovers,
        mean_handovers_per_station,
        first_handover_time,
        last_handover_time,
        mean_interruption_duration,
        mean_time_between_handovers,
        handovers_by_station: by_station
            .into_iter()
            .map(|(station_id, handovers)| StationHandovers {
                station_id: station_id.clone(),
                handovers,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const EPSILON: f64 = 1e-9;

    fn event(station: &str, time: f64, kind: EventKind) -> StationEvent {
        StationEvent::new(station, time, kind)
    }

    #[test]
    fn test_disassociation_then_handover() {
        let events = vec![
            event("STA1", 1.0, EventKind::Association),
            event("STA1", 5.0, EventKind::Disassociation),
            event("STA1", 5.3, EventKind::Handover),
        ];

        let analysis = InterruptionExtractor::extract(&events);

        assert_eq!(analysis.interruptions.len(), 1);
        let interruption = &analysis.interruptions[0];
        assert_eq!(interruption.station_id, NodeId::from("STA1"));
        assert_eq!(interruption.start_time, 5.0);
        assert_eq!(interruption.end_time, 5.3);
        assert!((interruption.duration - 0.3).abs() < EPSILON);
        assert_eq!(interruption.ended_by, EventKind::Handover);

        let summary = &analysis.summary;
        assert_eq!(summary.total_handovers, 1);
        assert_eq!(summary.stations_with_handovers, 1);
        assert_eq!(summary.mean_handovers_per_station, 1.0);
        assert_eq!(summary.first_handover_time, Some(5.3));
        assert_eq!(summary.last_handover_time, Some(5.3));
        assert!((summary.mean_interruption_duration - 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_lone_disassociation() {
        let events = vec![event("STA2", 2.0, EventKind::Disassociation)];

        let analysis = InterruptionExtractor::extract(&events);

        assert!(analysis.interruptions.is_empty());
        assert_eq!(analysis.summary.total_handovers, 0);
        assert_eq!(analysis.summary.stations_with_handovers, 0);
        assert_eq!(analysis.summary.mean_handovers_per_station, 0.0);
        assert_eq!(analysis.summary.first_handover_time, None);
        assert_eq!(analysis.summary.last_handover_time, None);
        assert_eq!(analysis.summary.mean_interruption_duration, 0.0);
        assert_eq!(analysis.summary.total_stations, 1);
    }

    #[test]
    fn test_mean_interruption_across_stations() {
        let events = vec![
            event("STA1", 5.0, EventKind::Disassociation),
            event("STA2", 1.0, EventKind::Disassociation),
            event("STA1", 5.3, EventKind::Association),
            event("STA2", 1.7, EventKind::Association),
        ];

        let analysis = InterruptionExtractor::extract(&events);

        assert_eq!(analysis.interruptions.len(), 2);
        assert!((analysis.summary.mean_interruption_duration - 0.5).abs() < EPSILON);
        assert_eq!(analysis.summary.total_handovers, 0);
    }

    #[test]
    fn test_unsorted_input_is_ordered_per_station() {
        let events = vec![
            event("0", 5.3, EventKind::Handover),
            event("0", 1.0, EventKind::Association),
            event("0", 5.0, EventKind::Disassociation),
        ];

        let analysis = InterruptionExtractor::extract(&events);

        assert_eq!(analysis.interruptions.len(), 1);
        assert_eq!(analysis.interruptions[0].start_time, 5.0);
        assert_eq!(analysis.interruptions[0].end_time, 5.3);
    }

    #[test]
    fn test_consecutive_disassociations_pair_only_the_last() {
        let events = vec![
            event("0", 1.0, EventKind::Disassociation),
            event("0", 2.0, EventKind::Disassociation),
            event("0", 2.5, EventKind::Association),
        ];

        let analysis = InterruptionExtractor::extract(&events);

        assert_eq!(analysis.interruptions.len(), 1);
        assert_eq!(analysis.interruptions[0].start_time, 2.0);
        assert!((analysis.interruptions[0].duration - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_soft_handover_counts_without_interruption() {
        let events = vec![
            event("0", 1.0, EventKind::Association),
            event("0", 4.0, EventKind::Handover),
            event("0", 9.0, EventKind::Handover),
        ];

        let analysis = InterruptionExtractor::extract(&events);

        assert!(analysis.interruptions.is_empty());
        assert_eq!(analysis.summary.total_handovers, 2);
        assert_eq!(analysis.summary.first_handover_time, Some(4.0));
        assert_eq!(analysis.summary.last_handover_time, Some(9.0));
        assert_eq!(analysis.summary.mean_time_between_handovers, 4.0);
    }

    #[test]
    fn test_associations_only() {
        let events = vec![
            event("0", 1.0, EventKind::Association),
            event("0", 3.0, EventKind::Association),
        ];

        let analysis = InterruptionExtractor::extract(&events);
        assert!(analysis.interruptions.is_empty());
    }

    #[test]
    fn test_equal_times_keep_input_order() {
        let events = vec![
            event("0", 3.0, EventKind::Disassociation),
            event("0", 3.0, EventKind::Handover),
        ];

        let analysis = InterruptionExtractor::extract(&events);
        assert_eq!(analysis.interruptions.len(), 1);
        assert_eq!(analysis.interruptions[0].duration, 0.0);

        let reversed = vec![
            event("0", 3.0, EventKind::Handover),
            event("0", 3.0, EventKind::Disassociation),
        ];
        let analysis = InterruptionExtractor::extract(&reversed);
        assert!(analysis.interruptions.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let analysis = InterruptionExtractor::extract(&[]);

        assert!(analysis.interruptions.is_empty());
        assert_eq!(analysis.summary.total_events, 0);
        assert_eq!(analysis.summary.total_stations, 0);
        assert_eq!(analysis.summary.mean_handovers_per_station, 0.0);
        assert_eq!(analysis.summary.mean_interruption_duration, 0.0);
        assert_eq!(analysis.summary.mean_time_between_handovers, 0.0);
        assert!(analysis.summary.handovers_by_station.is_empty());
    }

    #[test]
    fn test_handovers_by_station() {
        let events = vec![
            event("2", 1.0, EventKind::Handover),
            event("10", 2.0, EventKind::Handover),
            event("2", 3.0, EventKind::Handover),
            event("5", 4.0, EventKind::Association),
        ];

        let analysis = InterruptionExtractor::extract(&events);
        let counts: Vec<(String, usize)> = analysis
            .summary
            .handovers_by_station
            .iter()
            .map(|s| (s.station_id.to_string(), s.handovers))
            .collect();

        assert_eq!(counts, vec![("2".to_string(), 2), ("10".to_string(), 1)]);
        assert_eq!(analysis.summary.stations_with_handovers, 2);
        assert_eq!(analysis.summary.total_stations, 3);
        assert_eq!(analysis.summary.mean_handovers_per_station, 1.5);
    }

    #[test]
    fn test_malformed_record_fails_extraction() {
        let records = vec![
            EventRecord {
                line: 2,
                time: Some("1.0".to_string()),
                event_kind: Some("ASSOC".to_string()),
                station_id: Some("0".to_string()),
                ..Default::default()
            },
            EventRecord {
                line: 3,
                time: Some("2.0".to_string()),
                event_kind: Some("REBOOT".to_string()),
                station_id: Some("0".to_string()),
                ..Default::default()
            },
        ];

        let result = InterruptionExtractor.analyze(&records);
        match result {
            Err(Error::Validation { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("REBOOT"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
