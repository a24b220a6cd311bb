use proptest::prelude::*;
use roamscope_core::analysis::InterruptionExtractor;
use roamscope_core::dataset::{EventKind, StationEvent};

fn kind(index: u8) -> EventKind {
    match index {
        0 => EventKind::Association,
        1 => EventKind::Disassociation,
        _ => EventKind::Handover,
    }
}

prop_compose! {
    /// Events for a handful of stations, every event at a distinct time
    fn arb_events()(
        rows in prop::collection::vec((0u64..5, 0u8..3, 1u32..20), 0..80),
    ) -> Vec<StationEvent> {
        let mut time = 0.0;
        rows.into_iter()
            .map(|(station, k, step)| {
                time += step as f64 * 0.05;
                StationEvent::new(station, time, kind(k))
            })
            .collect()
    }
}

prop_compose! {
    fn arb_reordered_events()(events in arb_events())(
        shuffled in Just(events.clone()).prop_shuffle(),
        events in Just(events),
    ) -> (Vec<StationEvent>, Vec<StationEvent>) {
        (events, shuffled)
    }
}

proptest! {
    /// Property: row order of the input does not change the result
    #[test]
    fn prop_reorder_invariant((events, shuffled) in arb_reordered_events()) {
        let original = InterruptionExtractor::extract(&events);
        let reordered = InterruptionExtractor::extract(&shuffled);
        prop_assert_eq!(original, reordered);
    }

    /// Property: interruptions never run backwards and start at a disassociation
    #[test]
    fn prop_interruptions_well_formed(events in arb_events()) {
        let analysis = InterruptionExtractor::extract(&events);
        let disassociations = events
            .iter()
            .filter(|e| e.kind == EventKind::Disassociation)
            .count();

        prop_assert!(analysis.interruptions.len() <= disassociations);
        for interruption in &analysis.interruptions {
            prop_assert!(interruption.duration >= 0.0);
            prop_assert!(interruption.ended_by.is_reconnect());
            let has_matching_disassociation = events.iter().any(|e| {
                e.station_id == interruption.station_id
                    && e.time == interruption.start_time
                    && e.kind == EventKind::Disassociation
            });
            prop_assert!(has_matching_disassociation);
        }
    }

    /// Property: handover counts add up across stations
    #[test]
    fn prop_handover_counts_consistent(events in arb_events()) {
        let summary = InterruptionExtractor::extract(&events).summary;
        let per_station: usize = summary.handovers_by_station.iter().map(|s| s.handovers).sum();

        prop_assert_eq!(per_station, summary.total_handovers);
        prop_assert_eq!(summary.handovers_by_station.len(), summary.stations_with_handovers);
        if summary.total_handovers == 0 {
            prop_assert_eq!(summary.mean_handovers_per_station, 0.0);
            prop_assert!(summary.first_handover_time.is_none());
        }
    }
}
