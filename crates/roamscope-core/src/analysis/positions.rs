use super::HandoverPosition;
use crate::dataset::{EventKind, NodeId, RssiSample, StationEvent};
use std::collections::BTreeMap;

/// Places each handover at the station position sampled closest in time
pub struct HandoverPositionLocator;

impl HandoverPositionLocator {
    pub fn locate(events: &[StationEvent], samples: &[RssiSample]) -> Vec<HandoverPosition> {
        let mut by_station: BTreeMap<&NodeId, Vec<&RssiSample>> = BTreeMap::new();
        for sample in samples {
            by_station.entry(&sample.station_id).or_default().push(sample);
        }

        let mut handovers: Vec<&StationEvent> = events
            .iter()
            .filter(|e| e.kind == EventKind::Handover)
            .collect();
        handovers.sort_by(|a, b| a.time.total_cmp(&b.time));

        let positions: Vec<HandoverPosition> = handovers
            .into_iter()
            .filter_map(|handover| {
                let track = by_station.get(&handover.station_id)?;
                // min_by keeps the first sample on equal distances
                let closest = track.iter().min_by(|a, b| {
                    (a.time - handover.time)
                        .abs()
                        .total_cmp(&(b.time - handover.time).abs())
                })?;
                Some(HandoverPosition {
                    time: handover.time,
                    station_id: handover.station_id.clone(),
                    pos_x: closest.pos_x,
                    pos_y: closest.pos_y,
                    from_ap: handover.from_ap.clone(),
                    to_ap: handover.to_ap.clone(),
                })
            })
            .collect();

        tracing::debug!("Located {} handover positions", positions.len());
        positions
    }
}
