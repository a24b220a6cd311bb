use super::{Analyzer, LinkRssi, RssiStats, mean};
use crate::Result;
use crate::dataset::{NodeId, RssiSample};
use std::collections::{BTreeMap, BTreeSet};

pub struct RssiAnalyzer;

impl Analyzer for RssiAnalyzer {
    type Input = [RssiSample];
    type Output = RssiStats;

    fn analyze(&self, samples: &[RssiSample]) -> Result<Self::Output> {
        tracing::debug!("Analyzing {} RSSI samples", samples.len());

        let stations: BTreeSet<&NodeId> = samples.iter().map(|s| &s.station_id).collect();
        let access_points: BTreeSet<&NodeId> = samples.iter().map(|s| &s.ap_id).collect();

        let mut per_link: BTreeMap<(&NodeId, &NodeId), Vec<f64>> = BTreeMap::new();
        for sample in samples {
            per_link
                .entry((&sample.station_id, &sample.ap_id))
                .or_default()
                .push(sample.rssi);
        }

        let links = per_link
            .into_iter()
            .map(|((station_id, ap_id), values)| LinkRssi {
                station_id: station_id.clone(),
                ap_id: ap_id.clone(),
                samples: values.len(),
                mean: mean(values.iter().copied()).unwrap_or_default(),
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
            .collect();

        let stats = RssiStats {
            total_samples: samples.len(),
            stations: stations.len(),
            access_points: access_points.len(),
            min_rssi: samples.iter().map(|s| s.rssi).reduce(f64::min),
            max_rssi: samples.iter().map(|s| s.rssi).reduce(f64::max),
            mean_rssi: mean(samples.iter().map(|s| s.rssi)),
            sim_duration: samples.iter().map(|s| s.time).fold(0.0, f64::max),
            links,
        };

        tracing::info!(
            "RSSI analysis complete: {} samples, {} stations, {} access points",
            stats.total_samples,
            stats.stations,
            stats.access_points
        );

        Ok(stats)
    }
}
