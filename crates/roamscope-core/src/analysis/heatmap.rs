use super::{Analyzer, HeatmapLayer, RssiHeatmap};
use crate::Result;
use crate::dataset::{NodeId, RssiSample};
use std::collections::BTreeMap;

/// Bins one station's positions into an equal-width grid and averages RSSI per cell
pub struct RssiHeatmapBuilder {
    station_id: NodeId,
    x_bins: usize,
    y_bins: usize,
}

impl RssiHeatmapBuilder {
    pub fn new(station_id: NodeId, x_bins: usize, y_bins: usize) -> Self {
        Self {
            station_id,
            x_bins: x_bins.max(1),
            y_bins: y_bins.max(1),
        }
    }
}

impl Analyzer for RssiHeatmapBuilder {
    type Input = [RssiSample];
    type Output = Option<RssiHeatmap>;

    fn analyze(&self, samples: &[RssiSample]) -> Result<Self::Output> {
        let station: Vec<&RssiSample> = samples
            .iter()
            .filter(|s| s.station_id == self.station_id)
            .collect();

        if station.is_empty() {
            tracing::debug!("No RSSI samples for station {}, skipping heatmap", self.station_id);
            return Ok(None);
        }

        let x_range = range(station.iter().map(|s| s.pos_x));
        let y_range = range(station.iter().map(|s| s.pos_y));

        // (sum, count) per cell, per access point
        let mut grids: BTreeMap<&NodeId, Vec<Vec<(f64, usize)>>> = BTreeMap::new();
        for sample in &station {
            let x = bin_index(sample.pos_x, x_range, self.x_bins);
            let y = bin_index(sample.pos_y, y_range, self.y_bins);
            let grid = grids
                .entry(&sample.ap_id)
                .or_insert_with(|| vec![vec![(0.0, 0); self.x_bins]; self.y_bins]);
            let cell = &mut grid[y][x];
            cell.0 += sample.rssi;
            cell.1 += 1;
        }

        let layers = grids
            .into_iter()
            .map(|(ap_id, grid)| HeatmapLayer {
                ap_id: ap_id.clone(),
                cells: grid
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        Ok(Some(RssiHeatmap {
            station_id: self.station_id.clone(),
            x_bins: self.x_bins,
            y_bins: self.y_bins,
            layers,
        }))
    }
}

fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Equal-width bin of `value`; the maximum falls in the last bin
fn bin_index(value: f64, (lo, hi): (f64, f64), bins: usize) -> usize {
    if hi <= lo {
        return 0;
    }
    let index = ((value - lo) / (hi - lo) * bins as f64).floor() as usize;
    index.min(bins - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(station: u64, ap: u64, x: f64, y: f64, rssi: f64) -> RssiSample {
        RssiSample {
            time: 0.0,
            station_id: NodeId::from(station),
            ap_id: NodeId::from(ap),
            pos_x: x,
            pos_y: y,
            rssi,
        }
    }

    #[test]
    fn test_bin_index() {
        assert_eq!(bin_index(0.0, (0.0, 10.0), 5), 0);
        assert_eq!(bin_index(4.0, (0.0, 10.0), 5), 2);
        assert_eq!(bin_index(10.0, (0.0, 10.0), 5), 4);
        assert_eq!(bin_index(3.0, (3.0, 3.0), 5), 0);
    }

    #[test]
    fn test_heatmap_averages_cells() {
        let samples = vec![
            sample(0, 0, 0.0, 0.0, -40.0),
            sample(0, 0, 1.0, 0.0, -50.0),
            sample(0, 0, 10.0, 10.0, -80.0),
            sample(0, 1, 10.0, 10.0, -45.0),
            sample(1, 0, 5.0, 5.0, -30.0),
        ];

        let heatmap = RssiHeatmapBuilder::new(NodeId::Numeric(0), 2, 2)
            .analyze(&samples)
            .unwrap()
            .unwrap();

        assert_eq!(heatmap.layers.len(), 2);
        let ap0 = &heatmap.layers[0];
        assert_eq!(ap0.ap_id, NodeId::Numeric(0));
        assert_eq!(ap0.cells[0][0], Some(-45.0));
        assert_eq!(ap0.cells[0][1], None);
        assert_eq!(ap0.cells[1][1], Some(-80.0));

        let ap1 = &heatmap.layers[1];
        assert_eq!(ap1.cells[1][1], Some(-45.0));
        assert_eq!(ap1.cells[0][0], None);
    }

    #[test]
    fn test_heatmap_missing_station() {
        let samples = vec![sample(1, 0, 0.0, 0.0, -40.0)];
        let heatmap = RssiHeatmapBuilder::new(NodeId::Numeric(0), 20, 10)
            .analyze(&samples)
            .unwrap();
        assert!(heatmap.is_none());
    }
}
