use super::{Analyzer, FlowAnalysis, FlowMetrics, FlowStats, mean};
use crate::Result;
use crate::dataset::FlowRecord;

pub struct FlowAnalyzer;

impl FlowAnalyzer {
    /// Metrics of a single flow, preferring the exported columns
    pub fn metrics(flow: &FlowRecord) -> FlowMetrics {
        let throughput_kbps = flow.throughput_kbps.or_else(|| {
            let rx_bytes = flow.rx_bytes?;
            let duration = flow.duration.filter(|d| *d != 0.0).unwrap_or(1.0);
            Some(rx_bytes as f64 * 8.0 / duration / 1000.0)
        });

        let loss_rate = flow.loss_rate.or_else(|| {
            let lost = flow.lost_packets?;
            let tx = flow.tx_packets?.max(1);
            Some(lost as f64 / tx as f64 * 100.0)
        });

        let mean_delay = flow.mean_delay.or_else(|| {
            let delay_sum = flow.delay_sum?;
            let rx = flow.rx_packets?;
            Some(if rx > 0 { delay_sum / rx as f64 } else { 0.0 })
        });

        FlowMetrics {
            flow_id: flow.flow_id.clone(),
            source: flow.source.clone(),
            destination: flow.destination.clone(),
            throughput_kbps,
            loss_rate,
            mean_delay,
        }
    }
}

/// Sum of a packet counter over all flows, saturating at `u64::MAX`
fn packet_total(records: &[FlowRecord], counter: impl Fn(&FlowRecord) -> Option<u64>) -> u64 {
    records
        .iter()
        .filter_map(counter)
        .fold(0u64, |total, n| total.saturating_add(n))
}

impl Analyzer for FlowAnalyzer {
    type Input = [FlowRecord];
    type Output = FlowAnalysis;

    fn analyze(&self, records: &[FlowRecord]) -> Result<Self::Output> {
        tracing::debug!("Analyzing {} flow records", records.len());

        let flows: Vec<FlowMetrics> = records.iter().map(Self::metrics).collect();

        let total_tx_packets = packet_total(records, |f| f.tx_packets);
        let total_rx_packets = packet_total(records, |f| f.rx_packets);
        let total_lost_packets = packet_total(records, |f| f.lost_packets);
        let packet_loss_rate = if total_tx_packets > 0 {
            total_lost_packets as f64 / total_tx_packets as f64 * 100.0
        } else {
            0.0
        };

        let stats = FlowStats {
            total_flows: records.len(),
            avg_throughput_kbps: mean(flows.iter().filter_map(|f| f.throughput_kbps)),
            max_throughput_kbps: flows.iter().filter_map(|f| f.throughput_kbps).reduce(f64::max),
            avg_loss_rate: mean(flows.iter().filter_map(|f| f.loss_rate)),
            avg_delay: mean(flows.iter().filter_map(|f| f.mean_delay)),
            total_tx_packets,
            total_rx_packets,
            total_lost_packets,
            packet_loss_rate,
        };

        tracing::info!(
            "Flow analysis complete: {} flows, loss rate={:.2}%",
            stats.total_flows,
            stats.packet_loss_rate
        );

        Ok(FlowAnalysis { flows, stats })
    }
}
