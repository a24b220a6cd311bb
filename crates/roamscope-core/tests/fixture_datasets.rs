use roamscope_core::analysis::{Analyzer, FlowAnalyzer, InterruptionExtractor, RssiAnalyzer};
use roamscope_core::dataset::{DatasetReader, EventKind, NodeId};
use roamscope_core::report::{Datasets, HtmlRenderer, ReportBuilder};
use roamscope_core::{Error, ReportConfig};
use std::path::PathBuf;

const EPSILON: f64 = 1e-9;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

fn fixture_config() -> ReportConfig {
    ReportConfig {
        rssi_path: fixture("rssi_measurements.csv"),
        handover_path: fixture("handover_events.csv"),
        flow_path: fixture("flow_stats.csv"),
        ..Default::default()
    }
}

#[test]
fn test_handover_fixture() {
    let records = DatasetReader::events_from_file(&fixture("handover_events.csv")).unwrap();
    let analysis = InterruptionExtractor::extract_records(&records).unwrap();
    let summary = &analysis.summary;

    assert_eq!(summary.total_events, 10);
    assert_eq!(summary.total_stations, 3);
    assert_eq!(summary.total_handovers, 2);
    assert_eq!(summary.stations_with_handovers, 2);
    assert_eq!(summary.mean_handovers_per_station, 1.0);
    assert_eq!(summary.first_handover_time, Some(12.45));
    assert_eq!(summary.last_handover_time, Some(25.0));
    assert!((summary.mean_time_between_handovers - 13.75).abs() < EPSILON);

    assert_eq!(analysis.interruptions.len(), 2);
    let first = &analysis.interruptions[0];
    assert_eq!(first.station_id, NodeId::Numeric(0));
    assert!((first.duration - 0.05).abs() < EPSILON);
    assert_eq!(first.ended_by, EventKind::Handover);

    let second = &analysis.interruptions[1];
    assert_eq!(second.station_id, NodeId::Numeric(1));
    assert!((second.duration - 0.2).abs() < EPSILON);
    assert_eq!(second.ended_by, EventKind::Association);

    assert!((summary.mean_interruption_duration - 0.125).abs() < EPSILON);
}

#[test]
fn test_malformed_fixture() {
    let records = DatasetReader::events_from_file(&fixture("malformed_events.csv")).unwrap();
    match InterruptionExtractor::extract_records(&records) {
        Err(Error::Validation { line, message }) => {
            assert_eq!(line, 3);
            assert!(message.contains("REBOOT"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_rssi_fixture() {
    let samples = DatasetReader::rssi_from_file(&fixture("rssi_measurements.csv")).unwrap();
    let stats = RssiAnalyzer.analyze(&samples).unwrap();

    assert_eq!(stats.total_samples, 16);
    assert_eq!(stats.stations, 2);
    assert_eq!(stats.access_points, 2);
    assert_eq!(stats.min_rssi, Some(-85.0));
    assert_eq!(stats.max_rssi, Some(-40.0));
    assert!((stats.mean_rssi.unwrap() + 62.8125).abs() < EPSILON);
    assert_eq!(stats.sim_duration, 30.0);
    assert_eq!(stats.links.len(), 4);
}

#[test]
fn test_flow_fixture() {
    let records = DatasetReader::flows_from_file(&fixture("flow_stats.csv")).unwrap();
    let analysis = FlowAnalyzer.analyze(&records).unwrap();
    let stats = &analysis.stats;

    assert_eq!(stats.total_flows, 2);
    assert_eq!(stats.total_tx_packets, 1500);
    assert_eq!(stats.total_rx_packets, 1450);
    assert_eq!(stats.total_lost_packets, 50);
    assert!((stats.packet_loss_rate - 50.0 / 15.0).abs() < EPSILON);
    assert!((stats.avg_throughput_kbps.unwrap() - 205.71).abs() < 1e-6);
    assert_eq!(stats.max_throughput_kbps, Some(269.55));
    assert!((stats.avg_loss_rate.unwrap() - 2.5).abs() < EPSILON);
    assert!((stats.avg_delay.unwrap() - 0.015).abs() < EPSILON);
}

#[test]
fn test_full_report_from_fixtures() {
    let config = fixture_config();
    let datasets = Datasets::load(&config);
    let report = ReportBuilder::new(config).build(&datasets).unwrap();

    let positions = &report.handover_positions;
    assert_eq!(positions.len(), 2);
    assert_eq!((positions[0].pos_x, positions[0].pos_y), (10.0, 5.0));
    assert_eq!((positions[1].pos_x, positions[1].pos_y), (15.0, 10.0));

    let heatmap = report.heatmap.as_ref().unwrap();
    assert_eq!(heatmap.station_id, NodeId::Numeric(0));
    assert_eq!((heatmap.x_bins, heatmap.y_bins), (20, 10));

    let html = HtmlRenderer::render(&report);
    for heading in ["RSSI Analysis", "Handover Analysis", "Flow Analysis"] {
        assert!(html.contains(heading), "missing section {}", heading);
    }
    for chart in ["rssi_evolution", "handover_map", "throughput", "packet_delivery"] {
        assert!(report.chart(chart).is_some(), "missing chart {}", chart);
    }
}
