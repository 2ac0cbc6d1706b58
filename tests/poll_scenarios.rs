//! End-to-end poll scenarios run against a real `Poller` over the
//! in-memory mocks in `tests/mocks`, no real sockets involved, the same
//! separation `linkerd_tcp/tests/lib.rs` draws between its `tests/mocks`
//! and the rest of the suite.

extern crate cluster_fd;
extern crate futures;
extern crate tokio_core;

mod mocks;

use std::collections::BTreeMap;
use std::rc::Rc;

use cluster_fd::{ConnectionStatus, Endpoint, Epoch, ModelError, NodeConnectivityType, Poller, PollerConfig,
                  SequencerMetrics};

use mocks::{connected_node_state, MockOutcome, MockPeerClient, MockRuntime};

/// Fast tunables so the inter-iteration sleeps don't make the suite slow;
/// the ratios between the fields (not the absolute magnitudes) are what
/// the period state-machine assertions below depend on.
fn fast_config() -> PollerConfig {
    PollerConfig {
        failure_threshold: 3,
        init_period_duration_ms: 20,
        max_period_duration_ms: 60,
        period_delta_ms: 20,
        initial_poll_interval_ms: 5,
    }
}

fn row(entries: &[(&str, ConnectionStatus)]) -> BTreeMap<Endpoint, ConnectionStatus> {
    entries.iter().map(|&(e, s)| (Endpoint::from(e), s)).collect()
}

#[test]
fn all_healthy_three_node_cluster() {
    let epoch = 1;
    let all_ok = row(&[
        ("a:1", ConnectionStatus::Ok),
        ("b:1", ConnectionStatus::Ok),
        ("c:1", ConnectionStatus::Ok),
    ]);

    let mut clients = BTreeMap::new();
    for &ep in &["a:1", "b:1", "c:1"] {
        clients.insert(
            Endpoint::from(ep),
            Rc::new(MockPeerClient::new(vec![
                MockOutcome::Connected(connected_node_state(ep, all_ok.clone(), epoch, 1)),
            ])),
        );
    }

    let mut servers = std::collections::BTreeSet::new();
    servers.insert(Endpoint::from("a:1"));
    servers.insert(Endpoint::from("b:1"));
    servers.insert(Endpoint::from("c:1"));
    let layout = cluster_fd::StaticLayout::new(servers, Epoch::new(epoch));

    let poller = Poller::with_config(Endpoint::from("a:1"), |_h| MockRuntime::new(clients), fast_config())
        .expect("reactor must start");

    let report = poller.poll(&layout, SequencerMetrics::unknown()).expect("poll must not fail");

    assert!(report.wrong_epochs().is_empty());
    assert_eq!(report.cluster_state().nodes().len(), 3);
    for &ep in &["a:1", "b:1", "c:1"] {
        let node = report.cluster_state().nodes().get(&Endpoint::from(ep)).unwrap();
        assert_eq!(node.conn_type(), NodeConnectivityType::Connected);
    }
    assert!(report.cluster_state().is_ready());
    assert_eq!(poller.period(), fast_config().init_period_duration_ms);
}

#[test]
fn one_dead_node_becomes_unavailable_and_period_decays_by_one_delta() {
    let epoch = 1;
    let healthy_row = row(&[
        ("a:1", ConnectionStatus::Ok),
        ("b:1", ConnectionStatus::Ok),
        ("c:1", ConnectionStatus::Failed),
    ]);

    let mut clients = BTreeMap::new();
    clients.insert(
        Endpoint::from("a:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::Connected(connected_node_state("a:1", healthy_row.clone(), epoch, 1)),
        ])),
    );
    clients.insert(
        Endpoint::from("b:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::Connected(connected_node_state("b:1", healthy_row.clone(), epoch, 1)),
        ])),
    );
    clients.insert(Endpoint::from("c:1"), Rc::new(MockPeerClient::new(vec![MockOutcome::Timeout])));

    let mut servers = std::collections::BTreeSet::new();
    servers.insert(Endpoint::from("a:1"));
    servers.insert(Endpoint::from("b:1"));
    servers.insert(Endpoint::from("c:1"));
    let layout = cluster_fd::StaticLayout::new(servers, Epoch::new(epoch));

    let poller = Poller::with_config(Endpoint::from("a:1"), |_h| MockRuntime::new(clients), fast_config())
        .expect("reactor must start");

    let report = poller.poll(&layout, SequencerMetrics::unknown()).expect("poll must not fail");

    let c_node = report.cluster_state().nodes().get(&Endpoint::from("c:1")).unwrap();
    assert_eq!(c_node.conn_type(), NodeConnectivityType::Unavailable);

    let local = report.cluster_state().nodes().get(&Endpoint::from("a:1")).unwrap();
    assert_eq!(
        local.connectivity().connection_status(&Endpoint::from("b:1")).unwrap(),
        ConnectionStatus::Ok
    );
    assert_eq!(
        local.connectivity().connection_status(&Endpoint::from("c:1")).unwrap(),
        ConnectionStatus::Failed
    );

    let b_node = report.cluster_state().nodes().get(&Endpoint::from("b:1")).unwrap();
    assert_eq!(
        b_node.connectivity().connection_status(&Endpoint::from("c:1")).unwrap(),
        ConnectionStatus::Failed
    );

    // c fails every iteration, so period advances by periodDelta at each
    // of the three iterations: 20 -> 40 -> 60, saturating at max (60) on
    // the third. finish_round then decays it by one periodDelta: 60 - 20
    // = 40. It does not return to the floor within a single round.
    let config = fast_config();
    assert_eq!(poller.period(), config.max_period_duration_ms - config.period_delta_ms);
}

#[test]
fn wrong_epoch_peer_reachable_once_is_suppressed_from_final_report() {
    let epoch = 1;
    let healthy_row = row(&[("a:1", ConnectionStatus::Ok), ("b:1", ConnectionStatus::Ok)]);

    let mut clients = BTreeMap::new();
    clients.insert(
        Endpoint::from("a:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::Connected(connected_node_state("a:1", healthy_row.clone(), epoch, 1)),
        ])),
    );
    clients.insert(
        Endpoint::from("b:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::Connected(connected_node_state("b:1", healthy_row.clone(), epoch, 1)),
        ])),
    );
    clients.insert(
        Endpoint::from("c:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::WrongEpoch(Epoch::new(2)),
            MockOutcome::Timeout,
            MockOutcome::Timeout,
        ])),
    );

    let mut servers = std::collections::BTreeSet::new();
    servers.insert(Endpoint::from("a:1"));
    servers.insert(Endpoint::from("b:1"));
    servers.insert(Endpoint::from("c:1"));
    let layout = cluster_fd::StaticLayout::new(servers, Epoch::new(epoch));

    let poller = Poller::with_config(Endpoint::from("a:1"), |_h| MockRuntime::new(clients), fast_config())
        .expect("reactor must start");

    let report = poller.poll(&layout, SequencerMetrics::unknown()).expect("poll must not fail");

    // c answered (at the wrong epoch) in iteration 0, so it counts as
    // reachable for that iteration and is removed from the aggregated
    // wrong-epoch report even though it went silent afterward.
    assert!(report.wrong_epochs().is_empty());
}

#[test]
fn latest_connected_observation_survives_later_silence() {
    let epoch = 1;
    let healthy_row = row(&[("a:1", ConnectionStatus::Ok), ("b:1", ConnectionStatus::Ok)]);

    let mut clients = BTreeMap::new();
    clients.insert(
        Endpoint::from("a:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::Connected(connected_node_state("a:1", healthy_row.clone(), epoch, 1)),
        ])),
    );
    clients.insert(
        Endpoint::from("b:1"),
        Rc::new(MockPeerClient::new(vec![
            MockOutcome::Connected(connected_node_state("b:1", healthy_row.clone(), epoch, 5)),
            MockOutcome::Timeout,
            MockOutcome::Timeout,
        ])),
    );

    let mut servers = std::collections::BTreeSet::new();
    servers.insert(Endpoint::from("a:1"));
    servers.insert(Endpoint::from("b:1"));
    let layout = cluster_fd::StaticLayout::new(servers, Epoch::new(epoch));

    let poller = Poller::with_config(Endpoint::from("a:1"), |_h| MockRuntime::new(clients), fast_config())
        .expect("reactor must start");

    let report = poller.poll(&layout, SequencerMetrics::unknown()).expect("poll must not fail");

    let b_node = report.cluster_state().nodes().get(&Endpoint::from("b:1")).unwrap();
    assert_eq!(b_node.conn_type(), NodeConnectivityType::Connected);
    assert_eq!(b_node.heartbeat().counter, 5);
}

#[test]
fn invalid_failure_threshold_is_refused_before_any_server_is_contacted() {
    let layout = cluster_fd::StaticLayout::new(std::collections::BTreeSet::new(), Epoch::new(1));
    let config = PollerConfig { failure_threshold: 0, ..fast_config() };

    let clients: BTreeMap<Endpoint, Rc<MockPeerClient>> = BTreeMap::new();
    let poller = Poller::with_config(Endpoint::from("a:1"), |_h| MockRuntime::new(clients), config)
        .expect("reactor must start");

    match poller.poll(&layout, SequencerMetrics::unknown()) {
        Err(ModelError::InvalidConfiguration(_)) => {}
        Ok(_) => panic!("expected InvalidConfiguration, got Ok"),
        Err(other) => panic!("expected InvalidConfiguration, got {:?}", other),
    }
}
