//! In-memory `PeerClient`/`Runtime` mocks, the same shape as
//! `linkerd_tcp`'s `tests/mocks`: each
//! `MockPeerClient` is programmed with a fixed script of outcomes
//! (`Connected`, `WrongEpoch`, `Timeout`, `Transport`), one per iteration,
//! the last entry repeating once the script is exhausted.

extern crate cluster_fd;
extern crate futures;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::rc::Rc;

use self::futures::{future, Future};

use self::cluster_fd::{Endpoint, Epoch, Heartbeat, NodeConnectivity, NodeState, PeerClient,
                        ProbeError, Runtime, SequencerMetrics};

#[derive(Clone)]
pub enum MockOutcome {
    Connected(NodeState),
    WrongEpoch(Epoch),
    Timeout,
    Transport,
}

/// A `NodeState` as a peer would advertise it about itself: `CONNECTED`,
/// stamped with `epoch`, carrying `connectivity` as that peer's own view
/// of the cluster.
pub fn connected_node_state(
    endpoint: &str,
    connectivity: BTreeMap<Endpoint, cluster_fd::ConnectionStatus>,
    epoch: i64,
    counter: i64,
) -> NodeState {
    NodeState::new(
        NodeConnectivity::connected(Endpoint::from(endpoint), connectivity, Epoch::new(epoch)),
        SequencerMetrics::unknown(),
        Heartbeat { epoch: Epoch::new(epoch), counter: counter },
    )
}

pub struct MockPeerClient {
    script: RefCell<VecDeque<MockOutcome>>,
    timeout_ms: Cell<u64>,
    calls: Cell<usize>,
}

impl MockPeerClient {
    /// `script` is consumed one entry per call; once only one entry is
    /// left it repeats forever, so a single-element script models a peer
    /// that behaves the same way on every iteration.
    pub fn new(script: Vec<MockOutcome>) -> MockPeerClient {
        assert!(!script.is_empty(), "a mock peer needs at least one scripted outcome");
        MockPeerClient {
            script: RefCell::new(script.into_iter().collect()),
            timeout_ms: Cell::new(0),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_timeout_ms(&self) -> u64 {
        self.timeout_ms.get()
    }
}

impl PeerClient for MockPeerClient {
    fn send_node_state_request(&self, _epoch: Epoch) -> Box<Future<Item = NodeState, Error = ProbeError>> {
        self.calls.set(self.calls.get() + 1);
        let outcome = {
            let mut script = self.script.borrow_mut();
            if script.len() > 1 {
                script.pop_front().expect("checked non-empty above")
            } else {
                script.front().cloned().expect("checked non-empty above")
            }
        };
        match outcome {
            MockOutcome::Connected(ns) => Box::new(future::ok(ns)),
            MockOutcome::WrongEpoch(e) => Box::new(future::err(ProbeError::WrongEpoch(e))),
            MockOutcome::Timeout => Box::new(future::err(ProbeError::Timeout)),
            MockOutcome::Transport => Box::new(future::err(ProbeError::Transport(
                io::Error::new(io::ErrorKind::Other, "mock transport failure"),
            ))),
        }
    }

    fn set_timeout_response(&self, millis: u64) {
        self.timeout_ms.set(millis);
    }
}

pub struct MockRuntime {
    clients: BTreeMap<Endpoint, Rc<MockPeerClient>>,
}

impl MockRuntime {
    pub fn new(clients: BTreeMap<Endpoint, Rc<MockPeerClient>>) -> MockRuntime {
        MockRuntime { clients: clients }
    }
}

impl Runtime for MockRuntime {
    type Client = MockPeerClient;

    fn get_router(&self, endpoint: &Endpoint) -> Rc<MockPeerClient> {
        self.clients
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| panic!("no mock peer client configured for {}", endpoint))
    }
}
