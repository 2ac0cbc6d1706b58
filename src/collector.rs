//! `ClusterStateCollector`: fuses one iteration's resolved probe outcomes
//! into a `ClusterState`, plus the epoch mismatches seen that iteration.
//!
//! The racing of each probe future against its timeout happens one layer
//! up, in `Poller::poll_iteration`. By the time a `ClusterStateCollector`
//! runs, every probe has already settled to a `Result<NodeState,
//! ProbeError>`. This keeps the fusion rules here pure and directly
//! testable, with no futures runtime involved.

use std::collections::BTreeMap;

use cluster_state::ClusterState;
use endpoint::Endpoint;
use epoch::Epoch;
use error::ProbeError;
use heartbeat::{Heartbeat, HeartbeatCounter};
use model::{ConnectionStatus, NodeConnectivity, NodeConnectivityType};
use node_state::NodeState;
use sequencer::SequencerMetrics;

pub struct ClusterStateCollector<'a> {
    local_endpoint: Endpoint,
    heartbeat: &'a HeartbeatCounter,
}

impl<'a> ClusterStateCollector<'a> {
    pub fn new(local_endpoint: Endpoint, heartbeat: &'a HeartbeatCounter) -> ClusterStateCollector<'a> {
        ClusterStateCollector {
            local_endpoint: local_endpoint,
            heartbeat: heartbeat,
        }
    }

    /// Spec §4.4. `probes` must contain an entry for every peer that was
    /// asked this iteration, including the local endpoint itself (its
    /// entry is ignored: the local row is always synthesized from local
    /// observations, never trusted from a remote reply). The invariant
    /// `|result.nodes()| == |probes|` follows directly from inserting
    /// exactly one node per probe key.
    pub fn collect_cluster_state(
        &self,
        epoch: Epoch,
        sequencer_metrics: SequencerMetrics,
        probes: &BTreeMap<Endpoint, Result<NodeState, ProbeError>>,
    ) -> ClusterState {
        let mut nodes = BTreeMap::new();
        let mut local_connectivity = BTreeMap::new();

        for (peer, outcome) in probes {
            local_connectivity.insert(peer.clone(), Self::local_status_of(outcome));

            if *peer == self.local_endpoint {
                // Placeholder; overwritten below once the local row is
                // fully built from every probe outcome.
                continue;
            }

            let node_state = match *outcome {
                Ok(ref ns)
                    if ns.conn_type() == NodeConnectivityType::Connected
                        && ns.connectivity().epoch() == epoch =>
                {
                    ns.clone()
                }
                _ => NodeState::new(
                    NodeConnectivity::unavailable(peer.clone()),
                    SequencerMetrics::default(),
                    Heartbeat::default(),
                ),
            };
            nodes.insert(peer.clone(), node_state);
        }

        let counter = self.heartbeat.next();
        let local_connectivity =
            NodeConnectivity::connected(self.local_endpoint.clone(), local_connectivity, epoch);
        let local_state = NodeState::new(
            local_connectivity,
            sequencer_metrics,
            Heartbeat { epoch: epoch, counter: counter },
        );
        nodes.insert(self.local_endpoint.clone(), local_state);

        ClusterState::new(self.local_endpoint.clone(), nodes)
    }

    /// Spec §4.4: `{e -> serverEpoch}` for exactly the peers whose probe
    /// resolved to `WrongEpochError`.
    pub fn collect_wrong_epochs(
        &self,
        probes: &BTreeMap<Endpoint, Result<NodeState, ProbeError>>,
    ) -> BTreeMap<Endpoint, Epoch> {
        probes
            .iter()
            .filter_map(|(peer, outcome)| match *outcome {
                Err(ProbeError::WrongEpoch(server_epoch)) => Some((peer.clone(), server_epoch)),
                _ => None,
            })
            .collect()
    }

    /// Spec §4.4: "Local connectivity row records OK for every peer whose
    /// probe succeeded (regardless of epoch correctness) and FAILED for
    /// every peer whose probe yielded Timeout or TransportError." A peer
    /// that replied at the wrong epoch still answered, so it counts as
    /// reachable here even though its `NodeState` is discarded above.
    /// Spec §7 folds `CodecError` into the same bucket as `TransportError`.
    fn local_status_of(outcome: &Result<NodeState, ProbeError>) -> ConnectionStatus {
        match *outcome {
            Ok(_) | Err(ProbeError::WrongEpoch(_)) => ConnectionStatus::Ok,
            Err(ProbeError::Timeout) | Err(ProbeError::Transport(_)) | Err(ProbeError::Codec(_)) => {
                ConnectionStatus::Failed
            }
        }
    }
}
