//! `NodeState`: one peer's connectivity row plus its sequencer metrics
//! and heartbeat. Embeds `NodeConnectivity` by value; `ClusterState`
//! references `NodeState` by endpoint key, never by pointer.

use heartbeat::Heartbeat;
use model::{NodeConnectivity, NodeConnectivityType};
use sequencer::SequencerMetrics;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    pub(crate) connectivity: NodeConnectivity,
    pub(crate) sequencer_metrics: SequencerMetrics,
    pub(crate) heartbeat: Heartbeat,
}

impl NodeState {
    pub fn new(
        connectivity: NodeConnectivity,
        sequencer_metrics: SequencerMetrics,
        heartbeat: Heartbeat,
    ) -> NodeState {
        NodeState {
            connectivity: connectivity,
            sequencer_metrics: sequencer_metrics,
            heartbeat: heartbeat,
        }
    }

    pub fn connectivity(&self) -> &NodeConnectivity {
        &self.connectivity
    }

    pub fn sequencer_metrics(&self) -> SequencerMetrics {
        self.sequencer_metrics
    }

    pub fn heartbeat(&self) -> Heartbeat {
        self.heartbeat
    }

    pub fn conn_type(&self) -> NodeConnectivityType {
        self.connectivity.conn_type()
    }
}
