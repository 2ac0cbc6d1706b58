//! `ClusterState`: a node-by-node fused view of the cluster, keyed by
//! endpoint, never by back-pointer.

use std::collections::BTreeMap;

use endpoint::Endpoint;
use model::NodeConnectivityType;
use node_state::NodeState;

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterState {
    pub(crate) local_endpoint: Endpoint,
    pub(crate) nodes: BTreeMap<Endpoint, NodeState>,
}

impl ClusterState {
    pub fn new(local_endpoint: Endpoint, nodes: BTreeMap<Endpoint, NodeState>) -> ClusterState {
        ClusterState {
            local_endpoint: local_endpoint,
            nodes: nodes,
        }
    }

    pub fn local_endpoint(&self) -> &Endpoint {
        &self.local_endpoint
    }

    pub fn nodes(&self) -> &BTreeMap<Endpoint, NodeState> {
        &self.nodes
    }

    /// Ready iff `nodes` is non-empty, every member shares the same
    /// epoch, and no member is `NotReady`.
    pub fn is_ready(&self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let mut epochs = self.nodes.values().map(|n| n.connectivity().epoch());
        let first = epochs.next().expect("checked non-empty above");
        if epochs.any(|e| e != first) {
            return false;
        }
        !self.nodes
            .values()
            .any(|n| n.conn_type() == NodeConnectivityType::NotReady)
    }
}
