//! `ConnectivityModel`: pure value constructors and queries over
//! one node's view of its peers. No I/O, no futures: the poller and
//! collector are the only callers that touch the network.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use endpoint::Endpoint;
use epoch::Epoch;
use error::ModelError;

/// The result of one probe from the local node to a peer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Ok,
    Failed,
}

/// What kind of observation a `NodeConnectivity` represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum NodeConnectivityType {
    /// No useful observation yet: not bootstrapped, no probes completed.
    NotReady,
    /// A fresh observation delivered by the node itself.
    Connected,
    /// The local probe to this node failed; there is no remote observation.
    Unavailable,
}

/// One node's view of its connectivity to the rest of the cluster.
///
/// Invariant: `connectivity` is empty unless `conn_type == Connected`, in
/// which case it holds an entry for every endpoint in the node's view
/// (self included). Ordered by `endpoint` only, see the `Ord` impl below.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeConnectivity {
    pub(crate) endpoint: Endpoint,
    pub(crate) conn_type: NodeConnectivityType,
    pub(crate) connectivity: BTreeMap<Endpoint, ConnectionStatus>,
    pub(crate) epoch: Epoch,
}

impl NodeConnectivity {
    pub fn connected(
        endpoint: Endpoint,
        connectivity: BTreeMap<Endpoint, ConnectionStatus>,
        epoch: Epoch,
    ) -> NodeConnectivity {
        NodeConnectivity {
            endpoint: endpoint,
            conn_type: NodeConnectivityType::Connected,
            connectivity: connectivity,
            epoch: epoch,
        }
    }

    pub fn unavailable(endpoint: Endpoint) -> NodeConnectivity {
        NodeConnectivity {
            endpoint: endpoint,
            conn_type: NodeConnectivityType::Unavailable,
            connectivity: BTreeMap::new(),
            epoch: Epoch::new(0),
        }
    }

    pub fn not_ready(endpoint: Endpoint) -> NodeConnectivity {
        NodeConnectivity {
            endpoint: endpoint,
            conn_type: NodeConnectivityType::NotReady,
            connectivity: BTreeMap::new(),
            epoch: Epoch::new(0),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn conn_type(&self) -> NodeConnectivityType {
        self.conn_type
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn connectivity(&self) -> &BTreeMap<Endpoint, ConnectionStatus> {
        &self.connectivity
    }

    pub fn connected_nodes(&self) -> BTreeSet<Endpoint> {
        self.connectivity
            .iter()
            .filter(|&(_, s)| *s == ConnectionStatus::Ok)
            .map(|(e, _)| e.clone())
            .collect()
    }

    pub fn failed_nodes(&self) -> BTreeSet<Endpoint> {
        self.connectivity
            .iter()
            .filter(|&(_, s)| *s == ConnectionStatus::Failed)
            .map(|(e, _)| e.clone())
            .collect()
    }

    /// Spec §4.2: fails with `InvalidConfiguration` if this node is
    /// `Unavailable` (its row is empty by construction); fails with
    /// `PeerNotFound` if `peer` is absent from the row.
    pub fn connection_status(&self, peer: &Endpoint) -> Result<ConnectionStatus, ModelError> {
        if self.conn_type == NodeConnectivityType::Unavailable {
            return Err(ModelError::InvalidConfiguration(
                "cannot query connection status of an unavailable node",
            ));
        }
        self.connectivity
            .get(peer)
            .cloned()
            .ok_or_else(|| ModelError::PeerNotFound(peer.clone()))
    }

    /// Count of `Ok` entries in the connectivity row.
    pub fn degree(&self) -> usize {
        self.connectivity
            .values()
            .filter(|&&s| s == ConnectionStatus::Ok)
            .count()
    }
}

// "Comparable by endpoint (lexicographic)". Deliberately ignores the
// other fields, unlike the derived `PartialEq` above: this is
// intentionally not a total order consistent with `PartialEq` (two
// values with the same endpoint but different connectivity rows compare
// `Equal` here while `==` reports them distinct). Nothing in this crate
// puts a `NodeConnectivity` in a `BTreeSet` or sorts a `Vec` of them;
// callers that need a consistent order should key off `endpoint()`
// directly instead of relying on this impl.
impl Eq for NodeConnectivity {}
impl Ord for NodeConnectivity {
    fn cmp(&self, other: &NodeConnectivity) -> Ordering {
        self.endpoint.cmp(&other.endpoint)
    }
}
impl PartialOrd for NodeConnectivity {
    fn partial_cmp(&self, other: &NodeConnectivity) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
