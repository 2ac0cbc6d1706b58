//! `ClusterStateAggregator`: fuses a finite ordered window of
//! `ClusterState`s (oldest → newest) into the best available observation
//! per endpoint.
//!
//! The asymmetry is load-bearing: a newer `Unavailable`
//! observation must never supersede an older `Connected` one within the
//! window, since a transient probe failure doesn't erase the fact that a
//! peer was recently alive to someone. `Connected` beats `NotReady` beats
//! `Unavailable`; ties within a type are broken by recency.

use std::collections::{BTreeMap, BTreeSet};

use cluster_state::ClusterState;
use endpoint::Endpoint;
use model::NodeConnectivityType;
use node_state::NodeState;

pub struct ClusterStateAggregator;

impl ClusterStateAggregator {
    /// `cluster_states` must be ordered oldest to newest; the "latest
    /// wins" rule below depends on that order. No epoch harmonization is
    /// performed; epoch inconsistency in the result surfaces through
    /// `ClusterState::is_ready`.
    pub fn aggregate(local_endpoint: Endpoint, cluster_states: &[ClusterState]) -> ClusterState {
        let mut endpoints: BTreeSet<Endpoint> = BTreeSet::new();
        for cs in cluster_states {
            endpoints.extend(cs.nodes().keys().cloned());
        }

        let mut nodes = BTreeMap::new();
        for endpoint in endpoints {
            let observations: Vec<&NodeState> = cluster_states
                .iter()
                .filter_map(|cs| cs.nodes().get(&endpoint))
                .collect();
            if let Some(best) = Self::select(&observations) {
                nodes.insert(endpoint, best.clone());
            }
        }

        ClusterState::new(local_endpoint, nodes)
    }

    /// `observations` is oldest-first; `.rev().find(..)` therefore returns
    /// the *latest* observation matching the predicate.
    fn select<'a>(observations: &[&'a NodeState]) -> Option<&'a NodeState> {
        if let Some(ns) = observations
            .iter()
            .rev()
            .find(|ns| ns.conn_type() == NodeConnectivityType::Connected)
        {
            return Some(*ns);
        }
        if let Some(ns) = observations
            .iter()
            .rev()
            .find(|ns| ns.conn_type() == NodeConnectivityType::NotReady)
        {
            return Some(*ns);
        }
        observations.iter().rev().next().cloned()
    }
}
