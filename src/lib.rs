//! Cluster failure-detection core for a distributed shared-log system
//! built on state-machine replication.
//!
//! From the point of view of one node, this crate runs bounded polling
//! rounds against the rest of a configured cluster layout and reports
//! which peers are reachable, which are failed, which observe a stale
//! epoch, and a fused view of the cluster's connectivity over a short
//! sliding window. It does not elect leaders, run consensus, or commit
//! membership changes; it only observes and reports.

extern crate bytes;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate serde_yaml;
extern crate futures;
extern crate tokio_core;
extern crate tokio_io;
extern crate tokio_timer;

pub mod aggregator;
pub mod cluster_state;
pub mod codec;
pub mod collector;
pub mod config;
pub mod endpoint;
pub mod epoch;
pub mod error;
pub mod heartbeat;
pub mod layout;
pub mod model;
pub mod node_state;
pub mod peer_client;
pub mod poller;
pub mod runtime;
pub mod sequencer;
pub mod transport;

pub use cluster_state::ClusterState;
pub use codec::{Decode, Encode};
pub use collector::ClusterStateCollector;
pub use aggregator::ClusterStateAggregator;
pub use endpoint::Endpoint;
pub use epoch::Epoch;
pub use error::{CodecError, ConfigError, ModelError, ProbeError};
pub use heartbeat::{Heartbeat, HeartbeatCounter};
pub use layout::StaticLayout;
pub use model::{ConnectionStatus, NodeConnectivity, NodeConnectivityType};
pub use node_state::NodeState;
pub use peer_client::{Layout, PeerClient, Runtime};
pub use poller::{Poller, PollerConfig, PollReport};
pub use runtime::TcpRuntime;
pub use sequencer::SequencerMetrics;
pub use transport::TcpPeerClient;
