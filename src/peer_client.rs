//! External interfaces the core consumes: `PeerClient`, `Layout`,
//! `Runtime`. Only the shapes are specified here; `transport::tcp` and
//! `layout`/`runtime` supply the one reference implementation this crate
//! ships so it is runnable end to end.

use std::collections::BTreeSet;
use std::rc::Rc;

use futures::Future;

use endpoint::Endpoint;
use epoch::Epoch;
use error::ProbeError;
use node_state::NodeState;

/// One async request/response round-trip to one peer.
///
/// The future resolves with a `NodeState` on success or a `ProbeError`
/// describing why it didn't: `Timeout`, `Transport`, `WrongEpoch`, or
/// `Codec`. Implementations MUST NOT touch shared state after their
/// future has been dropped. A probe that outlives its timeout is simply
/// abandoned by the poller.
pub trait PeerClient {
    fn send_node_state_request(&self, epoch: Epoch) -> Box<Future<Item = NodeState, Error = ProbeError>>;

    /// Sets the deadline applied to subsequent `send_node_state_request`
    /// calls, in milliseconds. Called only from the poller's thread.
    fn set_timeout_response(&self, millis: u64);
}

/// The cluster layout source. `all_servers` drives the probe fan-out;
/// `active_layout_servers` is recorded verbatim into each `PollReport` as
/// the round's `responsive_servers` input.
pub trait Layout {
    fn all_servers(&self) -> BTreeSet<Endpoint>;
    fn active_layout_servers(&self) -> BTreeSet<Endpoint>;
    fn epoch(&self) -> Epoch;
}

/// Resolves a `PeerClient` for a given endpoint, caching it across rounds.
pub trait Runtime {
    type Client: PeerClient;
    fn get_router(&self, endpoint: &Endpoint) -> Rc<Self::Client>;
}
