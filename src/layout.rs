//! Reference `Layout`: a fixed set of servers at a fixed epoch, all
//! considered active. Enough to drive the `cluster-fd` binary and the
//! integration tests without a companion reconfiguration service.

use std::collections::BTreeSet;

use endpoint::Endpoint;
use epoch::Epoch;
use peer_client::Layout;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticLayout {
    servers: BTreeSet<Endpoint>,
    epoch: Epoch,
}

impl StaticLayout {
    pub fn new(servers: BTreeSet<Endpoint>, epoch: Epoch) -> StaticLayout {
        StaticLayout { servers: servers, epoch: epoch }
    }
}

impl Layout for StaticLayout {
    fn all_servers(&self) -> BTreeSet<Endpoint> {
        self.servers.clone()
    }

    fn active_layout_servers(&self) -> BTreeSet<Endpoint> {
        self.servers.clone()
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }
}
