//! `TcpRuntime`: a `Runtime` that caches one `TcpPeerClient` per endpoint.
//! Single-threaded, so a plain `BTreeMap` behind a `RefCell` is enough;
//! this core needs lexicographic endpoint ordering, not the insertion
//! order a load-balancer's routee pool cares about.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::rc::Rc;

use tokio_core::reactor::Handle;

use endpoint::Endpoint;
use peer_client::Runtime;
use transport::tcp::TcpPeerClient;

pub struct TcpRuntime {
    handle: Handle,
    clients: RefCell<BTreeMap<Endpoint, Rc<TcpPeerClient>>>,
}

impl TcpRuntime {
    pub fn new(handle: Handle) -> TcpRuntime {
        TcpRuntime {
            handle: handle,
            clients: RefCell::new(BTreeMap::new()),
        }
    }
}

impl Runtime for TcpRuntime {
    type Client = TcpPeerClient;

    /// Never fails. An endpoint that isn't a valid `host:port` is a
    /// configuration error caught well before this point (by `config`), so
    /// a parse failure here is a programmer error, not a runtime one.
    fn get_router(&self, endpoint: &Endpoint) -> Rc<TcpPeerClient> {
        if let Some(client) = self.clients.borrow().get(endpoint) {
            return client.clone();
        }
        let addr: SocketAddr = endpoint
            .as_str()
            .parse()
            .unwrap_or_else(|e| panic!("endpoint {} is not a valid host:port address: {}", endpoint, e));
        let client = Rc::new(TcpPeerClient::new(addr, self.handle.clone()));
        self.clients.borrow_mut().insert(endpoint.clone(), client.clone());
        client
    }
}
