//! `TcpPeerClient`: one concrete
//! `PeerClient` over a plain `TcpStream`, grounded in
//! `linkerd_tcp::connector`'s `Connector`/`ConnectingSocket`: lazy
//! connect-on-first-use, the connection kept open across calls, and a
//! `tokio_timer::Timer::sleep` raced against the round trip exactly like
//! `connector::connecting` races a handshake against nothing else but here
//! against a deadline.
//!
//! Wire protocol (a thin envelope around the codec in `::codec`):
//! request is the probed `epoch` as a bare `i64`; the reply is one tag byte
//! (`0` = `NodeState` follows, length-prefixed; `1` = wrong epoch, an `i64`
//! follows) so a malformed or out-of-protocol peer decodes to a
//! `ProbeError::Codec` rather than panicking.

use std::cell::{Cell, RefCell};
use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Duration;

use bytes::{Buf, BufMut, BytesMut};
use futures::future::{self, Either};
use futures::Future;
use tokio_core::net::TcpStream;
use tokio_core::reactor::Handle;
use tokio_io::io::{read_exact, write_all};
use tokio_timer::Timer;

use codec::{Decode, Encode};
use epoch::Epoch;
use error::{CodecError, ProbeError};
use node_state::NodeState;
use peer_client::PeerClient;

const TAG_NODE_STATE: u8 = 0;
const TAG_WRONG_EPOCH: u8 = 1;

const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// A `PeerClient` that speaks the wire codec over a lazily-opened TCP
/// connection. Not a hardened RPC stack, just one reference transport
/// among the several a real deployment might plug in: `PeerClient` is
/// specified only by the interfaces the core consumes.
pub struct TcpPeerClient {
    addr: SocketAddr,
    handle: Handle,
    timer: Timer,
    timeout_ms: Cell<u64>,
    stream: Rc<RefCell<Option<TcpStream>>>,
}

impl TcpPeerClient {
    pub fn new(addr: SocketAddr, handle: Handle) -> TcpPeerClient {
        TcpPeerClient {
            addr: addr,
            handle: handle,
            timer: Timer::default(),
            timeout_ms: Cell::new(DEFAULT_TIMEOUT_MS),
            stream: Rc::new(RefCell::new(None)),
        }
    }

    fn connect(&self) -> Box<Future<Item = TcpStream, Error = io::Error>> {
        match self.stream.borrow_mut().take() {
            Some(stream) => Box::new(future::ok(stream)),
            None => Box::new(TcpStream::connect(&self.addr, &self.handle)),
        }
    }
}

impl PeerClient for TcpPeerClient {
    /// Abandoning a probe that lost its race against the timeout drops
    /// this future, including the `TcpStream` it was holding. The
    /// connection is simply reopened on the next call; a `PeerClient`
    /// must not later mutate shared state on behalf of an abandoned probe.
    fn send_node_state_request(&self, epoch: Epoch) -> Box<Future<Item = NodeState, Error = ProbeError>> {
        let mut request = BytesMut::with_capacity(8);
        request.put_i64_be(epoch.get());

        let roundtrip = self.connect()
            .map_err(ProbeError::from)
            .and_then(move |stream| write_all(stream, request.to_vec()).map_err(ProbeError::from))
            .and_then(|(stream, _)| read_exact(stream, [0u8; 1]).map_err(ProbeError::from))
            .and_then(|(stream, tag)| -> Box<Future<Item = (TcpStream, NodeState), Error = ProbeError>> {
                match tag[0] {
                    TAG_NODE_STATE => Box::new(
                        read_exact(stream, [0u8; 4])
                            .map_err(ProbeError::from)
                            .and_then(|(stream, len_buf)| {
                                let len = Cursor::new(&len_buf[..]).get_u32_be() as usize;
                                read_exact(stream, vec![0u8; len]).map_err(ProbeError::from)
                            })
                            .and_then(|(stream, payload)| {
                                let mut cursor = Cursor::new(payload);
                                match NodeState::decode(&mut cursor) {
                                    Ok(ns) => future::ok((stream, ns)),
                                    Err(e) => future::err(ProbeError::from(e)),
                                }
                            }),
                    ),
                    TAG_WRONG_EPOCH => Box::new(read_exact(stream, [0u8; 8]).map_err(ProbeError::from).and_then(
                        |(_stream, buf)| {
                            let server_epoch = Epoch::from(Cursor::new(&buf[..]).get_i64_be());
                            future::err(ProbeError::WrongEpoch(server_epoch))
                        },
                    )),
                    other => Box::new(future::err(ProbeError::from(CodecError::UnknownEnum(format!(
                        "reply tag {}",
                        other
                    ))))),
                }
            });

        let timeout = self.timer
            .sleep(Duration::from_millis(self.timeout_ms.get()))
            .then(|_| -> Result<(), ProbeError> { Err(ProbeError::Timeout) });

        let stream_cell = self.stream.clone();
        Box::new(roundtrip.select2(timeout).then(move |outcome| match outcome {
            Ok(Either::A(((stream, node_state), _pending_timeout))) => {
                *stream_cell.borrow_mut() = Some(stream);
                Ok(node_state)
            }
            Ok(Either::B(((), _pending_roundtrip))) => unreachable!("the timeout future never resolves successfully"),
            Err(Either::A((e, _pending_timeout))) => Err(e),
            Err(Either::B((e, _pending_roundtrip))) => Err(e),
        }))
    }

    fn set_timeout_response(&self, millis: u64) {
        self.timeout_ms.set(millis);
    }
}
