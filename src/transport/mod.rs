//! Reference `PeerClient` transports.
//!
//! `PeerClient` is specified only as an interface the core consumes; this
//! module supplies the one concrete implementation the crate ships so it
//! can be run end to end without a companion RPC project.

pub mod tcp;

pub use self::tcp::TcpPeerClient;
