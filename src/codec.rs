//! Wire codec: a length-prefixed, field-ordered binary format
//! for `NodeConnectivity`, `NodeState`, and `ClusterState`. Built on
//! `bytes::{Buf, BufMut}`: `encode` writes big-endian fixed-width
//! integers and length-prefixed strings into anything implementing
//! `BufMut`; `decode` reads them back from anything implementing `Buf`
//! (a `BytesMut`, or an `io::Cursor<&[u8]>` for a received datagram).
//!
//! Decoders accept map entries in any order but always
//! produce a `BTreeMap`, so round-tripping through `encode`/`decode`
//! never depends on the encoder's iteration order.

use std::collections::BTreeMap;
use std::str;

use bytes::{Buf, BufMut};

use cluster_state::ClusterState;
use endpoint::Endpoint;
use epoch::Epoch;
use error::CodecError;
use heartbeat::Heartbeat;
use model::{ConnectionStatus, NodeConnectivity, NodeConnectivityType};
use node_state::NodeState;
use sequencer::SequencerMetrics;

pub trait Encode {
    fn encode<B: BufMut>(&self, buf: &mut B);
}

pub trait Decode: Sized {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError>;
}

fn ensure<B: Buf>(buf: &B, n: usize) -> Result<(), CodecError> {
    if buf.remaining() < n {
        Err(CodecError::UnexpectedEof)
    } else {
        Ok(())
    }
}

fn get_u8<B: Buf>(buf: &mut B) -> Result<u8, CodecError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_i32<B: Buf>(buf: &mut B) -> Result<i32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32_be())
}

fn get_i64<B: Buf>(buf: &mut B) -> Result<i64, CodecError> {
    ensure(buf, 8)?;
    Ok(buf.get_i64_be())
}

/// Writes a present string: `i32` length, then the UTF-8 bytes. The
/// `-1`-length "absent" sentinel is never produced here since
/// every field this codec encodes is always present; `decode_opt_str`
/// below still honors it on the read side for forward compatibility.
fn put_str<B: BufMut>(buf: &mut B, s: &str) {
    buf.put_i32_be(s.len() as i32);
    buf.put_slice(s.as_bytes());
}

fn decode_opt_str<B: Buf>(buf: &mut B) -> Result<Option<String>, CodecError> {
    let len = get_i32(buf)?;
    if len == -1 {
        return Ok(None);
    }
    if len < 0 {
        return Err(CodecError::InvalidLength(len));
    }
    let len = len as usize;
    ensure(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    let s = str::from_utf8(&bytes)?;
    Ok(Some(s.to_owned()))
}

fn get_str<B: Buf>(buf: &mut B) -> Result<String, CodecError> {
    match decode_opt_str(buf)? {
        Some(s) => Ok(s),
        None => Err(CodecError::InvalidLength(-1)),
    }
}

impl Encode for NodeConnectivityType {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        let name = match *self {
            NodeConnectivityType::NotReady => "NOT_READY",
            NodeConnectivityType::Connected => "CONNECTED",
            NodeConnectivityType::Unavailable => "UNAVAILABLE",
        };
        put_str(buf, name);
    }
}

impl Decode for NodeConnectivityType {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let name = get_str(buf)?;
        match name.as_str() {
            "NOT_READY" => Ok(NodeConnectivityType::NotReady),
            "CONNECTED" => Ok(NodeConnectivityType::Connected),
            "UNAVAILABLE" => Ok(NodeConnectivityType::Unavailable),
            _ => Err(CodecError::UnknownEnum(name)),
        }
    }
}

impl Encode for ConnectionStatus {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        let name = match *self {
            ConnectionStatus::Ok => "OK",
            ConnectionStatus::Failed => "FAILED",
        };
        put_str(buf, name);
    }
}

impl Decode for ConnectionStatus {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let name = get_str(buf)?;
        match name.as_str() {
            "OK" => Ok(ConnectionStatus::Ok),
            "FAILED" => Ok(ConnectionStatus::Failed),
            _ => Err(CodecError::UnknownEnum(name)),
        }
    }
}

impl Encode for NodeConnectivity {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_str(buf, self.endpoint.as_str());
        self.conn_type.encode(buf);
        buf.put_i32_be(self.connectivity.len() as i32);
        for (peer, status) in &self.connectivity {
            put_str(buf, peer.as_str());
            status.encode(buf);
        }
        buf.put_i64_be(self.epoch.get());
    }
}

impl Decode for NodeConnectivity {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let endpoint = Endpoint::from(get_str(buf)?);
        let conn_type = NodeConnectivityType::decode(buf)?;
        let count = get_i32(buf)?;
        if count < 0 {
            return Err(CodecError::InvalidLength(count));
        }
        let mut connectivity = BTreeMap::new();
        for _ in 0..count {
            let peer = Endpoint::from(get_str(buf)?);
            let status = ConnectionStatus::decode(buf)?;
            connectivity.insert(peer, status);
        }
        let epoch = Epoch::from(get_i64(buf)?);
        Ok(NodeConnectivity {
            endpoint: endpoint,
            conn_type: conn_type,
            connectivity: connectivity,
            epoch: epoch,
        })
    }
}

impl Encode for SequencerMetrics {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_be(self.sequencer_epoch.get());
        buf.put_u8(if self.ready { 1 } else { 0 });
    }
}

impl Decode for SequencerMetrics {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let sequencer_epoch = Epoch::from(get_i64(buf)?);
        let ready = get_u8(buf)? != 0;
        Ok(SequencerMetrics {
            sequencer_epoch: sequencer_epoch,
            ready: ready,
        })
    }
}

impl Encode for NodeState {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.connectivity.encode(buf);
        self.sequencer_metrics.encode(buf);
        buf.put_i64_be(self.heartbeat.epoch.get());
        buf.put_i64_be(self.heartbeat.counter);
    }
}

impl Decode for NodeState {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let connectivity = NodeConnectivity::decode(buf)?;
        let sequencer_metrics = SequencerMetrics::decode(buf)?;
        let epoch = Epoch::from(get_i64(buf)?);
        let counter = get_i64(buf)?;
        Ok(NodeState {
            connectivity: connectivity,
            sequencer_metrics: sequencer_metrics,
            heartbeat: Heartbeat { epoch: epoch, counter: counter },
        })
    }
}

impl Encode for ClusterState {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32_be(self.nodes.len() as i32);
        for (endpoint, state) in &self.nodes {
            put_str(buf, endpoint.as_str());
            state.encode(buf);
        }
        put_str(buf, self.local_endpoint.as_str());
    }
}

impl Decode for ClusterState {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let count = get_i32(buf)?;
        if count < 0 {
            return Err(CodecError::InvalidLength(count));
        }
        let mut nodes = BTreeMap::new();
        for _ in 0..count {
            let endpoint = Endpoint::from(get_str(buf)?);
            let state = NodeState::decode(buf)?;
            nodes.insert(endpoint, state);
        }
        let local_endpoint = Endpoint::from(get_str(buf)?);
        Ok(ClusterState {
            local_endpoint: local_endpoint,
            nodes: nodes,
        })
    }
}
