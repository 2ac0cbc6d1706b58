//! Error taxonomy for the failure-detection core.
//!
//! Kinds are surfaced by name (via `Display`), never by downcasting: the
//! poller never lets a per-peer error escape `poll()`, it folds them into
//! the `PollReport` instead. Only `ModelError::InvalidConfiguration` is
//! meant to reach a caller directly.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::str::Utf8Error;

use epoch::Epoch;
use endpoint::Endpoint;

/// Malformed wire payload.
#[derive(Debug)]
pub enum CodecError {
    /// The buffer ran out before a length-prefixed field could be read.
    UnexpectedEof,
    /// An enum name didn't match any known variant.
    UnknownEnum(String),
    /// A length prefix was negative (other than the `-1` absent-string
    /// sentinel, which callers handle before this variant is raised).
    InvalidLength(i32),
    /// A string field wasn't valid UTF-8.
    Utf8(Utf8Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CodecError::UnexpectedEof => write!(f, "unexpected end of buffer"),
            CodecError::UnknownEnum(ref name) => write!(f, "unknown enum variant: {}", name),
            CodecError::InvalidLength(n) => write!(f, "invalid length prefix: {}", n),
            CodecError::Utf8(ref e) => write!(f, "invalid utf-8: {}", e),
        }
    }
}

impl StdError for CodecError {
    fn description(&self) -> &str {
        "malformed wire payload"
    }
}

impl From<Utf8Error> for CodecError {
    fn from(e: Utf8Error) -> CodecError {
        CodecError::Utf8(e)
    }
}

/// The outcome of one probe to one peer.
#[derive(Debug)]
pub enum ProbeError {
    /// The probe exceeded its per-client timeout.
    Timeout,
    /// A socket or I/O fault.
    Transport(io::Error),
    /// The peer replied, but at a different epoch.
    WrongEpoch(Epoch),
    /// The peer replied, but the payload didn't decode.
    Codec(CodecError),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProbeError::Timeout => write!(f, "probe timed out"),
            ProbeError::Transport(ref e) => write!(f, "transport error: {}", e),
            ProbeError::WrongEpoch(e) => write!(f, "peer at wrong epoch: {}", e),
            ProbeError::Codec(ref e) => write!(f, "codec error: {}", e),
        }
    }
}

impl StdError for ProbeError {
    fn description(&self) -> &str {
        "peer probe failed"
    }
}

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> ProbeError {
        ProbeError::Transport(e)
    }
}

impl From<CodecError> for ProbeError {
    fn from(e: CodecError) -> ProbeError {
        // A peer that can't even be decoded is, from the poller's point of
        // view, indistinguishable from one that never replied: both are
        // folded into `UNAVAILABLE` by the collector, same as any other failure.
        ProbeError::Codec(e)
    }
}

/// Errors raised by `ConnectivityModel` queries and by the poller's own
/// configuration validation.
#[derive(Debug)]
pub enum ModelError {
    /// `failureThreshold < 1`, or a status query against an `UNAVAILABLE`
    /// node's empty connectivity row.
    InvalidConfiguration(&'static str),
    /// `getConnectionStatus` was asked about a peer absent from the row.
    PeerNotFound(Endpoint),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ModelError::InvalidConfiguration(why) => write!(f, "invalid configuration: {}", why),
            ModelError::PeerNotFound(ref e) => write!(f, "peer not found: {}", e),
        }
    }
}

impl StdError for ModelError {
    fn description(&self) -> &str {
        "cluster model error"
    }
}

/// Errors raised while loading a layout/poller configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::Parse(ref msg) => write!(f, "configuration parse error: {}", msg),
            ConfigError::Invalid(why) => write!(f, "invalid configuration: {}", why),
        }
    }
}

impl StdError for ConfigError {
    fn description(&self) -> &str {
        "configuration error"
    }
}

impl From<String> for ConfigError {
    fn from(s: String) -> ConfigError {
        ConfigError::Parse(s)
    }
}

impl<'a> From<&'a str> for ConfigError {
    fn from(s: &'a str) -> ConfigError {
        ConfigError::Parse(s.to_owned())
    }
}
