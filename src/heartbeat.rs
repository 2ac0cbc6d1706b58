//! The local monotone counter stamped into every emitted `NodeState`.
//! Shared read-write between the Poller and the Collector on the same
//! thread, so no synchronization is needed. Scoped to one `Poller`
//! instance, no global mutable state.

use std::cell::Cell;

use epoch::Epoch;

/// `(epoch, counter)` stamped on a `NodeState`. Used as an
/// aggregation tiebreaker and freshness hint. The aggregator's
/// "latest wins" rule is defined in terms of input ordering, not this
/// counter directly, but callers (tests, diagnostics) compare it to
/// confirm recency.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub epoch: Epoch,
    pub counter: i64,
}

/// A single-threaded, monotonically increasing counter. `Cell` is enough:
/// the poller never holds a `Heartbeat` across a suspension point while
/// also advancing the counter from another task.
#[derive(Debug, Default)]
pub struct HeartbeatCounter {
    counter: Cell<i64>,
}

impl HeartbeatCounter {
    pub fn new() -> HeartbeatCounter {
        HeartbeatCounter { counter: Cell::new(0) }
    }

    /// Increments and returns the new value. Called once per collection,
    /// and the returned value is embedded in that collection's local
    /// `NodeState`.
    pub fn next(&self) -> i64 {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        next
    }

    pub fn current(&self) -> i64 {
        self.counter.get()
    }
}
