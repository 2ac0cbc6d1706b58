//! Spec §3 `SUPPLEMENT`: `sequencerMetrics` is named by `NodeState` but its
//! shape belongs to the out-of-scope sequencer subsystem. This core only
//! needs the type to exist, be comparable, and round-trip through the
//! codec. It never populates more than the defaults below.

use epoch::Epoch;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SequencerMetrics {
    pub sequencer_epoch: Epoch,
    pub ready: bool,
}

impl SequencerMetrics {
    pub fn unknown() -> SequencerMetrics {
        SequencerMetrics::default()
    }
}
