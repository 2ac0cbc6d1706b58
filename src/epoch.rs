use std::fmt;

/// A monotonically non-decreasing version number stamped on every cluster
/// observation. The sentinel `-1` means "unknown".
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialOrd, PartialEq, Serialize, Deserialize)]
pub struct Epoch(i64);

impl Epoch {
    pub const UNKNOWN: Epoch = Epoch(-1);

    pub fn new(v: i64) -> Epoch {
        Epoch(v)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == -1
    }
}

impl Default for Epoch {
    fn default() -> Epoch {
        Epoch::UNKNOWN
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Epoch {
    fn from(v: i64) -> Epoch {
        Epoch(v)
    }
}

#[cfg(test)]
mod tests {
    use super::Epoch;

    #[test]
    fn unknown_is_minus_one() {
        assert_eq!(Epoch::UNKNOWN.get(), -1);
        assert!(Epoch::UNKNOWN.is_unknown());
        assert!(!Epoch::new(0).is_unknown());
    }
}
