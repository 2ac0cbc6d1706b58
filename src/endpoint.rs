use std::fmt;

/// An opaque, printable identifier for a cluster member (conventionally a
/// `host:port` string). `Endpoint`s are compared lexicographically, which
/// gives `ClusterState.nodes` and `NodeConnectivity.connectivity` their
/// "comparable by endpoint" ordering for free when stored in a `BTreeMap`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialOrd, PartialEq, Serialize, Deserialize)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Endpoint {
        Endpoint(s)
    }
}

impl<'a> From<&'a str> for Endpoint {
    fn from(s: &'a str) -> Endpoint {
        Endpoint(s.to_owned())
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;
    use std::collections::BTreeSet;

    #[test]
    fn orders_lexicographically() {
        let mut set = BTreeSet::new();
        set.insert(Endpoint::from("b:1"));
        set.insert(Endpoint::from("a:1"));
        set.insert(Endpoint::from("c:1"));
        let ordered: Vec<_> = set.iter().map(|e| e.as_str()).collect();
        assert_eq!(ordered, vec!["a:1", "b:1", "c:1"]);
    }
}
