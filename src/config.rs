//! Config loading: a YAML- or JSON-formatted file describing the static
//! cluster layout and the poller's tunables, sniffed and parsed the same way
//! `linkerd_tcp::config::from_str`/`app::AppConfig::from_str` do:
//! `serde_json` if it looks like `{...}`, `serde_yaml` otherwise.

use std::collections::BTreeSet;

use serde_json;
use serde_yaml;

use endpoint::Endpoint;
use epoch::Epoch;
use error::ConfigError;
use layout::StaticLayout;
use poller::PollerConfig;

pub fn from_str(txt: &str) -> Result<ClusterConfig, ConfigError> {
    let txt = txt.trim_left();
    if txt.starts_with('{') {
        serde_json::from_str(txt).map_err(|e| ConfigError::Parse(format!("{}", e)))
    } else {
        serde_yaml::from_str(txt).map_err(|e| ConfigError::Parse(format!("{}", e)))
    }
}

/// The layout and poller tunables for one `cluster-fd` instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ClusterConfig {
    pub local_endpoint: String,
    pub servers: Vec<String>,
    pub epoch: i64,
    pub poller: Option<PollerTomlConfig>,
}

/// Spec §6: "Exposed as setters before the first call to `poll`." Every
/// field is optional here; absent fields fall back to `PollerConfig`'s
/// spec-mandated defaults.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PollerTomlConfig {
    pub failure_threshold: Option<u32>,
    pub init_period_duration_ms: Option<u64>,
    pub max_period_duration_ms: Option<u64>,
    pub period_delta_ms: Option<u64>,
    pub initial_poll_interval_ms: Option<u64>,
}

impl ClusterConfig {
    pub fn local_endpoint(&self) -> Endpoint {
        Endpoint::from(self.local_endpoint.clone())
    }

    pub fn layout(&self) -> StaticLayout {
        let servers: BTreeSet<Endpoint> = self.servers.iter().map(|s| Endpoint::from(s.as_str())).collect();
        StaticLayout::new(servers, Epoch::new(self.epoch))
    }

    /// Enforces `initPeriodDuration <= maxPeriodDuration`,
    /// `periodDelta >= 0` (trivially true, the field is unsigned here),
    /// and `failureThreshold >= 1`.
    pub fn poller_config(&self) -> Result<PollerConfig, ConfigError> {
        let mut config = PollerConfig::default();
        if let Some(ref p) = self.poller {
            if let Some(v) = p.failure_threshold {
                config.failure_threshold = v;
            }
            if let Some(v) = p.init_period_duration_ms {
                config.init_period_duration_ms = v;
            }
            if let Some(v) = p.max_period_duration_ms {
                config.max_period_duration_ms = v;
            }
            if let Some(v) = p.period_delta_ms {
                config.period_delta_ms = v;
            }
            if let Some(v) = p.initial_poll_interval_ms {
                config.initial_poll_interval_ms = v;
            }
        }
        if config.failure_threshold < 1 {
            return Err(ConfigError::Invalid("failureThreshold must be >= 1"));
        }
        if config.init_period_duration_ms > config.max_period_duration_ms {
            return Err(ConfigError::Invalid("initPeriodDuration must be <= maxPeriodDuration"));
        }
        Ok(config)
    }
}
