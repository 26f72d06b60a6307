use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use streamgate_types::CredentialIdentity;

fn default_safety_margin_secs() -> u64 {
    60
}
fn default_refresh_wait_secs() -> u64 {
    30
}
fn default_failure_cooldown_secs() -> u64 {
    30
}
fn default_max_frame_len() -> u32 {
    16 * 1024 * 1024
}
fn default_write_timeout_secs() -> u64 {
    10
}

/// Token acquisition tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Tokens with less than this much lifetime left count as expired.
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,
    /// Bound on waiting for a refresh outcome, own or shared.
    #[serde(default = "default_refresh_wait_secs")]
    pub refresh_wait_secs: u64,
    /// How long a failed identity is skipped before being retried.
    #[serde(default = "default_failure_cooldown_secs")]
    pub failure_cooldown_secs: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    #[must_use]
    pub fn refresh_wait(&self) -> Duration {
        Duration::from_secs(self.refresh_wait_secs)
    }

    #[must_use]
    pub fn failure_cooldown(&self) -> Duration {
        Duration::from_secs(self.failure_cooldown_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            safety_margin_secs: default_safety_margin_secs(),
            refresh_wait_secs: default_refresh_wait_secs(),
            failure_cooldown_secs: default_failure_cooldown_secs(),
        }
    }
}

/// Streaming pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Frames declaring a longer length are rejected as corrupt.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: u32,
    /// Bound on waiting for the downstream sink to accept one event.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl StreamConfig {
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream credential identities, tried in priority order.
    #[serde(default)]
    pub identities: Vec<CredentialIdentity>,
    /// Token acquisition tuning.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Streaming pipeline tuning.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Back-protocol event kind → front-protocol kind tag. Kinds absent
    /// from the table pass through as opaque events.
    #[serde(default)]
    pub events: HashMap<String, String>,
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamgate_types::IdentityId;

    const SAMPLE_YAML: &str = r#"
identities:
  - id: "primary"
    token_url: "https://auth.example.com/token"
    client_id: "gateway"
    refresh_token: "rt-primary"
  - id: "fallback"
    token_url: "https://auth.example.com/token"
    refresh_token: "rt-fallback"
    priority: 5
auth:
  safety_margin_secs: 120
stream:
  max_frame_len: 1048576
events:
  delta: "message_delta"
  end: "message_stop"
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert!(c.identities.is_empty());
        assert_eq!(c.auth.safety_margin_secs, 60);
        assert_eq!(c.auth.refresh_wait_secs, 30);
        assert_eq!(c.auth.failure_cooldown_secs, 30);
        assert_eq!(c.stream.max_frame_len, 16 * 1024 * 1024);
        assert_eq!(c.stream.write_timeout_secs, 10);
        assert!(c.events.is_empty());
    }

    #[test]
    fn test_from_yaml_identities() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.identities.len(), 2);
        assert_eq!(c.identities[0].id, IdentityId::new("primary"));
        assert_eq!(c.identities[0].client_id.as_deref(), Some("gateway"));
        assert_eq!(c.identities[0].priority, 0);
        assert_eq!(c.identities[1].priority, 5);
    }

    #[test]
    fn test_from_yaml_partial_override_keeps_defaults() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.auth.safety_margin_secs, 120);
        // Untouched fields keep their defaults.
        assert_eq!(c.auth.refresh_wait_secs, 30);
        assert_eq!(c.stream.max_frame_len, 1_048_576);
        assert_eq!(c.stream.write_timeout_secs, 10);
    }

    #[test]
    fn test_from_yaml_event_map() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.events.get("delta").map(String::as_str), Some("message_delta"));
        assert_eq!(c.events.get("end").map(String::as_str), Some("message_stop"));
    }

    #[test]
    fn test_duration_accessors() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.auth.safety_margin(), Duration::from_secs(120));
        assert_eq!(c.stream.write_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(SAMPLE_YAML.as_bytes()).unwrap();
        let c = Config::from_file(file.path()).unwrap();
        assert_eq!(c.identities.len(), 2);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(Config::from_yaml("identities: {not: [valid").is_err());
    }
}
