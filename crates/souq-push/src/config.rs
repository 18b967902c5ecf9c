use serde::{Deserialize, Serialize};

/// Push gateway provider configuration (credentials are secrets).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Multicast endpoint, e.g. "https://fcm.googleapis.com/fcm/send".
    pub endpoint: String,

    /// Server key sent as `Authorization: key=...`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_key: Option<String>,

    /// Gateway request timeout in milliseconds. A timed-out call is a
    /// transport failure: no report, no pruning.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl GatewayConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            server_key: None,
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn with_server_key(mut self, key: impl Into<String>) -> Self {
        self.server_key = Some(key.into());
        self
    }
}

/// Mask secrets before echoing config back out (logs, admin responses)
pub fn mask_secrets(mut config: GatewayConfig) -> GatewayConfig {
    if config.server_key.is_some() {
        config.server_key = Some("***".to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_secrets_hides_server_key() {
        let config = GatewayConfig::new("https://fcm.example/send").with_server_key("AAAA-secret");
        let masked = mask_secrets(config);
        assert_eq!(masked.server_key.as_deref(), Some("***"));
        assert_eq!(masked.endpoint, "https://fcm.example/send");
    }

    #[test]
    fn timeout_defaults_on_deserialize() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"endpoint":"https://fcm.example/send"}"#).unwrap();
        assert_eq!(config.timeout_ms, 10_000);
        assert!(config.server_key.is_none());
    }
}
