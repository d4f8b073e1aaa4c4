//! Backend endpoint configuration

use serde::{Deserialize, Serialize};

/// Where the processing backend and the upload server live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the processing backend, endpoint paths are appended to it
    pub base_url: String,
    /// URL that accepts multipart uploads
    pub upload_url: String,
    /// Per-request timeout in seconds, `None` waits forever
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001/".to_string(),
            upload_url: "http://127.0.0.1:3333/".to_string(),
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: BackendConfig = serde_json::from_str(r#"{"base_url": "http://backend:9000/"}"#).unwrap();

        assert_eq!(config.base_url, "http://backend:9000/");
        assert_eq!(config.upload_url, BackendConfig::default().upload_url);
        assert_eq!(config.timeout_secs, None);
    }
}
