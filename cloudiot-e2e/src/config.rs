use std::path::PathBuf;
use std::time::Duration;

use crate::helpers::{DEFAULT_COMMAND_TIMEOUT, E2EError, E2EResult};

fn default_helper() -> String {
    "node ../manager/manager.js".to_string()
}

fn default_sample() -> String {
    "node cloudiot_mqtt_example_nodejs.js".to_string()
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Working directory for every helper and sample invocation
    pub sample_dir: PathBuf,
    /// Device manager command line, subcommands are appended
    pub helper: String,
    /// MQTT sample command line, flags are appended
    pub sample: String,
    pub private_key_file: String,
    pub cert_file: String,
    pub algorithm: String,
    pub num_messages: u32,
    pub command_timeout: Duration,
    pub project_id: Option<String>,
    pub application_credentials: Option<PathBuf>,
    /// Pre-minted OAuth token, otherwise one is requested from gcloud
    pub access_token: Option<String>,
    /// `host:port` of a local Pub/Sub emulator
    pub emulator_host: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            sample_dir: PathBuf::from("."),
            helper: default_helper(),
            sample: default_sample(),
            private_key_file: "resources/rsa_private.pem".to_string(),
            cert_file: "resources/rsa_cert.pem".to_string(),
            algorithm: "RS256".to_string(),
            num_messages: 1,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            project_id: None,
            application_credentials: None,
            access_token: None,
            emulator_host: None,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> E2EResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> E2EResult<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let num_messages = match var("CLOUDIOT_NUM_MESSAGES") {
            Some(raw) => raw.parse().map_err(|_| {
                E2EError::Config(format!("CLOUDIOT_NUM_MESSAGES is not a number: {}", raw))
            })?,
            None => defaults.num_messages,
        };

        let command_timeout = match var("CLOUDIOT_CMD_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                E2EError::Config(format!("CLOUDIOT_CMD_TIMEOUT_SECS is not a number: {}", raw))
            })?),
            None => defaults.command_timeout,
        };

        Ok(Self {
            sample_dir: var("CLOUDIOT_SAMPLE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.sample_dir),
            helper: var("CLOUDIOT_HELPER").unwrap_or(defaults.helper),
            sample: var("CLOUDIOT_SAMPLE").unwrap_or(defaults.sample),
            private_key_file: var("CLOUDIOT_PRIVATE_KEY").unwrap_or(defaults.private_key_file),
            cert_file: var("CLOUDIOT_CERT").unwrap_or(defaults.cert_file),
            algorithm: var("CLOUDIOT_ALGORITHM").unwrap_or(defaults.algorithm),
            num_messages,
            command_timeout,
            project_id: var("GCLOUD_PROJECT").or_else(|| var("GOOGLE_CLOUD_PROJECT")),
            application_credentials: var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            access_token: var("GOOGLE_OAUTH_ACCESS_TOKEN"),
            emulator_host: var("PUBSUB_EMULATOR_HOST"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.helper, "node ../manager/manager.js");
        assert_eq!(cfg.sample, "node cloudiot_mqtt_example_nodejs.js");
        assert_eq!(cfg.private_key_file, "resources/rsa_private.pem");
        assert_eq!(cfg.cert_file, "resources/rsa_cert.pem");
        assert_eq!(cfg.algorithm, "RS256");
        assert_eq!(cfg.num_messages, 1);
        assert_eq!(cfg.command_timeout, DEFAULT_COMMAND_TIMEOUT);
        assert!(cfg.project_id.is_none());
        assert!(cfg.emulator_host.is_none());
    }

    #[test]
    fn test_overrides_from_env() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[
            ("CLOUDIOT_SAMPLE_DIR", "/opt/mqtt_example"),
            ("CLOUDIOT_NUM_MESSAGES", "5"),
            ("CLOUDIOT_CMD_TIMEOUT_SECS", "30"),
            ("GOOGLE_CLOUD_PROJECT", "iot-project"),
            ("PUBSUB_EMULATOR_HOST", "localhost:8085"),
        ]))
        .unwrap();
        assert_eq!(cfg.sample_dir, PathBuf::from("/opt/mqtt_example"));
        assert_eq!(cfg.num_messages, 5);
        assert_eq!(cfg.command_timeout, Duration::from_secs(30));
        assert_eq!(cfg.project_id.as_deref(), Some("iot-project"));
        assert_eq!(cfg.emulator_host.as_deref(), Some("localhost:8085"));
    }

    #[test]
    fn test_gcloud_project_takes_precedence() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[
            ("GCLOUD_PROJECT", "first"),
            ("GOOGLE_CLOUD_PROJECT", "second"),
        ]))
        .unwrap();
        assert_eq!(cfg.project_id.as_deref(), Some("first"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[("CLOUDIOT_HELPER", "  ")])).unwrap();
        assert_eq!(cfg.helper, "node ../manager/manager.js");
    }

    #[test]
    fn test_invalid_num_messages() {
        let err = HarnessConfig::from_lookup(lookup_from(&[("CLOUDIOT_NUM_MESSAGES", "many")]))
            .unwrap_err();
        assert!(matches!(err, E2EError::Config(_)));
    }
}
