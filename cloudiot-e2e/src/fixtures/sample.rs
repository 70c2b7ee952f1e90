//! MQTT sample fixture

use std::fmt;

use crate::config::HarnessConfig;
use crate::helpers::{CommandRunner, E2EResult};

/// Kind of message the sample publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Telemetry, forwarded to the registry's Pub/Sub topic
    Events,
    /// Device state, readable through `getDeviceState`
    State,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Events => write!(f, "events"),
            MessageType::State => write!(f, "state"),
        }
    }
}

/// Builder for MQTT sample invocations
pub struct MqttSample {
    runner: CommandRunner,
    program: String,
    num_messages: u32,
    private_key_file: String,
    algorithm: String,
}

impl MqttSample {
    pub fn new(runner: CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            num_messages: 1,
            private_key_file: "resources/rsa_private.pem".to_string(),
            algorithm: "RS256".to_string(),
        }
    }

    pub fn from_config(runner: CommandRunner, cfg: &HarnessConfig) -> Self {
        Self::new(runner, cfg.sample.clone())
            .num_messages(cfg.num_messages)
            .private_key_file(cfg.private_key_file.clone())
            .algorithm(cfg.algorithm.clone())
    }

    pub fn num_messages(mut self, n: u32) -> Self {
        self.num_messages = n;
        self
    }

    pub fn private_key_file(mut self, path: impl Into<String>) -> Self {
        self.private_key_file = path.into();
        self
    }

    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn command_line(&self, message_type: MessageType, registry: &str, device: &str) -> String {
        format!(
            r#"{} --message_type={} --registry_id="{}" --device_id="{}" --num_messages={} --private_key_file={} --algorithm={}"#,
            self.program,
            message_type,
            registry,
            device,
            self.num_messages,
            self.private_key_file,
            self.algorithm
        )
    }

    /// Connect as `device` and publish, returning the sample's stdout
    pub async fn publish(
        &self,
        message_type: MessageType,
        registry: &str,
        device: &str,
    ) -> E2EResult<String> {
        tracing::info!("Publishing {} as {}/{}", message_type, registry, device);
        self.runner
            .run(&self.command_line(message_type, registry, device))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_defaults() {
        let sample = MqttSample::new(
            CommandRunner::new("."),
            "node cloudiot_mqtt_example_nodejs.js",
        );
        assert_eq!(
            sample.command_line(MessageType::Events, "reg-rsa256", "test-rsa-device"),
            "node cloudiot_mqtt_example_nodejs.js --message_type=events --registry_id=\"reg-rsa256\" \
             --device_id=\"test-rsa-device\" --num_messages=1 \
             --private_key_file=resources/rsa_private.pem --algorithm=RS256"
        );
    }

    #[test]
    fn test_command_line_from_config() {
        let cfg = HarnessConfig {
            num_messages: 3,
            algorithm: "ES256".to_string(),
            private_key_file: "resources/ec_private.pem".to_string(),
            ..HarnessConfig::default()
        };
        let sample = MqttSample::from_config(CommandRunner::new("."), &cfg);
        let line = sample.command_line(MessageType::State, "r", "d");
        assert!(line.contains("--message_type=state"));
        assert!(line.contains("--num_messages=3"));
        assert!(line.contains("--private_key_file=resources/ec_private.pem"));
        assert!(line.ends_with("--algorithm=ES256"));
    }
}
