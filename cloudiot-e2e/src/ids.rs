//! Identifiers for one suite run
//!
//! Topic and registry names carry a random v4 UUID suffix so concurrent runs
//! against the same project never collide.

use uuid::Uuid;

pub const TOPIC_PREFIX: &str = "nodejs-docs-samples-test-iot-";
pub const REGISTRY_PREFIX: &str = "nodejs-test-registry-iot-";
/// Suite-level device id. The cases provision [`LOCAL_DEVICE_ID`] instead.
pub const SUITE_DEVICE_ID: &str = "test-node-device";
pub const LOCAL_DEVICE_ID: &str = "test-rsa-device";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIds {
    pub topic: String,
    pub registry: String,
    pub device: String,
}

impl RunIds {
    pub fn generate() -> Self {
        Self::new(
            format!("{}{}", TOPIC_PREFIX, Uuid::new_v4()),
            format!("{}{}", REGISTRY_PREFIX, Uuid::new_v4()),
        )
    }

    pub fn new(topic: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            registry: registry.into(),
            device: SUITE_DEVICE_ID.to_string(),
        }
    }

    /// Registry used by the RS256 cases
    pub fn rsa256_registry(&self) -> String {
        format!("{}-rsa256", self.registry)
    }
}
