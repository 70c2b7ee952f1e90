//! Pub/Sub topic administration used for suite setup and teardown

mod credentials;
mod rest;

pub use credentials::*;
pub use rest::*;

use crate::helpers::E2EResult;

/// Creates and deletes the topic the registry forwards telemetry to
#[async_trait::async_trait]
pub trait TopicAdmin: Send + Sync {
    /// Fail early when the environment cannot reach the project
    async fn check_credentials(&self) -> E2EResult<()> {
        Ok(())
    }

    /// Create `name` and return the topic's full resource name
    async fn create_topic(&self, name: &str) -> E2EResult<String>;

    async fn delete_topic(&self, name: &str) -> E2EResult<()>;
}
