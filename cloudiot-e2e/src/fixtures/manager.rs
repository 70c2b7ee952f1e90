//! Device manager fixture
//!
//! Thin wrapper over the device-management helper CLI. Every call returns the
//! helper's stdout; callers decide what to assert on.

use crate::helpers::{CommandRunner, E2EResult};

pub struct DeviceManager {
    runner: CommandRunner,
    helper: String,
}

impl DeviceManager {
    pub fn new(runner: CommandRunner, helper: impl Into<String>) -> Self {
        Self {
            runner,
            helper: helper.into(),
        }
    }

    /// Full command line for a helper subcommand
    pub fn command_line(&self, subcommand: &str, args: &[&str]) -> String {
        let mut line = format!("{} {}", self.helper, subcommand);
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    async fn call(&self, subcommand: &str, args: &[&str]) -> E2EResult<String> {
        let output = self.runner.run(&self.command_line(subcommand, args)).await?;
        tracing::debug!("{} -> {}", subcommand, output);
        Ok(output)
    }

    /// Grant the Cloud IoT service account publish rights on the topic
    pub async fn setup_iot_topic(&self, topic: &str) -> E2EResult<String> {
        self.call("setupIotTopic", &[topic]).await
    }

    pub async fn create_registry(&self, registry: &str, topic: &str) -> E2EResult<String> {
        self.call("createRegistry", &[registry, topic]).await
    }

    pub async fn create_rsa256_device(
        &self,
        device: &str,
        registry: &str,
        cert_file: &str,
    ) -> E2EResult<String> {
        self.call("createRsa256Device", &[device, registry, cert_file]).await
    }

    pub async fn get_device_state(&self, device: &str, registry: &str) -> E2EResult<String> {
        self.call("getDeviceState", &[device, registry]).await
    }

    pub async fn delete_device(&self, device: &str, registry: &str) -> E2EResult<String> {
        self.call("deleteDevice", &[device, registry]).await
    }

    pub async fn delete_registry(&self, registry: &str) -> E2EResult<String> {
        self.call("deleteRegistry", &[registry]).await
    }
}
