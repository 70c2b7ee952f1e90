//! Acceptance cases for the Cloud IoT MQTT sample
//!
//! Every case provisions its own RS256 registry and device, publishes through
//! the sample, then reads state and tears the registry down again. The shared
//! Pub/Sub topic is created before the first case and deleted after the last.

use std::sync::Arc;

use crate::config::HarnessConfig;
use crate::fixtures::{DeviceManager, MessageType, MqttSample};
use crate::helpers::{CommandRunner, E2EResult, assert_matches};
use crate::ids::{LOCAL_DEVICE_ID, RunIds};
use crate::pubsub::TopicAdmin;
use crate::suite::Suite;

pub const SUITE_NAME: &str = "cloudiot_mqtt_example";
pub const RECEIVE_CONFIGURATION: &str = "should receive configuration message";
pub const SEND_EVENT: &str = "should send event message";
pub const SEND_STATE: &str = "should send state message";

pub struct ScenarioContext {
    pub ids: RunIds,
    pub cert_file: String,
    pub manager: DeviceManager,
    pub sample: MqttSample,
    pub topics: Arc<dyn TopicAdmin>,
}

impl ScenarioContext {
    pub fn from_config(cfg: &HarnessConfig, ids: RunIds, topics: Arc<dyn TopicAdmin>) -> Self {
        let runner = CommandRunner::new(&cfg.sample_dir).with_timeout(cfg.command_timeout);
        Self {
            ids,
            cert_file: cfg.cert_file.clone(),
            manager: DeviceManager::new(runner.clone(), cfg.helper.clone()),
            sample: MqttSample::from_config(runner, cfg),
            topics,
        }
    }
}

pub fn build_suite(ctx: ScenarioContext) -> Suite<ScenarioContext> {
    Suite::new(SUITE_NAME, ctx)
        .before(|ctx: Arc<ScenarioContext>| async move { ctx.topics.check_credentials().await })
        .before(|ctx: Arc<ScenarioContext>| async move {
            ctx.topics.create_topic(&ctx.ids.topic).await.map(|_| ())
        })
        .after_always(|ctx: Arc<ScenarioContext>| async move {
            ctx.topics.delete_topic(&ctx.ids.topic).await
        })
        .case(RECEIVE_CONFIGURATION, receive_configuration_message)
        .case(SEND_EVENT, |ctx| publish_and_clean_up(ctx, MessageType::Events))
        .case(SEND_STATE, |ctx| publish_and_clean_up(ctx, MessageType::State))
}

/// Topic binding, registry and device. Returns the device creation output.
async fn provision(ctx: &ScenarioContext, registry: &str) -> E2EResult<String> {
    ctx.manager.setup_iot_topic(&ctx.ids.topic).await?;
    ctx.manager.create_registry(registry, &ctx.ids.topic).await?;
    ctx.manager
        .create_rsa256_device(LOCAL_DEVICE_ID, registry, &ctx.cert_file)
        .await
}

async fn receive_configuration_message(ctx: Arc<ScenarioContext>) -> E2EResult<()> {
    let registry = ctx.ids.rsa256_registry();

    let output = provision(&ctx, &registry).await?;
    assert_matches(&output, "Created device")?;

    let output = ctx
        .sample
        .publish(MessageType::Events, &registry, LOCAL_DEVICE_ID)
        .await?;
    assert_matches(&output, "message received")?;

    let output = ctx.manager.get_device_state(LOCAL_DEVICE_ID, &registry).await?;
    assert_matches(&output, "State")?;
    let output = ctx.manager.delete_device(LOCAL_DEVICE_ID, &registry).await?;
    assert_matches(&output, "Successfully deleted device")?;
    ctx.manager.delete_registry(&registry).await?;
    Ok(())
}

async fn publish_and_clean_up(
    ctx: Arc<ScenarioContext>,
    message_type: MessageType,
) -> E2EResult<()> {
    let registry = ctx.ids.rsa256_registry();

    provision(&ctx, &registry).await?;

    let output = ctx
        .sample
        .publish(message_type, &registry, LOCAL_DEVICE_ID)
        .await?;
    assert_matches(&output, "Publishing message:")?;

    ctx.manager.get_device_state(LOCAL_DEVICE_ID, &registry).await?;
    ctx.manager.delete_device(LOCAL_DEVICE_ID, &registry).await?;
    ctx.manager.delete_registry(&registry).await?;
    Ok(())
}
