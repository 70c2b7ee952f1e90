//! Pub/Sub REST client for topic setup and teardown

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::OnceCell;

use super::{TopicAdmin, check_credentials};
use crate::config::HarnessConfig;
use crate::helpers::{CommandRunner, E2EError, E2EResult};

const PUBSUB_API: &str = "https://pubsub.googleapis.com";
const TOKEN_COMMAND: &str = "gcloud auth application-default print-access-token";

#[derive(Debug, Deserialize)]
struct Topic {
    name: String,
}

enum TokenSource {
    /// Emulator requests carry no credentials
    Anonymous,
    Static(String),
    Gcloud(CommandRunner),
}

pub struct PubSubClient {
    http: Client,
    base_url: String,
    project_id: String,
    token_source: TokenSource,
    token: OnceCell<Option<String>>,
    config: HarnessConfig,
}

impl PubSubClient {
    pub fn from_config(cfg: &HarnessConfig) -> E2EResult<Self> {
        let project_id = cfg.project_id.clone().ok_or_else(|| {
            E2EError::Credentials("no project id configured for Pub/Sub".to_string())
        })?;

        let (base_url, token_source) = match (&cfg.emulator_host, &cfg.access_token) {
            (Some(host), _) => (format!("http://{}", host), TokenSource::Anonymous),
            (None, Some(token)) => (PUBSUB_API.to_string(), TokenSource::Static(token.clone())),
            (None, None) => (
                PUBSUB_API.to_string(),
                TokenSource::Gcloud(
                    CommandRunner::new(&cfg.sample_dir).with_timeout(cfg.command_timeout),
                ),
            ),
        };

        let http = Client::builder()
            .build()
            .map_err(|e| E2EError::Setup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            project_id,
            token_source,
            token: OnceCell::new(),
            config: cfg.clone(),
        })
    }

    /// Full resource name, e.g. `projects/<project>/topics/<name>`
    pub fn topic_path(&self, name: &str) -> String {
        format!("projects/{}/topics/{}", self.project_id, name)
    }

    pub fn topic_url(&self, name: &str) -> String {
        format!("{}/v1/{}", self.base_url, self.topic_path(name))
    }

    async fn token(&self) -> E2EResult<Option<&str>> {
        let token = self
            .token
            .get_or_try_init(|| async {
                match &self.token_source {
                    TokenSource::Anonymous => Ok(None),
                    TokenSource::Static(token) => Ok(Some(token.clone())),
                    TokenSource::Gcloud(runner) => {
                        tracing::info!("Requesting access token from gcloud");
                        runner.run(TOKEN_COMMAND).await.map(Some)
                    }
                }
            })
            .await?;
        Ok(token.as_deref())
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> E2EResult<Response> {
        let request = match self.token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let res = request
            .send()
            .await
            .map_err(|e| E2EError::PubSub(format!("{}: {}", what, e)))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(E2EError::PubSub(format!("{}: {} {}", what, status, body)));
        }
        Ok(res)
    }
}

#[async_trait::async_trait]
impl TopicAdmin for PubSubClient {
    async fn check_credentials(&self) -> E2EResult<()> {
        check_credentials(&self.config)
    }

    async fn create_topic(&self, name: &str) -> E2EResult<String> {
        let what = format!("create topic {}", name);
        let res = self
            .send(
                self.http
                    .put(self.topic_url(name))
                    .json(&serde_json::json!({})),
                &what,
            )
            .await?;

        let topic: Topic = res
            .json()
            .await
            .map_err(|e| E2EError::PubSub(format!("{}: bad response: {}", what, e)))?;

        tracing::info!("Topic {} created.", topic.name);
        Ok(topic.name)
    }

    async fn delete_topic(&self, name: &str) -> E2EResult<()> {
        let what = format!("delete topic {}", name);
        self.send(self.http.delete(self.topic_url(name)), &what).await?;

        tracing::info!("Topic {} deleted.", self.topic_path(name));
        Ok(())
    }
}
