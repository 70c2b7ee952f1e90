use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use crate::config::HarnessConfig;
use crate::helpers::E2EResult;
use crate::ids::RunIds;
use crate::pubsub::{PubSubClient, TopicAdmin};
use crate::scenarios::{self, ScenarioContext};
use crate::util::logging::init_logging;

#[derive(Parser)]
#[command(name = "cloudiot-e2e")]
#[command(version, about = "End-to-end checks for the Cloud IoT MQTT sample", long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the topic, run the cases, delete the topic
    Run(RunArgs),

    /// Print the case names without touching the cloud
    List,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Directory containing the sample and its resources/ folder
    #[arg(long)]
    sample_dir: Option<PathBuf>,

    /// Device manager command line
    #[arg(long)]
    helper: Option<String>,

    /// MQTT sample command line
    #[arg(long)]
    sample: Option<String>,

    /// Per-command timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Only run cases whose name contains this text (repeatable)
    #[arg(long = "case")]
    cases: Vec<String>,
}

impl RunArgs {
    fn apply(&self, cfg: &mut HarnessConfig) {
        if let Some(dir) = &self.sample_dir {
            cfg.sample_dir = dir.clone();
        }
        if let Some(helper) = &self.helper {
            cfg.helper = helper.clone();
        }
        if let Some(sample) = &self.sample {
            cfg.sample = sample.clone();
        }
        if let Some(secs) = self.timeout_secs {
            cfg.command_timeout = Duration::from_secs(secs);
        }
    }

    fn selects(&self, case: &str) -> bool {
        self.cases.is_empty() || self.cases.iter().any(|c| case.contains(c.as_str()))
    }
}

pub async fn cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::List => {
            let cfg = HarnessConfig::default();
            let topics = Arc::new(NoopTopics);
            let suite = scenarios::build_suite(ScenarioContext::from_config(
                &cfg,
                RunIds::generate(),
                topics,
            ));
            for name in suite.case_names() {
                println!("{}", name);
            }
        }

        Commands::Run(args) => {
            let mut cfg = HarnessConfig::from_env()?;
            args.apply(&mut cfg);

            let ids = RunIds::generate();
            tracing::info!(
                "Using topic {} and registry {}",
                ids.topic,
                ids.rsa256_registry()
            );

            let topics = Arc::new(
                PubSubClient::from_config(&cfg).context("Failed to create Pub/Sub client")?,
            );
            let suite = scenarios::build_suite(ScenarioContext::from_config(&cfg, ids, topics))
                .retain_cases(|name| args.selects(name));
            if suite.case_names().is_empty() {
                bail!("No case matches {:?}", args.cases);
            }

            let report = suite.run().await;
            println!("{}", report.summary());
            report.into_result()?;
        }
    }

    Ok(())
}

/// Topic admin for commands that never reach the cloud
struct NoopTopics;

#[async_trait::async_trait]
impl TopicAdmin for NoopTopics {
    async fn create_topic(&self, name: &str) -> E2EResult<String> {
        Ok(name.to_string())
    }

    async fn delete_topic(&self, _name: &str) -> E2EResult<()> {
        Ok(())
    }
}
