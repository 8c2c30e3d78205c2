//! `fieldwork classify`: score every quote in the interview CSV

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fieldwork_sentiment::{
    BatchRunner, OpenAiClient, SentimentClassifier, SentimentConfig, ThrottledClient,
    api_key_from_env, load_records, write_results,
};

#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// Quotes CSV with an id column and a text column
    #[arg(long, default_value = "interview-texts-only.csv")]
    pub input: PathBuf,

    #[arg(long, default_value = "manager_sentiment_results.csv")]
    pub output: PathBuf,

    /// TOML config file; flags below override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub model: Option<String>,

    /// Total request attempts per quote
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Quotes classified concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long)]
    pub requests_per_minute: Option<u32>,

    /// OpenAI-compatible API root, e.g. http://localhost:8000/v1
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub id_column: Option<String>,

    #[arg(long)]
    pub text_column: Option<String>,

    /// Run log, truncated at start
    #[arg(long, default_value = "classification.log")]
    pub log_file: PathBuf,
}

impl ClassifyArgs {
    fn apply_overrides(&self, cfg: &mut SentimentConfig) {
        if let Some(model) = &self.model {
            cfg.model = model.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            cfg.max_attempts = max_attempts;
        }
        if let Some(concurrency) = self.concurrency {
            cfg.concurrency = concurrency;
        }
        if let Some(rpm) = self.requests_per_minute {
            cfg.requests_per_minute = Some(rpm);
        }
        if let Some(base_url) = &self.base_url {
            cfg.base_url = base_url.clone();
        }
        if let Some(id_column) = &self.id_column {
            cfg.columns.id = id_column.clone();
        }
        if let Some(text_column) = &self.text_column {
            cfg.columns.text = text_column.clone();
        }
    }

    /// Effective configuration: file and environment, then flags
    pub fn resolve_config(&self) -> anyhow::Result<SentimentConfig> {
        let mut cfg = SentimentConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }
}

pub async fn run_classify(args: ClassifyArgs) -> anyhow::Result<()> {
    let cfg = args.resolve_config()?;
    let api_key = api_key_from_env()?;

    let records = load_records(&args.input, &cfg.columns)?;

    let client = OpenAiClient::new(&cfg.base_url, api_key, cfg.request_timeout())
        .context("failed to build HTTP client")?;
    let classifier = SentimentClassifier::new(
        ThrottledClient::new(client, cfg.min_request_interval()),
        cfg.model.clone(),
    )
    .with_temperature(cfg.temperature)
    .with_policy(cfg.retry_policy());
    let report = BatchRunner::new(classifier)
        .with_concurrency(cfg.concurrency)
        .run(&records)
        .await;

    write_results(&args.output, &cfg.columns.id, &report.results)?;

    tracing::info!("Score distribution:\n{}", report.distribution);
    println!("{}", report.distribution);
    Ok(())
}
