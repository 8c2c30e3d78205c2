//! Command-line front end for the fieldwork pipelines

pub mod classify_cmd;
pub mod logging;
pub mod readme_cmd;

use std::path::Path;

use clap::{Parser, Subcommand};
use fieldwork_sentiment::SentimentError;
use fieldwork_stats::StatsError;

use classify_cmd::{ClassifyArgs, run_classify};
use readme_cmd::{ReadmeArgs, run_readme};

/// Survey descriptives and manager-quote sentiment scoring
#[derive(Debug, Parser)]
#[command(name = "fieldwork", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute weighted survey figures and write the dataset README
    Readme(ReadmeArgs),
    /// Score interview quotes through a chat-completions model
    Classify(ClassifyArgs),
}

impl Cli {
    /// File the run log should also go to, if any
    pub fn log_file(&self) -> Option<&Path> {
        match &self.command {
            Command::Classify(args) => Some(args.log_file.as_path()),
            Command::Readme(_) => None,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Readme(args) => run_readme(args),
            Command::Classify(args) => run_classify(args).await,
        }
    }
}

/// Machine-readable category of the first library error in `err`'s chain
pub fn error_category(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<SentimentError>()
            .map(|e| e.category().as_str())
            .or_else(|| cause.downcast_ref::<StatsError>().map(|e| e.category().as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use pretty_assertions::assert_eq;

    #[test]
    fn category_is_found_under_context() {
        let err = Err::<(), _>(SentimentError::config("OPENAI_API_KEY not set"))
            .context("classify failed")
            .expect_err("error");
        assert_eq!(error_category(&err), Some("CONFIG_ERROR"));

        let err = Err::<(), _>(StatsError::MissingColumn {
            column: "Q57".to_string(),
        })
        .context("failed to load survey data")
        .expect_err("error");
        assert_eq!(error_category(&err), Some("INPUT_VALIDATION_ERROR"));
    }

    #[test]
    fn foreign_errors_have_no_category() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(error_category(&err), None);
    }
}
