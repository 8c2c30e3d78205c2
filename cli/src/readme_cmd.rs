//! `fieldwork readme`: weighted descriptives for the survey subset

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fieldwork_stats::{ShareBase, SurveyDataset, SurveyFigures, write_readme};

/// Denominator for categorical shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShareBaseArg {
    /// Weight of respondents with a valid answer
    Valid,
    /// Weight of every respondent, including missing answers
    All,
}

impl From<ShareBaseArg> for ShareBase {
    fn from(arg: ShareBaseArg) -> Self {
        match arg {
            ShareBaseArg::Valid => ShareBase::ValidResponses,
            ShareBaseArg::All => ShareBase::AllRespondents,
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReadmeArgs {
    /// Survey CSV with Q49, Q57, Q48, Q288R, Q260 and W_WEIGHT columns
    #[arg(long, default_value = "data/WVS_random_subset2000.csv")]
    pub input: PathBuf,

    #[arg(long, default_value = "README.md")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = ShareBaseArg::Valid)]
    pub share_base: ShareBaseArg,

    /// Also print the computed figures as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run_readme(args: ReadmeArgs) -> anyhow::Result<()> {
    let dataset = SurveyDataset::from_path(&args.input)
        .with_context(|| format!("failed to load survey data from {}", args.input.display()))?;
    let figures = SurveyFigures::compute(&dataset, args.share_base.into())
        .context("failed to compute survey figures")?;
    write_readme(&figures, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(
        respondents = figures.respondents,
        share_base = ?figures.share_base,
        "Survey figures computed"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&figures)?;
        println!("{json}");
    }
    Ok(())
}
