//! README figures and rendering
//!
//! `SurveyFigures` holds every number the README shows. `render_readme` feeds
//! them to the askama template in `templates/readme.md`, formatting means and
//! standard deviations to two decimals and percentages to whole numbers.

use std::path::Path;

use askama::Template;
use serde::Serialize;

use crate::dataset::{SurveyDataset, Variable};
use crate::errors::{Result, StatsError};
use crate::missing;
use crate::weighted::{
    ShareBase, WeightedSummary, weighted_distribution, weighted_share, weighted_summary,
};

/// Trust code meaning "most people can be trusted"
const TRUSTING: i64 = 1;

/// Income tercile codes
const INCOME_LOW: i64 = 1;
const INCOME_MIDDLE: i64 = 2;
const INCOME_HIGH: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrustFigures {
    pub percent_trusting: f64,
    pub valid_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeFigures {
    pub percent_low: f64,
    pub percent_middle: f64,
    pub percent_high: f64,
    pub valid_count: usize,
}

/// Every computed figure embedded in the README
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyFigures {
    pub respondents: usize,
    pub share_base: ShareBase,
    pub life_satisfaction: WeightedSummary,
    pub freedom: WeightedSummary,
    pub age: WeightedSummary,
    pub weight: WeightedSummary,
    pub trust: TrustFigures,
    pub income: IncomeFigures,
}

fn summarize(dataset: &SurveyDataset, weights: &[f64], variable: Variable) -> Result<WeightedSummary> {
    weighted_summary(&dataset.column(variable), weights)
        .map_err(|e| e.for_variable(variable.name()))
}

impl SurveyFigures {
    pub fn compute(dataset: &SurveyDataset, share_base: ShareBase) -> Result<Self> {
        let weights = dataset.weights();

        let trust_values = dataset.categorical(Variable::Trust);
        let percent_trusting =
            weighted_share(&trust_values, &weights, |code| *code == TRUSTING, share_base)
                .map_err(|e| e.for_variable(Variable::Trust.name()))?;
        let trust = TrustFigures {
            percent_trusting,
            valid_count: trust_values.iter().flatten().count(),
        };

        let income_dist = weighted_distribution(
            &dataset.categorical(Variable::Income),
            &weights,
            share_base,
        )
        .map_err(|e| e.for_variable(Variable::Income.name()))?;
        let income = IncomeFigures {
            percent_low: income_dist.share(&INCOME_LOW),
            percent_middle: income_dist.share(&INCOME_MIDDLE),
            percent_high: income_dist.share(&INCOME_HIGH),
            valid_count: income_dist.valid_count,
        };

        let figures = Self {
            respondents: dataset.len(),
            share_base,
            life_satisfaction: summarize(dataset, &weights, Variable::LifeSatisfaction)?,
            freedom: summarize(dataset, &weights, Variable::Freedom)?,
            age: summarize(dataset, &weights, Variable::Age)?,
            weight: summarize(dataset, &weights, Variable::Weight)?,
            trust,
            income,
        };

        tracing::debug!(?figures, "Computed survey figures");
        Ok(figures)
    }
}

/// Formatted cells for one continuous-variable table row
struct SummaryCells {
    n: usize,
    mean: String,
    sd: String,
}

impl From<&WeightedSummary> for SummaryCells {
    fn from(summary: &WeightedSummary) -> Self {
        Self {
            n: summary.valid_count,
            mean: format!("{:.2}", summary.mean),
            sd: summary
                .standard_deviation
                .map_or_else(|| "–".to_string(), |sd| format!("{sd:.2}")),
        }
    }
}

#[derive(Template)]
#[template(path = "readme.md", escape = "none")]
struct ReadmeTemplate {
    life_satisfaction: SummaryCells,
    freedom: SummaryCells,
    age: SummaryCells,
    weight: SummaryCells,
    trust_n: usize,
    trust_pct: String,
    income_n: usize,
    income_low: String,
    income_mid: String,
    income_high: String,
    missing_codes: String,
}

fn percent(value: f64) -> String {
    format!("{value:.0}")
}

impl From<&SurveyFigures> for ReadmeTemplate {
    fn from(figures: &SurveyFigures) -> Self {
        Self {
            life_satisfaction: (&figures.life_satisfaction).into(),
            freedom: (&figures.freedom).into(),
            age: (&figures.age).into(),
            weight: (&figures.weight).into(),
            trust_n: figures.trust.valid_count,
            trust_pct: percent(figures.trust.percent_trusting),
            income_n: figures.income.valid_count,
            income_low: percent(figures.income.percent_low),
            income_mid: percent(figures.income.percent_middle),
            income_high: percent(figures.income.percent_high),
            missing_codes: missing::footnote(),
        }
    }
}

/// Render the README markdown for `figures`
pub fn render_readme(figures: &SurveyFigures) -> Result<String> {
    Ok(ReadmeTemplate::from(figures).render()?)
}

/// Render and write the README to `path`
pub fn write_readme(figures: &SurveyFigures, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let markdown = render_readme(figures)?;
    std::fs::write(path, markdown).map_err(|e| StatsError::io(path, e))?;
    tracing::info!(path = %path.display(), "README written");
    Ok(())
}
