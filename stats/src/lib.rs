//! Weighted survey statistics for the WVS Wave 7 subset
//!
//! Loads the survey CSV, normalizes WVS missing codes, computes weighted
//! descriptives and renders the dataset README.
//!
//! ```rust,ignore
//! use fieldwork_stats::{ShareBase, SurveyDataset, SurveyFigures, write_readme};
//!
//! let dataset = SurveyDataset::from_path("data/WVS_random_subset2000.csv")?;
//! let figures = SurveyFigures::compute(&dataset, ShareBase::ValidResponses)?;
//! write_readme(&figures, "README.md")?;
//! ```

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod dataset;
pub mod errors;
pub mod missing;
pub mod report;
pub mod weighted;

pub use dataset::{ObservationRow, SurveyDataset, Variable};
pub use errors::{ErrorCategory, Result, StatsError};
pub use missing::MissingCode;
pub use report::{IncomeFigures, SurveyFigures, TrustFigures, render_readme, write_readme};
pub use weighted::{
    CategoricalSummary, ShareBase, WeightedSummary, weighted_distribution, weighted_share,
    weighted_summary,
};
