//! Survey CSV loading
//!
//! Reads the WVS subset, keeps the six columns the report needs and renames
//! them to readable variables. Sentinel codes, blank cells and NA spellings
//! become `None`; anything else that is not a finite number aborts the load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{Result, StatsError};
use crate::missing;

/// Variables used by the README report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    LifeSatisfaction,
    Trust,
    Freedom,
    Income,
    Age,
    Weight,
}

impl Variable {
    /// Column name in the raw WVS file
    pub fn source_column(self) -> &'static str {
        match self {
            Self::LifeSatisfaction => "Q49",
            Self::Trust => "Q57",
            Self::Freedom => "Q48",
            Self::Income => "Q288R",
            Self::Age => "Q260",
            Self::Weight => "W_WEIGHT",
        }
    }

    /// Coded answers whose values are category labels, not quantities
    pub fn is_categorical(self) -> bool {
        matches!(self, Self::Trust | Self::Income)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LifeSatisfaction => "life_satisfaction",
            Self::Trust => "trust",
            Self::Freedom => "freedom",
            Self::Income => "income",
            Self::Age => "age",
            Self::Weight => "weight",
        }
    }
}

/// One respondent's record
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub life_satisfaction: Option<f64>,
    pub trust: Option<f64>,
    pub freedom: Option<f64>,
    pub income: Option<f64>,
    pub age: Option<f64>,
    pub weight: f64,
}

impl ObservationRow {
    /// Value of `variable`; the weight is always present
    pub fn value(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::LifeSatisfaction => self.life_satisfaction,
            Variable::Trust => self.trust,
            Variable::Freedom => self.freedom,
            Variable::Income => self.income,
            Variable::Age => self.age,
            Variable::Weight => Some(self.weight),
        }
    }
}

/// Loaded survey rows
#[derive(Debug, Clone, Default)]
pub struct SurveyDataset {
    rows: Vec<ObservationRow>,
}

struct ColumnIndex {
    life_satisfaction: usize,
    trust: usize,
    freedom: usize,
    income: usize,
    age: usize,
    weight: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |variable: Variable| {
            let column = variable.source_column();
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| StatsError::MissingColumn {
                    column: column.to_string(),
                })
        };
        Ok(Self {
            life_satisfaction: find(Variable::LifeSatisfaction)?,
            trust: find(Variable::Trust)?,
            freedom: find(Variable::Freedom)?,
            income: find(Variable::Income)?,
            age: find(Variable::Age)?,
            weight: find(Variable::Weight)?,
        })
    }
}

/// Cell spellings read as "no value", as pandas' CSV reader does by default
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn invalid_value(record: &csv::StringRecord, variable: Variable, raw: &str) -> StatsError {
    StatsError::InvalidValue {
        line: record.position().map_or(0, csv::Position::line),
        column: variable.source_column().to_string(),
        value: raw.to_string(),
    }
}

/// Blank and NA cells are `None`; anything else must be a finite number.
fn parse_cell(record: &csv::StringRecord, index: usize, variable: Variable) -> Result<Option<f64>> {
    let raw = record.get(index).unwrap_or("").trim();
    if raw.is_empty() || NA_TOKENS.contains(&raw) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(invalid_value(record, variable, raw)),
    }
}

fn parse_response(
    record: &csv::StringRecord,
    index: usize,
    variable: Variable,
) -> Result<Option<f64>> {
    let value = parse_cell(record, index, variable)?.and_then(missing::normalize);
    if variable.is_categorical() && value.is_some_and(|v| v.fract() != 0.0) {
        let raw = record.get(index).unwrap_or("").trim();
        return Err(invalid_value(record, variable, raw));
    }
    Ok(value)
}

impl SurveyDataset {
    pub fn from_rows(rows: Vec<ObservationRow>) -> Self {
        Self { rows }
    }

    /// Load the survey CSV at `path`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| StatsError::io(path, e))?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            rows = dataset.len(),
            path = %path.display(),
            "Loaded survey data"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let columns = ColumnIndex::resolve(reader.headers()?)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let weight = parse_cell(&record, columns.weight, Variable::Weight)?.ok_or_else(|| {
                let raw = record.get(columns.weight).unwrap_or("").trim();
                invalid_value(&record, Variable::Weight, raw)
            })?;

            rows.push(ObservationRow {
                life_satisfaction: parse_response(
                    &record,
                    columns.life_satisfaction,
                    Variable::LifeSatisfaction,
                )?,
                trust: parse_response(&record, columns.trust, Variable::Trust)?,
                freedom: parse_response(&record, columns.freedom, Variable::Freedom)?,
                income: parse_response(&record, columns.income, Variable::Income)?,
                age: parse_response(&record, columns.age, Variable::Age)?,
                weight,
            });
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column of `variable` values in row order
    pub fn column(&self, variable: Variable) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row.value(variable)).collect()
    }

    /// Column of `variable` as integer category codes. Loading rejects
    /// non-integral codes for categorical variables, so the cast is exact.
    pub fn categorical(&self, variable: Variable) -> Vec<Option<i64>> {
        self.rows
            .iter()
            .map(|row| row.value(variable).map(|v| v.round() as i64))
            .collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.weight).collect()
    }
}
