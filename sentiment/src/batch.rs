//! Batch classification over a quotes table
//!
//! Quotes are classified with bounded concurrency. Results come back in input
//! order regardless of completion order, one record per input row.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use futures::stream;
use serde::Serialize;

use crate::classifier::{Classification, SentimentClassifier};
use crate::client::CompletionClient;

/// One quote to classify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    pub id: String,
    pub text: String,
}

impl TextRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One output row; `score` is `None` when classification failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRecord {
    pub id: String,
    pub score: Option<i64>,
}

/// Score frequencies, absent scores counted as their own bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreDistribution {
    counts: BTreeMap<Option<i64>, usize>,
}

impl ScoreDistribution {
    pub fn from_records(records: &[ClassificationRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.score).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, score: Option<i64>) -> usize {
        self.counts.get(&score).copied().unwrap_or(0)
    }

    pub fn absent(&self) -> usize {
        self.count(None)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Buckets ordered by descending count; ties by ascending score with the
    /// absent bucket last.
    pub fn by_frequency(&self) -> Vec<(Option<i64>, usize)> {
        let mut buckets: Vec<_> = self.counts.iter().map(|(s, c)| (*s, *c)).collect();
        buckets.sort_by(|(score_a, count_a), (score_b, count_b)| {
            count_b
                .cmp(count_a)
                .then_with(|| score_a.is_none().cmp(&score_b.is_none()))
                .then_with(|| score_a.cmp(score_b))
        });
        buckets
    }
}

impl fmt::Display for ScoreDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8}  count", "score")?;
        for (score, count) in self.by_frequency() {
            let label = match score {
                Some(score) => score.to_string(),
                None => "<absent>".to_string(),
            };
            writeln!(f, "{label:>8}  {count}")?;
        }
        Ok(())
    }
}

/// Everything a batch run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<ClassificationRecord>,
    pub distribution: ScoreDistribution,
    pub parse_failures: usize,
    pub exhausted: usize,
}

pub struct BatchRunner<C> {
    classifier: SentimentClassifier<C>,
    concurrency: usize,
}

impl<C: CompletionClient> BatchRunner<C> {
    pub fn new(classifier: SentimentClassifier<C>) -> Self {
        Self {
            classifier,
            concurrency: 1,
        }
    }

    /// Quotes in flight at once; values below 1 are treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn classifier(&self) -> &SentimentClassifier<C> {
        &self.classifier
    }

    pub async fn run(&self, records: &[TextRecord]) -> BatchReport {
        let total = records.len();
        tracing::info!(total, concurrency = self.concurrency, "Starting classification");

        let classifier = &self.classifier;
        let done = AtomicUsize::new(0);
        let done = &done;

        let outcomes: Vec<Classification> = stream::iter(records)
            .map(move |record| async move {
                let outcome = classifier.classify(&record.text).await;
                let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::info!(
                    record_id = %record.id,
                    score = ?outcome.score(),
                    attempts = outcome.attempts(),
                    "Classified {finished}/{total}"
                );
                outcome
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let parse_failures = outcomes
            .iter()
            .filter(|o| matches!(o, Classification::ParseFailed { .. }))
            .count();
        let exhausted = outcomes
            .iter()
            .filter(|o| matches!(o, Classification::ExhaustedRetries { .. }))
            .count();

        let results: Vec<ClassificationRecord> = records
            .iter()
            .zip(&outcomes)
            .map(|(record, outcome)| ClassificationRecord {
                id: record.id.clone(),
                score: outcome.score(),
            })
            .collect();
        let distribution = ScoreDistribution::from_records(&results);

        tracing::info!(
            total,
            scored = total - distribution.absent(),
            parse_failures,
            exhausted,
            "Classification finished"
        );

        BatchReport {
            results,
            distribution,
            parse_failures,
            exhausted,
        }
    }
}
