mod checks;
mod report;

pub use checks::{RecordChecks, MAX_EMOJI};
pub use report::render_evaluation_report;

use crate::pipeline::push::PushRecord;
use crate::pipeline::ranking::TOP_N;
use std::collections::{BTreeMap, BTreeSet};

/// Failing records listed in the report; the rest are only counted.
pub const MAX_REPORTED_FAILURES: usize = 20;

/// One push as seen by the evaluator, optionally joined with the product
/// the client actually took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRecord {
    pub client_code: String,
    pub product: String,
    pub push_text: String,
    pub recommendations: Vec<String>,
    pub target_product: Option<String>,
}

impl EvaluationRecord {
    pub fn from_push(record: &PushRecord) -> Self {
        Self {
            client_code: record.client_code.clone(),
            product: record.product().to_string(),
            push_text: record.push_text.clone(),
            recommendations: record.recommendations.clone(),
            target_product: None,
        }
    }

    pub fn with_target(mut self, target_product: impl Into<String>) -> Self {
        self.target_product = Some(target_product.into());
        self
    }

    fn hits(&self) -> ClientHits {
        let target = self.target_product.as_deref().unwrap_or_default();
        let hit_top1 = !target.is_empty()
            && self.recommendations.first().map(String::as_str) == Some(target);
        let hit_top4 = !target.is_empty()
            && self
                .recommendations
                .iter()
                .take(TOP_N)
                .any(|product| product == target);
        ClientHits {
            client_code: self.client_code.clone(),
            hit_top1,
            hit_top4,
        }
    }
}

/// Whether the ground-truth product was the top-1 pick, or among the four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHits {
    pub client_code: String,
    pub hit_top1: bool,
    pub hit_top4: bool,
}

/// A record that failed at least one copy rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPush {
    pub client_code: String,
    pub push_text: String,
    pub checks: RecordChecks,
}

/// Batch-wide view of a push run. Rates are fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationSummary {
    pub total_clients: usize,
    pub unique_push_texts: usize,
    pub non_empty_rate: f64,
    pub len_ok_rate: f64,
    pub cta_ok_rate: f64,
    pub caps_ok_rate: f64,
    pub emoji_ok_rate: f64,
    pub top1_rate: Option<f64>,
    pub top4_rate: Option<f64>,
    pub product_distribution: BTreeMap<String, usize>,
    pub failing_count: usize,
    pub failures: Vec<FailedPush>,
    pub hits: Vec<ClientHits>,
}

impl EvaluationSummary {
    pub fn has_ground_truth(&self) -> bool {
        self.top1_rate.is_some()
    }
}

#[derive(Default)]
struct PassCounts {
    non_empty: usize,
    len_ok: usize,
    cta_ok: usize,
    caps_ok: usize,
    emoji_ok: usize,
}

impl PassCounts {
    fn add(&mut self, checks: &RecordChecks) {
        self.non_empty += usize::from(checks.not_empty);
        self.len_ok += usize::from(checks.len_ok);
        self.cta_ok += usize::from(checks.cta_ok);
        self.caps_ok += usize::from(checks.caps_ok);
        self.emoji_ok += usize::from(checks.emoji_ok);
    }
}

/// Checks every record, then aggregates. Hit rates are only computed when at
/// least one record carries a target product; records without one count as
/// misses. An empty batch yields zero rates.
pub fn evaluate(records: &[EvaluationRecord]) -> EvaluationSummary {
    let mut passes = PassCounts::default();
    let mut unique = BTreeSet::new();
    let mut product_distribution = BTreeMap::new();
    let mut failing_count = 0;
    let mut failures = Vec::new();

    for record in records {
        let checks = RecordChecks::inspect(&record.push_text);
        passes.add(&checks);
        unique.insert(record.push_text.as_str());
        *product_distribution
            .entry(record.product.clone())
            .or_insert(0) += 1;

        if !checks.passed() {
            failing_count += 1;
            if failures.len() < MAX_REPORTED_FAILURES {
                failures.push(FailedPush {
                    client_code: record.client_code.clone(),
                    push_text: record.push_text.clone(),
                    checks,
                });
            }
        }
    }

    let total = records.len();
    let ground_truth = records.iter().any(|record| record.target_product.is_some());
    let hits: Vec<ClientHits> = if ground_truth {
        records.iter().map(EvaluationRecord::hits).collect()
    } else {
        Vec::new()
    };
    let (top1_rate, top4_rate) = if ground_truth {
        let top1 = hits.iter().filter(|hit| hit.hit_top1).count();
        let top4 = hits.iter().filter(|hit| hit.hit_top4).count();
        (Some(rate(top1, total)), Some(rate(top4, total)))
    } else {
        (None, None)
    };

    EvaluationSummary {
        total_clients: total,
        unique_push_texts: unique.len(),
        non_empty_rate: rate(passes.non_empty, total),
        len_ok_rate: rate(passes.len_ok, total),
        cta_ok_rate: rate(passes.cta_ok, total),
        caps_ok_rate: rate(passes.caps_ok, total),
        emoji_ok_rate: rate(passes.emoji_ok, total),
        top1_rate,
        top4_rate,
        product_distribution,
        failing_count,
        failures,
        hits,
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
