mod catalog;
mod config;
mod reason;

pub use catalog::{Estimate, Product, UnknownProduct};
pub use config::ScoringConfig;
pub use reason::{ReasonCode, Trigger, NO_SIGNAL};

use crate::pipeline::clients::{client_order, ClientFeatures, ClientTable};
use crate::pipeline::ranking::benefit_order;
use std::collections::BTreeMap;

/// Stateless scorer holding the coefficients for one run.
#[derive(Debug, Clone, Default)]
pub struct BenefitScorer {
    config: ScoringConfig,
}

impl BenefitScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// One score per catalog product, in catalog order.
    pub fn score(&self, client: &ClientFeatures) -> Vec<ProductScore> {
        Product::ALL
            .into_iter()
            .map(|product| {
                let Estimate {
                    benefit,
                    reason,
                    explanation,
                } = product.estimate(client, &self.config);
                ProductScore {
                    client_code: client.client_code.clone(),
                    product,
                    benefit_estimate: benefit,
                    reason_code: reason,
                    explanation,
                }
            })
            .collect()
    }

    /// Full client x catalog cross product, sorted by client code (numeric
    /// codes by value) and then by the ranking order (benefit descending, product id ascending).
    pub fn score_table(&self, clients: &ClientTable) -> Vec<ProductScore> {
        let mut scores: Vec<ProductScore> = clients
            .records()
            .iter()
            .flat_map(|client| self.score(client))
            .collect();
        scores.sort_by(|a, b| {
            client_order(&a.client_code, &b.client_code).then_with(|| {
                benefit_order(
                    (a.benefit_estimate, a.product.id()),
                    (b.benefit_estimate, b.product.id()),
                )
            })
        });
        scores
    }
}

/// Immutable score for one (client, product) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductScore {
    pub client_code: String,
    pub product: Product,
    pub benefit_estimate: f64,
    pub reason_code: ReasonCode,
    pub explanation: String,
}

/// Highest-benefit row per client under the ranking tie-break, in the same
/// client order as [`BenefitScorer::score_table`].
pub fn top1(scores: &[ProductScore]) -> Vec<ProductScore> {
    let mut best: BTreeMap<&str, &ProductScore> = BTreeMap::new();
    for score in scores {
        best.entry(score.client_code.as_str())
            .and_modify(|current| {
                let ordering = benefit_order(
                    (score.benefit_estimate, score.product.id()),
                    (current.benefit_estimate, current.product.id()),
                );
                if ordering.is_lt() {
                    *current = score;
                }
            })
            .or_insert(score);
    }
    let mut rows: Vec<ProductScore> = best.into_values().cloned().collect();
    rows.sort_by(|a, b| client_order(&a.client_code, &b.client_code));
    rows
}
