use crate::pipeline::scoring::{Product, ProductScore};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

/// Number of recommendation slots per client.
pub const TOP_N: usize = 4;

/// Padding order used when scored candidates cannot fill every slot.
pub const FALLBACK_ORDER: [Product; 10] = [
    Product::Deposit,
    Product::CreditOffer,
    Product::PremiumCard,
    Product::SupermarketCard,
    Product::TravelCard,
    Product::TaxiCard,
    Product::RestaurantsCard,
    Product::InvestmentOffer,
    Product::FxOffer,
    Product::GoldOffer,
];

/// Total order over `(benefit, product id)`: benefit descending, then id
/// ascending. `Ordering::Less` means `a` ranks first.
pub fn benefit_order(a: (f64, &str), b: (f64, &str)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

/// Benefit of one product for one client as seen by the ranking stage. The
/// product id stays a string because score files may name products outside
/// the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub product: String,
    pub benefit_estimate: f64,
}

/// Scores grouped by client, at most one entry per (client, product).
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    by_client: BTreeMap<String, Vec<ScoreEntry>>,
}

impl ScoreTable {
    pub fn from_scores(scores: &[ProductScore]) -> Self {
        let mut table = Self::default();
        for score in scores {
            table.insert(
                &score.client_code,
                score.product.id(),
                score.benefit_estimate,
            );
        }
        table
    }

    /// Adds a row. A repeated (client, product) pair keeps the first row seen.
    pub fn insert(&mut self, client_code: &str, product: &str, benefit_estimate: f64) {
        let entries = self.by_client.entry(client_code.to_string()).or_default();
        if entries.iter().any(|entry| entry.product == product) {
            warn!(client_code, product, "duplicate score row dropped");
            return;
        }
        let benefit_estimate = if benefit_estimate.is_finite() {
            benefit_estimate
        } else {
            0.0
        };
        entries.push(ScoreEntry {
            product: product.to_string(),
            benefit_estimate,
        });
    }

    pub fn entries(&self, client_code: &str) -> &[ScoreEntry] {
        self.by_client
            .get(client_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn benefit(&self, client_code: &str, product: &str) -> Option<f64> {
        self.entries(client_code)
            .iter()
            .find(|entry| entry.product == product)
            .map(|entry| entry.benefit_estimate)
    }

    pub fn client_count(&self) -> usize {
        self.by_client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
    }
}

/// Every scored product for the client in ranking order.
pub fn rank(client_code: &str, scores: &ScoreTable) -> Vec<String> {
    let mut entries: Vec<&ScoreEntry> = scores.entries(client_code).iter().collect();
    entries.sort_by(|a, b| {
        benefit_order(
            (a.benefit_estimate, a.product.as_str()),
            (b.benefit_estimate, b.product.as_str()),
        )
    });
    entries
        .into_iter()
        .map(|entry| entry.product.clone())
        .collect()
}

/// Top recommendations for one client.
///
/// Only products with a positive benefit compete for the slots; a client
/// without enough of them (or without any score table at all) is padded
/// from [`FALLBACK_ORDER`], skipping products already chosen.
pub fn select_top4(client_code: &str, scores: Option<&ScoreTable>) -> Vec<String> {
    let mut selected: Vec<String> = match scores {
        Some(table) => {
            let ranked = rank(client_code, table);
            ranked
                .into_iter()
                .filter(|product| {
                    table
                        .benefit(client_code, product)
                        .is_some_and(|benefit| benefit > 0.0)
                })
                .take(TOP_N)
                .collect()
        }
        None => Vec::new(),
    };

    for product in FALLBACK_ORDER {
        if selected.len() >= TOP_N {
            break;
        }
        if !selected.iter().any(|chosen| chosen == product.id()) {
            selected.push(product.id().to_string());
        }
    }

    selected
}
