mod report;
mod sanitize;
mod templates;

pub use report::render_push_report;
pub use sanitize::sanitize;

use crate::pipeline::clients::{ClientFeatures, ClientTable};
use crate::pipeline::money::format_money;
use crate::pipeline::ranking::{select_top4, ScoreTable};
use templates::{render, template_for, TemplateVars};
use tracing::debug;

/// Renders the push for a client's top recommendation. The text is
/// sanitized before it is returned, so every copy rule already holds.
///
/// An empty recommendation list renders the generic template with an empty
/// product name.
pub fn generate(client: &ClientFeatures, top4: &[String], benefit_for_top1: f64) -> String {
    let product = top4.first().map(String::as_str).unwrap_or_default();
    let vars = TemplateVars {
        name: &client.name,
        product,
        amount: format_money(client.total_spent),
        balance: format_money(client.avg_monthly_balance),
        benefit: format_money(benefit_for_top1),
    };
    sanitize(&render(template_for(product), &vars))
}

/// Push output for one client.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRecord {
    pub client_code: String,
    pub name: String,
    pub recommendations: Vec<String>,
    pub push_text: String,
    pub benefit_estimate: f64,
}

impl PushRecord {
    /// The top-1 recommendation, which the text is written for.
    pub fn product(&self) -> &str {
        self.rec(0)
    }

    /// Recommendation in slot `index` (zero based), or `""` past the end.
    pub fn rec(&self, index: usize) -> &str {
        self.recommendations
            .get(index)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Ranks, renders and sanitizes the push for one client. The benefit comes
/// from the score table row for the top-1 product, or zero when absent.
pub fn build_record(client: &ClientFeatures, scores: Option<&ScoreTable>) -> PushRecord {
    let recommendations = select_top4(&client.client_code, scores);
    let benefit_estimate = recommendations
        .first()
        .and_then(|product| scores.and_then(|table| table.benefit(&client.client_code, product)))
        .unwrap_or(0.0);

    let push_text = generate(client, &recommendations, benefit_estimate);
    debug!(
        client_code = %client.client_code,
        product = recommendations.first().map(String::as_str).unwrap_or_default(),
        chars = push_text.chars().count(),
        "push rendered"
    );

    PushRecord {
        client_code: client.client_code.clone(),
        name: client.name.clone(),
        recommendations,
        push_text,
        benefit_estimate,
    }
}

/// One record per client, in client table order.
pub fn generate_batch(clients: &ClientTable, scores: Option<&ScoreTable>) -> Vec<PushRecord> {
    clients
        .records()
        .iter()
        .map(|client| build_record(client, scores))
        .collect()
}
