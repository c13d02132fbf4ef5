use serde::{Deserialize, Serialize};

/// Coefficients, caps and thresholds of the benefit formulas. Any subset can
/// be overridden from JSON; omitted fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub travel_cashback_pct: f64,
    pub travel_cashback_cap: f64,
    pub taxi_pct: f64,
    pub high_taxi_threshold: f64,
    pub restaurants_pct: f64,
    pub high_restaurants_threshold: f64,
    pub supermarket_pct: f64,
    pub high_supermarket_threshold: f64,
    pub premium_balance_threshold: f64,
    pub premium_base_benefit: f64,
    pub premium_balance_pct: f64,
    pub deposit_annual_rate: f64,
    pub deposit_min_balance: f64,
    pub credit_pct_est: f64,
    pub credit_avg_transaction_threshold: f64,
    pub credit_total_spent_threshold: f64,
    pub fx_pct: f64,
    pub investment_min_balance: f64,
    pub investment_annual_pct: f64,
    pub gold_pct: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            travel_cashback_pct: 0.04,
            travel_cashback_cap: 20_000.0,
            taxi_pct: 0.03,
            high_taxi_threshold: 20_000.0,
            restaurants_pct: 0.02,
            high_restaurants_threshold: 30_000.0,
            supermarket_pct: 0.03,
            high_supermarket_threshold: 50_000.0,
            premium_balance_threshold: 300_000.0,
            premium_base_benefit: 2_000.0,
            premium_balance_pct: 0.001,
            deposit_annual_rate: 0.12,
            deposit_min_balance: 50_000.0,
            credit_pct_est: 0.01,
            credit_avg_transaction_threshold: 20_000.0,
            credit_total_spent_threshold: 300_000.0,
            fx_pct: 0.005,
            investment_min_balance: 200_000.0,
            investment_annual_pct: 0.03,
            gold_pct: 0.02,
        }
    }
}
