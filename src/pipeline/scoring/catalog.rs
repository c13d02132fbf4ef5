use super::config::ScoringConfig;
use super::reason::{ReasonCode, Trigger};
use crate::pipeline::clients::{ClientFeatures, SpendCategory};
use crate::pipeline::money::{format_money, round2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed product catalog. Ids are the `product` values written to and
/// read back from the score tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    TravelCard,
    TaxiCard,
    RestaurantsCard,
    SupermarketCard,
    PremiumCard,
    Deposit,
    CreditOffer,
    FxOffer,
    InvestmentOffer,
    GoldOffer,
}

impl Product {
    pub const ALL: [Self; 10] = [
        Self::TravelCard,
        Self::TaxiCard,
        Self::RestaurantsCard,
        Self::SupermarketCard,
        Self::PremiumCard,
        Self::Deposit,
        Self::CreditOffer,
        Self::FxOffer,
        Self::InvestmentOffer,
        Self::GoldOffer,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::TravelCard => "travel_card",
            Self::TaxiCard => "taxi_card",
            Self::RestaurantsCard => "restaurants_card",
            Self::SupermarketCard => "supermarket_card",
            Self::PremiumCard => "premium_card",
            Self::Deposit => "deposit",
            Self::CreditOffer => "credit_offer",
            Self::FxOffer => "fx_offer",
            Self::InvestmentOffer => "investment_offer",
            Self::GoldOffer => "gold_offer",
        }
    }

    /// Estimated benefit for one client. Pure: reads only the fields this
    /// product cares about and never fails.
    pub fn estimate(self, client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
        match self {
            Self::TravelCard => travel_card(client, config),
            Self::TaxiCard => taxi_card(client, config),
            Self::RestaurantsCard => restaurants_card(client, config),
            Self::SupermarketCard => supermarket_card(client, config),
            Self::PremiumCard => premium_card(client, config),
            Self::Deposit => deposit(client, config),
            Self::CreditOffer => credit_offer(client, config),
            Self::FxOffer => fx_offer(client, config),
            Self::InvestmentOffer => investment_offer(client, config),
            Self::GoldOffer => gold_offer(client, config),
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProduct(pub String);

impl fmt::Display for UnknownProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown product id '{}'", self.0)
    }
}

impl std::error::Error for UnknownProduct {}

impl FromStr for Product {
    type Err = UnknownProduct;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|product| product.id() == trimmed)
            .ok_or_else(|| UnknownProduct(trimmed.to_string()))
    }
}

/// Output of a single product formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Rounded to cents, finite and >= 0.
    pub benefit: f64,
    pub reason: ReasonCode,
    pub explanation: String,
}

impl Estimate {
    fn new(benefit: f64, reason: ReasonCode, explanation: String) -> Self {
        let benefit = round2(benefit);
        Self {
            benefit: if benefit.is_finite() { benefit.max(0.0) } else { 0.0 },
            reason,
            explanation,
        }
    }

    fn zero(reason: ReasonCode, explanation: &str) -> Self {
        Self {
            benefit: 0.0,
            reason,
            explanation: explanation.to_string(),
        }
    }
}

fn travel_card(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let taxi = client.spent(SpendCategory::Taxi);
    let volume =
        client.spent(SpendCategory::Travel) + client.spent(SpendCategory::Hotels) + taxi;
    let benefit = (volume * config.travel_cashback_pct).min(config.travel_cashback_cap);

    let mut reason = ReasonCode::none();
    if volume > 0.0 {
        reason.push(Trigger::HighTravelSpend);
    }
    if taxi > 0.0 {
        reason.push(Trigger::TaxiPresent);
    }

    let explanation = format!(
        "Поездки, отели и такси: {}. Кешбэк тревел-карты ≈ {}",
        format_money(volume),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

fn taxi_card(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let taxi = client.spent(SpendCategory::Taxi);
    let benefit = taxi * config.taxi_pct;
    let reason = spend_reason(
        taxi,
        config.high_taxi_threshold,
        Trigger::HighTaxi,
        Trigger::TaxiPresent,
    );
    let explanation = format!(
        "Такси: {} → выгода ≈ {}",
        format_money(taxi),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

fn restaurants_card(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let restaurants = client.spent(SpendCategory::Restaurants);
    let benefit = restaurants * config.restaurants_pct;
    let reason = spend_reason(
        restaurants,
        config.high_restaurants_threshold,
        Trigger::HighRestaurants,
        Trigger::RestaurantsPresent,
    );
    let explanation = format!(
        "Кафе и рестораны: {} → выгода ≈ {}",
        format_money(restaurants),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

fn supermarket_card(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let groceries = client.spent(SpendCategory::Groceries);
    let benefit = groceries * config.supermarket_pct;
    let reason = spend_reason(
        groceries,
        config.high_supermarket_threshold,
        Trigger::HighSupermarket,
        Trigger::SupermarketPresent,
    );
    let explanation = format!(
        "Продукты питания: {} → выгода ≈ {}",
        format_money(groceries),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

/// Spend above the threshold is "high"; any positive spend below it still
/// carries a presence trigger because the benefit is non-zero.
fn spend_reason(spend: f64, threshold: f64, high: Trigger, present: Trigger) -> ReasonCode {
    if spend > threshold {
        ReasonCode::single(high)
    } else if spend > 0.0 {
        ReasonCode::single(present)
    } else {
        ReasonCode::none()
    }
}

fn premium_card(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let balance = client.avg_monthly_balance;
    let (benefit, reason) = if balance >= config.premium_balance_threshold {
        (
            config.premium_base_benefit + config.premium_balance_pct * balance,
            ReasonCode::single(Trigger::HighBalance),
        )
    } else {
        (0.0, ReasonCode::none())
    };
    let explanation = format!(
        "Средний остаток: {} → выгода премиального пакета ≈ {}",
        format_money(balance),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

fn deposit(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let balance = client.avg_monthly_balance;
    if balance < config.deposit_min_balance {
        return Estimate::zero(
            ReasonCode::single(Trigger::LowBalance),
            "Остатка недостаточно для выгодного депозита",
        );
    }
    let benefit = balance * config.deposit_annual_rate / 12.0;
    let explanation = format!(
        "Депозит на {} под {:.0}% годовых принесёт ≈ {} в месяц",
        format_money(balance),
        config.deposit_annual_rate * 100.0,
        format_money(benefit)
    );
    Estimate::new(
        benefit,
        ReasonCode::single(Trigger::DepositOpportunity),
        explanation,
    )
}

fn credit_offer(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let total = client.total_spent;
    let average = client.avg_transaction;
    let qualifies = average > config.credit_avg_transaction_threshold
        || total > config.credit_total_spent_threshold;
    let (benefit, reason) = if qualifies {
        (
            total * config.credit_pct_est,
            ReasonCode::single(Trigger::LargePayments),
        )
    } else {
        (0.0, ReasonCode::none())
    };
    let explanation = format!(
        "Оборот: {}, средний чек: {} → выгода кредитного продукта ≈ {}",
        format_money(total),
        format_money(average),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

fn fx_offer(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let volume = client.transfers_in + client.transfers_out;
    let benefit = volume * config.fx_pct;
    let reason = if volume > 0.0 {
        ReasonCode::single(Trigger::FxActivity)
    } else {
        ReasonCode::none()
    };
    let explanation = format!(
        "Переводы: {} → экономия на комиссиях ≈ {}",
        format_money(volume),
        format_money(benefit)
    );
    Estimate::new(benefit, reason, explanation)
}

fn investment_offer(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let balance = client.avg_monthly_balance;
    if balance < config.investment_min_balance {
        return Estimate::zero(
            ReasonCode::single(Trigger::LowBalance),
            "Остаток слишком мал для инвестиционных продуктов",
        );
    }
    let benefit = balance * config.investment_annual_pct / 12.0;
    let explanation = format!(
        "Средний остаток: {} → ожидаемая доходность инвестиций ≈ {} в месяц",
        format_money(balance),
        format_money(benefit)
    );
    Estimate::new(
        benefit,
        ReasonCode::single(Trigger::InvestOpportunity),
        explanation,
    )
}

fn gold_offer(client: &ClientFeatures, config: &ScoringConfig) -> Estimate {
    let jewelry = client.spent(SpendCategory::Jewelry);
    if !jewelry.is_finite() || jewelry <= 0.0 {
        return Estimate::zero(ReasonCode::none(), "Покупок ювелирных украшений нет");
    }
    let benefit = jewelry * config.gold_pct;
    let explanation = format!(
        "Ювелирные украшения: {} → выгода накоплений в золоте ≈ {}",
        format_money(jewelry),
        format_money(benefit)
    );
    Estimate::new(
        benefit,
        ReasonCode::single(Trigger::GoldInterest),
        explanation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn product_ids_round_trip_through_from_str() {
        for product in Product::ALL {
            assert_eq!(product.id().parse::<Product>(), Ok(product));
        }
        assert_eq!(
            "mortgage".parse::<Product>(),
            Err(UnknownProduct("mortgage".to_string()))
        );
    }

    #[test]
    fn travel_benefit_is_capped() {
        let client = ClientFeatures::new("1", "Test")
            .with_spend(SpendCategory::Travel, 600_000.0)
            .with_spend(SpendCategory::Taxi, 10_000.0);
        let estimate = Product::TravelCard.estimate(&client, &config());
        assert_eq!(estimate.benefit, 20_000.0);
        assert_eq!(estimate.reason.to_string(), "HIGH_TRAVEL_SPEND|TAXI_PRESENT");
    }

    #[test]
    fn travel_without_taxi_only_flags_travel() {
        let client = ClientFeatures::new("1", "Test").with_spend(SpendCategory::Hotels, 50_000.0);
        let estimate = Product::TravelCard.estimate(&client, &config());
        assert_eq!(estimate.benefit, 2_000.0);
        assert_eq!(estimate.reason.to_string(), "HIGH_TRAVEL_SPEND");
    }

    #[test]
    fn taxi_card_distinguishes_high_and_present_spend() {
        let high = ClientFeatures::new("1", "Test").with_spend(SpendCategory::Taxi, 30_000.0);
        let estimate = Product::TaxiCard.estimate(&high, &config());
        assert_eq!(estimate.benefit, 900.0);
        assert!(estimate.reason.contains(Trigger::HighTaxi));

        let low = ClientFeatures::new("2", "Test").with_spend(SpendCategory::Taxi, 10_000.0);
        let estimate = Product::TaxiCard.estimate(&low, &config());
        assert_eq!(estimate.benefit, 300.0);
        assert_eq!(estimate.reason.to_string(), "TAXI_PRESENT");
    }

    #[test]
    fn restaurants_threshold_is_exclusive() {
        let at = ClientFeatures::new("1", "Test").with_spend(SpendCategory::Restaurants, 30_000.0);
        let estimate = Product::RestaurantsCard.estimate(&at, &config());
        assert_eq!(estimate.benefit, 600.0);
        assert_eq!(estimate.reason.to_string(), "RESTAURANTS_PRESENT");

        let above =
            ClientFeatures::new("2", "Test").with_spend(SpendCategory::Restaurants, 30_000.01);
        let estimate = Product::RestaurantsCard.estimate(&above, &config());
        assert_eq!(estimate.benefit, 600.0);
        assert_eq!(estimate.reason.to_string(), "HIGH_RESTAURANTS");

        let none = ClientFeatures::new("3", "Test");
        assert!(Product::RestaurantsCard
            .estimate(&none, &config())
            .reason
            .is_no_signal());
    }

    #[test]
    fn supermarket_threshold_is_exclusive() {
        let at = ClientFeatures::new("1", "Test").with_spend(SpendCategory::Groceries, 50_000.0);
        let estimate = Product::SupermarketCard.estimate(&at, &config());
        assert_eq!(estimate.benefit, 1_500.0);
        assert_eq!(estimate.reason.to_string(), "SUPERMARKET_PRESENT");

        let above =
            ClientFeatures::new("2", "Test").with_spend(SpendCategory::Groceries, 50_000.01);
        let estimate = Product::SupermarketCard.estimate(&above, &config());
        assert_eq!(estimate.benefit, 1_500.0);
        assert_eq!(estimate.reason.to_string(), "HIGH_SUPERMARKET");
    }

    #[test]
    fn huge_spend_keeps_every_benefit_finite() {
        let client = ClientFeatures::new("1", "Test")
            .with_spend(SpendCategory::Taxi, 1e308)
            .with_spend(SpendCategory::Restaurants, 1.7e308)
            .with_spend(SpendCategory::Travel, 1.7e308)
            .with_transfers(1.7e308, 1.7e308);
        for product in Product::ALL {
            let estimate = product.estimate(&client, &config());
            assert!(
                estimate.benefit.is_finite() && estimate.benefit >= 0.0,
                "{product}: {}",
                estimate.benefit
            );
        }
        let taxi = Product::TaxiCard.estimate(&client, &config());
        assert!(taxi.benefit > 0.0);
        assert_eq!(taxi.reason.to_string(), "HIGH_TAXI");
    }

    #[test]
    fn premium_requires_balance_threshold() {
        let rich = ClientFeatures::new("1", "Test").with_balance(1_000_000.0);
        let estimate = Product::PremiumCard.estimate(&rich, &config());
        assert_eq!(estimate.benefit, 3_000.0);
        assert_eq!(estimate.reason.to_string(), "HIGH_BALANCE");

        let modest = ClientFeatures::new("2", "Test").with_balance(299_999.0);
        let estimate = Product::PremiumCard.estimate(&modest, &config());
        assert_eq!(estimate.benefit, 0.0);
        assert!(estimate.reason.is_no_signal());
    }

    #[test]
    fn deposit_pays_monthly_share_of_annual_rate() {
        let client = ClientFeatures::new("1", "Test").with_balance(100_000.0);
        let estimate = Product::Deposit.estimate(&client, &config());
        assert_eq!(estimate.benefit, 1_000.0);
        assert_eq!(estimate.reason.to_string(), "DEPOSIT_OPPORTUNITY");
    }

    #[test]
    fn credit_offer_triggers_on_average_ticket_or_turnover() {
        let big_ticket = ClientFeatures::new("1", "Test").with_spending(100_000.0, 25_000.0);
        let estimate = Product::CreditOffer.estimate(&big_ticket, &config());
        assert_eq!(estimate.benefit, 1_000.0);
        assert_eq!(estimate.reason.to_string(), "LARGE_PAYMENTS");

        let small = ClientFeatures::new("2", "Test").with_spending(100_000.0, 5_000.0);
        let estimate = Product::CreditOffer.estimate(&small, &config());
        assert_eq!(estimate.benefit, 0.0);
        assert!(estimate.reason.is_no_signal());
    }

    #[test]
    fn investment_uses_monthly_share() {
        let client = ClientFeatures::new("1", "Test").with_balance(400_000.0);
        let estimate = Product::InvestmentOffer.estimate(&client, &config());
        assert_eq!(estimate.benefit, 1_000.0);
        assert_eq!(estimate.reason.to_string(), "INVEST_OPPORTUNITY");
    }

    #[test]
    fn gold_requires_jewelry_spend() {
        let client = ClientFeatures::new("1", "Test").with_spend(SpendCategory::Jewelry, 50_000.0);
        let estimate = Product::GoldOffer.estimate(&client, &config());
        assert_eq!(estimate.benefit, 1_000.0);
        assert_eq!(estimate.reason.to_string(), "GOLD_INTEREST");

        let none = ClientFeatures::new("2", "Test");
        let estimate = Product::GoldOffer.estimate(&none, &config());
        assert_eq!(estimate.benefit, 0.0);
        assert_eq!(estimate.reason.to_string(), "NO_SIGNAL");
    }

    #[test]
    fn overridden_coefficients_change_the_estimate() {
        let client = ClientFeatures::new("1", "Test").with_transfers(100_000.0, 0.0);
        let config = ScoringConfig {
            fx_pct: 0.01,
            ..ScoringConfig::default()
        };
        assert_eq!(Product::FxOffer.estimate(&client, &config).benefit, 1_000.0);
    }
}
