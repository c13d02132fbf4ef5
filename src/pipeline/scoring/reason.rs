use std::fmt;

pub const NO_SIGNAL: &str = "NO_SIGNAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    HighTravelSpend,
    TaxiPresent,
    HighTaxi,
    RestaurantsPresent,
    HighRestaurants,
    SupermarketPresent,
    HighSupermarket,
    HighBalance,
    LowBalance,
    DepositOpportunity,
    LargePayments,
    FxActivity,
    InvestOpportunity,
    GoldInterest,
}

impl Trigger {
    pub const fn code(self) -> &'static str {
        match self {
            Self::HighTravelSpend => "HIGH_TRAVEL_SPEND",
            Self::TaxiPresent => "TAXI_PRESENT",
            Self::HighTaxi => "HIGH_TAXI",
            Self::RestaurantsPresent => "RESTAURANTS_PRESENT",
            Self::HighRestaurants => "HIGH_RESTAURANTS",
            Self::SupermarketPresent => "SUPERMARKET_PRESENT",
            Self::HighSupermarket => "HIGH_SUPERMARKET",
            Self::HighBalance => "HIGH_BALANCE",
            Self::LowBalance => "LOW_BALANCE",
            Self::DepositOpportunity => "DEPOSIT_OPPORTUNITY",
            Self::LargePayments => "LARGE_PAYMENTS",
            Self::FxActivity => "FX_ACTIVITY",
            Self::InvestOpportunity => "INVEST_OPPORTUNITY",
            Self::GoldInterest => "GOLD_INTEREST",
        }
    }
}

/// Ordered set of triggers that fired for one product estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonCode(Vec<Trigger>);

impl ReasonCode {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(trigger: Trigger) -> Self {
        Self(vec![trigger])
    }

    pub fn push(&mut self, trigger: Trigger) {
        if !self.0.contains(&trigger) {
            self.0.push(trigger);
        }
    }

    pub fn is_no_signal(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, trigger: Trigger) -> bool {
        self.0.contains(&trigger)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(NO_SIGNAL);
        }
        let codes: Vec<&str> = self.0.iter().map(|trigger| trigger.code()).collect();
        f.write_str(&codes.join("|"))
    }
}
