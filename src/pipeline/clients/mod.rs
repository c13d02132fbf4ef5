mod normalizer;
mod parser;

pub use normalizer::{parse_amount, safe_float};

use crate::pipeline::error::PipelineError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

pub const SPEND_PREFIX: &str = "spent_";
pub const DEFAULT_CLIENT_NAME: &str = "Клиент";

/// Spend categories the product catalog reads. Labels match the category
/// names used in the transaction export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendCategory {
    Travel,
    Hotels,
    Taxi,
    Restaurants,
    Groceries,
    Jewelry,
}

impl SpendCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Travel => "Путешествия",
            Self::Hotels => "Отели",
            Self::Taxi => "Такси",
            Self::Restaurants => "Кафе и рестораны",
            Self::Groceries => "Продукты питания",
            Self::Jewelry => "Ювелирные украшения",
        }
    }
}

/// Normalized per-client feature record. Every amount is finite and >= 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientFeatures {
    pub client_code: String,
    pub name: String,
    /// Category label -> spend. Missing categories read as zero.
    pub spend: BTreeMap<String, f64>,
    pub total_spent: f64,
    pub avg_transaction: f64,
    pub num_transactions: u64,
    pub transfers_in: f64,
    pub transfers_out: f64,
    pub avg_monthly_balance: f64,
}

impl ClientFeatures {
    pub fn new(client_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client_code: client_code.into(),
            name: name.into(),
            spend: BTreeMap::new(),
            total_spent: 0.0,
            avg_transaction: 0.0,
            num_transactions: 0,
            transfers_in: 0.0,
            transfers_out: 0.0,
            avg_monthly_balance: 0.0,
        }
    }

    pub fn spent(&self, category: SpendCategory) -> f64 {
        self.spend.get(category.label()).copied().unwrap_or(0.0)
    }

    /// Sets a category amount, applying the same clamping as the CSV loader.
    pub fn with_spend(mut self, category: SpendCategory, amount: f64) -> Self {
        self.spend
            .insert(category.label().to_string(), sanitize(amount));
        self
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.avg_monthly_balance = sanitize(balance);
        self
    }

    pub fn with_transfers(mut self, incoming: f64, outgoing: f64) -> Self {
        self.transfers_in = sanitize(incoming);
        self.transfers_out = sanitize(outgoing);
        self
    }

    pub fn with_spending(mut self, total_spent: f64, avg_transaction: f64) -> Self {
        self.total_spent = sanitize(total_spent);
        self.avg_transaction = sanitize(avg_transaction);
        self
    }
}

fn sanitize(amount: f64) -> f64 {
    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

/// Output order of client codes: numeric codes by value, then any
/// non-numeric codes lexically. Equal values fall back to the raw string.
pub fn client_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Client feature table in input order, unique by `client_code`.
#[derive(Debug, Clone, Default)]
pub struct ClientTable {
    records: Vec<ClientFeatures>,
}

impl ClientTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        Ok(Self {
            records: parser::parse_records(reader)?,
        })
    }

    pub fn from_records(records: Vec<ClientFeatures>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ClientFeatures] {
        &self.records
    }

    pub fn find(&self, client_code: &str) -> Option<&ClientFeatures> {
        self.records
            .iter()
            .find(|client| client.client_code == client_code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
