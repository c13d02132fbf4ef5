use super::normalizer::{
    category_key, checked_amount, is_path_safe_code, normalize_header, parse_count,
};
use super::{ClientFeatures, DEFAULT_CLIENT_NAME, SPEND_PREFIX};
use crate::pipeline::error::PipelineError;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use tracing::{debug, warn};

const KEY_COLUMNS: [&str; 3] = ["client_code", "client_id", "client"];
const BALANCE_COLUMNS: [&str; 2] = ["avg_monthly_balance", "avg_monthly_balance_KZT"];

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ClientFeatures>, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let key_column = KEY_COLUMNS
        .iter()
        .copied()
        .find(|column| headers.iter().any(|header| header == column))
        .ok_or(PipelineError::MissingColumn {
            column: "client_code",
            table: "client feature table",
        })?;

    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row: BTreeMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect();

        let client_code = row.get(key_column).copied().unwrap_or_default();
        if client_code.is_empty() {
            warn!(row = line + 1, "skipping client row without {key_column}");
            continue;
        }
        if !is_path_safe_code(client_code) {
            warn!(client_code, "skipping client row with a path-unsafe code");
            continue;
        }
        if !seen.insert(client_code.to_string()) {
            warn!(client_code, "duplicate client row ignored");
            continue;
        }

        records.push(features_from_row(client_code, &row));
    }

    Ok(records)
}

fn features_from_row(client_code: &str, row: &BTreeMap<&str, &str>) -> ClientFeatures {
    let name = field(row, "name")
        .unwrap_or(DEFAULT_CLIENT_NAME)
        .to_string();
    let read = |column: &str| amount(client_code, column, field(row, column));
    let balance = BALANCE_COLUMNS
        .iter()
        .copied()
        .find(|column| field(row, column).is_some())
        .map_or(0.0, |column| read(column));

    let mut spend = BTreeMap::new();
    for column in row.keys().copied() {
        if let Some(category) = column.strip_prefix(SPEND_PREFIX) {
            *spend.entry(category_key(category)).or_insert(0.0) += read(column);
        }
    }

    ClientFeatures {
        client_code: client_code.to_string(),
        name,
        spend,
        total_spent: read("total_spent"),
        avg_transaction: read("avg_transaction"),
        num_transactions: parse_count(field(row, "num_transactions")),
        transfers_in: read("transfers_in"),
        transfers_out: read("transfers_out"),
        avg_monthly_balance: balance,
    }
}

fn amount(client_code: &str, column: &str, raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let (value, coerced) = checked_amount(raw);
    if coerced {
        debug!(client_code, column, raw, value, "numeric cell coerced");
    }
    value
}

fn field<'a>(row: &BTreeMap<&str, &'a str>, name: &str) -> Option<&'a str> {
    row.get(name).copied().filter(|value| !value.is_empty())
}
