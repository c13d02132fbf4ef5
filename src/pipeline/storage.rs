//! Flat-file tables exchanged between stages. Every write replaces the whole
//! file; nothing is appended or merged.

use crate::pipeline::clients::safe_float;
use crate::pipeline::error::PipelineError;
use crate::pipeline::evaluation::{ClientHits, EvaluationRecord};
use crate::pipeline::push::PushRecord;
use crate::pipeline::ranking::ScoreTable;
use crate::pipeline::scoring::ProductScore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Column layout of a table, written even when there are no rows.
pub trait CsvTable {
    const HEADERS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub client_code: String,
    pub product: String,
    #[serde(alias = "benefit_est_KZT", deserialize_with = "lenient_amount")]
    pub benefit_estimate: f64,
    #[serde(default)]
    pub reason_code: String,
    #[serde(alias = "explain", default)]
    pub explanation: String,
}

impl CsvTable for ScoreRecord {
    const HEADERS: &'static [&'static str] = &[
        "client_code",
        "product",
        "benefit_estimate",
        "reason_code",
        "explanation",
    ];
}

impl From<&ProductScore> for ScoreRecord {
    fn from(score: &ProductScore) -> Self {
        Self {
            client_code: score.client_code.clone(),
            product: score.product.id().to_string(),
            benefit_estimate: score.benefit_estimate,
            reason_code: score.reason_code.to_string(),
            explanation: score.explanation.clone(),
        }
    }
}

/// Groups score rows read back from file, keeping the first of any
/// duplicated (client, product) pair.
pub fn score_table(rows: &[ScoreRecord]) -> ScoreTable {
    let mut table = ScoreTable::default();
    for row in rows {
        table.insert(&row.client_code, &row.product, row.benefit_estimate);
    }
    table
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushResultRecord {
    pub client_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product: String,
    #[serde(alias = "push", default)]
    pub push_text: String,
    #[serde(default)]
    pub rec_1: String,
    #[serde(default)]
    pub rec_2: String,
    #[serde(default)]
    pub rec_3: String,
    #[serde(default)]
    pub rec_4: String,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "empty_string_as_none"
    )]
    pub target_product: Option<String>,
}

impl CsvTable for PushResultRecord {
    const HEADERS: &'static [&'static str] = &[
        "client_code",
        "name",
        "product",
        "push_text",
        "rec_1",
        "rec_2",
        "rec_3",
        "rec_4",
    ];
}

impl From<&PushRecord> for PushResultRecord {
    fn from(record: &PushRecord) -> Self {
        Self {
            client_code: record.client_code.clone(),
            name: record.name.clone(),
            product: record.product().to_string(),
            push_text: record.push_text.clone(),
            rec_1: record.rec(0).to_string(),
            rec_2: record.rec(1).to_string(),
            rec_3: record.rec(2).to_string(),
            rec_4: record.rec(3).to_string(),
            target_product: None,
        }
    }
}

impl From<PushResultRecord> for EvaluationRecord {
    fn from(row: PushResultRecord) -> Self {
        let recommendations = [row.rec_1, row.rec_2, row.rec_3, row.rec_4]
            .into_iter()
            .filter(|rec| !rec.is_empty())
            .collect();
        Self {
            client_code: row.client_code,
            product: row.product,
            push_text: row.push_text,
            recommendations,
            target_product: row.target_product,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub client_code: String,
    pub hit_top1: u8,
    pub hit_top4: u8,
}

impl CsvTable for MetricsRecord {
    const HEADERS: &'static [&'static str] = &["client_code", "hit_top1", "hit_top4"];
}

impl From<&ClientHits> for MetricsRecord {
    fn from(hits: &ClientHits) -> Self {
        Self {
            client_code: hits.client_code.clone(),
            hit_top1: u8::from(hits.hit_top1),
            hit_top4: u8::from(hits.hit_top4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroundTruthRecord {
    pub client_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub target_product: Option<String>,
}

/// Reads a whole table. A missing file is [`PipelineError::MissingInput`].
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::missing_input(path));
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Writes a whole table, creating parent directories and replacing any
/// previous file.
pub fn write_rows<T: CsvTable + Serialize>(path: &Path, rows: &[T]) -> Result<(), PipelineError> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_text(path: &Path, contents: &str) -> Result<(), PipelineError> {
    ensure_parent(path)?;
    fs::write(path, contents)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let value = raw.as_deref().map(safe_float).unwrap_or(0.0);
    if let Some(raw) = raw.as_deref().filter(|raw| !raw.trim().is_empty()) {
        if raw.trim().parse::<f64>().ok() != Some(value) {
            debug!(raw, value, "benefit value coerced");
        }
    }
    Ok(value)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
