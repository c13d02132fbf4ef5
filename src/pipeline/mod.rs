//! Scoring, ranking, push generation and evaluation stages.

pub mod clients;
pub mod evaluation;
pub mod money;
pub mod push;
pub mod ranking;
pub mod scoring;
pub mod stages;
pub mod storage;
pub mod text_rules;

mod error;

pub use error::PipelineError;
pub use stages::{Pipeline, RankedProduct, Recommendation};
