use crate::pipeline::scoring::ScoringConfig;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIR: &str = "data/processed";
const DEFAULT_REPORTS_DIR: &str = "reports";

/// Top-level configuration for a pipeline invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: PipelinePaths,
    pub telemetry: TelemetryConfig,
    pub scoring_config: Option<PathBuf>,
    pub ground_truth: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("PUSH_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let reports_dir =
            env::var("PUSH_REPORTS_DIR").unwrap_or_else(|_| DEFAULT_REPORTS_DIR.to_string());
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            paths: PipelinePaths::new(data_dir, reports_dir),
            telemetry: TelemetryConfig { log_level },
            scoring_config: optional_path("PUSH_SCORING_CONFIG"),
            ground_truth: optional_path("PUSH_GROUND_TRUTH"),
        })
    }

    /// Resolves the scoring coefficients, applying the JSON override file when
    /// one is configured. Fields absent from the file keep their defaults.
    pub fn scoring(&self) -> Result<ScoringConfig, ConfigError> {
        match &self.scoring_config {
            Some(path) => load_scoring_config(path),
            None => Ok(ScoringConfig::default()),
        }
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn load_scoring_config(path: &Path) -> Result<ScoringConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ScoringFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ScoringFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Every file the stages read or write, derived from the data and report roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl PipelinePaths {
    pub fn new(data_dir: impl Into<PathBuf>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            reports_dir: reports_dir.into(),
        }
    }

    pub fn clients(&self) -> PathBuf {
        self.data_dir.join("clients_full.csv")
    }

    pub fn scores(&self) -> PathBuf {
        self.data_dir.join("scores.csv")
    }

    pub fn scores_top1(&self) -> PathBuf {
        self.data_dir.join("scores_top1.csv")
    }

    pub fn push_results(&self) -> PathBuf {
        self.data_dir.join("push_results.csv")
    }

    pub fn metrics(&self) -> PathBuf {
        self.data_dir.join("scores_metrics.csv")
    }

    pub fn evaluation_report(&self) -> PathBuf {
        self.reports_dir.join("evaluation.md")
    }

    pub fn push_reports_dir(&self) -> PathBuf {
        self.reports_dir.join("pushes")
    }

    pub fn push_report(&self, client_code: &str) -> PathBuf {
        self.push_reports_dir()
            .join(format!("client_{client_code}_push.md"))
    }

    pub fn recommendation_report(&self, client_code: &str) -> PathBuf {
        self.reports_dir
            .join(format!("client_{client_code}_recs.md"))
    }
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, DEFAULT_REPORTS_DIR)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    ScoringFile {
        path: PathBuf,
        source: std::io::Error,
    },
    ScoringFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ScoringFile { path, .. } => {
                write!(f, "unable to read scoring config {}", path.display())
            }
            ConfigError::ScoringFormat { path, source } => write!(
                f,
                "scoring config {} is not valid JSON: {}",
                path.display(),
                source
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ScoringFile { source, .. } => Some(source),
            ConfigError::ScoringFormat { source, .. } => Some(source),
        }
    }
}
