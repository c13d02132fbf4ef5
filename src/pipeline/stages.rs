use crate::config::PipelinePaths;
use crate::pipeline::clients::{ClientFeatures, ClientTable};
use crate::pipeline::error::PipelineError;
use crate::pipeline::evaluation::{
    evaluate, render_evaluation_report, EvaluationRecord, EvaluationSummary,
};
use crate::pipeline::money::format_money;
use crate::pipeline::push::{build_record, generate_batch, render_push_report, PushRecord};
use crate::pipeline::ranking::ScoreTable;
use crate::pipeline::scoring::{top1, BenefitScorer, ProductScore, ScoringConfig};
use crate::pipeline::storage::{
    self, GroundTruthRecord, MetricsRecord, PushResultRecord, ScoreRecord,
};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Runs the batch stages against one pair of data/report directories.
#[derive(Debug, Clone)]
pub struct Pipeline {
    paths: PipelinePaths,
    scorer: BenefitScorer,
    ground_truth: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(paths: PipelinePaths, scoring: ScoringConfig) -> Self {
        Self {
            paths,
            scorer: BenefitScorer::new(scoring),
            ground_truth: None,
        }
    }

    /// Joins `client_code,target_product` rows onto pushes during evaluation.
    pub fn with_ground_truth(mut self, path: Option<PathBuf>) -> Self {
        self.ground_truth = path;
        self
    }

    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    /// Scores every client against the full catalog and writes the score and
    /// top-1 tables.
    pub fn score(&self) -> Result<Vec<ProductScore>, PipelineError> {
        let clients = self.load_clients()?;
        self.score_with(&clients)
    }

    fn score_with(&self, clients: &ClientTable) -> Result<Vec<ProductScore>, PipelineError> {
        info!(clients = clients.len(), "scoring clients");
        let scores = self.scorer.score_table(clients);
        let best = top1(&scores);

        let score_rows: Vec<ScoreRecord> = scores.iter().map(ScoreRecord::from).collect();
        let top1_rows: Vec<ScoreRecord> = best.iter().map(ScoreRecord::from).collect();
        storage::write_rows(&self.paths.scores(), &score_rows)?;
        storage::write_rows(&self.paths.scores_top1(), &top1_rows)?;

        info!(
            rows = score_rows.len(),
            scores = %self.paths.scores().display(),
            top1 = %self.paths.scores_top1().display(),
            "score stage finished"
        );
        Ok(scores)
    }

    /// Builds pushes from the client table and the score file written by
    /// [`Pipeline::score`]. Without a score file every client gets the
    /// fallback ranking.
    pub fn push(&self) -> Result<Vec<PushRecord>, PipelineError> {
        let clients = self.load_clients()?;
        let scores_path = self.paths.scores();
        let scores = if scores_path.exists() {
            let rows: Vec<ScoreRecord> = storage::read_rows(&scores_path)?;
            Some(storage::score_table(&rows))
        } else {
            warn!(path = %scores_path.display(), "score table absent; using fallback ranking");
            None
        };
        self.push_with(&clients, scores.as_ref())
    }

    /// Checks the push table written by [`Pipeline::push`] and writes the
    /// evaluation report, plus per-client hit metrics when targets are known.
    pub fn evaluate(&self) -> Result<EvaluationSummary, PipelineError> {
        let path = self.paths.push_results();
        require(&path)?;
        let rows: Vec<PushResultRecord> = storage::read_rows(&path)?;
        let records = rows.into_iter().map(EvaluationRecord::from).collect();
        self.evaluate_with(records)
    }

    /// All three stages in sequence, handing results over in memory.
    pub fn run_all(&self) -> Result<EvaluationSummary, PipelineError> {
        let clients = self.load_clients()?;
        let scores = self.score_with(&clients)?;
        let table = ScoreTable::from_scores(&scores);
        let pushes = self.push_with(&clients, Some(&table))?;
        let records = pushes.iter().map(EvaluationRecord::from_push).collect();
        self.evaluate_with(records)
    }

    /// Single-client lookup: scores the client, selects the top four and
    /// renders the push, then writes a markdown summary.
    pub fn recommend(&self, raw_code: &str) -> Result<Recommendation, PipelineError> {
        let code = raw_code.trim();
        let number: u64 = code.parse().map_err(|_| PipelineError::InvalidClientCode {
            raw: raw_code.to_string(),
        })?;

        let clients = self.load_clients()?;
        let client = clients
            .find(code)
            .or_else(|| {
                clients
                    .records()
                    .iter()
                    .find(|client| client.client_code.parse::<u64>().ok() == Some(number))
            })
            .ok_or_else(|| {
                warn!(client_code = code, "client not found");
                PipelineError::ClientNotFound {
                    client_code: code.to_string(),
                }
            })?;

        let recommendation = self.recommend_for(client);
        let path = self.paths.recommendation_report(&client.client_code);
        storage::write_text(&path, &recommendation.render_markdown())?;
        info!(client_code = %client.client_code, path = %path.display(), "recommendations written");
        Ok(recommendation)
    }

    fn recommend_for(&self, client: &ClientFeatures) -> Recommendation {
        let scores = self.scorer.score(client);
        let table = ScoreTable::from_scores(&scores);
        let push = build_record(client, Some(&table));

        let ranked = push
            .recommendations
            .iter()
            .filter_map(|product| {
                scores
                    .iter()
                    .find(|score| score.product.id() == product)
                    .map(|score| RankedProduct {
                        product: product.clone(),
                        benefit_estimate: score.benefit_estimate,
                        reason_code: score.reason_code.to_string(),
                    })
            })
            .collect();

        Recommendation {
            client_code: client.client_code.clone(),
            name: client.name.clone(),
            ranked,
            push_text: push.push_text,
        }
    }

    fn push_with(
        &self,
        clients: &ClientTable,
        scores: Option<&ScoreTable>,
    ) -> Result<Vec<PushRecord>, PipelineError> {
        info!(
            clients = clients.len(),
            scored = scores.is_some(),
            "generating pushes"
        );
        let pushes = generate_batch(clients, scores);

        let rows: Vec<PushResultRecord> = pushes.iter().map(PushResultRecord::from).collect();
        storage::write_rows(&self.paths.push_results(), &rows)?;
        for record in &pushes {
            let path = self.paths.push_report(&record.client_code);
            storage::write_text(&path, &render_push_report(record))?;
        }

        info!(
            pushes = pushes.len(),
            results = %self.paths.push_results().display(),
            reports = %self.paths.push_reports_dir().display(),
            "push stage finished"
        );
        Ok(pushes)
    }

    fn evaluate_with(
        &self,
        mut records: Vec<EvaluationRecord>,
    ) -> Result<EvaluationSummary, PipelineError> {
        self.join_ground_truth(&mut records)?;
        let summary = evaluate(&records);

        if summary.has_ground_truth() {
            let rows: Vec<MetricsRecord> = summary.hits.iter().map(MetricsRecord::from).collect();
            storage::write_rows(&self.paths.metrics(), &rows)?;
            info!(path = %self.paths.metrics().display(), "hit metrics written");
        }
        let report_path = self.paths.evaluation_report();
        storage::write_text(&report_path, &render_evaluation_report(&summary))?;

        info!(
            total_clients = summary.total_clients,
            unique_push_texts = summary.unique_push_texts,
            len_ok = summary.len_ok_rate,
            cta_ok = summary.cta_ok_rate,
            caps_ok = summary.caps_ok_rate,
            emoji_ok = summary.emoji_ok_rate,
            failing = summary.failing_count,
            report = %report_path.display(),
            "evaluation finished"
        );
        Ok(summary)
    }

    /// Fills `target_product` from the ground-truth file for records that do
    /// not already carry one. A configured but absent file is skipped.
    fn join_ground_truth(&self, records: &mut [EvaluationRecord]) -> Result<(), PipelineError> {
        let Some(path) = &self.ground_truth else {
            return Ok(());
        };
        if !path.exists() {
            warn!(path = %path.display(), "ground truth file not found; hit rates skipped");
            return Ok(());
        }

        let rows: Vec<GroundTruthRecord> = storage::read_rows(path)?;
        let mut targets: HashMap<String, String> = HashMap::new();
        for row in rows {
            if let Some(target) = row.target_product {
                targets.entry(row.client_code).or_insert(target);
            }
        }
        info!(targets = targets.len(), path = %path.display(), "ground truth loaded");

        for record in records.iter_mut().filter(|record| record.target_product.is_none()) {
            record.target_product = Some(
                targets
                    .get(&record.client_code)
                    .cloned()
                    .unwrap_or_default(),
            );
        }
        Ok(())
    }

    fn load_clients(&self) -> Result<ClientTable, PipelineError> {
        let path = self.paths.clients();
        require(&path)?;
        let clients = ClientTable::from_path(&path)?;
        info!(clients = clients.len(), path = %path.display(), "client table loaded");
        Ok(clients)
    }
}

fn require(path: &Path) -> Result<(), PipelineError> {
    if path.exists() {
        return Ok(());
    }
    error!(path = %path.display(), "required input missing; stage aborted");
    Err(PipelineError::missing_input(path))
}

/// One line of a single-client recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedProduct {
    pub product: String,
    pub benefit_estimate: f64,
    pub reason_code: String,
}

/// Result of [`Pipeline::recommend`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub client_code: String,
    pub name: String,
    pub ranked: Vec<RankedProduct>,
    pub push_text: String,
}

impl Recommendation {
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Recommendations for client {}\n", self.client_code);
        let _ = writeln!(out, "**Name:** {}\n", self.name);
        out.push_str("**Recommendations:**\n");
        for (index, entry) in self.ranked.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({}, {})",
                index + 1,
                entry.product,
                format_money(entry.benefit_estimate),
                entry.reason_code
            );
        }
        let _ = write!(out, "\n**Push:**\n\n{}\n", self.push_text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const CLIENTS: &str = "\
client_code,name,avg_monthly_balance,spent_Такси,total_spent,avg_transaction,transfers_in,transfers_out
1,Айгерим,400000,30000,120000,5000,0,0
2,Бекзат,0,0,0,0,500000,300000
";

    fn workspace() -> (TempDir, Pipeline) {
        let dir = tempdir().expect("temp dir");
        let paths = PipelinePaths::new(dir.path().join("data"), dir.path().join("reports"));
        (dir, Pipeline::new(paths, ScoringConfig::default()))
    }

    fn seed_clients(pipeline: &Pipeline) {
        let path = pipeline.paths().clients();
        fs::create_dir_all(path.parent().expect("data dir")).expect("create data dir");
        fs::write(path, CLIENTS).expect("write clients");
    }

    #[test]
    fn score_writes_full_and_top1_tables() {
        let (_dir, pipeline) = workspace();
        seed_clients(&pipeline);

        let scores = pipeline.score().expect("score stage");
        assert_eq!(scores.len(), 20);

        let top: Vec<ScoreRecord> =
            storage::read_rows(&pipeline.paths().scores_top1()).expect("read top1");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product, "deposit");
        assert_eq!(top[1].product, "fx_offer");
        assert_eq!(top[1].reason_code, "FX_ACTIVITY");
    }

    #[test]
    fn missing_client_table_aborts_without_output() {
        let (_dir, pipeline) = workspace();
        let err = pipeline.score().expect_err("missing input");
        assert!(matches!(err, PipelineError::MissingInput { .. }));
        assert!(!pipeline.paths().scores().exists());
    }

    #[test]
    fn push_without_scores_falls_back() {
        let (_dir, pipeline) = workspace();
        seed_clients(&pipeline);

        let pushes = pipeline.push().expect("push stage");
        assert_eq!(
            pushes[0].recommendations,
            vec!["deposit", "credit_offer", "premium_card", "supermarket_card"]
        );
        assert!(pipeline.paths().push_report("1").exists());
        assert!(pipeline.paths().push_report("2").exists());
    }

    #[test]
    fn evaluate_requires_push_results() {
        let (_dir, pipeline) = workspace();
        let err = pipeline.evaluate().expect_err("missing pushes");
        assert!(matches!(err, PipelineError::MissingInput { .. }));
        assert!(!pipeline.paths().evaluation_report().exists());
    }

    #[test]
    fn ground_truth_file_produces_metrics() {
        let (dir, pipeline) = workspace();
        seed_clients(&pipeline);
        let truth = dir.path().join("truth.csv");
        fs::write(&truth, "client_code,target_product\n1,deposit\n2,gold_offer\n")
            .expect("write truth");
        let pipeline = pipeline.with_ground_truth(Some(truth));

        let summary = pipeline.run_all().expect("full run");
        assert_eq!(summary.top1_rate, Some(0.5));

        let metrics = fs::read_to_string(pipeline.paths().metrics()).expect("read metrics");
        assert_eq!(metrics, "client_code,hit_top1,hit_top4\n1,1,1\n2,0,0\n");
    }

    #[test]
    fn recommend_validates_the_code() {
        let (_dir, pipeline) = workspace();
        seed_clients(&pipeline);

        let err = pipeline.recommend("abc").expect_err("non numeric");
        assert!(matches!(err, PipelineError::InvalidClientCode { .. }));

        let err = pipeline.recommend("99").expect_err("unknown client");
        assert!(matches!(err, PipelineError::ClientNotFound { .. }));
        assert!(!pipeline.paths().recommendation_report("99").exists());

        let recommendation = pipeline.recommend("2").expect("known client");
        assert_eq!(recommendation.ranked[0].product, "fx_offer");
        assert_eq!(recommendation.ranked[0].reason_code, "FX_ACTIVITY");
        let report = fs::read_to_string(pipeline.paths().recommendation_report("2"))
            .expect("read recs report");
        assert!(report.contains("1. fx_offer (4 000 ₸, FX_ACTIVITY)"));
    }
}
