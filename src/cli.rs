use crate::config::AppConfig;
use crate::error::AppError;
use crate::pipeline::evaluation::EvaluationSummary;
use crate::pipeline::money::format_money;
use crate::pipeline::{Pipeline, Recommendation};
use crate::telemetry;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "push-advisor",
    about = "Score banking products per client and render personalized push notifications",
    version
)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Score every client against the product catalog
    Score,
    /// Render push texts from the client and score tables
    Push,
    /// Check push texts against the copy rules and write the report
    Evaluate,
    /// Run score, push and evaluate in sequence
    Run,
    /// Show the top recommendations and push for one client
    Recommend(RecommendArgs),
}

#[derive(Args, Debug, PartialEq)]
struct RecommendArgs {
    /// Numeric client code as it appears in the client table
    client_code: String,
}

#[derive(Args, Debug, Default, PartialEq)]
struct PathArgs {
    /// Override the directory holding the input and output tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Override the directory receiving markdown reports
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,
    /// JSON file overriding scoring coefficients
    #[arg(long, global = true)]
    scoring_config: Option<PathBuf>,
}

impl PathArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(data_dir) = self.data_dir {
            config.paths.data_dir = data_dir;
        }
        if let Some(reports_dir) = self.reports_dir {
            config.paths.reports_dir = reports_dir;
        }
        if let Some(scoring_config) = self.scoring_config {
            config.scoring_config = Some(scoring_config);
        }
    }
}

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.paths.apply(&mut config);
    telemetry::init(&config.telemetry)?;

    let pipeline = Pipeline::new(config.paths.clone(), config.scoring()?)
        .with_ground_truth(config.ground_truth.clone());

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Score => {
            let scores = pipeline.score()?;
            writeln!(
                out,
                "scores written: {} rows -> {}",
                scores.len(),
                pipeline.paths().scores().display()
            )?;
        }
        Command::Push => {
            let pushes = pipeline.push()?;
            writeln!(
                out,
                "push results written: {} clients -> {}",
                pushes.len(),
                pipeline.paths().push_results().display()
            )?;
        }
        Command::Evaluate => write_summary(&mut out, &pipeline.evaluate()?)?,
        Command::Run => write_summary(&mut out, &pipeline.run_all()?)?,
        Command::Recommend(args) => {
            write_recommendation(&mut out, &pipeline.recommend(&args.client_code)?)?
        }
    }
    out.flush()?;
    Ok(())
}

fn write_summary(out: &mut impl Write, summary: &EvaluationSummary) -> io::Result<()> {
    writeln!(out, "Summary:")?;
    writeln!(out, "- total_clients: {}", summary.total_clients)?;
    writeln!(out, "- unique_push_texts: {}", summary.unique_push_texts)?;
    writeln!(out, "- pushes_non_empty_pct: {:.3}", summary.non_empty_rate)?;
    writeln!(out, "- len_ok_pct: {:.3}", summary.len_ok_rate)?;
    writeln!(out, "- cta_ok_pct: {:.3}", summary.cta_ok_rate)?;
    writeln!(out, "- caps_ok_pct: {:.3}", summary.caps_ok_rate)?;
    writeln!(out, "- emoji_ok_pct: {:.3}", summary.emoji_ok_rate)?;
    if let (Some(top1), Some(top4)) = (summary.top1_rate, summary.top4_rate) {
        writeln!(out, "- top1_rate: {top1:.3}")?;
        writeln!(out, "- top4_rate: {top4:.3}")?;
    }
    writeln!(out, "- failing_pushes: {}", summary.failing_count)
}

fn write_recommendation(out: &mut impl Write, recommendation: &Recommendation) -> io::Result<()> {
    writeln!(
        out,
        "Client {} ({})",
        recommendation.client_code, recommendation.name
    )?;
    for (index, entry) in recommendation.ranked.iter().enumerate() {
        writeln!(
            out,
            "{}. {} {} [{}]",
            index + 1,
            entry.product,
            format_money(entry.benefit_estimate),
            entry.reason_code
        )?;
    }
    writeln!(out, "Push: {}", recommendation.push_text)
}
