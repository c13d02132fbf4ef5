use super::{EvaluationSummary, MAX_REPORTED_FAILURES};
use std::fmt::Write as _;

/// Markdown report: summary bullets, product distribution, then the first
/// failing records with their diagnostics.
pub fn render_evaluation_report(summary: &EvaluationSummary) -> String {
    let mut out = String::from("# Evaluation Report\n\n## Summary\n\n");

    let _ = writeln!(out, "- *total_clients*: {}", summary.total_clients);
    let _ = writeln!(out, "- *unique_push_texts*: {}", summary.unique_push_texts);
    let rates = [
        ("pushes_non_empty_pct", summary.non_empty_rate),
        ("len_ok_pct", summary.len_ok_rate),
        ("cta_ok_pct", summary.cta_ok_rate),
        ("caps_ok_pct", summary.caps_ok_rate),
        ("emoji_ok_pct", summary.emoji_ok_rate),
    ];
    for (label, value) in rates {
        let _ = writeln!(out, "- *{label}*: {value:.3}");
    }
    let _ = writeln!(out, "- *top1_rate*: {}", optional_rate(summary.top1_rate));
    let _ = writeln!(out, "- *top4_rate*: {}", optional_rate(summary.top4_rate));
    let _ = writeln!(out, "- *failing_pushes*: {}", summary.failing_count);

    out.push_str("\n## Product distribution\n\n");
    if summary.product_distribution.is_empty() {
        out.push_str("No pushes evaluated.\n");
    }
    for (product, count) in &summary.product_distribution {
        let _ = writeln!(out, "- {product}: {count}");
    }

    let _ = write!(
        out,
        "\n## Failing examples (up to {MAX_REPORTED_FAILURES})\n\n"
    );
    if summary.failures.is_empty() {
        out.push_str("All pushes passed basic checks.\n");
    }
    for failure in &summary.failures {
        let checks = &failure.checks;
        let _ = writeln!(
            out,
            "- client_code: {}, push: \"{}\", len: {}, cta_ok: {}, caps_ok: {}, emoji_count: {}",
            failure.client_code,
            failure.push_text,
            checks.length,
            checks.cta_ok,
            checks.caps_ok,
            checks.emoji_count
        );
    }

    out
}

fn optional_rate(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{value:.3}"),
        None => "n/a".to_string(),
    }
}
