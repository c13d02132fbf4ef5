use super::PushRecord;
use crate::pipeline::ranking::TOP_N;
use std::fmt::Write as _;

/// Per-client markdown summary of the chosen recommendations and the final
/// push text.
pub fn render_push_report(record: &PushRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Push for client {}\n", record.client_code);
    let _ = writeln!(out, "Name: {}\n", record.name);
    for slot in 0..TOP_N {
        let _ = writeln!(out, "rec_{}: {}", slot + 1, record.rec(slot));
    }
    let _ = writeln!(out, "\nbenefit_estimate: {:.2}\n", record.benefit_estimate);
    out.push_str("Push text:\n\n");
    out.push_str(&record.push_text);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_slots_benefit_and_text() {
        let record = PushRecord {
            client_code: "12".to_string(),
            name: "Айгерим".to_string(),
            recommendations: vec![
                "deposit".to_string(),
                "fx_offer".to_string(),
                "credit_offer".to_string(),
                "premium_card".to_string(),
            ],
            push_text: "Открыть депозит.".to_string(),
            benefit_estimate: 4_000.0,
        };

        let report = render_push_report(&record);
        assert!(report.starts_with("# Push for client 12\n\nName: Айгерим\n\n"));
        assert!(report.contains("rec_1: deposit\nrec_2: fx_offer\nrec_3: credit_offer\nrec_4: premium_card\n"));
        assert!(report.contains("benefit_estimate: 4000.00"));
        assert!(report.ends_with("Push text:\n\nОткрыть депозит.\n"));
    }
}
