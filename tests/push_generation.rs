use push_advisor::pipeline::clients::{ClientFeatures, ClientTable, SpendCategory};
use push_advisor::pipeline::evaluation::{evaluate, EvaluationRecord, RecordChecks};
use push_advisor::pipeline::push::{generate, generate_batch, sanitize};
use push_advisor::pipeline::ranking::ScoreTable;
use push_advisor::pipeline::scoring::BenefitScorer;
use push_advisor::pipeline::text_rules::{
    char_len, emoji_count, exclamation_count, has_cta, shouting_word_count, MAX_PUSH_CHARS,
};

fn clients() -> ClientTable {
    ClientTable::from_records(vec![
        ClientFeatures::new("1", "Айгерим")
            .with_balance(2_000_000.0)
            .with_spending(400_000.0, 30_000.0),
        ClientFeatures::new("2", "БЕКЗАТ 🚀🚀 VIP!!!")
            .with_spend(SpendCategory::Travel, 300_000.0)
            .with_spend(SpendCategory::Taxi, 40_000.0),
        ClientFeatures::new("3", "{benefit} {amount}")
            .with_spend(SpendCategory::Restaurants, 45_000.0),
        ClientFeatures::new("4", "А".repeat(260)).with_transfers(1_000.0, 0.0),
        ClientFeatures::new("5", ""),
    ])
}

fn batch_texts() -> Vec<String> {
    let clients = clients();
    let table = ScoreTable::from_scores(&BenefitScorer::default().score_table(&clients));
    generate_batch(&clients, Some(&table))
        .into_iter()
        .map(|record| record.push_text)
        .collect()
}

#[test]
fn generated_text_obeys_every_copy_rule() {
    for text in batch_texts() {
        assert!(char_len(&text) <= MAX_PUSH_CHARS, "too long: {text}");
        assert!(exclamation_count(&text) <= 1, "{text}");
        assert_eq!(emoji_count(&text), 0, "{text}");
        assert!(has_cta(&text), "{text}");
        assert!(shouting_word_count(&text) <= 1, "{text}");
    }
}

#[test]
fn generation_is_byte_identical_across_runs() {
    assert_eq!(batch_texts(), batch_texts());
}

#[test]
fn names_are_not_expanded_as_placeholders() {
    let client = ClientFeatures::new("3", "{benefit}").with_balance(100_000.0);
    let text = generate(&client, &["deposit".to_string()], 1_000.0);
    assert!(text.starts_with("{benefit}, "), "{text}");
}

#[test]
fn products_outside_the_catalog_get_the_generic_offer() {
    let client = ClientFeatures::new("8", "Ерлан");
    let text = generate(&client, &["mortgage".to_string()], 0.0);
    assert_eq!(text, "Ерлан, у вас персональное предложение: mortgage. Посмотреть.");
    assert!(RecordChecks::inspect(&text).passed(), "{text}");
}

#[test]
fn evaluator_flags_raw_overlong_text_but_not_its_sanitized_form() {
    let raw = format!("Оформить {}", "слово ".repeat(40));
    let raw = raw.trim_end().to_string();
    assert!(char_len(&raw) > MAX_PUSH_CHARS);

    let record = |text: &str| EvaluationRecord {
        client_code: "1".to_string(),
        product: "deposit".to_string(),
        push_text: text.to_string(),
        recommendations: vec!["deposit".to_string()],
        target_product: None,
    };

    let summary = evaluate(&[record(&raw)]);
    assert_eq!(summary.len_ok_rate, 0.0);

    let cleaned = sanitize(&raw);
    assert!(RecordChecks::inspect(&cleaned).passed(), "{cleaned}");
    assert_eq!(sanitize(&cleaned), cleaned);
}

#[test]
fn whole_batch_passes_evaluation() {
    let clients = clients();
    let table = ScoreTable::from_scores(&BenefitScorer::default().score_table(&clients));
    let records: Vec<EvaluationRecord> = generate_batch(&clients, Some(&table))
        .iter()
        .map(EvaluationRecord::from_push)
        .collect();

    let summary = evaluate(&records);
    assert_eq!(summary.total_clients, 5);
    assert_eq!(summary.len_ok_rate, 1.0);
    assert_eq!(summary.cta_ok_rate, 1.0);
    assert_eq!(summary.caps_ok_rate, 1.0);
    assert_eq!(summary.emoji_ok_rate, 1.0);
    assert_eq!(summary.non_empty_rate, 1.0);
    assert!(summary.failures.is_empty());
}
