use bws_core::{BwsError, Item, ResponseTrial};
use bws_score::{score, Aggregate, MethodFn, MethodRegistry, Scorer, ScoringConfig};

fn trial(options: &[&str], best: &str, worst: &str) -> ResponseTrial {
    ResponseTrial::new(
        options.iter().map(|label| Item::from(*label)).collect(),
        Item::from(best),
        Item::from(worst),
    )
    .expect("valid trial")
}

fn mixed_batch() -> Vec<ResponseTrial> {
    vec![
        trial(&["A", "B", "C", "D"], "A", "D"),
        trial(&["B", "C", "E", "F"], "B", "F"),
        trial(&["A", "C", "E", "F"], "E", "C"),
        trial(&["A", "B", "D", "F"], "A", "F"),
        trial(&["C", "D", "E", "B"], "C", "D"),
    ]
}

#[test]
fn two_item_counts_match_hand_tally() {
    let trials = vec![trial(&["A", "B"], "A", "B"); 4];
    let table = score(&trials, &["Best", "Worst", "BestWorst"]).expect("scores");

    assert_eq!(table.get("A", "Best"), Some(4.0));
    assert_eq!(table.get("B", "Best"), Some(0.0));
    assert_eq!(table.get("A", "Worst"), Some(0.0));
    assert_eq!(table.get("B", "Worst"), Some(4.0));
    assert_eq!(table.get("A", "BestWorst"), Some(4.0));
    assert_eq!(table.get("B", "BestWorst"), Some(-4.0));
    // Never-shown pool items do not get rows.
    assert_eq!(table.get("C", "Best"), None);
    assert_eq!(table.get("D", "Best"), None);
    assert_eq!(table.items().len(), 2);
}

#[test]
fn scoring_twice_is_bit_identical() {
    let trials = mixed_batch();
    let methods: Vec<String> = MethodRegistry::standard()
        .entries()
        .map(|entry| entry.name.to_string())
        .collect();
    let scorer = Scorer::default();
    let first = scorer.score(&trials, &methods).expect("first run");
    let second = scorer.score(&trials, &methods).expect("second run");

    assert_eq!(first.methods(), second.methods());
    for (row_a, row_b) in first.rows().zip(second.rows()) {
        assert_eq!(row_a.0, row_b.0);
        let bits_a: Vec<u64> = row_a.1.iter().map(|value| value.to_bits()).collect();
        let bits_b: Vec<u64> = row_b.1.iter().map(|value| value.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }
}

#[test]
fn repeated_requests_produce_one_column() {
    let table = score(&mixed_batch(), &["Value", "Best", "value", "Value"]).expect("scores");
    let names: Vec<&str> = table.methods().iter().map(|name| name.as_str()).collect();
    assert_eq!(names, vec!["Value", "Best"]);
}

#[test]
fn unknown_methods_fail_before_scoring() {
    let err = score(&mixed_batch(), &["Best", "Borda"]).unwrap_err();
    assert!(matches!(err, BwsError::UnknownMethod(_)));
    assert_eq!(err.info().context.get("method").map(String::as_str), Some("Borda"));
}

fn drops_last_item(aggregate: &Aggregate, _config: &ScoringConfig) -> Vec<f64> {
    vec![0.0; aggregate.len() - 1]
}

#[test]
fn short_population_columns_are_reported_not_indexed() {
    let mut registry = MethodRegistry::standard();
    registry.register("Truncated", "one score short", MethodFn::Population(drops_last_item));
    let scorer = Scorer::new(registry, ScoringConfig::default());
    let err = scorer.score(&mixed_batch(), &["Best", "Truncated"]).unwrap_err();
    assert!(matches!(err, BwsError::MethodFailed(_)));
    let info = err.info();
    assert_eq!(info.code, "method-length");
    assert_eq!(info.context.get("method").map(String::as_str), Some("Truncated"));
    assert_eq!(info.context.get("expected").map(String::as_str), Some("6"));
    assert_eq!(info.context.get("actual").map(String::as_str), Some("5"));
}

#[test]
fn empty_batches_are_rejected() {
    let err = score(&[], &["Best"]).unwrap_err();
    assert!(matches!(err, BwsError::NoValidTrials(_)));
}

#[test]
fn rows_follow_first_seen_order() {
    let table = score(&mixed_batch(), &["Unchosen"]).expect("scores");
    let items: Vec<&str> = table.items().iter().map(Item::as_str).collect();
    assert_eq!(items, vec!["A", "B", "C", "D", "E", "F"]);
    // B: shown four times, best once, never worst.
    assert_eq!(table.get("B", "Unchosen"), Some(3.0));
}

#[test]
fn abw_normalises_by_presentations() {
    let table = score(&mixed_batch(), &["ABW", "BestWorstLogit"]).expect("scores");
    // A: shown three times, best twice, never worst.
    let abw = table.get("A", "ABW").expect("A");
    assert!((abw - 2.0 / 3.0).abs() < 1e-12);
    let expected = ((5.0f64 / 6.0) / (1.0 / 6.0)).ln();
    let logit = table.get("A", "BestWorstLogit").expect("A");
    assert!((logit - expected).abs() < 1e-12);
}

#[test]
fn elo_conserves_total_rating() {
    let trials = mixed_batch();
    let table = score(&trials, &["Elo"]).expect("scores");
    let ratings = table.column("Elo").expect("column");
    let total: f64 = ratings.iter().sum();
    assert!((total - 1500.0 * ratings.len() as f64).abs() < 1e-9);
    let a = table.get("A", "Elo").expect("A");
    let f = table.get("F", "Elo").expect("F");
    assert!(a > 1500.0 && f < 1500.0);
}

#[test]
fn elo_first_game_moves_half_the_step() {
    let table = score(&[trial(&["A", "B"], "A", "B")], &["Elo"]).expect("scores");
    assert_eq!(table.get("A", "Elo"), Some(1516.0));
    assert_eq!(table.get("B", "Elo"), Some(1484.0));
}

#[test]
fn rescorla_wagner_follows_trial_order() {
    let trials = vec![trial(&["A", "B"], "A", "B"), trial(&["A", "B"], "B", "A")];
    let table = score(&trials, &["RW"]).expect("scores");
    // Trial 1: mean 0, A += 0.1, B -= 0.1.
    // Trial 2: mean 0, B gains 0.1 * (1 + 0.1), A loses 0.1 * (1 + 0.1).
    let a = table.get("A", "RW").expect("A");
    let b = table.get("B", "RW").expect("B");
    assert!((a - (0.1 - 0.11)).abs() < 1e-12);
    assert!((b - (-0.1 + 0.11)).abs() < 1e-12);

    let reversed: Vec<ResponseTrial> = trials.into_iter().rev().collect();
    let table = score(&reversed, &["RW"]).expect("scores");
    assert!(table.get("A", "RW").expect("A") > 0.0);
}

#[test]
fn david_rewards_breadth_of_wins() {
    // A beats three different opponents once; B beats C three times.
    let trials = vec![
        trial(&["A", "X"], "A", "X"),
        trial(&["A", "Y"], "A", "Y"),
        trial(&["A", "Z"], "A", "Z"),
        trial(&["B", "C"], "B", "C"),
        trial(&["B", "C"], "B", "C"),
        trial(&["B", "C"], "B", "C"),
    ];
    let table = score(&trials, &["David", "Value"]).expect("scores");
    assert_eq!(table.get("A", "Value"), Some(1.0));
    assert_eq!(table.get("B", "Value"), Some(1.0));
    assert_eq!(table.get("A", "David"), Some(3.0));
    assert_eq!(table.get("B", "David"), Some(1.0));
    assert_eq!(table.get("X", "David"), Some(-1.0));
}

#[test]
fn learning_rate_is_configurable() {
    let mut config = ScoringConfig::default();
    config.rescorla_wagner.learning_rate = 0.5;
    let scorer = Scorer::new(MethodRegistry::standard(), config);
    let table = scorer
        .score(&[trial(&["A", "B"], "A", "B")], &["RW", "RWLogit"])
        .expect("scores");
    assert_eq!(table.get("A", "RW"), Some(0.5));
    let expected = (0.75f64 / 0.25).ln();
    assert!((table.get("A", "RWLogit").expect("A") - expected).abs() < 1e-12);
}
