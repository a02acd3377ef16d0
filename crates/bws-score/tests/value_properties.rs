use bws_core::{Item, ResponseTrial};
use bws_score::score;
use proptest::prelude::*;

const LABELS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn response() -> impl Strategy<Value = ResponseTrial> {
    (2usize..=5)
        .prop_flat_map(|k| Just(LABELS.to_vec()).prop_shuffle().prop_map(move |pool| pool[..k].to_vec()))
        .prop_flat_map(|options| {
            let k = options.len();
            (Just(options), 0..k, 1..k)
        })
        .prop_map(|(options, best, offset)| {
            let worst = (best + offset) % options.len();
            ResponseTrial::new(
                options.iter().map(|label| Item::from(*label)).collect(),
                Item::from(options[best]),
                Item::from(options[worst]),
            )
            .expect("distinct best and worst among options")
        })
}

proptest! {
    #[test]
    fn value_is_a_proportion(trials in prop::collection::vec(response(), 1..40)) {
        let table = score(&trials, &["Value", "ValueLogit"]).expect("scores");
        for value in table.column("Value").expect("Value") {
            prop_assert!((0.0..=1.0).contains(&value));
        }
        for value in table.column("ValueLogit").expect("ValueLogit") {
            prop_assert!(value.is_finite());
        }
    }

    #[test]
    fn every_shown_item_gets_defined_counts(trials in prop::collection::vec(response(), 1..40)) {
        let table = score(&trials, &["Best", "Worst", "Unchosen", "ABW", "Elo", "RW", "David"])
            .expect("scores");
        prop_assert!(table.undefined_cells().is_empty());
        let best: f64 = table.column("Best").expect("Best").iter().sum();
        let worst: f64 = table.column("Worst").expect("Worst").iter().sum();
        prop_assert_eq!(best, trials.len() as f64);
        prop_assert_eq!(worst, trials.len() as f64);
    }
}

#[test]
fn balanced_record_scores_one_half() {
    let ab = |best: &str, worst: &str| {
        ResponseTrial::new(vec![Item::from("a"), Item::from("b")], Item::from(best), Item::from(worst))
            .expect("trial")
    };
    let trials = vec![ab("a", "b"), ab("b", "a"), ab("a", "b"), ab("b", "a")];
    let table = score(&trials, &["Value", "ValueLogit", "BestWorstLogit"]).expect("scores");
    assert_eq!(table.get("a", "Value"), Some(0.5));
    assert_eq!(table.get("b", "Value"), Some(0.5));
    assert_eq!(table.get("a", "ValueLogit"), Some(0.0));
    assert_eq!(table.get("a", "BestWorstLogit"), Some(0.0));
}

#[test]
fn unanimous_winner_is_clamped_not_infinite() {
    let trial = ResponseTrial::new(
        vec![Item::from("a"), Item::from("b"), Item::from("c")],
        Item::from("a"),
        Item::from("c"),
    )
    .expect("trial");
    let table = score(&[trial], &["Value", "ValueLogit"]).expect("scores");
    assert_eq!(table.get("a", "Value"), Some(1.0));
    let clamped = table.get("a", "ValueLogit").expect("a");
    assert!((clamped - (0.999f64 / 0.001).ln()).abs() < 1e-9);
    assert!(table.get("c", "ValueLogit").expect("c") < -6.0);
}
