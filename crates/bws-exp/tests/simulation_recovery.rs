use bws_core::{BwsError, ItemPool, RngHandle};
use bws_design::{generate, Design, DesignParams, Strategy};
use bws_exp::{
    respond, simulate, to_canonical_json_bytes, LatentShape, LatentValues, SimulationConfig,
    LATENT_SUBSTREAM,
};
use bws_score::Scorer;

fn setup(seed: u64) -> (ItemPool, Design, LatentValues) {
    let pool = ItemPool::new((0..12).map(|idx| format!("w{idx:02}")));
    let params = DesignParams::new(24, 4, Strategy::NorepeatEven);
    let mut rng = RngHandle::from_seed(seed);
    let design = generate(&pool, &params, &mut rng).expect("design");
    let latent = LatentShape::Spaced.draw(&pool, &mut rng.substream(LATENT_SUBSTREAM));
    (pool, design, latent)
}

#[test]
fn noise_free_participants_recover_the_ordering() {
    let (_, design, latent) = setup(11);
    let config = SimulationConfig {
        participants: 5,
        noise_sd: 0.0,
        methods: vec!["Value".into(), "BestWorst".into(), "Elo".into()],
    };
    let report = simulate(&design, &latent, &config, &Scorer::default(), &mut RngHandle::from_seed(3))
        .expect("simulation");

    assert_eq!(report.accuracy.len(), 3);
    for accuracy in &report.accuracy {
        assert_eq!(accuracy.scored_items, 12);
        let rho = accuracy.spearman.expect("defined");
        assert!(rho > 0.6, "{} spearman {rho}", accuracy.method);
    }
}

#[test]
fn seeded_simulations_repeat_exactly() {
    let (_, design, latent) = setup(5);
    let config = SimulationConfig {
        participants: 4,
        noise_sd: 0.8,
        ..SimulationConfig::default()
    };
    let scorer = Scorer::default();
    let first = simulate(&design, &latent, &config, &scorer, &mut RngHandle::from_seed(21)).expect("first");
    let second = simulate(&design, &latent, &config, &scorer, &mut RngHandle::from_seed(21)).expect("second");
    assert_eq!(
        to_canonical_json_bytes(&first).expect("json"),
        to_canonical_json_bytes(&second).expect("json")
    );
}

#[test]
fn participants_draw_from_their_own_substream() {
    let (_, design, latent) = setup(8);
    let master = 77;
    let expected = respond(&design, &latent, 1.0, &mut RngHandle::from_seed(master).substream(3))
        .expect("responses");

    let mut rng = RngHandle::from_seed(master);
    let _ = rng.substream(1);
    let _ = rng.substream(2);
    let actual = respond(&design, &latent, 1.0, &mut rng.substream(3)).expect("responses");
    assert_eq!(actual, expected);
    assert_eq!(actual.len(), design.trials().len());
}

#[test]
fn missing_latent_values_are_reported() {
    let (_, design, _) = setup(2);
    let latent = LatentValues::from_pairs([("w00", 1.0)]);
    let err = respond(&design, &latent, 0.5, &mut RngHandle::from_seed(1)).unwrap_err();
    assert!(matches!(err, BwsError::InvalidDesignParameters(_)));
    assert_eq!(err.info().code, "latent-missing");
}

#[test]
fn invalid_settings_fail_fast() {
    let (_, design, latent) = setup(2);
    let config = SimulationConfig {
        noise_sd: -1.0,
        ..SimulationConfig::default()
    };
    let err = simulate(&design, &latent, &config, &Scorer::default(), &mut RngHandle::from_seed(1))
        .unwrap_err();
    assert_eq!(err.info().code, "noise-sd");

    let config = SimulationConfig {
        participants: 0,
        ..SimulationConfig::default()
    };
    let err = simulate(&design, &latent, &config, &Scorer::default(), &mut RngHandle::from_seed(1))
        .unwrap_err();
    assert_eq!(err.info().code, "no-participants");
}
