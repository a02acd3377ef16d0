use std::error::Error;
use std::path::PathBuf;

use bws_core::RngHandle;
use bws_design::{generate, load_item_pool, DesignParams, Strategy};
use bws_exp::{
    hash_files, simulate, to_canonical_json_pretty, LatentShape, ManifestBuilder, SimulationConfig,
    LATENT_SUBSTREAM,
};
use bws_score::{MethodRegistry, Scorer};
use clap::Args;

use crate::commands::{write_manifest_beside, write_output};
use crate::config::BwsConfig;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Item list, read the same way as for `generate`.
    #[arg(long)]
    pub items: PathBuf,
    /// Column holding the items when `--items` is a CSV/TSV file.
    #[arg(long)]
    pub column: Option<String>,
    /// Trials per participant; defaults to items × `design.trials_per_item`.
    #[arg(long)]
    pub trials: Option<usize>,
    /// Items per trial.
    #[arg(long)]
    pub k: Option<usize>,
    /// Design strategy.
    #[arg(long)]
    pub strategy: Option<Strategy>,
    /// Number of virtual participants.
    #[arg(long)]
    pub participants: Option<usize>,
    /// Standard deviation of the perception noise.
    #[arg(long)]
    pub noise_sd: Option<f64>,
    /// How latent values are drawn: normal or spaced.
    #[arg(long, default_value = "normal")]
    pub latent: LatentShape,
    /// Methods to evaluate, comma separated; defaults to every method.
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<String>,
    /// Master seed for the design, latent values and participants.
    #[arg(long)]
    pub seed: Option<u64>,
    /// JSON report destination; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl SimulateArgs {
    fn simulation_config(&self, config: &BwsConfig) -> SimulationConfig {
        let mut simulation = config.simulation.clone();
        if let Some(participants) = self.participants {
            simulation.participants = participants;
        }
        if let Some(noise_sd) = self.noise_sd {
            simulation.noise_sd = noise_sd;
        }
        if !self.methods.is_empty() {
            simulation.methods = self.methods.iter().map(|name| name.trim().to_string()).collect();
        }
        simulation
    }
}

pub fn run(args: &SimulateArgs, config: &BwsConfig) -> Result<(), Box<dyn Error>> {
    let pool = load_item_pool(&args.items, args.column.as_deref())?;
    let mut design_config = config.design.clone();
    if let Some(k) = args.k {
        design_config.k = k;
    }
    if let Some(strategy) = args.strategy {
        design_config.strategy = strategy;
    }
    let params = DesignParams::from_config(&design_config, pool.len(), args.trials);
    let simulation = args.simulation_config(config);
    let scorer = Scorer::new(MethodRegistry::standard(), config.scoring.clone());

    let mut rng = RngHandle::from_optional_seed(args.seed);
    let design = generate(&pool, &params, &mut rng)?;
    let latent = args.latent.draw(&pool, &mut rng.substream(LATENT_SUBSTREAM));
    let report = simulate(&design, &latent, &simulation, &scorer, &mut rng)?;

    for accuracy in &report.accuracy {
        tracing::info!(
            method = accuracy.method.as_str(),
            pearson = accuracy.pearson.unwrap_or(f64::NAN),
            spearman = accuracy.spearman.unwrap_or(f64::NAN),
            scored_items = accuracy.scored_items,
            "method accuracy"
        );
    }

    let json = to_canonical_json_pretty(&report)?;
    write_output(args.out.as_deref(), json.as_bytes())?;

    let manifest = ManifestBuilder::new("simulate")
        .input_hash(hash_files(&[&args.items])?)
        .seed(rng.seed())
        .parameter("items", pool.len())
        .parameter("trials", params.trials)
        .parameter("k", params.k)
        .parameter("strategy", params.strategy)
        .parameter("participants", simulation.participants)
        .parameter("noise_sd", simulation.noise_sd)
        .parameter("latent", args.latent.as_str())
        .finish(json.as_bytes());
    write_manifest_beside(args.out.as_deref(), &manifest)
}
