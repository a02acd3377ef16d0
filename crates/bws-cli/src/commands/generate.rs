use std::error::Error;
use std::path::PathBuf;

use bws_core::RngHandle;
use bws_design::{balance_advice, design_to_csv_string, generate, load_item_pool, DesignParams, Strategy};
use bws_exp::{hash_files, to_canonical_json_pretty, ManifestBuilder};
use clap::Args;

use crate::commands::{write_manifest_beside, write_output};
use crate::config::BwsConfig;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Item list: a text file with one item per line, or a CSV/TSV file with `--column`.
    #[arg(long)]
    pub items: PathBuf,
    /// Column holding the items when `--items` is a CSV/TSV file.
    #[arg(long)]
    pub column: Option<String>,
    /// Number of trials; defaults to items × `design.trials_per_item`.
    #[arg(long)]
    pub trials: Option<usize>,
    /// Items per trial.
    #[arg(long)]
    pub k: Option<usize>,
    /// One of norepeateven, even, norepeat, random.
    #[arg(long)]
    pub strategy: Option<Strategy>,
    /// Fail instead of emitting rows that repeat an item pair.
    #[arg(long)]
    pub strict: bool,
    /// Seed for reproducible designs; omitted means a fresh random design.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Design CSV destination; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Optional JSON file receiving presentation counts and relaxation rows.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs, config: &BwsConfig) -> Result<(), Box<dyn Error>> {
    let pool = load_item_pool(&args.items, args.column.as_deref())?;
    let mut design_config = config.design.clone();
    if let Some(k) = args.k {
        design_config.k = k;
    }
    if let Some(strategy) = args.strategy {
        design_config.strategy = strategy;
    }
    let mut params = DesignParams::from_config(&design_config, pool.len(), args.trials);
    params.strict_novelty = args.strict;

    if let Some(advice) = balance_advice(&params, pool.len()) {
        let suggested: Vec<String> = advice.suggested_trials.iter().map(ToString::to_string).collect();
        tracing::warn!(
            presentations = advice.presentations,
            pool_size = advice.pool_size,
            suggested_trials = %suggested.join(", "),
            "trials × k is not a multiple of the pool size; counts will differ by one"
        );
    }

    let mut rng = RngHandle::from_optional_seed(args.seed);
    let design = generate(&pool, &params, &mut rng)?;
    tracing::info!(
        trials = design.trials().len(),
        k = design.k,
        strategy = %design.strategy,
        spread = design.presentation_spread(),
        repeated_pairs = design.repeated_pairs(),
        relaxed_rows = design.relaxations().len(),
        "design generated"
    );

    let csv = design_to_csv_string(&design)?;
    write_output(args.out.as_deref(), csv.as_bytes())?;
    if let Some(report) = &args.report {
        write_output(Some(report.as_path()), to_canonical_json_pretty(&design)?.as_bytes())?;
    }

    let manifest = ManifestBuilder::new("generate")
        .input_hash(hash_files(&[&args.items])?)
        .seed(rng.seed())
        .parameter("items", pool.len())
        .parameter("trials", params.trials)
        .parameter("k", params.k)
        .parameter("strategy", params.strategy)
        .parameter("strict_novelty", params.strict_novelty)
        .finish(csv.as_bytes());
    write_manifest_beside(args.out.as_deref(), &manifest)
}
