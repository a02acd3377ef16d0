use std::error::Error;
use std::path::PathBuf;

use bws_exp::{hash_files, ManifestBuilder};
use bws_score::{parse_files, ColumnSpec, MethodRegistry, ScoreTable, Scorer, DEFAULT_METHODS};
use clap::Args;

use crate::commands::{write_manifest_beside, write_output};
use crate::config::BwsConfig;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Response files (CSV, or TSV by extension); rows are concatenated in order.
    #[arg(required = true)]
    pub responses: Vec<PathBuf>,
    /// Column naming the item chosen best.
    #[arg(long)]
    pub best: Option<String>,
    /// Column naming the item chosen worst.
    #[arg(long)]
    pub worst: Option<String>,
    /// Prefix of the numbered option columns.
    #[arg(long)]
    pub option_prefix: Option<String>,
    /// Methods to compute, comma separated; defaults to Value,Best,Worst,BestWorst.
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<String>,
    /// Compute every registered method.
    #[arg(long, conflicts_with = "methods")]
    pub all_methods: bool,
    /// Score CSV destination; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl ScoreArgs {
    fn columns(&self, config: &BwsConfig) -> ColumnSpec {
        let mut columns = config.columns.clone();
        if let Some(best) = &self.best {
            columns.best = best.clone();
        }
        if let Some(worst) = &self.worst {
            columns.worst = worst.clone();
        }
        if let Some(prefix) = &self.option_prefix {
            columns.option_prefix = prefix.clone();
        }
        columns
    }

    fn requested_methods(&self, registry: &MethodRegistry) -> Vec<String> {
        if self.all_methods {
            registry.entries().map(|entry| entry.name.to_string()).collect()
        } else if self.methods.is_empty() {
            DEFAULT_METHODS.iter().map(ToString::to_string).collect()
        } else {
            self.methods.iter().map(|name| name.trim().to_string()).collect()
        }
    }
}

fn method_list(table: &ScoreTable) -> String {
    let names: Vec<&str> = table.methods().iter().map(|name| name.as_str()).collect();
    names.join(",")
}

pub fn run(args: &ScoreArgs, config: &BwsConfig) -> Result<(), Box<dyn Error>> {
    let columns = args.columns(config);
    let scorer = Scorer::new(MethodRegistry::standard(), config.scoring.clone());
    let methods = args.requested_methods(scorer.registry());

    let report = parse_files(&args.responses, &columns)?;
    if report.rejected_count() > 0 {
        tracing::warn!(
            rejected = report.rejected_count(),
            accepted = report.trials.len(),
            "some response rows were malformed and skipped"
        );
    }
    let table = scorer.score(&report.trials, &methods)?;
    let undefined = table.undefined_cells();
    if !undefined.is_empty() {
        tracing::info!(cells = undefined.len(), "some scores are undefined and written as NA");
    }

    let csv = table.to_csv_string()?;
    write_output(args.out.as_deref(), csv.as_bytes())?;

    let manifest = ManifestBuilder::new("score")
        .input_hash(hash_files(&args.responses)?)
        .parameter("files", args.responses.len())
        .parameter("trials", report.trials.len())
        .parameter("rejected_rows", report.rejected_count())
        .parameter("methods", method_list(&table))
        .parameter("best_column", &columns.best)
        .parameter("worst_column", &columns.worst)
        .finish(csv.as_bytes());
    write_manifest_beside(args.out.as_deref(), &manifest)
}
