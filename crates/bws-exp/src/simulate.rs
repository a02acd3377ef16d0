//! Virtual participants answering a design from known latent values.

use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::{Item, ItemPool, ResponseTrial, RngHandle};
use bws_design::Design;
use bws_score::{MethodName, MethodRegistry, ScoreTable, Scorer};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::correlation::{finite_pairs, pearson, spearman};

/// Substream reserved for drawing latent values; participants use `1..`.
pub const LATENT_SUBSTREAM: u64 = 0;

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of virtual participants, each answering every trial.
    #[serde(default = "SimulationConfig::default_participants")]
    pub participants: usize,
    /// Standard deviation of the per-option perception noise.
    #[serde(default = "SimulationConfig::default_noise_sd")]
    pub noise_sd: f64,
    /// Methods evaluated against the latent values.
    #[serde(default = "SimulationConfig::default_methods")]
    pub methods: Vec<String>,
}

impl SimulationConfig {
    const fn default_participants() -> usize {
        20
    }

    const fn default_noise_sd() -> f64 {
        1.0
    }

    fn default_methods() -> Vec<String> {
        MethodRegistry::standard()
            .entries()
            .map(|entry| entry.name.to_string())
            .collect()
    }

    fn validate(&self) -> Result<(), BwsError> {
        if self.participants == 0 {
            return Err(BwsError::InvalidDesignParameters(
                ErrorInfo::new("no-participants", "simulation needs at least one participant")
                    .with_context("participants", "0"),
            ));
        }
        if !(self.noise_sd.is_finite() && self.noise_sd >= 0.0) {
            return Err(BwsError::InvalidDesignParameters(
                ErrorInfo::new("noise-sd", "noise standard deviation must be finite and non-negative")
                    .with_context("noise_sd", self.noise_sd.to_string()),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            participants: Self::default_participants(),
            noise_sd: Self::default_noise_sd(),
            methods: Self::default_methods(),
        }
    }
}

/// True preference value per item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LatentValues {
    values: IndexMap<Item, f64>,
}

impl LatentValues {
    /// Draws one standard-normal value per pool item.
    pub fn draw(pool: &ItemPool, rng: &mut RngHandle) -> Self {
        let values = pool
            .iter()
            .map(|item| (item.clone(), StandardNormal.sample(rng)))
            .collect();
        Self { values }
    }

    /// Explicit values, in the given order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Item>,
    {
        Self {
            values: pairs.into_iter().map(|(item, value)| (item.into(), value)).collect(),
        }
    }

    /// Value of `item`.
    pub fn get(&self, item: &str) -> Option<f64> {
        self.values.get(item).copied()
    }

    /// Items and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Item, f64)> + '_ {
        self.values.iter().map(|(item, value)| (item, *value))
    }

    fn require(&self, item: &Item) -> Result<f64, BwsError> {
        self.get(item.as_str()).ok_or_else(|| {
            BwsError::InvalidDesignParameters(
                ErrorInfo::new("latent-missing", "design item has no latent value")
                    .with_context("item", item.as_str()),
            )
        })
    }
}

/// How well one method recovered the latent ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodAccuracy {
    /// Method evaluated.
    pub method: MethodName,
    /// Items with a defined score.
    pub scored_items: usize,
    /// Pearson correlation with the latent values.
    pub pearson: Option<f64>,
    /// Spearman correlation with the latent values.
    pub spearman: Option<f64>,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Participants simulated.
    pub participants: usize,
    /// Trials answered by each participant.
    pub trials_per_participant: usize,
    /// Perception noise used.
    pub noise_sd: f64,
    /// Latent values the responses were drawn from.
    pub latent: LatentValues,
    /// Per-method agreement with the latent values, in request order.
    pub accuracy: Vec<MethodAccuracy>,
    /// Scores estimated from the pooled responses.
    pub scores: ScoreTable,
}

/// One participant's answers to every trial of `design`, in design order.
///
/// Each option is perceived as its latent value plus independent
/// `N(0, noise_sd)` noise. The highest perceived option is chosen best and
/// the lowest of the rest is chosen worst; ties go to the earlier option.
pub fn respond(
    design: &Design,
    latent: &LatentValues,
    noise_sd: f64,
    rng: &mut RngHandle,
) -> Result<Vec<ResponseTrial>, BwsError> {
    let noise = Normal::new(0.0, noise_sd).map_err(|err| {
        BwsError::InvalidDesignParameters(
            ErrorInfo::new("noise-sd", "invalid noise distribution")
                .with_context("noise_sd", noise_sd.to_string())
                .with_hint(err.to_string()),
        )
    })?;
    design
        .trials()
        .iter()
        .map(|trial| {
            let perceived = trial
                .options()
                .iter()
                .map(|item| Ok(latent.require(item)? + noise.sample(rng)))
                .collect::<Result<Vec<f64>, BwsError>>()?;
            let best = extreme(&perceived, None, |a, b| a > b);
            let worst = extreme(&perceived, Some(best), |a, b| a < b);
            let options = trial.options().to_vec();
            ResponseTrial::new(options.clone(), options[best].clone(), options[worst].clone())
        })
        .collect()
}

fn extreme(values: &[f64], skip: Option<usize>, better: impl Fn(f64, f64) -> bool) -> usize {
    let mut chosen: Option<usize> = None;
    for (idx, &value) in values.iter().enumerate() {
        if Some(idx) == skip {
            continue;
        }
        match chosen {
            Some(current) if !better(value, values[current]) => {}
            _ => chosen = Some(idx),
        }
    }
    chosen.unwrap_or_default()
}

/// Simulates `config.participants` respondents and scores their pooled answers.
///
/// Participant `p` draws from substream `p + 1` of `rng`, so each
/// participant's answers depend only on the master seed and `p`.
pub fn simulate(
    design: &Design,
    latent: &LatentValues,
    config: &SimulationConfig,
    scorer: &Scorer,
    rng: &mut RngHandle,
) -> Result<SimulationReport, BwsError> {
    config.validate()?;
    let entries = scorer.registry().resolve(&config.methods)?;

    let mut responses = Vec::with_capacity(config.participants * design.trials().len());
    for participant in 0..config.participants {
        let mut stream = rng.substream(participant as u64 + 1);
        responses.extend(respond(design, latent, config.noise_sd, &mut stream)?);
    }
    let scores = scorer.score(&responses, &config.methods)?;

    let truth: Vec<f64> = scores
        .items()
        .iter()
        .map(|item| latent.require(item))
        .collect::<Result<_, _>>()?;
    let accuracy = entries
        .iter()
        .map(|entry| {
            let column = scores.column(entry.name.as_str()).unwrap_or_default();
            let (estimated, expected) = finite_pairs(&column, &truth);
            MethodAccuracy {
                method: entry.name.clone(),
                scored_items: estimated.len(),
                pearson: pearson(&estimated, &expected),
                spearman: spearman(&estimated, &expected),
            }
        })
        .collect();

    tracing::debug!(
        participants = config.participants,
        responses = responses.len(),
        noise_sd = config.noise_sd,
        "simulation scored"
    );
    Ok(SimulationReport {
        participants: config.participants,
        trials_per_participant: design.trials().len(),
        noise_sd: config.noise_sd,
        latent: latent.clone(),
        accuracy,
        scores,
    })
}

/// Evenly spaced levels over `[-1, 1]`, assigned to pool items in random order.
pub fn spaced_latent(pool: &ItemPool, rng: &mut RngHandle) -> LatentValues {
    let steps = pool.len().saturating_sub(1).max(1) as f64;
    let mut levels: Vec<f64> = (0..pool.len())
        .map(|idx| -1.0 + 2.0 * idx as f64 / steps)
        .collect();
    levels.shuffle(rng);
    LatentValues::from_pairs(pool.iter().cloned().zip(levels))
}

/// How latent values are assigned when none are supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatentShape {
    /// Independent standard-normal draws.
    #[default]
    Normal,
    /// Evenly spaced levels in random order.
    Spaced,
}

impl LatentShape {
    /// Lowercase selector name.
    pub fn as_str(self) -> &'static str {
        match self {
            LatentShape::Normal => "normal",
            LatentShape::Spaced => "spaced",
        }
    }

    /// Draws values for every pool item.
    pub fn draw(self, pool: &ItemPool, rng: &mut RngHandle) -> LatentValues {
        match self {
            LatentShape::Normal => LatentValues::draw(pool, rng),
            LatentShape::Spaced => spaced_latent(pool, rng),
        }
    }
}

impl std::str::FromStr for LatentShape {
    type Err = BwsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "normal" => Ok(LatentShape::Normal),
            "spaced" => Ok(LatentShape::Spaced),
            other => Err(BwsError::InvalidDesignParameters(
                ErrorInfo::new("latent-shape", "unknown latent value shape")
                    .with_context("shape", other)
                    .with_hint("expected normal or spaced"),
            )),
        }
    }
}
