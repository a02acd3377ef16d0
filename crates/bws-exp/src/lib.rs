//! Simulation and bookkeeping around the design and scoring engines.
//!
//! [`simulate`] runs virtual participants with known latent values through a
//! design and reports how well each scoring method recovers those values.
//! The manifest helpers record what produced every artefact the CLI writes.

mod correlation;
mod hash;
mod manifest;
mod serde;
mod simulate;

pub use correlation::{finite_pairs, pearson, rank, spearman};
pub use hash::{hash_bytes, hash_files, stable_hash_string};
pub use manifest::{manifest_path_for, read_manifest, write_manifest, ManifestBuilder, MANIFEST_SCHEMA};
pub use serde::{from_json_slice, to_canonical_json_bytes, to_canonical_json_pretty};
pub use simulate::{
    respond, simulate, spaced_latent, LatentShape, LatentValues, MethodAccuracy, SimulationConfig,
    SimulationReport, LATENT_SUBSTREAM,
};
