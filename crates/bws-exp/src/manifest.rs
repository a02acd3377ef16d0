//! JSON manifests written next to every CLI artefact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bws_core::errors::BwsError;
use bws_core::provenance::{RunProvenance, SchemaVersion};
use chrono::Utc;

use crate::hash::hash_bytes;
use crate::serde::{from_json_slice, to_canonical_json_pretty};

/// Schema of the manifest layout.
pub const MANIFEST_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Builder for a [`RunProvenance`] record.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    provenance: RunProvenance,
}

impl ManifestBuilder {
    /// Starts a manifest for `operation` (the subcommand name).
    pub fn new(operation: &str) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert("bws".to_string(), env!("CARGO_PKG_VERSION").to_string());
        Self {
            provenance: RunProvenance {
                schema: MANIFEST_SCHEMA,
                operation: operation.to_string(),
                tool_versions,
                ..RunProvenance::default()
            },
        }
    }

    /// Records the hash of everything the run read.
    pub fn input_hash(mut self, hash: impl Into<String>) -> Self {
        self.provenance.input_hash = hash.into();
        self
    }

    /// Records the seed the run was started from.
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.provenance.seed = seed;
        self
    }

    /// Records one run parameter.
    pub fn parameter(mut self, key: &str, value: impl ToString) -> Self {
        self.provenance
            .parameters
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Stamps the output hash and creation time.
    pub fn finish(mut self, output: &[u8]) -> RunProvenance {
        self.provenance.output_hash = hash_bytes(output);
        self.provenance.created_at = Utc::now().to_rfc3339();
        self.provenance
    }
}

/// Manifest path for an artefact: `<artefact>.manifest.json`.
pub fn manifest_path_for(artefact: &Path) -> PathBuf {
    let mut name = artefact
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".manifest.json");
    artefact.with_file_name(name)
}

/// Writes a manifest as pretty, key-sorted JSON.
pub fn write_manifest(path: &Path, manifest: &RunProvenance) -> Result<(), BwsError> {
    let text = to_canonical_json_pretty(manifest)?;
    fs::write(path, text + "\n").map_err(|err| BwsError::io("manifest-write", path.display(), err))
}

/// Reads a manifest back.
pub fn read_manifest(path: &Path) -> Result<RunProvenance, BwsError> {
    let bytes = fs::read(path).map_err(|err| BwsError::io("manifest-read", path.display(), err))?;
    from_json_slice(&bytes)
}
