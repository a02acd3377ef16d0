pub mod generate;
pub mod methods;
pub mod score;
pub mod simulate;

use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;

use bws_core::provenance::RunProvenance;
use bws_exp::{manifest_path_for, write_manifest};

/// Writes `bytes` to `out`, or to stdout when no path is given.
pub fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Writes the manifest beside a file artefact; stdout output gets none.
pub fn write_manifest_beside(out: Option<&Path>, manifest: &RunProvenance) -> Result<(), Box<dyn Error>> {
    if let Some(path) = out {
        let manifest_path = manifest_path_for(path);
        write_manifest(&manifest_path, manifest)?;
        tracing::debug!(path = %manifest_path.display(), "wrote manifest");
    }
    Ok(())
}
