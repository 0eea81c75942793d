//! Filesystem persistence for generated artifacts.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;
use crate::packaging::GeneratedArtifacts;

/// Write the four artifacts into `output_dir`, creating it as needed.
/// Returns the paths written, in artifact order.
pub async fn write_artifacts(
    output_dir: &Path,
    artifacts: &GeneratedArtifacts,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).await?;

    let files = [
        (
            GeneratedArtifacts::MOCK_SERVER_FILE.to_string(),
            &artifacts.mock_server,
        ),
        (artifacts.collection_file_name.clone(), &artifacts.collection),
        (
            GeneratedArtifacts::MANIFEST_FILE.to_string(),
            &artifacts.manifest,
        ),
        (
            GeneratedArtifacts::INSTRUCTIONS_FILE.to_string(),
            &artifacts.instructions,
        ),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = output_dir.join(name);
        fs::write(&path, content).await?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
