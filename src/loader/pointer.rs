//! Run identifiers and the production run pointer file

use std::fmt;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::config::ReadinessConfig;
use crate::error::{ClassrError, Resource, Result};

/// Prefix added by form-encoded clients (`curl -d run_id=...`)
pub const RUN_ID_PREFIX: &str = "run_id=";

/// Identifier of a trained model run
///
/// Always a single path component, so it can be joined into the artifact
/// layout safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Parse a run id, stripping an optional `run_id=` prefix and surrounding whitespace
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let id = trimmed.strip_prefix(RUN_ID_PREFIX).unwrap_or(trimmed).trim();

        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.chars().any(char::is_control);
        if !valid {
            return Err(ClassrError::InvalidRunId(raw.to_string()));
        }

        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the production run id from the pointer file
pub fn read_pointer(path: &Path) -> Result<RunId> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ClassrError::not_found(Resource::RunPointer, path),
        _ => ClassrError::Io(e),
    })?;
    RunId::parse(&content)
}

/// Persist `run_id` as the production run
///
/// The content is written to a sibling temp file and renamed into place, so
/// readers never observe a partially written id.
pub fn write_pointer(path: &Path, run_id: &RunId) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&tmp, run_id.as_str())?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Wait until the pointer file exists, backing off between polls
pub async fn wait_for_pointer(path: &Path, policy: &ReadinessConfig) -> Result<()> {
    let start = Instant::now();
    let mut delay = policy.initial_delay();
    let mut announced = false;

    loop {
        if tokio::fs::try_exists(path).await? {
            if announced {
                tracing::info!(
                    "Run pointer {} available after {:?}",
                    path.display(),
                    start.elapsed()
                );
            }
            return Ok(());
        }

        if !announced {
            tracing::info!("Waiting for run pointer {}", path.display());
            announced = true;
        }

        if let Some(timeout) = policy.timeout() {
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(ClassrError::WaitTimeout {
                    resource: Resource::RunPointer,
                    path: path.to_path_buf(),
                    waited,
                });
            }
            delay = delay.min(timeout - waited);
        }

        tracing::debug!("Run pointer not present, retrying in {:?}", delay);
        tokio::time::sleep(delay).await;
        delay = policy.next_delay(delay);
    }
}
