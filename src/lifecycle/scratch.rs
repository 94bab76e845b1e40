use crate::foundation::error::CutawayResult;
use std::path::{Path, PathBuf};

/// A private temporary directory owned by exactly one layer.
///
/// Released explicitly with [`ScratchArea::release`]; if it is dropped instead (early return,
/// unwinding) the directory is still removed on a best-effort basis.
#[derive(Debug)]
pub struct ScratchArea {
    label: String,
    path: PathBuf,
    dir: Option<tempfile::TempDir>,
}

impl ScratchArea {
    /// Create a fresh directory under `root`, or under the system temp dir when `root` is unset.
    pub fn acquire(root: Option<&Path>, label: &str) -> CutawayResult<Self> {
        use anyhow::Context as _;

        let mut builder = tempfile::Builder::new();
        builder.prefix("cutaway-layer-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).with_context(|| {
                    format!("failed to create scratch root '{}'", root.display())
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .with_context(|| format!("failed to create scratch area for {label}"))?;

        let path = dir.path().to_path_buf();
        tracing::debug!(label, path = %path.display(), "scratch area acquired");
        Ok(Self {
            label: label.to_owned(),
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Delete the directory and everything in it.
    pub fn release(mut self) -> std::io::Result<()> {
        match self.dir.take() {
            Some(dir) => {
                let out = dir.close();
                if out.is_ok() {
                    tracing::debug!(label = %self.label, "scratch area released");
                }
                out
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScratchArea {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take()
            && let Err(e) = dir.close()
        {
            tracing::warn!(label = %self.label, error = %e, "failed to remove scratch area on drop");
        }
    }
}

/// Outcome of releasing a batch of scratch areas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub released: usize,
    pub failed: usize,
}

impl ReleaseReport {
    pub fn merge(&mut self, other: ReleaseReport) {
        self.released += other.released;
        self.failed += other.failed;
    }

    /// Record a single release outcome, logging failures.
    pub fn record(&mut self, label: &str, outcome: std::io::Result<()>) {
        match outcome {
            Ok(()) => self.released += 1,
            Err(e) => {
                tracing::warn!(label, error = %e, "failed to release scratch area");
                self.failed += 1;
            }
        }
    }
}

/// Release every area independently; one failure never stops the others.
pub fn release_all(areas: impl IntoIterator<Item = ScratchArea>) -> ReleaseReport {
    let mut report = ReleaseReport::default();
    for area in areas {
        let label = area.label().to_owned();
        report.record(&label, area.release());
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/scratch.rs"]
mod tests;
