//! Writing generated artifacts to disk.
//!
//! Existing files are left alone unless [`WriteOptions::force`] is set; a
//! skipped file is reported as a [`WriteConflict`], not an error. Each file is
//! staged in a temporary file next to its destination and then persisted over
//! it, so an interrupted run never leaves a half-written artifact behind.

use crate::output::ArtifactSet;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Options for [`write_artifacts`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Overwrite files that already exist.
    pub force: bool,
}

/// A file that was not written because it already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteConflict {
    pub path: PathBuf,
}

/// Outcome of one [`write_artifacts`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub conflicts: Vec<WriteConflict>,
}

impl WriteReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: WriteReport) {
        self.written.extend(other.written);
        self.conflicts.extend(other.conflicts);
    }
}

/// Error writing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> WriteError {
    move |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write every artifact into `dir`, creating it if needed.
pub fn write_artifacts(
    dir: &Path,
    artifacts: &ArtifactSet,
    options: &WriteOptions,
) -> Result<WriteReport, WriteError> {
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;

    let mut report = WriteReport::default();
    for (name, artifact) in artifacts {
        let path = dir.join(name);
        if path.exists() && !options.force {
            tracing::warn!(
                path = %path.display(),
                "file exists, skipping (use --force to overwrite)"
            );
            report.conflicts.push(WriteConflict { path });
            continue;
        }

        let mut staged = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        staged
            .write_all(artifact.contents.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(io_error(&path))?;
        staged.persist(&path).map_err(|source| WriteError::Persist {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "generated");
        report.written.push(path);
    }
    Ok(report)
}
