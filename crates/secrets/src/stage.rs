//! Placement of secret files into configuration targets

use crate::{SecretFile, StageError, StageMode};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// What staging did to the configuration target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    /// Target was (re)written with the secret bytes
    Written,
    /// Secret bytes were appended to the target
    Appended,
    /// Target already held the secret bytes, nothing was written
    Unchanged,
}

/// Outcome of staging a single secret file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Configuration target that was staged
    pub target: PathBuf,
    /// Number of secret bytes placed (or confirmed present)
    pub bytes: usize,
    /// What was done to the target
    pub action: StageAction,
}

/// Stage a single secret file into its configuration target.
///
/// The source is consumed as an opaque blob. For [`StageMode::Overwrite`] the
/// target is rewritten unless it already holds identical bytes. For
/// [`StageMode::Append`] the bytes are appended unless the target already
/// ends with them, so restarting the container does not duplicate the block.
///
/// # Errors
///
/// Returns [`StageError::SourceMissing`] or [`StageError::SourceUnreadable`]
/// if the injected file cannot be consumed, and
/// [`StageError::TargetUnwritable`] if the configuration location rejects the
/// write.
pub async fn stage(spec: &SecretFile) -> Result<StageReport, StageError> {
    let secret = read_source(&spec.source).await?;

    if let Some(parent) = spec.target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StageError::TargetUnwritable {
                path: spec.target.clone(),
                source,
            })?;
    }

    let existing = match fs::read(&spec.target).await {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(StageError::TargetUnwritable {
                path: spec.target.clone(),
                source,
            });
        }
    };

    let action = match spec.mode {
        StageMode::Overwrite => {
            if existing.as_deref() == Some(secret.as_slice()) {
                StageAction::Unchanged
            } else {
                fs::write(&spec.target, &secret).await.map_err(|source| {
                    StageError::TargetUnwritable {
                        path: spec.target.clone(),
                        source,
                    }
                })?;
                StageAction::Written
            }
        }
        StageMode::Append => {
            let already_present = existing
                .as_deref()
                .is_some_and(|bytes| bytes.ends_with(&secret));
            if already_present {
                StageAction::Unchanged
            } else {
                append_to(&spec.target, &secret).await?;
                StageAction::Appended
            }
        }
    };

    tracing::info!(
        source = %spec.source.display(),
        target = %spec.target.display(),
        bytes = secret.len(),
        action = ?action,
        "Staged secret file"
    );

    Ok(StageReport {
        target: spec.target.clone(),
        bytes: secret.len(),
        action,
    })
}

/// Stage a list of secret files in order, aborting on the first failure.
///
/// Ordering is part of the contract: a later target may live inside a
/// directory an earlier step created.
///
/// # Errors
///
/// Returns the first staging error; later specs are not attempted.
pub async fn stage_all(specs: &[SecretFile]) -> Result<Vec<StageReport>, StageError> {
    let mut reports = Vec::with_capacity(specs.len());
    for spec in specs {
        reports.push(stage(spec).await?);
    }
    Ok(reports)
}

async fn read_source(path: &Path) -> Result<Vec<u8>, StageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StageError::SourceMissing {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(StageError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn append_to(path: &Path, bytes: &[u8]) -> Result<(), StageError> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| StageError::TargetUnwritable {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(bytes)
        .await
        .map_err(|source| StageError::TargetUnwritable {
            path: path.to_path_buf(),
            source,
        })?;
    file.flush()
        .await
        .map_err(|source| StageError::TargetUnwritable {
            path: path.to_path_buf(),
            source,
        })
}
