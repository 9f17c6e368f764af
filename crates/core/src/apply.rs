use crate::planner::{RenameCandidate, RenamePlan};
use crate::store::FileStore;
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("destination already exists: {}", .0.display())]
    TargetExists(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{source}; file left at {}", .temp.display())]
    Stranded {
        temp: PathBuf,
        source: Box<RenameError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOperation {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug)]
pub struct RenameFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    pub error: RenameError,
}

/// Outcome of one batch. Renames that succeeded before a failure stay applied.
#[derive(Debug, Default)]
pub struct RenameReport {
    pub succeeded: Vec<RenameOperation>,
    pub failed: Vec<RenameFailure>,
    pub unchanged: usize,
}

impl RenameReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renames every changed candidate in parallel. Each rename completes on its
/// own; there is no ordering between them and nothing is rolled back.
///
/// Files that are themselves the target of another candidate are first moved
/// to a temporary name, so chains (`a -> b`, `b -> c`) and swaps succeed
/// regardless of scheduling. Only files outside the batch can block a rename.
pub fn apply_plan<S: FileStore + ?Sized>(plan: &RenamePlan, store: &S) -> RenameReport {
    let candidates: Vec<&RenameCandidate> = plan.changed().collect();
    let unchanged = plan.candidates.len() - candidates.len();

    let sources = stage_occupied_sources(&candidates, store);
    let outcomes: Vec<Result<RenameOperation, RenameFailure>> = candidates
        .par_iter()
        .zip(sources.par_iter())
        .map(|(candidate, source)| rename_one(candidate, source, store))
        .collect();

    let mut report = RenameReport {
        unchanged,
        ..RenameReport::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(operation) => report.succeeded.push(operation),
            Err(failure) => report.failed.push(failure),
        }
    }
    report
}

/// Current location of every candidate after moving the ones another
/// candidate renames onto out of the way. A file that cannot be staged stays
/// where it is; whoever targets it then fails with `TargetExists`.
fn stage_occupied_sources<S: FileStore + ?Sized>(
    candidates: &[&RenameCandidate],
    store: &S,
) -> Vec<PathBuf> {
    let targets: HashSet<&Path> = candidates
        .iter()
        .map(|c| c.target_path.as_path())
        .collect();
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    candidates
        .par_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let original = &candidate.original_path;
            if !targets.contains(original.as_path()) {
                return original.clone();
            }
            let temp = temp_path_for(original, stamp, index);
            match store.rename(original, &temp) {
                Ok(()) => {
                    tracing::debug!(from = %original.display(), temp = %temp.display(), "staged");
                    temp
                }
                Err(error) => {
                    tracing::debug!(from = %original.display(), %error, "could not stage");
                    original.clone()
                }
            }
        })
        .collect()
}

fn rename_one<S: FileStore + ?Sized>(
    candidate: &RenameCandidate,
    source: &Path,
    store: &S,
) -> Result<RenameOperation, RenameFailure> {
    let from = &candidate.original_path;
    let to = &candidate.target_path;

    let mut result = if store.exists(to) {
        Err(RenameError::TargetExists(to.clone()))
    } else {
        store.rename(source, to).map_err(RenameError::from)
    };
    if source != from.as_path() {
        result = result.map_err(|error| restore_staged(source, from, store, error));
    }

    match result {
        Ok(()) => {
            tracing::info!(from = %from.display(), to = %to.display(), "renamed");
            Ok(RenameOperation {
                from: from.clone(),
                to: to.clone(),
            })
        }
        Err(error) => {
            tracing::debug!(from = %from.display(), to = %to.display(), %error, "rename failed");
            Err(RenameFailure {
                from: from.clone(),
                to: to.clone(),
                error,
            })
        }
    }
}

/// Puts a staged file back under its original name after its final rename
/// failed. If the original name has been taken meanwhile, the file stays at
/// the temporary path and the error says where.
fn restore_staged<S: FileStore + ?Sized>(
    temp: &Path,
    original: &Path,
    store: &S,
    error: RenameError,
) -> RenameError {
    if !store.exists(original) && store.rename(temp, original).is_ok() {
        return error;
    }
    RenameError::Stranded {
        temp: temp.to_path_buf(),
        source: Box::new(error),
    }
}

fn temp_path_for(original: &Path, stamp: u128, index: usize) -> PathBuf {
    let parent = original.parent().unwrap_or_else(|| Path::new("."));
    let mut name = OsString::from(format!(".bulk_renamer_tmp_{stamp}_{index}_"));
    name.push(original.file_name().unwrap_or_else(|| OsStr::new("file")));
    parent.join(name)
}
