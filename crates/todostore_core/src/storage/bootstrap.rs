//! First-run copy of the bundled seed database.
//!
//! The writable database is created exactly once by streaming the seed into
//! place. After that, presence of the file is the only thing checked.

use crate::error::AppError;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// The pre-populated database shipped inside the binary.
pub static BUNDLED_SEED: &[u8] = include_bytes!("../../assets/todo.db");

const SEED_ENV_VAR: &str = "TODOSTORE_SEED_PATH";

/// Where the seed bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    Bundled,
    File(PathBuf),
}

impl Seed {
    /// `TODOSTORE_SEED_PATH` when set, otherwise the bundled seed.
    pub fn from_env() -> Seed {
        match std::env::var(SEED_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Seed::File(PathBuf::from(path)),
            _ => Seed::Bundled,
        }
    }

    fn open(&self) -> Result<Box<dyn Read>, AppError> {
        match self {
            Seed::Bundled => Ok(Box::new(BUNDLED_SEED)),
            Seed::File(path) => {
                let file = File::open(path).map_err(|err| {
                    AppError::store_unavailable(format!(
                        "seed database {} cannot be opened: {}",
                        path.display(),
                        err
                    ))
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Copied { bytes: u64 },
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    seed: Seed,
    target: PathBuf,
}

impl Bootstrap {
    pub fn new(seed: Seed, target: impl Into<PathBuf>) -> Self {
        Self {
            seed,
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Copies the seed to the target path unless a file is already there.
    pub fn ensure_database(&self) -> Result<BootstrapOutcome, AppError> {
        if self.target.exists() {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let bytes = self.copy_seed()?;
        Ok(BootstrapOutcome::Copied { bytes })
    }

    /// Deletes the writable database and copies the seed again.
    ///
    /// All stored tasks are lost.
    pub fn reset(&self) -> Result<u64, AppError> {
        for path in self.database_files() {
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed database file"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(AppError::store_unavailable(format!(
                        "{} cannot be removed: {}",
                        path.display(),
                        err
                    )));
                }
            }
        }

        let bytes = self.copy_seed()?;
        tracing::warn!(path = %self.target.display(), "database reset to seed");
        Ok(bytes)
    }

    fn copy_seed(&self) -> Result<u64, AppError> {
        let mut reader = self.seed.open()?;

        if let Some(parent) = self.target.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::store_unavailable(format!("{}: {}", parent.display(), err))
            })?;
        }

        let partial = sibling(&self.target, ".part");
        let copied = stream_into(reader.as_mut(), &partial)
            .and_then(|bytes| fs::rename(&partial, &self.target).map(|_| bytes));

        match copied {
            Ok(bytes) => {
                tracing::debug!(
                    path = %self.target.display(),
                    bytes,
                    "database copied from seed"
                );
                Ok(bytes)
            }
            Err(err) => {
                fs::remove_file(&partial).ok();
                tracing::error!(path = %self.target.display(), error = %err, "seed copy failed");
                Err(AppError::store_unavailable(format!(
                    "copying seed to {} failed: {}",
                    self.target.display(),
                    err
                )))
            }
        }
    }

    fn database_files(&self) -> [PathBuf; 4] {
        [
            self.target.clone(),
            sibling(&self.target, "-journal"),
            sibling(&self.target, "-wal"),
            sibling(&self.target, "-shm"),
        ]
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn stream_into(reader: &mut dyn Read, path: &Path) -> io::Result<u64> {
    let mut file = File::create(path)?;
    let bytes = io::copy(reader, &mut file)?;
    file.flush()?;
    file.sync_all()?;
    Ok(bytes)
}
