//! Random identifier selection from a line-oriented file.
//!
//! The file is read again on every pick so edits made while the daemon runs are
//! picked up by the next cycle.

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read sample file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sample file {} contains no identifiers", path.display())]
    Empty { path: PathBuf },
}

/// Non-blank, trimmed lines of `contents`, in file order.
pub fn sample_pool(contents: &str) -> Vec<&str> {
    contents.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Uniform pick from the pool of `contents`.
pub fn choose_line<'a, R: Rng + ?Sized>(contents: &'a str, rng: &mut R) -> Option<&'a str> {
    sample_pool(contents).choose(rng).copied()
}

/// Read `path` and return one of its identifiers at random.
pub async fn pick_sample(path: impl AsRef<Path>) -> Result<String, SampleError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SampleError::Read { path: path.to_path_buf(), source })?;

    choose_line(&contents, &mut rand::thread_rng())
        .map(str::to_owned)
        .ok_or_else(|| SampleError::Empty { path: path.to_path_buf() })
}
