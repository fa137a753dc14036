//! Tools for working with the file system.

use crate::error::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Joins a base path and an extension without touching dots in the stem.
pub fn attach_extension(base: impl AsRef<Path>, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", base.as_ref().display(), extension))
}

/// Resolves a destination that does not collide with existing files.
///
/// `base.ext` wins if nothing is on disk; otherwise `base(0).ext`,
/// `base(1).ext`, … are probed in increasing order and the first absent name
/// is used.
pub fn resolve_collision(base: impl AsRef<Path>, extension: &str) -> PathBuf {
    let base = base.as_ref();

    let plain = attach_extension(base, extension);
    if !plain.exists() {
        return plain;
    }

    let mut counter = 0u32;
    loop {
        let candidate = PathBuf::from(format!("{}({counter}).{extension}", base.display()));
        if !candidate.exists() {
            return candidate;
        }

        counter += 1;
    }
}

/// Creates the parent directory of the given destination.
/// If the parent directory already exists, nothing is done.
pub fn create_parent_dir(destination: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = destination.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}

/// Generates a random filename fragment with the specified length.
pub fn random_filename(length: usize) -> String {
    let uuid = Uuid::new_v4().to_string().replace('-', "");

    uuid.chars().take(length).collect()
}

/// Removes a temporary file without propagating errors, to avoid
/// interrupting the execution flow.
///
/// Returns `true` if the file was deleted.
pub async fn remove_temp_file(file_path: impl AsRef<Path> + std::fmt::Debug) -> bool {
    let result = tokio::fs::remove_file(&file_path).await;

    #[cfg(feature = "tracing")]
    if let Err(ref e) = result {
        tracing::warn!("Failed to remove temporary file {:?}: {}", file_path, e);
    }

    result.is_ok()
}
