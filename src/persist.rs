//! Crash-safe file replacement
//!
//! Outputs are first written next to their final location, then renamed over
//! it, so an interrupted run leaves either the previous or the new version of
//! a file on disk, never a truncated one.

use crate::Result;
use anyhow::Context;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Temporary sibling of `path` used while a new version is being written
pub fn temp_path(path: &Path) -> PathBuf {
    let mut temp = OsString::from(path.as_os_str());
    temp.push(".tmp");
    temp.into()
}

/// Move a fully written temporary file over its final location
pub async fn commit(path: &Path) -> Result<()> {
    fs::rename(temp_path(path), path)
        .await
        .with_context(|| format!("replacing {}", path.display()))
}

/// Replace the contents of `path` in one step
pub async fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let temp = temp_path(path);
    fs::write(&temp, contents)
        .await
        .with_context(|| format!("writing {}", temp.display()))?;
    commit(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_keeps_the_extension() {
        assert_eq!(
            temp_path(Path::new("dir/cache.json")),
            PathBuf::from("dir/cache.json.tmp")
        );
    }

    #[tokio::test]
    async fn atomic_write_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old").unwrap();

        write_atomically(&path, b"new").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_path(&path).exists());
    }
}
