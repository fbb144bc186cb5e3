//! Atomic snapshot writes
//!
//! Snapshots are written to a sibling `.tmp` file, synced, then renamed over
//! the final path, so a reader sees either the previous snapshot or the new
//! one and never a torn file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Error, Debug)]
pub enum AtomicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Atomically replace `path` with the lines produced by `write_fn`
///
/// ```ignore
/// atomic_write_with("data/conference.jsonl", |file| {
///     writeln!(file, "{}", line)?;
///     Ok(())
/// })?;
/// ```
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> AtomicResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(&temp_path)?;
    write_fn(&mut file)?;
    file.flush()?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Remove a `.tmp` sibling left behind by an interrupted snapshot write
///
/// Returns whether a leftover file was found.
pub fn cleanup_temp_file<P: AsRef<Path>>(path: P) -> AtomicResult<bool> {
    let temp_path = path.as_ref().with_extension("tmp");
    if !temp_path.exists() {
        return Ok(false);
    }
    fs::remove_file(&temp_path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conference.jsonl");
        fs::write(&path, "stale\n").unwrap();

        atomic_write_with(&path, |file| {
            for id in 1..=2 {
                writeln!(file, "{{\"version\":{}}}", id)?;
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\"version\":1}\n{\"version\":2}\n"
        );
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conference.jsonl");
        fs::write(&path, "kept\n").unwrap();

        let result = atomic_write_with(&path, |_| Err(io::Error::new(io::ErrorKind::Other, "disk full")));

        assert!(matches!(result, Err(AtomicError::Io(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn test_snapshot_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("conference.jsonl");

        atomic_write_with(&path, |file| writeln!(file, "{{}}")).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_cleanup_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conference.jsonl");
        fs::write(path.with_extension("tmp"), "partial").unwrap();

        assert!(cleanup_temp_file(&path).unwrap());
        assert!(!path.with_extension("tmp").exists());
        assert!(!cleanup_temp_file(&path).unwrap());
    }
}
