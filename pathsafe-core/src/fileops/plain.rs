// File: pathsafe-core/src/fileops/plain.rs
//! Plain, unguarded file primitives behind the `FileOps` and `AsyncFileOps` seams.
//!
//! The safe operations only ever touch the filesystem through these traits,
//! which lets tests substitute doubles that fail on demand.
//!
//! License: MIT OR APACHE 2.0

use async_trait::async_trait;
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// Name prefix of every backup file created in the temp directory.
pub const BACKUP_PREFIX: &str = "pathsafe-backup-";

/// Name prefix of the hidden staging file an async copy writes beside its destination.
pub const STAGING_PREFIX: &str = ".pathsafe-staging-";

fn destination_exists(dst: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("destination '{}' already exists", dst.display()),
    )
}

/// Blocking file primitives.
pub trait FileOps: Send + Sync {
    /// Whether `path` exists. An error means existence could not be determined.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Copies `src` to `dst`. Fails with `AlreadyExists` if `dst` exists and `overwrite` is false.
    fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()>;

    /// Moves `src` to `dst`. Fails with `AlreadyExists` if `dst` exists and `overwrite` is false.
    fn move_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()>;

    fn append_bytes(&self, path: &Path, bytes: &[u8], create_if_missing: bool) -> io::Result<()>;

    /// Creates an empty, uniquely named file that outlives the call.
    fn create_temp_file(&self) -> io::Result<PathBuf>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;
}

/// `FileOps` over `std::fs`, with temp files in the OS temp directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && dst.try_exists()? {
            return Err(destination_exists(dst));
        }
        fs::copy(src, dst)?;
        Ok(())
    }

    fn move_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && dst.try_exists()? {
            return Err(destination_exists(dst));
        }
        match fs::rename(src, dst) {
            Ok(()) => Ok(()),
            Err(e) if src.is_file() => {
                // Most likely a cross-device move.
                debug!(
                    "rename '{}' -> '{}' failed ({}); falling back to copy and remove.",
                    src.display(),
                    dst.display(),
                    e
                );
                fs::copy(src, dst)?;
                fs::remove_file(src)
            }
            Err(e) => Err(e),
        }
    }

    fn append_bytes(&self, path: &Path, bytes: &[u8], create_if_missing: bool) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(create_if_missing)
            .open(path)?;
        file.write_all(bytes)?;
        file.flush()
    }

    fn create_temp_file(&self) -> io::Result<PathBuf> {
        let temp = tempfile::Builder::new().prefix(BACKUP_PREFIX).tempfile()?;
        temp.into_temp_path().keep().map_err(|e| e.error)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Non-blocking file primitives for the cancellable safe operations.
#[async_trait]
pub trait AsyncFileOps: Send + Sync {
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    async fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()>;

    async fn move_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()>;

    async fn append_bytes(&self, path: &Path, bytes: &[u8], create_if_missing: bool) -> io::Result<()>;

    async fn create_temp_file(&self) -> io::Result<PathBuf>;

    async fn delete_file(&self, path: &Path) -> io::Result<()>;
}

fn staging_dir(dst: &Path) -> &Path {
    dst.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Copies `src` into a staging file beside `dst` on the blocking pool.
///
/// If the caller is dropped before the copy finishes, the staging file is
/// deleted when the blocking task hands it back; `dst` is never written.
async fn stage_copy(src: &Path, dst: &Path) -> io::Result<NamedTempFile> {
    let src = src.to_path_buf();
    let dir = staging_dir(dst).to_path_buf();
    tokio::task::spawn_blocking(move || {
        let staged = tempfile::Builder::new().prefix(STAGING_PREFIX).tempfile_in(&dir)?;
        fs::copy(&src, staged.path())?;
        Ok(staged)
    })
    .await
    .map_err(io::Error::other)?
}

/// Renames a finished staging file onto `dst`.
fn persist_staged(staged: NamedTempFile, dst: &Path, overwrite: bool) -> io::Result<()> {
    let persisted = if overwrite {
        staged.persist(dst)
    } else {
        staged.persist_noclobber(dst)
    };
    persisted.map(drop).map_err(|e| e.error)
}

/// `AsyncFileOps` over `tokio::fs`.
///
/// Copies and moves never leave `dst` half-written when their future is
/// dropped: data is staged beside `dst` and renamed into place without an
/// intervening await, and a move removes its source in the same step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileOps;

#[async_trait]
impl AsyncFileOps for TokioFileOps {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && self.exists(dst).await? {
            return Err(destination_exists(dst));
        }
        let staged = stage_copy(src, dst).await?;
        persist_staged(staged, dst, overwrite)
    }

    async fn move_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && self.exists(dst).await? {
            return Err(destination_exists(dst));
        }
        // Inline, so a dropped future cannot abandon the rename halfway.
        match fs::rename(src, dst) {
            Ok(()) => Ok(()),
            Err(e) if src.is_file() => {
                debug!(
                    "rename '{}' -> '{}' failed ({}); falling back to staged copy and remove.",
                    src.display(),
                    dst.display(),
                    e
                );
                let staged = stage_copy(src, dst).await?;
                persist_staged(staged, dst, overwrite)?;
                fs::remove_file(src)
            }
            Err(e) => Err(e),
        }
    }

    async fn append_bytes(&self, path: &Path, bytes: &[u8], create_if_missing: bool) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(create_if_missing)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await
    }

    async fn create_temp_file(&self) -> io::Result<PathBuf> {
        tokio::task::spawn_blocking(|| StdFileOps.create_temp_file())
            .await
            .map_err(io::Error::other)?
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_std_copy_respects_overwrite() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        let err = StdFileOps.copy_file(&src, &dst, false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");

        StdFileOps.copy_file(&src, &dst, true).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn test_std_move_and_append() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        StdFileOps.append_bytes(&src, b"one", true).unwrap();
        StdFileOps.append_bytes(&src, b"two", false).unwrap();
        StdFileOps.move_file(&src, &dst, false).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "onetwo");

        let missing = dir.path().join("missing.txt");
        let err = StdFileOps.append_bytes(&missing, b"x", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_std_temp_files_persist_until_deleted() {
        let path = StdFileOps.create_temp_file().unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(BACKUP_PREFIX));
        StdFileOps.delete_file(&path).unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_tokio_ops_mirror_std_ops() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        TokioFileOps.append_bytes(&src, b"hello", true).await.unwrap();
        TokioFileOps.copy_file(&src, &dst, false).await.unwrap();
        assert!(TokioFileOps.exists(&dst).await.unwrap());

        let err = TokioFileOps.move_file(&src, &dst, false).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        TokioFileOps.move_file(&src, &dst, true).await.unwrap();
        assert!(!TokioFileOps.exists(&src).await.unwrap());

        let temp = TokioFileOps.create_temp_file().await.unwrap();
        TokioFileOps.delete_file(&temp).await.unwrap();
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn test_tokio_copy_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "payload").unwrap();
        fs::write(&dst, "old").unwrap();

        TokioFileOps.copy_file(&src, &dst, true).await.unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.starts_with(STAGING_PREFIX)), "{names:?}");
    }

    #[tokio::test]
    async fn test_dropped_tokio_copy_never_touches_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, vec![7u8; 8 * 1024 * 1024]).unwrap();
        fs::write(&dst, "old").unwrap();

        let copy = TokioFileOps.copy_file(&src, &dst, true);
        let _ = tokio::time::timeout(std::time::Duration::from_micros(1), copy).await;
        // Let the orphaned blocking copy finish and clean up after itself.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        let contents = fs::read(&dst).unwrap();
        assert!(contents == b"old" || contents.len() == 8 * 1024 * 1024);
    }

    #[test]
    fn test_std_exists_reports_missing_paths() {
        let dir = tempdir().unwrap();
        assert!(StdFileOps.exists(dir.path()).unwrap());
        assert!(!StdFileOps.exists(&dir.path().join("nope")).unwrap());
    }
}
