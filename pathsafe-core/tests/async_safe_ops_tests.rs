// pathsafe-core/tests/async_safe_ops_tests.rs
use anyhow::Result;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;
use tokio::fs;

use pathsafe_core::{
    safe_append_bytes_async, safe_copy_async, safe_move_async, with_backup_async,
    AsyncFileOps, AsyncSafeFileManager, CancellationToken, PathsafeError, SafeOptions,
    TextEncoding, TokioFileOps,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AppendBehaviour {
    #[default]
    Succeed,
    Fail,
    /// Writes one byte, cancels the token it was given and never finishes.
    CancelMidway,
    /// Writes one byte and never finishes.
    Hang,
}

#[derive(Default)]
struct FlakyAsyncOps {
    append: AppendBehaviour,
    fail_temp: bool,
    fail_exists: bool,
    /// The first move lands on disk, cancels `cancel` and never finishes.
    hang_after_move: bool,
    cancel: Option<CancellationToken>,
    move_calls: AtomicUsize,
    append_calls: AtomicUsize,
    backups: Mutex<Vec<PathBuf>>,
}

impl FlakyAsyncOps {
    fn backups(&self) -> Vec<PathBuf> {
        self.backups.lock().unwrap().clone()
    }
}

#[async_trait]
impl AsyncFileOps for FlakyAsyncOps {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        if self.fail_exists {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stat denied"));
        }
        TokioFileOps.exists(path).await
    }

    async fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        TokioFileOps.copy_file(src, dst, overwrite).await
    }

    async fn move_file(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        let first = self.move_calls.fetch_add(1, Ordering::SeqCst) == 0;
        TokioFileOps.move_file(src, dst, overwrite).await?;
        if self.hang_after_move && first {
            if let Some(cancel) = &self.cancel {
                cancel.cancel();
            }
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn append_bytes(&self, path: &Path, bytes: &[u8], create_if_missing: bool) -> io::Result<()> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        match self.append {
            AppendBehaviour::Succeed => TokioFileOps.append_bytes(path, bytes, create_if_missing).await,
            AppendBehaviour::Fail => {
                TokioFileOps.append_bytes(path, &bytes[..1], create_if_missing).await?;
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            AppendBehaviour::CancelMidway | AppendBehaviour::Hang => {
                TokioFileOps.append_bytes(path, &bytes[..1], create_if_missing).await?;
                if let Some(cancel) = &self.cancel {
                    cancel.cancel();
                }
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn create_temp_file(&self) -> io::Result<PathBuf> {
        if self.fail_temp {
            return Err(io::Error::new(io::ErrorKind::Other, "no temp space"));
        }
        let path = TokioFileOps.create_temp_file().await?;
        self.backups.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        TokioFileOps.delete_file(path).await
    }
}

#[tokio::test]
async fn test_async_append_commits() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"a").await?;

    let cancel = CancellationToken::new();
    safe_append_bytes_async(&target, b"b", false, &cancel).await?;
    AsyncSafeFileManager::new()
        .append_string(&target, "c", false, TextEncoding::Utf8, &cancel)
        .await?;
    assert_eq!(fs::read(&target).await?, b"abc");
    Ok(())
}

#[tokio::test]
async fn test_async_failure_restores_target() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"original").await?;

    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            append: AppendBehaviour::Fail,
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager
        .append_bytes(&target, b"xyz", false, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PathsafeError::MutationFailed { .. }));
    assert_eq!(fs::read(&target).await?, b"original");
    assert!(manager.ops().backups().iter().all(|b| !b.exists()));
    Ok(())
}

#[tokio::test]
async fn test_async_cancellation_rolls_back() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"original").await?;

    let cancel = CancellationToken::new();
    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            append: AppendBehaviour::CancelMidway,
            cancel: Some(cancel.clone()),
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager
        .append_bytes(&target, b"xyz", false, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PathsafeError::Cancelled { .. }));
    assert_eq!(manager.ops().append_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fs::read(&target).await?, b"original");
    assert!(manager.ops().backups().iter().all(|b| !b.exists()));
    Ok(())
}

#[tokio::test]
async fn test_async_cancellation_removes_new_target() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("fresh.txt");

    let cancel = CancellationToken::new();
    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            append: AppendBehaviour::CancelMidway,
            cancel: Some(cancel.clone()),
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager
        .append_bytes(&target, b"xyz", true, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PathsafeError::Cancelled { .. }));
    assert!(!target.exists());
    Ok(())
}

#[tokio::test]
async fn test_async_backup_unavailable_skips_mutation() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"keep").await?;

    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            fail_temp: true,
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager
        .append_bytes(&target, b"more", false, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PathsafeError::BackupUnavailable { .. }));
    assert_eq!(manager.ops().append_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fs::read(&target).await?, b"keep");
    Ok(())
}

#[tokio::test]
async fn test_dropped_call_keeps_backup_on_disk() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"original").await?;

    let ops = FlakyAsyncOps {
        append: AppendBehaviour::Hang,
        ..Default::default()
    };
    let cancel = CancellationToken::new();
    let call = with_backup_async(
        &ops,
        &target,
        SafeOptions::default(),
        &cancel,
        ops.append_bytes(&target, b"xyz", false),
    );
    let timed_out = tokio::time::timeout(Duration::from_millis(100), call).await;
    assert!(timed_out.is_err());

    let backups = ops.backups();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read(&backups[0]).await?, b"original");
    fs::remove_file(&backups[0]).await?;
    Ok(())
}

#[tokio::test]
async fn test_async_panic_is_rolled_back() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"original").await?;

    let mutation = async {
        fs::write(&target, b"garbage").await?;
        if target.exists() {
            panic!("async boom");
        }
        Ok::<(), io::Error>(())
    };
    let err = with_backup_async(
        &TokioFileOps,
        &target,
        SafeOptions::default(),
        &CancellationToken::new(),
        mutation,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("async boom"));
    assert_eq!(fs::read(&target).await?, b"original");
    Ok(())
}

#[tokio::test]
async fn test_async_copy_and_move() -> Result<()> {
    let dir = tempdir()?;
    let src = dir.path().join("src.bin");
    let dst = dir.path().join("dst.bin");
    let moved = dir.path().join("moved.bin");
    fs::write(&src, b"payload").await?;
    fs::write(&dst, b"old").await?;

    let cancel = CancellationToken::new();
    let err = safe_copy_async(&src, &dst, false, &cancel).await.unwrap_err();
    assert!(matches!(err, PathsafeError::DestinationExists(_)));

    safe_copy_async(&src, &dst, true, &cancel).await?;
    assert_eq!(fs::read(&dst).await?, b"payload");

    safe_move_async(&src, &moved, false, &cancel).await?;
    assert!(!src.exists());
    assert_eq!(fs::read(&moved).await?, b"payload");
    Ok(())
}

#[tokio::test]
async fn test_cancelled_move_after_rename_puts_source_back() -> Result<()> {
    let dir = tempdir()?;
    let src = dir.path().join("only-copy.bin");
    let dst = dir.path().join("dst.bin");
    fs::write(&src, b"precious").await?;
    fs::write(&dst, b"previous").await?;

    let cancel = CancellationToken::new();
    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            hang_after_move: true,
            cancel: Some(cancel.clone()),
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager.move_file(&src, &dst, true, &cancel).await.unwrap_err();

    assert!(matches!(err, PathsafeError::Cancelled { .. }));
    assert_eq!(fs::read(&src).await?, b"precious");
    assert_eq!(fs::read(&dst).await?, b"previous");
    assert_eq!(manager.ops().move_calls.load(Ordering::SeqCst), 2);
    assert!(manager.ops().backups().iter().all(|b| !b.exists()));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_move_to_new_destination_puts_source_back() -> Result<()> {
    let dir = tempdir()?;
    let src = dir.path().join("only-copy.bin");
    let dst = dir.path().join("fresh.bin");
    fs::write(&src, b"precious").await?;

    let cancel = CancellationToken::new();
    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            hang_after_move: true,
            cancel: Some(cancel.clone()),
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager.move_file(&src, &dst, false, &cancel).await.unwrap_err();

    assert!(matches!(err, PathsafeError::Cancelled { .. }));
    assert_eq!(fs::read(&src).await?, b"precious");
    assert!(!dst.exists());
    Ok(())
}

#[tokio::test]
async fn test_async_unreadable_target_metadata_skips_mutation() -> Result<()> {
    let dir = tempdir()?;
    let target = dir.path().join("log.txt");
    fs::write(&target, b"keep").await?;

    let manager = AsyncSafeFileManager::with_ops(
        FlakyAsyncOps {
            fail_exists: true,
            ..Default::default()
        },
        SafeOptions::default(),
    );
    let err = manager
        .append_bytes(&target, b"more", false, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PathsafeError::BackupUnavailable { .. }));
    assert_eq!(manager.ops().append_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fs::read(&target).await?, b"keep");
    Ok(())
}

#[tokio::test]
async fn test_async_move_of_missing_source_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.bin");
    let dst = dir.path().join("dst.bin");
    fs::write(&dst, b"keep").await?;

    let err = safe_move_async(&missing, &dst, true, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PathsafeError::SourceMissing(_)));
    assert_eq!(fs::read(&dst).await?, b"keep");
    Ok(())
}
