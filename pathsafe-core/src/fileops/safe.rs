// File: pathsafe-core/src/fileops/safe.rs
//! Backup-guarded file mutation.
//!
//! Every safe operation follows the same sequence: copy the current target
//! into a fresh temp file, run the mutation, then either delete the backup
//! (commit) or copy it back over the target (rollback). A target that did not
//! exist before the call is deleted on rollback instead.
//!
//! The sequence is not atomic at the OS level. A crash between mutation and
//! rollback leaves the backup file in the temp directory, and two safe calls
//! on the same target are not coordinated with each other.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, error, info, warn};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::task::Poll;
use tokio_util::sync::CancellationToken;

use crate::errors::{PathsafeError, Result};
use crate::fileops::encoding::TextEncoding;
use crate::fileops::plain::{AsyncFileOps, FileOps, StdFileOps, TokioFileOps};

/// Per-call retention settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeOptions {
    /// Delete the backup once the call has committed or rolled back.
    pub delete_temp_copies: bool,
}

impl Default for SafeOptions {
    fn default() -> Self {
        Self {
            delete_temp_copies: true,
        }
    }
}

impl SafeOptions {
    /// Leaves every backup on disk after the call.
    pub fn keep_backups() -> Self {
        Self {
            delete_temp_copies: false,
        }
    }
}

/// Why a mutation did not commit.
enum Failure {
    Error(io::Error),
    Panicked(String),
    Cancelled,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Error(e) => write!(f, "{}", e),
            Failure::Panicked(msg) => write!(f, "mutation panicked: {}", msg),
            Failure::Cancelled => f.write_str("cancelled"),
        }
    }
}

impl Failure {
    fn into_error(self, target: PathBuf) -> PathsafeError {
        match self {
            Failure::Error(source) => PathsafeError::MutationFailed { target, source },
            Failure::Panicked(msg) => PathsafeError::MutationFailed {
                target,
                source: io::Error::other(format!("mutation panicked: {}", msg)),
            },
            Failure::Cancelled => PathsafeError::Cancelled { target },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Tracks the backup of one target for the duration of a safe call.
///
/// A guard dropped while still armed (unwinding past the combinator, or an
/// async call dropped mid-flight) keeps the backup on disk and logs where it is.
#[derive(Debug)]
struct BackupGuard {
    target: PathBuf,
    backup: Option<PathBuf>,
    /// Source of a move onto `target`. Rollback moves the file back if the
    /// move already happened.
    moved_from: Option<PathBuf>,
    armed: bool,
}

impl BackupGuard {
    fn new(target: &Path, backup: Option<PathBuf>) -> Self {
        Self {
            target: target.to_path_buf(),
            backup,
            moved_from: None,
            armed: true,
        }
    }

    fn moving_from(mut self, src: Option<&Path>) -> Self {
        self.moved_from = src.map(Path::to_path_buf);
        self
    }

    /// Disarms the guard and hands back the backup if it should be deleted.
    fn release(&mut self, options: SafeOptions) -> Option<PathBuf> {
        self.armed = false;
        match self.backup.take() {
            Some(backup) if options.delete_temp_copies => Some(backup),
            Some(backup) => {
                info!("Keeping backup of '{}' at '{}'.", self.target.display(), backup.display());
                None
            }
            None => None,
        }
    }

    /// Disarms the guard after a failed rollback. The backup always stays on disk.
    fn abandon(&mut self) -> Option<PathBuf> {
        self.armed = false;
        self.backup.take()
    }
}

impl Drop for BackupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match &self.backup {
            Some(backup) => warn!(
                "Safe operation on '{}' was abandoned before commit or rollback; backup kept at '{}'.",
                self.target.display(),
                backup.display()
            ),
            None => warn!(
                "Safe operation on '{}' was abandoned before commit or rollback; there was no prior target.",
                self.target.display()
            ),
        }
    }
}

fn log_delete_failure(backup: &Path, result: io::Result<()>) {
    if let Err(e) = result {
        warn!("Could not delete backup '{}': {}", backup.display(), e);
    }
}

fn backup_unavailable(target: &Path) -> impl FnOnce(io::Error) -> PathsafeError + '_ {
    move |source| PathsafeError::BackupUnavailable {
        target: target.to_path_buf(),
        source,
    }
}

fn rollback_failed(guard: &mut BackupGuard, failure: &Failure, source: io::Error) -> PathsafeError {
    let backup = guard.abandon();
    error!(
        "Rollback of '{}' failed after '{}': {}. Backup retained at {:?}.",
        guard.target.display(),
        failure,
        source,
        backup
    );
    PathsafeError::RollbackFailed {
        target: guard.target.clone(),
        backup,
        mutation: failure.to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Blocking combinator
// ---------------------------------------------------------------------------

fn take_backup<O: FileOps + ?Sized>(ops: &O, target: &Path) -> Result<BackupGuard> {
    if !ops.exists(target).map_err(backup_unavailable(target))? {
        debug!("'{}' does not exist yet; no backup needed.", target.display());
        return Ok(BackupGuard::new(target, None));
    }
    let backup = ops.create_temp_file().map_err(backup_unavailable(target))?;
    if let Err(source) = ops.copy_file(target, &backup, true) {
        log_delete_failure(&backup, ops.delete_file(&backup));
        return Err(PathsafeError::BackupUnavailable {
            target: target.to_path_buf(),
            source,
        });
    }
    debug!("Backed up '{}' to '{}'.", target.display(), backup.display());
    Ok(BackupGuard::new(target, Some(backup)))
}

fn commit<O: FileOps + ?Sized>(ops: &O, mut guard: BackupGuard, options: SafeOptions) {
    if let Some(backup) = guard.release(options) {
        log_delete_failure(&backup, ops.delete_file(&backup));
    }
    debug!("Committed safe operation on '{}'.", guard.target.display());
}

fn rollback<O: FileOps + ?Sized>(
    ops: &O,
    mut guard: BackupGuard,
    options: SafeOptions,
    failure: Failure,
) -> PathsafeError {
    warn!("Operation on '{}' failed ({}); rolling back.", guard.target.display(), failure);
    if let Err(source) = restore(ops, &guard) {
        return rollback_failed(&mut guard, &failure, source);
    }
    if let Some(backup) = guard.release(options) {
        log_delete_failure(&backup, ops.delete_file(&backup));
    }
    failure.into_error(guard.target.clone())
}

/// Puts the target back: undoes a completed move, then restores the backup
/// or removes a target that did not exist before.
fn restore<O: FileOps + ?Sized>(ops: &O, guard: &BackupGuard) -> io::Result<()> {
    if let Some(src) = guard.moved_from.as_deref() {
        if !ops.exists(src)? && ops.exists(&guard.target)? {
            warn!("'{}' was already moved; moving it back to '{}'.", guard.target.display(), src.display());
            ops.move_file(&guard.target, src, false)?;
        }
    }
    match guard.backup.as_deref() {
        Some(backup) => ops.copy_file(backup, &guard.target, true),
        None if ops.exists(&guard.target)? => ops.delete_file(&guard.target),
        None => Ok(()),
    }
}

/// Runs `mutation` against `target` with a backup in place.
///
/// Returns [`PathsafeError::BackupUnavailable`] without running the mutation
/// if the backup cannot be taken. A mutation that errors or panics is rolled
/// back; a rollback that itself fails yields [`PathsafeError::RollbackFailed`].
pub fn with_backup<O, F>(ops: &O, target: &Path, options: SafeOptions, mutation: F) -> Result<()>
where
    O: FileOps + ?Sized,
    F: FnOnce() -> io::Result<()>,
{
    guarded(ops, target, None, options, mutation)
}

fn guarded<O, F>(
    ops: &O,
    target: &Path,
    moved_from: Option<&Path>,
    options: SafeOptions,
    mutation: F,
) -> Result<()>
where
    O: FileOps + ?Sized,
    F: FnOnce() -> io::Result<()>,
{
    let guard = take_backup(ops, target)?.moving_from(moved_from);
    match panic::catch_unwind(AssertUnwindSafe(mutation)) {
        Ok(Ok(())) => {
            commit(ops, guard, options);
            Ok(())
        }
        Ok(Err(e)) => Err(rollback(ops, guard, options, Failure::Error(e))),
        Err(payload) => Err(rollback(ops, guard, options, Failure::Panicked(panic_message(&*payload)))),
    }
}

// ---------------------------------------------------------------------------
// Async combinator
// ---------------------------------------------------------------------------

async fn take_backup_async<O: AsyncFileOps + ?Sized>(ops: &O, target: &Path) -> Result<BackupGuard> {
    if !ops.exists(target).await.map_err(backup_unavailable(target))? {
        debug!("'{}' does not exist yet; no backup needed.", target.display());
        return Ok(BackupGuard::new(target, None));
    }
    let backup = ops.create_temp_file().await.map_err(backup_unavailable(target))?;
    if let Err(source) = ops.copy_file(target, &backup, true).await {
        log_delete_failure(&backup, ops.delete_file(&backup).await);
        return Err(PathsafeError::BackupUnavailable {
            target: target.to_path_buf(),
            source,
        });
    }
    debug!("Backed up '{}' to '{}'.", target.display(), backup.display());
    Ok(BackupGuard::new(target, Some(backup)))
}

async fn commit_async<O: AsyncFileOps + ?Sized>(ops: &O, mut guard: BackupGuard, options: SafeOptions) {
    if let Some(backup) = guard.release(options) {
        log_delete_failure(&backup, ops.delete_file(&backup).await);
    }
    debug!("Committed safe operation on '{}'.", guard.target.display());
}

async fn rollback_async<O: AsyncFileOps + ?Sized>(
    ops: &O,
    mut guard: BackupGuard,
    options: SafeOptions,
    failure: Failure,
) -> PathsafeError {
    warn!("Operation on '{}' failed ({}); rolling back.", guard.target.display(), failure);
    if let Err(source) = restore_async(ops, &guard).await {
        return rollback_failed(&mut guard, &failure, source);
    }
    if let Some(backup) = guard.release(options) {
        log_delete_failure(&backup, ops.delete_file(&backup).await);
    }
    failure.into_error(guard.target.clone())
}

async fn restore_async<O: AsyncFileOps + ?Sized>(ops: &O, guard: &BackupGuard) -> io::Result<()> {
    if let Some(src) = guard.moved_from.as_deref() {
        if !ops.exists(src).await? && ops.exists(&guard.target).await? {
            warn!("'{}' was already moved; moving it back to '{}'.", guard.target.display(), src.display());
            ops.move_file(&guard.target, src, false).await?;
        }
    }
    match guard.backup.as_deref() {
        Some(backup) => ops.copy_file(backup, &guard.target, true).await,
        None if ops.exists(&guard.target).await? => ops.delete_file(&guard.target).await,
        None => Ok(()),
    }
}

/// Polls `future`, turning a panic inside it into an `Err` carrying the payload.
async fn catch_panic<Fut>(future: Fut) -> std::result::Result<Fut::Output, Box<dyn Any + Send>>
where
    Fut: Future,
{
    let mut future = Box::pin(future);
    std::future::poll_fn(move |cx| {
        match panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(cx))) {
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => Poll::Ready(Err(payload)),
        }
    })
    .await
}

/// The cancellable counterpart of [`with_backup`].
///
/// A token cancelled before the call starts returns
/// [`PathsafeError::Cancelled`] without touching anything. Cancellation while
/// the mutation runs drops the mutation and rolls back; the rollback itself is
/// not cancellable.
pub async fn with_backup_async<O, Fut>(
    ops: &O,
    target: &Path,
    options: SafeOptions,
    cancel: &CancellationToken,
    mutation: Fut,
) -> Result<()>
where
    O: AsyncFileOps + ?Sized,
    Fut: Future<Output = io::Result<()>>,
{
    guarded_async(ops, target, None, options, cancel, mutation).await
}

async fn guarded_async<O, Fut>(
    ops: &O,
    target: &Path,
    moved_from: Option<&Path>,
    options: SafeOptions,
    cancel: &CancellationToken,
    mutation: Fut,
) -> Result<()>
where
    O: AsyncFileOps + ?Sized,
    Fut: Future<Output = io::Result<()>>,
{
    if cancel.is_cancelled() {
        debug!("Safe operation on '{}' cancelled before it started.", target.display());
        return Err(PathsafeError::Cancelled {
            target: target.to_path_buf(),
        });
    }

    let guard = take_backup_async(ops, target).await?.moving_from(moved_from);
    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        result = catch_panic(mutation) => Some(result),
    };

    match outcome {
        Some(Ok(Ok(()))) => {
            commit_async(ops, guard, options).await;
            Ok(())
        }
        Some(Ok(Err(e))) => Err(rollback_async(ops, guard, options, Failure::Error(e)).await),
        Some(Err(payload)) => {
            let failure = Failure::Panicked(panic_message(&*payload));
            Err(rollback_async(ops, guard, options, failure).await)
        }
        None => Err(rollback_async(ops, guard, options, Failure::Cancelled).await),
    }
}

// ---------------------------------------------------------------------------
// Managers
// ---------------------------------------------------------------------------

fn check_destination(exists: io::Result<bool>, overwrite: bool, dst: &Path) -> Result<()> {
    match exists.map_err(backup_unavailable(dst))? {
        true if !overwrite => Err(PathsafeError::DestinationExists(dst.to_path_buf())),
        _ => Ok(()),
    }
}

fn check_source(exists: io::Result<bool>, src: &Path) -> Result<()> {
    if exists? {
        Ok(())
    } else {
        Err(PathsafeError::SourceMissing(src.to_path_buf()))
    }
}

/// Blocking safe operations over a [`FileOps`] implementation.
#[derive(Debug, Clone, Default)]
pub struct SafeFileManager<O: FileOps = StdFileOps> {
    ops: O,
    options: SafeOptions,
}

impl SafeFileManager<StdFileOps> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: FileOps> SafeFileManager<O> {
    pub fn with_ops(ops: O, options: SafeOptions) -> Self {
        Self { ops, options }
    }

    pub fn with_options(mut self, options: SafeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SafeOptions {
        self.options
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn append_bytes(&self, path: impl AsRef<Path>, bytes: &[u8], create_if_missing: bool) -> Result<()> {
        let path = path.as_ref();
        with_backup(&self.ops, path, self.options, || {
            self.ops.append_bytes(path, bytes, create_if_missing)
        })?;
        info!("Appended {} bytes to '{}'.", bytes.len(), path.display());
        Ok(())
    }

    /// Appends `text`, creating the file if needed.
    pub fn append_string(
        &self,
        path: impl AsRef<Path>,
        text: &str,
        newline: bool,
        encoding: TextEncoding,
    ) -> Result<()> {
        self.append_bytes(path, &encoding.encode_lines([text], newline), true)
    }

    /// Appends every line in one guarded mutation.
    pub fn append_strings<I, S>(
        &self,
        path: impl AsRef<Path>,
        lines: I,
        newline: bool,
        encoding: TextEncoding,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.append_bytes(path, &encoding.encode_lines(lines, newline), true)
    }

    pub fn copy(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        check_source(self.ops.exists(src), src)?;
        check_destination(self.ops.exists(dst), overwrite, dst)?;
        with_backup(&self.ops, dst, self.options, || self.ops.copy_file(src, dst, overwrite))?;
        info!("Copied '{}' to '{}'.", src.display(), dst.display());
        Ok(())
    }

    pub fn move_file(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        check_source(self.ops.exists(src), src)?;
        check_destination(self.ops.exists(dst), overwrite, dst)?;
        guarded(&self.ops, dst, Some(src), self.options, || {
            self.ops.move_file(src, dst, overwrite)
        })?;
        info!("Moved '{}' to '{}'.", src.display(), dst.display());
        Ok(())
    }
}

/// Cancellable safe operations over an [`AsyncFileOps`] implementation.
#[derive(Debug, Clone, Default)]
pub struct AsyncSafeFileManager<O: AsyncFileOps = TokioFileOps> {
    ops: O,
    options: SafeOptions,
}

impl AsyncSafeFileManager<TokioFileOps> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: AsyncFileOps> AsyncSafeFileManager<O> {
    pub fn with_ops(ops: O, options: SafeOptions) -> Self {
        Self { ops, options }
    }

    pub fn with_options(mut self, options: SafeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SafeOptions {
        self.options
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub async fn append_bytes(
        &self,
        path: impl AsRef<Path>,
        bytes: &[u8],
        create_if_missing: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = path.as_ref();
        let mutation = self.ops.append_bytes(path, bytes, create_if_missing);
        with_backup_async(&self.ops, path, self.options, cancel, mutation).await?;
        info!("Appended {} bytes to '{}'.", bytes.len(), path.display());
        Ok(())
    }

    pub async fn append_string(
        &self,
        path: impl AsRef<Path>,
        text: &str,
        newline: bool,
        encoding: TextEncoding,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let bytes = encoding.encode_lines([text], newline);
        self.append_bytes(path, &bytes, true, cancel).await
    }

    pub async fn append_strings<I, S>(
        &self,
        path: impl AsRef<Path>,
        lines: I,
        newline: bool,
        encoding: TextEncoding,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bytes = encoding.encode_lines(lines, newline);
        self.append_bytes(path, &bytes, true, cancel).await
    }

    pub async fn copy(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        check_source(self.ops.exists(src).await, src)?;
        check_destination(self.ops.exists(dst).await, overwrite, dst)?;
        let mutation = self.ops.copy_file(src, dst, overwrite);
        with_backup_async(&self.ops, dst, self.options, cancel, mutation).await?;
        info!("Copied '{}' to '{}'.", src.display(), dst.display());
        Ok(())
    }

    pub async fn move_file(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        check_source(self.ops.exists(src).await, src)?;
        check_destination(self.ops.exists(dst).await, overwrite, dst)?;
        let mutation = self.ops.move_file(src, dst, overwrite);
        guarded_async(&self.ops, dst, Some(src), self.options, cancel, mutation).await?;
        info!("Moved '{}' to '{}'.", src.display(), dst.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// One-shot helpers over the default managers
// ---------------------------------------------------------------------------

pub fn safe_append_bytes(path: impl AsRef<Path>, bytes: &[u8], create_if_missing: bool) -> Result<()> {
    SafeFileManager::new().append_bytes(path, bytes, create_if_missing)
}

pub fn safe_append_string(
    path: impl AsRef<Path>,
    text: &str,
    newline: bool,
    encoding: TextEncoding,
) -> Result<()> {
    SafeFileManager::new().append_string(path, text, newline, encoding)
}

pub fn safe_append_strings<I, S>(
    path: impl AsRef<Path>,
    lines: I,
    newline: bool,
    encoding: TextEncoding,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SafeFileManager::new().append_strings(path, lines, newline, encoding)
}

pub fn safe_copy(src: impl AsRef<Path>, dst: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    SafeFileManager::new().copy(src, dst, overwrite)
}

pub fn safe_move(src: impl AsRef<Path>, dst: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    SafeFileManager::new().move_file(src, dst, overwrite)
}

pub async fn safe_append_bytes_async(
    path: impl AsRef<Path>,
    bytes: &[u8],
    create_if_missing: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    AsyncSafeFileManager::new()
        .append_bytes(path, bytes, create_if_missing, cancel)
        .await
}

pub async fn safe_append_string_async(
    path: impl AsRef<Path>,
    text: &str,
    newline: bool,
    encoding: TextEncoding,
    cancel: &CancellationToken,
) -> Result<()> {
    AsyncSafeFileManager::new()
        .append_string(path, text, newline, encoding, cancel)
        .await
}

pub async fn safe_append_strings_async<I, S>(
    path: impl AsRef<Path>,
    lines: I,
    newline: bool,
    encoding: TextEncoding,
    cancel: &CancellationToken,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    AsyncSafeFileManager::new()
        .append_strings(path, lines, newline, encoding, cancel)
        .await
}

pub async fn safe_copy_async(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    overwrite: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    AsyncSafeFileManager::new().copy(src, dst, overwrite, cancel).await
}

pub async fn safe_move_async(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    overwrite: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    AsyncSafeFileManager::new().move_file(src, dst, overwrite, cancel).await
}
