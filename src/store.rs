use crate::error::{StoreError, StoreResult};
use crate::model::Document;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const LOCK_POLL: Duration = Duration::from_millis(25);
const STALE_LOCK_AGE: Duration = Duration::from_secs(60);

/// Owns the JSON document on disk. Every mutation goes through
/// [`DocumentStore::update`], which holds an exclusive lock file for the
/// whole read-modify-write cycle.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        DocumentStore {
            path: path.into(),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Current document; writes and returns the seed document when the
    /// backing file does not exist yet.
    pub fn load(&self) -> StoreResult<Document> {
        if let Some(doc) = self.read_existing()? {
            return Ok(doc);
        }
        let _lock = self.lock()?;
        self.load_locked()
    }

    /// Overwrites the backing file with `doc`.
    pub fn save(&self, doc: &Document) -> StoreResult<()> {
        let _lock = self.lock()?;
        self.write(doc)
    }

    /// Replaces whatever is on disk with a fresh seed document.
    pub fn init(&self) -> StoreResult<Document> {
        let _lock = self.lock()?;
        let doc = Document::seed();
        self.write(&doc)?;
        info!(path = %self.path.display(), "initialized document");
        Ok(doc)
    }

    /// Locked load-mutate-save. The file is only rewritten when `f`
    /// actually changed the document.
    pub fn update<T>(&self, f: impl FnOnce(&mut Document) -> T) -> StoreResult<T> {
        let _lock = self.lock()?;
        let mut doc = self.load_locked()?;
        let before = doc.clone();
        let out = f(&mut doc);
        if doc != before {
            self.write(&doc)?;
        } else {
            debug!(path = %self.path.display(), "document unchanged, skipping save");
        }
        Ok(out)
    }

    pub(crate) fn lock(&self) -> StoreResult<StoreLock> {
        StoreLock::acquire(&self.path, self.lock_timeout)
    }

    fn load_locked(&self) -> StoreResult<Document> {
        if let Some(doc) = self.read_existing()? {
            return Ok(doc);
        }
        let doc = Document::seed();
        self.write(&doc)?;
        info!(path = %self.path.display(), "seeded new document");
        Ok(doc)
    }

    fn read_existing(&self) -> StoreResult<Option<Document>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        debug!(path = %self.path.display(), bytes = bytes.len(), "loaded document");
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, doc: &Document) -> StoreResult<()> {
        ensure_parent(&self.path)?;
        let mut text = serde_json::to_string_pretty(doc)?;
        text.push('\n');

        // Write beside the target and rename over it so a crash never
        // leaves a truncated document behind.
        let tmp = sibling(&self.path, "tmp");
        {
            let mut f = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
            f.write_all(text.as_bytes())
                .map_err(|e| StoreError::io(&tmp, e))?;
            f.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = text.len(), "saved document");
        Ok(())
    }
}

/// Exclusive advisory lock over a document, held as `<file>.lock`. The
/// file holds the owner's pid. Released when dropped.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(target: &Path, timeout: Duration) -> StoreResult<Self> {
        ensure_parent(target)?;
        let path = sibling(target, "lock");
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut f) => {
                    let _ = writeln!(f, "{}", std::process::id());
                    return Ok(StoreLock { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if break_stale_lock(&path)? {
                        continue;
                    }
                    let waited = started.elapsed();
                    if waited >= timeout {
                        warn!(path = %path.display(), ?waited, "lock wait timed out");
                        return Err(StoreError::LockTimeout { path, waited });
                    }
                    thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(StoreError::io(&path, e)),
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

/// Removes `lock` if it is stale. The staleness check and the removal both
/// happen while holding `<file>.lock.break`, so a waiter that saw the old
/// lock can never delete the fresh one another waiter created after it.
/// Returns whether a lock was removed.
fn break_stale_lock(lock: &Path) -> StoreResult<bool> {
    if !is_stale(lock) {
        return Ok(false);
    }
    let guard = sibling(lock, "break");
    match OpenOptions::new().write(true).create_new(true).open(&guard) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            // Left behind by a breaker that died mid-break.
            if is_stale(&guard) {
                let _ = fs::remove_file(&guard);
            }
            return Ok(false);
        }
        Err(e) => return Err(StoreError::io(&guard, e)),
    }

    let broken = is_stale(lock);
    if broken {
        let holder = fs::read_to_string(lock).unwrap_or_default();
        warn!(path = %lock.display(), holder = holder.trim(), "breaking stale lock");
        let _ = fs::remove_file(lock);
    }
    let _ = fs::remove_file(&guard);
    Ok(broken)
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.elapsed().ok())
        .map(|age| age > STALE_LOCK_AGE)
        .unwrap_or(false)
}

fn ensure_parent(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// `data/database.json` -> `data/database.json.<ext>`
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("database.json"));
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}
