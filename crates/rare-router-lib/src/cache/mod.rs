//! Three-tier system resolution cache.
//!
//! [`SystemResolver`] answers name lookups from, in order:
//!
//! 1. the in-memory exact cache, seeded from the snapshot file and never
//!    expired while the process runs;
//! 2. the read-only origin table of precomputed rare origin systems;
//! 3. the live [`SystemDirectory`].
//!
//! Live hits are added to the exact cache and written back to the snapshot by
//! a debounced background task. Prefix searches have their own cache with a
//! fixed TTL.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, OnceCell};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::directory::{LookupError, SystemDirectory, MIN_SEARCH_LEN};
use crate::error::Result;
use crate::fuzzy;
use crate::system::{normalize_name, ResolvedSystem};

mod origin_table;
pub mod snapshot;

pub use origin_table::{OriginMetadata, OriginTable};

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE: &str = "systemCache.json";

/// Origin table file name inside the data directory.
pub const ORIGIN_TABLE_FILE: &str = "rareSystemsCache.json";

/// How long a prefix search result is reused.
pub const DEFAULT_SEARCH_TTL: Duration = Duration::from_secs(15 * 60);

/// Quiet period before pending snapshot changes are written.
pub const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_secs(5);

/// Upper bound on a single directory call.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// File locations and timings for a [`SystemResolver`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Snapshot to load at startup and write back to. `None` keeps the cache
    /// purely in memory.
    pub snapshot_path: Option<PathBuf>,
    pub origin_table_path: Option<PathBuf>,
    pub search_ttl: Duration,
    pub persist_debounce: Duration,
    /// A directory call running longer than this counts as a transient failure.
    pub lookup_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            origin_table_path: None,
            search_ttl: DEFAULT_SEARCH_TTL,
            persist_debounce: DEFAULT_PERSIST_DEBOUNCE,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl CacheSettings {
    /// Settings using the standard file names inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            snapshot_path: Some(data_dir.join(SNAPSHOT_FILE)),
            origin_table_path: Some(data_dir.join(ORIGIN_TABLE_FILE)),
            ..Self::default()
        }
    }
}

/// Outcome of an exact lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ResolvedSystem),
    /// The directory confirmed the system does not exist.
    NotFound,
    /// The directory could not be reached. Callers treat this like
    /// `NotFound`, but a retry may succeed.
    Unavailable { message: String },
}

impl Resolution {
    pub fn system(&self) -> Option<&ResolvedSystem> {
        match self {
            Resolution::Found(system) => Some(system),
            _ => None,
        }
    }

    pub fn into_system(self) -> Option<ResolvedSystem> {
        match self {
            Resolution::Found(system) => Some(system),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Point-in-time view of the resolver state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub exact_entries: usize,
    pub search_entries: usize,
    pub origin_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_metadata: Option<OriginMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
    pub pending_write: bool,
    pub snapshot_writes: usize,
    pub directory_lookups: usize,
    pub directory_searches: usize,
}

/// An exact lookup shared by every concurrent caller asking for the same name.
type PendingLookup = Arc<OnceCell<Resolution>>;

struct SearchEntry {
    results: Vec<ResolvedSystem>,
    expires_at: Instant,
}

/// State shared with the background snapshot writer.
struct Shared {
    exact: Mutex<HashMap<String, ResolvedSystem>>,
    snapshot_path: Option<PathBuf>,
    dirty: AtomicBool,
    wake: Notify,
    snapshot_writes: AtomicUsize,
}

impl Shared {
    fn exact(&self) -> MutexGuard<'_, HashMap<String, ResolvedSystem>> {
        self.exact.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the snapshot if anything changed since the last write.
    ///
    /// Must stay synchronous: an aborted writer task may not leave a
    /// half-written snapshot.
    fn write_if_dirty(&self) -> Result<bool> {
        let Some(path) = self.snapshot_path.as_deref() else {
            return Ok(false);
        };
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }

        let systems = self.exact().clone();
        match snapshot::write(path, &systems) {
            Ok(()) => {
                self.snapshot_writes.fetch_add(1, Ordering::SeqCst);
                info!(
                    path = %path.display(),
                    systems = systems.len(),
                    "wrote system snapshot"
                );
                Ok(true)
            }
            Err(err) => {
                // keep the changes pending so close() can retry
                self.dirty.store(true, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

/// Cached front end over a [`SystemDirectory`].
///
/// Create with [`SystemResolver::open`] inside a Tokio runtime and call
/// [`SystemResolver::close`] before exiting so pending snapshot changes are
/// written.
pub struct SystemResolver {
    directory: Arc<dyn SystemDirectory>,
    shared: Arc<Shared>,
    origins: OriginTable,
    search: Mutex<HashMap<String, SearchEntry>>,
    search_ttl: Duration,
    lookup_timeout: Duration,
    pending: Mutex<HashMap<String, PendingLookup>>,
    lookups: AtomicUsize,
    searches: AtomicUsize,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl SystemResolver {
    /// Load the snapshot and origin table and start the snapshot writer.
    pub async fn open(directory: Arc<dyn SystemDirectory>, settings: CacheSettings) -> Self {
        let exact = settings
            .snapshot_path
            .as_deref()
            .map(snapshot::load)
            .unwrap_or_default();

        let origins = match settings.origin_table_path.as_deref() {
            Some(path) => OriginTable::load(path).unwrap_or_else(|err| {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "could not load origin table, ignoring it"
                );
                OriginTable::default()
            }),
            None => OriginTable::default(),
        };

        let shared = Arc::new(Shared {
            exact: Mutex::new(exact),
            snapshot_path: settings.snapshot_path,
            dirty: AtomicBool::new(false),
            wake: Notify::new(),
            snapshot_writes: AtomicUsize::new(0),
        });

        let writer = shared.snapshot_path.is_some().then(|| {
            tokio::spawn(run_snapshot_writer(
                Arc::clone(&shared),
                settings.persist_debounce,
            ))
        });

        Self {
            directory,
            shared,
            origins,
            search: Mutex::new(HashMap::new()),
            search_ttl: settings.search_ttl,
            lookup_timeout: settings.lookup_timeout,
            pending: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
            searches: AtomicUsize::new(0),
            writer: Mutex::new(writer),
        }
    }

    /// Resolve a system by exact name (case-insensitive).
    pub async fn resolve_exact(&self, name: &str) -> Resolution {
        let key = normalize_name(name);
        if key.is_empty() {
            return Resolution::NotFound;
        }

        if let Some(system) = self.shared.exact().get(&key).cloned() {
            debug!(name = %key, "exact cache hit");
            return Resolution::Found(system);
        }
        if let Some(system) = self.origins.get(&key) {
            debug!(name = %key, "origin table hit");
            return Resolution::Found(system.clone());
        }

        // concurrent misses for one name share a single directory call
        let pending = Arc::clone(
            self.pending_lookups()
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        );
        let resolution = pending
            .get_or_init(|| self.lookup_directory(name.trim(), &key))
            .await
            .clone();

        let mut in_flight = self.pending_lookups();
        if in_flight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &pending))
        {
            in_flight.remove(&key);
        }
        resolution
    }

    async fn lookup_directory(&self, name: &str, key: &str) -> Resolution {
        debug!(name = %key, "exact cache miss, querying directory");
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let outcome = match timeout(self.lookup_timeout, self.directory.lookup_exact(name)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LookupError::transient(format!(
                "lookup timed out after {}s",
                self.lookup_timeout.as_secs_f64()
            ))),
        };

        match outcome {
            Ok(system) => {
                self.shared.exact().insert(key.to_string(), system.clone());
                self.schedule_write();
                Resolution::Found(system)
            }
            Err(LookupError::NotFound { .. }) => {
                warn!(name = %name, "system not found in directory");
                Resolution::NotFound
            }
            Err(LookupError::Transient { message }) => {
                warn!(
                    name = %name,
                    error = %message,
                    "directory lookup failed, treating system as not found"
                );
                Resolution::Unavailable { message }
            }
        }
    }

    /// Systems whose names start with `query`.
    ///
    /// Queries shorter than two characters and directory failures both
    /// produce an empty list.
    pub async fn search_prefix(&self, query: &str) -> Vec<ResolvedSystem> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        let key = query.to_lowercase();
        {
            let mut cache = self.search_cache();
            match cache.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    debug!(query = %key, "search cache hit");
                    return entry.results.clone();
                }
                Some(_) => {
                    cache.remove(&key);
                }
                None => {}
            }
        }

        self.searches.fetch_add(1, Ordering::SeqCst);
        match timeout(self.lookup_timeout, self.directory.search_prefix(query)).await {
            Ok(Ok(results)) => {
                self.search_cache().insert(
                    key,
                    SearchEntry {
                        results: results.clone(),
                        expires_at: Instant::now() + self.search_ttl,
                    },
                );
                results
            }
            Ok(Err(err)) => {
                warn!(query = %query, error = %err, "system search failed");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    query = %query,
                    timeout_secs = self.lookup_timeout.as_secs_f64(),
                    "system search timed out"
                );
                Vec::new()
            }
        }
    }

    /// Names this resolver can answer without the directory.
    pub fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .shared
            .exact()
            .values()
            .map(|system| system.name.clone())
            .chain(self.origins.names().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Close matches for an unresolved name from cached systems and a prefix
    /// search on its first characters.
    pub async fn suggest_names(&self, name: &str, limit: usize) -> Vec<String> {
        let name = name.trim();
        if name.is_empty() {
            return Vec::new();
        }

        let mut candidates = self.known_names();
        let prefix: String = name.chars().take(3).collect();
        candidates.extend(
            self.search_prefix(&prefix)
                .await
                .into_iter()
                .map(|system| system.name),
        );
        candidates.sort();
        candidates.dedup();

        fuzzy::suggest(name, &candidates, limit)
            .into_iter()
            .filter(|candidate| !candidate.eq_ignore_ascii_case(name))
            .collect()
    }

    /// Write pending snapshot changes now.
    pub fn flush(&self) -> Result<()> {
        self.shared.write_if_dirty().map(|_| ())
    }

    /// Stop the background writer and flush pending changes.
    pub async fn close(&self) -> Result<()> {
        let handle = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        self.flush()
    }

    pub fn status(&self) -> CacheStatus {
        let now = Instant::now();
        CacheStatus {
            exact_entries: self.shared.exact().len(),
            search_entries: self
                .search_cache()
                .values()
                .filter(|entry| entry.expires_at > now)
                .count(),
            origin_entries: self.origins.len(),
            origin_metadata: self.origins.metadata().cloned(),
            snapshot_path: self.shared.snapshot_path.clone(),
            pending_write: self.shared.dirty.load(Ordering::SeqCst),
            snapshot_writes: self.shared.snapshot_writes.load(Ordering::SeqCst),
            directory_lookups: self.lookups.load(Ordering::SeqCst),
            directory_searches: self.searches.load(Ordering::SeqCst),
        }
    }

    fn schedule_write(&self) {
        if self.shared.snapshot_path.is_none() {
            return;
        }
        self.shared.dirty.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
    }

    fn search_cache(&self) -> MutexGuard<'_, HashMap<String, SearchEntry>> {
        self.search.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending_lookups(&self) -> MutexGuard<'_, HashMap<String, PendingLookup>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SystemResolver {
    fn drop(&mut self) {
        let handle = self
            .writer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

/// Waits for a change, then for `debounce` without further changes, then
/// writes once. A change during the quiet period restarts it.
async fn run_snapshot_writer(shared: Arc<Shared>, debounce: Duration) {
    loop {
        shared.wake.notified().await;
        loop {
            tokio::select! {
                _ = shared.wake.notified() => continue,
                _ = tokio::time::sleep(debounce) => break,
            }
        }
        if let Err(err) = shared.write_if_dirty() {
            error!(error = %err, "failed to persist system snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Coordinates;
    use crate::directory::InMemoryDirectory;

    fn directory() -> Arc<InMemoryDirectory> {
        Arc::new(InMemoryDirectory::new([
            ResolvedSystem::new("Lave", Coordinates::new(75.75, 48.75, 70.75)),
            ResolvedSystem::new("Leesti", Coordinates::new(72.75, 48.75, 68.25)),
        ]))
    }

    #[tokio::test]
    async fn blank_names_never_reach_the_directory() {
        let directory = directory();
        let resolver = SystemResolver::open(directory.clone(), CacheSettings::default()).await;
        assert_eq!(resolver.resolve_exact("   ").await, Resolution::NotFound);
        assert_eq!(directory.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn short_queries_skip_the_directory() {
        let directory = directory();
        let resolver = SystemResolver::open(directory.clone(), CacheSettings::default()).await;
        assert!(resolver.search_prefix("l").await.is_empty());
        assert!(resolver.search_prefix(" l ").await.is_empty());
        assert_eq!(directory.search_calls(), 0);
    }

    #[tokio::test]
    async fn transient_failures_are_distinguishable() {
        let directory = directory();
        directory.set_unavailable(true);
        let resolver = SystemResolver::open(directory.clone(), CacheSettings::default()).await;

        let resolution = resolver.resolve_exact("Lave").await;
        assert!(matches!(resolution, Resolution::Unavailable { .. }));
        assert!(resolution.system().is_none());
        assert!(!resolver.resolve_exact("Nowhere").await.is_found());
        assert!(resolver.search_prefix("La").await.is_empty());
    }

    #[tokio::test]
    async fn in_memory_settings_never_schedule_writes() {
        let resolver = SystemResolver::open(directory(), CacheSettings::default()).await;
        assert!(resolver.resolve_exact("Lave").await.is_found());
        let status = resolver.status();
        assert!(!status.pending_write);
        assert_eq!(status.exact_entries, 1);
        resolver.close().await.expect("close");
    }
}
