use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{LookupError, SystemDirectory};
use crate::error::Result;
use crate::system::{normalize_name, ResolvedSystem};

/// Directory serving a fixed list of systems.
///
/// Used by the CLI `--offline` mode and throughout the tests. Call counters
/// make cache behaviour observable, and [`set_unavailable`] simulates an
/// outage of the live service.
///
/// [`set_unavailable`]: InMemoryDirectory::set_unavailable
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    systems: Vec<ResolvedSystem>,
    index: HashMap<String, usize>,
    lookups: AtomicUsize,
    searches: AtomicUsize,
    unavailable: AtomicBool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SystemsFile {
    List(Vec<ResolvedSystem>),
    Keyed(HashMap<String, ResolvedSystem>),
}

impl InMemoryDirectory {
    pub fn new(systems: impl IntoIterator<Item = ResolvedSystem>) -> Self {
        let mut directory = Self::default();
        for system in systems {
            directory.insert(system);
        }
        directory
    }

    /// Load systems from a JSON array, or from an object keyed by name as
    /// written by the snapshot file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed: SystemsFile = serde_json::from_str(&contents)?;
        let systems = match parsed {
            SystemsFile::List(systems) => systems,
            SystemsFile::Keyed(map) => {
                let mut systems: Vec<_> = map.into_values().collect();
                systems.sort_by(|a, b| a.name.cmp(&b.name));
                systems
            }
        };
        debug!(path = %path.display(), systems = systems.len(), "loaded offline system directory");
        Ok(Self::new(systems))
    }

    /// Add or replace a system.
    pub fn insert(&mut self, system: ResolvedSystem) {
        let key = normalize_name(&system.name);
        match self.index.get(&key) {
            Some(&position) => self.systems[position] = system,
            None => {
                self.index.insert(key, self.systems.len());
                self.systems.push(system);
            }
        }
    }

    /// Make every subsequent call fail with a transient error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `lookup_exact` calls received.
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `search_prefix` calls received.
    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn check_available(&self) -> std::result::Result<(), LookupError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(LookupError::transient("offline directory marked unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SystemDirectory for InMemoryDirectory {
    async fn lookup_exact(&self, name: &str) -> std::result::Result<ResolvedSystem, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.index
            .get(&normalize_name(name))
            .map(|&position| self.systems[position].clone())
            .ok_or_else(|| LookupError::not_found(name))
    }

    async fn search_prefix(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<ResolvedSystem>, LookupError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let prefix = normalize_name(query);
        Ok(self
            .systems
            .iter()
            .filter(|system| normalize_name(&system.name).starts_with(&prefix))
            .cloned()
            .collect())
    }
}
