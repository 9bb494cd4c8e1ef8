//! Common test utilities and fixture helpers.
//!
//! Integration tests run against the JSON fixtures in `docs/fixtures` through
//! the offline directory, so nothing here touches the network.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rare_router_lib::{
    CacheSettings, InMemoryDirectory, LookupError, RareCatalog, ResolvedSystem, SystemDirectory,
    SystemResolver,
};
use tempfile::TempDir;

/// Path to fixtures directory used by tests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_catalog() -> RareCatalog {
    RareCatalog::from_path(&fixtures_dir().join("rares.json")).expect("load fixture rares.json")
}

pub fn fixture_directory() -> Arc<InMemoryDirectory> {
    let directory = InMemoryDirectory::from_path(&fixtures_dir().join("systems.json"))
        .expect("load fixture systems.json");
    Arc::new(directory)
}

/// Temporary data directory holding a copy of the origin table fixture.
pub fn data_dir_with_origin_table() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp data dir");
    fs::copy(
        fixtures_dir().join("rareSystemsCache.json"),
        dir.path().join("rareSystemsCache.json"),
    )
    .expect("copy origin table fixture");
    dir
}

/// Cache settings for `data_dir` with a short, predictable debounce.
pub fn settings_in(data_dir: &Path) -> CacheSettings {
    CacheSettings {
        persist_debounce: Duration::from_secs(5),
        search_ttl: Duration::from_secs(15 * 60),
        ..CacheSettings::in_dir(data_dir)
    }
}

pub async fn open_resolver(
    directory: Arc<InMemoryDirectory>,
    settings: CacheSettings,
) -> SystemResolver {
    SystemResolver::open(directory, settings).await
}

/// Directory that answers from the fixtures after a fixed delay.
pub struct SlowDirectory {
    pub inner: Arc<InMemoryDirectory>,
    pub delay: Duration,
}

#[async_trait]
impl SystemDirectory for SlowDirectory {
    async fn lookup_exact(&self, name: &str) -> Result<ResolvedSystem, LookupError> {
        tokio::time::sleep(self.delay).await;
        self.inner.lookup_exact(name).await
    }

    async fn search_prefix(&self, query: &str) -> Result<Vec<ResolvedSystem>, LookupError> {
        tokio::time::sleep(self.delay).await;
        self.inner.search_prefix(query).await
    }
}

/// Directory whose calls never complete.
pub struct StalledDirectory;

#[async_trait]
impl SystemDirectory for StalledDirectory {
    async fn lookup_exact(&self, _name: &str) -> Result<ResolvedSystem, LookupError> {
        std::future::pending().await
    }

    async fn search_prefix(&self, _query: &str) -> Result<Vec<ResolvedSystem>, LookupError> {
        std::future::pending().await
    }
}
