//! Star system directory services.
//!
//! The resolver talks to a directory through [`SystemDirectory`]. The live
//! implementation is [`EdsmClient`]; [`InMemoryDirectory`] serves a fixed set
//! of systems from JSON and backs offline runs and tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::system::ResolvedSystem;

mod edsm;
mod memory;

pub use edsm::{EdsmClient, DEFAULT_EDSM_BASE_URL, DEFAULT_USER_AGENT};
pub use memory::InMemoryDirectory;

/// Minimum query length accepted by prefix search.
pub const MIN_SEARCH_LEN: usize = 2;

/// Why a directory call produced no system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The directory answered and does not know the system.
    #[error("system '{name}' not found")]
    NotFound { name: String },

    /// Timeout, network failure or unexpected response. Worth retrying later.
    #[error("directory service unavailable: {message}")]
    Transient { message: String },
}

impl LookupError {
    pub fn not_found(name: impl Into<String>) -> Self {
        LookupError::NotFound { name: name.into() }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        LookupError::Transient {
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, LookupError::Transient { .. })
    }
}

/// Name to coordinates resolver backing the system cache.
#[async_trait]
pub trait SystemDirectory: Send + Sync {
    /// Resolve a single system by name, case-insensitively.
    async fn lookup_exact(&self, name: &str) -> Result<ResolvedSystem, LookupError>;

    /// Systems whose name starts with `query`. Entries without coordinates
    /// are never returned.
    async fn search_prefix(&self, query: &str) -> Result<Vec<ResolvedSystem>, LookupError>;
}
