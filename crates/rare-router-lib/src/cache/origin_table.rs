use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::system::{normalize_name, ResolvedSystem};

const METADATA_KEY: &str = "_metadata";

/// Provenance recorded by the offline export of rare origin systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginMetadata {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_systems: Option<usize>,
}

/// Read-only table of precomputed rare origin systems (`rareSystemsCache.json`).
///
/// Keys starting with `_` carry metadata rather than systems. Entries still at
/// the `{0,0,0}` placeholder were never resolved by the export and are skipped.
#[derive(Debug, Clone, Default)]
pub struct OriginTable {
    systems: HashMap<String, ResolvedSystem>,
    metadata: Option<OriginMetadata>,
}

impl OriginTable {
    /// Load the table, returning an empty one when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                path = %path.display(),
                "origin table not found; rare origins will use directory lookups"
            );
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let table = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            systems = table.len(),
            "loaded rare origin table"
        );
        Ok(table)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let raw: HashMap<String, Value> = serde_json::from_str(contents)?;
        let mut table = Self::default();

        for (key, value) in raw {
            if key == METADATA_KEY {
                table.metadata = Some(serde_json::from_value(value)?);
                continue;
            }
            if key.starts_with('_') {
                continue;
            }

            let system: ResolvedSystem = serde_json::from_value(value)?;
            if system.coords.is_origin() {
                debug!(name = %system.name, "skipping origin placeholder without coordinates");
                continue;
            }
            table.systems.insert(normalize_name(&key), system);
        }

        Ok(table)
    }

    /// Look up by normalized name.
    pub fn get(&self, key: &str) -> Option<&ResolvedSystem> {
        self.systems.get(key)
    }

    pub fn metadata(&self) -> Option<&OriginMetadata> {
        self.metadata.as_ref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.values().map(|system| system.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
