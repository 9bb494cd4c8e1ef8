use serde::{Deserialize, Serialize};

use crate::coords::Coordinates;

/// A star system with known coordinates and, when reported, faction details.
///
/// `allegiance` and `government` are free-text labels from the directory
/// service. `None` means the service did not say, not that the system has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSystem {
    pub name: String,
    pub coords: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allegiance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub government: Option<String>,
}

impl ResolvedSystem {
    pub fn new(name: impl Into<String>, coords: Coordinates) -> Self {
        Self {
            name: name.into(),
            coords,
            allegiance: None,
            government: None,
        }
    }

    pub fn with_allegiance(mut self, allegiance: impl Into<String>) -> Self {
        self.allegiance = Some(allegiance.into());
        self
    }

    pub fn with_government(mut self, government: impl Into<String>) -> Self {
        self.government = Some(government.into());
        self
    }

    /// Whether neither faction attribute is known.
    pub fn lacks_faction_info(&self) -> bool {
        self.allegiance.is_none() && self.government.is_none()
    }
}

/// Normalize a system name for case-insensitive cache lookup.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
