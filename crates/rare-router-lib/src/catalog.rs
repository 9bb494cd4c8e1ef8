//! Rare goods catalog loading and curated overrides.
//!
//! The catalog is a JSON array of rare goods. File order is preserved because
//! scan and analyze results are reported in catalog order.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::powerplay::PpSystemType;

/// Landing pad size required at the origin station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadSize {
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
}

/// A restriction that only applies when both attributes match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperpowerGovernment {
    pub superpower: String,
    pub government: String,
}

impl SuperpowerGovernment {
    pub fn new(superpower: impl Into<String>, government: impl Into<String>) -> Self {
        Self {
            superpower: superpower.into(),
            government: government.into(),
        }
    }

    /// Case-insensitive match against a system's allegiance and government.
    pub fn matches(&self, allegiance: &str, government: &str) -> bool {
        labels_match(&self.superpower, allegiance) && labels_match(&self.government, government)
    }
}

/// PowerPlay eligibility profile of a rare good.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerplayProfile {
    #[serde(default)]
    pub eligible_system_types: Vec<PpSystemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Static description of a rare good and where it can be bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RareGood {
    #[serde(rename = "rare")]
    pub name: String,
    #[serde(rename = "system")]
    pub origin_system: String,
    #[serde(rename = "station")]
    pub origin_station: String,
    #[serde(rename = "pad")]
    pub pad_size: PadSize,
    pub sell_hint_ly: f64,
    #[serde(default)]
    pub illegal_in_superpowers: Vec<String>,
    #[serde(default, rename = "illegalInGovs")]
    pub illegal_in_governments: Vec<String>,
    #[serde(default, rename = "illegalInSuperpowerGovs")]
    pub illegal_in_superpower_governments: Vec<SuperpowerGovernment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_star_ls: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_state: Option<String>,
    #[serde(default, rename = "pp")]
    pub powerplay: PowerplayProfile,
}

impl RareGood {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::CatalogValidation {
                message: "rare good name must not be empty".to_string(),
            });
        }
        if self.origin_system.trim().is_empty() {
            return Err(Error::CatalogValidation {
                message: format!("rare good '{}' has no origin system", self.name),
            });
        }
        if !self.sell_hint_ly.is_finite() || self.sell_hint_ly < 0.0 {
            return Err(Error::CatalogValidation {
                message: format!(
                    "rare good '{}' has invalid sellHintLy {}",
                    self.name, self.sell_hint_ly
                ),
            });
        }
        Ok(())
    }
}

/// Ordered collection of rare goods with case-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct RareCatalog {
    goods: Vec<RareGood>,
    index: HashMap<String, usize>,
}

impl RareCatalog {
    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        debug!(path = %path.display(), goods = catalog.len(), "loaded rare goods catalog");
        Ok(catalog)
    }

    /// Load a catalog from a reader producing a JSON array.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let goods: Vec<RareGood> =
            serde_json::from_reader(reader).map_err(|err| Error::CatalogValidation {
                message: err.to_string(),
            })?;
        Self::from_goods(goods)
    }

    /// Build a catalog from already-parsed goods, validating each entry.
    pub fn from_goods(goods: Vec<RareGood>) -> Result<Self> {
        let mut index = HashMap::with_capacity(goods.len());
        for (position, good) in goods.iter().enumerate() {
            good.validate()?;
            let key = normalize_rare_name(&good.name);
            if index.insert(key.clone(), position).is_some() {
                return Err(Error::DuplicateRare { name: key });
            }
        }
        Ok(Self { goods, index })
    }

    /// Get a rare good by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&RareGood> {
        self.index
            .get(&normalize_rare_name(name))
            .map(|&position| &self.goods[position])
    }

    /// All goods in catalog order.
    pub fn goods(&self) -> &[RareGood] {
        &self.goods
    }

    /// Rare good names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.goods.iter().map(|good| good.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.goods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }

    /// Replace legality and price fields with curated values where present.
    ///
    /// Returns the number of goods that received at least one override.
    pub fn apply_curated(&mut self, legality: &CuratedLegality, prices: &CuratedPrices) -> usize {
        let mut touched = 0;
        for good in &mut self.goods {
            let key = normalize_rare_name(&good.name);
            let mut changed = false;

            if let Some(curated) = legality.get(&key) {
                if let Some(superpowers) = &curated.illegal_in_superpowers {
                    good.illegal_in_superpowers = superpowers.clone();
                }
                if let Some(governments) = &curated.illegal_in_governments {
                    good.illegal_in_governments = governments.clone();
                }
                if let Some(pairs) = &curated.illegal_in_superpower_governments {
                    good.illegal_in_superpower_governments = pairs.clone();
                }
                changed = true;
            }

            if let Some(cost) = prices.get(&key).and_then(|curated| curated.cost) {
                good.cost = Some(cost);
                changed = true;
            }

            if changed {
                touched += 1;
            }
        }
        touched
    }
}

/// Curated legality for a single rare good. Absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityOverride {
    #[serde(default)]
    pub illegal_in_superpowers: Option<Vec<String>>,
    #[serde(default, rename = "illegalInGovs")]
    pub illegal_in_governments: Option<Vec<String>>,
    #[serde(default, rename = "illegalInSuperpowerGovs")]
    pub illegal_in_superpower_governments: Option<Vec<SuperpowerGovernment>>,
}

/// Curated baseline price for a single rare good.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOverride {
    #[serde(default)]
    pub cost: Option<u64>,
}

/// Curated legality keyed by normalized rare name.
pub type CuratedLegality = HashMap<String, LegalityOverride>;

/// Curated prices keyed by normalized rare name.
pub type CuratedPrices = HashMap<String, PriceOverride>;

/// Load `curatedLegality.json`; a missing file means no overrides.
pub fn load_curated_legality(path: &Path) -> Result<CuratedLegality> {
    load_curated(path)
}

/// Load `curatedPrices.json`; a missing file means no overrides.
pub fn load_curated_prices(path: &Path) -> Result<CuratedPrices> {
    load_curated(path)
}

fn load_curated<T: serde::de::DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = fs::read_to_string(path)?;
    let raw: HashMap<String, T> = serde_json::from_str(&contents)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (normalize_rare_name(&name), value))
        .collect())
}

/// Normalize a rare good name for case-insensitive lookup.
fn normalize_rare_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive comparison of faction labels.
pub(crate) fn labels_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
