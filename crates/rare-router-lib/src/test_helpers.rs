// Test-only helpers for `rare-router-lib` tests
#![allow(dead_code)]
use crate::catalog::{PadSize, PowerplayProfile, RareGood, SuperpowerGovernment};
use crate::coords::Coordinates;
use crate::powerplay::PpSystemType;
use crate::system::ResolvedSystem;

/// Builder to create `RareGood` instances in tests with sensible defaults.
pub struct RareGoodBuilder {
    good: RareGood,
}

impl RareGoodBuilder {
    #[must_use]
    pub fn new(name: &str, origin_system: &str) -> Self {
        Self {
            good: RareGood {
                name: name.to_string(),
                origin_system: origin_system.to_string(),
                origin_station: format!("{origin_system} Station"),
                pad_size: PadSize::Large,
                sell_hint_ly: 150.0,
                illegal_in_superpowers: Vec::new(),
                illegal_in_governments: Vec::new(),
                illegal_in_superpower_governments: Vec::new(),
                distance_to_star_ls: None,
                allocation: None,
                cost: None,
                permit_required: None,
                station_state: None,
                powerplay: PowerplayProfile::default(),
            },
        }
    }

    pub fn sell_hint(mut self, ly: f64) -> Self {
        self.good.sell_hint_ly = ly;
        self
    }

    pub fn illegal_in_superpower(mut self, superpower: &str) -> Self {
        self.good.illegal_in_superpowers.push(superpower.to_string());
        self
    }

    pub fn illegal_in_government(mut self, government: &str) -> Self {
        self.good.illegal_in_governments.push(government.to_string());
        self
    }

    pub fn illegal_in_pair(mut self, superpower: &str, government: &str) -> Self {
        self.good
            .illegal_in_superpower_governments
            .push(SuperpowerGovernment::new(superpower, government));
        self
    }

    pub fn eligible_in(mut self, types: &[PpSystemType]) -> Self {
        self.good.powerplay.eligible_system_types = types.to_vec();
        self
    }

    #[must_use]
    pub fn build(self) -> RareGood {
        self.good
    }
}

impl Default for RareGoodBuilder {
    fn default() -> Self {
        Self::new("Lavian Brandy", "Lave")
    }
}

/// A system at the given coordinates with optional faction labels.
pub fn system_at(
    name: &str,
    (x, y, z): (f64, f64, f64),
    allegiance: Option<&str>,
    government: Option<&str>,
) -> ResolvedSystem {
    ResolvedSystem {
        name: name.to_string(),
        coords: Coordinates::new(x, y, z),
        allegiance: allegiance.map(str::to_string),
        government: government.map(str::to_string),
    }
}
