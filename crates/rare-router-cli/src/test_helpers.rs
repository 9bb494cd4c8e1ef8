// Test utilities used across `rare-router-cli` tests.
// Kept under `#[cfg(test)]` so it is not part of the public crate API.
use rare_router_lib::catalog::PowerplayProfile;
use rare_router_lib::powerplay::divisors;
use rare_router_lib::{LegalityDetails, PadSize, PpSystemType, RareGood, ScanLeg, ScanRecord};

/// Lavian Brandy as it appears in the fixture catalog.
pub fn sample_good() -> RareGood {
    RareGood {
        name: "Lavian Brandy".to_string(),
        origin_system: "Lave".to_string(),
        origin_station: "Lave Station".to_string(),
        pad_size: PadSize::Large,
        sell_hint_ly: 140.0,
        illegal_in_superpowers: Vec::new(),
        illegal_in_governments: Vec::new(),
        illegal_in_superpower_governments: Vec::new(),
        distance_to_star_ls: Some(301.0),
        allocation: Some(14),
        cost: Some(6500),
        permit_required: None,
        station_state: None,
        powerplay: PowerplayProfile {
            eligible_system_types: vec![PpSystemType::Acquisition, PpSystemType::Exploit],
            notes: None,
        },
    }
}

/// A legal scan record for `sample_good` under a different name.
pub fn scan_record(name: &str, distance: f64, eligible: bool) -> ScanRecord {
    let good = sample_good();
    ScanRecord {
        rare: name.to_string(),
        origin_system: good.origin_system.clone(),
        origin_station: good.origin_station.clone(),
        pad: good.pad_size,
        sell_hint_ly: good.sell_hint_ly,
        distance_to_star_ls: good.distance_to_star_ls,
        allocation: good.allocation,
        cost: good.cost,
        permit_required: None,
        station_state: None,
        leg: ScanLeg {
            distance_from_current_ly: distance,
        },
        system_not_found: false,
        legal: true,
        legal_reason: "Legal".to_string(),
        legality: LegalityDetails::for_good(&good),
        pp_eligible: eligible,
        cp_divisors: eligible.then(|| divisors(true)),
    }
}
