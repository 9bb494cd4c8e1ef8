//! Rare router library entry points.
//!
//! This crate resolves star systems through a cached directory, evaluates rare
//! goods for legality and PowerPlay eligibility, and assembles per-good scan
//! and analyze records. Front ends (the CLI today) should depend on the items
//! exported here instead of reimplementing the rules.
//!

#![deny(warnings)]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod coords;
pub mod directory;
pub mod error;
pub mod fuzzy;
pub mod legality;
pub mod planner;
pub mod powerplay;
pub mod system;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cache::{CacheSettings, CacheStatus, Resolution, SystemResolver};
pub use catalog::{
    load_curated_legality, load_curated_prices, PadSize, RareCatalog, RareGood,
    SuperpowerGovernment,
};
pub use config::RouterConfig;
pub use coords::{distance, Coordinates};
pub use directory::{EdsmClient, InMemoryDirectory, LookupError, SystemDirectory};
pub use error::{format_suggestions, Error, Result, SystemSide};
pub use legality::{evaluate as evaluate_legality, LegalityDetails, LegalityResult};
pub use planner::{
    AnalyzeLeg, AnalyzeRecord, AnalyzeRequest, RareRecord, RouteEvaluator, ScanLeg, ScanRecord,
    ScanRequest,
};
pub use powerplay::{CpDivisors, PpSystemType};
pub use system::ResolvedSystem;
