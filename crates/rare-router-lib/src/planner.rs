//! Scan and analyze evaluation over the rare goods catalog.
//!
//! Both modes resolve their anchor systems first and fail with
//! [`Error::UnresolvedSystem`] if that is impossible. Each good is then
//! evaluated independently; origins that cannot be resolved are flagged with
//! `systemNotFound` rather than failing the request. Records come back in
//! catalog order.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{Resolution, SystemResolver};
use crate::catalog::{PadSize, RareCatalog, RareGood};
use crate::error::{Error, Result, SystemSide};
use crate::legality::{self, LegalityDetails, LegalityResult};
use crate::powerplay::{self, CpDivisors, PpSystemType};
use crate::system::ResolvedSystem;

/// Reason reported for goods whose origin system could not be resolved.
pub const ORIGIN_NOT_FOUND: &str = "origin system not found";

/// Default number of goods evaluated concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

const MAX_SUGGESTIONS: usize = 3;

/// Scan request: every good as seen from the current system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub current: String,
    #[serde(default, alias = "currentPpType")]
    pub system_type: PpSystemType,
    #[serde(default)]
    pub has_finance_ethos: bool,
}

/// Analyze request: every good carried from its origin to a target system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub current: String,
    pub target: String,
    #[serde(default, alias = "targetPpType")]
    pub system_type: PpSystemType,
    #[serde(default)]
    pub has_finance_ethos: bool,
}

/// Distance from the current system to a good's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLeg {
    pub distance_from_current_ly: f64,
}

/// Distances for a current -> origin -> target trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeLeg {
    pub distance_current_to_origin_ly: f64,
    pub distance_origin_to_target_ly: f64,
    /// Origin to target is at least the good's sell hint (inclusive).
    pub in_profit_range: bool,
}

/// One evaluated rare good. `L` carries the mode-specific distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RareRecord<L> {
    pub rare: String,
    pub origin_system: String,
    pub origin_station: String,
    pub pad: PadSize,
    pub sell_hint_ly: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_star_ls: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_state: Option<String>,
    #[serde(flatten)]
    pub leg: L,
    /// Distances are 0 because the origin has no known coordinates.
    pub system_not_found: bool,
    pub legal: bool,
    pub legal_reason: String,
    pub legality: LegalityDetails,
    pub pp_eligible: bool,
    /// Present only when `pp_eligible`.
    pub cp_divisors: Option<CpDivisors>,
}

pub type ScanRecord = RareRecord<ScanLeg>;
pub type AnalyzeRecord = RareRecord<AnalyzeLeg>;

impl<L> RareRecord<L> {
    fn new(
        good: &RareGood,
        leg: L,
        system_not_found: bool,
        legality: LegalityResult,
        pp_eligible: bool,
        cp_divisors: Option<CpDivisors>,
    ) -> Self {
        Self {
            rare: good.name.clone(),
            origin_system: good.origin_system.clone(),
            origin_station: good.origin_station.clone(),
            pad: good.pad_size,
            sell_hint_ly: good.sell_hint_ly,
            distance_to_star_ls: good.distance_to_star_ls,
            allocation: good.allocation,
            cost: good.cost,
            permit_required: good.permit_required,
            station_state: good.station_state.clone(),
            leg,
            system_not_found,
            legal: legality.legal,
            legal_reason: legality.reason,
            legality: legality.details,
            pp_eligible,
            cp_divisors,
        }
    }

    fn origin_not_found(good: &RareGood, leg: L) -> Self {
        Self::new(
            good,
            leg,
            true,
            legality::assumed_legal(good, ORIGIN_NOT_FOUND),
            false,
            None,
        )
    }
}

/// Evaluates the catalog against resolved systems.
pub struct RouteEvaluator {
    catalog: Arc<RareCatalog>,
    resolver: Arc<SystemResolver>,
    max_concurrency: usize,
}

impl RouteEvaluator {
    pub fn new(catalog: Arc<RareCatalog>, resolver: Arc<SystemResolver>) -> Self {
        Self {
            catalog,
            resolver,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Limit how many goods are evaluated at once (minimum 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn catalog(&self) -> &RareCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &SystemResolver {
        &self.resolver
    }

    /// Evaluate every good against the current system.
    pub async fn scan(&self, request: &ScanRequest) -> Result<Vec<ScanRecord>> {
        let current = self
            .resolve_anchor(&request.current, SystemSide::Current)
            .await?;

        let records: Vec<ScanRecord> = stream::iter(self.catalog.goods())
            .map(|good| self.scan_good(good, &current, request))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        info!(
            current = %current.name,
            rares = records.len(),
            not_found = records.iter().filter(|r| r.system_not_found).count(),
            "scan complete"
        );
        Ok(records)
    }

    /// Evaluate every good for a trip from its origin to the target system.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<Vec<AnalyzeRecord>> {
        let (current, target) = tokio::join!(
            self.resolve_anchor(&request.current, SystemSide::Current),
            self.resolve_anchor(&request.target, SystemSide::Target),
        );
        let current = current?;
        let target = target?;

        let records: Vec<AnalyzeRecord> = stream::iter(self.catalog.goods())
            .map(|good| self.analyze_good(good, &current, &target, request))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        info!(
            current = %current.name,
            target = %target.name,
            rares = records.len(),
            in_range = records.iter().filter(|r| r.leg.in_profit_range).count(),
            "analyze complete"
        );
        Ok(records)
    }

    async fn scan_good(
        &self,
        good: &RareGood,
        current: &ResolvedSystem,
        request: &ScanRequest,
    ) -> ScanRecord {
        let Some(origin) = self.resolve_origin(good).await else {
            return RareRecord::origin_not_found(
                good,
                ScanLeg {
                    distance_from_current_ly: 0.0,
                },
            );
        };

        let leg = ScanLeg {
            distance_from_current_ly: current.coords.distance_to(&origin.coords),
        };
        let eligible = powerplay::is_eligible(good, request.system_type);
        RareRecord::new(
            good,
            leg,
            false,
            legality::evaluate(good, current),
            eligible,
            eligible.then(|| powerplay::divisors(request.has_finance_ethos)),
        )
    }

    async fn analyze_good(
        &self,
        good: &RareGood,
        current: &ResolvedSystem,
        target: &ResolvedSystem,
        request: &AnalyzeRequest,
    ) -> AnalyzeRecord {
        let Some(origin) = self.resolve_origin(good).await else {
            return RareRecord::origin_not_found(
                good,
                AnalyzeLeg {
                    distance_current_to_origin_ly: 0.0,
                    distance_origin_to_target_ly: 0.0,
                    in_profit_range: false,
                },
            );
        };

        let to_target = origin.coords.distance_to(&target.coords);
        let leg = AnalyzeLeg {
            distance_current_to_origin_ly: current.coords.distance_to(&origin.coords),
            distance_origin_to_target_ly: to_target,
            in_profit_range: to_target >= good.sell_hint_ly,
        };
        let eligible = powerplay::is_eligible(good, request.system_type);
        RareRecord::new(
            good,
            leg,
            false,
            legality::evaluate(good, target),
            eligible,
            eligible.then(|| powerplay::divisors(request.has_finance_ethos)),
        )
    }

    async fn resolve_origin(&self, good: &RareGood) -> Option<ResolvedSystem> {
        let system = self
            .resolver
            .resolve_exact(&good.origin_system)
            .await
            .into_system();
        if system.is_none() {
            warn!(
                rare = %good.name,
                system = %good.origin_system,
                "could not find coordinates for rare origin system"
            );
        }
        system
    }

    async fn resolve_anchor(&self, name: &str, side: SystemSide) -> Result<ResolvedSystem> {
        match self.resolver.resolve_exact(name).await {
            Resolution::Found(system) => Ok(system),
            Resolution::NotFound | Resolution::Unavailable { .. } => {
                Err(Error::UnresolvedSystem {
                    side,
                    name: name.trim().to_string(),
                    suggestions: self.resolver.suggest_names(name, MAX_SUGGESTIONS).await,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheSettings;
    use crate::coords::Coordinates;
    use crate::directory::InMemoryDirectory;
    use crate::test_helpers::{system_at, RareGoodBuilder};

    async fn evaluator(
        goods: Vec<RareGood>,
        systems: Vec<ResolvedSystem>,
    ) -> (RouteEvaluator, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new(systems));
        let resolver = SystemResolver::open(directory.clone(), CacheSettings::default()).await;
        let catalog = RareCatalog::from_goods(goods).expect("catalog");
        (
            RouteEvaluator::new(Arc::new(catalog), Arc::new(resolver)),
            directory,
        )
    }

    #[tokio::test]
    async fn unresolved_origin_is_flagged_not_fatal() {
        let goods = vec![
            RareGoodBuilder::new("Lost Cargo", "Nowhere").build(),
            RareGoodBuilder::new("Lavian Brandy", "Lave")
                .eligible_in(&[PpSystemType::Exploit])
                .build(),
        ];
        let systems = vec![
            system_at("Sol", (0.0, 0.0, 0.0), Some("Federation"), Some("Democracy")),
            system_at("Lave", (0.0, 3.0, 4.0), None, None),
        ];
        let (evaluator, _) = evaluator(goods, systems).await;

        let records = evaluator
            .scan(&ScanRequest {
                current: "Sol".to_string(),
                system_type: PpSystemType::Exploit,
                has_finance_ethos: true,
            })
            .await
            .expect("scan");

        assert_eq!(records.len(), 2);
        let lost = &records[0];
        assert!(lost.system_not_found);
        assert_eq!(lost.leg.distance_from_current_ly, 0.0);
        assert!(lost.legal);
        assert_eq!(lost.legal_reason, ORIGIN_NOT_FOUND);
        assert!(!lost.pp_eligible);
        assert!(lost.cp_divisors.is_none());

        let brandy = &records[1];
        assert!(!brandy.system_not_found);
        assert_eq!(brandy.leg.distance_from_current_ly, 5.0);
        assert_eq!(brandy.cp_divisors.map(|d| d.effective), Some(3555));
    }

    #[tokio::test]
    async fn unresolved_target_names_the_target_side() {
        let goods = vec![RareGoodBuilder::new("Lavian Brandy", "Lave").build()];
        let systems = vec![
            system_at("Sol", (0.0, 0.0, 0.0), None, None),
            system_at("Lave", (75.75, 48.75, 70.75), None, None),
        ];
        let (evaluator, _) = evaluator(goods, systems).await;

        let err = evaluator
            .analyze(&AnalyzeRequest {
                current: "Sol".to_string(),
                target: "Lavee".to_string(),
                system_type: PpSystemType::None,
                has_finance_ethos: false,
            })
            .await
            .unwrap_err();

        match err {
            Error::UnresolvedSystem {
                side,
                name,
                suggestions,
            } => {
                assert_eq!(side, SystemSide::Target);
                assert_eq!(name, "Lavee");
                assert_eq!(suggestions, vec!["Lave".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn analyze_evaluates_legality_at_target() {
        let goods = vec![RareGoodBuilder::new("Onionhead", "Kappa Fornacis")
            .sell_hint(10.0)
            .illegal_in_superpower("Empire")
            .build()];
        let systems = vec![
            system_at("Sol", (0.0, 0.0, 0.0), Some("Federation"), Some("Democracy")),
            ResolvedSystem::new("Kappa Fornacis", Coordinates::new(10.0, 0.0, 0.0)),
            system_at("Achenar", (10.0, 0.0, 9.0), Some("Empire"), Some("Dictatorship")),
        ];
        let (evaluator, _) = evaluator(goods, systems).await;

        let records = evaluator
            .analyze(&AnalyzeRequest {
                current: "Sol".to_string(),
                target: "Achenar".to_string(),
                system_type: PpSystemType::Reinforcement,
                has_finance_ethos: false,
            })
            .await
            .expect("analyze");

        let record = &records[0];
        assert_eq!(record.leg.distance_current_to_origin_ly, 10.0);
        assert_eq!(record.leg.distance_origin_to_target_ly, 9.0);
        assert!(!record.leg.in_profit_range);
        assert!(!record.legal);
        assert_eq!(record.legal_reason, "Illegal in Empire systems");
        assert!(!record.pp_eligible);
    }

    #[tokio::test]
    async fn records_serialize_with_flattened_leg() {
        let goods = vec![RareGoodBuilder::new("Lavian Brandy", "Lave").build()];
        let systems = vec![
            system_at("Sol", (0.0, 0.0, 0.0), None, None),
            system_at("Lave", (0.0, 3.0, 4.0), None, None),
        ];
        let (evaluator, _) = evaluator(goods, systems).await;
        let records = evaluator
            .scan(&ScanRequest {
                current: "sol".to_string(),
                system_type: PpSystemType::None,
                has_finance_ethos: false,
            })
            .await
            .expect("scan");

        let json = serde_json::to_value(&records[0]).expect("json");
        assert_eq!(json["rare"], "Lavian Brandy");
        assert_eq!(json["distanceFromCurrentLy"], 5.0);
        assert_eq!(json["systemNotFound"], false);
        assert_eq!(json["pad"], "L");
        assert!(json["cpDivisors"].is_null());
        assert!(json.get("cost").is_none());
    }

    #[test]
    fn requests_accept_original_field_names() {
        let request: ScanRequest = serde_json::from_str(
            r#"{"current": "Sol", "currentPpType": "acquisition", "hasFinanceEthos": true}"#,
        )
        .expect("parse");
        assert_eq!(request.system_type, PpSystemType::Acquisition);
        assert!(request.has_finance_ethos);
    }
}
