//! Tiered legality rules for rare goods.
//!
//! A good is checked against a system's allegiance and government with the
//! most specific rule first:
//!
//! 1. no allegiance and no government known: assume legal
//! 2. combined superpower + government restriction
//! 3. government-only restriction
//! 4. superpower-only restriction
//! 5. otherwise legal
//!
//! The [`LegalityDetails`] attached to every result depend only on the good,
//! so callers can show why a good is restricted before picking a system.

use serde::Serialize;

use crate::catalog::{labels_match, RareGood, SuperpowerGovernment};
use crate::system::ResolvedSystem;

/// Superpowers a system can be aligned with.
pub const SUPERPOWERS: [&str; 4] = ["Federation", "Empire", "Alliance", "Independent"];

/// Every government type a controlling faction can have.
pub const GOVERNMENTS: [&str; 12] = [
    "Anarchy",
    "Communism",
    "Confederacy",
    "Cooperative",
    "Corporate",
    "Democracy",
    "Dictatorship",
    "Feudal",
    "Patronage",
    "Prison",
    "Prison Colony",
    "Theocracy",
];

/// Restriction profile of a good, independent of any system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityDetails {
    pub superpower_restrictions: Vec<String>,
    pub illegal_governments: Vec<String>,
    pub combined_restrictions: Vec<SuperpowerGovernment>,
    pub legal_governments: Vec<String>,
    pub explanation: String,
}

impl LegalityDetails {
    /// Derive the restriction summary for a good.
    pub fn for_good(good: &RareGood) -> Self {
        let legal_governments = GOVERNMENTS
            .iter()
            .filter(|gov| {
                !good
                    .illegal_in_governments
                    .iter()
                    .any(|illegal| labels_match(illegal, gov))
            })
            .map(|gov| gov.to_string())
            .collect();

        Self {
            superpower_restrictions: good.illegal_in_superpowers.clone(),
            illegal_governments: good.illegal_in_governments.clone(),
            combined_restrictions: good.illegal_in_superpower_governments.clone(),
            legal_governments,
            explanation: explain(good),
        }
    }
}

/// Outcome of evaluating a good against a system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegalityResult {
    pub legal: bool,
    pub reason: String,
    pub details: LegalityDetails,
}

/// Evaluate whether `good` is legal in `system`.
pub fn evaluate(good: &RareGood, system: &ResolvedSystem) -> LegalityResult {
    let details = LegalityDetails::for_good(good);
    let allegiance = system.allegiance.as_deref();
    let government = system.government.as_deref();

    let (legal, reason) = match (allegiance, government) {
        (None, None) => (
            true,
            "Insufficient system information; assuming legal".to_string(),
        ),
        _ => {
            if let (Some(allegiance), Some(government)) = (allegiance, government) {
                if good
                    .illegal_in_superpower_governments
                    .iter()
                    .any(|pair| pair.matches(allegiance, government))
                {
                    return LegalityResult {
                        legal: false,
                        reason: format!("Illegal in {allegiance} {government} systems"),
                        details,
                    };
                }
            }

            if let Some(government) = government.filter(|gov| {
                good.illegal_in_governments
                    .iter()
                    .any(|illegal| labels_match(illegal, gov))
            }) {
                (false, format!("Illegal in {government} governments"))
            } else if let Some(allegiance) = allegiance.filter(|sp| {
                good.illegal_in_superpowers
                    .iter()
                    .any(|illegal| labels_match(illegal, sp))
            }) {
                (false, format!("Illegal in {allegiance} systems"))
            } else {
                (true, "Legal".to_string())
            }
        }
    };

    LegalityResult {
        legal,
        reason,
        details,
    }
}

/// Legal outcome used when the evaluated system could not be resolved.
pub fn assumed_legal(good: &RareGood, reason: impl Into<String>) -> LegalityResult {
    LegalityResult {
        legal: true,
        reason: reason.into(),
        details: LegalityDetails::for_good(good),
    }
}

fn explain(good: &RareGood) -> String {
    let mut parts = Vec::new();

    if !good.illegal_in_superpower_governments.is_empty() {
        let pairs = good
            .illegal_in_superpower_governments
            .iter()
            .map(|pair| format!("{} {}", pair.superpower, pair.government))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Illegal in {pairs} systems"));
    }
    if !good.illegal_in_governments.is_empty() {
        parts.push(format!(
            "Illegal under {} governments in any superpower",
            good.illegal_in_governments.join(", ")
        ));
    }
    if !good.illegal_in_superpowers.is_empty() {
        parts.push(format!(
            "Illegal in all {} systems",
            good.illegal_in_superpowers.join(", ")
        ));
    }

    if parts.is_empty() {
        "Legal in all systems.".to_string()
    } else {
        format!("{}.", parts.join(". "))
    }
}
