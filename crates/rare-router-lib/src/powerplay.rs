//! PowerPlay contribution point (CP) rules for rare goods.
//!
//! Rare goods count as profit-based trade, which only generates CP in
//! acquisition and exploit systems. That restriction is a game rule and
//! applies before any per-good eligibility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::RareGood;

/// Base CP divisor: credits of profit per contribution point.
pub const BASE_CP_DIVISOR: u32 = 5333;

/// CP divisor when the commander's power has the finance ethos.
pub const FINANCE_ETHOS_CP_DIVISOR: u32 = 3555;

/// PowerPlay classification of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PpSystemType {
    Acquisition,
    Exploit,
    Reinforcement,
    #[default]
    None,
}

impl PpSystemType {
    /// Whether profit-based trade generates CP in this system type.
    pub fn generates_profit_cp(self) -> bool {
        matches!(self, PpSystemType::Acquisition | PpSystemType::Exploit)
    }
}

impl fmt::Display for PpSystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PpSystemType::Acquisition => "acquisition",
            PpSystemType::Exploit => "exploit",
            PpSystemType::Reinforcement => "reinforcement",
            PpSystemType::None => "none",
        };
        f.write_str(value)
    }
}

impl FromStr for PpSystemType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acquisition" => Ok(PpSystemType::Acquisition),
            "exploit" => Ok(PpSystemType::Exploit),
            "reinforcement" => Ok(PpSystemType::Reinforcement),
            "none" | "" => Ok(PpSystemType::None),
            other => Err(format!(
                "unknown system type '{other}' (expected acquisition, exploit, reinforcement or none)"
            )),
        }
    }
}

/// CP divisors applicable to a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpDivisors {
    pub divisor: u32,
    pub divisor_with_finance_ethos: u32,
    pub effective: u32,
}

impl CpDivisors {
    /// Contribution points earned for a given profit in credits.
    pub fn contribution_points(&self, profit: f64) -> f64 {
        profit / f64::from(self.effective)
    }
}

/// Returns true if `good` can generate CP in a system of `system_type`.
pub fn is_eligible(good: &RareGood, system_type: PpSystemType) -> bool {
    if !system_type.generates_profit_cp() {
        return false;
    }
    good.powerplay.eligible_system_types.contains(&system_type)
}

/// CP divisors for a commander with or without the finance ethos bonus.
pub fn divisors(has_finance_ethos: bool) -> CpDivisors {
    CpDivisors {
        divisor: BASE_CP_DIVISOR,
        divisor_with_finance_ethos: FINANCE_ETHOS_CP_DIVISOR,
        effective: if has_finance_ethos {
            FINANCE_ETHOS_CP_DIVISOR
        } else {
            BASE_CP_DIVISOR
        },
    }
}
