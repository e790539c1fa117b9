use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RelvalError;
use crate::types::Multiple;
use crate::RelvalResult;

const BUILTIN_SECTOR_MULTIPLES: &str = include_str!("../../data/sector_multiples.json");

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Relative-valuation multiples covered by the sector reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MultipleType {
    #[serde(rename = "PE", alias = "P/E")]
    PriceEarnings,
    #[serde(rename = "PB", alias = "P/B")]
    PriceBook,
    #[serde(rename = "PS", alias = "P/S")]
    PriceSales,
    #[serde(rename = "EV_EBITDA", alias = "EV/EBITDA")]
    EvEbitda,
}

impl MultipleType {
    pub const ALL: [MultipleType; 4] = [
        MultipleType::PriceEarnings,
        MultipleType::PriceBook,
        MultipleType::PriceSales,
        MultipleType::EvEbitda,
    ];

    /// Name of the company metric the multiple is applied to.
    pub fn driver_name(&self) -> &'static str {
        match self {
            MultipleType::PriceEarnings => "net income",
            MultipleType::PriceBook => "book value",
            MultipleType::PriceSales => "revenue",
            MultipleType::EvEbitda => "EBITDA",
        }
    }
}

impl std::fmt::Display for MultipleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipleType::PriceEarnings => write!(f, "P/E"),
            MultipleType::PriceBook => write!(f, "P/B"),
            MultipleType::PriceSales => write!(f, "P/S"),
            MultipleType::EvEbitda => write!(f, "EV/EBITDA"),
        }
    }
}

/// Point of the peer distribution a multiple is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    #[serde(alias = "mean")]
    Avg,
    Median,
    High,
    Low,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::Avg,
        Statistic::Median,
        Statistic::High,
        Statistic::Low,
    ];
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statistic::Avg => write!(f, "avg"),
            Statistic::Median => write!(f, "median"),
            Statistic::High => write!(f, "high"),
            Statistic::Low => write!(f, "low"),
        }
    }
}

/// Peer distribution summary for one multiple in one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleStats {
    pub avg: Multiple,
    pub median: Multiple,
    pub high: Multiple,
    pub low: Multiple,
}

impl MultipleStats {
    pub fn get(&self, statistic: Statistic) -> Multiple {
        match statistic {
            Statistic::Avg => self.avg,
            Statistic::Median => self.median,
            Statistic::High => self.high,
            Statistic::Low => self.low,
        }
    }
}

/// Constituents and multiple distributions for one sector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorMultipleProfile {
    pub sector: String,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub multiples: BTreeMap<MultipleType, MultipleStats>,
}

impl SectorMultipleProfile {
    /// Profile returned for a sector missing from the reference table.
    pub fn empty(sector: &str) -> Self {
        SectorMultipleProfile {
            sector: sector.to_string(),
            companies: Vec::new(),
            multiples: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.multiples.is_empty()
    }

    pub fn stats(&self, multiple_type: MultipleType) -> Option<&MultipleStats> {
        self.multiples.get(&multiple_type)
    }
}

#[derive(Deserialize)]
struct ReferenceDataset {
    sectors: Vec<SectorMultipleProfile>,
}

/// Immutable sector -> multiple-distribution lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceMultiples {
    sectors: BTreeMap<String, SectorMultipleProfile>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl ReferenceMultiples {
    pub fn new(profiles: impl IntoIterator<Item = SectorMultipleProfile>) -> Self {
        let sectors = profiles
            .into_iter()
            .map(|p| (p.sector.clone(), p))
            .collect();
        ReferenceMultiples { sectors }
    }

    /// Parse a dataset of the form `{"sectors": [{sector, companies, multiples}, ...]}`.
    pub fn from_json(json: &str) -> RelvalResult<Self> {
        let dataset: ReferenceDataset = serde_json::from_str(json)?;

        for profile in &dataset.sectors {
            if profile.sector.trim().is_empty() {
                return Err(RelvalError::InvalidInput {
                    field: "sector".into(),
                    reason: "Sector name must not be empty".into(),
                });
            }
            for (multiple_type, stats) in &profile.multiples {
                if Statistic::ALL.iter().any(|s| stats.get(*s) < Decimal::ZERO) {
                    return Err(RelvalError::InvalidInput {
                        field: format!("{}.{}", profile.sector, multiple_type),
                        reason: "Reference multiples must not be negative".into(),
                    });
                }
            }
        }

        Ok(Self::new(dataset.sectors))
    }

    /// The bundled sector table.
    pub fn builtin() -> RelvalResult<Self> {
        Self::from_json(BUILTIN_SECTOR_MULTIPLES)
    }

    /// Look up a sector; unknown sectors yield an empty profile.
    pub fn get_sector_multiples(&self, sector: &str) -> SectorMultipleProfile {
        self.sectors
            .get(sector)
            .cloned()
            .unwrap_or_else(|| SectorMultipleProfile::empty(sector))
    }

    pub fn profile(&self, sector: &str) -> Option<&SectorMultipleProfile> {
        self.sectors.get(sector)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_loads_all_sectors() {
        let reference = ReferenceMultiples::builtin().unwrap();
        assert_eq!(reference.len(), 12);
        for sector in reference.sectors() {
            let profile = reference.get_sector_multiples(sector);
            assert_eq!(profile.multiples.len(), 4, "{sector} should carry 4 multiples");
            assert!(!profile.companies.is_empty());
        }
    }

    #[test]
    fn test_builtin_it_software_pe() {
        let reference = ReferenceMultiples::builtin().unwrap();
        let it = reference.get_sector_multiples("IT & Software");
        let pe = it.stats(MultipleType::PriceEarnings).unwrap();
        assert_eq!(pe.avg, dec!(24.5));
        assert_eq!(pe.median, dec!(23.8));
        assert_eq!(pe.high, dec!(28.2));
        assert_eq!(pe.low, dec!(20.1));
        assert_eq!(it.companies[0], "TCS");
    }

    #[test]
    fn test_unknown_sector_is_empty_profile() {
        let reference = ReferenceMultiples::builtin().unwrap();
        let profile = reference.get_sector_multiples("Shipping");
        assert!(profile.is_empty());
        assert_eq!(profile.sector, "Shipping");
        assert!(reference.profile("Shipping").is_none());
    }

    #[test]
    fn test_from_json_accepts_display_keys() {
        let json = r#"{"sectors": [{
            "sector": "Synthetic",
            "multiples": {"P/E": {"avg": 10, "median": 9, "high": 12, "low": 8}}
        }]}"#;
        let reference = ReferenceMultiples::from_json(json).unwrap();
        let profile = reference.get_sector_multiples("Synthetic");
        assert_eq!(
            profile.stats(MultipleType::PriceEarnings).unwrap().get(Statistic::Median),
            dec!(9)
        );
        assert!(profile.companies.is_empty());
    }

    #[test]
    fn test_from_json_rejects_negative_multiple() {
        let json = r#"{"sectors": [{
            "sector": "Broken",
            "multiples": {"PB": {"avg": -1, "median": 1, "high": 2, "low": 0.5}}
        }]}"#;
        assert!(ReferenceMultiples::from_json(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(ReferenceMultiples::from_json("{\"sectors\": 3}").is_err());
    }
}
