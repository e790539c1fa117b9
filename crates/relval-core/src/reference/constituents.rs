use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::RelvalResult;

const BUILTIN_CONSTITUENTS: &str = include_str!("../../data/constituents.json");

/// A listed company and the reference sector it is valued against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
    pub ticker: String,
    pub company: String,
    pub sector: String,
}

#[derive(Deserialize)]
struct ConstituentsDataset {
    constituents: Vec<Constituent>,
}

/// Ticker -> company/sector map for the covered index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Constituents {
    by_ticker: BTreeMap<String, Constituent>,
}

impl Constituents {
    pub fn new(constituents: impl IntoIterator<Item = Constituent>) -> Self {
        let by_ticker = constituents
            .into_iter()
            .map(|c| (c.ticker.clone(), c))
            .collect();
        Constituents { by_ticker }
    }

    pub fn from_json(json: &str) -> RelvalResult<Self> {
        let dataset: ConstituentsDataset = serde_json::from_str(json)?;
        Ok(Self::new(dataset.constituents))
    }

    pub fn builtin() -> RelvalResult<Self> {
        Self::from_json(BUILTIN_CONSTITUENTS)
    }

    pub fn get(&self, ticker: &str) -> Option<&Constituent> {
        self.by_ticker.get(ticker)
    }

    pub fn sector_of(&self, ticker: &str) -> Option<&str> {
        self.by_ticker.get(ticker).map(|c| c.sector.as_str())
    }

    /// Constituents of a sector, ordered by ticker.
    pub fn in_sector<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a Constituent> + 'a {
        self.by_ticker.values().filter(move |c| c.sector == sector)
    }

    /// Distinct sector names, sorted.
    pub fn sectors(&self) -> Vec<&str> {
        let mut sectors: Vec<&str> = self.by_ticker.values().map(|c| c.sector.as_str()).collect();
        sectors.sort_unstable();
        sectors.dedup();
        sectors
    }

    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceMultiples;

    #[test]
    fn test_builtin_lookup() {
        let c = Constituents::builtin().unwrap();
        assert_eq!(c.sector_of("TCS.NS"), Some("IT & Software"));
        assert_eq!(c.get("HDFCBANK.NS").unwrap().company, "HDFC Bank");
        assert_eq!(c.sector_of("UNKNOWN.NS"), None);
    }

    #[test]
    fn test_in_sector_filters() {
        let c = Constituents::builtin().unwrap();
        let it: Vec<&str> = c.in_sector("IT & Software").map(|c| c.ticker.as_str()).collect();
        assert!(it.contains(&"INFY.NS"));
        assert!(c.in_sector("IT & Software").all(|c| c.sector == "IT & Software"));
    }

    #[test]
    fn test_every_constituent_sector_has_reference_multiples() {
        let c = Constituents::builtin().unwrap();
        let reference = ReferenceMultiples::builtin().unwrap();
        for sector in c.sectors() {
            assert!(
                reference.profile(sector).is_some(),
                "no reference multiples for {sector}"
            );
        }
    }
}
