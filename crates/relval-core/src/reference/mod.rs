//! Read-only reference data: sector multiple distributions and the
//! ticker-to-sector constituents map.
//!
//! Both datasets are plain values handed to the computations that need them;
//! the bundled copies are compiled in from `data/` and can be replaced by any
//! caller-supplied JSON of the same shape.

pub mod constituents;
pub mod sector_multiples;

pub use constituents::{Constituent, Constituents};
pub use sector_multiples::{
    MultipleStats, MultipleType, ReferenceMultiples, SectorMultipleProfile, Statistic,
};
