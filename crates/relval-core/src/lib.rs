pub mod error;
pub mod reference;
pub mod stats;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "signal")]
pub mod signal;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "portfolio")]
pub mod portfolio;

#[cfg(feature = "health")]
pub mod health;

pub use error::RelvalError;
pub use types::*;

/// Standard result type for all relval operations
pub type RelvalResult<T> = Result<T, RelvalError>;
