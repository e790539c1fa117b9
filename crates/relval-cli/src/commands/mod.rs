pub mod health;
pub mod portfolio;
pub mod reference;
pub mod risk;
pub mod signal;
pub mod valuation;
