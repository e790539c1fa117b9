pub mod sector;
pub mod weighted;

pub use sector::{
    aggregate_sector, aggregate_sectors, calculate_sector_analysis, rank_sectors,
    SectorAnalysisInput, SectorAnalysisOutput, SectorMetrics, SectorRanking,
};
pub use weighted::{
    calculate_portfolio_metrics, Holding, PortfolioAggregator, PortfolioInput, PortfolioMetric,
    PortfolioMetricsOutput, StockRecord, WeightedMetric,
};
