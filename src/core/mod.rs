mod benchmarks;
mod bonus;
mod engine;
mod equity;
mod error;
mod types;

pub use bonus::{musd_to_lakhs, target_bonus};
pub use engine::{compose, compute_year, revenue_chart_series, run_scenarios};
pub use equity::interpolate;
pub use error::{CompResult, CompensationError};
pub use types::{
    BenchmarkRow, BenchmarkTable, BenchmarkTier, BonusConfig, BonusModel, ComposedYear,
    CompensationParams, EquityModel, EquityTiers, FourTierEquity, GrowthRates, HORIZON_YEARS,
    MedianRatioEquity, RatioEquityYear, RevenuePoint, SalaryConfig, ScenarioComp, ScenarioTable,
    ScenarioTotals, YearContext, YearResult,
};
