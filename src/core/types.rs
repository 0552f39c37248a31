use serde::Serialize;

pub const HORIZON_YEARS: usize = 4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchmarkTier {
    Median,
    TopQuartile,
    TopDecile,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRow {
    pub year: u32,
    pub median: f64,
    pub top_quartile: f64,
    pub top_decile: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkTable {
    pub rows: [BenchmarkRow; HORIZON_YEARS],
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RatioEquityYear {
    pub base_equity: f64,
    pub min_equity: f64,
    pub max_equity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MedianRatioEquity {
    pub years: Vec<RatioEquityYear>,
    pub median_ratio: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EquityTiers {
    pub minimum: f64,
    pub median: f64,
    pub top_quartile: f64,
    pub top_decile: f64,
    pub maximum: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GrowthRates {
    pub min_to_median: f64,
    pub median_to_top_quartile: f64,
    pub top_quartile_to_top_decile: f64,
    pub above_top_decile: f64,
}

impl Default for GrowthRates {
    fn default() -> Self {
        Self {
            min_to_median: 1.0,
            median_to_top_quartile: 1.0,
            top_quartile_to_top_decile: 1.0,
            above_top_decile: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FourTierEquity {
    pub years: Vec<EquityTiers>,
    pub growth: GrowthRates,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EquityModel {
    MedianRatio(MedianRatioEquity),
    FourTier(FourTierEquity),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BonusModel {
    Logarithmic,
    Proportional {
        target: BenchmarkTier,
    },
    BasePlusExcess {
        target: BenchmarkTier,
        excess_bonus_percentage: f64,
        free_cash_flow_percentage: f64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SalaryConfig {
    pub initial_base_salary: f64,
    // fraction, 0.10 for 10 %
    pub annual_increase_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BonusConfig {
    pub base_percentage: f64,
    pub joining_bonus: f64,
    pub model: BonusModel,
}

// Money in lakhs, revenue in millions of USD.
#[derive(Clone, Debug, PartialEq)]
pub struct CompensationParams {
    pub exchange_rate: f64,
    pub salary: SalaryConfig,
    pub bonus: BonusConfig,
    pub equity: EquityModel,
    pub benchmarks: BenchmarkTable,
    pub actual_revenue: [f64; HORIZON_YEARS],
}

#[derive(Copy, Clone, Debug)]
pub struct YearContext<'a> {
    pub year: u32,
    pub benchmark: &'a BenchmarkRow,
    pub base_salary: f64,
    pub exchange_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedYear {
    pub base_salary: f64,
    pub equity_pct: f64,
    pub gross_bonus: f64,
    pub cash_bonus: f64,
    pub total_comp: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComp {
    pub revenue: f64,
    pub equity_pct: f64,
    pub cash_bonus: f64,
    pub total_comp: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearResult {
    pub year: u32,
    pub actual_revenue: f64,
    pub base_salary: f64,
    pub equity_pct: f64,
    pub cash_bonus: f64,
    pub total_comp: f64,
    pub median: ScenarioComp,
    pub top_quartile: ScenarioComp,
    pub top_decile: ScenarioComp,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioTotals {
    pub actual_revenue: f64,
    pub base_salary: f64,
    pub equity_pct: f64,
    pub cash_bonus: f64,
    pub total_comp: f64,
    pub median: ScenarioComp,
    pub top_quartile: ScenarioComp,
    pub top_decile: ScenarioComp,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioTable {
    pub years: Vec<YearResult>,
    pub total: ScenarioTotals,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub year: u32,
    pub actual: f64,
    pub median: f64,
    pub top_quartile: f64,
    pub top_decile: f64,
}
