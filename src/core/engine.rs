use tracing::debug;

use super::benchmarks::year_index;
use super::error::{CompResult, CompensationError};
use super::types::{
    BenchmarkRow, BenchmarkTier, BonusConfig, ComposedYear, CompensationParams, EquityModel,
    HORIZON_YEARS, RevenuePoint, SalaryConfig, ScenarioComp, ScenarioTable, ScenarioTotals,
    YearContext, YearResult,
};

impl SalaryConfig {
    pub fn base_salary_for_year(&self, year: u32) -> f64 {
        let years_of_growth = f64::from(year.saturating_sub(1));
        self.initial_base_salary * (1.0 + self.annual_increase_rate).powf(years_of_growth)
    }
}

impl ScenarioComp {
    fn from_composed(revenue: f64, composed: &ComposedYear) -> Self {
        Self {
            revenue,
            equity_pct: composed.equity_pct,
            cash_bonus: composed.cash_bonus,
            total_comp: composed.total_comp,
        }
    }

    fn accumulate(&mut self, other: &ScenarioComp) {
        self.revenue += other.revenue;
        self.equity_pct += other.equity_pct;
        self.cash_bonus += other.cash_bonus;
        self.total_comp += other.total_comp;
    }
}

impl ScenarioTotals {
    fn accumulate(&mut self, row: &YearResult) {
        self.actual_revenue += row.actual_revenue;
        self.base_salary += row.base_salary;
        self.equity_pct += row.equity_pct;
        self.cash_bonus += row.cash_bonus;
        self.total_comp += row.total_comp;
        self.median.accumulate(&row.median);
        self.top_quartile.accumulate(&row.top_quartile);
        self.top_decile.accumulate(&row.top_decile);
    }
}

/// In year 1 the joining bonus is an advance against the bonus: it is always
/// paid, and only the part of the computed bonus above it is paid on top.
/// Later years report the model's bonus unfloored.
pub fn compose(
    revenue: f64,
    year: u32,
    row: &BenchmarkRow,
    salary: &SalaryConfig,
    equity: &EquityModel,
    bonus: &BonusConfig,
    exchange_rate: f64,
) -> CompResult<ComposedYear> {
    year_index(year)?;
    if row.year != year {
        return Err(CompensationError::InvalidBenchmark {
            year,
            reason: format!("row is for year {}", row.year),
        });
    }
    row.validate()?;

    let base_salary = salary.base_salary_for_year(year);
    let ctx = YearContext {
        year,
        benchmark: row,
        base_salary,
        exchange_rate,
    };

    let equity_pct = equity.equity(revenue, &ctx)?;
    let gross_bonus = bonus.gross_bonus(revenue, &ctx)?;

    let (cash_bonus, total_comp) = if year == 1 {
        let net_bonus = (gross_bonus - bonus.joining_bonus).max(0.0);
        (net_bonus, base_salary + bonus.joining_bonus + net_bonus)
    } else {
        (gross_bonus, base_salary + gross_bonus)
    };

    debug!(
        year,
        revenue, base_salary, equity_pct, gross_bonus, cash_bonus, total_comp, "composed year"
    );

    Ok(ComposedYear {
        base_salary,
        equity_pct,
        gross_bonus,
        cash_bonus,
        total_comp,
    })
}

pub fn compute_year(
    year: u32,
    actual_revenue: f64,
    params: &CompensationParams,
) -> CompResult<YearResult> {
    let row = params.benchmarks.row(year)?;
    let run = |revenue: f64| {
        compose(
            revenue,
            year,
            row,
            &params.salary,
            &params.equity,
            &params.bonus,
            params.exchange_rate,
        )
    };

    let actual = run(actual_revenue)?;
    let scenario = |tier: BenchmarkTier| -> CompResult<ScenarioComp> {
        let revenue = row.threshold(tier);
        Ok(ScenarioComp::from_composed(revenue, &run(revenue)?))
    };

    Ok(YearResult {
        year,
        actual_revenue,
        base_salary: actual.base_salary,
        equity_pct: actual.equity_pct,
        cash_bonus: actual.cash_bonus,
        total_comp: actual.total_comp,
        median: scenario(BenchmarkTier::Median)?,
        top_quartile: scenario(BenchmarkTier::TopQuartile)?,
        top_decile: scenario(BenchmarkTier::TopDecile)?,
    })
}

pub fn run_scenarios(params: &CompensationParams) -> CompResult<ScenarioTable> {
    let mut years = Vec::with_capacity(HORIZON_YEARS);
    let mut total = ScenarioTotals::default();

    for (idx, &actual_revenue) in params.actual_revenue.iter().enumerate() {
        let row = compute_year(idx as u32 + 1, actual_revenue, params)?;
        total.accumulate(&row);
        years.push(row);
    }

    debug!(
        equity_model = params.equity.name(),
        bonus_model = params.bonus.model.name(),
        total_comp = total.total_comp,
        "scenario run complete"
    );
    Ok(ScenarioTable { years, total })
}

pub fn revenue_chart_series(params: &CompensationParams) -> Vec<RevenuePoint> {
    params
        .benchmarks
        .rows
        .iter()
        .zip(params.actual_revenue)
        .map(|(row, actual)| RevenuePoint {
            year: row.year,
            actual,
            median: row.median,
            top_quartile: row.top_quartile,
            top_decile: row.top_decile,
        })
        .collect()
}
