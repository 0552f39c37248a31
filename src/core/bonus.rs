use super::equity::log3;
use super::error::{CompResult, CompensationError};
use super::types::{BenchmarkTier, BonusConfig, BonusModel, YearContext};

const USD_PER_MILLION: f64 = 1_000_000.0;
const UNITS_PER_LAKH: f64 = 100_000.0;

pub fn target_bonus(base_salary: f64, base_percentage: f64) -> f64 {
    base_salary * (base_percentage / 100.0)
}

pub fn musd_to_lakhs(musd: f64, exchange_rate: f64) -> f64 {
    musd * exchange_rate * USD_PER_MILLION / UNITS_PER_LAKH
}

impl BonusConfig {
    pub fn gross_bonus(&self, performance: f64, ctx: &YearContext<'_>) -> CompResult<f64> {
        let target = target_bonus(ctx.base_salary, self.base_percentage);
        self.model.bonus(performance, target, ctx)
    }
}

impl BonusModel {
    pub fn bonus(&self, performance: f64, target: f64, ctx: &YearContext<'_>) -> CompResult<f64> {
        match *self {
            BonusModel::Logarithmic => {
                if !performance.is_finite() || performance <= 0.0 {
                    return Err(CompensationError::InvalidPerformance {
                        year: ctx.year,
                        performance,
                        reason: "logarithmic bonus requires revenue > 0",
                    });
                }
                // Not floored: revenue below a third of the top quartile pays a negative bonus.
                Ok(target * (log3(performance / ctx.benchmark.top_quartile) + 1.0))
            }
            BonusModel::Proportional { target: tier } => {
                check_non_negative(performance, ctx)?;
                Ok(performance / ctx.benchmark.threshold(tier) * target)
            }
            BonusModel::BasePlusExcess {
                target: tier,
                excess_bonus_percentage,
                free_cash_flow_percentage,
            } => {
                check_non_negative(performance, ctx)?;
                let excess = (performance - ctx.benchmark.threshold(tier)).max(0.0);
                let share = (free_cash_flow_percentage / 100.0) * (excess_bonus_percentage / 100.0);
                Ok(target + musd_to_lakhs(excess * share, ctx.exchange_rate))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BonusModel::Logarithmic => "logarithmic",
            BonusModel::Proportional { .. } => "proportional",
            BonusModel::BasePlusExcess { .. } => "base-plus-excess",
        }
    }

    pub fn target_tier(&self) -> BenchmarkTier {
        match *self {
            BonusModel::Logarithmic => BenchmarkTier::TopQuartile,
            BonusModel::Proportional { target } | BonusModel::BasePlusExcess { target, .. } => {
                target
            }
        }
    }
}

fn check_non_negative(performance: f64, ctx: &YearContext<'_>) -> CompResult<()> {
    if !performance.is_finite() || performance < 0.0 {
        return Err(CompensationError::InvalidPerformance {
            year: ctx.year,
            performance,
            reason: "bonus requires revenue >= 0",
        });
    }
    Ok(())
}
