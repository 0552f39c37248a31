use super::benchmarks::year_index;
use super::error::{CompResult, CompensationError};
use super::types::{
    EquityModel, EquityTiers, FourTierEquity, MedianRatioEquity, RatioEquityYear, YearContext,
};

impl EquityModel {
    pub fn equity(&self, performance: f64, ctx: &YearContext<'_>) -> CompResult<f64> {
        match self {
            EquityModel::MedianRatio(model) => model.equity(performance, ctx),
            EquityModel::FourTier(model) => model.equity(performance, ctx),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EquityModel::MedianRatio(_) => "median-ratio",
            EquityModel::FourTier(_) => "four-tier",
        }
    }
}

impl MedianRatioEquity {
    fn year(&self, year: u32) -> CompResult<&RatioEquityYear> {
        let idx = year_index(year)?;
        self.years.get(idx).ok_or_else(|| {
            CompensationError::InvalidConfig(format!(
                "no median-ratio equity entry for year {year}"
            ))
        })
    }

    // Boundaries belong to the lower branch.
    pub fn equity(&self, performance: f64, ctx: &YearContext<'_>) -> CompResult<f64> {
        if !performance.is_finite() || performance <= 0.0 {
            return Err(CompensationError::InvalidPerformance {
                year: ctx.year,
                performance,
                reason: "median-ratio equity requires revenue > 0",
            });
        }

        let cfg = self.year(ctx.year)?;
        let median = ctx.benchmark.median;
        let top_quartile = ctx.benchmark.top_quartile;
        let median_equity = cfg.base_equity * self.median_ratio;

        let equity = if performance <= median {
            cfg.min_equity.max(median_equity * (performance / median))
        } else if performance <= top_quartile {
            let fraction = (performance - median) / (top_quartile - median);
            median_equity + (cfg.base_equity - median_equity) * fraction
        } else {
            cfg.base_equity * (log3(performance / top_quartile) + 1.0)
        };

        Ok(match cfg.max_equity {
            Some(cap) => equity.min(cap),
            None => equity,
        })
    }
}

impl FourTierEquity {
    fn tiers(&self, year: u32) -> CompResult<&EquityTiers> {
        let idx = year_index(year)?;
        self.years.get(idx).ok_or_else(|| {
            CompensationError::InvalidConfig(format!("no equity tiers configured for year {year}"))
        })
    }

    fn check_growth(&self) -> CompResult<()> {
        for (name, exponent) in [
            ("min-to-median", self.growth.min_to_median),
            ("median-to-top-quartile", self.growth.median_to_top_quartile),
            (
                "top-quartile-to-top-decile",
                self.growth.top_quartile_to_top_decile,
            ),
            ("above-top-decile", self.growth.above_top_decile),
        ] {
            if !exponent.is_finite() || exponent <= 0.0 {
                return Err(CompensationError::InvalidConfig(format!(
                    "{name} growth rate must be > 0, got {exponent}"
                )));
            }
        }
        Ok(())
    }

    // Above the top decile the fraction is not capped, so the result may exceed `maximum`.
    pub fn equity(&self, performance: f64, ctx: &YearContext<'_>) -> CompResult<f64> {
        if !performance.is_finite() || performance < 0.0 {
            return Err(CompensationError::InvalidPerformance {
                year: ctx.year,
                performance,
                reason: "four-tier equity requires revenue >= 0",
            });
        }
        self.check_growth()?;

        let tiers = self.tiers(ctx.year)?;
        let growth = &self.growth;
        let row = ctx.benchmark;

        let equity = if performance <= row.median {
            interpolate(
                tiers.minimum,
                tiers.median,
                performance / row.median,
                growth.min_to_median,
            )
        } else if performance <= row.top_quartile {
            interpolate(
                tiers.median,
                tiers.top_quartile,
                (performance - row.median) / (row.top_quartile - row.median),
                growth.median_to_top_quartile,
            )
        } else if performance <= row.top_decile {
            interpolate(
                tiers.top_quartile,
                tiers.top_decile,
                (performance - row.top_quartile) / (row.top_decile - row.top_quartile),
                growth.top_quartile_to_top_decile,
            )
        } else {
            interpolate(
                tiers.top_decile,
                tiers.maximum,
                (performance - row.top_decile) / row.top_decile,
                growth.above_top_decile,
            )
        };
        Ok(equity)
    }
}

pub fn interpolate(lo: f64, hi: f64, fraction: f64, exponent: f64) -> f64 {
    lo + (hi - lo) * fraction.powf(exponent)
}

pub(crate) fn log3(x: f64) -> f64 {
    x.ln() / 3f64.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BenchmarkRow, GrowthRates};
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    const ROW: BenchmarkRow = BenchmarkRow::new(1, 0.40, 0.75, 1.50);

    fn ctx(row: &BenchmarkRow) -> YearContext<'_> {
        YearContext {
            year: row.year,
            benchmark: row,
            base_salary: 100.0,
            exchange_rate: 83.0,
        }
    }

    fn ratio_model(max_equity: Option<f64>) -> MedianRatioEquity {
        MedianRatioEquity {
            years: vec![
                RatioEquityYear {
                    base_equity: 4.0,
                    min_equity: 2.0,
                    max_equity,
                };
                4
            ],
            median_ratio: 0.8333,
        }
    }

    fn tier_model(growth: GrowthRates) -> FourTierEquity {
        FourTierEquity {
            years: vec![
                EquityTiers {
                    minimum: 1.0,
                    median: 2.5,
                    top_quartile: 4.0,
                    top_decile: 5.0,
                    maximum: 6.0,
                };
                4
            ],
            growth,
        }
    }

    #[test]
    fn median_ratio_hits_base_equity_at_top_quartile() {
        let model = ratio_model(None);
        let equity = model.equity(ROW.top_quartile, &ctx(&ROW)).unwrap();
        assert_approx(equity, 4.0);
    }

    #[test]
    fn median_ratio_is_continuous_at_median() {
        let model = ratio_model(None);
        let at_median = model.equity(ROW.median, &ctx(&ROW)).unwrap();
        assert_approx(at_median, 4.0 * 0.8333);

        let just_above = model.equity(ROW.median + 1e-12, &ctx(&ROW)).unwrap();
        assert!((just_above - at_median).abs() < 1e-6);
    }

    #[test]
    fn median_ratio_floors_below_median_at_min_equity() {
        let model = ratio_model(None);
        let equity = model.equity(0.05, &ctx(&ROW)).unwrap();
        assert_approx(equity, 2.0);

        let scaled = model.equity(0.3, &ctx(&ROW)).unwrap();
        assert_approx(scaled, 4.0 * 0.8333 * 0.3 / 0.4);
    }

    #[test]
    fn median_ratio_median_boundary_uses_floored_branch() {
        let mut model = ratio_model(None);
        model.years[0].min_equity = 3.5;
        let equity = model.equity(ROW.median, &ctx(&ROW)).unwrap();
        assert_approx(equity, 3.5);
    }

    #[test]
    fn median_ratio_grows_logarithmically_above_top_quartile() {
        let model = ratio_model(None);
        let equity = model.equity(ROW.top_quartile * 3.0, &ctx(&ROW)).unwrap();
        assert_approx(equity, 8.0);
        let equity = model.equity(ROW.top_quartile * 9.0, &ctx(&ROW)).unwrap();
        assert_approx(equity, 12.0);
    }

    #[test]
    fn median_ratio_clamps_to_max_equity() {
        let model = ratio_model(Some(6.0));
        let equity = model.equity(ROW.top_quartile * 9.0, &ctx(&ROW)).unwrap();
        assert_approx(equity, 6.0);
    }

    #[test]
    fn median_ratio_rejects_non_positive_revenue() {
        let model = ratio_model(None);
        let err = model.equity(0.0, &ctx(&ROW)).unwrap_err();
        assert!(matches!(err, CompensationError::InvalidPerformance { year: 1, .. }));
        assert!(model.equity(-1.0, &ctx(&ROW)).is_err());
        assert!(model.equity(f64::NAN, &ctx(&ROW)).is_err());
    }

    #[test]
    fn median_ratio_reports_missing_year_entry() {
        let mut model = ratio_model(None);
        model.years.truncate(2);
        let row = BenchmarkRow::new(3, 1.70, 5.25, 11.40);
        let err = model.equity(1.0, &ctx(&row)).unwrap_err();
        assert!(matches!(err, CompensationError::InvalidConfig(_)));
    }

    #[test]
    fn interpolate_shapes_follow_exponent() {
        assert_approx(interpolate(1.0, 3.0, 0.5, 1.0), 2.0);
        assert_approx(interpolate(1.0, 3.0, 0.5, 2.0), 1.5);
        assert_approx(interpolate(1.0, 3.0, 0.25, 0.5), 2.0);
        assert_approx(interpolate(1.0, 3.0, 0.0, 3.0), 1.0);
        assert_approx(interpolate(1.0, 3.0, 1.0, 3.0), 3.0);
    }

    #[test]
    fn four_tier_matches_tier_values_at_boundaries() {
        let model = tier_model(GrowthRates {
            min_to_median: 2.0,
            median_to_top_quartile: 0.5,
            top_quartile_to_top_decile: 1.5,
            above_top_decile: 1.0,
        });
        let c = ctx(&ROW);
        assert_approx(model.equity(0.0, &c).unwrap(), 1.0);
        assert_approx(model.equity(ROW.median, &c).unwrap(), 2.5);
        assert_approx(model.equity(ROW.top_quartile, &c).unwrap(), 4.0);
        assert_approx(model.equity(ROW.top_decile, &c).unwrap(), 5.0);
        assert_approx(model.equity(ROW.top_decile * 2.0, &c).unwrap(), 6.0);
    }

    #[test]
    fn four_tier_above_top_decile_can_exceed_maximum() {
        let model = tier_model(GrowthRates::default());
        let equity = model.equity(ROW.top_decile * 4.0, &ctx(&ROW)).unwrap();
        assert_approx(equity, 5.0 + 1.0 * 3.0);
        assert!(equity > 6.0);
    }

    #[test]
    fn four_tier_rejects_non_positive_growth() {
        let model = tier_model(GrowthRates {
            top_quartile_to_top_decile: 0.0,
            ..GrowthRates::default()
        });
        let err = model.equity(1.0, &ctx(&ROW)).unwrap_err();
        assert!(err.to_string().contains("top-quartile-to-top-decile"));
    }

    #[test]
    fn four_tier_rejects_negative_revenue_but_accepts_zero() {
        let model = tier_model(GrowthRates::default());
        assert!(model.equity(-0.1, &ctx(&ROW)).is_err());
        assert!(model.equity(0.0, &ctx(&ROW)).is_ok());
    }

    #[test]
    fn equity_model_dispatches_to_variant() {
        let a = EquityModel::MedianRatio(ratio_model(None));
        let b = EquityModel::FourTier(tier_model(GrowthRates::default()));
        assert_eq!(a.name(), "median-ratio");
        assert_eq!(b.name(), "four-tier");
        assert_approx(a.equity(ROW.top_quartile, &ctx(&ROW)).unwrap(), 4.0);
        assert_approx(b.equity(ROW.top_quartile, &ctx(&ROW)).unwrap(), 4.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_median_ratio_is_non_decreasing(
            base_bp in 100u32..1_000,
            ratio_bp in 0u32..10_001,
            revenues in proptest::collection::vec(1u32..5_000, 2..12)
        ) {
            let base = base_bp as f64 / 100.0;
            let ratio = ratio_bp as f64 / 10_000.0;
            let model = MedianRatioEquity {
                years: vec![
                    RatioEquityYear {
                        base_equity: base,
                        min_equity: base * ratio * 0.5,
                        max_equity: Some(base * 1.5),
                    };
                    4
                ],
                median_ratio: ratio,
            };
            let mut revenues = revenues;
            revenues.sort_unstable();
            let c = ctx(&ROW);
            let mut previous = f64::NEG_INFINITY;
            for r in revenues {
                let equity = model.equity(r as f64 / 1_000.0, &c).unwrap();
                prop_assert!(equity + 1e-12 >= previous);
                previous = equity;
            }
        }

        #[test]
        fn prop_four_tier_is_non_decreasing(
            g1 in 1u32..400,
            g2 in 1u32..400,
            g3 in 1u32..400,
            g4 in 1u32..400,
            revenues in proptest::collection::vec(0u32..6_000, 2..12)
        ) {
            let model = tier_model(GrowthRates {
                min_to_median: g1 as f64 / 100.0,
                median_to_top_quartile: g2 as f64 / 100.0,
                top_quartile_to_top_decile: g3 as f64 / 100.0,
                above_top_decile: g4 as f64 / 100.0,
            });
            let mut revenues = revenues;
            revenues.sort_unstable();
            let c = ctx(&ROW);
            let mut previous = f64::NEG_INFINITY;
            for r in revenues {
                let equity = model.equity(r as f64 / 1_000.0, &c).unwrap();
                prop_assert!(equity + 1e-12 >= previous);
                previous = equity;
            }
        }
    }
}
