use super::error::{CompResult, CompensationError};
use super::types::{BenchmarkRow, BenchmarkTable, BenchmarkTier, HORIZON_YEARS};

impl BenchmarkRow {
    pub const fn new(year: u32, median: f64, top_quartile: f64, top_decile: f64) -> Self {
        Self {
            year,
            median,
            top_quartile,
            top_decile,
        }
    }

    pub fn threshold(&self, tier: BenchmarkTier) -> f64 {
        match tier {
            BenchmarkTier::Median => self.median,
            BenchmarkTier::TopQuartile => self.top_quartile,
            BenchmarkTier::TopDecile => self.top_decile,
        }
    }

    pub fn validate(&self) -> CompResult<()> {
        let invalid = |reason: &str| CompensationError::InvalidBenchmark {
            year: self.year,
            reason: reason.to_string(),
        };

        for (name, value) in [
            ("median", self.median),
            ("top quartile", self.top_quartile),
            ("top decile", self.top_decile),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(&format!("{name} must be > 0, got {value}")));
            }
        }
        if self.top_quartile <= self.median {
            return Err(invalid("top quartile must exceed median"));
        }
        if self.top_decile <= self.top_quartile {
            return Err(invalid("top decile must exceed top quartile"));
        }
        Ok(())
    }
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        Self {
            rows: [
                BenchmarkRow::new(1, 0.40, 0.75, 1.50),
                BenchmarkRow::new(2, 0.80, 1.875, 5.50),
                BenchmarkRow::new(3, 1.70, 5.25, 11.40),
                BenchmarkRow::new(4, 3.00, 12.60, 17.00),
            ],
        }
    }
}

impl BenchmarkTable {
    pub fn row(&self, year: u32) -> CompResult<&BenchmarkRow> {
        let row = year_index(year).map(|idx| &self.rows[idx])?;
        row.validate()?;
        Ok(row)
    }
}

pub(crate) fn year_index(year: u32) -> CompResult<usize> {
    if year == 0 || year as usize > HORIZON_YEARS {
        return Err(CompensationError::InvalidYear(year));
    }
    Ok(year as usize - 1)
}
