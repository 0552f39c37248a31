use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompensationError {
    #[error("invalid benchmark for year {year}: {reason}")]
    InvalidBenchmark { year: u32, reason: String },
    #[error("invalid performance {performance} in year {year}: {reason}")]
    InvalidPerformance {
        year: u32,
        performance: f64,
        reason: &'static str,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("year {0} is outside the 1..=4 horizon")]
    InvalidYear(u32),
}

pub type CompResult<T> = Result<T, CompensationError>;
