use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    BenchmarkRow, BenchmarkTable, BenchmarkTier, BonusConfig, BonusModel, CompensationParams,
    EquityModel, EquityTiers, FourTierEquity, GrowthRates, HORIZON_YEARS, MedianRatioEquity,
    RatioEquityYear, RevenuePoint, SalaryConfig, ScenarioTable, ScenarioTotals, YearResult,
    revenue_chart_series, run_scenarios,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliEquityModel {
    MedianRatio,
    FourTier,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBonusModel {
    Logarithmic,
    Proportional,
    BasePlusExcess,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBenchmarkTier {
    Median,
    TopQuartile,
    TopDecile,
}

impl From<CliBenchmarkTier> for BenchmarkTier {
    fn from(value: CliBenchmarkTier) -> Self {
        match value {
            CliBenchmarkTier::Median => BenchmarkTier::Median,
            CliBenchmarkTier::TopQuartile => BenchmarkTier::TopQuartile,
            CliBenchmarkTier::TopDecile => BenchmarkTier::TopDecile,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiEquityModel {
    #[serde(alias = "medianRatio", alias = "median_ratio", alias = "ratio")]
    MedianRatio,
    #[serde(alias = "fourTier", alias = "four_tier", alias = "tiered")]
    FourTier,
}

impl From<ApiEquityModel> for CliEquityModel {
    fn from(value: ApiEquityModel) -> Self {
        match value {
            ApiEquityModel::MedianRatio => CliEquityModel::MedianRatio,
            ApiEquityModel::FourTier => CliEquityModel::FourTier,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiBonusModel {
    #[serde(alias = "log")]
    Logarithmic,
    Proportional,
    #[serde(alias = "basePlusExcess", alias = "base_plus_excess", alias = "excess")]
    BasePlusExcess,
}

impl From<ApiBonusModel> for CliBonusModel {
    fn from(value: ApiBonusModel) -> Self {
        match value {
            ApiBonusModel::Logarithmic => CliBonusModel::Logarithmic,
            ApiBonusModel::Proportional => CliBonusModel::Proportional,
            ApiBonusModel::BasePlusExcess => CliBonusModel::BasePlusExcess,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiBenchmarkTier {
    Median,
    #[serde(alias = "topQuartile", alias = "top_quartile")]
    TopQuartile,
    #[serde(alias = "topDecile", alias = "top_decile")]
    TopDecile,
}

impl From<ApiBenchmarkTier> for CliBenchmarkTier {
    fn from(value: ApiBenchmarkTier) -> Self {
        match value {
            ApiBenchmarkTier::Median => CliBenchmarkTier::Median,
            ApiBenchmarkTier::TopQuartile => CliBenchmarkTier::TopQuartile,
            ApiBenchmarkTier::TopDecile => CliBenchmarkTier::TopDecile,
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiBenchmarkRow {
    year: u32,
    median: f64,
    top_quartile: f64,
    top_decile: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompensationPayload {
    exchange_rate: Option<f64>,
    initial_base_salary: Option<f64>,
    joining_bonus: Option<f64>,
    salary_increase_rate: Option<f64>,
    bonus_base_percentage: Option<f64>,

    bonus_model: Option<ApiBonusModel>,
    bonus_target: Option<ApiBenchmarkTier>,
    excess_bonus_percentage: Option<f64>,
    free_cash_flow_percentage: Option<f64>,

    equity_model: Option<ApiEquityModel>,
    base_equity: Option<Vec<f64>>,
    min_equity: Option<Vec<f64>>,
    max_equity: Option<Vec<f64>>,
    uncapped_equity: Option<bool>,
    median_equity_ratio: Option<f64>,

    equity_minimum: Option<Vec<f64>>,
    equity_median: Option<Vec<f64>>,
    equity_top_quartile: Option<Vec<f64>>,
    equity_top_decile: Option<Vec<f64>>,
    equity_maximum: Option<Vec<f64>>,
    growth_min_to_median: Option<f64>,
    growth_median_to_top_quartile: Option<f64>,
    growth_top_quartile_to_top_decile: Option<f64>,
    growth_above_top_decile: Option<f64>,

    actual_revenue: Option<Vec<f64>>,
    benchmarks: Option<Vec<ApiBenchmarkRow>>,
}

#[derive(Parser, Debug)]
#[command(
    name = "compcal",
    about = "SaaS compensation calculator (salary + bonus + equity against revenue benchmarks)"
)]
struct Cli {
    #[arg(long, default_value_t = 83.0, help = "USD to local currency exchange rate")]
    exchange_rate: f64,
    #[arg(long, default_value_t = 100.0, help = "Year 1 base salary in lakhs")]
    initial_base_salary: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Joining bonus in lakhs, paid in year 1 as an advance on the bonus"
    )]
    joining_bonus: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Annual salary increase rate in percent"
    )]
    salary_increase_rate: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Target bonus in percent of base salary"
    )]
    bonus_base_percentage: f64,
    #[arg(long, value_enum, default_value_t = CliBonusModel::Logarithmic)]
    bonus_model: CliBonusModel,
    #[arg(
        long,
        value_enum,
        default_value_t = CliBenchmarkTier::TopQuartile,
        help = "Benchmark the proportional and base-plus-excess bonus models measure against"
    )]
    bonus_target: CliBenchmarkTier,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Percent of excess revenue paid as bonus by the base-plus-excess model"
    )]
    excess_bonus_percentage: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Percent of excess revenue counted as free cash flow"
    )]
    free_cash_flow_percentage: f64,
    #[arg(long, value_enum, default_value_t = CliEquityModel::MedianRatio)]
    equity_model: CliEquityModel,
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [4.0, 4.0, 4.0, 3.0],
        help = "Equity percent at top quartile, per year"
    )]
    base_equity: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [2.0, 2.0, 2.0, 1.5])]
    min_equity: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [6.0, 6.0, 6.0, 4.5])]
    max_equity: Vec<f64>,
    #[arg(long, help = "Ignore --max-equity caps")]
    uncapped_equity: bool,
    #[arg(
        long,
        default_value_t = 0.8333,
        help = "Median equity as a fraction of top-quartile equity"
    )]
    median_equity_ratio: f64,
    #[arg(long, value_delimiter = ',', default_values_t = [2.0, 2.0, 2.0, 1.5])]
    equity_minimum: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [3.33, 3.33, 3.33, 2.5])]
    equity_median: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [4.0, 4.0, 4.0, 3.0])]
    equity_top_quartile: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [5.0, 5.0, 5.0, 3.75])]
    equity_top_decile: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [6.0, 6.0, 6.0, 4.5])]
    equity_maximum: Vec<f64>,
    #[arg(long, default_value_t = 1.0, help = "Four-tier exponent below the median")]
    growth_min_to_median: f64,
    #[arg(long, default_value_t = 1.0)]
    growth_median_to_top_quartile: f64,
    #[arg(long, default_value_t = 1.0)]
    growth_top_quartile_to_top_decile: f64,
    #[arg(long, default_value_t = 1.0)]
    growth_above_top_decile: f64,
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.75, 1.5, 3.0, 6.0],
        help = "Actual revenue per year in million USD"
    )]
    actual_revenue: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [0.40, 0.80, 1.70, 3.00])]
    benchmark_median: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [0.75, 1.875, 5.25, 12.60])]
    benchmark_top_quartile: Vec<f64>,
    #[arg(long, value_delimiter = ',', default_values_t = [1.50, 5.50, 11.40, 17.00])]
    benchmark_top_decile: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompensationResponse {
    equity_model: &'static str,
    bonus_model: &'static str,
    bonus_target: BenchmarkTier,
    exchange_rate: f64,
    benchmarks: Vec<BenchmarkRow>,
    years: Vec<YearResult>,
    total: ScenarioTotals,
    chart: Vec<RevenuePoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn per_year(flag: &str, values: &[f64]) -> Result<[f64; HORIZON_YEARS], String> {
    let values = <[f64; HORIZON_YEARS]>::try_from(values).map_err(|_| {
        format!(
            "{flag} needs exactly {HORIZON_YEARS} values, got {}",
            values.len()
        )
    })?;
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(format!("{flag} values must be >= 0"));
    }
    Ok(values)
}

fn build_params(cli: Cli) -> Result<CompensationParams, String> {
    if !cli.exchange_rate.is_finite() || cli.exchange_rate <= 0.0 {
        return Err("--exchange-rate must be > 0".to_string());
    }

    for (name, value) in [
        ("--initial-base-salary", cli.initial_base_salary),
        ("--joining-bonus", cli.joining_bonus),
        ("--salary-increase-rate", cli.salary_increase_rate),
        ("--bonus-base-percentage", cli.bonus_base_percentage),
        ("--excess-bonus-percentage", cli.excess_bonus_percentage),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if !(0.0..=100.0).contains(&cli.free_cash_flow_percentage) {
        return Err("--free-cash-flow-percentage must be between 0 and 100".to_string());
    }

    if !(0.0..=1.0).contains(&cli.median_equity_ratio) {
        return Err("--median-equity-ratio must be between 0 and 1".to_string());
    }

    let actual_revenue = per_year("--actual-revenue", &cli.actual_revenue)?;
    let medians = per_year("--benchmark-median", &cli.benchmark_median)?;
    let quartiles = per_year("--benchmark-top-quartile", &cli.benchmark_top_quartile)?;
    let deciles = per_year("--benchmark-top-decile", &cli.benchmark_top_decile)?;

    let rows = std::array::from_fn(|idx| {
        BenchmarkRow::new(idx as u32 + 1, medians[idx], quartiles[idx], deciles[idx])
    });

    let equity = match cli.equity_model {
        CliEquityModel::MedianRatio => {
            let base = per_year("--base-equity", &cli.base_equity)?;
            let min = per_year("--min-equity", &cli.min_equity)?;
            let max = per_year("--max-equity", &cli.max_equity)?;
            let years = (0..HORIZON_YEARS)
                .map(|idx| RatioEquityYear {
                    base_equity: base[idx],
                    min_equity: min[idx],
                    max_equity: (!cli.uncapped_equity).then_some(max[idx]),
                })
                .collect();
            EquityModel::MedianRatio(MedianRatioEquity {
                years,
                median_ratio: cli.median_equity_ratio,
            })
        }
        CliEquityModel::FourTier => {
            let minimum = per_year("--equity-minimum", &cli.equity_minimum)?;
            let median = per_year("--equity-median", &cli.equity_median)?;
            let top_quartile = per_year("--equity-top-quartile", &cli.equity_top_quartile)?;
            let top_decile = per_year("--equity-top-decile", &cli.equity_top_decile)?;
            let maximum = per_year("--equity-maximum", &cli.equity_maximum)?;

            for (name, rate) in [
                ("--growth-min-to-median", cli.growth_min_to_median),
                (
                    "--growth-median-to-top-quartile",
                    cli.growth_median_to_top_quartile,
                ),
                (
                    "--growth-top-quartile-to-top-decile",
                    cli.growth_top_quartile_to_top_decile,
                ),
                ("--growth-above-top-decile", cli.growth_above_top_decile),
            ] {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(format!("{name} must be > 0"));
                }
            }

            let years = (0..HORIZON_YEARS)
                .map(|idx| EquityTiers {
                    minimum: minimum[idx],
                    median: median[idx],
                    top_quartile: top_quartile[idx],
                    top_decile: top_decile[idx],
                    maximum: maximum[idx],
                })
                .collect();
            EquityModel::FourTier(FourTierEquity {
                years,
                growth: GrowthRates {
                    min_to_median: cli.growth_min_to_median,
                    median_to_top_quartile: cli.growth_median_to_top_quartile,
                    top_quartile_to_top_decile: cli.growth_top_quartile_to_top_decile,
                    above_top_decile: cli.growth_above_top_decile,
                },
            })
        }
    };

    let target = cli.bonus_target.into();
    let model = match cli.bonus_model {
        CliBonusModel::Logarithmic => BonusModel::Logarithmic,
        CliBonusModel::Proportional => BonusModel::Proportional { target },
        CliBonusModel::BasePlusExcess => BonusModel::BasePlusExcess {
            target,
            excess_bonus_percentage: cli.excess_bonus_percentage,
            free_cash_flow_percentage: cli.free_cash_flow_percentage,
        },
    };

    Ok(CompensationParams {
        exchange_rate: cli.exchange_rate,
        salary: SalaryConfig {
            initial_base_salary: cli.initial_base_salary,
            annual_increase_rate: cli.salary_increase_rate / 100.0,
        },
        bonus: BonusConfig {
            base_percentage: cli.bonus_base_percentage,
            joining_bonus: cli.joining_bonus,
            model,
        },
        equity,
        benchmarks: BenchmarkTable { rows },
        actual_revenue,
    })
}

pub fn run_table_from_args<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let params = build_params(cli)?;
    let table = run_scenarios(&params).map_err(|e| e.to_string())?;
    info!(
        total_comp = table.total.total_comp,
        "built compensation table"
    );
    serde_json::to_string_pretty(&build_response(&params, &table))
        .map_err(|e| format!("failed to serialize response: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/compensation",
            get(compensation_get_handler).post(compensation_post_handler),
        )
        .route("/api/benchmarks", get(benchmarks_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("compcal HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/compensation");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn benchmarks_handler() -> Response {
    json_response(StatusCode::OK, BenchmarkTable::default().rows.to_vec())
}

async fn compensation_get_handler(Query(payload): Query<CompensationPayload>) -> Response {
    compensation_handler_impl(payload).await
}

async fn compensation_post_handler(Json(payload): Json<CompensationPayload>) -> Response {
    compensation_handler_impl(payload).await
}

async fn compensation_handler_impl(payload: CompensationPayload) -> Response {
    let params = match params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => {
            warn!(error = %msg, "rejected compensation request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match run_scenarios(&params) {
        Ok(table) => json_response(StatusCode::OK, build_response(&params, &table)),
        Err(err) => {
            warn!(error = %err, "compensation run failed");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn params_from_json(json: &str) -> Result<CompensationParams, String> {
    let payload = serde_json::from_str::<CompensationPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    params_from_payload(payload)
}

fn params_from_payload(payload: CompensationPayload) -> Result<CompensationParams, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.exchange_rate {
        cli.exchange_rate = v;
    }
    if let Some(v) = payload.initial_base_salary {
        cli.initial_base_salary = v;
    }
    if let Some(v) = payload.joining_bonus {
        cli.joining_bonus = v;
    }
    if let Some(v) = payload.salary_increase_rate {
        cli.salary_increase_rate = v;
    }
    if let Some(v) = payload.bonus_base_percentage {
        cli.bonus_base_percentage = v;
    }

    if let Some(v) = payload.bonus_model {
        cli.bonus_model = v.into();
    }
    if let Some(v) = payload.bonus_target {
        cli.bonus_target = v.into();
    }
    if let Some(v) = payload.excess_bonus_percentage {
        cli.excess_bonus_percentage = v;
    }
    if let Some(v) = payload.free_cash_flow_percentage {
        cli.free_cash_flow_percentage = v;
    }

    if let Some(v) = payload.equity_model {
        cli.equity_model = v.into();
    }
    if let Some(v) = payload.base_equity {
        cli.base_equity = v;
    }
    if let Some(v) = payload.min_equity {
        cli.min_equity = v;
    }
    if let Some(v) = payload.max_equity {
        cli.max_equity = v;
    }
    if let Some(v) = payload.uncapped_equity {
        cli.uncapped_equity = v;
    }
    if let Some(v) = payload.median_equity_ratio {
        cli.median_equity_ratio = v;
    }

    if let Some(v) = payload.equity_minimum {
        cli.equity_minimum = v;
    }
    if let Some(v) = payload.equity_median {
        cli.equity_median = v;
    }
    if let Some(v) = payload.equity_top_quartile {
        cli.equity_top_quartile = v;
    }
    if let Some(v) = payload.equity_top_decile {
        cli.equity_top_decile = v;
    }
    if let Some(v) = payload.equity_maximum {
        cli.equity_maximum = v;
    }
    if let Some(v) = payload.growth_min_to_median {
        cli.growth_min_to_median = v;
    }
    if let Some(v) = payload.growth_median_to_top_quartile {
        cli.growth_median_to_top_quartile = v;
    }
    if let Some(v) = payload.growth_top_quartile_to_top_decile {
        cli.growth_top_quartile_to_top_decile = v;
    }
    if let Some(v) = payload.growth_above_top_decile {
        cli.growth_above_top_decile = v;
    }

    if let Some(v) = payload.actual_revenue {
        cli.actual_revenue = v;
    }
    if let Some(rows) = payload.benchmarks {
        if rows.len() != HORIZON_YEARS {
            return Err(format!(
                "benchmarks needs exactly {HORIZON_YEARS} rows, got {}",
                rows.len()
            ));
        }
        let mut seen = [false; HORIZON_YEARS];
        for row in rows {
            let idx = match row.year {
                1..=4 => row.year as usize - 1,
                other => return Err(format!("benchmarks year {other} is outside 1..=4")),
            };
            if seen[idx] {
                return Err(format!("benchmarks year {} listed twice", row.year));
            }
            seen[idx] = true;
            cli.benchmark_median[idx] = row.median;
            cli.benchmark_top_quartile[idx] = row.top_quartile;
            cli.benchmark_top_decile[idx] = row.top_decile;
        }
    }

    build_params(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        exchange_rate: 83.0,
        initial_base_salary: 100.0,
        joining_bonus: 20.0,
        salary_increase_rate: 10.0,
        bonus_base_percentage: 100.0,
        bonus_model: CliBonusModel::Logarithmic,
        bonus_target: CliBenchmarkTier::TopQuartile,
        excess_bonus_percentage: 1.0,
        free_cash_flow_percentage: 100.0,
        equity_model: CliEquityModel::MedianRatio,
        base_equity: vec![4.0, 4.0, 4.0, 3.0],
        min_equity: vec![2.0, 2.0, 2.0, 1.5],
        max_equity: vec![6.0, 6.0, 6.0, 4.5],
        uncapped_equity: false,
        median_equity_ratio: 0.8333,
        equity_minimum: vec![2.0, 2.0, 2.0, 1.5],
        equity_median: vec![3.33, 3.33, 3.33, 2.5],
        equity_top_quartile: vec![4.0, 4.0, 4.0, 3.0],
        equity_top_decile: vec![5.0, 5.0, 5.0, 3.75],
        equity_maximum: vec![6.0, 6.0, 6.0, 4.5],
        growth_min_to_median: 1.0,
        growth_median_to_top_quartile: 1.0,
        growth_top_quartile_to_top_decile: 1.0,
        growth_above_top_decile: 1.0,
        actual_revenue: vec![0.75, 1.5, 3.0, 6.0],
        benchmark_median: vec![0.40, 0.80, 1.70, 3.00],
        benchmark_top_quartile: vec![0.75, 1.875, 5.25, 12.60],
        benchmark_top_decile: vec![1.50, 5.50, 11.40, 17.00],
    }
}

fn build_response(params: &CompensationParams, table: &ScenarioTable) -> CompensationResponse {
    CompensationResponse {
        equity_model: params.equity.name(),
        bonus_model: params.bonus.model.name(),
        bonus_target: params.bonus.model.target_tier(),
        exchange_rate: params.exchange_rate,
        benchmarks: params.benchmarks.rows.to_vec(),
        years: table.years.clone(),
        total: table.total,
        chart: revenue_chart_series(params),
    }
}
