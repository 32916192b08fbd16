use axum::{
    Router,
    body::Bytes,
    extract::Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    CalcError, Deductions, FilingStatus, InvestmentInputs, LoanInputs, MortgageInputs,
    RetirementInputs, ScamScanResult, TaxInputs, calculate_investment, calculate_loan,
    calculate_mortgage, calculate_retirement, estimate_tax, scan_for_scam_signals,
};
use crate::error::AppError;

/// Form defaults shared by the HTTP payloads and the CLI.
pub mod defaults {
    pub const LOAN_AMOUNT: f64 = 10_000.0;
    pub const LOAN_RATE: f64 = 5.0;
    pub const LOAN_TERM_YEARS: u32 = 5;

    pub const HOME_PRICE: f64 = 300_000.0;
    pub const DOWN_PAYMENT: f64 = 60_000.0;
    pub const MORTGAGE_RATE: f64 = 4.5;
    pub const MORTGAGE_TERM_YEARS: u32 = 30;

    pub const INITIAL_INVESTMENT: f64 = 10_000.0;
    pub const MONTHLY_CONTRIBUTION: f64 = 500.0;
    pub const INVESTMENT_RATE: f64 = 7.0;
    pub const INVESTMENT_YEARS: u32 = 20;

    pub const CURRENT_AGE: u32 = 30;
    pub const RETIREMENT_AGE: u32 = 65;
    pub const CURRENT_SAVINGS: f64 = 50_000.0;
    pub const MONTHLY_SAVINGS: f64 = 1_000.0;
    pub const RETIREMENT_RATE: f64 = 6.0;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    #[default]
    Single,
    #[serde(alias = "marriedJoint", alias = "married_joint")]
    MarriedJoint,
    #[serde(alias = "marriedSeparate", alias = "married_separate")]
    MarriedSeparate,
    #[serde(
        alias = "headOfHousehold",
        alias = "head_of_household",
        alias = "head_household"
    )]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for FilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => FilingStatus::Single,
            ApiFilingStatus::MarriedJoint => FilingStatus::MarriedJoint,
            ApiFilingStatus::MarriedSeparate => FilingStatus::MarriedSeparate,
            ApiFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanPayload {
    loan_amount: Option<f64>,
    interest_rate: Option<f64>,
    loan_term: Option<u32>,
}

impl From<LoanPayload> for LoanInputs {
    fn from(payload: LoanPayload) -> Self {
        LoanInputs {
            amount: payload.loan_amount.unwrap_or(defaults::LOAN_AMOUNT),
            annual_rate_percent: payload.interest_rate.unwrap_or(defaults::LOAN_RATE),
            term_years: payload.loan_term.unwrap_or(defaults::LOAN_TERM_YEARS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MortgagePayload {
    home_price: Option<f64>,
    down_payment: Option<f64>,
    mortgage_rate: Option<f64>,
    mortgage_term: Option<u32>,
}

impl From<MortgagePayload> for MortgageInputs {
    fn from(payload: MortgagePayload) -> Self {
        MortgageInputs {
            home_price: payload.home_price.unwrap_or(defaults::HOME_PRICE),
            down_payment: payload.down_payment.unwrap_or(defaults::DOWN_PAYMENT),
            annual_rate_percent: payload.mortgage_rate.unwrap_or(defaults::MORTGAGE_RATE),
            term_years: payload.mortgage_term.unwrap_or(defaults::MORTGAGE_TERM_YEARS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InvestmentPayload {
    initial_investment: Option<f64>,
    monthly_contribution: Option<f64>,
    investment_rate: Option<f64>,
    investment_years: Option<u32>,
}

impl From<InvestmentPayload> for InvestmentInputs {
    fn from(payload: InvestmentPayload) -> Self {
        InvestmentInputs {
            initial_investment: payload
                .initial_investment
                .unwrap_or(defaults::INITIAL_INVESTMENT),
            monthly_contribution: payload
                .monthly_contribution
                .unwrap_or(defaults::MONTHLY_CONTRIBUTION),
            annual_rate_percent: payload.investment_rate.unwrap_or(defaults::INVESTMENT_RATE),
            years: payload.investment_years.unwrap_or(defaults::INVESTMENT_YEARS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    current_savings: Option<f64>,
    monthly_savings: Option<f64>,
    retirement_rate: Option<f64>,
}

impl From<RetirementPayload> for RetirementInputs {
    fn from(payload: RetirementPayload) -> Self {
        RetirementInputs {
            current_age: payload.current_age.unwrap_or(defaults::CURRENT_AGE),
            retirement_age: payload.retirement_age.unwrap_or(defaults::RETIREMENT_AGE),
            current_savings: payload.current_savings.unwrap_or(defaults::CURRENT_SAVINGS),
            monthly_savings: payload.monthly_savings.unwrap_or(defaults::MONTHLY_SAVINGS),
            annual_rate_percent: payload.retirement_rate.unwrap_or(defaults::RETIREMENT_RATE),
        }
    }
}

/// Blank tax form fields count as zero.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    filing_status: ApiFilingStatus,
    annual_income: Option<f64>,
    additional_income: Option<f64>,
    federal_tax_withheld: Option<f64>,
    state_tax_withheld: Option<f64>,
    mortgage_interest: Option<f64>,
    charitable_donations: Option<f64>,
    medical_expenses: Option<f64>,
    education_expenses: Option<f64>,
    retirement_contributions: Option<f64>,
}

impl From<TaxPayload> for TaxInputs {
    fn from(payload: TaxPayload) -> Self {
        TaxInputs {
            filing_status: payload.filing_status.into(),
            annual_income: payload.annual_income.unwrap_or_default(),
            additional_income: payload.additional_income.unwrap_or_default(),
            federal_withheld: payload.federal_tax_withheld.unwrap_or_default(),
            state_withheld: payload.state_tax_withheld.unwrap_or_default(),
            deductions: Deductions {
                mortgage_interest: payload.mortgage_interest.unwrap_or_default(),
                charitable_donations: payload.charitable_donations.unwrap_or_default(),
                medical_expenses: payload.medical_expenses.unwrap_or_default(),
                education_expenses: payload.education_expenses.unwrap_or_default(),
                retirement_contributions: payload.retirement_contributions.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScanPayload {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanResponse {
    #[serde(flatten)]
    result: ScamScanResult,
    advisory: &'static str,
}

impl From<ScamScanResult> for ScanResponse {
    fn from(result: ScamScanResult) -> Self {
        let advisory = result.risk_level.advisory();
        ScanResponse { result, advisory }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/loan", post(loan_handler))
        .route("/api/mortgage", post(mortgage_handler))
        .route("/api/investment", post(investment_handler))
        .route("/api/retirement", post(retirement_handler))
        .route("/api/tax", post(tax_handler))
        .route("/api/scan", post(scan_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "finkit HTTP API listening");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn loan_handler(body: Bytes) -> Result<Response, AppError> {
    let payload: LoanPayload = parse_payload("loan", &body)?;
    let inputs = LoanInputs::from(payload);
    Ok(calculation_response("loan", calculate_loan(&inputs)))
}

async fn mortgage_handler(body: Bytes) -> Result<Response, AppError> {
    let payload: MortgagePayload = parse_payload("mortgage", &body)?;
    let inputs = MortgageInputs::from(payload);
    Ok(calculation_response("mortgage", calculate_mortgage(&inputs)))
}

async fn investment_handler(body: Bytes) -> Result<Response, AppError> {
    let payload: InvestmentPayload = parse_payload("investment", &body)?;
    let inputs = InvestmentInputs::from(payload);
    Ok(calculation_response("investment", calculate_investment(&inputs)))
}

async fn retirement_handler(body: Bytes) -> Result<Response, AppError> {
    let payload: RetirementPayload = parse_payload("retirement", &body)?;
    let inputs = RetirementInputs::from(payload);
    Ok(calculation_response("retirement", calculate_retirement(&inputs)))
}

async fn tax_handler(body: Bytes) -> Result<Response, AppError> {
    let payload: TaxPayload = parse_payload("tax", &body)?;
    let inputs = TaxInputs::from(payload);
    Ok(calculation_response("tax", estimate_tax(&inputs)))
}

async fn scan_handler(body: Bytes) -> Result<Response, AppError> {
    let payload: ScanPayload = parse_payload("scan", &body)?;
    let result = scan_for_scam_signals(&payload.text);
    debug!(
        score = result.risk_score,
        level = %result.risk_level,
        "scam scan served"
    );
    Ok(json_response(StatusCode::OK, ScanResponse::from(result)))
}

/// Malformed or mistyped bodies surface as [`AppError::Json`], a 400 with a
/// JSON error body.
fn parse_payload<T: DeserializeOwned>(
    endpoint: &'static str,
    body: &[u8],
) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        warn!(endpoint, error = %err, "rejected malformed request body");
        AppError::from(err)
    })
}

fn calculation_response<T: Serialize>(
    endpoint: &'static str,
    result: Result<T, CalcError>,
) -> Response {
    match result {
        Ok(body) => {
            debug!(endpoint, "calculation served");
            json_response(StatusCode::OK, body)
        }
        Err(err) => {
            warn!(endpoint, error = %err, "rejected calculation request");
            AppError::from(err).into_response()
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        serde_json::json!({
            "error": msg,
        }),
    )
}
