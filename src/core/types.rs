use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmortizationShape {
    /// Fixed monthly payment drawing a borrowed balance down to zero.
    Repayment,
    /// Seed balance compounding monthly with a fixed contribution.
    Growth,
}

/// Shared parameters for both engine shapes. `principal` is the borrowed
/// amount for repayment and the seed balance for growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanParameters {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_years: u32,
    pub monthly_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub balance: f64,
    pub contributed: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub shape: AmortizationShape,
    pub monthly_payment: Option<f64>,
    /// Total paid over the term for repayment, future value for growth.
    pub total_amount: f64,
    pub total_contributed: f64,
    pub total_interest: f64,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInputs {
    pub amount: f64,
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortgageInputs {
    pub home_price: f64,
    pub down_payment: f64,
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResult {
    pub home_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    #[serde(flatten)]
    pub schedule: AmortizationResult,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestmentInputs {
    pub initial_investment: f64,
    pub monthly_contribution: f64,
    pub annual_rate_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub monthly_savings: f64,
    pub annual_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementResult {
    pub current_age: u32,
    pub retirement_age: u32,
    pub years_to_retirement: u32,
    #[serde(flatten)]
    pub projection: AmortizationResult,
}
