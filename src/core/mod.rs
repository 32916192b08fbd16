mod engine;
mod error;
mod scam;
mod tax;
mod types;

pub use engine::{
    MAX_ANNUAL_RATE_PERCENT, MAX_TERM_YEARS, MONTHS_PER_YEAR, calculate_investment,
    calculate_loan, calculate_mortgage, calculate_retirement, compute_amortization,
    future_value, monthly_payment,
};
pub use error::CalcError;
pub use scam::{
    PROMISE_PHRASES, RiskLevel, SCAM_KEYWORDS, SUSPICIOUS_DOMAINS, ScamScanResult,
    URGENCY_PHRASES, scan_for_scam_signals,
};
pub use tax::{
    DeductionKind, Deductions, FilingStatus, STANDARD_DEDUCTION, TAX_BRACKETS, TaxBracket,
    TaxEstimate, TaxInputs, bracket_tax, estimate_tax, marginal_rate,
};
pub use types::{
    AmortizationResult, AmortizationShape, InvestmentInputs, LoanInputs, LoanParameters,
    MortgageInputs, MortgageResult, RetirementInputs, RetirementResult, SeriesPoint,
};
