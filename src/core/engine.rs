use super::error::{CalcError, require_non_negative, require_positive};
use super::types::{
    AmortizationResult, AmortizationShape, InvestmentInputs, LoanInputs, LoanParameters,
    MortgageInputs, MortgageResult, RetirementInputs, RetirementResult, SeriesPoint,
};

pub const MONTHS_PER_YEAR: u32 = 12;
pub const MAX_TERM_YEARS: u32 = 100;
pub const MAX_ANNUAL_RATE_PERCENT: f64 = 1_000.0;

const ZERO_RATE_EPS: f64 = 1e-12;

pub fn compute_amortization(
    params: &LoanParameters,
    shape: AmortizationShape,
) -> Result<AmortizationResult, CalcError> {
    validate_parameters(params)?;
    let rate = monthly_rate(params.annual_rate_percent);

    let result = match shape {
        AmortizationShape::Repayment => {
            repayment_schedule(params.principal, rate, params.term_years)
        }
        AmortizationShape::Growth => growth_projection(
            params.principal,
            params.monthly_contribution,
            rate,
            params.term_years,
            year_label,
        ),
    };
    ensure_finite(&result)?;
    Ok(result)
}

pub fn calculate_loan(inputs: &LoanInputs) -> Result<AmortizationResult, CalcError> {
    let params = LoanParameters {
        principal: inputs.amount,
        annual_rate_percent: inputs.annual_rate_percent,
        term_years: inputs.term_years,
        monthly_contribution: 0.0,
    };
    compute_amortization(&params, AmortizationShape::Repayment)
}

pub fn calculate_mortgage(inputs: &MortgageInputs) -> Result<MortgageResult, CalcError> {
    let home_price = require_positive("home_price", inputs.home_price)?;
    let down_payment = require_non_negative("down_payment", inputs.down_payment)?;
    if down_payment >= home_price {
        return Err(CalcError::invalid(
            "down_payment",
            "must be less than home_price",
        ));
    }

    let loan_amount = home_price - down_payment;
    let params = LoanParameters {
        principal: loan_amount,
        annual_rate_percent: inputs.annual_rate_percent,
        term_years: inputs.term_years,
        monthly_contribution: 0.0,
    };
    let schedule = compute_amortization(&params, AmortizationShape::Repayment)?;

    Ok(MortgageResult {
        home_price,
        down_payment,
        loan_amount,
        schedule,
    })
}

pub fn calculate_investment(inputs: &InvestmentInputs) -> Result<AmortizationResult, CalcError> {
    let params = LoanParameters {
        principal: inputs.initial_investment,
        annual_rate_percent: inputs.annual_rate_percent,
        term_years: inputs.years,
        monthly_contribution: inputs.monthly_contribution,
    };
    compute_amortization(&params, AmortizationShape::Growth)
}

/// Projects savings from the current age up to the retirement age. Unlike
/// [`calculate_investment`], a zero starting balance and a zero-year horizon
/// are both accepted; the latter yields a single-point series.
pub fn calculate_retirement(inputs: &RetirementInputs) -> Result<RetirementResult, CalcError> {
    if inputs.retirement_age < inputs.current_age {
        return Err(CalcError::invalid(
            "retirement_age",
            "must be >= current_age",
        ));
    }
    let years_to_retirement = inputs.retirement_age - inputs.current_age;
    if years_to_retirement > MAX_TERM_YEARS {
        return Err(CalcError::invalid(
            "retirement_age",
            format!("must be within {MAX_TERM_YEARS} years of current_age"),
        ));
    }
    let savings = require_non_negative("current_savings", inputs.current_savings)?;
    let contribution = require_non_negative("monthly_savings", inputs.monthly_savings)?;
    let annual_rate = require_annual_rate(inputs.annual_rate_percent)?;

    let current_age = inputs.current_age;
    let projection = growth_projection(
        savings,
        contribution,
        monthly_rate(annual_rate),
        years_to_retirement,
        |year| format!("Age {}", current_age + year),
    );

    ensure_finite(&projection)?;

    Ok(RetirementResult {
        current_age,
        retirement_age: inputs.retirement_age,
        years_to_retirement,
        projection,
    })
}

/// Level payment for a fully amortizing loan. With a zero rate the principal
/// is repaid in equal instalments.
pub fn monthly_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    principal / annuity_factor(monthly_rate, months)
}

/// Closed-form balance after `months` of compounding with end-of-month
/// contributions.
pub fn future_value(seed: f64, contribution: f64, monthly_rate: f64, months: u32) -> f64 {
    let n = months as f64;
    if monthly_rate.abs() < ZERO_RATE_EPS {
        return seed + contribution * n;
    }
    let log_growth = n * monthly_rate.ln_1p();
    seed * log_growth.exp() + contribution * (log_growth.exp_m1() / monthly_rate)
}

/// Present value of one unit paid at the end of each of `months` months,
/// `(1 - (1 + r)^-n) / r`. Evaluated through `ln_1p`/`exp_m1` so that small
/// rates keep their precision.
fn annuity_factor(monthly_rate: f64, months: u32) -> f64 {
    let n = months as f64;
    if monthly_rate.abs() < ZERO_RATE_EPS {
        return n;
    }
    -(-n * monthly_rate.ln_1p()).exp_m1() / monthly_rate
}

fn validate_parameters(params: &LoanParameters) -> Result<(), CalcError> {
    require_positive("principal", params.principal)?;
    require_annual_rate(params.annual_rate_percent)?;
    require_non_negative("monthly_contribution", params.monthly_contribution)?;
    if params.term_years == 0 {
        return Err(CalcError::invalid("term_years", "must be > 0"));
    }
    if params.term_years > MAX_TERM_YEARS {
        return Err(CalcError::invalid(
            "term_years",
            format!("must be <= {MAX_TERM_YEARS}"),
        ));
    }
    Ok(())
}

fn require_annual_rate(annual_rate_percent: f64) -> Result<f64, CalcError> {
    let rate = require_non_negative("annual_rate_percent", annual_rate_percent)?;
    if rate > MAX_ANNUAL_RATE_PERCENT {
        return Err(CalcError::invalid(
            "annual_rate_percent",
            format!("must be <= {MAX_ANNUAL_RATE_PERCENT}"),
        ));
    }
    Ok(rate)
}

/// Large principals compounded over long horizons can still overflow `f64`.
fn ensure_finite(result: &AmortizationResult) -> Result<(), CalcError> {
    let totals = [
        result.total_amount,
        result.total_contributed,
        result.total_interest,
    ];
    let series = result
        .series
        .iter()
        .flat_map(|point| [point.balance, point.contributed, point.interest]);
    if totals.into_iter().chain(series).all(f64::is_finite) {
        Ok(())
    } else {
        Err(CalcError::invalid(
            "principal",
            "result exceeds the representable range",
        ))
    }
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64
}

fn year_label(year: u32) -> String {
    format!("Year {year}")
}

fn repayment_schedule(principal: f64, rate: f64, years: u32) -> AmortizationResult {
    let months = years * MONTHS_PER_YEAR;
    let payment = monthly_payment(principal, rate, months);

    let mut series = Vec::with_capacity(years as usize + 1);
    series.push(SeriesPoint {
        label: year_label(0),
        balance: principal,
        contributed: 0.0,
        interest: 0.0,
    });

    let mut balance = principal;
    let mut months_left = months;
    for year in 1..=years {
        let mut yearly_interest = 0.0;
        for _ in 0..MONTHS_PER_YEAR {
            yearly_interest += balance * rate;
            months_left -= 1;
            // Equals `balance - (payment - interest)`; reaches exactly zero
            // after the last payment.
            balance = (payment * annuity_factor(rate, months_left)).max(0.0);
        }
        series.push(SeriesPoint {
            label: year_label(year),
            balance,
            contributed: payment * (year * MONTHS_PER_YEAR) as f64,
            interest: yearly_interest,
        });
    }

    let total_paid = payment * months as f64;
    AmortizationResult {
        shape: AmortizationShape::Repayment,
        monthly_payment: Some(payment),
        total_amount: total_paid,
        total_contributed: principal,
        total_interest: total_paid - principal,
        series,
    }
}

fn growth_projection(
    seed: f64,
    contribution: f64,
    rate: f64,
    years: u32,
    label: impl Fn(u32) -> String,
) -> AmortizationResult {
    let months = years * MONTHS_PER_YEAR;

    let mut series = Vec::with_capacity(years as usize + 1);
    series.push(SeriesPoint {
        label: label(0),
        balance: seed,
        contributed: seed,
        interest: 0.0,
    });

    let mut balance = seed;
    for year in 1..=years {
        let start_balance = balance;
        for _ in 0..MONTHS_PER_YEAR {
            balance += balance * rate + contribution;
        }
        series.push(SeriesPoint {
            label: label(year),
            balance,
            contributed: contributions_to_date(seed, contribution, year * MONTHS_PER_YEAR),
            interest: balance - start_balance - contribution * MONTHS_PER_YEAR as f64,
        });
    }

    let future = future_value(seed, contribution, rate, months);
    let total_contributed = contributions_to_date(seed, contribution, months);
    AmortizationResult {
        shape: AmortizationShape::Growth,
        monthly_payment: None,
        total_amount: future,
        total_contributed,
        total_interest: future - total_contributed,
        series,
    }
}

fn contributions_to_date(seed: f64, contribution: f64, months: u32) -> f64 {
    seed + contribution * months as f64
}
