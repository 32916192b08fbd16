use std::io::Read;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::{defaults, run_http_server};
use crate::config::AppConfig;
use crate::core::{
    AmortizationResult, Deductions, FilingStatus, InvestmentInputs, LoanInputs, MortgageInputs,
    MortgageResult, RetirementInputs, RetirementResult, ScamScanResult, TaxEstimate, TaxInputs,
    calculate_investment, calculate_loan, calculate_mortgage, calculate_retirement, estimate_tax,
    scan_for_scam_signals,
};
use crate::error::AppResult;
use crate::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "finkit",
    about = "Loan, mortgage, investment, retirement and tax calculators plus a scam-text scanner",
    version
)]
pub struct Cli {
    /// Print results as JSON instead of a text summary
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the JSON HTTP API
    Serve(ServeArgs),
    /// Repayment schedule for a fixed-rate loan
    Loan(LoanArgs),
    /// Repayment schedule for a home purchase after the down payment
    Mortgage(MortgageArgs),
    /// Growth of an investment with monthly contributions
    Invest(InvestArgs),
    /// Savings projection up to retirement age
    Retire(RetireArgs),
    /// Income tax estimate with standard or itemized deductions
    Tax(TaxArgs),
    /// Score a message for financial-scam indicators
    Scan(ScanArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override FINKIT_HOST
    #[arg(long)]
    host: Option<String>,
    /// Override FINKIT_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct LoanArgs {
    #[arg(long, default_value_t = defaults::LOAN_AMOUNT)]
    amount: f64,
    #[arg(long, default_value_t = defaults::LOAN_RATE, help = "Annual interest rate in percent")]
    rate: f64,
    #[arg(long, default_value_t = defaults::LOAN_TERM_YEARS)]
    years: u32,
}

#[derive(Args, Debug)]
struct MortgageArgs {
    #[arg(long, default_value_t = defaults::HOME_PRICE)]
    home_price: f64,
    #[arg(long, default_value_t = defaults::DOWN_PAYMENT)]
    down_payment: f64,
    #[arg(long, default_value_t = defaults::MORTGAGE_RATE, help = "Annual interest rate in percent")]
    rate: f64,
    #[arg(long, default_value_t = defaults::MORTGAGE_TERM_YEARS)]
    years: u32,
}

#[derive(Args, Debug)]
struct InvestArgs {
    #[arg(long, default_value_t = defaults::INITIAL_INVESTMENT)]
    initial: f64,
    #[arg(long, default_value_t = defaults::MONTHLY_CONTRIBUTION)]
    monthly: f64,
    #[arg(long, default_value_t = defaults::INVESTMENT_RATE, help = "Expected annual return in percent")]
    rate: f64,
    #[arg(long, default_value_t = defaults::INVESTMENT_YEARS)]
    years: u32,
}

#[derive(Args, Debug)]
struct RetireArgs {
    #[arg(long, default_value_t = defaults::CURRENT_AGE)]
    current_age: u32,
    #[arg(long, default_value_t = defaults::RETIREMENT_AGE)]
    retirement_age: u32,
    #[arg(long, default_value_t = defaults::CURRENT_SAVINGS)]
    savings: f64,
    #[arg(long, default_value_t = defaults::MONTHLY_SAVINGS)]
    monthly: f64,
    #[arg(long, default_value_t = defaults::RETIREMENT_RATE, help = "Expected annual return in percent")]
    rate: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::MarriedJoint => FilingStatus::MarriedJoint,
            CliFilingStatus::MarriedSeparate => FilingStatus::MarriedSeparate,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Args, Debug)]
struct TaxArgs {
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
    filing_status: CliFilingStatus,
    #[arg(long, default_value_t = 0.0, help = "Wages and salary for the year")]
    income: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Interest, dividends, rental income, etc."
    )]
    additional_income: f64,
    #[arg(long, default_value_t = 0.0)]
    federal_withheld: f64,
    #[arg(long, default_value_t = 0.0)]
    state_withheld: f64,
    #[arg(long, default_value_t = 0.0)]
    mortgage_interest: f64,
    #[arg(long, default_value_t = 0.0)]
    charitable_donations: f64,
    #[arg(long, default_value_t = 0.0)]
    medical_expenses: f64,
    #[arg(long, default_value_t = 0.0)]
    education_expenses: f64,
    #[arg(long, default_value_t = 0.0)]
    retirement_contributions: f64,
}

impl From<TaxArgs> for TaxInputs {
    fn from(args: TaxArgs) -> Self {
        TaxInputs {
            filing_status: args.filing_status.into(),
            annual_income: args.income,
            additional_income: args.additional_income,
            federal_withheld: args.federal_withheld,
            state_withheld: args.state_withheld,
            deductions: Deductions {
                mortgage_interest: args.mortgage_interest,
                charitable_donations: args.charitable_donations,
                medical_expenses: args.medical_expenses,
                education_expenses: args.education_expenses,
                retirement_contributions: args.retirement_contributions,
            },
        }
    }
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Message to scan; read from stdin when omitted
    #[arg(long)]
    text: Option<String>,
}

pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Loan(args) => {
            let result = calculate_loan(&LoanInputs {
                amount: args.amount,
                annual_rate_percent: args.rate,
                term_years: args.years,
            })?;
            emit(json, &result, render_repayment)
        }
        Command::Mortgage(args) => {
            let result = calculate_mortgage(&MortgageInputs {
                home_price: args.home_price,
                down_payment: args.down_payment,
                annual_rate_percent: args.rate,
                term_years: args.years,
            })?;
            emit(json, &result, render_mortgage)
        }
        Command::Invest(args) => {
            let result = calculate_investment(&InvestmentInputs {
                initial_investment: args.initial,
                monthly_contribution: args.monthly,
                annual_rate_percent: args.rate,
                years: args.years,
            })?;
            emit(json, &result, render_growth)
        }
        Command::Retire(args) => {
            let result = calculate_retirement(&RetirementInputs {
                current_age: args.current_age,
                retirement_age: args.retirement_age,
                current_savings: args.savings,
                monthly_savings: args.monthly,
                annual_rate_percent: args.rate,
            })?;
            emit(json, &result, render_retirement)
        }
        Command::Tax(args) => {
            let estimate = estimate_tax(&TaxInputs::from(args))?;
            emit(json, &estimate, render_tax)
        }
        Command::Scan(args) => {
            let text = match args.text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let result = scan_for_scam_signals(&text);
            emit(json, &result, render_scan)
        }
    }
}

async fn serve(mut args: ServeArgs) -> AppResult<()> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;
    let addr = config.server.socket_addr()?;
    run_http_server(addr).await?;
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, render: fn(&T) -> String) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

fn money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn render_series(out: &mut String, result: &AmortizationResult, balance_header: &str) {
    out.push_str(&format!(
        "\n{:<10} {:>16} {:>16} {:>14}\n",
        "Period", balance_header, "Paid in", "Interest"
    ));
    for point in &result.series {
        out.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>14}\n",
            point.label,
            money(point.balance),
            money(point.contributed),
            money(point.interest)
        ));
    }
}

fn render_repayment(result: &AmortizationResult) -> String {
    let mut out = String::new();
    if let Some(payment) = result.monthly_payment {
        out.push_str(&format!("Monthly payment:  {}\n", money(payment)));
    }
    out.push_str(&format!(
        "Total payment:    {}\nTotal interest:   {}\n",
        money(result.total_amount),
        money(result.total_interest)
    ));
    render_series(&mut out, result, "Balance");
    out
}

fn render_mortgage(result: &MortgageResult) -> String {
    let mut out = format!(
        "Home price:       {}\nDown payment:     {}\nLoan amount:      {}\n",
        money(result.home_price),
        money(result.down_payment),
        money(result.loan_amount)
    );
    out.push_str(&render_repayment(&result.schedule));
    out
}

fn render_growth(result: &AmortizationResult) -> String {
    let mut out = format!(
        "Future value:        {}\nTotal contributions: {}\nInterest earned:     {}\n",
        money(result.total_amount),
        money(result.total_contributed),
        money(result.total_interest)
    );
    render_series(&mut out, result, "Balance");
    out
}

fn render_retirement(result: &RetirementResult) -> String {
    let mut out = format!(
        "Years to retirement: {} (age {} to {})\n",
        result.years_to_retirement, result.current_age, result.retirement_age
    );
    out.push_str(&render_growth(&result.projection));
    out
}

fn render_tax(estimate: &TaxEstimate) -> String {
    let settlement = if estimate.refund > 0.0 {
        format!("Refund:           {}", money(estimate.refund))
    } else {
        format!("Amount owed:      {}", money(estimate.amount_owed))
    };
    format!(
        "Total income:     {}\n\
         Deduction:        {} ({:?})\n\
         Taxable income:   {}\n\
         Estimated tax:    {}\n\
         Withheld:         {}\n\
         {settlement}\n\
         Effective rate:   {:.2}%\n",
        money(estimate.total_income),
        money(estimate.deduction_applied),
        estimate.deduction_kind,
        money(estimate.taxable_income),
        money(estimate.tax_amount),
        money(estimate.total_withheld),
        estimate.effective_rate * 100.0
    )
}

fn render_scan(result: &ScamScanResult) -> String {
    let mut out = format!(
        "Risk: {} ({}/100)\n{}\n",
        result.risk_level,
        result.risk_score,
        result.risk_level.advisory()
    );

    let sections: [(&str, Vec<&str>); 5] = [
        ("Keywords", result.matched_keywords.clone()),
        (
            "Suspicious emails",
            result.matched_emails.iter().map(String::as_str).collect(),
        ),
        (
            "Links",
            result.matched_urls.iter().map(String::as_str).collect(),
        ),
        ("Urgency", result.urgency_hits.clone()),
        ("Promises", result.promise_hits.clone()),
    ];
    for (title, items) in sections {
        if !items.is_empty() {
            out.push_str(&format!("{title}: {}\n", items.join(", ")));
        }
    }
    out
}
