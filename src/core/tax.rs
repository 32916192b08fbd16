use serde::Serialize;

use super::error::{CalcError, require_non_negative};

pub const STANDARD_DEDUCTION: f64 = 12_950.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeductionKind {
    Standard,
    Itemized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub floor: f64,
    /// `None` for the open-ended top bracket.
    pub ceiling: Option<f64>,
    pub rate: f64,
}

pub const TAX_BRACKETS: [TaxBracket; 7] = [
    TaxBracket {
        floor: 0.0,
        ceiling: Some(10_000.0),
        rate: 0.10,
    },
    TaxBracket {
        floor: 10_000.0,
        ceiling: Some(40_000.0),
        rate: 0.12,
    },
    TaxBracket {
        floor: 40_000.0,
        ceiling: Some(85_000.0),
        rate: 0.22,
    },
    TaxBracket {
        floor: 85_000.0,
        ceiling: Some(165_000.0),
        rate: 0.24,
    },
    TaxBracket {
        floor: 165_000.0,
        ceiling: Some(210_000.0),
        rate: 0.32,
    },
    TaxBracket {
        floor: 210_000.0,
        ceiling: Some(520_000.0),
        rate: 0.35,
    },
    TaxBracket {
        floor: 520_000.0,
        ceiling: None,
        rate: 0.37,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deductions {
    pub mortgage_interest: f64,
    pub charitable_donations: f64,
    pub medical_expenses: f64,
    pub education_expenses: f64,
    pub retirement_contributions: f64,
}

impl Deductions {
    pub fn itemized_total(&self) -> f64 {
        self.mortgage_interest
            + self.charitable_donations
            + self.medical_expenses
            + self.education_expenses
            + self.retirement_contributions
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxInputs {
    pub filing_status: FilingStatus,
    pub annual_income: f64,
    pub additional_income: f64,
    pub federal_withheld: f64,
    pub state_withheld: f64,
    pub deductions: Deductions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub filing_status: FilingStatus,
    pub total_income: f64,
    pub itemized_deductions: f64,
    pub deduction_applied: f64,
    pub deduction_kind: DeductionKind,
    pub taxable_income: f64,
    pub tax_amount: f64,
    pub total_withheld: f64,
    /// Positive when more is owed, negative when a refund is due.
    pub balance_due: f64,
    pub refund: f64,
    pub amount_owed: f64,
    pub effective_rate: f64,
}

pub fn estimate_tax(inputs: &TaxInputs) -> Result<TaxEstimate, CalcError> {
    validate_inputs(inputs)?;

    let total_income = inputs.annual_income + inputs.additional_income;
    let itemized_deductions = inputs.deductions.itemized_total();
    let (deduction_applied, deduction_kind) = if itemized_deductions > STANDARD_DEDUCTION {
        (itemized_deductions, DeductionKind::Itemized)
    } else {
        (STANDARD_DEDUCTION, DeductionKind::Standard)
    };

    let taxable_income = (total_income - deduction_applied).max(0.0);
    let tax_amount = bracket_tax(taxable_income);
    let total_withheld = inputs.federal_withheld + inputs.state_withheld;
    let balance_due = tax_amount - total_withheld;
    let effective_rate = if total_income > 0.0 {
        tax_amount / total_income
    } else {
        0.0
    };

    Ok(TaxEstimate {
        filing_status: inputs.filing_status,
        total_income,
        itemized_deductions,
        deduction_applied,
        deduction_kind,
        taxable_income,
        tax_amount,
        total_withheld,
        balance_due,
        refund: (-balance_due).max(0.0),
        amount_owed: balance_due.max(0.0),
        effective_rate,
    })
}

/// Progressive tax on `taxable_income`: each bracket taxes only the slice of
/// income between its floor and ceiling.
pub fn bracket_tax(taxable_income: f64) -> f64 {
    let income = taxable_income.max(0.0);
    TAX_BRACKETS
        .iter()
        .take_while(|bracket| income > bracket.floor)
        .map(|bracket| {
            let top = bracket.ceiling.map_or(income, |ceiling| income.min(ceiling));
            (top - bracket.floor) * bracket.rate
        })
        .sum()
}

pub fn marginal_rate(taxable_income: f64) -> f64 {
    TAX_BRACKETS
        .iter()
        .rev()
        .find(|bracket| taxable_income > bracket.floor)
        .map_or(TAX_BRACKETS[0].rate, |bracket| bracket.rate)
}

fn validate_inputs(inputs: &TaxInputs) -> Result<(), CalcError> {
    let deductions = &inputs.deductions;
    for (name, value) in [
        ("annual_income", inputs.annual_income),
        ("additional_income", inputs.additional_income),
        ("federal_withheld", inputs.federal_withheld),
        ("state_withheld", inputs.state_withheld),
        ("mortgage_interest", deductions.mortgage_interest),
        ("charitable_donations", deductions.charitable_donations),
        ("medical_expenses", deductions.medical_expenses),
        ("education_expenses", deductions.education_expenses),
        ("retirement_contributions", deductions.retirement_contributions),
    ] {
        require_non_negative(name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> TaxInputs {
        TaxInputs {
            filing_status: FilingStatus::Single,
            annual_income: 75_000.0,
            additional_income: 5_000.0,
            federal_withheld: 8_000.0,
            state_withheld: 2_000.0,
            deductions: Deductions::default(),
        }
    }

    #[test]
    fn bracket_tax_matches_published_bases() {
        assert_approx(bracket_tax(0.0), 0.0);
        assert_approx(bracket_tax(10_000.0), 1_000.0);
        assert_approx(bracket_tax(40_000.0), 4_600.0);
        assert_approx(bracket_tax(85_000.0), 14_500.0);
        assert_approx(bracket_tax(165_000.0), 33_700.0);
        assert_approx(bracket_tax(210_000.0), 48_100.0);
        assert_approx(bracket_tax(520_000.0), 156_600.0);
        assert_approx(bracket_tax(600_000.0), 156_600.0 + 80_000.0 * 0.37);
    }

    #[test]
    fn bracket_tax_inside_bracket() {
        assert_approx(bracket_tax(25_000.0), 1_000.0 + 15_000.0 * 0.12);
        assert_approx(bracket_tax(67_050.0), 4_600.0 + 27_050.0 * 0.22);
    }

    #[test]
    fn standard_deduction_applies_when_itemized_is_smaller() {
        let mut inputs = sample_inputs();
        inputs.deductions.charitable_donations = 1_000.0;
        let estimate = estimate_tax(&inputs).expect("valid inputs");

        assert_eq!(estimate.deduction_kind, DeductionKind::Standard);
        assert_approx(estimate.itemized_deductions, 1_000.0);
        assert_approx(estimate.deduction_applied, STANDARD_DEDUCTION);
        assert_approx(estimate.total_income, 80_000.0);
        assert_approx(estimate.taxable_income, 67_050.0);
        assert_approx(estimate.tax_amount, 4_600.0 + 27_050.0 * 0.22);
    }

    #[test]
    fn itemized_deductions_win_when_larger() {
        let mut inputs = sample_inputs();
        inputs.deductions = Deductions {
            mortgage_interest: 9_000.0,
            charitable_donations: 3_000.0,
            medical_expenses: 1_500.0,
            education_expenses: 500.0,
            retirement_contributions: 6_000.0,
        };
        let estimate = estimate_tax(&inputs).expect("valid inputs");

        assert_eq!(estimate.deduction_kind, DeductionKind::Itemized);
        assert_approx(estimate.deduction_applied, 20_000.0);
        assert_approx(estimate.taxable_income, 60_000.0);
    }

    #[test]
    fn refund_when_withholding_exceeds_tax() {
        let mut inputs = sample_inputs();
        inputs.federal_withheld = 20_000.0;
        let estimate = estimate_tax(&inputs).expect("valid inputs");

        assert!(estimate.balance_due < 0.0);
        assert_approx(estimate.refund, -estimate.balance_due);
        assert_approx(estimate.amount_owed, 0.0);
    }

    #[test]
    fn owed_when_withholding_falls_short() {
        let mut inputs = sample_inputs();
        inputs.federal_withheld = 0.0;
        inputs.state_withheld = 0.0;
        let estimate = estimate_tax(&inputs).expect("valid inputs");

        assert_approx(estimate.amount_owed, estimate.tax_amount);
        assert_approx(estimate.refund, 0.0);
    }

    #[test]
    fn income_below_deduction_owes_nothing() {
        let inputs = TaxInputs {
            annual_income: 9_000.0,
            additional_income: 0.0,
            federal_withheld: 300.0,
            state_withheld: 0.0,
            ..sample_inputs()
        };
        let estimate = estimate_tax(&inputs).expect("valid inputs");
        assert_approx(estimate.taxable_income, 0.0);
        assert_approx(estimate.tax_amount, 0.0);
        assert_approx(estimate.refund, 300.0);
    }

    #[test]
    fn zero_income_has_zero_effective_rate() {
        let inputs = TaxInputs {
            annual_income: 0.0,
            additional_income: 0.0,
            federal_withheld: 0.0,
            state_withheld: 0.0,
            ..sample_inputs()
        };
        let estimate = estimate_tax(&inputs).expect("valid inputs");
        assert_approx(estimate.effective_rate, 0.0);
    }

    #[test]
    fn filing_status_is_echoed_without_changing_tax() {
        let single = estimate_tax(&sample_inputs()).expect("valid inputs");
        let joint = estimate_tax(&TaxInputs {
            filing_status: FilingStatus::MarriedJoint,
            ..sample_inputs()
        })
        .expect("valid inputs");

        assert_eq!(joint.filing_status, FilingStatus::MarriedJoint);
        assert_approx(joint.tax_amount, single.tax_amount);
    }

    #[test]
    fn rejects_negative_amounts() {
        let mut inputs = sample_inputs();
        inputs.deductions.medical_expenses = -1.0;
        let err = estimate_tax(&inputs).expect_err("negative deduction");
        assert_eq!(err.parameter(), "medical_expenses");

        let mut inputs = sample_inputs();
        inputs.annual_income = f64::INFINITY;
        let err = estimate_tax(&inputs).expect_err("non-finite income");
        assert_eq!(err.parameter(), "annual_income");
    }

    #[test]
    fn marginal_rate_follows_brackets() {
        assert_approx(marginal_rate(0.0), 0.10);
        assert_approx(marginal_rate(10_000.0), 0.10);
        assert_approx(marginal_rate(10_000.01), 0.12);
        assert_approx(marginal_rate(1_000_000.0), 0.37);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_tax_is_monotone_and_below_top_rate(
            income_cents in 0u64..100_000_000,
            step_cents in 0u64..1_000_000
        ) {
            let low = income_cents as f64 / 100.0;
            let high = low + step_cents as f64 / 100.0;
            let low_tax = bracket_tax(low);
            let high_tax = bracket_tax(high);
            prop_assert!(high_tax + 1e-9 >= low_tax);
            prop_assert!(high_tax - low_tax <= (high - low) * 0.37 + 1e-6);
            prop_assert!(low_tax <= low * 0.37 + 1e-9);
        }

        #[test]
        fn prop_refund_and_owed_are_exclusive(
            income in 0u32..400_000,
            withheld in 0u32..120_000
        ) {
            let inputs = TaxInputs {
                filing_status: FilingStatus::HeadOfHousehold,
                annual_income: income as f64,
                additional_income: 0.0,
                federal_withheld: withheld as f64,
                state_withheld: 0.0,
                deductions: Deductions::default(),
            };
            let estimate = estimate_tax(&inputs).expect("valid inputs");
            prop_assert!(estimate.refund == 0.0 || estimate.amount_owed == 0.0);
            prop_assert!(estimate.refund >= 0.0 && estimate.amount_owed >= 0.0);
            prop_assert!((estimate.amount_owed - estimate.refund - estimate.balance_due).abs() <= 1e-9);
        }
    }
}
