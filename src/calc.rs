//! Pure interest arithmetic, independent of any stored ledger state.
//!
//! Compounding is iterative on purpose: the per-month loop mirrors how the
//! ledger accrues value month by month, and the floating-point accumulation
//! order is part of the observable contract.

use serde::{Deserialize, Serialize};

/// Compounded value of a deposit after `months_elapsed` whole months.
///
/// The monthly rate is `annual_rate / 100 / 12`; growth stops after
/// `term_months` iterations. Non-positive elapsed time returns the
/// principal unchanged.
pub fn deposit_value(
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    months_elapsed: i32,
) -> f64 {
    if months_elapsed <= 0 {
        return principal;
    }
    let monthly_rate = annual_rate / 100.0 / 12.0;
    let months = (months_elapsed as u32).min(term_months);
    let mut balance = principal;
    for _ in 0..months {
        balance += balance * monthly_rate;
    }
    balance
}

/// Inputs for the what-if deposit calculator. `topup1`/`topup2` are fixed
/// monthly contributions added from month one onward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionInput {
    pub amount: f64,
    pub annual_rate: f64,
    pub term_months: u32,
    pub capitalize: bool,
    #[serde(default)]
    pub topup1: f64,
    #[serde(default)]
    pub topup2: f64,
}

/// One month of the projection schedule. Month zero is the starting
/// snapshot with no interest or topups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionRow {
    pub month: u32,
    pub month_start: f64,
    pub interest: f64,
    pub topups: f64,
    pub month_end: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Projection {
    pub rows: Vec<ProjectionRow>,
    pub initial_amount: f64,
    pub final_amount: f64,
    pub total_topups: f64,
    pub total_interest: f64,
}

/// Month-by-month projection of a prospective deposit.
///
/// When not capitalizing, interest is tracked for reporting but never added
/// to the running balance, so total interest is the plain per-month sum; in
/// the capitalized case it is derived from the final balance instead, since
/// compounding changes the comparison base each month.
pub fn project_deposit(input: &ProjectionInput) -> Projection {
    let monthly_rate = input.annual_rate / 100.0 / 12.0;
    let mut rows = Vec::with_capacity(input.term_months as usize + 1);
    let mut current = input.amount;
    let mut total_topups = 0.0;

    for month in 0..=input.term_months {
        let month_start = current;
        let mut interest = 0.0;
        let mut topups = 0.0;

        if month > 0 {
            interest = month_start * monthly_rate;
            topups = input.topup1 + input.topup2;
            total_topups += topups;
            current = if input.capitalize {
                month_start + interest + topups
            } else {
                month_start + topups
            };
        }

        rows.push(ProjectionRow {
            month,
            month_start,
            interest,
            topups,
            month_end: current,
        });
    }

    let total_interest = if input.capitalize {
        current - input.amount - total_topups
    } else {
        rows.iter().map(|row| row.interest).sum()
    };

    Projection {
        rows,
        initial_amount: input.amount,
        final_amount: current,
        total_topups,
        total_interest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compounding_matches_the_iterative_reference() {
        // Twelve iterations of balance += balance * 0.01 from 1,000,000.
        let mut expected = 1_000_000.0_f64;
        for _ in 0..12 {
            expected += expected * 0.01;
        }
        let value = deposit_value(1_000_000.0, 12.0, 12, 12);
        assert_eq!(value, expected);
        assert!((value - 1_126_825.03).abs() < 0.01, "got {value}");
    }

    #[test]
    fn compounding_is_capped_at_the_term() {
        let at_term = deposit_value(1_000_000.0, 12.0, 12, 12);
        let past_term = deposit_value(1_000_000.0, 12.0, 12, 36);
        assert_eq!(at_term, past_term);
    }

    #[test]
    fn elapsed_zero_or_negative_returns_principal() {
        assert_eq!(deposit_value(5_000.0, 14.0, 12, 0), 5_000.0);
        assert_eq!(deposit_value(5_000.0, 14.0, 12, -3), 5_000.0);
    }

    #[test]
    fn projection_month_zero_is_a_plain_snapshot() {
        let projection = project_deposit(&ProjectionInput {
            amount: 100_000.0,
            annual_rate: 12.0,
            term_months: 3,
            capitalize: true,
            topup1: 0.0,
            topup2: 0.0,
        });
        assert_eq!(projection.rows.len(), 4);
        let first = &projection.rows[0];
        assert_eq!(first.interest, 0.0);
        assert_eq!(first.topups, 0.0);
        assert_eq!(first.month_end, 100_000.0);
    }

    #[test]
    fn capitalized_projection_compounds_monthly() {
        let projection = project_deposit(&ProjectionInput {
            amount: 100_000.0,
            annual_rate: 12.0,
            term_months: 2,
            capitalize: true,
            topup1: 0.0,
            topup2: 0.0,
        });
        assert_eq!(projection.rows[1].interest, 1_000.0);
        assert_eq!(projection.rows[1].month_end, 101_000.0);
        assert_eq!(projection.rows[2].interest, 1_010.0);
        assert_eq!(projection.final_amount, 102_010.0);
        assert!((projection.total_interest - 2_010.0).abs() < 1e-9);
    }

    #[test]
    fn uncapitalized_interest_never_joins_the_balance() {
        let projection = project_deposit(&ProjectionInput {
            amount: 100_000.0,
            annual_rate: 12.0,
            term_months: 3,
            capitalize: false,
            topup1: 500.0,
            topup2: 250.0,
        });
        // Balance only grows by topups.
        assert_eq!(projection.final_amount, 100_000.0 + 3.0 * 750.0);
        assert_eq!(projection.total_topups, 2_250.0);
        // Interest accrues on the topped-up balance each month.
        let expected_interest: f64 = projection.rows.iter().map(|r| r.interest).sum();
        assert_eq!(projection.total_interest, expected_interest);
        assert!(projection.total_interest > 3.0 * 1_000.0);
    }
}
