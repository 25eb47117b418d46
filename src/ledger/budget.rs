use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::book::Document;
use super::period;

const WARNING_SHARE: f64 = 0.8;

/// A spending guardrail for a specific category. `spent` is always derived
/// from the ledger, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: u64,
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    #[serde(default)]
    pub rollover: bool,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit: f64, period: BudgetPeriod) -> Self {
        Self {
            id: 0,
            category: category.into(),
            limit,
            period,
            rollover: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Week,
    Month,
}

impl BudgetPeriod {
    /// Start of the window containing `today`: Monday for weekly budgets,
    /// the first of the month for monthly ones.
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            BudgetPeriod::Week => period::week_start(today),
            BudgetPeriod::Month => period::month_start(today),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Ok,
    Warning,
    Exceeded,
}

/// Derived consumption of one budget for its current window.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetReport {
    pub budget_id: u64,
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub status: BudgetStatus,
}

/// Recomputes every budget against the ledger. Expenses of the matching
/// category inside `[window_start, today]` count; transfers never do.
pub fn consumption(doc: &Document, today: NaiveDate) -> Vec<BudgetReport> {
    doc.budgets
        .iter()
        .map(|budget| {
            let start = budget.period.window_start(today);
            let spent: f64 = doc
                .transactions
                .iter()
                .filter_map(|entry| match entry {
                    super::transaction::Entry::Expense(txn) => Some(txn),
                    _ => None,
                })
                .filter(|txn| {
                    txn.category == budget.category && txn.date >= start && txn.date <= today
                })
                .map(|txn| txn.amount)
                .sum();
            let status = if spent >= budget.limit {
                BudgetStatus::Exceeded
            } else if spent >= WARNING_SHARE * budget.limit {
                BudgetStatus::Warning
            } else {
                BudgetStatus::Ok
            };
            let percentage = if budget.limit > 0.0 {
                spent / budget.limit * 100.0
            } else {
                0.0
            };
            BudgetReport {
                budget_id: budget.id,
                category: budget.category.clone(),
                limit: budget.limit,
                spent,
                remaining: budget.limit - spent,
                percentage,
                status,
            }
        })
        .collect()
}
