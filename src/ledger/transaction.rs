use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::source::SourceRef;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Signed balance effect of an amount under this kind.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }

    /// Category substituted when a form leaves the field blank.
    pub fn default_category(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Доход",
            TransactionKind::Expense => "Расход",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Доход",
            TransactionKind::Expense => "Расход",
        }
    }
}

/// A single income or expense against exactly one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub amount: f64,
    pub source: SourceRef,
    pub date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub comment: String,
}

/// A balance movement between two sources. Display names are snapshotted at
/// execution time; renaming a source later does not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transfer {
    pub id: u64,
    pub amount: f64,
    pub from: SourceRef,
    pub to: SourceRef,
    #[serde(rename = "fromName")]
    pub from_name: String,
    #[serde(rename = "toName")]
    pub to_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub comment: String,
}

/// One record of the ledger. Serialized with the legacy `"type"` tag so the
/// persisted `transactions` array stays a single mixed list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Income(Transaction),
    Expense(Transaction),
    Transfer(Transfer),
}

impl Entry {
    pub fn id(&self) -> u64 {
        match self {
            Entry::Income(txn) | Entry::Expense(txn) => txn.id,
            Entry::Transfer(transfer) => transfer.id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Entry::Income(txn) | Entry::Expense(txn) => txn.date,
            Entry::Transfer(transfer) => transfer.date,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Entry::Income(txn) | Entry::Expense(txn) => txn.amount,
            Entry::Transfer(transfer) => transfer.amount,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Entry::Income(txn) | Entry::Expense(txn) => &txn.comment,
            Entry::Transfer(transfer) => &transfer.comment,
        }
    }

    /// The kind and record of a plain income/expense entry, if this is one.
    pub fn transaction(&self) -> Option<(TransactionKind, &Transaction)> {
        match self {
            Entry::Income(txn) => Some((TransactionKind::Income, txn)),
            Entry::Expense(txn) => Some((TransactionKind::Expense, txn)),
            Entry::Transfer(_) => None,
        }
    }

    pub fn transfer(&self) -> Option<&Transfer> {
        match self {
            Entry::Transfer(transfer) => Some(transfer),
            _ => None,
        }
    }
}

/// Validated field set accepted by transaction create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub amount: f64,
    pub source: SourceRef,
    pub date: NaiveDate,
    pub category: String,
    pub comment: String,
}

/// Field set accepted by transfer creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferInput {
    pub from: SourceRef,
    pub to: SourceRef,
    pub amount: f64,
    pub date: NaiveDate,
    pub comment: String,
}

/// Reusable prefill for frequently repeated operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionTemplate {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub source: SourceRef,
    pub category: String,
    #[serde(default)]
    pub comment: String,
}

impl TransactionTemplate {
    /// Instantiates the template as a draft dated `date`.
    pub fn input(&self, date: NaiveDate) -> TransactionInput {
        TransactionInput {
            kind: self.kind,
            amount: self.amount,
            source: self.source,
            date,
            category: self.category.clone(),
            comment: self.comment.clone(),
        }
    }
}
