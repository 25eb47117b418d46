use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calc;
use crate::errors::LedgerError;
use crate::ledger::period;

/// Display label used when a reference no longer resolves to a live source.
pub const UNKNOWN_SOURCE_LABEL: &str = "Неизвестно";

/// A bank is a plain named grouping; cards, deposits, and credits refer to it
/// by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bank {
    pub id: u64,
    pub name: String,
}

/// A bank card holding a mutable balance. The balance may go negative; the
/// ledger does not block overdrafts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: u64,
    pub name: String,
    #[serde(rename = "bank")]
    pub bank_name: String,
    pub balance: f64,
    #[serde(rename = "showOnDashboard", default = "default_true")]
    pub show_on_dashboard: bool,
}

/// A cash holding. Like cards, the amount may go negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cash {
    pub id: u64,
    pub name: String,
    pub amount: f64,
    #[serde(rename = "showOnDashboard", default = "default_true")]
    pub show_on_dashboard: bool,
}

/// A fixed-term deposit. Its current value is always derived from the
/// principal by monthly compounding, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deposit {
    pub id: u64,
    pub name: String,
    #[serde(rename = "bank")]
    pub bank_name: String,
    #[serde(rename = "amount")]
    pub principal: f64,
    #[serde(rename = "rate")]
    pub annual_rate: f64,
    #[serde(rename = "term")]
    pub term_months: u32,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "showOnDashboard", default = "default_true")]
    pub show_on_dashboard: bool,
}

impl Deposit {
    /// Compounded value as of `today`. Growth is capped at `term_months`.
    pub fn value_on(&self, today: NaiveDate) -> f64 {
        let elapsed = period::months_between(self.start_date.date_naive(), today);
        calc::deposit_value(self.principal, self.annual_rate, self.term_months, elapsed)
    }
}

/// An outstanding credit. `remaining` is the snapshot taken at creation
/// (total minus down payment); it is not amortized over time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credit {
    pub id: u64,
    pub name: String,
    #[serde(rename = "bank")]
    pub bank_name: String,
    #[serde(rename = "amount")]
    pub remaining: f64,
    #[serde(rename = "rate")]
    pub annual_rate: f64,
    #[serde(rename = "term")]
    pub term_months: u32,
    #[serde(rename = "downPayment", default)]
    pub down_payment: f64,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Card,
    Cash,
}

impl SourceKind {
    fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Card => "card",
            SourceKind::Cash => "cash",
        }
    }
}

/// Typed reference to a balance-holding source (a card or a cash record).
///
/// On the wire this is the legacy `"card-3"` / `"cash-7"` string: kind,
/// hyphen, numeric id. Parsing happens once at the boundary; the rest of the
/// crate only ever sees the typed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: u64,
}

impl SourceRef {
    pub fn card(id: u64) -> Self {
        Self {
            kind: SourceKind::Card,
            id,
        }
    }

    pub fn cash(id: u64) -> Self {
        Self {
            kind: SourceKind::Cash,
            id,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for SourceRef {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(LedgerError::Validation("source required".into()));
        }
        let (kind, id) = raw
            .split_once('-')
            .ok_or_else(|| invalid_ref(raw))?;
        let kind = match kind {
            "card" => SourceKind::Card,
            "cash" => SourceKind::Cash,
            _ => return Err(invalid_ref(raw)),
        };
        let id: u64 = id.parse().map_err(|_| invalid_ref(raw))?;
        Ok(SourceRef { kind, id })
    }
}

impl TryFrom<String> for SourceRef {
    type Error = LedgerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<SourceRef> for String {
    fn from(value: SourceRef) -> Self {
        value.to_string()
    }
}

fn invalid_ref(raw: &str) -> LedgerError {
    LedgerError::Validation(format!("invalid source reference `{}`", raw))
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn source_ref_parses_kind_and_numeric_id() {
        let parsed: SourceRef = "card-3".parse().unwrap();
        assert_eq!(parsed, SourceRef::card(3));
        let parsed: SourceRef = "cash-7".parse().unwrap();
        assert_eq!(parsed, SourceRef::cash(7));
    }

    #[test]
    fn empty_source_ref_is_a_validation_error() {
        let err = "".parse::<SourceRef>().expect_err("empty ref must fail");
        assert!(
            matches!(err, LedgerError::Validation(ref message) if message == "source required"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn malformed_source_refs_are_rejected() {
        for raw in ["deposit-1", "card", "card-", "card-x", "3-card"] {
            assert!(
                raw.parse::<SourceRef>().is_err(),
                "expected `{raw}` to be rejected"
            );
        }
    }

    #[test]
    fn source_ref_round_trips_through_display() {
        let reference = SourceRef::cash(12);
        let encoded = reference.to_string();
        assert_eq!(encoded, "cash-12");
        assert_eq!(encoded.parse::<SourceRef>().unwrap(), reference);
    }

    #[test]
    fn deposit_value_is_principal_before_start() {
        let deposit = Deposit {
            id: 1,
            name: "Накопительный".into(),
            bank_name: "Kapital Bank".into(),
            principal: 500_000.0,
            annual_rate: 14.0,
            term_months: 12,
            start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            show_on_dashboard: true,
        };
        let before = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        assert_eq!(deposit.value_on(before), 500_000.0);
    }
}
