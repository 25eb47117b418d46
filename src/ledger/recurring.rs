use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::book::Document;
use super::source::SourceRef;
use super::transaction::{TransactionInput, TransactionKind};

/// A rule that materializes at most one transaction per elapsed scheduling
/// period. Missed periods are not backfilled: after a run the timestamp
/// jumps straight to the run date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringRule {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub source: SourceRef,
    pub category: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub comment: String,
    #[serde(rename = "lastExecutedDate", default)]
    pub last_executed: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Whether a rule last run on `last` is due again on `today`.
    pub fn is_due(&self, last: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Frequency::Daily => today != last,
            Frequency::Weekly => (today - last).num_days() >= 7,
            Frequency::Monthly => today.month() != last.month() || today.year() != last.year(),
        }
    }
}

impl RecurringRule {
    fn is_due(&self, today: NaiveDate) -> bool {
        match self.last_executed {
            Some(last) => self.frequency.is_due(last, today),
            // Never-executed rules fire on the first run.
            None => true,
        }
    }

    fn input(&self, date: NaiveDate) -> TransactionInput {
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

/// Materializes every due rule once and advances its timestamp to `today`.
/// Returns the ids of the transactions created. Meant to run at application
/// start.
pub fn run_due(doc: &mut Document, today: NaiveDate) -> Vec<u64> {
    let due: Vec<(u64, TransactionInput)> = doc
        .recurring
        .iter()
        .filter(|rule| rule.is_due(today))
        .map(|rule| (rule.id, rule.input(today)))
        .collect();

    let mut created = Vec::new();
    for (rule_id, input) in due {
        match doc.create_transaction(input) {
            Ok(id) => {
                if let Some(rule) = doc.recurring.iter_mut().find(|r| r.id == rule_id) {
                    rule.last_executed = Some(today);
                }
                tracing::info!(rule = rule_id, transaction = id, "materialized recurring rule");
                created.push(id);
            }
            Err(err) => {
                tracing::warn!(rule = rule_id, error = %err, "skipped recurring rule");
            }
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doc_with_rule(frequency: Frequency, last: Option<NaiveDate>) -> Document {
        let mut doc = Document::new();
        let card = doc.add_card("Карта", "Банк", 100_000.0);
        doc.add_recurring(RecurringRule {
            id: 0,
            kind: TransactionKind::Expense,
            amount: 1_000.0,
            source: SourceRef::card(card),
            category: "Подписки".into(),
            frequency,
            comment: String::new(),
            last_executed: last,
        });
        doc
    }

    #[test]
    fn monthly_rule_fires_once_even_after_several_skipped_months() {
        let today = date(2025, 6, 15);
        let mut doc = doc_with_rule(Frequency::Monthly, Some(date(2025, 2, 10)));
        let created = run_due(&mut doc, today);
        assert_eq!(created.len(), 1);
        assert_eq!(doc.recurring[0].last_executed, Some(today));
        // A second run the same day creates nothing.
        assert!(run_due(&mut doc, today).is_empty());
        assert_eq!(doc.transactions.len(), 1);
    }

    #[test]
    fn monthly_rule_does_not_fire_within_the_same_month() {
        let mut doc = doc_with_rule(Frequency::Monthly, Some(date(2025, 6, 1)));
        assert!(run_due(&mut doc, date(2025, 6, 30)).is_empty());
        assert!(!run_due(&mut doc, date(2025, 7, 1)).is_empty());
    }

    #[test]
    fn weekly_rule_needs_seven_elapsed_days() {
        let mut doc = doc_with_rule(Frequency::Weekly, Some(date(2025, 6, 2)));
        assert!(run_due(&mut doc, date(2025, 6, 8)).is_empty());
        assert_eq!(run_due(&mut doc, date(2025, 6, 9)).len(), 1);
    }

    #[test]
    fn daily_rule_fires_on_any_other_day() {
        let mut doc = doc_with_rule(Frequency::Daily, Some(date(2025, 6, 2)));
        assert!(run_due(&mut doc, date(2025, 6, 2)).is_empty());
        assert_eq!(run_due(&mut doc, date(2025, 6, 3)).len(), 1);
    }

    #[test]
    fn never_executed_rule_fires_immediately() {
        let mut doc = doc_with_rule(Frequency::Monthly, None);
        assert_eq!(run_due(&mut doc, date(2025, 6, 2)).len(), 1);
    }

    #[test]
    fn materialized_transactions_move_the_balance() {
        let today = date(2025, 6, 15);
        let mut doc = doc_with_rule(Frequency::Daily, None);
        let card = doc.cards[0].id;
        run_due(&mut doc, today);
        assert_eq!(doc.balance_of(SourceRef::card(card)).unwrap(), 99_000.0);
    }
}
