use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

use super::budget::Budget;
use super::goal::Goal;
use super::recurring::RecurringRule;
use super::source::{Bank, Card, Cash, Credit, Deposit, SourceKind, SourceRef};
use super::transaction::{
    Entry, Transaction, TransactionInput, TransactionTemplate, Transfer, TransferInput,
};

/// The whole application state: one mutable document owned by the caller and
/// passed by reference. Its serialized form is also the import/export file
/// format, so the field set here is the wire contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Document {
    pub banks: Vec<Bank>,
    pub cards: Vec<Card>,
    pub cash: Vec<Cash>,
    pub deposits: Vec<Deposit>,
    pub credits: Vec<Credit>,
    pub transactions: Vec<Entry>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub recurring: Vec<RecurringRule>,
    pub templates: Vec<TransactionTemplate>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free id across every collection. No counter is persisted; the
    /// document shape stays exactly the legacy one.
    fn next_id(&self) -> u64 {
        let max = self
            .banks
            .iter()
            .map(|b| b.id)
            .chain(self.cards.iter().map(|c| c.id))
            .chain(self.cash.iter().map(|c| c.id))
            .chain(self.deposits.iter().map(|d| d.id))
            .chain(self.credits.iter().map(|c| c.id))
            .chain(self.transactions.iter().map(|t| t.id()))
            .chain(self.budgets.iter().map(|b| b.id))
            .chain(self.goals.iter().map(|g| g.id))
            .chain(self.recurring.iter().map(|r| r.id))
            .chain(self.templates.iter().map(|t| t.id))
            .max();
        max.map_or(1, |m| m + 1)
    }

    // ---- source registry ----

    /// Adds `delta` to the balance of the referenced card or cash record.
    /// A reference that no longer resolves is a silent no-op; orphaned
    /// history must not fail balance math elsewhere.
    pub fn apply_delta(&mut self, source: SourceRef, delta: f64) {
        match source.kind {
            SourceKind::Card => {
                if let Some(card) = self.cards.iter_mut().find(|c| c.id == source.id) {
                    card.balance += delta;
                    tracing::debug!(source = %source, delta, balance = card.balance, "balance delta");
                }
            }
            SourceKind::Cash => {
                if let Some(cash) = self.cash.iter_mut().find(|c| c.id == source.id) {
                    cash.amount += delta;
                    tracing::debug!(source = %source, delta, balance = cash.amount, "balance delta");
                }
            }
        }
    }

    /// Current balance of the referenced source, `None` when unresolved.
    pub fn balance_of(&self, source: SourceRef) -> Option<f64> {
        match source.kind {
            SourceKind::Card => self
                .cards
                .iter()
                .find(|c| c.id == source.id)
                .map(|c| c.balance),
            SourceKind::Cash => self
                .cash
                .iter()
                .find(|c| c.id == source.id)
                .map(|c| c.amount),
        }
    }

    /// Display label of a source: cards render as `"name (bank)"`, cash by
    /// its name. `None` when the reference is orphaned.
    pub fn source_label(&self, source: SourceRef) -> Option<String> {
        match source.kind {
            SourceKind::Card => self
                .cards
                .iter()
                .find(|c| c.id == source.id)
                .map(|c| format!("{} ({})", c.name, c.bank_name)),
            SourceKind::Cash => self
                .cash
                .iter()
                .find(|c| c.id == source.id)
                .map(|c| c.name.clone()),
        }
    }

    // ---- transaction ledger ----

    pub fn entry(&self, id: u64) -> Option<&Entry> {
        self.transactions.iter().find(|entry| entry.id() == id)
    }

    /// Appends an income/expense transaction and moves the source balance.
    pub fn create_transaction(&mut self, input: TransactionInput) -> Result<u64> {
        validate_amount(input.amount)?;
        let id = self.next_id();
        let entry = build_entry(id, &input);
        self.transactions.push(entry);
        self.apply_delta(input.source, input.kind.signed(input.amount));
        Ok(id)
    }

    /// Rewrites an existing transaction: the old delta is reversed on the old
    /// source, fields are overwritten, and the new delta is applied on the
    /// (possibly different) new source. Net effect on balances is exactly
    /// `new effect - old effect`.
    pub fn edit_transaction(&mut self, id: u64, input: TransactionInput) -> Result<()> {
        validate_amount(input.amount)?;
        let position = self
            .transactions
            .iter()
            .position(|entry| entry.id() == id && entry.transaction().is_some())
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", id)))?;
        let (old_kind, old_txn) = self.transactions[position]
            .transaction()
            .expect("position was filtered to transactions");
        let (old_source, old_effect) = (old_txn.source, old_kind.signed(old_txn.amount));

        self.apply_delta(old_source, -old_effect);
        self.transactions[position] = build_entry(id, &input);
        self.apply_delta(input.source, input.kind.signed(input.amount));
        Ok(())
    }

    /// Removes an entry after reversing its balance effect. Works for plain
    /// transactions (single reversal) and transfers (both ends restored).
    pub fn delete_entry(&mut self, id: u64) -> Result<()> {
        let position = self
            .transactions
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or_else(|| LedgerError::NotFound(format!("entry {}", id)))?;
        match self.transactions[position].clone() {
            Entry::Income(txn) => self.apply_delta(txn.source, -txn.amount),
            Entry::Expense(txn) => self.apply_delta(txn.source, txn.amount),
            Entry::Transfer(transfer) => {
                self.apply_delta(transfer.from, transfer.amount);
                self.apply_delta(transfer.to, -transfer.amount);
            }
        }
        self.transactions.remove(position);
        Ok(())
    }

    /// Moves money between two sources, snapshotting their display names.
    /// All validation happens before either balance is touched.
    pub fn create_transfer(&mut self, input: TransferInput) -> Result<u64> {
        validate_amount(input.amount)?;
        if input.from == input.to {
            return Err(LedgerError::SameSource);
        }
        let from_name = self
            .source_label(input.from)
            .ok_or_else(|| LedgerError::NotFound(format!("source {}", input.from)))?;
        let to_name = self
            .source_label(input.to)
            .ok_or_else(|| LedgerError::NotFound(format!("source {}", input.to)))?;
        let available = self
            .balance_of(input.from)
            .expect("labelled source has a balance");
        if input.amount > available {
            return Err(LedgerError::InsufficientFunds {
                requested: input.amount,
                available,
            });
        }

        let id = self.next_id();
        self.apply_delta(input.from, -input.amount);
        self.apply_delta(input.to, input.amount);
        self.transactions.push(Entry::Transfer(Transfer {
            id,
            amount: input.amount,
            from: input.from,
            to: input.to,
            from_name,
            to_name,
            date: input.date,
            comment: input.comment,
        }));
        Ok(id)
    }

    // ---- source CRUD (no cascade on delete; history keeps orphaned refs) ----

    pub fn add_bank(&mut self, name: impl Into<String>) -> u64 {
        let id = self.next_id();
        self.banks.push(Bank {
            id,
            name: name.into(),
        });
        id
    }

    pub fn add_card(
        &mut self,
        name: impl Into<String>,
        bank_name: impl Into<String>,
        balance: f64,
    ) -> u64 {
        let id = self.next_id();
        self.cards.push(Card {
            id,
            name: name.into(),
            bank_name: bank_name.into(),
            balance,
            show_on_dashboard: true,
        });
        id
    }

    pub fn add_cash(&mut self, name: impl Into<String>, amount: f64) -> u64 {
        let id = self.next_id();
        self.cash.push(Cash {
            id,
            name: name.into(),
            amount,
            show_on_dashboard: true,
        });
        id
    }

    pub fn add_deposit(&mut self, mut deposit: Deposit) -> u64 {
        deposit.id = self.next_id();
        let id = deposit.id;
        self.deposits.push(deposit);
        id
    }

    /// Credits store `total - down_payment` as the remaining snapshot.
    pub fn add_credit(&mut self, mut credit: Credit, total_amount: f64) -> u64 {
        credit.id = self.next_id();
        credit.remaining = total_amount - credit.down_payment;
        let id = credit.id;
        self.credits.push(credit);
        id
    }

    pub fn update_bank<F: FnOnce(&mut Bank)>(&mut self, id: u64, mutate: F) -> Result<()> {
        let bank = self
            .banks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("bank {}", id)))?;
        mutate(bank);
        Ok(())
    }

    pub fn update_card<F: FnOnce(&mut Card)>(&mut self, id: u64, mutate: F) -> Result<()> {
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("card {}", id)))?;
        mutate(card);
        Ok(())
    }

    pub fn update_cash<F: FnOnce(&mut Cash)>(&mut self, id: u64, mutate: F) -> Result<()> {
        let cash = self
            .cash
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("cash {}", id)))?;
        mutate(cash);
        Ok(())
    }

    pub fn update_deposit<F: FnOnce(&mut Deposit)>(&mut self, id: u64, mutate: F) -> Result<()> {
        let deposit = self
            .deposits
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("deposit {}", id)))?;
        mutate(deposit);
        Ok(())
    }

    pub fn update_credit<F: FnOnce(&mut Credit)>(&mut self, id: u64, mutate: F) -> Result<()> {
        let credit = self
            .credits
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("credit {}", id)))?;
        mutate(credit);
        Ok(())
    }

    pub fn remove_bank(&mut self, id: u64) -> Result<()> {
        remove_by_id(&mut self.banks, id, |b| b.id, "bank")
    }

    pub fn remove_card(&mut self, id: u64) -> Result<()> {
        remove_by_id(&mut self.cards, id, |c| c.id, "card")
    }

    pub fn remove_cash(&mut self, id: u64) -> Result<()> {
        remove_by_id(&mut self.cash, id, |c| c.id, "cash")
    }

    pub fn remove_deposit(&mut self, id: u64) -> Result<()> {
        remove_by_id(&mut self.deposits, id, |d| d.id, "deposit")
    }

    pub fn remove_credit(&mut self, id: u64) -> Result<()> {
        remove_by_id(&mut self.credits, id, |c| c.id, "credit")
    }

    // ---- budgets, goals, rules, templates ----

    pub fn add_budget(&mut self, mut budget: Budget) -> u64 {
        budget.id = self.next_id();
        let id = budget.id;
        self.budgets.push(budget);
        id
    }

    pub fn add_goal(&mut self, mut goal: Goal) -> u64 {
        goal.id = self.next_id();
        goal.current = goal.current.clamp(0.0, goal.target);
        let id = goal.id;
        self.goals.push(goal);
        id
    }

    /// Adds (or withdraws, when negative) a contribution, clamped so the
    /// stored amount stays within `0..=target`.
    pub fn contribute_to_goal(&mut self, id: u64, amount: f64) -> Result<f64> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("goal {}", id)))?;
        goal.current = (goal.current + amount).clamp(0.0, goal.target);
        Ok(goal.current)
    }

    pub fn add_recurring(&mut self, mut rule: RecurringRule) -> u64 {
        rule.id = self.next_id();
        let id = rule.id;
        self.recurring.push(rule);
        id
    }

    pub fn add_template(&mut self, mut template: TransactionTemplate) -> u64 {
        template.id = self.next_id();
        let id = template.id;
        self.templates.push(template);
        id
    }

    /// Creates a transaction prefilled from a stored template.
    pub fn apply_template(&mut self, id: u64, date: NaiveDate) -> Result<u64> {
        let input = self
            .templates
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.input(date))
            .ok_or_else(|| LedgerError::NotFound(format!("template {}", id)))?;
        self.create_transaction(input)
    }

    // ---- derived ----

    /// Net worth: cards + cash + compounded deposit values − credit
    /// remainders.
    pub fn total_balance(&self, today: NaiveDate) -> f64 {
        let cards: f64 = self.cards.iter().map(|c| c.balance).sum();
        let cash: f64 = self.cash.iter().map(|c| c.amount).sum();
        let deposits: f64 = self.deposits.iter().map(|d| d.value_on(today)).sum();
        let credits: f64 = self.credits.iter().map(|c| c.remaining).sum();
        cards + cash + deposits - credits
    }
}

fn build_entry(id: u64, input: &TransactionInput) -> Entry {
    let category = if input.category.trim().is_empty() {
        input.kind.default_category().to_string()
    } else {
        input.category.clone()
    };
    let txn = Transaction {
        id,
        amount: input.amount,
        source: input.source,
        date: input.date,
        category,
        comment: input.comment.clone(),
    };
    match input.kind {
        super::transaction::TransactionKind::Income => Entry::Income(txn),
        super::transaction::TransactionKind::Expense => Entry::Expense(txn),
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::Validation(
            "amount must be greater than zero".into(),
        ))
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: u64, key: impl Fn(&T) -> u64, what: &str) -> Result<()> {
    let position = items
        .iter()
        .position(|item| key(item) == id)
        .ok_or_else(|| LedgerError::NotFound(format!("{} {}", what, id)))?;
    items.remove(position);
    Ok(())
}
