//! Read-only aggregations over the ledger. Everything here is recomputed
//! from the entry list on each call and never mutates state.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc;
use std::thread;

use chrono::{Duration, NaiveDate};

use crate::ledger::{period, Entry};

const TOP_CATEGORY_LIMIT: usize = 5;
const MIN_SEARCH_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl StatsPeriod {
    /// Lower bound of the window ending at `today`; `None` means unbounded.
    /// Week is Monday-anchored and month starts on the first; quarter and
    /// year are rolling.
    pub fn start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            StatsPeriod::Week => Some(period::week_start(today)),
            StatsPeriod::Month => Some(period::month_start(today)),
            StatsPeriod::Quarter => Some(period::shift_months(today, -3)),
            StatsPeriod::Year => Some(period::shift_months(today, -12)),
            StatsPeriod::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayTotals {
    pub income: f64,
    pub expense: f64,
}

/// Summary of one period of ledger activity. Transfers are counted but
/// excluded from the income/expense sums.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStats {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub avg_daily_income: f64,
    pub avg_daily_expense: f64,
    /// `(income - expense) / income * 100`, zero when there is no income.
    pub savings_rate: f64,
    pub top_categories: Vec<(String, f64)>,
    pub daily_totals: BTreeMap<NaiveDate, DayTotals>,
    pub entry_count: usize,
}

pub fn statistics(entries: &[Entry], stats_period: StatsPeriod, today: NaiveDate) -> PeriodStats {
    stats_between(entries, stats_period.start(today), today)
}

fn stats_between(entries: &[Entry], start: Option<NaiveDate>, end: NaiveDate) -> PeriodStats {
    let in_window: Vec<&Entry> = entries
        .iter()
        .filter(|entry| {
            let date = entry.date();
            date <= end && start.map_or(true, |s| date >= s)
        })
        .collect();

    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut category_totals: HashMap<&str, f64> = HashMap::new();
    let mut daily_totals: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();

    for entry in &in_window {
        match entry {
            Entry::Income(txn) => {
                total_income += txn.amount;
                daily_totals.entry(txn.date).or_default().income += txn.amount;
            }
            Entry::Expense(txn) => {
                total_expense += txn.amount;
                daily_totals.entry(txn.date).or_default().expense += txn.amount;
                *category_totals.entry(txn.category.as_str()).or_default() += txn.amount;
            }
            Entry::Transfer(_) => {}
        }
    }

    let mut top_categories: Vec<(String, f64)> = category_totals
        .into_iter()
        .map(|(category, total)| (category.to_string(), total))
        .collect();
    top_categories.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    top_categories.truncate(TOP_CATEGORY_LIMIT);

    let window_start = start.or_else(|| in_window.iter().map(|entry| entry.date()).min());
    // Inclusive day count: the window's partial current day still counts.
    let days = window_start
        .map(|s| ((end - s).num_days() + 1).max(1))
        .unwrap_or(1) as f64;

    let savings_rate = if total_income > 0.0 {
        (total_income - total_expense) / total_income * 100.0
    } else {
        0.0
    };

    PeriodStats {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        avg_daily_income: total_income / days,
        avg_daily_expense: total_expense / days,
        savings_rate,
        top_categories,
        daily_totals,
        entry_count: in_window.len(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthBucket {
    pub income: f64,
    pub expense: f64,
    pub count: usize,
}

/// A range report: the period summary plus a `YYYY-MM` keyed breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: PeriodStats,
    pub monthly: BTreeMap<String, MonthBucket>,
}

pub fn report(entries: &[Entry], start: NaiveDate, end: NaiveDate) -> Report {
    let summary = stats_between(entries, Some(start), end);
    let mut monthly: BTreeMap<String, MonthBucket> = BTreeMap::new();
    for entry in entries {
        let date = entry.date();
        if date < start || date > end {
            continue;
        }
        let bucket = monthly.entry(date.format("%Y-%m").to_string()).or_default();
        match entry {
            Entry::Income(txn) => bucket.income += txn.amount,
            Entry::Expense(txn) => bucket.expense += txn.amount,
            Entry::Transfer(_) => {}
        }
        bucket.count += 1;
    }
    Report {
        start,
        end,
        summary,
        monthly,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFilter {
    All,
    /// Rolling seven days back from today.
    Week,
    /// From the first of the current month.
    Month,
}

/// Filtered history, newest first. The sort is stable so entries sharing a
/// date keep insertion order.
pub fn history<'a>(
    entries: &'a [Entry],
    type_filter: TypeFilter,
    period_filter: PeriodFilter,
    today: NaiveDate,
) -> Vec<&'a Entry> {
    let earliest = match period_filter {
        PeriodFilter::All => None,
        PeriodFilter::Week => Some(today - Duration::days(7)),
        PeriodFilter::Month => Some(period::month_start(today)),
    };
    let mut selected: Vec<&Entry> = entries
        .iter()
        .filter(|entry| match type_filter {
            TypeFilter::All => true,
            TypeFilter::Income => matches!(entry, Entry::Income(_)),
            TypeFilter::Expense => matches!(entry, Entry::Expense(_)),
        })
        .filter(|entry| earliest.map_or(true, |e| entry.date() >= e))
        .collect();
    selected.sort_by(|a, b| b.date().cmp(&a.date()));
    selected
}

/// Case-insensitive substring search over category, comment, names, and the
/// amount's text form. Queries shorter than two characters match everything.
pub fn search<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    if query.chars().count() < MIN_SEARCH_QUERY_LEN {
        return entries.iter().collect();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            if entry.amount().to_string().contains(&needle) {
                return true;
            }
            if entry.comment().to_lowercase().contains(&needle) {
                return true;
            }
            match entry {
                Entry::Income(txn) | Entry::Expense(txn) => {
                    txn.category.to_lowercase().contains(&needle)
                }
                Entry::Transfer(transfer) => {
                    transfer.from_name.to_lowercase().contains(&needle)
                        || transfer.to_name.to_lowercase().contains(&needle)
                }
            }
        })
        .collect()
}

/// Habit patterns mined from the whole ledger: spending peaks, activity
/// peaks, amount extremes, and the most used categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPatterns {
    /// Day with the highest expense total.
    pub most_expensive_day: Option<(NaiveDate, f64)>,
    /// Day with the most entries of any kind.
    pub most_active_day: Option<(NaiveDate, usize)>,
    pub average_amount: f64,
    pub largest_amount: Option<f64>,
    pub smallest_amount: Option<f64>,
    /// Up to five categories ranked by how often they occur.
    pub frequent_categories: Vec<(String, usize)>,
}

pub fn analyze(entries: &[Entry]) -> AnalysisPatterns {
    if entries.is_empty() {
        return AnalysisPatterns::default();
    }

    let mut expense_by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut count_by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut category_counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0.0;
    let mut largest: Option<f64> = None;
    let mut smallest: Option<f64> = None;

    for entry in entries {
        let amount = entry.amount();
        total += amount;
        largest = Some(largest.map_or(amount, |l| l.max(amount)));
        smallest = Some(smallest.map_or(amount, |s| s.min(amount)));
        *count_by_day.entry(entry.date()).or_default() += 1;
        if let Entry::Expense(txn) = entry {
            *expense_by_day.entry(txn.date).or_default() += txn.amount;
        }
        if let Some((_, txn)) = entry.transaction() {
            *category_counts.entry(txn.category.as_str()).or_default() += 1;
        }
    }

    // Earliest day wins a tie.
    let mut most_expensive_day = None;
    for (date, spent) in expense_by_day {
        match most_expensive_day {
            Some((_, best)) if spent <= best => {}
            _ => most_expensive_day = Some((date, spent)),
        }
    }
    let mut most_active_day = None;
    for (date, count) in count_by_day {
        match most_active_day {
            Some((_, best)) if count <= best => {}
            _ => most_active_day = Some((date, count)),
        }
    }

    let mut frequent_categories: Vec<(String, usize)> = category_counts
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    frequent_categories.sort_by(|a, b| b.1.cmp(&a.1));
    frequent_categories.truncate(TOP_CATEGORY_LIMIT);

    AnalysisPatterns {
        most_expensive_day,
        most_active_day,
        average_amount: total / entries.len() as f64,
        largest_amount: largest,
        smallest_amount: smallest,
        frequent_categories,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Amount,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Configurable ordering for listings. Stable: entries comparing equal keep
/// insertion order. Transfers sort with an empty category.
pub fn sort_entries<'a>(entries: &'a [Entry], key: SortKey, order: SortOrder) -> Vec<&'a Entry> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => a.date().cmp(&b.date()),
            SortKey::Amount => a
                .amount()
                .partial_cmp(&b.amount())
                .unwrap_or(std::cmp::Ordering::Equal),
            SortKey::Category => category_of(a).cmp(category_of(b)),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn category_of(entry: &Entry) -> &str {
    match entry {
        Entry::Income(txn) | Entry::Expense(txn) => &txn.category,
        Entry::Transfer(_) => "",
    }
}

/// Recomputes statistics off the main thread from a cloned snapshot.
///
/// The computation is a pure function of its input; if the ledger mutates
/// while it is in flight the result is stale and the caller should drop it
/// and recompute. There is no cancellation: an unwanted result is simply
/// never received.
pub fn spawn_statistics(
    snapshot: Vec<Entry>,
    stats_period: StatsPeriod,
    today: NaiveDate,
) -> mpsc::Receiver<PeriodStats> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = statistics(&snapshot, stats_period, today);
        // The receiver may already be gone; that just discards the result.
        let _ = sender.send(result);
    });
    receiver
}
