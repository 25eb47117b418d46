pub mod book;
pub mod budget;
pub mod goal;
pub mod period;
pub mod recurring;
pub mod source;
pub mod transaction;

pub use book::Document;
pub use budget::{Budget, BudgetPeriod, BudgetReport, BudgetStatus};
pub use goal::{Goal, GoalProgress};
pub use recurring::{Frequency, RecurringRule};
pub use source::{Bank, Card, Cash, Credit, Deposit, SourceKind, SourceRef, UNKNOWN_SOURCE_LABEL};
pub use transaction::{
    Entry, Transaction, TransactionInput, TransactionKind, TransactionTemplate, Transfer,
    TransferInput,
};
