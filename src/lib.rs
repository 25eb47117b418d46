#![doc(test(attr(deny(warnings))))]

//! Moliya Core is the ledger engine behind a single-currency personal
//! finance tracker: money sources with derived balances, an income /
//! expense / transfer ledger, deposit interest calculators, and read-only
//! statistics, budget, and goal views.

pub mod calc;
pub mod errors;
pub mod ledger;
pub mod stats;
pub mod storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("moliya_core=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("Moliya Core tracing initialized.");
    });
}
