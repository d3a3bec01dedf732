#![doc(test(attr(deny(warnings))))]

//! Tuition Core tracks monthly tuition obligations per student, records
//! payments against them, and derives receivable reporting views. The heart
//! of the crate is the settlement engine: carry-over chaining between
//! months, the settlement-lock rule, and the deterministic multi-target
//! payment allocators.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tuition Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
