//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use tessera::{BufferConsole, Ledger, ManualClock, Timestamp};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Fixed starting time for deterministic timestamps.
pub const T0: Timestamp = Timestamp::from_secs(1_700_000_000);

/// Ledger with a manual clock at [`T0`] and a capturing console.
pub struct Harness {
    pub ledger: Ledger,
    pub clock: Arc<ManualClock>,
    pub console: Arc<BufferConsole>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let clock = Arc::new(ManualClock::new(T0));
        let console = Arc::new(BufferConsole::new());
        let ledger = Ledger::new()
            .with_clock(clock.clone())
            .with_console(console.clone());
        Self {
            ledger,
            clock,
            console,
        }
    }

    /// Move the clock forward.
    pub fn tick(&self, secs: u64) -> Timestamp {
        self.clock.advance(Duration::from_secs(secs));
        tessera::Clock::now(self.clock.as_ref())
    }
}
