//! General time utility functions
//!
//! Control code never reads the wall clock directly. A `Clock` is handed to
//! whichever loop drives the modules, which pass timestamps in explicitly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono;
use std::cell::Cell;
use std::time::Instant;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic source of seconds.
pub trait Clock {
    /// Seconds elapsed since an arbitrary, fixed origin.
    fn seconds(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

/// Clock which only moves when told to, used for simulation and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_s: Cell<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl ManualClock {
    /// Create a new clock reading `start_s`.
    pub fn new(start_s: f64) -> Self {
        Self {
            now_s: Cell::new(start_s),
        }
    }

    /// Move the clock forward by `dt_s` seconds. Negative steps are ignored.
    pub fn advance(&self, dt_s: f64) {
        if dt_s > 0.0 {
            self.now_s.set(self.now_s.get() + dt_s);
        }
    }
}

impl Clock for ManualClock {
    fn seconds(&self) -> f64 {
        self.now_s.get()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}
