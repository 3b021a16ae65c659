//! Dependency-injection traits shared by every environment.
//!
//! All external dependencies are abstracted behind traits and injected via
//! the reducer's `Environment` parameter, so domain logic stays
//! deterministic under test.

use chrono::{DateTime, Utc};

/// Abstracts time so reducers never read the wall clock directly.
///
/// Production code injects [`SystemClock`]; tests inject a fixed or manually
/// advanced clock to make deadline logic deterministic.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
