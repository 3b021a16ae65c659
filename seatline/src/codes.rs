//! Ticket code issuance.
//!
//! Codes are only meaningful for finalized tickets: the order workflow asks
//! the issuer for candidates at confirmation time and re-checks each one
//! against the ledger's code index before committing, so global uniqueness
//! is enforced by the confirm command rather than trusted to the source of
//! randomness.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::types::TicketCode;

/// Alphabet used for random codes: uppercase alphanumerics without the
/// characters commonly misread at the door (0/O, 1/I/L).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Number of random characters per code (grouped 4-4-4 in the rendering).
const CODE_LENGTH: usize = 12;

/// Source of candidate ticket codes, injected via the environment.
///
/// Implementations do not need to guarantee uniqueness; the confirm command
/// verifies every candidate against issued codes and asks again on
/// collision.
pub trait CodeIssuer: Send + Sync {
    /// Produce one candidate code.
    fn issue(&self) -> TicketCode;
}

/// Production issuer: cryptographically random, door-friendly codes like
/// `K7KF-2Q9X-MM3A`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCodeIssuer;

impl CodeIssuer for RandomCodeIssuer {
    fn issue(&self) -> TicketCode {
        let mut rng = rand::thread_rng();
        let mut code = String::with_capacity(CODE_LENGTH + 2);
        for i in 0..CODE_LENGTH {
            if i > 0 && i % 4 == 0 {
                code.push('-');
            }
            let index = rng.gen_range(0..CODE_ALPHABET.len());
            code.push(char::from(CODE_ALPHABET[index]));
        }
        TicketCode::new(code)
    }
}

/// Deterministic issuer for tests: `TEST-0000-0001`, `TEST-0000-0002`, ...
///
/// Lives in the main crate (not the testing crate) because it implements a
/// domain trait; production code never constructs it.
#[derive(Debug, Default)]
pub struct SequentialCodeIssuer {
    next: AtomicU64,
}

impl SequentialCodeIssuer {
    /// Creates an issuer counting from one.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }
}

impl CodeIssuer for SequentialCodeIssuer {
    fn issue(&self) -> TicketCode {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        TicketCode::new(format!("TEST-{:04}-{:04}", n / 10_000, n % 10_000))
    }
}
