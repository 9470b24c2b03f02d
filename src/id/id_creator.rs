use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// Time source used to seed candidate ids, in milliseconds.
pub type Clock = fn() -> u64;

fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Issues ids that are unique for the lifetime of the creator.
///
/// Every issued id is remembered, so the ledger grows by one entry per call.
///
/// # Examples
///
/// ```
/// use observable_store::IdCreator;
///
/// let mut ids = IdCreator::new();
/// let first = ids.create_id();
/// let second = ids.create_id();
/// assert_ne!(first, second);
/// ```
#[derive(Debug)]
pub struct IdCreator {
    issued: HashSet<u64>,
    clock: Clock,
}

impl IdCreator {
    /// Create a creator seeded from the system clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock)
    }

    /// Create a creator with a custom time source.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            issued: HashSet::new(),
            clock,
        }
    }

    /// Issue a new id.
    ///
    /// The candidate starts at the current timestamp and is incremented until
    /// it has not been issued before.
    pub fn create_id(&mut self) -> u64 {
        let mut candidate = (self.clock)();
        while self.issued.contains(&candidate) {
            candidate = candidate.wrapping_add(1);
        }
        self.issued.insert(candidate);
        candidate
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

impl Default for IdCreator {
    fn default() -> Self {
        Self::new()
    }
}
