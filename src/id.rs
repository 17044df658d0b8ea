//! ID generation for tasks.

/// Hands out timestamp-derived ids that strictly increase.
///
/// Wall-clock milliseconds alone collide when two tasks are created in the
/// same millisecond (or when the clock steps backwards), so each id is the
/// larger of the current time and the previous id plus one.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Start after the highest id already in use.
    pub fn seeded(max_existing: u64) -> Self {
        Self { last: max_existing }
    }

    /// Next id given the current time in milliseconds.
    pub fn next(&mut self, now_ms: u64) -> u64 {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        id
    }

    /// The most recently issued (or seeded) id.
    pub fn last(&self) -> u64 {
        self.last
    }
}
