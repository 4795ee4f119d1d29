use crate::error::{PatternError, Result};
use std::cell::Cell;

/// Hands out observer numbers.
///
/// Numbers are pre-incremented, so a fresh sequence yields 1 first. A number
/// is never handed out twice, whatever happens to the observer that got it.
/// Tests build their own sequence (or call [`reset`](Self::reset)) instead of
/// sharing one counter across the process.
#[derive(Debug, Default)]
pub struct ObserverSequence {
    last: Cell<u64>,
}

impl ObserverSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first call to [`next`](Self::next) returns `start + 1`.
    pub fn starting_at(start: u64) -> Self {
        ObserverSequence {
            last: Cell::new(start),
        }
    }

    /// Fails once `u64::MAX` has been handed out; numbers never wrap.
    pub fn next(&self) -> Result<u64> {
        let number = self
            .last
            .get()
            .checked_add(1)
            .ok_or(PatternError::SequenceExhausted)?;
        self.last.set(number);
        Ok(number)
    }

    /// Last number handed out, 0 if none yet.
    pub fn current(&self) -> u64 {
        self.last.get()
    }

    pub fn reset(&self) {
        self.last.set(0);
    }
}
