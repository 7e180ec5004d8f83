//! Global superstep clock.
//!
//! The clock is the single source of truth for round numbering. Every
//! vertex reads the same value during a superstep; the driver advances it
//! exactly once per completed round, after the stats collector has run.
//!
//! # Design Principles
//!
//! - Advancing uses checked arithmetic (no silent overflow).
//! - The ceiling is cooperative: it is only consulted at round boundaries.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Superstep counter would overflow.
    #[error("superstep counter overflow: cannot advance beyond u64::MAX")]
    SuperstepOverflow,
}

/// Superstep counter with an optional step ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperstepClock {
    /// Number of the superstep about to run (0-indexed).
    superstep: u64,

    /// Maximum number of supersteps to execute, if bounded.
    ceiling: Option<u64>,
}

impl SuperstepClock {
    /// Create a clock at superstep 0.
    pub const fn new(ceiling: Option<u64>) -> Self {
        Self {
            superstep: 0,
            ceiling,
        }
    }

    /// Return the current superstep number.
    pub const fn superstep(&self) -> u64 {
        self.superstep
    }

    /// Return the configured ceiling, if any.
    pub const fn ceiling(&self) -> Option<u64> {
        self.ceiling
    }

    /// Advance to the next superstep. Returns the new superstep number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::SuperstepOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.superstep = self
            .superstep
            .checked_add(1)
            .ok_or(ClockError::SuperstepOverflow)?;
        Ok(self.superstep)
    }

    /// Whether the number of completed supersteps has reached the ceiling.
    pub fn ceiling_reached(&self) -> bool {
        self.ceiling.is_some_and(|max| self.superstep >= max)
    }

    /// Supersteps left before the ceiling, or `None` when unbounded.
    pub fn remaining(&self) -> Option<u64> {
        self.ceiling.map(|max| max.saturating_sub(self.superstep))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = SuperstepClock::new(None);
        assert_eq!(clock.superstep(), 0);
        assert!(!clock.ceiling_reached());
        assert_eq!(clock.remaining(), None);
    }

    #[test]
    fn advance_increments_by_one() {
        let mut clock = SuperstepClock::new(None);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.superstep(), 2);
    }

    #[test]
    fn ceiling_reached_after_max_supersteps() {
        let mut clock = SuperstepClock::new(Some(2));
        assert_eq!(clock.remaining(), Some(2));
        clock.advance().unwrap();
        assert!(!clock.ceiling_reached());
        clock.advance().unwrap();
        assert!(clock.ceiling_reached());
        assert_eq!(clock.remaining(), Some(0));
    }

    #[test]
    fn zero_ceiling_is_reached_immediately() {
        let clock = SuperstepClock::new(Some(0));
        assert!(clock.ceiling_reached());
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = SuperstepClock {
            superstep: u64::MAX,
            ceiling: None,
        };
        assert!(matches!(
            clock.advance(),
            Err(ClockError::SuperstepOverflow)
        ));
    }
}
