use chrono::{DateTime, Duration, Utc};

/// Source of "now" for the session engine.
///
/// Question timers read from this instead of `Utc::now()` so that response
/// times are reproducible in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. No effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Whole seconds elapsed between `started_at` and `now`, floored.
///
/// A backdated `now` yields `0` rather than a negative response time.
#[must_use]
pub fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let seconds = now.signed_duration_since(started_at).num_seconds();
    u32::try_from(seconds.max(0)).unwrap_or(u32::MAX)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(42));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(42));
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::system();
        clock.advance(Duration::days(365));
        assert!(!clock.is_fixed());
        assert!(clock.now() < Utc::now() + Duration::days(1));
    }

    #[test]
    fn elapsed_seconds_floors_partial_seconds() {
        let start = fixed_now();
        let now = start + Duration::milliseconds(12_900);
        assert_eq!(elapsed_seconds(start, now), 12);
    }

    #[test]
    fn elapsed_seconds_never_negative() {
        let start = fixed_now();
        assert_eq!(elapsed_seconds(start, start - Duration::seconds(5)), 0);
    }
}
