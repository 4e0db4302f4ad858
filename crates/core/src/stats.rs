//! Session statistics: running tally and values derived from it.

use crate::model::GradeOutcome;

/// Ratio of correct answers at which the score is shown as a success.
pub const TARGET_SUCCESS_RATIO: f64 = 0.7;

//
// ─── SESSION STATS ─────────────────────────────────────────────────────────────
//

/// Running tally of graded submissions in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub correct_count: u32,
    pub total_answered: u32,
}

impl SessionStats {
    #[must_use]
    pub fn new(correct_count: u32, total_answered: u32) -> Self {
        Self {
            correct_count,
            total_answered,
        }
    }

    /// Returns the tally after one more graded submission.
    #[must_use]
    pub fn record(self, outcome: &GradeOutcome) -> Self {
        Self {
            correct_count: self
                .correct_count
                .saturating_add(u32::from(outcome.is_correct())),
            total_answered: self.total_answered.saturating_add(1),
        }
    }

    /// Share of correct answers, rounded half up to a whole percent.
    ///
    /// Always `0` before the first answer.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        rounded_percent(u64::from(self.correct_count), u64::from(self.total_answered))
    }

    #[must_use]
    pub fn meets_target(&self) -> bool {
        if self.total_answered == 0 {
            return false;
        }
        f64::from(self.correct_count) / f64::from(self.total_answered) >= TARGET_SUCCESS_RATIO
    }

    #[must_use]
    pub fn mastery(&self) -> MasteryLevel {
        MasteryLevel::from_percentage(self.percentage())
    }
}

/// Position-only progress through a session, `0..=100`.
#[must_use]
pub fn progress_percent(current_index: usize, total: usize) -> u8 {
    rounded_percent(current_index as u64, total as u64)
}

fn rounded_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let percent = (200 * part + whole) / (2 * whole);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

//
// ─── MASTERY ───────────────────────────────────────────────────────────────────
//

/// Badge earned from a score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MasteryLevel {
    Beginner,
    Progressing,
    Confirmed,
    Advanced,
    Expert,
}

impl MasteryLevel {
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90.. => Self::Expert,
            80..=89 => Self::Advanced,
            70..=79 => Self::Confirmed,
            60..=69 => Self::Progressing,
            _ => Self::Beginner,
        }
    }

    /// Lowest percentage that earns this level.
    #[must_use]
    pub fn threshold(self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Progressing => 60,
            Self::Confirmed => 70,
            Self::Advanced => 80,
            Self::Expert => 90,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Progressing => "Progressing",
            Self::Confirmed => "Confirmed",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }
}

/// Human-readable duration: `45s`, `12min`, `1h5min`.
#[must_use]
pub fn format_time_spent(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}min", seconds / 60)
    } else {
        format!("{}h{}min", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    #[test]
    fn percentage_is_zero_without_answers() {
        assert_eq!(SessionStats::default().percentage(), 0);
        assert!(!SessionStats::default().meets_target());
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(SessionStats::new(1, 2).percentage(), 50);
        assert_eq!(SessionStats::new(2, 3).percentage(), 67);
        assert_eq!(SessionStats::new(1, 3).percentage(), 33);
        assert_eq!(SessionStats::new(1, 8).percentage(), 13);
        assert_eq!(SessionStats::new(4, 4).percentage(), 100);
    }

    #[test]
    fn record_counts_every_answer_and_only_correct_ones() {
        let stats = SessionStats::default()
            .record(&GradeOutcome::correct())
            .record(&GradeOutcome::incorrect(AnswerOption::THIRD));
        assert_eq!(stats, SessionStats::new(1, 2));
    }

    #[test]
    fn percentage_stays_in_range_for_any_tally() {
        for total in 0..40_u32 {
            for correct in 0..=total {
                let pct = SessionStats::new(correct, total).percentage();
                assert!(pct <= 100);
            }
        }
    }

    #[test]
    fn target_is_seventy_percent() {
        assert!(SessionStats::new(7, 10).meets_target());
        assert!(!SessionStats::new(6, 10).meets_target());
    }

    #[test]
    fn progress_depends_on_position_only() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn mastery_thresholds() {
        assert_eq!(MasteryLevel::from_percentage(59), MasteryLevel::Beginner);
        assert_eq!(MasteryLevel::from_percentage(60), MasteryLevel::Progressing);
        assert_eq!(MasteryLevel::from_percentage(75), MasteryLevel::Confirmed);
        assert_eq!(MasteryLevel::from_percentage(80), MasteryLevel::Advanced);
        assert_eq!(MasteryLevel::from_percentage(100), MasteryLevel::Expert);
        assert_eq!(MasteryLevel::Advanced.threshold(), 80);
    }

    #[test]
    fn time_spent_formats() {
        assert_eq!(format_time_spent(45), "45s");
        assert_eq!(format_time_spent(720), "12min");
        assert_eq!(format_time_spent(3900), "1h5min");
        assert_eq!(format_time_spent(7260), "2h1min");
    }
}
