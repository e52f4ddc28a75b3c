//! Time-based decay of an item's progress.
//!
//! Decay is geometric per whole missed period:
//!
//! ```text
//! periods_missed = elapsed_hours / (frequency * 24)
//! current_value *= (1 - decay_rate) ^ floor(periods_missed)   if periods_missed >= 1
//! streak = 0                                                  if periods_missed >= 2
//! ```
//!
//! Whenever decay fires `updated_at` moves to `now`, so a second call at the
//! same instant sees less than one period and does nothing.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::Item;

const HOURS_PER_DAY: f64 = 24.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

impl Item {
    /// Length of one period in hours.
    pub fn frequency_hours(&self) -> f64 {
        self.frequency * HOURS_PER_DAY
    }

    /// Fractional number of periods elapsed between `updated_at` and `now`.
    ///
    /// Negative when `now` is before `updated_at`.
    pub fn periods_missed(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_hours = (now - self.updated_at).num_milliseconds() as f64 / MS_PER_HOUR;
        elapsed_hours / self.frequency_hours()
    }

    /// Apply decay for every whole period missed since `updated_at`.
    ///
    /// Returns the fractional periods missed. The item is only mutated when
    /// at least one full period has passed.
    pub fn apply_decay(&mut self, now: DateTime<Utc>) -> f64 {
        let periods_missed = self.periods_missed(now);
        if periods_missed < 1.0 {
            return periods_missed;
        }

        let whole_periods = periods_missed.floor().min(i32::MAX as f64) as i32;
        let before = self.current_value;
        let factor = (1.0 - self.decay_rate).powi(whole_periods);
        self.current_value = (self.current_value * factor).max(0.0);

        let streak_reset = periods_missed >= 2.0;
        if streak_reset {
            self.streak = 0;
        }
        self.updated_at = now;

        debug!(
            item_id = self.id,
            periods_missed,
            before,
            after = self.current_value,
            streak_reset,
            "decay applied"
        );
        periods_missed
    }
}
