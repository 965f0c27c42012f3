//! Streak and aggregate maintenance for [`ProgressStats`].
//!
//! The guest vault and the remote actor both apply these rules; keeping
//! them here as pure methods is what lets the two substrates agree.

use crate::records::{ProgressStats, SessionRecord};
use crate::time::{civil_month, day_index};

impl ProgressStats {
    /// Fold a completed session into the aggregate.
    ///
    /// Streak rules, on UTC calendar days:
    /// - first session ever → streak 1
    /// - same day as the previous session → streak unchanged
    /// - exactly the next day → streak + 1
    /// - anything else (gap, or a clock that went backwards) → streak resets to 1
    ///
    /// `monthly_minutes` resets when the civil month changes between sessions.
    pub fn record_session(&mut self, record: SessionRecord) {
        let day = day_index(record.completed_at);

        match self.last_session_at.map(day_index) {
            None => self.current_streak = 1,
            Some(prev) if day == prev => {}
            Some(prev) if day == prev + 1 => self.current_streak += 1,
            Some(_) => self.current_streak = 1,
        }

        let same_month = self
            .last_session_at
            .is_some_and(|prev| civil_month(prev) == civil_month(record.completed_at));
        if same_month {
            self.monthly_minutes += u64::from(record.duration_minutes);
        } else {
            self.monthly_minutes = u64::from(record.duration_minutes);
        }

        self.total_minutes += u64::from(record.duration_minutes);
        self.last_session_at = Some(record.completed_at);
        self.sessions.push(record);
    }
}
