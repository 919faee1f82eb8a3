//! Completion log, streak state and aggregate stats.
//!
//! The completion-event log is the one source of truth that must never be
//! lost; everything else in the system is derived from it plus per-engine
//! state. The tracker owns the global streak, the today-count and the
//! per-category totals.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::RitualCategory;
use crate::clock::day_difference;
use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// Immutable fact: one ritual performance. Appended once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub id: Uuid,
    pub ritual_id: String,
    pub at: DateTime<Utc>,
    /// Calendar day the completion was bucketed into at record time.
    pub day: NaiveDate,
    /// Mood rating 1..=5, if the user provided one.
    pub mood: Option<u8>,
    pub note: Option<String>,
}

/// Consecutive-day streak. `current <= best` holds after every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
    pub last_completed: Option<NaiveDate>,
}

/// What a completion did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Same calendar day as the last completion.
    NoChange,
    /// Exactly one day after the last completion; carries the new count.
    Extended(u32),
    /// Gap of more than one day (or first ever completion); back to 1.
    Reset,
}

impl Streak {
    /// Apply the calendar-day rule for a completion on `day`.
    pub fn record_day(&mut self, day: NaiveDate) -> StreakChange {
        let change = match self.last_completed {
            Some(last) if day == last => StreakChange::NoChange,
            Some(last) if day_difference(day, last) == 1 => {
                self.current += 1;
                StreakChange::Extended(self.current)
            }
            _ => {
                self.current = 1;
                StreakChange::Reset
            }
        };
        if change != StreakChange::NoChange {
            self.last_completed = Some(day);
        }
        self.best = self.best.max(self.current);
        change
    }
}

/// Snapshot of aggregate stats consumed by the achievement engine and the
/// seasonal unlock checks. Computed fresh per evaluation; never persisted.
#[derive(Debug, Clone, Default)]
pub struct AggregateStats {
    pub streak_days: u32,
    pub best_streak: u32,
    pub total_rituals: u32,
    pub today_rituals: u32,
    /// Average mood over the recent 7-day window, if any rated completions
    /// fall inside it.
    pub recent_mood_average: Option<f64>,
    pub share_count: u32,
    pub custom_ritual_count: u32,
    /// Every one of the last 7 calendar days (today included) has at least
    /// one completion.
    pub perfect_week: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressState {
    events: Vec<CompletionEvent>,
    streak: Streak,
    today: Option<NaiveDate>,
    today_count: u32,
    lifetime_count: u32,
    category_counts: HashMap<RitualCategory, u32>,
    /// Calendar days with at least one completion. Derived from the log but
    /// kept materialized for perfect-week checks.
    days_completed: BTreeSet<NaiveDate>,
}

/// Records completion events and maintains streak/today/lifetime totals.
pub struct ProgressTracker {
    state: ProgressState,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            state: ProgressState::default(),
        }
    }

    pub fn load(store: &dyn PersistentStore) -> Self {
        Self {
            state: storage::load_state(store, storage::keys::PROGRESS, STATE_VERSION),
        }
    }

    pub fn persist(&self, store: &dyn PersistentStore) {
        storage::save_state(store, storage::keys::PROGRESS, STATE_VERSION, &self.state);
    }

    /// Record one ritual performance.
    ///
    /// Appends to the event log, rolls the today-count across day
    /// boundaries, bumps lifetime/category totals and applies the streak
    /// rule. Returns the appended event and what happened to the streak.
    pub fn record(
        &mut self,
        ritual_id: &str,
        category: RitualCategory,
        mood: Option<u8>,
        note: Option<String>,
        at: DateTime<Utc>,
        day: NaiveDate,
    ) -> (CompletionEvent, StreakChange) {
        if self.state.today != Some(day) {
            self.state.today = Some(day);
            self.state.today_count = 0;
        }
        self.state.today_count += 1;
        self.state.lifetime_count += 1;
        *self.state.category_counts.entry(category).or_insert(0) += 1;
        self.state.days_completed.insert(day);

        let change = self.state.streak.record_day(day);

        let event = CompletionEvent {
            id: Uuid::new_v4(),
            ritual_id: ritual_id.to_string(),
            at,
            day,
            mood,
            note,
        };
        self.state.events.push(event.clone());
        (event, change)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn streak(&self) -> &Streak {
        &self.state.streak
    }

    /// Completions recorded on `day`. Zero once the day rolls over.
    pub fn today_count(&self, day: NaiveDate) -> u32 {
        if self.state.today == Some(day) {
            self.state.today_count
        } else {
            0
        }
    }

    pub fn lifetime_count(&self) -> u32 {
        self.state.lifetime_count
    }

    pub fn category_count(&self, category: RitualCategory) -> u32 {
        self.state
            .category_counts
            .get(&category)
            .copied()
            .unwrap_or(0)
    }

    /// The append-only completion log, oldest first.
    pub fn events(&self) -> &[CompletionEvent] {
        &self.state.events
    }

    /// Distinct ritual ids completed on `day`.
    pub fn distinct_rituals_on(&self, day: NaiveDate) -> BTreeSet<String> {
        self.state
            .events
            .iter()
            .filter(|e| e.day == day)
            .map(|e| e.ritual_id.clone())
            .collect()
    }

    fn perfect_week(&self, today: NaiveDate) -> bool {
        (0..7).all(|back| {
            let day = today - chrono::Duration::days(back);
            self.state.days_completed.contains(&day)
        })
    }

    fn recent_mood_average(&self, now: DateTime<Utc>) -> Option<f64> {
        let cutoff = now - chrono::Duration::days(7);
        let moods: Vec<f64> = self
            .state
            .events
            .iter()
            .filter(|e| e.at >= cutoff)
            .filter_map(|e| e.mood.map(f64::from))
            .collect();
        if moods.is_empty() {
            None
        } else {
            Some(moods.iter().sum::<f64>() / moods.len() as f64)
        }
    }

    /// Build the stats snapshot for requirement evaluation. Share and
    /// custom-ritual counts live in other components and are passed in.
    pub fn aggregate_stats(
        &self,
        now: DateTime<Utc>,
        today: NaiveDate,
        share_count: u32,
        custom_ritual_count: u32,
    ) -> AggregateStats {
        AggregateStats {
            streak_days: self.state.streak.current,
            best_streak: self.state.streak.best,
            total_rituals: self.state.lifetime_count,
            today_rituals: self.today_count(today),
            recent_mood_average: self.recent_mood_average(now),
            share_count,
            custom_ritual_count,
            perfect_week: self.perfect_week(today),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn streak_follows_consecutive_days() {
        let mut streak = Streak::default();
        assert_eq!(streak.record_day(day(1)), StreakChange::Reset);
        assert_eq!(streak.record_day(day(2)), StreakChange::Extended(2));
        assert_eq!(streak.record_day(day(2)), StreakChange::NoChange);
        assert_eq!(streak.record_day(day(4)), StreakChange::Reset);
        assert_eq!(streak.current, 1);
        assert_eq!(streak.best, 2);
    }

    #[test]
    fn skip_resets_to_one_not_zero() {
        // Completions on day 1, 2, 4 yield streak sequence 1, 2, 1.
        let mut streak = Streak::default();
        streak.record_day(day(1));
        assert_eq!(streak.current, 1);
        streak.record_day(day(2));
        assert_eq!(streak.current, 2);
        streak.record_day(day(4));
        assert_eq!(streak.current, 1);
    }

    #[test]
    fn best_never_below_current() {
        let mut streak = Streak::default();
        for d in 1..=5 {
            streak.record_day(day(d));
            assert!(streak.best >= streak.current);
        }
        assert_eq!(streak.best, 5);
    }

    #[test]
    fn today_count_rolls_over() {
        let mut tracker = ProgressTracker::new();
        tracker.record("touch-wood", RitualCategory::Wood, None, None, at(1), day(1));
        tracker.record("touch-wood", RitualCategory::Wood, None, None, at(1), day(1));
        assert_eq!(tracker.today_count(day(1)), 2);
        tracker.record("touch-wood", RitualCategory::Wood, None, None, at(2), day(2));
        assert_eq!(tracker.today_count(day(2)), 1);
        assert_eq!(tracker.today_count(day(1)), 0);
        assert_eq!(tracker.lifetime_count(), 3);
    }

    #[test]
    fn distinct_rituals_per_day() {
        let mut tracker = ProgressTracker::new();
        tracker.record("a", RitualCategory::Wood, None, None, at(1), day(1));
        tracker.record("b", RitualCategory::Fortune, None, None, at(1), day(1));
        tracker.record("a", RitualCategory::Wood, None, None, at(1), day(1));
        assert_eq!(tracker.distinct_rituals_on(day(1)).len(), 2);
        assert!(tracker.distinct_rituals_on(day(2)).is_empty());
    }

    #[test]
    fn perfect_week_needs_all_seven_days() {
        let mut tracker = ProgressTracker::new();
        for d in 1..=6 {
            tracker.record("a", RitualCategory::Wood, None, None, at(d), day(d));
        }
        let stats = tracker.aggregate_stats(at(7), day(7), 0, 0);
        assert!(!stats.perfect_week);

        tracker.record("a", RitualCategory::Wood, None, None, at(7), day(7));
        let stats = tracker.aggregate_stats(at(7), day(7), 0, 0);
        assert!(stats.perfect_week);
    }

    #[test]
    fn recent_mood_average_ignores_unrated() {
        let mut tracker = ProgressTracker::new();
        tracker.record("a", RitualCategory::Wood, Some(5), None, at(1), day(1));
        tracker.record("a", RitualCategory::Wood, None, None, at(2), day(2));
        tracker.record("a", RitualCategory::Wood, Some(3), None, at(3), day(3));
        let stats = tracker.aggregate_stats(at(4), day(4), 0, 0);
        assert_eq!(stats.recent_mood_average, Some(4.0));
    }

    #[test]
    fn persists_and_reloads() {
        let store = MemoryStore::new();
        let mut tracker = ProgressTracker::new();
        tracker.record("a", RitualCategory::Wood, Some(4), None, at(1), day(1));
        tracker.record("b", RitualCategory::Fortune, None, None, at(2), day(2));
        tracker.persist(&store);

        let reloaded = ProgressTracker::load(&store);
        assert_eq!(reloaded.lifetime_count(), 2);
        assert_eq!(reloaded.streak().current, 2);
        assert_eq!(reloaded.events().len(), 2);
        assert_eq!(reloaded.category_count(RitualCategory::Fortune), 1);
    }
}
