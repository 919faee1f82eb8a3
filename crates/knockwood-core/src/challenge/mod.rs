//! Daily challenges.
//!
//! Each calendar day gets a fresh draw of 2-3 challenges from the five
//! template types. A challenge instance moves `Active -> Completed` when its
//! progress reaches the target (reward granted exactly once, atomically with
//! the flip) or is discarded unrewarded at the next day's refresh.
//!
//! The random draw goes through an injected `Pcg64` so tests can seed it.

use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// The five fixed challenge template types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    /// Complete N rituals today (cumulative).
    Rituals,
    /// Extend the global streak today (cumulative).
    Streak,
    /// Log a completion at or above a mood threshold (pass/fail).
    Mood,
    /// Complete N distinct rituals today (idempotent measurement).
    Variety,
    /// Complete rituals inside a morning or evening window (cumulative).
    Time,
}

/// All template types, in draw order.
pub const ALL_CHALLENGE_TYPES: [ChallengeType; 5] = [
    ChallengeType::Rituals,
    ChallengeType::Streak,
    ChallengeType::Mood,
    ChallengeType::Variety,
    ChallengeType::Time,
];

/// Daypart a time-type challenge is bound to. Carried on the instance, not
/// in the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Morning,
    Evening,
}

impl TimeWindow {
    /// Morning is [6, 12), evening is [18, 24).
    pub fn contains(&self, hour: u32) -> bool {
        match self {
            TimeWindow::Morning => (6..12).contains(&hour),
            TimeWindow::Evening => (18..24).contains(&hour),
        }
    }
}

/// What completing a challenge grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reward {
    Points { amount: u32 },
    WoodStyle { style_id: String },
    Badge { name: String },
}

/// One day-scoped challenge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: Uuid,
    pub challenge_type: ChallengeType,
    /// Set only for time-type instances.
    pub window: Option<TimeWindow>,
    pub title: String,
    pub description: String,
    pub target: u32,
    pub progress: u32,
    pub reward: Reward,
    pub date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DailyChallenge {
    /// Add cumulative progress. Already-completed instances are skipped, so
    /// the completion transition (and its reward) can only fire once.
    /// Returns true if this call completed the challenge.
    fn apply(&mut self, amount: u32, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.progress = (self.progress + amount).min(self.target);
        debug_assert!(self.progress <= self.target);
        self.check_completion(now)
    }

    /// Set progress to an absolute measurement (variety). Never decreases.
    fn measure(&mut self, value: u32, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.progress = self.progress.max(value.min(self.target));
        self.check_completion(now)
    }

    fn check_completion(&mut self, now: DateTime<Utc>) -> bool {
        if self.progress >= self.target {
            self.completed = true;
            self.completed_at = Some(now);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChallengeState {
    active: Vec<DailyChallenge>,
    last_refresh: Option<NaiveDate>,
    /// Completed instances, kept across refreshes.
    completed_history: Vec<DailyChallenge>,
    points_earned: u32,
}

/// Generates the daily challenge set and advances per-type progress.
pub struct ChallengeEngine {
    state: ChallengeState,
    rng: Pcg64,
}

impl ChallengeEngine {
    pub fn new() -> Self {
        Self {
            state: ChallengeState::default(),
            rng: Pcg64::from_entropy(),
        }
    }

    /// Engine with a deterministic draw sequence (tests).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: ChallengeState::default(),
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn load(store: &dyn PersistentStore) -> Self {
        Self {
            state: storage::load_state(store, storage::keys::CHALLENGES, STATE_VERSION),
            rng: Pcg64::from_entropy(),
        }
    }

    pub fn load_seeded(store: &dyn PersistentStore, seed: u64) -> Self {
        Self {
            state: storage::load_state(store, storage::keys::CHALLENGES, STATE_VERSION),
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn persist(&self, store: &dyn PersistentStore) {
        storage::save_state(store, storage::keys::CHALLENGES, STATE_VERSION, &self.state);
    }

    /// Replace yesterday's instances with a fresh draw if the calendar day
    /// changed since the last refresh. Returns true if a new set was drawn;
    /// calling again within the same day is a no-op.
    pub fn refresh_daily(&mut self, today: NaiveDate, bounds: (u32, u32)) -> bool {
        if self.state.last_refresh == Some(today) {
            return false;
        }
        // Unfinished instances expire unrewarded; completed ones are already
        // in the history.
        self.state.active.clear();
        self.state.last_refresh = Some(today);

        let (min, max) = bounds;
        let count = self.rng.gen_range(min..=max) as usize;
        let types: Vec<ChallengeType> = ALL_CHALLENGE_TYPES
            .choose_multiple(&mut self.rng, count.min(ALL_CHALLENGE_TYPES.len()))
            .copied()
            .collect();
        for challenge_type in types {
            let challenge = self.instantiate(challenge_type, today);
            self.state.active.push(challenge);
        }
        true
    }

    fn instantiate(&mut self, challenge_type: ChallengeType, today: NaiveDate) -> DailyChallenge {
        let (window, title, description, target, reward) = match challenge_type {
            ChallengeType::Rituals => {
                let target = self.rng.gen_range(3..=5);
                (
                    None,
                    "Ritual Runner".to_string(),
                    format!("Complete {target} rituals today"),
                    target,
                    Reward::Points {
                        amount: target * 10,
                    },
                )
            }
            ChallengeType::Streak => (
                None,
                "Keep the Flame".to_string(),
                "Extend your streak today".to_string(),
                1,
                Reward::Points { amount: 20 },
            ),
            ChallengeType::Mood => (
                None,
                "Good Wood Day".to_string(),
                "Log a ritual feeling great (mood 4 or higher)".to_string(),
                4,
                Reward::Points { amount: 30 },
            ),
            ChallengeType::Variety => (
                None,
                "Mix It Up".to_string(),
                "Complete 3 different rituals today".to_string(),
                3,
                Reward::Points { amount: 40 },
            ),
            ChallengeType::Time => {
                let window = if self.rng.gen_bool(0.5) {
                    TimeWindow::Morning
                } else {
                    TimeWindow::Evening
                };
                let target = self.rng.gen_range(1..=2);
                let (title, description) = match window {
                    TimeWindow::Morning => (
                        "Early Knock".to_string(),
                        format!("Complete {target} ritual(s) between 6:00 and 12:00"),
                    ),
                    TimeWindow::Evening => (
                        "Evening Knock".to_string(),
                        format!("Complete {target} ritual(s) between 18:00 and 24:00"),
                    ),
                };
                (
                    Some(window),
                    title,
                    description,
                    target,
                    Reward::Points { amount: 25 },
                )
            }
        };

        DailyChallenge {
            id: Uuid::new_v4(),
            challenge_type,
            window,
            title,
            description,
            target,
            progress: 0,
            reward,
            date: today,
            completed: false,
            completed_at: None,
        }
    }

    /// Add `increment` to every active, not-yet-completed challenge of the
    /// given type. Returns the instances this call completed.
    pub fn update_progress(
        &mut self,
        challenge_type: ChallengeType,
        increment: u32,
        now: DateTime<Utc>,
    ) -> Vec<DailyChallenge> {
        let mut completed = Vec::new();
        for challenge in &mut self.state.active {
            if challenge.challenge_type == challenge_type && challenge.apply(increment, now) {
                completed.push(challenge.clone());
            }
        }
        self.settle(&completed);
        completed
    }

    /// Mood challenges are pass/fail: a single qualifying mood completes
    /// them outright, anything below the target is no change.
    pub fn update_mood_progress(&mut self, mood: u8, now: DateTime<Utc>) -> Vec<DailyChallenge> {
        let mut completed = Vec::new();
        for challenge in &mut self.state.active {
            if challenge.challenge_type == ChallengeType::Mood
                && u32::from(mood) >= challenge.target
                && challenge.apply(challenge.target, now)
            {
                completed.push(challenge.clone());
            }
        }
        self.settle(&completed);
        completed
    }

    /// Variety progress is a measurement of today's distinct ritual count,
    /// not an event count. Re-measuring is idempotent.
    pub fn update_variety_progress(
        &mut self,
        distinct_rituals: u32,
        now: DateTime<Utc>,
    ) -> Vec<DailyChallenge> {
        let mut completed = Vec::new();
        for challenge in &mut self.state.active {
            if challenge.challenge_type == ChallengeType::Variety
                && challenge.measure(distinct_rituals, now)
            {
                completed.push(challenge.clone());
            }
        }
        self.settle(&completed);
        completed
    }

    /// Advance time-window challenges whose window contains `hour`.
    pub fn update_time_progress(&mut self, hour: u32, now: DateTime<Utc>) -> Vec<DailyChallenge> {
        let mut completed = Vec::new();
        for challenge in &mut self.state.active {
            if challenge.challenge_type == ChallengeType::Time
                && challenge.window.is_some_and(|w| w.contains(hour))
                && challenge.apply(1, now)
            {
                completed.push(challenge.clone());
            }
        }
        self.settle(&completed);
        completed
    }

    /// Record rewards and history for freshly completed instances.
    fn settle(&mut self, completed: &[DailyChallenge]) {
        for challenge in completed {
            if let Reward::Points { amount } = challenge.reward {
                self.state.points_earned += amount;
            }
            self.state.completed_history.push(challenge.clone());
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active(&self) -> &[DailyChallenge] {
        &self.state.active
    }

    pub fn completed_history(&self) -> &[DailyChallenge] {
        &self.state.completed_history
    }

    pub fn points_earned(&self) -> u32 {
        self.state.points_earned
    }

    pub fn last_refresh(&self) -> Option<NaiveDate> {
        self.state.last_refresh
    }
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    fn engine_with(challenge: DailyChallenge) -> ChallengeEngine {
        let mut engine = ChallengeEngine::with_seed(1);
        engine.state.active.push(challenge);
        engine
    }

    fn challenge(challenge_type: ChallengeType, target: u32) -> DailyChallenge {
        DailyChallenge {
            id: Uuid::new_v4(),
            challenge_type,
            window: None,
            title: "t".to_string(),
            description: String::new(),
            target,
            progress: 0,
            reward: Reward::Points { amount: 10 },
            date: day(1),
            completed: false,
            completed_at: None,
        }
    }

    #[test]
    fn refresh_draws_two_to_three_distinct_types() {
        for seed in 0..20 {
            let mut engine = ChallengeEngine::with_seed(seed);
            assert!(engine.refresh_daily(day(1), (2, 3)));
            let types: HashSet<ChallengeType> = engine
                .active()
                .iter()
                .map(|c| c.challenge_type)
                .collect();
            assert_eq!(types.len(), engine.active().len(), "draw without replacement");
            assert!((2..=3).contains(&engine.active().len()));
            assert!(engine.active().iter().all(|c| c.progress == 0 && !c.completed));
        }
    }

    #[test]
    fn refresh_twice_same_day_is_noop() {
        let mut engine = ChallengeEngine::with_seed(7);
        engine.refresh_daily(day(1), (2, 3));
        let ids: Vec<Uuid> = engine.active().iter().map(|c| c.id).collect();
        assert!(!engine.refresh_daily(day(1), (2, 3)));
        let ids_after: Vec<Uuid> = engine.active().iter().map(|c| c.id).collect();
        assert_eq!(ids, ids_after);
    }

    #[test]
    fn refresh_next_day_discards_unfinished() {
        let mut engine = ChallengeEngine::with_seed(7);
        engine.refresh_daily(day(1), (2, 3));
        let old_ids: HashSet<Uuid> = engine.active().iter().map(|c| c.id).collect();
        assert!(engine.refresh_daily(day(2), (2, 3)));
        assert!(engine.active().iter().all(|c| !old_ids.contains(&c.id)));
        assert!(engine.active().iter().all(|c| c.date == day(2)));
        assert!(engine.completed_history().is_empty());
    }

    #[test]
    fn same_seed_same_draw() {
        let mut a = ChallengeEngine::with_seed(42);
        let mut b = ChallengeEngine::with_seed(42);
        a.refresh_daily(day(1), (2, 3));
        b.refresh_daily(day(1), (2, 3));
        let ta: Vec<ChallengeType> = a.active().iter().map(|c| c.challenge_type).collect();
        let tb: Vec<ChallengeType> = b.active().iter().map(|c| c.challenge_type).collect();
        assert_eq!(ta, tb);
    }

    #[test]
    fn reward_granted_exactly_once() {
        let mut engine = engine_with(challenge(ChallengeType::Rituals, 5));
        for _ in 0..4 {
            assert!(engine.update_progress(ChallengeType::Rituals, 1, now()).is_empty());
        }
        let completed = engine.update_progress(ChallengeType::Rituals, 1, now());
        assert_eq!(completed.len(), 1);
        assert_eq!(engine.points_earned(), 10);

        // Ten more updates: no double grant, progress stays clamped.
        for _ in 0..10 {
            assert!(engine.update_progress(ChallengeType::Rituals, 1, now()).is_empty());
        }
        assert_eq!(engine.points_earned(), 10);
        assert_eq!(engine.completed_history().len(), 1);
        assert_eq!(engine.active()[0].progress, 5);
    }

    #[test]
    fn mood_challenge_is_pass_fail() {
        let mut engine = engine_with(challenge(ChallengeType::Mood, 4));
        assert!(engine.update_mood_progress(3, now()).is_empty());
        assert_eq!(engine.active()[0].progress, 0);
        let completed = engine.update_mood_progress(4, now());
        assert_eq!(completed.len(), 1);
        assert_eq!(engine.active()[0].progress, 4);
    }

    #[test]
    fn variety_is_idempotent_measurement() {
        let mut engine = engine_with(challenge(ChallengeType::Variety, 3));
        engine.update_variety_progress(2, now());
        engine.update_variety_progress(2, now());
        assert_eq!(engine.active()[0].progress, 2);
        let completed = engine.update_variety_progress(3, now());
        assert_eq!(completed.len(), 1);
    }

    #[test]
    fn variety_measurement_never_decreases() {
        let mut engine = engine_with(challenge(ChallengeType::Variety, 5));
        engine.update_variety_progress(3, now());
        engine.update_variety_progress(1, now());
        assert_eq!(engine.active()[0].progress, 3);
    }

    #[test]
    fn time_windows_gate_progress() {
        let mut c = challenge(ChallengeType::Time, 1);
        c.window = Some(TimeWindow::Morning);
        let mut engine = engine_with(c);
        assert!(engine.update_time_progress(13, now()).is_empty());
        assert!(engine.update_time_progress(5, now()).is_empty());
        let completed = engine.update_time_progress(8, now());
        assert_eq!(completed.len(), 1);
    }

    #[test]
    fn evening_window_bounds() {
        assert!(!TimeWindow::Evening.contains(17));
        assert!(TimeWindow::Evening.contains(18));
        assert!(TimeWindow::Evening.contains(23));
        assert!(!TimeWindow::Morning.contains(12));
        assert!(TimeWindow::Morning.contains(6));
    }

    #[test]
    fn multiple_challenges_of_same_type_all_advance() {
        let mut engine = engine_with(challenge(ChallengeType::Rituals, 1));
        engine.state.active.push(challenge(ChallengeType::Rituals, 2));
        let completed = engine.update_progress(ChallengeType::Rituals, 1, now());
        assert_eq!(completed.len(), 1);
        assert_eq!(engine.active()[1].progress, 1);
    }

    #[test]
    fn persists_across_reload() {
        let store = MemoryStore::new();
        let mut engine = ChallengeEngine::with_seed(3);
        engine.refresh_daily(day(1), (2, 3));
        engine.persist(&store);

        let reloaded = ChallengeEngine::load(&store);
        assert_eq!(reloaded.last_refresh(), Some(day(1)));
        assert_eq!(reloaded.active().len(), engine.active().len());

        // A reloaded engine with a pinned seed redraws deterministically.
        let mut a = ChallengeEngine::load_seeded(&store, 11);
        let mut b = ChallengeEngine::load_seeded(&store, 11);
        a.refresh_daily(day(2), (2, 3));
        b.refresh_daily(day(2), (2, 3));
        let ta: Vec<ChallengeType> = a.active().iter().map(|c| c.challenge_type).collect();
        let tb: Vec<ChallengeType> = b.active().iter().map(|c| c.challenge_type).collect();
        assert_eq!(ta, tb);
    }
}
