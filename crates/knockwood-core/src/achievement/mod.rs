//! Achievements.
//!
//! A fixed catalog of requirements evaluated against aggregate stats.
//! Unlocks are monotonic: once flipped, never reset, points counted exactly
//! once. `evaluate` is idempotent over an unchanged stats snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::AggregateStats;
use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// Points per level. Level 1 starts at zero points.
const POINTS_PER_LEVEL: u32 = 100;

/// Closed set of unlock conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Current streak of at least N days.
    StreakDays { days: u32 },
    /// Lifetime completion count of at least N.
    TotalRituals { count: u32 },
    /// Average mood of at least `min` over the recent 7-day window.
    MoodAverage { min: f64 },
    /// At least N shares.
    ShareCount { count: u32 },
    /// At least N user-defined rituals.
    CustomRituals { count: u32 },
    /// Best-ever run of consecutive days of at least N.
    ConsecutiveDays { days: u32 },
    /// Every one of the last 7 days has at least one completion.
    PerfectWeek,
}

impl Requirement {
    /// Test this requirement against a stats snapshot.
    pub fn is_met(&self, stats: &AggregateStats) -> bool {
        match self {
            Requirement::StreakDays { days } => stats.streak_days >= *days,
            Requirement::TotalRituals { count } => stats.total_rituals >= *count,
            Requirement::MoodAverage { min } => {
                stats.recent_mood_average.is_some_and(|avg| avg >= *min)
            }
            Requirement::ShareCount { count } => stats.share_count >= *count,
            Requirement::CustomRituals { count } => stats.custom_ritual_count >= *count,
            Requirement::ConsecutiveDays { days } => stats.best_streak >= *days,
            Requirement::PerfectWeek => stats.perfect_week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Streak,
    Dedication,
    Mood,
    Social,
    Collection,
}

/// One achievement from the fixed catalog, with unlock state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: AchievementCategory,
    pub requirement: Requirement,
    pub points: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AchievementState {
    /// Unlock timestamps keyed by achievement id.
    unlocked: HashMap<String, DateTime<Utc>>,
    total_points: u32,
}

/// Evaluates the catalog against stats snapshots and accumulates points.
pub struct AchievementEngine {
    achievements: Vec<Achievement>,
    total_points: u32,
}

impl AchievementEngine {
    pub fn new() -> Self {
        Self {
            achievements: achievement_catalog(),
            total_points: 0,
        }
    }

    /// Load, replaying persisted unlock flags onto the catalog. Unknown
    /// persisted ids (from an older catalog) are ignored.
    pub fn load(store: &dyn PersistentStore) -> Self {
        let state: AchievementState =
            storage::load_state(store, storage::keys::ACHIEVEMENTS, STATE_VERSION);
        let mut achievements = achievement_catalog();
        for achievement in &mut achievements {
            if let Some(at) = state.unlocked.get(&achievement.id) {
                achievement.unlocked = true;
                achievement.unlocked_at = Some(*at);
            }
        }
        Self {
            achievements,
            total_points: state.total_points,
        }
    }

    pub fn persist(&self, store: &dyn PersistentStore) {
        let state = AchievementState {
            unlocked: self
                .achievements
                .iter()
                .filter_map(|a| a.unlocked_at.map(|at| (a.id.clone(), at)))
                .collect(),
            total_points: self.total_points,
        };
        storage::save_state(store, storage::keys::ACHIEVEMENTS, STATE_VERSION, &state);
    }

    /// Evaluate every locked achievement against the snapshot. Newly
    /// unlocked achievements are returned in catalog order; running the
    /// same snapshot twice returns an empty batch the second time.
    pub fn evaluate(&mut self, stats: &AggregateStats, now: DateTime<Utc>) -> Vec<Achievement> {
        let mut newly_unlocked = Vec::new();
        for achievement in &mut self.achievements {
            if achievement.unlocked || !achievement.requirement.is_met(stats) {
                continue;
            }
            achievement.unlocked = true;
            achievement.unlocked_at = Some(now);
            self.total_points += achievement.points;
            newly_unlocked.push(achievement.clone());
        }
        newly_unlocked
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The full catalog with current unlock state, in catalog order.
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn unlocked_ids(&self) -> impl Iterator<Item = &str> {
        self.achievements
            .iter()
            .filter(|a| a.unlocked)
            .map(|a| a.id.as_str())
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Level derived from the running point total.
    pub fn level(&self) -> u32 {
        1 + self.total_points / POINTS_PER_LEVEL
    }
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn achievement_catalog() -> Vec<Achievement> {
    fn entry(
        id: &str,
        title: &str,
        description: &str,
        category: AchievementCategory,
        requirement: Requirement,
        points: u32,
    ) -> Achievement {
        Achievement {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            requirement,
            points,
            unlocked: false,
            unlocked_at: None,
        }
    }

    vec![
        entry(
            "first-knock",
            "First Knock",
            "Complete your first ritual.",
            AchievementCategory::Dedication,
            Requirement::TotalRituals { count: 1 },
            10,
        ),
        entry(
            "three-day-spark",
            "Three-Day Spark",
            "Hold a 3-day streak.",
            AchievementCategory::Streak,
            Requirement::StreakDays { days: 3 },
            20,
        ),
        entry(
            "week-of-wood",
            "Week of Wood",
            "Hold a 7-day streak.",
            AchievementCategory::Streak,
            Requirement::StreakDays { days: 7 },
            50,
        ),
        entry(
            "iron-month",
            "Iron Month",
            "Reach a best run of 30 consecutive days.",
            AchievementCategory::Streak,
            Requirement::ConsecutiveDays { days: 30 },
            150,
        ),
        entry(
            "fifty-knocks",
            "Fifty Knocks",
            "Complete 50 rituals all-time.",
            AchievementCategory::Dedication,
            Requirement::TotalRituals { count: 50 },
            40,
        ),
        entry(
            "two-hundred-knocks",
            "Two Hundred Knocks",
            "Complete 200 rituals all-time.",
            AchievementCategory::Dedication,
            Requirement::TotalRituals { count: 200 },
            100,
        ),
        entry(
            "perfect-week",
            "Perfect Week",
            "A ritual on every one of the last 7 days.",
            AchievementCategory::Dedication,
            Requirement::PerfectWeek,
            60,
        ),
        entry(
            "sunny-stretch",
            "Sunny Stretch",
            "Average mood of 4+ across the last week.",
            AchievementCategory::Mood,
            Requirement::MoodAverage { min: 4.0 },
            50,
        ),
        entry(
            "town-crier",
            "Town Crier",
            "Share your progress 5 times.",
            AchievementCategory::Social,
            Requirement::ShareCount { count: 5 },
            30,
        ),
        entry(
            "evangelist",
            "Evangelist",
            "Share your progress 25 times.",
            AchievementCategory::Social,
            Requirement::ShareCount { count: 25 },
            80,
        ),
        entry(
            "ritual-smith",
            "Ritual Smith",
            "Create a custom ritual.",
            AchievementCategory::Collection,
            Requirement::CustomRituals { count: 1 },
            20,
        ),
        entry(
            "folklorist",
            "Folklorist",
            "Create 5 custom rituals.",
            AchievementCategory::Collection,
            Requirement::CustomRituals { count: 5 },
            60,
        ),
    ]
}
