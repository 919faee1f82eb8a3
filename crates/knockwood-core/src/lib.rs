//! # Knockwood Core Library
//!
//! Core business logic for Knockwood, a habit tracker built on the
//! "touch wood" ritual. The library is UI-free: a CLI binary (and any
//! future GUI shell) is a thin layer over the same engines.
//!
//! ## Architecture
//!
//! - **Progress**: append-only completion log, calendar-day streaks,
//!   aggregate stats
//! - **Challenges**: a fresh 2-3 challenge draw per day, per-type progress
//!   rules, exactly-once rewards
//! - **Achievements**: fixed catalog evaluated idempotently against stats
//!   snapshots
//! - **Seasonal**: time-windowed events with unlockable special rituals
//! - **Analytics**: mood trends, streak runs and insights over the log
//! - **Storage**: JSON state blobs in a SQLite key-value table
//!
//! ## Key Components
//!
//! - [`HabitService`]: composition root owning every engine and the data
//!   flow between them
//! - [`ProgressTracker`]: completion log and streak state
//! - [`ChallengeEngine`]: daily challenge draw and progress
//! - [`AchievementEngine`]: unlock evaluation and point totals
//! - [`SeasonalEventEngine`]: event windows, event challenges, ritual gates
//! - [`MoodAnalyticsEngine`]: derived mood series and insights
//! - [`Database`]: SQLite-backed persistence

pub mod achievement;
pub mod analytics;
pub mod catalog;
pub mod challenge;
pub mod clock;
pub mod error;
pub mod events;
pub mod progress;
pub mod seasonal;
pub mod service;
pub mod social;
pub mod storage;

pub use achievement::{Achievement, AchievementCategory, AchievementEngine, Requirement};
pub use analytics::{
    calculate_trend, MoodAnalyticsEngine, MoodDataPoint, MoodEntry, MoodInsight, MoodStreak,
    MoodStreakKind, MoodTrend, RitualMoodData, TimeOfDay, TimeOfDayMood,
};
pub use catalog::{Ritual, RitualCatalog, RitualCategory, WoodStyle};
pub use challenge::{ChallengeEngine, ChallengeType, DailyChallenge, Reward, TimeWindow};
pub use clock::{day_difference, Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::{CollectingSink, Event, NotificationSink};
pub use progress::{AggregateStats, CompletionEvent, ProgressTracker, Streak, StreakChange};
pub use seasonal::{
    EventChallenge, EventChallengeKind, SeasonalEvent, SeasonalEventEngine, SpecialRitual,
    UnlockRequirement, UnlockSnapshot,
};
pub use service::HabitService;
pub use social::{ShareKind, SharePayload, SocialSharingManager};
pub use storage::{Config, Database, MemoryStore, PersistentStore};
