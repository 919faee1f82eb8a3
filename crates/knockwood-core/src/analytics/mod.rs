//! Mood analytics.
//!
//! Derives trend windows, per-ritual mood correlation, time-of-day buckets,
//! mood streaks and insights from the rated entries of the completion log.
//! Every `add_entry` triggers a full recomputation; a single user's log is
//! small enough that incremental updates would be speculative complexity.

mod insights;

pub use insights::{generate_insights, InsightKind, MoodInsight};

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::day_difference;
use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// Trend threshold: half-to-half average shift beyond which a series is no
/// longer "stable".
const TREND_EPSILON: f64 = 0.3;

/// Minimum entries before a run of days counts as a mood streak.
const MIN_STREAK_LEN: usize = 3;

/// One rated entry in the mood log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub ritual_id: String,
    pub ritual_name: String,
    /// 1..=5.
    pub mood: u8,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
    /// Calendar day and hour bucketed at record time.
    pub day: NaiveDate,
    pub hour: u32,
}

/// Three-way classification of a mood sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
}

/// Daily average within a trend window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodDataPoint {
    pub date: NaiveDate,
    pub average_mood: f64,
    pub count: u32,
}

/// Per-ritual mood correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RitualMoodData {
    pub ritual_name: String,
    pub average_mood: f64,
    pub sample_count: u32,
    pub trend: MoodTrend,
}

/// Classification of a mood streak by its average.
///
/// `Improving` is the catch-all bucket for runs averaging below 3.0 -- the
/// label is historical, not a claim about direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodStreakKind {
    /// Average mood >= 4.0.
    Positive,
    /// Average mood >= 3.0.
    Neutral,
    /// Everything below.
    Improving,
}

/// A maximal run of entries whose day gaps never exceed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodStreak {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Number of entries in the run.
    pub length: u32,
    pub average_mood: f64,
    pub kind: MoodStreakKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Morning [5,12), afternoon [12,17), evening [17,22), night otherwise.
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }
}

/// Average mood per daypart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOfDayMood {
    pub period: TimeOfDay,
    pub average_mood: f64,
    pub count: u32,
}

/// Classify a mood sample sequence by comparing the first half against the
/// second (split by position; the first half gets the smaller share on odd
/// counts). Fewer than 3 samples is always `Stable`.
pub fn calculate_trend(moods: &[f64]) -> MoodTrend {
    if moods.len() < 3 {
        return MoodTrend::Stable;
    }
    let mid = moods.len() / 2;
    let first = average(&moods[..mid]);
    let second = average(&moods[mid..]);
    let diff = second - first;
    if diff > TREND_EPSILON {
        MoodTrend::Improving
    } else if diff < -TREND_EPSILON {
        MoodTrend::Declining
    } else {
        MoodTrend::Stable
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MoodLogState {
    entries: Vec<MoodEntry>,
}

/// Owns the mood log and all series derived from it.
pub struct MoodAnalyticsEngine {
    entries: Vec<MoodEntry>,
    weekly_trend: Vec<MoodDataPoint>,
    monthly_trend: Vec<MoodDataPoint>,
    ritual_moods: Vec<RitualMoodData>,
    time_of_day: Vec<TimeOfDayMood>,
    streaks: Vec<MoodStreak>,
    insights: Vec<MoodInsight>,
}

impl MoodAnalyticsEngine {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            weekly_trend: Vec::new(),
            monthly_trend: Vec::new(),
            ritual_moods: Vec::new(),
            time_of_day: Vec::new(),
            streaks: Vec::new(),
            insights: Vec::new(),
        }
    }

    /// Load the persisted log and rebuild every derived series as of
    /// `today`.
    pub fn load(store: &dyn PersistentStore, today: NaiveDate) -> Self {
        let state: MoodLogState =
            storage::load_state(store, storage::keys::MOOD_LOG, STATE_VERSION);
        let mut engine = Self::new();
        engine.entries = state.entries;
        engine.recompute(today);
        engine
    }

    pub fn persist(&self, store: &dyn PersistentStore) {
        let state = MoodLogState {
            entries: self.entries.clone(),
        };
        storage::save_state(store, storage::keys::MOOD_LOG, STATE_VERSION, &state);
    }

    /// Append one rated entry and recompute all derived series.
    #[allow(clippy::too_many_arguments)]
    pub fn add_entry(
        &mut self,
        ritual_id: &str,
        ritual_name: &str,
        mood: u8,
        note: Option<String>,
        at: DateTime<Utc>,
        day: NaiveDate,
        hour: u32,
    ) {
        self.entries.push(MoodEntry {
            id: Uuid::new_v4(),
            ritual_id: ritual_id.to_string(),
            ritual_name: ritual_name.to_string(),
            mood,
            note,
            at,
            day,
            hour,
        });
        self.recompute(day);
    }

    /// Rebuild every derived series from the raw log.
    pub fn recompute(&mut self, today: NaiveDate) {
        self.weekly_trend = self.window_points(today, 7);
        self.monthly_trend = self.window_points(today, 30);
        self.ritual_moods = self.compute_ritual_moods();
        self.time_of_day = self.compute_time_of_day();
        self.streaks = self.compute_streaks();
        self.insights =
            generate_insights(&self.time_of_day, &self.ritual_moods, &self.weekly_trend);
    }

    fn window_points(&self, today: NaiveDate, days: i64) -> Vec<MoodDataPoint> {
        let cutoff = today - chrono::Duration::days(days - 1);
        let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for entry in &self.entries {
            if entry.day >= cutoff && entry.day <= today {
                by_day.entry(entry.day).or_default().push(f64::from(entry.mood));
            }
        }
        by_day
            .into_iter()
            .map(|(date, moods)| MoodDataPoint {
                date,
                average_mood: average(&moods),
                count: moods.len() as u32,
            })
            .collect()
    }

    fn compute_ritual_moods(&self) -> Vec<RitualMoodData> {
        let mut by_ritual: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for entry in &self.entries {
            by_ritual
                .entry(entry.ritual_name.clone())
                .or_default()
                .push(f64::from(entry.mood));
        }
        let mut out: Vec<RitualMoodData> = by_ritual
            .into_iter()
            .map(|(ritual_name, moods)| RitualMoodData {
                average_mood: average(&moods),
                sample_count: moods.len() as u32,
                trend: calculate_trend(&moods),
                ritual_name,
            })
            .collect();
        out.sort_by(|a, b| b.average_mood.total_cmp(&a.average_mood));
        out
    }

    fn compute_time_of_day(&self) -> Vec<TimeOfDayMood> {
        let mut buckets: BTreeMap<u8, (TimeOfDay, Vec<f64>)> = BTreeMap::new();
        for entry in &self.entries {
            let period = TimeOfDay::of_hour(entry.hour);
            buckets
                .entry(period as u8)
                .or_insert_with(|| (period, Vec::new()))
                .1
                .push(f64::from(entry.mood));
        }
        buckets
            .into_values()
            .map(|(period, moods)| TimeOfDayMood {
                period,
                average_mood: average(&moods),
                count: moods.len() as u32,
            })
            .collect()
    }

    fn compute_streaks(&self) -> Vec<MoodStreak> {
        let mut sorted: Vec<&MoodEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.at);

        let mut streaks = Vec::new();
        let mut run: Vec<&MoodEntry> = Vec::new();
        for entry in sorted {
            let broken = run
                .last()
                .is_some_and(|prev| day_difference(entry.day, prev.day) > 1);
            if broken {
                Self::close_run(&run, &mut streaks);
                run.clear();
            }
            run.push(entry);
        }
        Self::close_run(&run, &mut streaks);
        streaks
    }

    fn close_run(run: &[&MoodEntry], streaks: &mut Vec<MoodStreak>) {
        if run.len() < MIN_STREAK_LEN {
            return;
        }
        let moods: Vec<f64> = run.iter().map(|e| f64::from(e.mood)).collect();
        let avg = average(&moods);
        let kind = if avg >= 4.0 {
            MoodStreakKind::Positive
        } else if avg >= 3.0 {
            MoodStreakKind::Neutral
        } else {
            MoodStreakKind::Improving
        };
        streaks.push(MoodStreak {
            start: run[0].day,
            end: run[run.len() - 1].day,
            length: run.len() as u32,
            average_mood: avg,
            kind,
        });
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn weekly_trend(&self) -> &[MoodDataPoint] {
        &self.weekly_trend
    }

    pub fn monthly_trend(&self) -> &[MoodDataPoint] {
        &self.monthly_trend
    }

    /// Per-ritual correlation, best average first.
    pub fn ritual_moods(&self) -> &[RitualMoodData] {
        &self.ritual_moods
    }

    pub fn time_of_day(&self) -> &[TimeOfDayMood] {
        &self.time_of_day
    }

    pub fn streaks(&self) -> &[MoodStreak] {
        &self.streaks
    }

    pub fn insights(&self) -> &[MoodInsight] {
        &self.insights
    }
}

impl Default for MoodAnalyticsEngine {
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
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn add(engine: &mut MoodAnalyticsEngine, name: &str, mood: u8, d: u32, hour: u32) {
        let at = Utc.with_ymd_and_hms(2026, 5, d, hour, 0, 0).unwrap();
        engine.add_entry("id", name, mood, None, at, day(d), hour);
    }

    #[test]
    fn trend_improving() {
        assert_eq!(
            calculate_trend(&[2.0, 2.0, 2.0, 5.0, 5.0, 5.0]),
            MoodTrend::Improving
        );
    }

    #[test]
    fn trend_declining() {
        assert_eq!(
            calculate_trend(&[5.0, 5.0, 5.0, 2.0, 2.0, 2.0]),
            MoodTrend::Declining
        );
    }

    #[test]
    fn trend_needs_three_samples() {
        assert_eq!(calculate_trend(&[1.0, 5.0]), MoodTrend::Stable);
    }

    #[test]
    fn trend_stable_within_epsilon() {
        assert_eq!(calculate_trend(&[3.0, 3.0, 3.2]), MoodTrend::Stable);
    }

    #[test]
    fn odd_count_gives_first_half_the_smaller_share() {
        // [1, 5, 5]: first half [1], second [5, 5] -> +4.0 -> improving.
        assert_eq!(calculate_trend(&[1.0, 5.0, 5.0]), MoodTrend::Improving);
    }

    #[test]
    fn streak_detection_groups_adjacent_days() {
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 5, 1, 9);
        add(&mut engine, "a", 4, 2, 9);
        add(&mut engine, "a", 5, 3, 9);
        // Gap: day 5 starts a new (too short) run.
        add(&mut engine, "a", 2, 5, 9);
        assert_eq!(engine.streaks().len(), 1);
        let streak = &engine.streaks()[0];
        assert_eq!(streak.start, day(1));
        assert_eq!(streak.end, day(3));
        assert_eq!(streak.length, 3);
        assert_eq!(streak.kind, MoodStreakKind::Positive);
    }

    #[test]
    fn same_day_entries_extend_a_run() {
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 3, 1, 9);
        add(&mut engine, "a", 3, 1, 15);
        add(&mut engine, "a", 3, 2, 9);
        assert_eq!(engine.streaks().len(), 1);
        assert_eq!(engine.streaks()[0].kind, MoodStreakKind::Neutral);
    }

    #[test]
    fn low_average_run_is_labelled_improving() {
        // The catch-all bucket, kept under its historical name.
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 2, 1, 9);
        add(&mut engine, "a", 2, 2, 9);
        add(&mut engine, "a", 2, 3, 9);
        assert_eq!(engine.streaks()[0].kind, MoodStreakKind::Improving);
    }

    #[test]
    fn window_points_bucket_by_day() {
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 4, 10, 9);
        add(&mut engine, "a", 2, 10, 20);
        add(&mut engine, "a", 5, 11, 9);
        let weekly = engine.weekly_trend();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].date, day(10));
        assert_eq!(weekly[0].average_mood, 3.0);
        assert_eq!(weekly[0].count, 2);
    }

    #[test]
    fn weekly_window_excludes_old_days() {
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 5, 1, 9);
        add(&mut engine, "a", 3, 10, 9);
        // Recompute as of day 10: day 1 is outside the 7-day window but
        // inside the 30-day one.
        assert_eq!(engine.weekly_trend().len(), 1);
        assert_eq!(engine.monthly_trend().len(), 2);
    }

    #[test]
    fn ritual_moods_sorted_best_first() {
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "Low", 2, 1, 9);
        add(&mut engine, "High", 5, 1, 9);
        let rituals = engine.ritual_moods();
        assert_eq!(rituals[0].ritual_name, "High");
        assert_eq!(rituals[1].ritual_name, "Low");
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::of_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::of_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::of_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::of_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::of_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::of_hour(3), TimeOfDay::Night);

        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 5, 1, 9);
        add(&mut engine, "a", 1, 1, 23);
        let buckets = engine.time_of_day();
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn persists_and_recomputes_on_load() {
        let store = MemoryStore::new();
        let mut engine = MoodAnalyticsEngine::new();
        add(&mut engine, "a", 4, 1, 9);
        add(&mut engine, "a", 4, 2, 9);
        add(&mut engine, "a", 4, 3, 9);
        engine.persist(&store);

        let reloaded = MoodAnalyticsEngine::load(&store, day(3));
        assert_eq!(reloaded.entries().len(), 3);
        assert_eq!(reloaded.streaks().len(), 1);
        assert!(!reloaded.weekly_trend().is_empty());
    }
}
