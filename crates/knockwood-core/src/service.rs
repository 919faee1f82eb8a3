//! Habit service: the composition root.
//!
//! Owns one instance of every engine and the data flow between them. A
//! ritual completion is the central fact: it goes to the progress tracker
//! (streak/today-count), then the daily challenges, then achievement
//! re-evaluation, then the seasonal events, then the mood log. Each engine
//! persists its own slice independently; mutation is synchronous and the
//! persist step degrades rather than blocks.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::achievement::AchievementEngine;
use crate::analytics::MoodAnalyticsEngine;
use crate::catalog::{RitualCatalog, RitualCategory};
use crate::challenge::{ChallengeEngine, ChallengeType, Reward};
use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::events::{Event, NotificationSink};
use crate::progress::{AggregateStats, ProgressTracker, StreakChange};
use crate::seasonal::{SeasonalEventEngine, UnlockSnapshot};
use crate::social::{ShareKind, SharePayload, SocialSharingManager};
use crate::storage::{Config, PersistentStore};

/// All engines wired together over one store and one clock.
///
/// Constructed once at process start; single-writer -- nothing here is
/// shareable across threads and nothing needs to be.
pub struct HabitService<S: PersistentStore> {
    clock: Box<dyn Clock>,
    store: S,
    config: Config,
    catalog: RitualCatalog,
    tracker: ProgressTracker,
    challenges: ChallengeEngine,
    achievements: AchievementEngine,
    seasonal: SeasonalEventEngine,
    analytics: MoodAnalyticsEngine,
    social: SocialSharingManager,
    sink: Option<Box<dyn NotificationSink>>,
}

impl<S: PersistentStore> HabitService<S> {
    /// Load every engine's state from the store.
    pub fn new(clock: Box<dyn Clock>, store: S, config: Config) -> Self {
        let today = clock.today();
        Self {
            catalog: RitualCatalog::load(&store),
            tracker: ProgressTracker::load(&store),
            challenges: ChallengeEngine::load(&store),
            achievements: AchievementEngine::load(&store),
            seasonal: SeasonalEventEngine::load(&store, today.year()),
            analytics: MoodAnalyticsEngine::load(&store, today),
            social: SocialSharingManager::load(&store),
            clock,
            store,
            config,
            sink: None,
        }
    }

    /// Attach a notification consumer. Emitted events are still returned
    /// from each mutating call; the sink is for push-style collaborators.
    pub fn set_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sink = Some(sink);
    }

    /// Record one ritual performance and run the full downstream flow.
    ///
    /// # Errors
    /// Rejects moods outside 1..=5, ids that match neither the catalog nor
    /// any seasonal special ritual, and special rituals that are not
    /// currently usable (locked, event over, or usage cap reached).
    pub fn record_completion(
        &mut self,
        ritual_id: &str,
        mood: Option<u8>,
        note: Option<String>,
    ) -> Result<Vec<Event>> {
        if let Some(m) = mood {
            if !(1..=5).contains(&m) {
                return Err(ValidationError::MoodOutOfRange(m).into());
            }
        }

        let now = self.clock.now();
        let today = self.clock.day_of(now);
        let hour = self.clock.hour_of(now);

        let (category, ritual_name, is_special) = match self.catalog.get(ritual_id) {
            Some(ritual) => (ritual.category, ritual.name.clone(), false),
            None => match self.seasonal.find_ritual(ritual_id) {
                Some((_, ritual)) => (RitualCategory::Wood, ritual.name.clone(), true),
                None => return Err(ValidationError::UnknownRitual(ritual_id.to_string()).into()),
            },
        };
        if is_special && !self.seasonal.use_ritual(ritual_id, today) {
            return Err(ValidationError::InvalidValue {
                field: "ritual_id".to_string(),
                message: format!("special ritual '{ritual_id}' is not currently usable"),
            }
            .into());
        }

        let mut emitted = Vec::new();

        if self.challenges.refresh_daily(today, self.config.daily_draw_bounds()) {
            emitted.push(Event::DailyChallengesRefreshed {
                date: today,
                count: self.challenges.active().len(),
                at: now,
            });
        }

        let (completion, change) =
            self.tracker
                .record(ritual_id, category, mood, note.clone(), now, today);
        emitted.push(Event::CompletionRecorded {
            event_id: completion.id,
            ritual_id: ritual_id.to_string(),
            mood,
            at: now,
        });

        if let StreakChange::Extended(days) = change {
            if self.config.streaks.milestones.contains(&days) {
                emitted.push(Event::StreakMilestone {
                    days,
                    best: self.tracker.streak().best,
                    at: now,
                });
            }
        }

        // Daily challenge progress, one update per rule that applies.
        let mut completed = Vec::new();
        completed.extend(self.challenges.update_progress(ChallengeType::Rituals, 1, now));
        if matches!(change, StreakChange::Extended(_)) {
            completed.extend(self.challenges.update_progress(ChallengeType::Streak, 1, now));
        }
        if let Some(m) = mood {
            completed.extend(self.challenges.update_mood_progress(m, now));
        }
        let distinct = self.tracker.distinct_rituals_on(today).len() as u32;
        completed.extend(self.challenges.update_variety_progress(distinct, now));
        completed.extend(self.challenges.update_time_progress(hour, now));
        for challenge in completed {
            self.apply_catalog_reward(&challenge.reward);
            emitted.push(Event::ChallengeCompleted {
                challenge_id: challenge.id,
                challenge_type: challenge.challenge_type,
                title: challenge.title,
                reward: challenge.reward,
                at: now,
            });
        }

        emitted.extend(self.evaluate_achievements(now, today));

        let snapshot = self.unlock_snapshot();
        let seasonal_events = self.seasonal.complete_ritual(ritual_id, today, now, &snapshot);
        for event in &seasonal_events {
            match event {
                Event::EventChallengeCompleted { reward, .. } => {
                    self.apply_catalog_reward(reward);
                }
                Event::EventCompleted { rewards, .. } => {
                    for reward in rewards {
                        self.apply_catalog_reward(reward);
                    }
                }
                _ => {}
            }
        }
        emitted.extend(seasonal_events);

        if let Some(m) = mood {
            self.analytics
                .add_entry(ritual_id, &ritual_name, m, note, now, today, hour);
        }

        self.persist_all();
        self.deliver(&emitted);
        Ok(emitted)
    }

    /// Share progress: builds the payload, counts the share and re-runs the
    /// checks that depend on the share count.
    pub fn share(&mut self, kind: ShareKind) -> (SharePayload, Vec<Event>) {
        let now = self.clock.now();
        let today = self.clock.day_of(now);
        let payload = self.social.share(kind, now);

        let mut emitted = self.evaluate_achievements(now, today);
        let snapshot = self.unlock_snapshot();
        emitted.extend(self.seasonal.refresh_unlocks(today, now, &snapshot));

        self.persist_all();
        self.deliver(&emitted);
        (payload, emitted)
    }

    /// Add a user-defined ritual and re-run the checks that depend on the
    /// custom-ritual count. Returns the new ritual's id.
    pub fn add_custom_ritual(
        &mut self,
        name: &str,
        category: RitualCategory,
        description: &str,
    ) -> Result<(String, Vec<Event>)> {
        let id = self.catalog.add_custom(name, category, description)?.id.clone();
        let now = self.clock.now();
        let today = self.clock.day_of(now);
        let emitted = self.evaluate_achievements(now, today);
        self.persist_all();
        self.deliver(&emitted);
        Ok((id, emitted))
    }

    /// Bring day-scoped state up to date without recording anything:
    /// refreshes the daily challenge set across a day boundary and re-checks
    /// seasonal unlock gates.
    pub fn refresh(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let today = self.clock.day_of(now);
        let mut emitted = Vec::new();
        if self.challenges.refresh_daily(today, self.config.daily_draw_bounds()) {
            emitted.push(Event::DailyChallengesRefreshed {
                date: today,
                count: self.challenges.active().len(),
                at: now,
            });
        }
        let snapshot = self.unlock_snapshot();
        emitted.extend(self.seasonal.refresh_unlocks(today, now, &snapshot));
        self.persist_all();
        self.deliver(&emitted);
        emitted
    }

    /// Persist everything. Must run before process teardown; safe to call
    /// any time.
    pub fn flush(&mut self) {
        self.persist_all();
    }

    /// Flush and hand the store back.
    pub fn into_store(mut self) -> S {
        self.persist_all();
        self.store
    }

    fn evaluate_achievements(&mut self, now: DateTime<Utc>, today: NaiveDate) -> Vec<Event> {
        let stats = self.stats_snapshot(now, today);
        self.achievements
            .evaluate(&stats, now)
            .into_iter()
            .map(|achievement| Event::AchievementUnlocked {
                achievement_id: achievement.id,
                title: achievement.title,
                points: achievement.points,
                total_points: self.achievements.total_points(),
                at: now,
            })
            .collect()
    }

    fn stats_snapshot(&self, now: DateTime<Utc>, today: NaiveDate) -> AggregateStats {
        self.tracker.aggregate_stats(
            now,
            today,
            self.social.share_count(),
            self.catalog.custom_count() as u32,
        )
    }

    fn unlock_snapshot(&self) -> UnlockSnapshot {
        UnlockSnapshot {
            level: self.achievements.level(),
            streak: self.tracker.streak().current,
            achievements: self.achievements.unlocked_ids().map(String::from).collect(),
            share_count: self.social.share_count(),
        }
    }

    fn apply_catalog_reward(&mut self, reward: &Reward) {
        if let Reward::WoodStyle { style_id } = reward {
            self.catalog.unlock_style(style_id);
        }
    }

    fn persist_all(&mut self) {
        self.tracker.persist(&self.store);
        self.challenges.persist(&self.store);
        self.achievements.persist(&self.store);
        self.seasonal.persist(&self.store);
        self.analytics.persist(&self.store);
        self.social.persist(&self.store);
        self.catalog.persist(&self.store);
    }

    /// Push events into the attached sink, honoring notification settings.
    fn deliver(&mut self, events: &[Event]) {
        if !self.config.notifications.enabled {
            return;
        }
        if let Some(sink) = &mut self.sink {
            for event in events {
                let wanted = match event {
                    Event::StreakMilestone { .. } => self.config.notifications.streak_milestones,
                    Event::ChallengeCompleted { .. } | Event::EventChallengeCompleted { .. } => {
                        self.config.notifications.challenge_completions
                    }
                    _ => true,
                };
                if wanted {
                    sink.deliver(event);
                }
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn catalog(&self) -> &RitualCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn challenges(&self) -> &ChallengeEngine {
        &self.challenges
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn seasonal(&self) -> &SeasonalEventEngine {
        &self.seasonal
    }

    pub fn analytics(&self) -> &MoodAnalyticsEngine {
        &self.analytics
    }

    pub fn social(&self) -> &SocialSharingManager {
        &self.social
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;

    fn service_on(year: i32, month: u32, day: u32) -> HabitService<MemoryStore> {
        let clock = FixedClock::on_day(year, month, day);
        HabitService::new(Box::new(clock), MemoryStore::new(), Config::default())
    }

    fn service_with_clock(clock: FixedClock) -> HabitService<MemoryStore> {
        HabitService::new(Box::new(clock), MemoryStore::new(), Config::default())
    }

    #[test]
    fn first_completion_flows_through_every_engine() {
        let mut service = service_on(2026, 5, 1);
        let events = service
            .record_completion("touch-wood", Some(4), None)
            .unwrap();

        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CompletionRecorded { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AchievementUnlocked { achievement_id, .. } if achievement_id == "first-knock"
        )));
        assert_eq!(service.progress().lifetime_count(), 1);
        assert_eq!(service.progress().streak().current, 1);
        assert_eq!(service.analytics().entries().len(), 1);
        assert!(!service.challenges().active().is_empty());
    }

    #[test]
    fn unknown_ritual_is_rejected() {
        let mut service = service_on(2026, 5, 1);
        assert!(service.record_completion("no-such", None, None).is_err());
        assert_eq!(service.progress().lifetime_count(), 0);
    }

    #[test]
    fn mood_out_of_range_is_rejected() {
        let mut service = service_on(2026, 5, 1);
        assert!(service.record_completion("touch-wood", Some(6), None).is_err());
        assert!(service.record_completion("touch-wood", Some(0), None).is_err());
    }

    #[test]
    fn unrated_completions_skip_the_mood_log() {
        let mut service = service_on(2026, 5, 1);
        service.record_completion("touch-wood", None, None).unwrap();
        assert!(service.analytics().entries().is_empty());
    }

    #[test]
    fn streak_milestone_fires_at_three_days() {
        let clock = FixedClock::on_day(2026, 5, 1);
        let mut service = service_with_clock(clock.clone());
        let mut milestone_seen = false;
        for day in 0..3 {
            if day > 0 {
                clock.advance_days(1);
            }
            let events = service.record_completion("touch-wood", None, None).unwrap();
            milestone_seen |= events
                .iter()
                .any(|e| matches!(e, Event::StreakMilestone { days: 3, .. }));
        }
        assert!(milestone_seen);
        assert_eq!(service.progress().streak().current, 3);
    }

    #[test]
    fn day_boundary_refreshes_challenges() {
        let clock = FixedClock::on_day(2026, 5, 1);
        let mut service = service_with_clock(clock.clone());
        service.record_completion("touch-wood", None, None).unwrap();
        let first_ids: Vec<_> = service.challenges().active().iter().map(|c| c.id).collect();

        // Same day: no refresh event.
        let events = service.record_completion("touch-wood", None, None).unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::DailyChallengesRefreshed { .. })));

        clock.advance_days(1);
        let events = service.record_completion("touch-wood", None, None).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::DailyChallengesRefreshed { .. })));
        let second_ids: Vec<_> = service.challenges().active().iter().map(|c| c.id).collect();
        assert!(second_ids.iter().all(|id| !first_ids.contains(id)));
    }

    #[test]
    fn shares_feed_achievements() {
        let mut service = service_on(2026, 5, 1);
        let mut unlocked = false;
        for _ in 0..5 {
            let (_, events) = service.share(ShareKind::Streak { days: 1 });
            unlocked |= events.iter().any(|e| matches!(
                e,
                Event::AchievementUnlocked { achievement_id, .. } if achievement_id == "town-crier"
            ));
        }
        assert!(unlocked);
        assert_eq!(service.social().share_count(), 5);
    }

    #[test]
    fn custom_ritual_unlocks_ritual_smith() {
        let mut service = service_on(2026, 5, 1);
        let (id, events) = service
            .add_custom_ritual("Spin the ring", RitualCategory::Fortune, "")
            .unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AchievementUnlocked { achievement_id, .. } if achievement_id == "ritual-smith"
        )));
        // The new ritual is immediately performable.
        assert!(service.record_completion(&id, None, None).is_ok());
    }

    #[test]
    fn locked_special_ritual_is_not_performable() {
        // Mid-spring event, nothing unlocked yet.
        let mut service = service_on(2026, 3, 25);
        assert!(service
            .record_completion("blossom-knock", None, None)
            .is_err());
    }

    #[test]
    fn special_ritual_flow_during_event() {
        let mut service = service_on(2026, 3, 25);
        // Grind the event's rituals challenge to 100% of its target to push
        // event progress to 0.5 and open blossom-knock.
        for _ in 0..10 {
            service.record_completion("touch-wood", None, None).unwrap();
        }
        assert!(service.seasonal().is_ritual_unlocked("blossom-knock"));
        let events = service
            .record_completion("blossom-knock", None, None)
            .unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CompletionRecorded { .. })));
        assert_eq!(service.progress().lifetime_count(), 11);
    }

    #[test]
    fn event_wood_style_reward_reaches_catalog() {
        let mut service = service_on(2026, 3, 25);
        for _ in 0..10 {
            service.record_completion("touch-wood", None, None).unwrap();
        }
        // Finish the special challenge too: event complete, birch unlocks.
        for _ in 0..3 {
            service.record_completion("blossom-knock", None, None).unwrap();
        }
        assert!(service
            .catalog()
            .styles()
            .iter()
            .find(|s| s.id == "birch")
            .unwrap()
            .unlocked);
    }

    #[test]
    fn state_survives_service_restart() {
        let mut service = service_on(2026, 5, 1);
        service.record_completion("touch-wood", Some(5), None).unwrap();
        service.record_completion("lucky-coin", None, None).unwrap();
        let store = service.into_store();

        let service = HabitService::new(
            Box::new(FixedClock::on_day(2026, 5, 1)),
            store,
            Config::default(),
        );
        assert_eq!(service.progress().lifetime_count(), 2);
        assert_eq!(service.progress().today_count(service.today()), 2);
        assert_eq!(service.analytics().entries().len(), 1);
        assert!(service
            .achievements()
            .achievements()
            .iter()
            .find(|a| a.id == "first-knock")
            .unwrap()
            .unlocked);
    }

    #[test]
    fn sink_receives_emitted_events() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct SharedSink(Rc<RefCell<Vec<Event>>>);
        impl NotificationSink for SharedSink {
            fn deliver(&mut self, event: &Event) {
                self.0.borrow_mut().push(event.clone());
            }
        }

        let delivered = Rc::new(RefCell::new(Vec::new()));
        let mut service = service_on(2026, 5, 1);
        service.set_notification_sink(Box::new(SharedSink(Rc::clone(&delivered))));
        let events = service.record_completion("touch-wood", None, None).unwrap();
        assert!(!events.is_empty());
        assert_eq!(delivered.borrow().len(), events.len());

        // Disabled notifications mute the sink but not the return value.
        let mut muted = HabitService::new(
            Box::new(FixedClock::on_day(2026, 5, 1)),
            MemoryStore::new(),
            Config {
                notifications: crate::storage::NotificationsConfig {
                    enabled: false,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        muted.set_notification_sink(Box::new(SharedSink(Rc::clone(&delivered))));
        let before = delivered.borrow().len();
        let events = muted.record_completion("touch-wood", None, None).unwrap();
        assert!(!events.is_empty());
        assert_eq!(delivered.borrow().len(), before);
    }
}
