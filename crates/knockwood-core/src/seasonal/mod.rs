//! Seasonal events.
//!
//! Time-windowed events with their own challenges and unlockable special
//! rituals. Active/upcoming/past is a pure function of "now" and the event
//! bounds (inclusive on both ends), never persisted. Unlocks are monotonic:
//! a ritual unlocked during an event stays unlocked after the event ends,
//! but is only *usable* while its owning event is active.

mod catalog;

pub use catalog::events_for_year;

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::Reward;
use crate::events::Event;
use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// Gate in front of a special ritual. `EventProgress` is owned by this
/// engine; the other kinds are boolean predicates over externally supplied
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockRequirement {
    Level { level: u32 },
    Streak { days: u32 },
    Achievement { id: String },
    EventProgress { fraction: f64 },
    SocialShares { count: u32 },
}

/// External stats consulted by unlock checks. Missing data fails the check;
/// nothing unlocks on absence of evidence.
#[derive(Debug, Clone, Default)]
pub struct UnlockSnapshot {
    pub level: u32,
    pub streak: u32,
    pub achievements: HashSet<String>,
    pub share_count: u32,
}

/// Event-scoped ritual variant with an unlock gate and optional usage cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialRitual {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirement: UnlockRequirement,
    pub usage_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventChallengeKind {
    /// Any ritual completion counts.
    Rituals,
    /// Only completions of the event's own special rituals count.
    SpecialRituals,
}

/// One challenge inside a seasonal event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventChallenge {
    pub id: String,
    pub kind: EventChallengeKind,
    pub title: String,
    pub target: u32,
    pub reward: Reward,
}

/// A time-windowed event. Active iff `start <= today <= end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalEvent {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub special_rituals: Vec<SpecialRitual>,
    pub challenges: Vec<EventChallenge>,
    /// Granted once when every challenge of the event completes.
    pub rewards: Vec<Reward>,
}

impl SeasonalEvent {
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start <= today && today <= self.end
    }

    pub fn special_ritual(&self, ritual_id: &str) -> Option<&SpecialRitual> {
        self.special_rituals.iter().find(|r| r.id == ritual_id)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeasonalState {
    year: i32,
    challenge_progress: HashMap<String, u32>,
    completed_challenges: BTreeSet<String>,
    /// completedChallenges / totalChallenges per event, recomputed on every
    /// completion.
    event_progress: HashMap<String, f64>,
    /// Monotonic: survives event end and year rollover.
    unlocked_rituals: BTreeSet<String>,
    ritual_usage: HashMap<String, u32>,
    granted_event_rewards: BTreeSet<String>,
    badges: BTreeSet<String>,
    points_earned: u32,
}

/// Maintains the per-year event catalog and all event-scoped progress.
pub struct SeasonalEventEngine {
    events: Vec<SeasonalEvent>,
    state: SeasonalState,
}

impl SeasonalEventEngine {
    /// Fresh engine for a calendar year.
    pub fn new(year: i32) -> Self {
        Self {
            events: events_for_year(year),
            state: SeasonalState {
                year,
                ..SeasonalState::default()
            },
        }
    }

    /// Load persisted state. On a year rollover the per-event progress is
    /// reset for the new year's instances; the unlocked-ritual set and
    /// earned badges carry over.
    pub fn load(store: &dyn PersistentStore, year: i32) -> Self {
        let mut state: SeasonalState =
            storage::load_state(store, storage::keys::SEASONAL, STATE_VERSION);
        if state.year != year {
            state = SeasonalState {
                year,
                unlocked_rituals: state.unlocked_rituals,
                badges: state.badges,
                points_earned: state.points_earned,
                ..SeasonalState::default()
            };
        }
        Self {
            events: events_for_year(year),
            state,
        }
    }

    pub fn persist(&self, store: &dyn PersistentStore) {
        storage::save_state(store, storage::keys::SEASONAL, STATE_VERSION, &self.state);
    }

    // ── Classification ───────────────────────────────────────────────

    /// Events whose window contains `today`.
    pub fn current_events(&self, today: NaiveDate) -> Vec<&SeasonalEvent> {
        self.events.iter().filter(|e| e.is_active(today)).collect()
    }

    /// Events starting after `today`, soonest first.
    pub fn upcoming_events(&self, today: NaiveDate) -> Vec<&SeasonalEvent> {
        let mut upcoming: Vec<&SeasonalEvent> =
            self.events.iter().filter(|e| e.start > today).collect();
        upcoming.sort_by_key(|e| e.start);
        upcoming
    }

    /// Events already over, most recently ended first.
    pub fn past_events(&self, today: NaiveDate) -> Vec<&SeasonalEvent> {
        let mut past: Vec<&SeasonalEvent> =
            self.events.iter().filter(|e| e.end < today).collect();
        past.sort_by_key(|e| std::cmp::Reverse(e.end));
        past
    }

    // ── Progress ─────────────────────────────────────────────────────

    /// Feed one ritual completion into every currently-active event.
    ///
    /// `rituals`-kind challenges advance on any completion; `special_rituals`
    /// challenges only when `ritual_id` belongs to the event's special set.
    /// Challenge completion grants its reward exactly once, the event's
    /// progress fraction is recomputed, and event-progress unlock gates are
    /// re-checked against the fresh fraction.
    pub fn complete_ritual(
        &mut self,
        ritual_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
        snapshot: &UnlockSnapshot,
    ) -> Vec<Event> {
        let mut emitted = Vec::new();
        let state = &mut self.state;

        for event in self.events.iter().filter(|e| e.is_active(today)) {
            for challenge in &event.challenges {
                if state.completed_challenges.contains(&challenge.id) {
                    continue;
                }
                let matches = match challenge.kind {
                    EventChallengeKind::Rituals => true,
                    EventChallengeKind::SpecialRituals => event.special_ritual(ritual_id).is_some(),
                };
                if !matches {
                    continue;
                }
                let progress = state
                    .challenge_progress
                    .entry(challenge.id.clone())
                    .or_insert(0);
                *progress = (*progress + 1).min(challenge.target);
                debug_assert!(*progress <= challenge.target);
                if *progress >= challenge.target {
                    state.completed_challenges.insert(challenge.id.clone());
                    Self::grant(state, &challenge.reward);
                    emitted.push(Event::EventChallengeCompleted {
                        event_id: event.id.clone(),
                        challenge_id: challenge.id.clone(),
                        title: challenge.title.clone(),
                        reward: challenge.reward.clone(),
                        at: now,
                    });
                }
            }

            let fraction = Self::fraction_for(state, event);
            state.event_progress.insert(event.id.clone(), fraction);

            if fraction >= 1.0 && state.granted_event_rewards.insert(event.id.clone()) {
                for reward in &event.rewards {
                    Self::grant(state, reward);
                }
                emitted.push(Event::EventCompleted {
                    event_id: event.id.clone(),
                    rewards: event.rewards.clone(),
                    at: now,
                });
            }

            emitted.extend(Self::check_unlocks(state, event, snapshot, now));
        }
        emitted
    }

    /// Re-check unlock gates of all active events against a fresh snapshot.
    /// Level/streak/achievement/share requirements can be satisfied by
    /// activity outside this engine.
    pub fn refresh_unlocks(
        &mut self,
        today: NaiveDate,
        now: DateTime<Utc>,
        snapshot: &UnlockSnapshot,
    ) -> Vec<Event> {
        let state = &mut self.state;
        let mut emitted = Vec::new();
        for event in self.events.iter().filter(|e| e.is_active(today)) {
            emitted.extend(Self::check_unlocks(state, event, snapshot, now));
        }
        emitted
    }

    fn fraction_for(state: &SeasonalState, event: &SeasonalEvent) -> f64 {
        if event.challenges.is_empty() {
            return 0.0;
        }
        let completed = event
            .challenges
            .iter()
            .filter(|c| state.completed_challenges.contains(&c.id))
            .count();
        completed as f64 / event.challenges.len() as f64
    }

    fn check_unlocks(
        state: &mut SeasonalState,
        event: &SeasonalEvent,
        snapshot: &UnlockSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let fraction = state.event_progress.get(&event.id).copied().unwrap_or(0.0);
        let mut emitted = Vec::new();
        for ritual in &event.special_rituals {
            if state.unlocked_rituals.contains(&ritual.id) {
                continue;
            }
            let met = match &ritual.requirement {
                UnlockRequirement::Level { level } => snapshot.level >= *level,
                UnlockRequirement::Streak { days } => snapshot.streak >= *days,
                UnlockRequirement::Achievement { id } => snapshot.achievements.contains(id),
                UnlockRequirement::EventProgress { fraction: needed } => fraction >= *needed,
                UnlockRequirement::SocialShares { count } => snapshot.share_count >= *count,
            };
            if met {
                state.unlocked_rituals.insert(ritual.id.clone());
                emitted.push(Event::RitualUnlocked {
                    event_id: event.id.clone(),
                    ritual_id: ritual.id.clone(),
                    name: ritual.name.clone(),
                    at: now,
                });
            }
        }
        emitted
    }

    fn grant(state: &mut SeasonalState, reward: &Reward) {
        match reward {
            Reward::Points { amount } => state.points_earned += amount,
            Reward::Badge { name } => {
                state.badges.insert(name.clone());
            }
            // Wood styles live in the ritual catalog; the service applies
            // them from the emitted events.
            Reward::WoodStyle { .. } => {}
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Unlock state is monotonic and survives the owning event's end.
    pub fn is_ritual_unlocked(&self, ritual_id: &str) -> bool {
        self.state.unlocked_rituals.contains(ritual_id)
    }

    /// Special rituals usable right now: unlocked, owning event active,
    /// usage cap not exhausted.
    pub fn available_rituals(&self, today: NaiveDate) -> Vec<&SpecialRitual> {
        self.events
            .iter()
            .filter(|e| e.is_active(today))
            .flat_map(|e| e.special_rituals.iter())
            .filter(|r| self.state.unlocked_rituals.contains(&r.id))
            .filter(|r| self.usage_remaining(r))
            .collect()
    }

    fn usage_remaining(&self, ritual: &SpecialRitual) -> bool {
        match ritual.usage_limit {
            Some(limit) => {
                self.state
                    .ritual_usage
                    .get(&ritual.id)
                    .copied()
                    .unwrap_or(0)
                    < limit
            }
            None => true,
        }
    }

    /// Consume one usage of a special ritual. Returns false (and changes
    /// nothing) if the ritual is not currently usable.
    pub fn use_ritual(&mut self, ritual_id: &str, today: NaiveDate) -> bool {
        let usable = self
            .available_rituals(today)
            .iter()
            .any(|r| r.id == ritual_id);
        if !usable {
            return false;
        }
        *self
            .state
            .ritual_usage
            .entry(ritual_id.to_string())
            .or_insert(0) += 1;
        true
    }

    /// Find a special ritual across all of this year's events.
    pub fn find_ritual(&self, ritual_id: &str) -> Option<(&SeasonalEvent, &SpecialRitual)> {
        self.events.iter().find_map(|e| {
            e.special_ritual(ritual_id).map(|r| (e, r))
        })
    }

    /// completedChallenges / totalChallenges for an event.
    pub fn event_progress(&self, event_id: &str) -> f64 {
        self.state
            .event_progress
            .get(event_id)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn events(&self) -> &[SeasonalEvent] {
        &self.events
    }

    pub fn badges(&self) -> impl Iterator<Item = &str> {
        self.state.badges.iter().map(String::as_str)
    }

    pub fn points_earned(&self) -> u32 {
        self.state.points_earned
    }
}
