use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::challenge::{ChallengeType, Reward};

/// Every state change in the engines produces an Event.
/// The presentation layer polls for events or receives them via a
/// [`NotificationSink`]; nothing in the core renders notifications itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CompletionRecorded {
        event_id: Uuid,
        ritual_id: String,
        mood: Option<u8>,
        at: DateTime<Utc>,
    },
    /// Global streak grew and crossed a configured milestone.
    StreakMilestone {
        days: u32,
        best: u32,
        at: DateTime<Utc>,
    },
    /// A new set of daily challenges replaced the previous day's.
    DailyChallengesRefreshed {
        date: NaiveDate,
        count: usize,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        challenge_id: Uuid,
        challenge_type: ChallengeType,
        title: String,
        reward: Reward,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_id: String,
        title: String,
        points: u32,
        total_points: u32,
        at: DateTime<Utc>,
    },
    /// A challenge inside a seasonal event reached its target.
    EventChallengeCompleted {
        event_id: String,
        challenge_id: String,
        title: String,
        reward: Reward,
        at: DateTime<Utc>,
    },
    /// All challenges of a seasonal event are complete.
    EventCompleted {
        event_id: String,
        rewards: Vec<Reward>,
        at: DateTime<Utc>,
    },
    /// A special ritual's unlock requirement was met.
    RitualUnlocked {
        event_id: String,
        ritual_id: String,
        name: String,
        at: DateTime<Utc>,
    },
}

/// Consumer of emitted events. Implemented by the notification layer,
/// which schedules/renders user-visible notifications from them.
pub trait NotificationSink {
    fn deliver(&mut self, event: &Event);
}

/// Sink that collects events into a Vec. Useful for tests and for callers
/// that want to batch-poll.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Vec<Event>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all collected events.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl NotificationSink for CollectingSink {
    fn deliver(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::StreakMilestone {
            days: 7,
            best: 7,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"StreakMilestone\""));
        assert!(json.contains("\"days\":7"));
    }

    #[test]
    fn collecting_sink_drains() {
        let mut sink = CollectingSink::new();
        sink.deliver(&Event::StreakMilestone {
            days: 3,
            best: 5,
            at: Utc::now(),
        });
        assert_eq!(sink.take().len(), 1);
        assert!(sink.take().is_empty());
    }
}
