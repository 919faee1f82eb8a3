//! Social sharing.
//!
//! Thin glue: builds postable share payloads from local progress and keeps
//! the persisted share count that achievement and seasonal unlock checks
//! read. Actual delivery to any network is a collaborator's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// What is being shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShareKind {
    Streak { days: u32 },
    Achievement { title: String },
    Challenge { title: String },
}

/// A ready-to-post share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SocialState {
    share_count: u32,
}

/// Builds share payloads and counts shares.
pub struct SocialSharingManager {
    state: SocialState,
}

impl SocialSharingManager {
    pub fn new() -> Self {
        Self {
            state: SocialState::default(),
        }
    }

    pub fn load(store: &dyn PersistentStore) -> Self {
        Self {
            state: storage::load_state(store, storage::keys::SOCIAL, STATE_VERSION),
        }
    }

    pub fn persist(&self, store: &dyn PersistentStore) {
        storage::save_state(store, storage::keys::SOCIAL, STATE_VERSION, &self.state);
    }

    /// Build a payload for the given subject and count the share.
    pub fn share(&mut self, kind: ShareKind, now: DateTime<Utc>) -> SharePayload {
        self.state.share_count += 1;
        let (title, text) = match &kind {
            ShareKind::Streak { days } => (
                format!("{days}-day knock streak"),
                format!("I've touched wood {days} days in a row. The luck holds."),
            ),
            ShareKind::Achievement { title } => (
                format!("Unlocked: {title}"),
                format!("Just earned \"{title}\" in Knockwood."),
            ),
            ShareKind::Challenge { title } => (
                format!("Challenge done: {title}"),
                format!("Knocked out today's \"{title}\" challenge."),
            ),
        };
        SharePayload {
            title,
            text,
            hashtags: vec!["#knockwood".to_string(), "#touchwood".to_string()],
            created_at: now,
        }
    }

    /// Total shares so far. Read by achievement and seasonal unlock checks.
    pub fn share_count(&self) -> u32 {
        self.state.share_count
    }
}

impl Default for SocialSharingManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn sharing_increments_count() {
        let mut manager = SocialSharingManager::new();
        assert_eq!(manager.share_count(), 0);
        let payload = manager.share(ShareKind::Streak { days: 7 }, Utc::now());
        assert!(payload.title.contains('7'));
        assert!(!payload.hashtags.is_empty());
        assert_eq!(manager.share_count(), 1);
    }

    #[test]
    fn count_survives_reload() {
        let store = MemoryStore::new();
        let mut manager = SocialSharingManager::new();
        manager.share(
            ShareKind::Achievement {
                title: "First Knock".to_string(),
            },
            Utc::now(),
        );
        manager.share(
            ShareKind::Challenge {
                title: "Mix It Up".to_string(),
            },
            Utc::now(),
        );
        manager.persist(&store);
        assert_eq!(SocialSharingManager::load(&store).share_count(), 2);
    }
}
