//! Ritual catalog: built-in rituals, user-defined rituals and unlockable
//! wood styles.
//!
//! The catalog is data, not logic -- engines only look rituals up by id and
//! count custom entries. Custom rituals and unlocked styles are the only
//! persisted parts; built-ins are reconstructed on load.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::storage::{self, PersistentStore};

const STATE_VERSION: u32 = 1;

/// Broad grouping of rituals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RitualCategory {
    Wood,
    Protection,
    Fortune,
    Cleansing,
}

/// A performable ritual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ritual {
    pub id: String,
    pub name: String,
    pub category: RitualCategory,
    pub description: String,
    /// True for user-defined rituals.
    pub custom: bool,
}

/// A wood texture the touch surface can take. Locked styles are granted as
/// challenge or event rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WoodStyle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unlocked: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogState {
    custom_rituals: Vec<Ritual>,
    unlocked_styles: Vec<String>,
}

/// Built-in and user-defined rituals plus wood styles.
pub struct RitualCatalog {
    builtin: Vec<Ritual>,
    custom: Vec<Ritual>,
    styles: Vec<WoodStyle>,
}

impl RitualCatalog {
    /// Catalog with only the built-in content.
    pub fn builtin() -> Self {
        Self {
            builtin: builtin_rituals(),
            custom: Vec::new(),
            styles: builtin_styles(),
        }
    }

    /// Load the catalog, merging persisted custom rituals and style unlocks
    /// over the built-in set.
    pub fn load(store: &dyn PersistentStore) -> Self {
        let state: CatalogState = storage::load_state(store, storage::keys::CATALOG, STATE_VERSION);
        let mut catalog = Self::builtin();
        catalog.custom = state.custom_rituals;
        for id in &state.unlocked_styles {
            if let Some(style) = catalog.styles.iter_mut().find(|s| &s.id == id) {
                style.unlocked = true;
            }
        }
        catalog
    }

    /// Persist custom rituals and unlocked style ids.
    pub fn persist(&self, store: &dyn PersistentStore) {
        let state = CatalogState {
            custom_rituals: self.custom.clone(),
            unlocked_styles: self
                .styles
                .iter()
                .filter(|s| s.unlocked)
                .map(|s| s.id.clone())
                .collect(),
        };
        storage::save_state(store, storage::keys::CATALOG, STATE_VERSION, &state);
    }

    /// Look a ritual up by id, built-in or custom.
    pub fn get(&self, id: &str) -> Option<&Ritual> {
        self.builtin
            .iter()
            .chain(self.custom.iter())
            .find(|r| r.id == id)
    }

    /// All rituals, built-ins first.
    pub fn rituals(&self) -> impl Iterator<Item = &Ritual> {
        self.builtin.iter().chain(self.custom.iter())
    }

    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }

    /// Add a user-defined ritual.
    ///
    /// # Errors
    /// Returns an error if the name is empty or whitespace.
    pub fn add_custom(
        &mut self,
        name: &str,
        category: RitualCategory,
        description: &str,
    ) -> Result<&Ritual, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".to_string(),
                message: "ritual name must not be empty".to_string(),
            });
        }
        let ritual = Ritual {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.to_string(),
            category,
            description: description.trim().to_string(),
            custom: true,
        };
        self.custom.push(ritual);
        Ok(self.custom.last().expect("just pushed"))
    }

    pub fn styles(&self) -> &[WoodStyle] {
        &self.styles
    }

    /// Unlock a wood style by id. Returns true if the style exists and was
    /// previously locked.
    pub fn unlock_style(&mut self, id: &str) -> bool {
        match self.styles.iter_mut().find(|s| s.id == id) {
            Some(style) if !style.unlocked => {
                style.unlocked = true;
                true
            }
            _ => false,
        }
    }
}

fn builtin_rituals() -> Vec<Ritual> {
    fn ritual(id: &str, name: &str, category: RitualCategory, description: &str) -> Ritual {
        Ritual {
            id: id.to_string(),
            name: name.to_string(),
            category,
            description: description.to_string(),
            custom: false,
        }
    }

    vec![
        ritual(
            "knock-three-times",
            "Knock Three Times",
            RitualCategory::Wood,
            "Three quick knocks on the nearest wooden surface.",
        ),
        ritual(
            "touch-wood",
            "Touch Wood",
            RitualCategory::Wood,
            "Rest your palm on wood and take a breath.",
        ),
        ritual(
            "morning-knock",
            "Morning Knock",
            RitualCategory::Wood,
            "Start the day with a single deliberate knock.",
        ),
        ritual(
            "salt-over-shoulder",
            "Salt Over the Shoulder",
            RitualCategory::Protection,
            "A pinch of salt over the left shoulder.",
        ),
        ritual(
            "iron-touch",
            "Touch Iron",
            RitualCategory::Protection,
            "Ground a worry by touching something iron.",
        ),
        ritual(
            "lucky-coin",
            "Flip the Lucky Coin",
            RitualCategory::Fortune,
            "Flip a coin and pocket it heads-up.",
        ),
        ritual(
            "four-leaf-hunt",
            "Four-Leaf Hunt",
            RitualCategory::Fortune,
            "One minute looking for a four-leaf clover, or picturing one.",
        ),
        ritual(
            "threshold-sweep",
            "Threshold Sweep",
            RitualCategory::Cleansing,
            "Sweep the doorway, outward.",
        ),
        ritual(
            "open-window",
            "Let the Air Change",
            RitualCategory::Cleansing,
            "Open a window for a minute and let the room reset.",
        ),
    ]
}

fn builtin_styles() -> Vec<WoodStyle> {
    fn style(id: &str, name: &str, description: &str, unlocked: bool) -> WoodStyle {
        WoodStyle {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            unlocked,
        }
    }

    vec![
        style("oak", "Oak", "The default grain.", true),
        style("birch", "Birch", "Pale and calm.", false),
        style("walnut", "Walnut", "Dark, dense, serious.", false),
        style("driftwood", "Driftwood", "Weathered by better stories.", false),
        style("ebony", "Ebony", "For long streaks only.", false),
    ]
}
