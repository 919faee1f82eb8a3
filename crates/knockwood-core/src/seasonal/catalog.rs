//! Built-in seasonal event definitions.
//!
//! Events are constructed once per calendar year from fixed month/day
//! rules. Ids are year-less; the engine's state carries the year.

use chrono::NaiveDate;

use super::{EventChallenge, EventChallengeKind, SeasonalEvent, SpecialRitual, UnlockRequirement};
use crate::challenge::Reward;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid catalog date")
}

fn ritual(
    id: &str,
    name: &str,
    description: &str,
    requirement: UnlockRequirement,
    usage_limit: Option<u32>,
) -> SpecialRitual {
    SpecialRitual {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        requirement,
        usage_limit,
    }
}

fn challenge(
    event_id: &str,
    slug: &str,
    kind: EventChallengeKind,
    title: &str,
    target: u32,
    reward: Reward,
) -> EventChallenge {
    EventChallenge {
        id: format!("{event_id}-{slug}"),
        kind,
        title: title.to_string(),
        target,
        reward,
    }
}

/// The fixed event calendar for one year.
pub fn events_for_year(year: i32) -> Vec<SeasonalEvent> {
    vec![
        SeasonalEvent {
            id: "spring-renewal".to_string(),
            name: "Spring Renewal".to_string(),
            start: date(year, 3, 20),
            end: date(year, 4, 2),
            special_rituals: vec![
                ritual(
                    "blossom-knock",
                    "Blossom Knock",
                    "A knock on a budding branch.",
                    UnlockRequirement::EventProgress { fraction: 0.5 },
                    None,
                ),
                ritual(
                    "seedling-charm",
                    "Seedling Charm",
                    "Plant something small, wish something big.",
                    UnlockRequirement::Level { level: 3 },
                    None,
                ),
            ],
            challenges: vec![
                challenge(
                    "spring-renewal",
                    "rituals",
                    EventChallengeKind::Rituals,
                    "Spring Footing",
                    10,
                    Reward::Points { amount: 50 },
                ),
                challenge(
                    "spring-renewal",
                    "special",
                    EventChallengeKind::SpecialRituals,
                    "New Growth",
                    3,
                    Reward::Points { amount: 80 },
                ),
            ],
            rewards: vec![
                Reward::WoodStyle {
                    style_id: "birch".to_string(),
                },
                Reward::Points { amount: 100 },
            ],
        },
        SeasonalEvent {
            id: "midsummer-bonfire".to_string(),
            name: "Midsummer Bonfire".to_string(),
            start: date(year, 6, 19),
            end: date(year, 6, 26),
            special_rituals: vec![
                ritual(
                    "bonfire-leap",
                    "Bonfire Leap",
                    "Clear the flames, leave the bad luck behind.",
                    UnlockRequirement::Streak { days: 7 },
                    None,
                ),
                ritual(
                    "ember-wish",
                    "Ember Wish",
                    "One wish per ember, three embers per summer.",
                    UnlockRequirement::EventProgress { fraction: 1.0 },
                    Some(3),
                ),
            ],
            challenges: vec![
                challenge(
                    "midsummer-bonfire",
                    "rituals",
                    EventChallengeKind::Rituals,
                    "Keep the Fire Fed",
                    8,
                    Reward::Points { amount: 60 },
                ),
                challenge(
                    "midsummer-bonfire",
                    "special",
                    EventChallengeKind::SpecialRituals,
                    "Dance the Short Night",
                    2,
                    Reward::Points { amount: 70 },
                ),
            ],
            rewards: vec![
                Reward::Points { amount: 120 },
                Reward::Badge {
                    name: "Firekeeper".to_string(),
                },
            ],
        },
        SeasonalEvent {
            id: "harvest-moon".to_string(),
            name: "Harvest Moon".to_string(),
            start: date(year, 9, 20),
            end: date(year, 10, 1),
            special_rituals: vec![
                ritual(
                    "gleaners-knock",
                    "Gleaner's Knock",
                    "Tap the table before the last helping.",
                    UnlockRequirement::SocialShares { count: 3 },
                    None,
                ),
                ritual(
                    "moonlit-touch",
                    "Moonlit Touch",
                    "Wood touched under a full moon counts double.",
                    UnlockRequirement::EventProgress { fraction: 0.5 },
                    Some(5),
                ),
            ],
            challenges: vec![
                challenge(
                    "harvest-moon",
                    "rituals",
                    EventChallengeKind::Rituals,
                    "Bring In the Sheaves",
                    12,
                    Reward::Points { amount: 60 },
                ),
                challenge(
                    "harvest-moon",
                    "special",
                    EventChallengeKind::SpecialRituals,
                    "Moon Work",
                    4,
                    Reward::Points { amount: 90 },
                ),
            ],
            rewards: vec![
                Reward::WoodStyle {
                    style_id: "driftwood".to_string(),
                },
                Reward::Points { amount: 100 },
            ],
        },
        SeasonalEvent {
            id: "winter-solstice".to_string(),
            name: "Winter Solstice".to_string(),
            start: date(year, 12, 18),
            end: date(year, 12, 31),
            special_rituals: vec![
                ritual(
                    "yule-knock",
                    "Yule Knock",
                    "Knock on the yule log before it burns.",
                    UnlockRequirement::Achievement {
                        id: "week-of-wood".to_string(),
                    },
                    None,
                ),
                ritual(
                    "long-night-vigil",
                    "Long Night Vigil",
                    "See the longest night through.",
                    UnlockRequirement::EventProgress { fraction: 1.0 },
                    None,
                ),
            ],
            challenges: vec![
                challenge(
                    "winter-solstice",
                    "rituals",
                    EventChallengeKind::Rituals,
                    "Hold the Dark Out",
                    10,
                    Reward::Points { amount: 70 },
                ),
                challenge(
                    "winter-solstice",
                    "special",
                    EventChallengeKind::SpecialRituals,
                    "Vigil Keeping",
                    3,
                    Reward::Points { amount: 90 },
                ),
            ],
            rewards: vec![
                Reward::WoodStyle {
                    style_id: "ebony".to_string(),
                },
                Reward::Points { amount: 150 },
                Reward::Badge {
                    name: "Solstice Keeper".to_string(),
                },
            ],
        },
    ]
}
