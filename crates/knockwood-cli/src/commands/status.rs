use serde::Serialize;

use crate::common::{open_service, print_json};

#[derive(Serialize)]
struct Status {
    today: chrono::NaiveDate,
    today_rituals: u32,
    lifetime_rituals: u32,
    streak_current: u32,
    streak_best: u32,
    level: u32,
    achievement_points: u32,
    challenge_points: u32,
    event_points: u32,
    badges: Vec<String>,
    shares: u32,
    active_challenges: usize,
    current_events: usize,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;
    // Roll day-scoped state before reporting.
    service.refresh();
    let today = service.today();
    let status = Status {
        today,
        today_rituals: service.progress().today_count(today),
        lifetime_rituals: service.progress().lifetime_count(),
        streak_current: service.progress().streak().current,
        streak_best: service.progress().streak().best,
        level: service.achievements().level(),
        achievement_points: service.achievements().total_points(),
        challenge_points: service.challenges().points_earned(),
        event_points: service.seasonal().points_earned(),
        badges: service.seasonal().badges().map(String::from).collect(),
        shares: service.social().share_count(),
        active_challenges: service.challenges().active().len(),
        current_events: service.seasonal().current_events(today).len(),
    };
    print_json(&status)
}
