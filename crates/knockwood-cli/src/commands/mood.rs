use clap::Subcommand;

use crate::common::{open_service, print_json};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Daily averages over the last week
    Weekly,
    /// Daily averages over the last month
    Monthly,
    /// Per-ritual mood correlation
    Rituals,
    /// Average mood by time of day
    Daypart,
    /// Detected mood streaks
    Streaks,
    /// Generated insights
    Insights,
}

pub fn run(action: MoodAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;

    match action {
        MoodAction::Weekly => print_json(&service.analytics().weekly_trend()),
        MoodAction::Monthly => print_json(&service.analytics().monthly_trend()),
        MoodAction::Rituals => print_json(&service.analytics().ritual_moods()),
        MoodAction::Daypart => print_json(&service.analytics().time_of_day()),
        MoodAction::Streaks => print_json(&service.analytics().streaks()),
        MoodAction::Insights => print_json(&service.analytics().insights()),
    }
}
