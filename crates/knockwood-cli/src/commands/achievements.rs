use clap::Subcommand;

use crate::common::{open_service, print_json};

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// Full catalog with unlock state
    List,
    /// Unlocked achievements only
    Unlocked,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;

    match action {
        AchievementsAction::List => print_json(&service.achievements().achievements()),
        AchievementsAction::Unlocked => {
            let unlocked: Vec<_> = service
                .achievements()
                .achievements()
                .iter()
                .filter(|a| a.unlocked)
                .collect();
            print_json(&unlocked)
        }
    }
}
