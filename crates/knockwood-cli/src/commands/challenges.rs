use clap::Subcommand;

use crate::common::{open_service, print_json};

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// Today's challenge set
    List,
    /// Completed challenges across all days
    History,
}

pub fn run(action: ChallengesAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;
    service.refresh();

    match action {
        ChallengesAction::List => print_json(&service.challenges().active()),
        ChallengesAction::History => print_json(&service.challenges().completed_history()),
    }
}
