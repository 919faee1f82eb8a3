use clap::Subcommand;
use serde::Serialize;

use crate::common::{open_service, print_json};

#[derive(Subcommand)]
pub enum EventsAction {
    /// Events active today
    Current,
    /// Events yet to start this year
    Upcoming,
    /// Events already over this year
    Past,
    /// Special rituals usable right now
    Rituals,
}

#[derive(Serialize)]
struct EventSummary<'a> {
    event: &'a knockwood_core::SeasonalEvent,
    progress: f64,
}

pub fn run(action: EventsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;
    service.refresh();
    let today = service.today();

    match action {
        EventsAction::Current => {
            let summaries: Vec<EventSummary> = service
                .seasonal()
                .current_events(today)
                .into_iter()
                .map(|event| EventSummary {
                    progress: service.seasonal().event_progress(&event.id),
                    event,
                })
                .collect();
            print_json(&summaries)
        }
        EventsAction::Upcoming => print_json(&service.seasonal().upcoming_events(today)),
        EventsAction::Past => print_json(&service.seasonal().past_events(today)),
        EventsAction::Rituals => print_json(&service.seasonal().available_rituals(today)),
    }
}
