use clap::Subcommand;
use knockwood_core::ShareKind;
use serde::Serialize;

use crate::common::{open_service, print_json};

#[derive(Subcommand)]
pub enum ShareAction {
    /// Share the current streak
    Streak,
    /// Share an unlocked achievement
    Achievement { title: String },
    /// Share a completed challenge
    Challenge { title: String },
}

#[derive(Serialize)]
struct ShareOutput {
    payload: knockwood_core::SharePayload,
    events: Vec<knockwood_core::Event>,
}

pub fn run(action: ShareAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;

    let kind = match action {
        ShareAction::Streak => ShareKind::Streak {
            days: service.progress().streak().current,
        },
        ShareAction::Achievement { title } => ShareKind::Achievement { title },
        ShareAction::Challenge { title } => ShareKind::Challenge { title },
    };
    let (payload, events) = service.share(kind);
    print_json(&ShareOutput { payload, events })
}
