use clap::Subcommand;
use knockwood_core::RitualCategory;

use crate::common::{open_service, print_json};

#[derive(Subcommand)]
pub enum RitualsAction {
    /// All rituals, built-in and custom
    List,
    /// Add a custom ritual
    Add {
        name: String,
        /// wood | protection | fortune | cleansing
        #[arg(long, default_value = "wood")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Wood styles and their unlock state
    Styles,
}

fn parse_category(value: &str) -> Result<RitualCategory, Box<dyn std::error::Error>> {
    match value {
        "wood" => Ok(RitualCategory::Wood),
        "protection" => Ok(RitualCategory::Protection),
        "fortune" => Ok(RitualCategory::Fortune),
        "cleansing" => Ok(RitualCategory::Cleansing),
        other => Err(format!("unknown category '{other}'").into()),
    }
}

pub fn run(action: RitualsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;

    match action {
        RitualsAction::List => {
            let rituals: Vec<_> = service.catalog().rituals().collect();
            print_json(&rituals)
        }
        RitualsAction::Add {
            name,
            category,
            description,
        } => {
            let category = parse_category(&category)?;
            let (id, events) = service.add_custom_ritual(&name, category, &description)?;
            println!("added ritual {id}");
            print_json(&events)
        }
        RitualsAction::Styles => print_json(&service.catalog().styles()),
    }
}
