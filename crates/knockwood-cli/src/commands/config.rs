use clap::Subcommand;
use knockwood_core::storage::{data_dir, Config};

use crate::common::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Current configuration
    Show,
    /// Data directory path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            print_json(&config)
        }
        ConfigAction::Path => {
            println!("{}", data_dir()?.display());
            Ok(())
        }
    }
}
