use knockwood_core::storage::Config;
use knockwood_core::{Database, HabitService, SystemClock};

/// Open the production service: system clock, on-disk database, config file.
pub fn open_service() -> Result<HabitService<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    Ok(HabitService::new(Box::new(SystemClock), db, config))
}

/// Pretty-print any serializable value to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
