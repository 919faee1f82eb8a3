use crate::common::{open_service, print_json};

pub fn run(
    ritual_id: &str,
    mood: Option<u8>,
    note: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;
    let events = service.record_completion(ritual_id, mood, note)?;
    service.flush();
    print_json(&events)
}
