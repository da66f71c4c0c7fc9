//! `objstore delete`

use crate::commands::parse_uuid;
use crate::error::Result;
use colored::Colorize;
use objstore_core::ObjectStorage;

pub fn run(storage: &ObjectStorage, uuid: &str, force: bool, json: bool) -> Result<()> {
    let uuid = parse_uuid(uuid)?;
    let deleted = storage.delete(uuid, force)?;

    if json {
        println!("{}", serde_json::json!({ "uuid": uuid.to_string(), "deleted": deleted }));
        return Ok(());
    }
    if deleted {
        println!("{} {}", "deleted".green().bold(), uuid);
    } else {
        println!("{} {} did not exist", "skipped".dimmed(), uuid);
    }
    Ok(())
}
