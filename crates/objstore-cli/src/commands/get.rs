//! `objstore get`

use crate::commands::{field_value_to_json, parse_uuid};
use crate::error::Result;
use colored::Colorize;
use objstore_core::ObjectStorage;

pub fn run(storage: &ObjectStorage, uuid: &str, json: bool) -> Result<()> {
    let uuid = parse_uuid(uuid)?;
    let node = storage.load(uuid)?;
    let borrowed = node.borrow();

    let mut fields = serde_json::Map::new();
    for (name, value) in &borrowed.fields {
        fields.insert(name.clone(), field_value_to_json(value));
    }

    if json {
        let body = serde_json::json!({
            "uuid": uuid.to_string(),
            "class": borrowed.class,
            "fields": fields,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{} {}", "class:".dimmed(), borrowed.class);
    println!("{} {}", "uuid:".dimmed(), uuid);
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}
