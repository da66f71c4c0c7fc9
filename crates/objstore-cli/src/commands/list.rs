//! `objstore list`

use crate::error::Result;
use colored::Colorize;
use objstore_core::ObjectStorage;

pub fn run(storage: &ObjectStorage, class: Option<&str>, limit: Option<usize>, json: bool) -> Result<()> {
    let uuids = storage.list(class, limit)?;

    if json {
        let value: Vec<String> = uuids.iter().map(|u| u.to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if uuids.is_empty() {
        println!("{}", "no objects found".dimmed());
        return Ok(());
    }
    for uuid in uuids {
        println!("{uuid}");
    }
    Ok(())
}
