//! `objstore put`

use crate::commands::parse_field;
use crate::error::Result;
use colored::Colorize;
use objstore_core::{Node, ObjectStorage, StoreOptions};

pub fn run(
    storage: &ObjectStorage,
    class: &str,
    fields: &[String],
    ttl: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut node = Node::new(class);
    for arg in fields {
        let (name, value) = parse_field(arg)?;
        node.set(name, value);
    }

    let uuid = storage.store(
        &node.wrap(),
        StoreOptions {
            ttl,
            inherit_lifetime: false,
        },
    )?;

    if json {
        println!("{}", serde_json::json!({ "uuid": uuid.to_string() }));
    } else {
        println!("{} {}", "stored".green().bold(), uuid);
    }
    Ok(())
}
