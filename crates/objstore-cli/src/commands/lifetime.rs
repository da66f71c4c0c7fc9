//! `objstore lifetime {get,set}`

use crate::cli::LifetimeAction;
use crate::commands::parse_uuid;
use crate::error::Result;
use objstore_core::ObjectStorage;

pub fn run(storage: &ObjectStorage, action: LifetimeAction, json: bool) -> Result<()> {
    match action {
        LifetimeAction::Get { uuid } => {
            let uuid = parse_uuid(&uuid)?;
            let remaining = storage.get_lifetime(uuid)?;
            if json {
                println!("{}", serde_json::json!({ "uuid": uuid.to_string(), "remaining_seconds": remaining }));
            } else {
                match remaining {
                    Some(seconds) => println!("{seconds:.0}s remaining"),
                    None => println!("never expires"),
                }
            }
        }
        LifetimeAction::Set { uuid, ttl } => {
            let uuid = parse_uuid(&uuid)?;
            storage.set_lifetime(uuid, ttl)?;
            if json {
                println!("{}", serde_json::json!({ "uuid": uuid.to_string(), "ttl": ttl }));
            } else {
                match ttl {
                    Some(seconds) => println!("ttl set to {seconds}s"),
                    None => println!("ttl cleared, object never expires"),
                }
            }
        }
    }
    Ok(())
}
