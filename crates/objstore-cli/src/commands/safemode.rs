//! `objstore safemode {on,off,status}`

use crate::cli::SafemodeAction;
use crate::error::Result;
use colored::Colorize;
use objstore_core::ObjectStorage;

pub fn run(storage: &ObjectStorage, action: SafemodeAction, json: bool) -> Result<()> {
    let enabled = match action {
        SafemodeAction::On => {
            storage.enable_safe_mode()?;
            true
        }
        SafemodeAction::Off => {
            storage.disable_safe_mode()?;
            false
        }
        SafemodeAction::Status => storage.safe_mode_enabled()?,
    };

    if json {
        println!("{}", serde_json::json!({ "safe_mode": enabled }));
        return Ok(());
    }
    if enabled {
        println!("safe mode is {}", "on".red().bold());
    } else {
        println!("safe mode is {}", "off".green().bold());
    }
    Ok(())
}
