//! `objstore stats`

use crate::error::Result;
use objstore_core::ObjectStorage;

pub fn run(storage: &ObjectStorage, json: bool) -> Result<()> {
    let stats = storage.stats()?;

    if json {
        let value = serde_json::json!({
            "object_count": stats.object_count,
            "total_bytes": stats.total_bytes,
            "expired_count": stats.expired_count,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("objects:  {}", stats.object_count);
    println!("bytes:    {}", stats.total_bytes);
    println!("expired:  {}", stats.expired_count);
    Ok(())
}
