//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// objstore - inspect and manipulate a UUID-addressed object store
#[derive(Parser, Debug)]
#[command(name = "objstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Storage root directory
    #[arg(long, global = true, env = "OBJSTORE_DIR", default_value = ".objstore")]
    pub dir: PathBuf,

    /// Engine config file (.toml or .json); overrides shard depth, max
    /// depth, child-write policy, lock timeout, and fsync behavior
    #[arg(long, global = true, env = "OBJSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List object UUIDs, optionally filtered by class
    List {
        /// Only list objects of this class
        #[arg(short, long)]
        class: Option<String>,

        /// Maximum number of UUIDs to return
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Load an object and print its fields
    Get {
        /// UUID of the object to load
        uuid: String,
    },

    /// Store a new object
    ///
    /// Fields are given as repeated `name=value` pairs; values are
    /// parsed as JSON when possible and fall back to plain strings.
    ///
    /// Examples:
    ///   objstore put User name=Ada age=36
    ///   objstore put User name=Ada --ttl 3600
    Put {
        /// Class name for the new object
        class: String,

        /// Fields as `name=value` pairs
        fields: Vec<String>,

        /// Time-to-live in seconds from now
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete an object
    Delete {
        /// UUID of the object to delete
        uuid: String,

        /// Don't fail if the object doesn't exist
        #[arg(short, long)]
        force: bool,
    },

    /// Scan the store for orphaned files, checksum mismatches, and expired records
    Check,

    /// Print aggregate storage statistics
    Stats,

    /// Manage safe mode (blocks mutating operations)
    Safemode {
        #[command(subcommand)]
        action: SafemodeAction,
    },

    /// Inspect or change an object's time-to-live
    Lifetime {
        #[command(subcommand)]
        action: LifetimeAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SafemodeAction {
    /// Enable safe mode
    On,
    /// Disable safe mode
    Off,
    /// Report whether safe mode is enabled
    Status,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LifetimeAction {
    /// Print an object's remaining TTL, if any
    Get {
        /// UUID of the object
        uuid: String,
    },
    /// Set or clear an object's TTL
    Set {
        /// UUID of the object
        uuid: String,

        /// New TTL in seconds, omit to clear it (never expires)
        ttl: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_class_and_limit() {
        let cli = Cli::parse_from(["objstore", "list", "--class", "User", "--limit", "5"]);
        assert_eq!(
            cli.command,
            Some(Commands::List {
                class: Some("User".into()),
                limit: Some(5),
            })
        );
    }

    #[test]
    fn parses_put_with_fields_and_ttl() {
        let cli = Cli::parse_from(["objstore", "put", "User", "name=Ada", "age=36", "--ttl", "60"]);
        assert_eq!(
            cli.command,
            Some(Commands::Put {
                class: "User".into(),
                fields: vec!["name=Ada".into(), "age=36".into()],
                ttl: Some(60),
            })
        );
    }

    #[test]
    fn parses_global_flags_before_subcommand() {
        let cli = Cli::parse_from(["objstore", "--json", "--dir", "/tmp/store", "stats"]);
        assert!(cli.json);
        assert_eq!(cli.dir, PathBuf::from("/tmp/store"));
        assert_eq!(cli.command, Some(Commands::Stats));
    }

    #[test]
    fn parses_safemode_status() {
        let cli = Cli::parse_from(["objstore", "safemode", "status"]);
        assert_eq!(
            cli.command,
            Some(Commands::Safemode {
                action: SafemodeAction::Status
            })
        );
    }

    #[test]
    fn parses_lifetime_set_with_no_ttl_to_clear() {
        let cli = Cli::parse_from(["objstore", "lifetime", "set", "some-uuid"]);
        assert_eq!(
            cli.command,
            Some(Commands::Lifetime {
                action: LifetimeAction::Set {
                    uuid: "some-uuid".into(),
                    ttl: None,
                }
            })
        );
    }
}
