use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Kongbridge — reference store and sync service for the Kong admin API
#[derive(Parser)]
#[command(name = "kongbridge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the management server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8444")]
        port: u16,
    },

    /// Run pending database migrations
    Migrate,

    /// Manage API references
    Api {
        #[command(subcommand)]
        command: RefCommands,
    },

    /// Manage consumer references
    Consumer {
        #[command(subcommand)]
        command: RefCommands,
    },

    /// Manage plugin configuration references
    Plugin {
        #[command(subcommand)]
        command: RefCommands,
    },
}

/// Operator commands shared by every reference kind.
#[derive(Subcommand)]
pub enum RefCommands {
    /// List references with their sync state
    List,
    /// Synchronize a reference to the gateway (create or update)
    Sync { id: Uuid },
    /// Withdraw a reference from the gateway
    Withdraw { id: Uuid },
}
