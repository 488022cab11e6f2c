pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-gateway")]
#[command(author, version, about = "Image gateway - serves object store images with long-lived cache and CORS headers")]
pub struct Cli {
    /// Path to config file (checked in order: local config.toml, ~/.config/image-gateway/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Start {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration and whether the gateway is reachable
    Status,

    /// List object keys in the configured store
    List {
        /// Key prefix (defaults to the debug list prefix from config)
        #[arg(long)]
        prefix: Option<String>,

        /// Maximum number of keys
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}
