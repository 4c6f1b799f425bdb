//! Runtime settings, read from command-line flags with environment fallbacks.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use catfarm_core::Database;
use clap::Args;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Address to bind the HTTP API to
    #[arg(long, global = true, env = "CATFARM_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port for the HTTP API
    #[arg(short, long, global = true, env = "CATFARM_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, global = true, env = "CATFARM_DATABASE")]
    pub database: Option<PathBuf>,
}

impl Settings {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn open_database(&self) -> anyhow::Result<Database> {
        match &self.database {
            Some(path) => {
                tracing::info!(path = %path.display(), "Opening database");
                Database::open(path)
            }
            None => Database::open_default(),
        }
    }
}
