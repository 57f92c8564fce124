use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::errors::{Error, Result};

#[derive(Parser, Debug)]
#[command(
    name = "rendas",
    about = "Monthly and annual net income from salaries, rentals, expenses and investments"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the save/load/calculate HTTP API
    Serve(ServeArgs),
    /// Print the calculated results of a saved document
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "RENDAS_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, env = "RENDAS_PORT", default_value_t = 3001)]
    pub port: u16,
    #[arg(
        long,
        env = "RENDAS_SAVE_DIR",
        default_value = "save",
        help = "Directory holding one <username>.json document per user"
    )]
    pub save_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Path to a stored document
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub save_dir: PathBuf,
}

impl ServeArgs {
    pub fn into_config(self) -> Result<ServerConfig> {
        if self.port == 0 {
            return Err(Error::validation("--port must be > 0"));
        }
        if self.save_dir.as_os_str().is_empty() {
            return Err(Error::validation("--save-dir must not be empty"));
        }
        Ok(ServerConfig {
            addr: SocketAddr::new(self.host, self.port),
            save_dir: self.save_dir,
        })
    }
}
