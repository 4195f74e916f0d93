mod read;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use self::{read::ReadArgs, watch::WatchArgs};
use crate::{catalog::MetricCatalog, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the inverter continuously and persist averaged readings.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),

    /// Read all catalog registers once and print them.
    #[clap(name = "read")]
    Read(Box<ReadArgs>),
}

#[derive(Parser)]
pub struct ConnectionArgs {
    /// Inverter (or WiNet-S dongle) host name or address.
    #[clap(long, env = "INVERTER_HOST")]
    pub host: String,

    #[clap(long, env = "INVERTER_PORT", default_value = "502")]
    pub port: u16,

    /// Modbus unit identifier.
    #[clap(long, env = "INVERTER_SLAVE_ID", default_value = "1")]
    pub slave_id: u8,
}

#[derive(Parser)]
pub struct CatalogArgs {
    /// Register catalog path.
    #[clap(long = "catalog", env = "CATALOG_PATH", default_value = "registers.toml")]
    pub path: PathBuf,
}

impl CatalogArgs {
    pub fn load(&self) -> Result<MetricCatalog> {
        let catalog = MetricCatalog::load(&self.path)
            .with_context(|| format!("failed to load the catalog from `{}`", self.path.display()))?;
        info!(n_metrics = catalog.len(), "loaded the catalog");
        Ok(catalog)
    }
}
