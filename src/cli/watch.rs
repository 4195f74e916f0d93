use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::{
    signal,
    time::{MissedTickBehavior, interval},
};

use crate::{
    acquire,
    api::modbus::Inverter,
    cli::{CatalogArgs, ConnectionArgs},
    db::Readings,
    prelude::*,
    sample::SampleBuffer,
    scheduler::Scheduler,
};

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(flatten)]
    connection: ConnectionArgs,

    #[clap(flatten)]
    catalog: CatalogArgs,

    /// How often to poll the inverter.
    #[clap(long, env = "POLLING_INTERVAL", default_value = "5s")]
    polling_interval: humantime::Duration,

    /// How often to average the buffered samples into one stored row.
    #[clap(long, env = "AGGREGATION_PERIOD", default_value = "1min")]
    aggregation_period: humantime::Duration,

    /// SQLite database path.
    #[clap(long = "database", env = "DATABASE_PATH", default_value = "readings.db")]
    database_path: PathBuf,
}

impl WatchArgs {
    pub async fn run(self) -> Result {
        let catalog = self.catalog.load()?;
        let inverter = Inverter::connect(&self.connection).await?;
        let readings = Readings::open(&self.database_path, &catalog).await?;
        let buffer = Arc::new(SampleBuffer::default());

        let scheduler = Scheduler::builder()
            .buffer(Arc::clone(&buffer))
            .sink(readings)
            .period(self.aggregation_period)
            .build();

        let poller = async {
            let mut interval = interval(self.polling_interval.into());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let sample = acquire::poll(&catalog, &inverter, &buffer).await;
                debug!(
                    n_values = sample.values.values().filter(|value| value.is_some()).count(),
                    "polled",
                );
            }
        };

        tokio::select! {
            () = poller => {}
            () = scheduler.run() => {}
            result = signal::ctrl_c() => {
                result?;
                info!("interrupted");
            }
        }

        // Flush whatever accumulated since the last tick.
        scheduler.drain_once().await;
        Ok(())
    }
}
