use clap::Parser;

use crate::{
    acquire,
    api::modbus::Inverter,
    cli::{CatalogArgs, ConnectionArgs},
    prelude::*,
    sample::SampleBuffer,
    tables::build_sample_table,
};

#[derive(Parser)]
pub struct ReadArgs {
    #[clap(flatten)]
    connection: ConnectionArgs,

    #[clap(flatten)]
    catalog: CatalogArgs,
}

impl ReadArgs {
    pub async fn run(self) -> Result {
        let catalog = self.catalog.load()?;
        let inverter = Inverter::connect(&self.connection).await?;
        let buffer = SampleBuffer::default();
        let sample = acquire::poll(&catalog, &inverter, &buffer).await;
        println!("{}", build_sample_table(&catalog, &sample));
        Ok(())
    }
}
