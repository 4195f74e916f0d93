mod acquire;
mod aggregate;
mod api;
mod catalog;
mod cli;
mod db;
mod decode;
mod prelude;
mod sample;
mod scheduler;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Watch(args) => args.run().await?,
        Command::Read(args) => args.run().await?,
    }

    info!("done!");
    Ok(())
}
