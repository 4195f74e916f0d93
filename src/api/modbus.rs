use std::time::Duration;

use tokio::{
    net::{TcpStream, lookup_host},
    sync::Mutex,
    time::timeout,
};
use tokio_modbus::{
    Slave,
    client::{Context as ModbusContext, Reader, tcp::attach_slave},
};

use crate::{cli::ConnectionArgs, prelude::*};

/// Field-bus read seam between the poller and the wire.
///
/// Tests substitute an in-memory fake for the Modbus client.
pub trait Transport {
    async fn read(&self, address: u16, count: u16) -> Result<Vec<u16>, TransportError>;
}

/// A failed register read. Non-fatal: the poller degrades the metric to
/// «no value» and carries on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("timed out reading register #{address}")]
    Timeout { address: u16 },

    #[error("exception reading register #{address}: {code}")]
    Exception { address: u16, code: tokio_modbus::ExceptionCode },

    #[error("transport failure: {0}")]
    Io(#[from] tokio_modbus::Error),

    #[error("register #{address} returned {actual} words, expected {expected}")]
    ShortRead { address: u16, expected: u16, actual: usize },
}

/// Modbus TCP client for the inverter (or its WiNet dongle).
#[must_use]
pub struct Inverter(Mutex<ModbusContext>);

impl Inverter {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    const READ_TIMEOUT: Duration = Duration::from_secs(10);

    #[instrument(
        skip_all,
        fields(host = args.host.as_str(), port = args.port, slave_id = args.slave_id),
    )]
    pub async fn connect(args: &ConnectionArgs) -> Result<Self> {
        info!("connecting…");
        let addresses: Vec<_> = lookup_host((args.host.as_str(), args.port)).await?.collect();
        let tcp_stream = timeout(Self::CONNECT_TIMEOUT, TcpStream::connect(&*addresses))
            .await
            .context("timed out while connecting to the inverter")?
            .context("failed to connect to the inverter")?;
        tcp_stream.set_nodelay(true)?;
        info!("connected");
        Ok(Self(Mutex::new(attach_slave(tcp_stream, Slave(args.slave_id)))))
    }
}

impl Transport for Inverter {
    /// Read `count` input registers starting at `address`.
    async fn read(&self, address: u16, count: u16) -> Result<Vec<u16>, TransportError> {
        debug!(address, n_words = count, "reading…");
        let mut context = self.0.lock().await;
        let words = timeout(Self::READ_TIMEOUT, context.read_input_registers(address, count))
            .await
            .map_err(|_| TransportError::Timeout { address })??
            .map_err(|code| TransportError::Exception { address, code })?;
        drop(context);
        if words.len() != usize::from(count) {
            return Err(TransportError::ShortRead { address, expected: count, actual: words.len() });
        }
        Ok(words)
    }
}
