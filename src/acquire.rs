use std::collections::HashMap;

use chrono::Utc;

use crate::{
    api::modbus::Transport,
    catalog::MetricCatalog,
    decode::decode,
    prelude::*,
    sample::{RawSample, SampleBuffer},
};

/// Read and decode every catalog metric once.
///
/// Never fails past this boundary: a failed register degrades to `None` so
/// one bad read cannot abort the rest of the poll. The produced sample is
/// appended to the buffer before being returned, so every fresh-data request
/// also feeds the history.
#[instrument(skip_all, fields(n_metrics = catalog.len()))]
pub async fn poll(
    catalog: &MetricCatalog,
    transport: &impl Transport,
    buffer: &SampleBuffer,
) -> RawSample {
    let mut values = HashMap::with_capacity(catalog.len());
    for metric in catalog {
        let register = &metric.register;
        let value = match transport.read(register.address, register.encoding.word_count()).await {
            Ok(words) => match decode(&words, register.encoding, register.factor) {
                Ok(value) => Some(value),
                Err(error) => {
                    warn!(
                        metric = metric.name.as_str(),
                        address = register.address,
                        %error,
                        "undecodable register",
                    );
                    None
                }
            },
            Err(error) => {
                warn!(
                    metric = metric.name.as_str(),
                    address = register.address,
                    %error,
                    "read failed",
                );
                None
            }
        };
        values.insert(metric.name.clone(), value);
    }
    let sample = RawSample { timestamp: Utc::now(), values };
    buffer.append(sample.clone());
    sample
}
