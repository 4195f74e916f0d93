use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    aggregate::{AggregateRow, aggregate},
    prelude::*,
    sample::SampleBuffer,
};

/// Durable sink for aggregate rows.
pub trait RowSink {
    async fn append(&self, row: &AggregateRow) -> Result;
}

/// Drains the buffer on a fixed period and persists one averaged row per
/// non-empty drain.
///
/// The single writer that ever drains the buffer, so two drains cannot race.
#[must_use]
#[derive(bon::Builder)]
pub struct Scheduler<S> {
    buffer: Arc<SampleBuffer>,
    sink: S,

    #[builder(into)]
    period: Duration,
}

impl<S: RowSink> Scheduler<S> {
    /// Tick forever until the surrounding task is dropped on shutdown.
    pub async fn run(&self) {
        let mut interval = interval(self.period);
        interval.reset_after(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.drain_once().await;
        }
    }

    /// Take, aggregate, persist.
    ///
    /// An empty drain skips the sink entirely. A sink failure drops the row
    /// without retrying; the next period's batch accumulates normally.
    pub async fn drain_once(&self) {
        let samples = self.buffer.take_all();
        if samples.is_empty() {
            debug!("nothing to aggregate");
            return;
        }
        let row = aggregate(&samples, Utc::now());
        info!(n_samples = samples.len(), "persisting the averaged row…");
        if let Err(error) = self.sink.append(&row).await {
            error!(error = format!("{error:#}"), "failed to persist the row, dropping it");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::sample::RawSample;

    #[derive(Default)]
    struct RecordingSink {
        rows: Mutex<Vec<AggregateRow>>,
        failing: bool,
    }

    impl RowSink for RecordingSink {
        async fn append(&self, row: &AggregateRow) -> Result {
            ensure!(!self.failing, "sink is down");
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    fn scheduler(sink: RecordingSink) -> Scheduler<RecordingSink> {
        Scheduler::builder()
            .buffer(Arc::new(SampleBuffer::default()))
            .sink(sink)
            .period(Duration::from_secs(60))
            .build()
    }

    fn sample(value: f64) -> RawSample {
        RawSample {
            timestamp: Utc::now(),
            values: HashMap::from([("total_dc_power".to_owned(), Some(value))]),
        }
    }

    #[tokio::test]
    async fn empty_drain_skips_the_sink() {
        let scheduler = scheduler(RecordingSink::default());
        scheduler.drain_once().await;
        assert!(scheduler.sink.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn drain_persists_one_averaged_row() {
        let scheduler = scheduler(RecordingSink::default());
        scheduler.buffer.append(sample(100.0));
        scheduler.buffer.append(sample(200.0));

        scheduler.drain_once().await;

        let rows = scheduler.sink.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_abs_diff_eq!(rows[0].values["total_dc_power"].unwrap(), 150.0);
        drop(rows);
        assert!(scheduler.buffer.is_empty());

        // Nothing new accumulated, so the next tick writes nothing.
        scheduler.drain_once().await;
        assert_eq!(scheduler.sink.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sink_failure_drops_the_row() {
        let scheduler = scheduler(RecordingSink { failing: true, ..Default::default() });
        scheduler.buffer.append(sample(100.0));

        scheduler.drain_once().await;

        // The row is gone and the buffer starts a fresh batch.
        assert!(scheduler.sink.rows.lock().unwrap().is_empty());
        assert!(scheduler.buffer.is_empty());
    }
}
