use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::sample::RawSample;

/// One fixed-interval history row: per-metric means over a drained batch.
#[must_use]
#[derive(Clone, Debug)]
pub struct AggregateRow {
    /// Wall-clock time of the drain, not derived from the sample timestamps.
    pub timestamp: DateTime<Utc>,

    /// A metric observed in the batch but never numeric maps to `None`;
    /// a metric never observed at all is absent.
    pub values: HashMap<String, Option<f64>>,
}

/// Average a drained batch metric by metric.
///
/// Plain arithmetic mean over the values present: every sample weighs the
/// same no matter how close together the polls were.
pub fn aggregate(samples: &[RawSample], timestamp: DateTime<Utc>) -> AggregateRow {
    let mut totals: HashMap<&str, (f64, u32)> = HashMap::new();
    for sample in samples {
        for (name, value) in &sample.values {
            let (sum, count) = totals.entry(name.as_str()).or_default();
            if let Some(value) = value {
                *sum += value;
                *count += 1;
            }
        }
    }
    let values = totals
        .into_iter()
        .map(|(name, (sum, count))| {
            (name.to_owned(), (count != 0).then(|| sum / f64::from(count)))
        })
        .collect();
    AggregateRow { timestamp, values }
}
