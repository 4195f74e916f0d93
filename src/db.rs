use std::path::Path;

use itertools::Itertools;
use turso::{Builder, Connection, Value};

use crate::{aggregate::AggregateRow, catalog::MetricCatalog, prelude::*, scheduler::RowSink};

/// Aggregate history in a local SQLite database: one row per drain, one
/// `REAL` column per catalog metric, `NULL` where the batch had no value.
#[must_use]
pub struct Readings {
    connection: Connection,
    columns: Vec<String>,
}

impl Readings {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn open(path: &Path, catalog: &MetricCatalog) -> Result<Self> {
        let database = Builder::new_local(&path.to_string_lossy()).build().await?;
        let connection = database.connect()?;
        let columns: Vec<String> = catalog.names().map(str::to_owned).collect();
        connection.execute(&create_table_sql(&columns), ()).await?;
        Ok(Self { connection, columns })
    }
}

impl RowSink for Readings {
    #[instrument(skip_all, fields(timestamp = %row.timestamp))]
    async fn append(&self, row: &AggregateRow) -> Result {
        let mut params = Vec::with_capacity(self.columns.len() + 1);
        params.push(Value::Integer(row.timestamp.timestamp()));
        for column in &self.columns {
            params.push(row.values.get(column).copied().flatten().map_or(Value::Null, Value::Real));
        }
        self.connection
            .prepare_cached(&insert_sql(&self.columns))
            .await?
            .execute(params)
            .await
            .context("failed to insert the reading")?;
        Ok(())
    }
}

fn create_table_sql(columns: &[String]) -> String {
    let columns = std::iter::once("timestamp INTEGER NOT NULL".to_owned())
        .chain(columns.iter().map(|name| format!(r#""{name}" REAL"#)))
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS readings ({columns})")
}

fn insert_sql(columns: &[String]) -> String {
    let names = std::iter::once("timestamp".to_owned())
        .chain(columns.iter().map(|name| format!(r#""{name}""#)))
        .join(", ");
    let placeholders = (1..=columns.len() + 1).map(|index| format!("?{index}")).join(", ");
    format!("INSERT INTO readings ({names}) VALUES ({placeholders})")
}
