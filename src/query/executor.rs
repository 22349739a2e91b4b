use super::QueryFailure;
use super::binder::BoundRelations;
use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::json::WriterBuilder;
use datafusion::arrow::json::writer::JsonArray;
use datafusion::execution::context::SQLOptions;
use futures_util::StreamExt;
use serde_json::{Map, Value};

pub const NO_RESULTS: &str = "Query executed successfully but returned no results.";

pub const DEFAULT_ROW_LIMIT: usize = 50;

/// A single JSON record: column name to value, in result column order.
pub type Record = Map<String, Value>;

/// Rows produced by one query, already capped.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub records: Vec<Record>,
    /// Number of records kept, computed while collecting.
    pub row_count: usize,
    /// Whether the engine had rows beyond the cap.
    pub truncated: bool,
}

impl ResultSet {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Records(ResultSet),
    /// The query ran but matched nothing.
    NoResults,
}

impl QueryOutcome {
    pub fn row_count(&self) -> usize {
        match self {
            QueryOutcome::Records(set) => set.row_count,
            QueryOutcome::NoResults => 0,
        }
    }
}

/// Read-only statement policy: no DDL, no DML (this includes `COPY`), no `SET`.
fn read_only() -> SQLOptions {
    SQLOptions::new()
        .with_allow_ddl(false)
        .with_allow_dml(false)
        .with_allow_statements(false)
}

/// Runs `query` against the bound relations and keeps at most `row_cap` rows.
///
/// Batches are pulled from the engine stream only until the cap is filled, so
/// rows come back in the engine's natural order and nothing is re-sorted here.
/// With a cap of zero the stream is polled only until the first non-empty batch,
/// which tells an empty record list apart from a query that matched nothing.
pub async fn execute(relations: &BoundRelations, query: &str, row_cap: usize) -> Result<QueryOutcome, QueryFailure> {
    let fail = |e| QueryFailure::from_engine(e, query, relations.names());

    let frame = relations
        .session()
        .sql_with_options(query, read_only())
        .await
        .map_err(fail)?;
    let mut stream = frame.execute_stream().await.map_err(fail)?;

    let mut batches: Vec<RecordBatch> = Vec::new();
    let mut collected = 0;
    let mut truncated = false;

    while let Some(batch) = stream.next().await {
        let batch = batch.map_err(fail)?;
        let rows = batch.num_rows();
        if rows == 0 {
            continue;
        }
        if collected == row_cap {
            truncated = true;
            break;
        }

        let take = rows.min(row_cap - collected);
        batches.push(batch.slice(0, take));
        collected += take;
        if take < rows {
            truncated = true;
            break;
        }
    }

    if collected == 0 && !truncated {
        return Ok(QueryOutcome::NoResults);
    }

    let records = batches_to_records(&batches).map_err(|message| QueryFailure::Execution { message })?;
    tracing::debug!(rows = collected, truncated, "query collected");

    Ok(QueryOutcome::Records(ResultSet {
        row_count: records.len(),
        records,
        truncated,
    }))
}

/// Converts record batches to JSON records.
///
/// The Arrow JSON writer renders temporal values (dates, times, timestamps) as
/// ISO-8601 strings, and does so for values nested in struct, map and list
/// columns too. Nulls are kept as explicit `null`s.
pub fn batches_to_records(batches: &[RecordBatch]) -> Result<Vec<Record>, String> {
    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(Vec::new());

    let refs: Vec<&RecordBatch> = batches.iter().collect();
    writer.write_batches(&refs).map_err(|e| e.to_string())?;
    writer.finish().map_err(|e| e.to_string())?;

    let buffer = writer.into_inner();
    if buffer.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&buffer).map_err(|e| e.to_string())
}
