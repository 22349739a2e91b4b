use super::{Tool, path_list, paths_schema};
use crate::error::{RcaError, Result};
use crate::query::{self, DEFAULT_ROW_LIMIT, NO_RESULTS, QueryFailure, QueryOutcome, TokenBudget};
use serde_json::{Value, json};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// SQL over parquet files with a capped row count and a token budget.
///
/// Each call builds and drops its own engine session; the runtime is the only
/// thing kept between calls.
pub struct QueryParquetFiles {
    runtime: Runtime,
    data_dir: Option<PathBuf>,
    budget: TokenBudget,
    default_limit: usize,
}

impl QueryParquetFiles {
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new().map_err(RcaError::Io)?;
        Ok(Self {
            runtime,
            data_dir: None,
            budget: TokenBudget::default(),
            default_limit: DEFAULT_ROW_LIMIT,
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_budget(mut self, budget: TokenBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Row cap used when the caller passes no `limit`.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    /// Runs the query and renders whichever shape came out as text.
    pub fn run(&self, paths: &[String], sql: &str, limit: Option<usize>) -> String {
        let row_cap = limit.unwrap_or(self.default_limit);
        let outcome = self
            .runtime
            .block_on(query::run_query(paths, sql, row_cap, self.data_dir.as_deref()));

        match outcome {
            Ok(QueryOutcome::NoResults) => NO_RESULTS.to_string(),
            Ok(QueryOutcome::Records(set)) => match set.to_json() {
                Ok(payload) => self
                    .budget
                    .enforce(payload, Some(set.row_count), self.name())
                    .into_text(),
                Err(e) => QueryFailure::Execution { message: e.to_string() }.to_string(),
            },
            Err(failure) => {
                tracing::info!(error = %failure, "parquet query failed");
                failure.to_string()
            }
        }
    }
}

impl Tool for QueryParquetFiles {
    fn name(&self) -> &str {
        "query_parquet_files"
    }

    fn description(&self) -> &str {
        "Query parquet files using SQL syntax for data analysis and exploration. \
        Each file is registered as a table named after its file name without extension \
        (duplicates get _1, _2, ... suffixes). Returns a JSON list of records."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "parquet_files": paths_schema("Path(s) to parquet file(s) to be queried"),
                "query": {
                    "type": "string",
                    "description": "SQL query to execute. Use table names corresponding to file names."
                },
                "limit": {
                    "type": "integer",
                    "description": format!("Maximum number of records to return (default {})", self.default_limit)
                }
            },
            "required": ["parquet_files", "query"]
        })
    }

    fn execute(&self, args: Value) -> Result<String> {
        let paths = path_list(&args, "parquet_files")?;
        let sql = args["query"]
            .as_str()
            .ok_or_else(|| RcaError::InvalidArguments("Missing 'query'".to_string()))?;
        let limit = args["limit"].as_u64().map(|n| n as usize);

        Ok(self.run(&paths, sql, limit))
    }
}
