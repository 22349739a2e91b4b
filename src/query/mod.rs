//! Bounded SQL over parquet files.
//!
//! One call = one in-memory DataFusion session: bind the files as relations,
//! run a single statement, cap the rows, and hand back either records or a
//! failure. The size budget is applied by the caller on the serialized text.

pub mod binder;
pub mod budget;
pub mod executor;

use datafusion::error::DataFusionError;
use std::path::Path;
use thiserror::Error;

pub use binder::{BoundRelations, relation_names, resolve_sources};
pub use budget::{BudgetDiagnostic, BudgetedResponse, TokenBudget};
pub use executor::{DEFAULT_ROW_LIMIT, NO_RESULTS, QueryOutcome, Record, ResultSet};

/// Every way a query call can fail. `Display` is the text handed back to the agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    #[error(
        "Parquet file not found: {path}\nPlease check the file path and ensure the file exists. You may use 'list_tables_in_directory' to discover available parquet files."
    )]
    NotFound { path: String },

    #[error("SQL syntax error: {message}\nQuery: {query}\nAvailable tables: {relations:?}")]
    Syntax {
        message: String,
        query: String,
        relations: Vec<String>,
    },

    #[error("Table reference error: {message}\nAvailable tables: {relations:?}")]
    UnknownReference { message: String, relations: Vec<String> },

    #[error("Query execution failed: {message}")]
    Execution { message: String },
}

impl QueryFailure {
    /// Sorts an engine error into the failure taxonomy.
    pub fn from_engine(err: DataFusionError, query: &str, relations: &[String]) -> Self {
        let message = err.to_string();
        let relations = relations.to_vec();

        match classify(&err, &message) {
            FailureKind::Syntax => QueryFailure::Syntax {
                message,
                query: query.to_string(),
                relations,
            },
            FailureKind::Reference => QueryFailure::UnknownReference { message, relations },
            FailureKind::Other => QueryFailure::Execution { message },
        }
    }
}

enum FailureKind {
    Syntax,
    Reference,
    Other,
}

fn classify(err: &DataFusionError, message: &str) -> FailureKind {
    match err.find_root() {
        DataFusionError::SQL(..) => return FailureKind::Syntax,
        DataFusionError::SchemaError(..) => return FailureKind::Reference,
        _ => {}
    }

    // 래핑된 오류는 메시지로 판별
    let lower = message.to_lowercase();
    if lower.contains("syntax error") || lower.contains("parsererror") || lower.contains("parser error") {
        FailureKind::Syntax
    } else if (lower.contains("table") && lower.contains("not found")) || lower.contains("no field named") {
        FailureKind::Reference
    } else {
        FailureKind::Other
    }
}

/// Resolves, binds and executes in one session, which is dropped on return.
pub async fn run_query(
    paths: &[String],
    query: &str,
    row_cap: usize,
    data_dir: Option<&Path>,
) -> Result<QueryOutcome, QueryFailure> {
    let sources = resolve_sources(paths, data_dir)?;
    let relations = BoundRelations::bind(&sources)
        .await
        .map_err(|e| QueryFailure::from_engine(e, query, &relation_names(&sources)))?;

    tracing::info!(relations = ?relations.names(), row_cap, "executing parquet query");
    executor::execute(&relations, query, row_cap).await
}
