use super::{Tool, path_list, paths_schema};
use crate::error::{RcaError, Result};
use crate::query::binder::{dotted_extension, read_options, resolve_sources};
use datafusion::prelude::SessionContext;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

#[derive(Debug, Serialize)]
struct ColumnInfo {
    column_name: String,
    column_type: String,
}

/// Column names and types of parquet files.
pub struct GetSchema {
    runtime: Runtime,
    data_dir: Option<PathBuf>,
}

impl GetSchema {
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new().map_err(RcaError::Io)?;
        Ok(Self {
            runtime,
            data_dir: None,
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// File name → ordered column list. A file that can't be read gets an error
    /// string in its slot; a missing file fails the whole call.
    pub fn describe(&self, paths: &[String]) -> String {
        let sources = match resolve_sources(paths, self.data_dir.as_deref()) {
            Ok(sources) => sources,
            Err(e) => return format!("Error getting schema: {}", e),
        };

        let schemas = self.runtime.block_on(async {
            let ctx = SessionContext::new();
            let mut schemas = Map::new();

            for (raw, source) in paths.iter().zip(&sources) {
                let file_name = Path::new(raw)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| raw.clone());

                let entry = match read_columns(&ctx, source).await {
                    Ok(columns) => json!(columns),
                    Err(e) => {
                        tracing::warn!(file = %file_name, error = %e, "schema read failed");
                        Value::String(format!("Error reading schema: {}", e))
                    }
                };
                schemas.insert(file_name, entry);
            }
            schemas
        });

        serde_json::to_string_pretty(&schemas).unwrap_or_else(|e| format!("Error getting schema: {}", e))
    }
}

async fn read_columns(ctx: &SessionContext, path: &Path) -> datafusion::error::Result<Vec<ColumnInfo>> {
    let extension = dotted_extension(path);
    let location = path.to_string_lossy().into_owned();
    let frame = ctx.read_parquet(location, read_options(&extension)).await?;

    Ok(frame
        .schema()
        .fields()
        .iter()
        .map(|field| ColumnInfo {
            column_name: field.name().clone(),
            column_type: field.data_type().to_string(),
        })
        .collect())
}

impl Tool for GetSchema {
    fn name(&self) -> &str {
        "get_schema"
    }

    fn description(&self) -> &str {
        "Get the schema (column names and types) of parquet file(s). \
        Returns a JSON object mapping each file name to its columns."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "parquet_files": paths_schema("Path(s) to parquet file(s)")
            },
            "required": ["parquet_files"]
        })
    }

    fn execute(&self, args: Value) -> Result<String> {
        let paths = path_list(&args, "parquet_files")?;
        Ok(self.describe(&paths))
    }
}
