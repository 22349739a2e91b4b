// src/tools/mod.rs

use crate::error::{RcaError, Result};
use serde_json::Value;

pub mod query;
pub mod schema;
pub mod tables;

pub use query::QueryParquetFiles;
pub use schema::GetSchema;
pub use tables::ListTablesInDirectory;

/// rca-agent의 모든 도구가 구현해야 하는 인터페이스입니다.
/// MCP(Model Context Protocol) 표준과 호환되도록 설계되었습니다.
pub trait Tool: Send + Sync {
    /// 도구의 고유 이름 (예: "get_schema")
    fn name(&self) -> &str;

    /// 도구에 대한 설명 (System Prompt에 주입됨)
    fn description(&self) -> &str;

    /// 도구 인자의 JSON Schema
    fn parameters(&self) -> Value;

    /// 도구 실행 로직
    fn execute(&self, args: Value) -> Result<String>;
}

/// Reads a "one path or a list of paths" argument.
pub(crate) fn path_list(args: &Value, key: &str) -> Result<Vec<String>> {
    match &args[key] {
        Value::String(path) => Ok(vec![path.clone()]),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    RcaError::InvalidArguments(format!("'{}' must contain only strings", key))
                })
            })
            .collect(),
        _ => Err(RcaError::InvalidArguments(format!(
            "Missing '{}': expected a path or a list of paths",
            key
        ))),
    }
}

pub(crate) fn paths_schema(description: &str) -> Value {
    serde_json::json!({
        "oneOf": [
            { "type": "string" },
            { "type": "array", "items": { "type": "string" } }
        ],
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_list_accepts_string_or_array() {
        let single = path_list(&json!({"files": "a.parquet"}), "files").unwrap();
        assert_eq!(single, vec!["a.parquet"]);

        let many = path_list(&json!({"files": ["a.parquet", "b.parquet"]}), "files").unwrap();
        assert_eq!(many, vec!["a.parquet", "b.parquet"]);
    }

    #[test]
    fn path_list_rejects_bad_shapes() {
        assert!(path_list(&json!({}), "files").is_err());
        assert!(path_list(&json!({"files": []}), "files").is_err());
        assert!(path_list(&json!({"files": [1, 2]}), "files").is_err());
    }
}
