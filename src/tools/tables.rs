use super::Tool;
use crate::error::Result;
use crate::query::binder::resolve_path;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

pub struct ListTablesInDirectory {
    data_dir: Option<PathBuf>,
}

impl ListTablesInDirectory {
    pub fn new() -> Self {
        Self { data_dir: None }
    }

    /// Relative directories that don't exist as given are retried under `dir`.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Sorted `*.parquet` file names in `directory`, as pretty JSON.
    pub fn list(&self, directory: &str) -> String {
        let Some(path) = resolve_path(directory, self.data_dir.as_deref()) else {
            return format!("Error: Directory '{}' does not exist.", directory);
        };

        // 디렉토리 읽기
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) => return format!("Error listing files: {}", e),
        };

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let file_name = entry.file_name().to_string_lossy().to_string();
                    if file_name.ends_with(".parquet") {
                        files.push(file_name);
                    }
                }
                Err(e) => return format!("Error listing files: {}", e),
            }
        }
        files.sort();
        tracing::info!(directory = %path.display(), count = files.len(), "listed parquet tables");

        serde_json::to_string_pretty(&files).unwrap_or_else(|e| format!("Error listing files: {}", e))
    }
}

impl Default for ListTablesInDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ListTablesInDirectory {
    fn name(&self) -> &str {
        "list_tables_in_directory"
    }

    fn description(&self) -> &str {
        "List all parquet files in the given directory. Returns a JSON list of parquet file names."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory path to search for .parquet files (default is '.')"
                }
            },
            "required": ["directory"]
        })
    }

    fn execute(&self, args: Value) -> Result<String> {
        // 인자 파싱 (없으면 현재 디렉토리)
        let directory = args["directory"].as_str().unwrap_or(".");
        Ok(self.list(directory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_parquet_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["normal_logs.parquet", "abnormal_logs.parquet", "notes.txt", "data.parquet.tmp"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.parquet.d")).unwrap();

        let out = ListTablesInDirectory::new().list(&dir.path().to_string_lossy());
        let names: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(names, vec!["abnormal_logs.parquet", "normal_logs.parquet"]);
    }

    #[test]
    fn missing_directory_is_reported_in_band() {
        let out = ListTablesInDirectory::new().list("/definitely/not/here");
        assert_eq!(out, "Error: Directory '/definitely/not/here' does not exist.");
    }

    #[test]
    fn relative_directory_resolves_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("ts0")).unwrap();
        fs::write(dir.path().join("ts0").join("traces.parquet"), b"").unwrap();

        let tool = ListTablesInDirectory::new().with_data_dir(dir.path());
        let out = tool.execute(json!({"directory": "ts0"})).unwrap();
        assert!(out.contains("traces.parquet"));
    }

    #[test]
    fn empty_directory_gives_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let out = ListTablesInDirectory::new().list(&dir.path().to_string_lossy());
        assert_eq!(out, "[]");
    }
}
