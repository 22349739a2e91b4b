use super::QueryFailure;
use datafusion::common::TableReference;
use datafusion::error::Result as DataFusionResult;
use datafusion::prelude::{ParquetReadOptions, SessionConfig, SessionContext};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 입력 경로 목록을 검증하고, 실제로 열 수 있는 경로로 변환합니다.
///
/// Each path is checked twice: as given, then (only when relative) against
/// `data_dir`. The first missing path aborts the whole call.
pub fn resolve_sources(paths: &[String], data_dir: Option<&Path>) -> Result<Vec<PathBuf>, QueryFailure> {
    paths
        .iter()
        .map(|raw| {
            resolve_path(raw, data_dir).ok_or_else(|| QueryFailure::NotFound { path: raw.clone() })
        })
        .collect()
}

/// Returns the first existing location for `raw`, if any.
pub fn resolve_path(raw: &str, data_dir: Option<&Path>) -> Option<PathBuf> {
    let given = PathBuf::from(raw);
    if given.exists() {
        return Some(given);
    }

    if given.is_relative() {
        if let Some(dir) = data_dir {
            let joined = dir.join(&given);
            if joined.exists() {
                return Some(joined);
            }
        }
    }

    None
}

/// Derives one relation name per source: the file stem, suffixed `_1`, `_2`, ...
/// when an earlier source already claimed it.
pub fn relation_names<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();

    paths
        .iter()
        .map(|path| {
            let base = file_stem(path.as_ref());
            let mut name = base.clone();
            let mut counter = 1;
            while taken.contains(&name) {
                name = format!("{}_{}", base, counter);
                counter += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parquet read options that accept the file regardless of its extension.
pub(crate) fn read_options(extension: &str) -> ParquetReadOptions<'_> {
    ParquetReadOptions {
        file_extension: extension,
        ..Default::default()
    }
}

pub(crate) fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Identifiers are matched as written, so a stem like `Abnormal_Logs` resolves
/// unquoted under the same name the tool reports.
fn session_config() -> SessionConfig {
    SessionConfig::new().set_bool("datafusion.sql_parser.enable_ident_normalization", false)
}

/// One query invocation's session with its bound relations.
///
/// The session lives only as long as this value; nothing is shared between calls.
pub struct BoundRelations {
    ctx: SessionContext,
    names: Vec<String>,
}

impl BoundRelations {
    /// Registers every source as a parquet-backed table. Files are scanned lazily
    /// at query time, only their footers are read here.
    pub async fn bind(sources: &[PathBuf]) -> DataFusionResult<Self> {
        let ctx = SessionContext::new_with_config(session_config());
        let names = relation_names(sources);

        for (name, path) in names.iter().zip(sources) {
            let extension = dotted_extension(path);
            let location = path.to_string_lossy().into_owned();
            ctx.register_parquet(
                TableReference::bare(name.as_str()),
                &location,
                read_options(&extension),
            )
            .await?;
            tracing::debug!(relation = %name, path = %path.display(), "registered parquet relation");
        }

        Ok(Self { ctx, names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }
}
