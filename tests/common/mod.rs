#![allow(dead_code)]

use datafusion::arrow::array::{
    ArrayRef, Int64Array, RecordBatch, StringArray, StructArray, TimestampMicrosecondArray,
};
use datafusion::arrow::datatypes::{DataType, Field, TimeUnit};
use datafusion::parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 2025-07-23T14:10:23Z
pub const ABNORMAL_START_MICROS: i64 = 1_753_279_823_000_000;

pub fn write_parquet(path: &Path, batch: &RecordBatch) -> PathBuf {
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
    path.to_path_buf()
}

/// Six log rows, ten seconds apart: three ERROR from ts-food-service, two INFO
/// from ts-order-service, one WARN from ts-user-service.
pub fn logs_batch() -> RecordBatch {
    let times: Vec<i64> = (0..6).map(|i| ABNORMAL_START_MICROS + i * 10_000_000).collect();
    let services = vec![
        "ts-food-service",
        "ts-order-service",
        "ts-food-service",
        "ts-user-service",
        "ts-food-service",
        "ts-order-service",
    ];
    let levels = vec!["ERROR", "INFO", "ERROR", "WARN", "ERROR", "INFO"];
    let latency: Vec<i64> = vec![950, 12, 1200, 40, 870, 15];

    let seen_at: ArrayRef = Arc::new(TimestampMicrosecondArray::from(times.clone()));
    let codes: ArrayRef = Arc::new(Int64Array::from(vec![500, 200, 503, 429, 500, 200]));
    let detail = StructArray::from(vec![
        (
            Arc::new(Field::new(
                "seen_at",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            )),
            seen_at,
        ),
        (Arc::new(Field::new("code", DataType::Int64, false)), codes),
    ]);

    RecordBatch::try_from_iter(vec![
        ("ts", Arc::new(TimestampMicrosecondArray::from(times)) as ArrayRef),
        ("service_name", Arc::new(StringArray::from(services)) as ArrayRef),
        ("level", Arc::new(StringArray::from(levels)) as ArrayRef),
        ("latency_ms", Arc::new(Int64Array::from(latency)) as ArrayRef),
        ("detail", Arc::new(detail) as ArrayRef),
    ])
    .unwrap()
}

/// `rows` rows of `id` plus a 120-character `payload`.
pub fn wide_batch(rows: i64) -> RecordBatch {
    let ids: Vec<i64> = (0..rows).collect();
    let payloads: Vec<String> = (0..rows).map(|i| format!("{:0>120}", i)).collect();

    RecordBatch::try_from_iter(vec![
        ("id", Arc::new(Int64Array::from(ids)) as ArrayRef),
        ("payload", Arc::new(StringArray::from(payloads)) as ArrayRef),
    ])
    .unwrap()
}

pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
