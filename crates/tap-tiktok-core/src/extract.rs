//! Record extraction strategies.

use std::fmt::Debug;

use serde_json::{Map, Value};

use crate::error::TapError;
use crate::jsonpath::{JsonPath, Segment};

/// A single emitted record.
pub type Record = Map<String, Value>;

/// Where list endpoints put their rows.
pub const RECORDS_PATH: JsonPath =
    JsonPath::new(&[Segment::Key("data"), Segment::Key("list"), Segment::Wildcard]);

/// Turns a parsed response body into records.
pub trait RecordExtractor: Debug + Send + Sync {
    fn extract(&self, body: &Value) -> Result<Vec<Record>, TapError>;
}

/// Emits every object found at `path` unchanged; non-object entries are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListExtractor {
    path: JsonPath,
}

impl ListExtractor {
    pub const fn new(path: JsonPath) -> Self {
        Self { path }
    }
}

impl Default for ListExtractor {
    fn default() -> Self {
        Self::new(RECORDS_PATH)
    }
}

impl RecordExtractor for ListExtractor {
    fn extract(&self, body: &Value) -> Result<Vec<Record>, TapError> {
        Ok(self
            .path
            .select(body)
            .into_iter()
            .filter_map(Value::as_object)
            .cloned()
            .collect())
    }
}

/// Report rows: `{"dimensions": {..}, "metrics": {..}}` flattened into one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlattenReportExtractor {
    rows: ListExtractor,
}

impl FlattenReportExtractor {
    pub const fn new(path: JsonPath) -> Self {
        Self {
            rows: ListExtractor::new(path),
        }
    }
}

impl RecordExtractor for FlattenReportExtractor {
    fn extract(&self, body: &Value) -> Result<Vec<Record>, TapError> {
        self.rows
            .extract(body)?
            .into_iter()
            .map(flatten_report_row)
            .collect()
    }
}

/// Merge `dimensions` then `metrics`; metrics win on key collision.
pub fn flatten_report_row(mut row: Record) -> Result<Record, TapError> {
    let dimensions = take_object(&mut row, "dimensions")?;
    let metrics = take_object(&mut row, "metrics")?;

    let mut flat = dimensions;
    flat.extend(metrics);
    Ok(flat)
}

fn take_object(row: &mut Record, key: &str) -> Result<Record, TapError> {
    match row.remove(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(TapError::MalformedRecord(format!(
            "report row field '{key}' must be an object, got {other}"
        ))),
        None => Err(TapError::MalformedRecord(format!(
            "report row is missing '{key}'"
        ))),
    }
}
