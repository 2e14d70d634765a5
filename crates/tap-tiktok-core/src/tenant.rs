//! Advertiser (tenant) resolution and per-tenant request context.

use serde_json::{Map, Value};

use crate::config::TapConfig;
use crate::error::TapError;

/// Context key carrying the active advertiser.
pub const ADVERTISER_ID_KEY: &str = "advertiser_id";

/// Resolve the ordered advertiser ids a run iterates over.
///
/// `advertiser_ids` wins over `advertiser_id` when it yields at least one
/// usable entry. Null and blank entries are skipped; numbers are rendered
/// as their decimal text.
pub fn resolve_advertiser_ids(config: &TapConfig) -> Result<Vec<String>, TapError> {
    if let Some(entries) = config.advertiser_ids.as_deref() {
        let ids: Vec<String> = entries.iter().filter_map(coerce_id).collect();
        if !ids.is_empty() {
            return Ok(ids);
        }
    }

    if let Some(id) = config.advertiser_id.as_ref().and_then(coerce_id) {
        return Ok(vec![id]);
    }

    Err(TapError::config(
        "Missing advertiser_id(s). Set `advertiser_ids` (list) or `advertiser_id` (string).",
    ))
}

/// String form of a scalar setting; `None` for null or blank values.
pub(crate) fn coerce_id(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Context handed to a single page-fetch cycle.
///
/// Carries the parent stream context plus the active advertiser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    values: Map<String, Value>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Copy of this context scoped to `advertiser_id`.
    pub fn for_advertiser(&self, advertiser_id: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values.insert(
            ADVERTISER_ID_KEY.to_owned(),
            Value::String(advertiser_id.into()),
        );
        Self { values }
    }

    /// Active advertiser, if the context carries a non-empty one.
    pub fn advertiser_id(&self) -> Option<String> {
        self.values.get(ADVERTISER_ID_KEY).and_then(coerce_id)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}
