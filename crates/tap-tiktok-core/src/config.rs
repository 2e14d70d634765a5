//! Tap configuration.
//!
//! Configuration is read from a Singer-style JSON file:
//!
//! ```json
//! {
//!   "access_token": "xxx",
//!   "advertiser_ids": ["7012345678901234567", 7098765432109876543],
//!   "include_deleted": false,
//!   "user_agent": "my-pipeline/1.0",
//!   "start_date": "2024-01-01",
//!   "end_date": "2024-01-31"
//! }
//! ```
//!
//! `access_token` may be omitted from the file when `TAP_TIKTOK_ACCESS_TOKEN`
//! is set in the environment.

use std::fmt::{Debug, Formatter};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::TapError;
use crate::tenant::coerce_id;

/// Base URL of the TikTok Business API.
pub const DEFAULT_API_URL: &str = "https://business-api.tiktok.com/open_api/v1.3";

/// Environment variable consulted when the config file carries no token.
pub const ACCESS_TOKEN_ENV: &str = "TAP_TIKTOK_ACCESS_TOKEN";

#[derive(Deserialize)]
struct RawConfig {
    access_token: Option<Value>,
    advertiser_ids: Option<Value>,
    advertiser_id: Option<Value>,
    include_deleted: Option<Value>,
    user_agent: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    api_url: Option<String>,
    timeout_ms: Option<u64>,
    max_retries: Option<u32>,
}

/// Immutable tap configuration shared by every stream of a run.
#[derive(Clone, PartialEq)]
pub struct TapConfig {
    pub access_token: String,
    /// Raw `advertiser_ids` entries; strings, numbers and nulls are accepted.
    pub advertiser_ids: Option<Vec<Value>>,
    pub advertiser_id: Option<Value>,
    pub include_deleted: bool,
    pub user_agent: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub api_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl TapConfig {
    /// Minimal configuration with defaults for every optional key.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            advertiser_ids: None,
            advertiser_id: None,
            include_deleted: false,
            user_agent: None,
            start_date: None,
            end_date: None,
            api_url: DEFAULT_API_URL.to_owned(),
            timeout_ms: 30_000,
            max_retries: 4,
        }
    }

    pub fn with_advertiser_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.advertiser_ids = Some(ids.into_iter().map(|id| Value::String(id.into())).collect());
        self
    }

    pub fn with_advertiser_id(mut self, id: impl Into<String>) -> Self {
        self.advertiser_id = Some(Value::String(id.into()));
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TapError::config(format!("cannot read config file '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, TapError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TapError::config(format!("config is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, TapError> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| TapError::config(format!("invalid config: {e}")))?;

        let access_token = raw
            .access_token
            .as_ref()
            .and_then(coerce_id)
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                TapError::config(format!(
                    "missing `access_token` (set it in the config file or {ACCESS_TOKEN_ENV})"
                ))
            })?;

        let start_date = raw.start_date.as_deref().map(parse_date).transpose()?;
        let end_date = raw.end_date.as_deref().map(parse_date).transpose()?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(TapError::config(format!(
                    "start_date {} is after end_date {}",
                    format_date(start),
                    format_date(end)
                )));
            }
        }

        let defaults = Self::new(String::new());
        Ok(Self {
            access_token,
            advertiser_ids: match raw.advertiser_ids {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            },
            advertiser_id: raw.advertiser_id,
            include_deleted: raw.include_deleted.as_ref().is_some_and(is_truthy),
            user_agent: raw.user_agent,
            start_date,
            end_date,
            api_url: raw
                .api_url
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.api_url),
            timeout_ms: raw.timeout_ms.unwrap_or(defaults.timeout_ms),
            max_retries: raw.max_retries.unwrap_or(defaults.max_retries),
        })
    }

    /// Report date window; missing bounds default to the current UTC date.
    pub fn report_window(&self) -> (Date, Date) {
        let today = OffsetDateTime::now_utc().date();
        let end = self.end_date.unwrap_or(today);
        let start = self.start_date.unwrap_or(end);
        (start, end)
    }
}

impl Debug for TapConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("access_token", &"<redacted>")
            .field("advertiser_ids", &self.advertiser_ids)
            .field("advertiser_id", &self.advertiser_id)
            .field("include_deleted", &self.include_deleted)
            .field("user_agent", &self.user_agent)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("api_url", &self.api_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// JSON truthiness: null, false, zero, empty strings and empty containers are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date, TapError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| TapError::config(format!("invalid date '{value}', expected YYYY-MM-DD: {e}")))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::Month;

    #[test]
    fn defaults_are_applied() {
        let config = TapConfig::from_value(json!({
            "access_token": "tok",
            "advertiser_id": "123"
        }))
        .expect("valid config");

        assert_eq!(config.access_token, "tok");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.include_deleted);
        assert!(config.user_agent.is_none());
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.max_retries, 4);
    }

    #[test]
    fn dates_are_parsed() {
        let config = TapConfig::from_value(json!({
            "access_token": "tok",
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        }))
        .expect("valid config");

        assert_eq!(
            config.report_window(),
            (
                Date::from_calendar_date(2024, Month::January, 1).expect("date"),
                Date::from_calendar_date(2024, Month::January, 31).expect("date"),
            )
        );
    }

    #[test]
    fn inverted_date_window_is_rejected() {
        let error = TapConfig::from_value(json!({
            "access_token": "tok",
            "start_date": "2024-02-01",
            "end_date": "2024-01-01"
        }))
        .expect_err("inverted window");

        assert!(matches!(error, TapError::Config(_)));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let error = TapConfig::from_value(json!({
            "access_token": "tok",
            "start_date": "01/02/2024"
        }))
        .expect_err("bad date");

        assert!(error.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn unrecognised_keys_are_ignored() {
        let config = TapConfig::from_value(json!({
            "access_token": "tok",
            "advertiser_id": "123",
            "state_file": "state.json"
        }))
        .expect("extra keys are tolerated");

        assert_eq!(config.advertiser_id, Some(json!("123")));
    }

    #[test]
    fn api_url_trailing_slash_is_trimmed() {
        let config = TapConfig::from_value(json!({
            "access_token": "tok",
            "api_url": "http://127.0.0.1:8080/open_api/v1.3/"
        }))
        .expect("valid config");

        assert_eq!(config.api_url, "http://127.0.0.1:8080/open_api/v1.3");
    }

    #[test]
    fn include_deleted_follows_json_truthiness() {
        for (flag, expected) in [
            (json!(null), false),
            (json!(false), false),
            (json!(0), false),
            (json!(""), false),
            (json!(true), true),
            (json!(1), true),
            (json!("yes"), true),
        ] {
            let config = TapConfig::from_value(json!({
                "access_token": "tok",
                "include_deleted": flag.clone()
            }))
            .expect("valid config");
            assert_eq!(config.include_deleted, expected, "include_deleted = {flag}");
        }
    }

    #[test]
    fn numeric_access_token_is_rendered_as_text() {
        let config = TapConfig::from_value(json!({ "access_token": 12345 })).expect("valid config");
        assert_eq!(config.access_token, "12345");
    }

    #[test]
    fn non_list_advertiser_ids_is_treated_as_absent() {
        let config = TapConfig::from_value(json!({
            "access_token": "tok",
            "advertiser_ids": "123",
            "advertiser_id": "456"
        }))
        .expect("valid config");

        assert_eq!(config.advertiser_ids, None);
        assert_eq!(config.advertiser_id, Some(json!("456")));
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = TapConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn format_date_round_trips_parse() {
        let date = parse_date("2024-03-09").expect("valid");
        assert_eq!(format_date(date), "2024-03-09");
    }
}
