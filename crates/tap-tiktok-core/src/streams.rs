//! Stream catalogue.
//!
//! | Stream | Endpoint | Shape |
//! |--------|----------|-------|
//! | `campaigns` | `/campaign/get/` | entity list |
//! | `ad_groups` | `/adgroup/get/` | entity list |
//! | `ads` | `/ad/get/` | entity list |
//! | `campaign_daily_report` | `/report/integrated/get/` | flattened report rows |

use std::sync::Arc;

use serde_json::json;

use crate::config::{format_date, TapConfig};
use crate::error::TapError;
use crate::extract::{FlattenReportExtractor, ListExtractor};
use crate::pagination::{DefaultingPagination, StrictPagination};
use crate::stream::StreamDefinition;

pub const CAMPAIGNS: &str = "campaigns";
pub const AD_GROUPS: &str = "ad_groups";
pub const ADS: &str = "ads";
pub const CAMPAIGN_DAILY_REPORT: &str = "campaign_daily_report";

/// Every stream name, in sync order.
pub const STREAM_NAMES: &[&str] = &[CAMPAIGNS, AD_GROUPS, ADS, CAMPAIGN_DAILY_REPORT];

/// Metrics requested by the daily campaign report.
pub const REPORT_METRICS: &[&str] = &[
    "spend",
    "impressions",
    "clicks",
    "ctr",
    "cpc",
    "cpm",
    "reach",
    "conversion",
    "cost_per_conversion",
];

const REPORT_DIMENSIONS: &[&str] = &["campaign_id", "stat_time_day"];

fn entity(
    name: &'static str,
    path: &'static str,
    primary_keys: &'static [&'static str],
) -> StreamDefinition {
    StreamDefinition {
        name,
        path,
        primary_keys,
        params: Vec::new(),
        pagination: Arc::new(DefaultingPagination::default()),
        extractor: Arc::new(ListExtractor::default()),
    }
}

fn campaign_daily_report(config: &TapConfig) -> StreamDefinition {
    let (start, end) = config.report_window();
    StreamDefinition {
        name: CAMPAIGN_DAILY_REPORT,
        path: "/report/integrated/get/",
        primary_keys: REPORT_DIMENSIONS,
        params: vec![
            (String::from("report_type"), String::from("BASIC")),
            (String::from("data_level"), String::from("AUCTION_CAMPAIGN")),
            (String::from("dimensions"), json!(REPORT_DIMENSIONS).to_string()),
            (String::from("metrics"), json!(REPORT_METRICS).to_string()),
            (String::from("start_date"), format_date(start)),
            (String::from("end_date"), format_date(end)),
        ],
        pagination: Arc::new(StrictPagination::default()),
        extractor: Arc::new(FlattenReportExtractor::default()),
    }
}

/// Definitions for every stream.
pub fn all_definitions(config: &TapConfig) -> Vec<StreamDefinition> {
    vec![
        entity(CAMPAIGNS, "/campaign/get/", &["campaign_id"]),
        entity(AD_GROUPS, "/adgroup/get/", &["adgroup_id"]),
        entity(ADS, "/ad/get/", &["ad_id"]),
        campaign_daily_report(config),
    ]
}

/// Definitions for the named streams, in the requested order.
///
/// An empty selection means every stream.
pub fn select_definitions(
    config: &TapConfig,
    names: &[String],
) -> Result<Vec<StreamDefinition>, TapError> {
    let all = all_definitions(config);
    if names.is_empty() {
        return Ok(all);
    }

    names
        .iter()
        .map(|name| {
            all.iter()
                .find(|definition| definition.name == name.as_str())
                .cloned()
                .ok_or_else(|| TapError::UnknownStream(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_date;

    #[test]
    fn catalogue_matches_stream_names() {
        let names: Vec<&str> = all_definitions(&TapConfig::new("tok"))
            .iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(names, STREAM_NAMES);
    }

    #[test]
    fn selection_preserves_requested_order() {
        let selected = select_definitions(
            &TapConfig::new("tok"),
            &[String::from(ADS), String::from(CAMPAIGNS)],
        )
        .expect("known streams");

        let names: Vec<&str> = selected.iter().map(|definition| definition.name).collect();
        assert_eq!(names, vec![ADS, CAMPAIGNS]);
    }

    #[test]
    fn unknown_stream_is_rejected() {
        let error = select_definitions(&TapConfig::new("tok"), &[String::from("creatives")])
            .expect_err("unknown stream");
        assert!(matches!(error, TapError::UnknownStream(name) if name == "creatives"));
    }

    #[test]
    fn report_params_carry_date_window() {
        let mut config = TapConfig::new("tok");
        config.start_date = Some(parse_date("2024-01-01").expect("date"));
        config.end_date = Some(parse_date("2024-01-07").expect("date"));

        let report = campaign_daily_report(&config);
        let param = |key: &str| {
            report
                .params
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };

        assert_eq!(report.path, "/report/integrated/get/");
        assert_eq!(param("start_date").as_deref(), Some("2024-01-01"));
        assert_eq!(param("end_date").as_deref(), Some("2024-01-07"));
        assert_eq!(
            param("dimensions").as_deref(),
            Some(r#"["campaign_id","stat_time_day"]"#)
        );
    }
}
