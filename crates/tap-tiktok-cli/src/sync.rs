use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;
use tap_tiktok_core::{streams, HttpClient, MessageWriter, PagedTenantStream, TapConfig};
use tracing::info;

use crate::error::CliError;

/// Sync the selected streams in order, writing one record message per line.
///
/// Returns the number of records written.
pub async fn run<W: Write>(
    config: Arc<TapConfig>,
    stream_names: &[String],
    http_client: Arc<dyn HttpClient>,
    output: W,
) -> Result<u64, CliError> {
    let definitions = streams::select_definitions(&config, stream_names)?;
    let mut writer = MessageWriter::new(output);

    for definition in definitions {
        let stream = PagedTenantStream::new(definition, config.clone(), http_client.clone());
        info!(
            stream = stream.name(),
            url = %stream.url(),
            primary_keys = ?stream.definition().primary_keys,
            "starting stream"
        );

        let records = stream.records(None).into_stream();
        futures::pin_mut!(records);
        while let Some(record) = records.next().await {
            writer.write_record(stream.name(), record?)?;
        }
    }

    Ok(writer.written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use serde_json::{json, Value};
    use tap_tiktok_core::{HttpError, HttpRequest, HttpResponse, TapError};

    #[derive(Debug)]
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<HttpResponse>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedHttpClient {
        fn new(bodies: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(
                    bodies
                        .into_iter()
                        .map(|body| HttpResponse::ok_json(body.to_string()))
                        .collect(),
                ),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.urls
                .lock()
                .expect("url store should not be poisoned")
                .push(request.url.clone());
            let response = self
                .responses
                .lock()
                .expect("response script should not be poisoned")
                .pop_front()
                .ok_or_else(|| HttpError::non_retryable("script exhausted"));
            Box::pin(async move { response })
        }
    }

    fn single_page(list: Value) -> Value {
        json!({ "code": 0, "data": { "list": list, "page_info": { "page": 1, "total_page": 1 } } })
    }

    #[tokio::test]
    async fn writes_records_for_selected_streams_in_order() {
        let config = Arc::new(
            TapConfig::new("tok")
                .with_advertiser_id("adv")
                .with_api_url("https://example.test/v1.3"),
        );
        let client = Arc::new(ScriptedHttpClient::new(vec![
            single_page(json!([{ "ad_id": "a1" }])),
            single_page(json!([{ "campaign_id": "c1" }, { "campaign_id": "c2" }])),
        ]));

        let mut output = Vec::new();
        let written = run(
            config,
            &[String::from("ads"), String::from("campaigns")],
            client.clone(),
            &mut output,
        )
        .await
        .expect("sync succeeds");

        assert_eq!(written, 3);
        let lines: Vec<Value> = String::from_utf8(output)
            .expect("utf8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines[0]["stream"], json!("ads"));
        assert_eq!(lines[2]["record"]["campaign_id"], json!("c2"));

        let urls = client.urls.lock().expect("url store").clone();
        assert_eq!(
            urls,
            vec![
                "https://example.test/v1.3/ad/get/",
                "https://example.test/v1.3/campaign/get/"
            ]
        );
    }

    #[tokio::test]
    async fn unknown_stream_fails_before_any_request() {
        let config = Arc::new(TapConfig::new("tok").with_advertiser_id("adv"));
        let client = Arc::new(ScriptedHttpClient::new(Vec::new()));

        let error = run(config, &[String::from("pixels")], client.clone(), Vec::new())
            .await
            .expect_err("unknown stream");

        assert!(matches!(error, CliError::Tap(TapError::UnknownStream(_))));
        assert!(client.urls.lock().expect("url store").is_empty());
    }

    #[tokio::test]
    async fn config_file_drives_sync() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"access_token":"tok","advertiser_ids":["a","b"],"api_url":"https://example.test"}"#,
        )
        .expect("write config");
        let config = Arc::new(TapConfig::from_path(&path).expect("valid config"));
        let client = Arc::new(ScriptedHttpClient::new(vec![
            single_page(json!([{ "adgroup_id": "g1" }])),
            single_page(json!([{ "adgroup_id": "g2" }])),
        ]));

        let written = run(config, &[String::from("ad_groups")], client, Vec::new())
            .await
            .expect("sync succeeds");

        assert_eq!(written, 2);
    }
}
