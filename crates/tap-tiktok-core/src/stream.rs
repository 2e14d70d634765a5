//! Paginated, per-advertiser HTTP streams.
//!
//! A [`PagedTenantStream`] executes a [`StreamDefinition`]: for every resolved
//! advertiser it walks the endpoint page by page until the definition's
//! pagination strategy returns no token, yielding the records its extractor
//! produces. One request is in flight at a time; nothing is fetched until the
//! consumer pulls.
//!
//! ```rust,ignore
//! let stream = PagedTenantStream::new(definition, config, Arc::new(ReqwestHttpClient::new()));
//! let mut cursor = stream.records(None);
//! while let Some(record) = cursor.next_record().await {
//!     println!("{}", serde_json::to_string(&record?)?);
//! }
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use futures::Stream;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::TapConfig;
use crate::error::TapError;
use crate::extract::{Record, RecordExtractor};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::pagination::PaginationStrategy;
use crate::retry::RetryConfig;
use crate::tenant::{resolve_advertiser_ids, RequestContext};

/// Rows requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Longest response body excerpt kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

/// Static description of one endpoint: where it lives and how to read it.
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    pub name: &'static str,
    /// Path appended to the configured API base URL.
    pub path: &'static str,
    pub primary_keys: &'static [&'static str],
    /// Extra query parameters sent after the common ones.
    pub params: Vec<(String, String)>,
    pub pagination: Arc<dyn PaginationStrategy>,
    pub extractor: Arc<dyn RecordExtractor>,
}

/// Records and continuation token of one fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub next_page: Option<u64>,
}

/// HTTP stream iterating every configured advertiser.
#[derive(Clone)]
pub struct PagedTenantStream {
    definition: StreamDefinition,
    config: Arc<TapConfig>,
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
}

impl PagedTenantStream {
    pub fn new(
        definition: StreamDefinition,
        config: Arc<TapConfig>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        let retry = RetryConfig::exponential(config.max_retries);
        Self {
            definition,
            config,
            http_client,
            retry,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    pub fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.config.api_url.trim_end_matches('/'),
            self.definition.path
        )
    }

    /// Headers sent with every request.
    pub fn http_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let Some(user_agent) = &self.config.user_agent {
            headers.insert(String::from("user-agent"), user_agent.clone());
        }
        headers.insert(
            String::from("content-type"),
            String::from("application/json"),
        );
        headers.insert(
            String::from("access-token"),
            self.config.access_token.clone(),
        );
        headers
    }

    /// Query parameters for one page request.
    pub fn url_params(
        &self,
        context: &RequestContext,
        next_page: Option<u64>,
    ) -> Result<Vec<(String, String)>, TapError> {
        let mut params = vec![(
            String::from("advertiser_id"),
            self.resolve_advertiser_id(context)?,
        )];
        if let Some(page) = next_page {
            params.push((String::from("page"), page.to_string()));
        }
        params.push((String::from("filtering"), self.filtering()));
        params.push((String::from("page_size"), PAGE_SIZE.to_string()));
        params.extend(self.definition.params.iter().cloned());
        Ok(params)
    }

    fn filtering(&self) -> String {
        let status = if self.config.include_deleted {
            "STATUS_ALL"
        } else {
            "STATUS_NOT_DELETE"
        };
        json!({ "primary_status": status }).to_string()
    }

    /// Prefer the context's advertiser; fall back to the first configured one.
    fn resolve_advertiser_id(&self, context: &RequestContext) -> Result<String, TapError> {
        if let Some(advertiser_id) = context.advertiser_id() {
            return Ok(advertiser_id);
        }
        resolve_advertiser_ids(&self.config)?
            .into_iter()
            .next()
            .ok_or_else(|| TapError::config("no advertiser id configured"))
    }

    pub fn build_request(
        &self,
        context: &RequestContext,
        next_page: Option<u64>,
    ) -> Result<HttpRequest, TapError> {
        Ok(HttpRequest::get(self.url())
            .with_headers(self.http_headers())
            .with_query(self.url_params(context, next_page)?)
            .with_timeout_ms(self.config.timeout_ms))
    }

    /// Fetch and parse a single page.
    pub async fn fetch_page(
        &self,
        context: &RequestContext,
        next_page: Option<u64>,
    ) -> Result<Page, TapError> {
        let request = self.build_request(context, next_page)?;
        debug!(
            stream = self.name(),
            advertiser_id = request.query_param("advertiser_id").unwrap_or_default(),
            page = next_page.unwrap_or(1),
            "requesting page"
        );

        let response = self.send_with_retry(request).await?;
        let body: Value = serde_json::from_str(&response.body).map_err(|source| {
            TapError::Decode {
                url: self.url(),
                source,
            }
        })?;
        check_api_code(&body)?;

        let records = self.definition.extractor.extract(&body)?;
        let next_page = self.definition.pagination.next_page_token(&body)?;
        debug!(
            stream = self.name(),
            records = records.len(),
            next_page = ?next_page,
            "page received"
        );
        Ok(Page { records, next_page })
    }

    async fn send_with_retry(&self, request: HttpRequest) -> Result<HttpResponse, TapError> {
        let mut attempt = 0;
        loop {
            match self.http_client.execute(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response)
                    if self.retry.should_retry_status(response.status)
                        && self.retry.has_budget(attempt) =>
                {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        stream = self.name(),
                        status = response.status,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after upstream status"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    return Err(TapError::Status {
                        status: response.status,
                        url: request.url.clone(),
                        body: truncate(&response.body, ERROR_BODY_LIMIT),
                    });
                }
                Err(error)
                    if self.retry.should_retry_error(&error) && self.retry.has_budget(attempt) =>
                {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        stream = self.name(),
                        error = error.message(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transport error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(TapError::Http(error)),
            }
            attempt += 1;
        }
    }

    /// Lazy, single-pass cursor over all advertisers' records.
    ///
    /// `parent` is copied into every per-advertiser context. Advertisers are
    /// resolved on the first pull, so a configuration error is the first item.
    pub fn records(&self, parent: Option<RequestContext>) -> RecordCursor<'_> {
        RecordCursor {
            stream: self,
            parent: parent.unwrap_or_default(),
            advertisers: None,
            cycle: None,
            buffer: VecDeque::new(),
            emitted: 0,
            finished: false,
        }
    }
}

/// Pagination state for the advertiser currently being read.
#[derive(Debug)]
struct PageCycle {
    context: RequestContext,
    next_page: Option<u64>,
}

/// Pull-based record sequence produced by [`PagedTenantStream::records`].
///
/// After an error is yielded the cursor is exhausted.
pub struct RecordCursor<'a> {
    stream: &'a PagedTenantStream,
    parent: RequestContext,
    advertisers: Option<VecDeque<String>>,
    cycle: Option<PageCycle>,
    buffer: VecDeque<Record>,
    emitted: u64,
    finished: bool,
}

impl<'a> RecordCursor<'a> {
    pub async fn next_record(&mut self) -> Option<Result<Record, TapError>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                self.emitted += 1;
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }

            if self.advertisers.is_none() {
                match resolve_advertiser_ids(&self.stream.config) {
                    Ok(ids) => self.advertisers = Some(ids.into()),
                    Err(error) => return Some(Err(self.fail(error))),
                }
            }

            let Some(cycle) = self.cycle.as_mut() else {
                let next = self.advertisers.as_mut().and_then(VecDeque::pop_front);
                match next {
                    Some(advertiser_id) => {
                        info!(
                            stream = self.stream.name(),
                            advertiser_id = advertiser_id.as_str(),
                            "syncing advertiser"
                        );
                        self.cycle = Some(PageCycle {
                            context: self.parent.for_advertiser(advertiser_id),
                            next_page: None,
                        });
                    }
                    None => {
                        info!(
                            stream = self.stream.name(),
                            records = self.emitted,
                            "stream complete"
                        );
                        self.finished = true;
                    }
                }
                continue;
            };

            let fetched = self.stream.fetch_page(&cycle.context, cycle.next_page).await;
            match fetched {
                Ok(page) => {
                    self.buffer.extend(page.records);
                    match page.next_page {
                        Some(token) => cycle.next_page = Some(token),
                        None => self.cycle = None,
                    }
                }
                Err(error) => return Some(Err(self.fail(error))),
            }
        }
    }

    fn fail(&mut self, error: TapError) -> TapError {
        warn!(stream = self.stream.name(), error = %error, "stream failed");
        self.finished = true;
        self.cycle = None;
        self.buffer.clear();
        error
    }

    /// Adapt the cursor into a `futures::Stream`.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record, TapError>> + 'a {
        futures::stream::unfold(self, |mut cursor| async move {
            cursor.next_record().await.map(|item| (item, cursor))
        })
    }
}

fn check_api_code(body: &Value) -> Result<(), TapError> {
    match body.get("code").and_then(Value::as_i64) {
        Some(code) if code != 0 => Err(TapError::Api {
            code,
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned(),
        }),
        _ => Ok(()),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_owned(),
    }
}
