//! HTTP client for the platform's list endpoints.
//!
//! Key responsibilities:
//! - Build the three list queries from one [`EventFilter`].
//! - Authenticate every request with the account sid and auth token.
//! - Follow next-page links until the listing is exhausted or `max_pages` is hit.
//! - Decode non-2xx bodies into [`SourceError::Api`] so the platform's error code
//! reaches the process exit status.
//!
//! There is no retry here. A failed request fails the poll it belongs to.

// Local crates
use crate::{
    helpers::{
        converters::to_query_timestamp,
        load_config::{AccountConfig, ApiConfig},
    },
    source::{
        models::{Alert, AlertPage, ApiErrorBody, Call, CallPage, ListPage, Message, MessagePage},
        source::{EventFilter, EventSource, SourceError},
    },
};

// External crates
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;
use url::Url;

const REST_API_VERSION: &str = "2010-04-01";

/// [`EventSource`] backed by the platform's REST and monitor APIs.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    api_base_url: String,
    monitor_base_url: String,
    page_size: u32,
    max_pages: u32,
}

impl HttpEventSource {
    /// Build a client from the `[account]` and `[api]` configuration tables.
    #[instrument(
        name = "event_watch_source::create",
        target = "source::http::HttpEventSource",
        skip_all,
        level = "debug"
    )]
    pub fn new(account: &AccountConfig, api: &ApiConfig) -> Result<Self, SourceError> {
        let account_sid = account
            .sid
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(SourceError::MissingCredentials("sid", "SID"))?;
        let auth_token = account
            .auth_token
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(SourceError::MissingCredentials("auth_token", "AUTH_TOKEN"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .user_agent(concat!("event-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(
            api_base_url = %api.base_url,
            monitor_base_url = %api.monitor_base_url,
            page_size = api.page_size,
            max_pages = api.max_pages,
            "Created platform HTTP client"
        );

        Ok(Self {
            client,
            account_sid,
            auth_token,
            api_base_url: api.base_url.trim_end_matches('/').to_string(),
            monitor_base_url: api.monitor_base_url.trim_end_matches('/').to_string(),
            page_size: api.page_size,
            max_pages: api.max_pages.max(1),
        })
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/{}.json",
            self.api_base_url, REST_API_VERSION, self.account_sid, resource
        )
    }

    /// Resolve a next-page link against the host that issued it.
    ///
    /// Absolute links are only followed when they point back at `base`'s origin, since
    /// every page request carries the account credentials.
    fn next_page_url(base: &str, link: &str) -> Option<String> {
        if !(link.starts_with("http://") || link.starts_with("https://")) {
            return Some(format!("{}/{}", base, link.trim_start_matches('/')));
        }

        let base_origin = Url::parse(base).ok()?.origin();
        let link_origin = Url::parse(link).ok()?.origin();
        (base_origin == link_origin).then(|| link.to_string())
    }

    /// Fetch every page of one listing, in the order the platform returns them.
    async fn fetch_all<P>(
        &self,
        base: &str,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<Vec<P::Record>, SourceError>
    where
        P: ListPage + DeserializeOwned,
    {
        let mut records = Vec::new();
        let mut pages = 0u32;

        let mut request = self.client.get(&url).query(&query);

        loop {
            let page: P = self.send(request).await?;
            pages += 1;

            let (mut batch, next) = page.into_parts();
            records.append(&mut batch);

            match next.filter(|link| !link.is_empty()) {
                Some(link) if pages < self.max_pages => {
                    let Some(next_url) = Self::next_page_url(base, &link) else {
                        tracing::warn!(
                            next_page = %link,
                            "Next page link leaves the API host, remaining records skipped"
                        );
                        break;
                    };
                    tracing::trace!(next_url = %next_url, pages, "Following next page link");
                    // Next-page links already carry the original query.
                    request = self.client.get(next_url);
                }
                Some(_) => {
                    tracing::warn!(
                        url = %url,
                        max_pages = self.max_pages,
                        "Page limit reached, remaining records skipped"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(records)
    }

    async fn send<P: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<P, SourceError> {
        let response = request
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<P>().await?);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error: ApiErrorBody = serde_json::from_slice(&body).unwrap_or_default();

        tracing::debug!(
            status = status.as_u16(),
            code = ?error.code,
            "Platform API returned an error response"
        );

        Err(SourceError::Api {
            status: error.status.unwrap_or(status.as_u16()),
            code: error.code,
            message: error
                .message
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        })
    }

    fn window_params(
        &self,
        filter: &EventFilter,
        after: &'static str,
        before: &'static str,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            (after, to_query_timestamp(&filter.start_date)),
            ("PageSize", self.page_size.to_string()),
        ];
        if let Some(end) = &filter.end_date {
            query.push((before, to_query_timestamp(end)));
        }
        query
    }
}

impl EventSource for HttpEventSource {
    #[instrument(
        name = "event_watch_source::list_alerts",
        target = "source::http::HttpEventSource",
        skip_all,
        level = "debug"
    )]
    async fn list_alerts(&self, filter: &EventFilter) -> Result<Vec<Alert>, SourceError> {
        let mut query = self.window_params(filter, "StartDate", "EndDate");
        if let Some(level) = filter.log_level {
            query.push(("LogLevel", level.as_str().to_string()));
        }

        let url = format!("{}/v1/Alerts", self.monitor_base_url);
        self.fetch_all::<AlertPage>(&self.monitor_base_url, url, query)
            .await
    }

    #[instrument(
        name = "event_watch_source::list_messages",
        target = "source::http::HttpEventSource",
        skip_all,
        level = "debug"
    )]
    async fn list_messages(&self, filter: &EventFilter) -> Result<Vec<Message>, SourceError> {
        let query = self.window_params(filter, "DateSent>", "DateSent<");
        let url = self.account_url("Messages");
        self.fetch_all::<MessagePage>(&self.api_base_url, url, query)
            .await
    }

    #[instrument(
        name = "event_watch_source::list_calls",
        target = "source::http::HttpEventSource",
        skip_all,
        level = "debug"
    )]
    async fn list_calls(&self, filter: &EventFilter) -> Result<Vec<Call>, SourceError> {
        let query = self.window_params(filter, "StartTime>", "StartTime<");
        let url = self.account_url("Calls");
        self.fetch_all::<CallPage>(&self.api_base_url, url, query)
            .await
    }
}
