//! HTTP clients for the explorer API
//!
//! Thin typed wrappers over the occurrences, statistics, and chat endpoints.
//! Failures are logged and returned to the caller; there is no retry policy
//! anywhere, and in-flight requests are never cancelled.

pub mod camera;
pub mod chat;
pub mod telemetry;

use crate::data::{Bounds, OccurrencePage, Statistics};
use chat::{ChatReply, ChatRequest, HistoryEntry};
use serde::Deserialize;
use telemetry::Telemetry;

/// Errors from the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {detail}")]
    Endpoint { status: u16, detail: String },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// User-adjustable filters forwarded as occurrence query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub collection_name: String,
    pub state_province: String,
    pub year: String,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.collection_name.trim().is_empty()
            && self.state_province.trim().is_empty()
            && self.year.trim().is_empty()
    }
}

/// Parameters of one occurrences request.
#[derive(Debug, Clone)]
pub struct OccurrenceQuery {
    pub bounds: Bounds,
    pub filters: Filters,
    pub image_only: bool,
    pub page: u32,
    pub page_size: u32,
}

impl OccurrenceQuery {
    /// First page of results for a viewport. Pages are zero-based on the
    /// endpoint (`start = page * pageSize`).
    pub fn first_page(bounds: Bounds, filters: Filters, image_only: bool, page_size: u32) -> Self {
        Self {
            bounds,
            filters,
            image_only,
            page: 0,
            page_size,
        }
    }

    /// Query string pairs in the form the endpoint expects.
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("north", self.bounds.north.to_string()),
            ("south", self.bounds.south.to_string()),
            ("east", self.bounds.east.to_string()),
            ("west", self.bounds.west.to_string()),
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("showOnlyWithImages", self.image_only.to_string()),
        ];
        let trimmed = |s: &str| s.trim().to_string();
        if !self.filters.collection_name.trim().is_empty() {
            params.push(("collectionName", trimmed(&self.filters.collection_name)));
        }
        if !self.filters.state_province.trim().is_empty() {
            params.push(("stateProvince", trimmed(&self.filters.state_province)));
        }
        if !self.filters.year.trim().is_empty() {
            params.push(("year", trimmed(&self.filters.year)));
        }
        params
    }
}

#[derive(Deserialize)]
struct SuggestionsReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct HistoryReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// Client for the explorer API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    telemetry: Telemetry,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, telemetry: Telemetry) -> Result<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(60));
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into(),
            telemetry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Fetch occurrence records for a viewport.
    pub async fn occurrences(&self, query: &OccurrenceQuery) -> Result<OccurrencePage> {
        self.telemetry.record("occurrences_fetch", "issued");
        let result: Result<OccurrencePage> = async {
            let resp = self
                .http
                .get(self.url("occurrences"))
                .query(&query.to_params())
                .send()
                .await?;
            Ok(Self::expect_ok(resp).await?.json().await?)
        }
        .await;
        self.note_outcome("occurrences", result)
    }

    /// Fetch aggregate statistics for the dataset.
    pub async fn statistics(&self) -> Result<Statistics> {
        let result: Result<Statistics> = async {
            let resp = self.http.get(self.url("statistics")).send().await?;
            Ok(Self::expect_ok(resp).await?.json().await?)
        }
        .await;
        self.note_outcome("statistics", result)
    }

    /// Send a chat message (and optional image) to the assistant.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.telemetry.record("chat_send", "issued");
        let result: Result<ChatReply> = async {
            let resp = self
                .http
                .post(self.url("chat"))
                .json(request)
                .send()
                .await?;
            Ok(Self::expect_ok(resp).await?.json().await?)
        }
        .await;
        self.note_outcome("chat", result)
    }

    /// Fetch the default suggestion list.
    pub async fn chat_suggestions(&self) -> Result<Vec<String>> {
        let result: Result<Vec<String>> = async {
            let resp = self.http.get(self.url("chat/suggestions")).send().await?;
            let reply: SuggestionsReply = Self::expect_ok(resp).await?.json().await?;
            Ok(if reply.success {
                reply.suggestions
            } else {
                Vec::new()
            })
        }
        .await;
        self.note_outcome("chat_suggestions", result)
    }

    /// Fetch the transcript stored server-side for a session.
    pub async fn chat_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>> {
        let result: Result<Vec<HistoryEntry>> = async {
            let resp = self
                .http
                .get(self.url("chat/history"))
                .query(&[("session_id", session_id)])
                .send()
                .await?;
            let reply: HistoryReply = Self::expect_ok(resp).await?.json().await?;
            Ok(if reply.success {
                reply.history
            } else {
                Vec::new()
            })
        }
        .await;
        self.note_outcome("chat_history", result)
    }

    /// Clear the server-side transcript for a session.
    pub async fn chat_clear(&self, session_id: &str) -> Result<()> {
        let result: Result<()> = async {
            let resp = self
                .http
                .post(self.url("chat/clear"))
                .json(&serde_json::json!({ "session_id": session_id }))
                .send()
                .await?;
            Self::expect_ok(resp).await?;
            Ok(())
        }
        .await;
        self.note_outcome("chat_clear", result)
    }

    async fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let detail = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            Err(ApiError::Endpoint { status, detail })
        }
    }

    /// Log failures at the service layer before handing them back.
    fn note_outcome<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            tracing::warn!(operation, %error, "api request failed");
            self.telemetry.record("api_error", operation);
        }
        result
    }
}
