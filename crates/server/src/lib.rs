//! HTTP front end for the glean matching engine.
//!
//! Routes:
//!
//! - `GET /` usage message
//! - `GET /health` liveness probe
//! - `POST /clean` line-oriented text of a document
//! - `POST /match` keyword matching over a document's content blocks
//!
//! Every error is returned as `{"error": message}`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use glean_core::{
    CountMode, DEFAULT_MAX_INPUT_BYTES, DiscoveryPolicy, Extractor, GleanError, MatchConfig, MatchResult, ResultShape,
    SnippetLimit, TextMode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;
use uuid::Uuid;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `GLEAN_ADDR` (default: `0.0.0.0:5000`)
    pub addr: SocketAddr,
    /// `GLEAN_MAX_BODY_BYTES` (default: 6 MiB)
    pub max_body_bytes: usize,
    /// `GLEAN_REQUEST_TIMEOUT_SECS` (default: 30)
    pub request_timeout: Duration,
    /// Largest document handed to the engine
    pub max_input_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_body_bytes: 6 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(addr) = parse_var(&lookup, "GLEAN_ADDR") {
            config.addr = addr;
        }
        if let Some(bytes) = parse_var(&lookup, "GLEAN_MAX_BODY_BYTES") {
            config.max_body_bytes = bytes;
        }
        if let Some(secs) = parse_var(&lookup, "GLEAN_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid environment variable");
            None
        }
    }
}

/// Build the router with all middleware attached.
pub fn app(config: ServerConfig) -> Router {
    let state = Arc::new(config);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/clean", post(clean))
        .route("/match", post(match_keywords))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, state.request_timeout))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(state)
}

/// Error response with a status code chosen by error class.
#[derive(Debug)]
pub enum ApiError {
    Engine(GleanError),
    /// Body could not be decoded as the expected JSON
    BadBody(StatusCode, String),
}

impl From<GleanError> for ApiError {
    fn from(err: GleanError) -> Self {
        Self::Engine(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::BadBody(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadBody(status, message) => (status, message),
            Self::Engine(err) => match err {
                GleanError::Validation(_) | GleanError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                GleanError::ResourceLimit { .. } => (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()),
                GleanError::Parse(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
                GleanError::Internal(detail) => {
                    tracing::error!(error = %detail, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal processing error".to_string())
                }
            },
        };

        if status.is_client_error() {
            tracing::debug!(%status, error = %message, "rejected request");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Body of `POST /clean`. `html` is checked by hand so a missing or
/// non-string field gets a specific message.
#[derive(Debug, Deserialize)]
pub struct CleanRequest {
    #[serde(default)]
    pub html: Option<Value>,
}

impl CleanRequest {
    /// The document to clean.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError::BadBody`] when `html` is missing, null or
    /// not a string.
    pub fn into_html(self) -> Result<String, ApiError> {
        match self.html {
            None | Some(Value::Null) => {
                Err(ApiError::BadBody(StatusCode::BAD_REQUEST, "Missing 'html' field in request body".to_string()))
            }
            Some(Value::String(html)) => Ok(html),
            Some(_) => Err(ApiError::BadBody(StatusCode::BAD_REQUEST, "'html' must be a string".to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CleanResponse {
    #[serde(rename = "cleanText")]
    pub clean_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(alias = "html")]
    pub document: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub options: MatchOptions,
}

/// Caller-facing matching options.
///
/// `mode` picks the preset; every other field overrides it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchOptions {
    pub mode: ResultShape,
    pub discovery_policy: Option<DiscoveryPolicy>,
    pub match_threshold: Option<usize>,
    pub count_mode: Option<CountMode>,
    pub text_mode: Option<TextMode>,
    /// Shorthand for `text_mode: "strict"`
    pub strict_text: Option<bool>,
    pub count_heading: Option<bool>,
    pub want_date: Option<bool>,
    pub snippet_limit: Option<SnippetLimit>,
    pub base_url: Option<String>,
    pub max_blocks_per_pass: Option<usize>,
    pub accumulate_passes: Option<bool>,
    pub date_window: Option<usize>,
}

impl MatchOptions {
    /// Engine configuration for these options.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::InvalidUrl`] for an unparseable `base_url`.
    pub fn into_config(self, max_input_bytes: usize) -> Result<MatchConfig, GleanError> {
        let mut config = match self.mode {
            ResultShape::BestMatch => MatchConfig::best_match(),
            ResultShape::AllMatches => MatchConfig::all_matches(),
        };
        config.max_input_bytes = max_input_bytes;

        if let Some(value) = self.discovery_policy {
            config.discovery_policy = value;
        }
        if let Some(value) = self.match_threshold {
            config.match_threshold = value;
        }
        if let Some(value) = self.count_mode {
            config.count_mode = value;
        }
        if let Some(value) = self.text_mode {
            config.text_mode = value;
        }
        if let Some(strict) = self.strict_text {
            config.text_mode = if strict { TextMode::Strict } else { TextMode::Standard };
        }
        if let Some(value) = self.count_heading {
            config.count_heading = value;
        }
        if let Some(value) = self.want_date {
            config.want_date = value;
        }
        if let Some(value) = self.snippet_limit {
            config.snippet_limit = value;
        }
        if let Some(value) = self.max_blocks_per_pass {
            config.max_blocks_per_pass = value;
        }
        if let Some(value) = self.accumulate_passes {
            config.accumulate_passes = value;
        }
        if let Some(value) = self.date_window {
            config.date_window = value;
        }
        if let Some(base) = self.base_url.filter(|base| !base.trim().is_empty()) {
            config.base_url = Some(Url::parse(base.trim())?);
        }

        Ok(config)
    }
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Glean keyword matching API",
        "usage": "POST /match with {\"document\", \"keywords\", \"options\"}, or POST /clean with {\"html\"}",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

async fn clean(
    State(config): State<Arc<ServerConfig>>, payload: Result<Json<CleanRequest>, JsonRejection>,
) -> Result<Json<CleanResponse>, ApiError> {
    let Json(request) = payload?;
    let html = request.into_html()?;
    let extractor = Extractor::with_config(MatchConfig::builder().max_input_bytes(config.max_input_bytes).build());

    let clean_text = run_blocking(move || extractor.clean(&html)).await?;
    Ok(Json(CleanResponse { clean_text }))
}

async fn match_keywords(
    State(config): State<Arc<ServerConfig>>, payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResult>, ApiError> {
    let Json(request) = payload?;
    let extractor = Extractor::with_config(request.options.into_config(config.max_input_bytes)?);
    let (document, keywords) = (request.document, request.keywords);

    let result = run_blocking(move || extractor.run(&document, &keywords)).await?;
    Ok(Json(result))
}

/// Parsing is CPU-bound and the tree is not `Send`, so each run gets a
/// blocking thread of its own.
async fn run_blocking<T, F>(job: F) -> Result<T, GleanError>
where
    F: FnOnce() -> Result<T, GleanError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| GleanError::Internal(format!("matching task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_server_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("GLEAN_ADDR", "127.0.0.1:8080"),
            ("GLEAN_MAX_BODY_BYTES", "1024"),
            ("GLEAN_REQUEST_TIMEOUT_SECS", "not a number"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_options_default_to_best_match() {
        let config = MatchOptions::default().into_config(1024).unwrap();
        assert_eq!(config.result_shape, ResultShape::BestMatch);
        assert_eq!(config.match_threshold, 1);
        assert_eq!(config.max_input_bytes, 1024);
    }

    #[test]
    fn test_options_override_preset() {
        let options: MatchOptions = serde_json::from_value(json!({
            "mode": "all_matches",
            "match_threshold": 3,
            "count_mode": "whole_word",
            "text_mode": "strict",
            "snippet_limit": {"chars": 400},
            "discovery_policy": "semantic_first",
            "base_url": "https://example.com/news/",
        }))
        .unwrap();

        let config = options.into_config(DEFAULT_MAX_INPUT_BYTES).unwrap();
        assert_eq!(config.result_shape, ResultShape::AllMatches);
        assert_eq!(config.match_threshold, 3);
        assert_eq!(config.count_mode, CountMode::WholeWord);
        assert_eq!(config.text_mode, TextMode::Strict);
        assert_eq!(config.snippet_limit, SnippetLimit::Chars(400));
        assert_eq!(config.discovery_policy, DiscoveryPolicy::SemanticFirst);
        assert!(config.want_date);
        assert_eq!(config.base_url.unwrap().as_str(), "https://example.com/news/");
    }

    #[test]
    fn test_strict_text_shorthand() {
        let options: MatchOptions = serde_json::from_value(json!({ "strict_text": true })).unwrap();
        assert_eq!(options.into_config(1024).unwrap().text_mode, TextMode::Strict);
    }

    #[test]
    fn test_options_reject_bad_base_url() {
        let options = MatchOptions { base_url: Some("not a url".into()), ..Default::default() };
        assert!(matches!(options.into_config(1024), Err(GleanError::InvalidUrl(_))));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result = serde_json::from_value::<MatchOptions>(json!({ "treshold": 2 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (GleanError::Validation("empty".into()), StatusCode::BAD_REQUEST),
            (GleanError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (GleanError::ResourceLimit { size: 2, limit: 1 }, StatusCode::PAYLOAD_TOO_LARGE),
            (GleanError::Parse("binary".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (GleanError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
