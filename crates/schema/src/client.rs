//! HTTP client running the introspection query against remote endpoints.

use crate::introspection::{IntrospectionResponse, IntrospectionSchema, INTROSPECTION_QUERY};
use gql_assist_config::IntrospectionConfig;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("response is not an introspection result: {0}")]
    Decode(String),

    #[error("server returned errors: {0}")]
    GraphQl(String),
}

impl IntrospectionError {
    /// Network failures and 5xx answers may succeed on a later attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Decode(_) | Self::GraphQl(_) => false,
        }
    }
}

/// Runs the introspection query with custom headers, timeouts and retries.
///
/// ```no_run
/// use gql_assist_schema::IntrospectionClient;
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), gql_assist_schema::IntrospectionError> {
/// let client = IntrospectionClient::new()
///     .with_header("Authorization", "Bearer token")
///     .with_timeout(Duration::from_secs(10))
///     .with_retries(2);
/// let schema = client.fetch("https://api.example.com/graphql").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectionClient {
    headers: BTreeMap<String, String>,
    timeout: Duration,
    connect_timeout: Duration,
    retries: u32,
}

impl Default for IntrospectionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IntrospectionClient {
    /// 30s request timeout, 10s connect timeout, no retries, no headers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retries: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &IntrospectionConfig) -> Self {
        Self::new()
            .with_headers(config.headers.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_retries(config.retries)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Retry attempts after the first failure; backoff doubles from 1s.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<IntrospectionSchema, IntrospectionError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(schema) => return Ok(schema),
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    let delay = Duration::from_secs(1 << attempt.min(6));
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, delay_secs = delay.as_secs(), "Introspection failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<IntrospectionSchema, IntrospectionError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| IntrospectionError::Network(e.to_string()))?;

        let mut request = client
            .post(url)
            .json(&serde_json::json!({ "query": INTROSPECTION_QUERY }));
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        tracing::debug!("Sending introspection query");
        let response = request
            .send()
            .await
            .map_err(|e| IntrospectionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntrospectionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| IntrospectionError::Network(e.to_string()))?;
        let schema = parse_response(&body)?;
        tracing::info!(types = schema.types.len(), "Introspection succeeded");
        Ok(schema)
    }
}

/// Extract the schema from a GraphQL response body.
pub fn parse_response(body: &str) -> Result<IntrospectionSchema, IntrospectionError> {
    let response: IntrospectionResponse =
        serde_json::from_str(body).map_err(|e| IntrospectionError::Decode(e.to_string()))?;

    match response.data {
        Some(data) => Ok(data.schema),
        None if !response.errors.is_empty() => {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            Err(IntrospectionError::GraphQl(messages.join("; ")))
        }
        None => Err(IntrospectionError::Decode("missing `data`".to_string())),
    }
}
