//! Azure Resource Manager client: `nextLink` pagination and the batch API.
//!
//! The batch endpoint accepts at most [`BATCH_LIMIT`] sub-requests per call.
//! Larger batches are split into chunks whose responses are concatenated in
//! order. A chunk answered with a `Location` header is still processing: the
//! client waits for `Retry-After` seconds once, then reads the result and
//! follows its `nextLink` pages.

use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::http::{api_error, build_http_client, read_json};
use crate::{AccessTokens, AzureEndpoints, AzureError, AzureResult};

/// Maximum number of sub-requests ARM accepts in one batch.
pub const BATCH_LIMIT: usize = 500;

const BATCH_PATH: &str = "/batch?api-version=2021-04-01";

/// Page of an ARM list response.
#[derive(Debug, Deserialize)]
pub struct ArmPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

/// One sub-request of a batch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub name: String,
    pub http_method: String,
    pub url: String,
}

impl BatchRequest {
    /// Creates a named GET sub-request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            name: Uuid::new_v4().to_string(),
            http_method: "GET".to_string(),
            url: url.into(),
        }
    }
}

/// One sub-response of a batch.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[serde(default)]
    pub name: String,
    pub http_status_code: u16,
    #[serde(default)]
    pub content: Value,
}

impl BatchResponse {
    /// Returns true for a 2xx sub-response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status_code)
    }

    /// Returns the `value` array of a successful list sub-response.
    ///
    /// # Errors
    ///
    /// Returns `BatchRequest` if the sub-request failed, or
    /// `InvalidResponse` if the content has no `value` array.
    pub fn into_values(self) -> AzureResult<Vec<Value>> {
        if !self.is_success() {
            return Err(AzureError::BatchRequest {
                name: self.name,
                status: self.http_status_code,
            });
        }
        match self.content {
            Value::Object(mut content) => match content.remove("value") {
                Some(Value::Array(values)) => Ok(values),
                _ => Err(AzureError::InvalidResponse(format!(
                    "batch sub-response '{}' has no 'value' array",
                    self.name
                ))),
            },
            _ => Err(AzureError::InvalidResponse(format!(
                "batch sub-response '{}' has no content",
                self.name
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchBody<'a> {
    requests: &'a [BatchRequest],
}

/// Batch result body. Immediate results carry `responses`; polled results
/// carry `value` and may be paginated.
#[derive(Debug, Default, Deserialize)]
struct BatchResult {
    #[serde(default)]
    responses: Vec<BatchResponse>,
    #[serde(default)]
    value: Vec<BatchResponse>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

impl BatchResult {
    fn into_responses(self) -> Vec<BatchResponse> {
        let mut responses = self.responses;
        responses.extend(self.value);
        responses
    }
}

/// Azure Resource Manager client.
#[derive(Debug, Clone)]
pub struct ArmClient {
    http_client: reqwest::Client,
    tokens: AccessTokens,
    endpoints: AzureEndpoints,
}

impl ArmClient {
    /// Creates a new ARM client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(tokens: AccessTokens, endpoints: AzureEndpoints) -> AzureResult<Self> {
        Ok(Self {
            http_client: build_http_client(&endpoints)?,
            tokens,
            endpoints,
        })
    }

    /// Builds an absolute ARM URL from a relative path.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        self.endpoints.arm_url(path_and_query)
    }

    /// Performs an authenticated GET request and returns the raw response.
    pub async fn get_raw(&self, url: &str) -> AzureResult<reqwest::Response> {
        Ok(self
            .http_client
            .get(url)
            .bearer_auth(self.tokens.arm())
            .send()
            .await?)
    }

    /// Performs an authenticated GET request.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> AzureResult<T> {
        read_json(self.get_raw(url).await?).await
    }

    /// Collects every item of a list endpoint, following `nextLink`.
    #[instrument(skip(self))]
    pub async fn get_all<T: DeserializeOwned>(&self, initial_url: &str) -> AzureResult<Vec<T>> {
        let mut items = Vec::new();
        let mut url = initial_url.to_string();

        loop {
            debug!("Fetching page: {}", url);
            let page: ArmPage<T> = self.get(&url).await?;
            items.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => return Ok(items),
            }
        }
    }

    /// Sends sub-requests through the batch API, in chunks of at most
    /// [`BATCH_LIMIT`], and returns all sub-responses.
    ///
    /// # Errors
    ///
    /// Any non-success status on the batch call, the poll or a page is fatal.
    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    pub async fn batch(&self, requests: &[BatchRequest]) -> AzureResult<Vec<BatchResponse>> {
        let mut complete = Vec::with_capacity(requests.len());

        for (index, chunk) in requests.chunks(BATCH_LIMIT).enumerate() {
            debug!(chunk = index, size = chunk.len(), "Sending batch chunk");
            complete.extend(self.send_chunk(chunk).await?);
        }

        info!(responses = complete.len(), "Batch completed");
        Ok(complete)
    }

    async fn send_chunk(&self, chunk: &[BatchRequest]) -> AzureResult<Vec<BatchResponse>> {
        let response = self
            .http_client
            .post(self.url(BATCH_PATH))
            .bearer_auth(self.tokens.arm())
            .json(&BatchBody { requests: chunk })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::ACCEPTED {
            return Err(api_error(status, response).await);
        }

        let Some(location) = header_str(response.headers(), LOCATION.as_str()) else {
            let result: BatchResult = read_json(response).await?;
            return Ok(result.into_responses());
        };

        let pause = retry_after(response.headers()).unwrap_or(self.endpoints.batch_poll_fallback);
        debug!(?pause, %location, "Batch still processing, waiting before polling");
        tokio::time::sleep(pause).await;

        let mut responses = Vec::new();
        let mut url = location;
        loop {
            let page = self.get_raw(&url).await?;
            let status = page.status();
            if status != StatusCode::OK && status != StatusCode::ACCEPTED {
                return Err(api_error(status, page).await);
            }
            let result: BatchResult = read_json(page).await?;
            let next_link = result.next_link.clone();
            responses.extend(result.into_responses());

            match next_link {
                Some(next) => url = next,
                None => return Ok(responses),
            }
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER.as_str())?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
