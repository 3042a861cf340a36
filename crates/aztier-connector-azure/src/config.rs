//! Endpoint configuration for the Azure connector.

use std::time::Duration;
use url::Url;

use aztier_core::AssetCategory;

use crate::{AzureError, AzureResult};

/// Default ARM endpoint.
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
/// Default Microsoft Graph endpoint, including the API version.
pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";
/// Default location of the upstream tiered catalogue.
pub const DEFAULT_UPSTREAM_BASE: &str =
    "https://raw.githubusercontent.com/emiliensocchi/azure-tiering/refs/heads/main/";

/// Pause before polling an asynchronous batch when the server sends no
/// usable `Retry-After`.
pub const DEFAULT_BATCH_POLL_FALLBACK: Duration = Duration::from_secs(5);

/// Base URLs and timing for the remote APIs.
#[derive(Debug, Clone)]
pub struct AzureEndpoints {
    arm: String,
    graph: String,
    upstream: String,
    /// Pause used when an asynchronous batch has no `Retry-After`.
    pub batch_poll_fallback: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for AzureEndpoints {
    fn default() -> Self {
        Self {
            arm: DEFAULT_ARM_ENDPOINT.to_string(),
            graph: DEFAULT_GRAPH_ENDPOINT.to_string(),
            upstream: DEFAULT_UPSTREAM_BASE.to_string(),
            batch_poll_fallback: DEFAULT_BATCH_POLL_FALLBACK,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AzureEndpoints {
    /// Overrides the ARM endpoint.
    pub fn with_arm(mut self, url: &str) -> AzureResult<Self> {
        self.arm = parse_base(url)?;
        Ok(self)
    }

    /// Overrides the Microsoft Graph endpoint (including its API version).
    pub fn with_graph(mut self, url: &str) -> AzureResult<Self> {
        self.graph = parse_base(url)?;
        Ok(self)
    }

    /// Overrides the upstream catalogue location.
    pub fn with_upstream(mut self, url: &str) -> AzureResult<Self> {
        self.upstream = parse_base(url)?;
        Ok(self)
    }

    /// Overrides the batch poll fallback pause.
    #[must_use]
    pub fn with_batch_poll_fallback(mut self, pause: Duration) -> Self {
        self.batch_poll_fallback = pause;
        self
    }

    /// Builds an absolute ARM URL from a path that starts with `/`.
    #[must_use]
    pub fn arm_url(&self, path_and_query: &str) -> String {
        join_raw(&self.arm, path_and_query)
    }

    /// Builds an absolute Graph URL from a path that starts with `/`.
    #[must_use]
    pub fn graph_url(&self, path_and_query: &str) -> String {
        join_raw(&self.graph, path_and_query)
    }

    /// Returns the URL of the upstream record for a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured upstream base is not a valid base URL.
    pub fn upstream_record_url(&self, category: AssetCategory) -> AzureResult<Url> {
        let mut url = Url::parse(&self.upstream)?;
        url.path_segments_mut()
            .map_err(|()| {
                AzureError::Config(format!("upstream base '{}' cannot hold a path", self.upstream))
            })?
            .pop_if_empty()
            .push(category.directory())
            .push(category.record_file_name());
        Ok(url)
    }
}

// Query strings carry OData expressions (`$filter=type eq 'CustomRole'`) that
// are kept verbatim and encoded by the HTTP client.
fn join_raw(base: &str, path_and_query: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}

fn parse_base(url: &str) -> AzureResult<String> {
    let parsed = Url::parse(url)?;
    if parsed.cannot_be_a_base() {
        return Err(AzureError::Config(format!("'{url}' is not a valid base URL")));
    }
    Ok(parsed.to_string())
}
