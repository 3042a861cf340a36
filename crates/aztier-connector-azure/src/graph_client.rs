//! Microsoft Graph API client with `@odata.nextLink` pagination.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::{build_http_client, read_json};
use crate::{AccessTokens, AzureEndpoints, AzureResult};

/// Response wrapper for paginated Graph API responses.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Microsoft Graph API client.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    tokens: AccessTokens,
    endpoints: AzureEndpoints,
}

impl GraphClient {
    /// Creates a new Graph client.
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

    /// Builds an absolute Graph URL from a relative path.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        self.endpoints.graph_url(path_and_query)
    }

    /// Performs an authenticated GET request.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> AzureResult<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.tokens.graph())
            .send()
            .await?;
        read_json(response).await
    }

    /// Fetches all pages of a paginated response, processing each page via callback.
    #[instrument(skip(self, callback))]
    pub async fn get_paginated<T, F>(&self, initial_url: &str, mut callback: F) -> AzureResult<()>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> AzureResult<()>,
    {
        let mut url = initial_url.to_string();

        loop {
            debug!("Fetching page: {}", url);
            let response: ODataResponse<T> = self.get(&url).await?;

            callback(response.value)?;

            match response.next_link {
                Some(next) => url = next,
                None => return Ok(()),
            }
        }
    }

    /// Collects every item of a paginated collection.
    pub async fn get_all<T: DeserializeOwned>(&self, initial_url: &str) -> AzureResult<Vec<T>> {
        let mut items = Vec::new();
        self.get_paginated(initial_url, |page: Vec<T>| {
            items.extend(page);
            Ok(())
        })
        .await?;
        Ok(items)
    }
}
