//! Client for the upstream tiered catalogue.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use aztier_core::{Asset, AssetCategory, UpstreamCatalogue};

use crate::http::{build_http_client, read_json};
use crate::{AzureEndpoints, AzureResult};

/// Fetches the published tiered records of the upstream catalogue.
#[derive(Debug, Clone)]
pub struct AatCatalogue {
    http_client: reqwest::Client,
    endpoints: AzureEndpoints,
}

impl AatCatalogue {
    /// Creates a catalogue client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoints: AzureEndpoints) -> AzureResult<Self> {
        Ok(Self {
            http_client: build_http_client(&endpoints)?,
            endpoints,
        })
    }

    /// Fetches and validates the record published for `category`.
    #[instrument(skip(self))]
    pub async fn fetch(&self, category: AssetCategory) -> AzureResult<Vec<Asset>> {
        let url = self.endpoints.upstream_record_url(category)?;
        let response = self.http_client.get(url).send().await?;
        let body: Value = read_json(response).await?;
        let assets = Asset::collection_from_value(body)?;
        info!(count = assets.len(), "Fetched upstream tiered assets");
        Ok(assets)
    }
}

#[async_trait]
impl UpstreamCatalogue for AatCatalogue {
    type Error = crate::AzureError;

    async fn tiered_assets(&self, category: AssetCategory) -> AzureResult<Vec<Asset>> {
        self.fetch(category).await
    }
}
