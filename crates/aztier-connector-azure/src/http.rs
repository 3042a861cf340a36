//! Response handling shared by the ARM and Graph clients.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{AzureEndpoints, AzureError, AzureResult};

/// Error envelope returned by both ARM and Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

/// Error body inside [`ApiErrorEnvelope`].
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

pub(crate) fn build_http_client(endpoints: &AzureEndpoints) -> AzureResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(endpoints.request_timeout)
        .build()
        .map_err(|e| AzureError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Decodes a success body, or turns an error status into `AzureError::Api`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> AzureResult<T> {
    let status = response.status();
    if status.is_success() {
        let body = response.text().await?;
        return serde_json::from_str(&body).map_err(AzureError::from);
    }
    Err(api_error(status, response).await)
}

pub(crate) async fn api_error(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> AzureError {
    let body = response.text().await.unwrap_or_default();
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(&body) {
        return AzureError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        };
    }
    AzureError::Api {
        status: status.as_u16(),
        code: status.to_string(),
        message: body,
    }
}
