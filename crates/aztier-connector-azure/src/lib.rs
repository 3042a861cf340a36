//! Azure connector for aztier.
//!
//! Implements the provider seams of `aztier-core` against the real services:
//!
//! - [`AatCatalogue`] reads the upstream tiered catalogue.
//! - [`AzureTenant`] reads role definitions, assignments and application
//!   permissions from Azure Resource Manager and Microsoft Graph.
//!
//! Access tokens are taken from `ARM_ACCESS_TOKEN` and `MSGRAPH_ACCESS_TOKEN`.
//!
//! # Example
//!
//! ```no_run
//! use aztier_connector_azure::{AccessTokens, AzureEndpoints, AzureTenant};
//! use aztier_core::{AssetCategory, TenantInventory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tenant = AzureTenant::new(AccessTokens::from_env()?, AzureEndpoints::default())?;
//! let custom_roles = tenant.observed_assets(AssetCategory::EntraRole).await?;
//! # Ok(())
//! # }
//! ```

mod arm_client;
mod auth;
mod catalogue;
mod config;
mod error;
mod graph_client;
mod http;
mod tenant;

pub use arm_client::{ArmClient, ArmPage, BatchRequest, BatchResponse, BATCH_LIMIT};
pub use auth::{AccessTokens, ARM_TOKEN_VAR, GRAPH_TOKEN_VAR};
pub use catalogue::AatCatalogue;
pub use config::{
    AzureEndpoints, DEFAULT_ARM_ENDPOINT, DEFAULT_BATCH_POLL_FALLBACK, DEFAULT_GRAPH_ENDPOINT,
    DEFAULT_UPSTREAM_BASE,
};
pub use error::{AzureError, AzureResult};
pub use graph_client::{GraphClient, ODataResponse};
pub use http::{ApiErrorBody, ApiErrorEnvelope};
pub use tenant::{
    AppRole, AssignmentKind, AzureRoleDefinition, AzureRoleProperties, AzureTenant,
    EntraRoleDefinition, ScopeDepth, MSGRAPH_APP_ID,
};
