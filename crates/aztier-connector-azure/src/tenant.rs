//! Live tenant inventory read from ARM and Microsoft Graph.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

use aztier_core::{normalize_name, AssetCategory, AssetType, ObservedAsset, TenantInventory};

use crate::arm_client::{ArmClient, BatchRequest, BatchResponse};
use crate::graph_client::GraphClient;
use crate::{AccessTokens, AzureEndpoints, AzureError, AzureResult};

const ROLE_DEFINITION_API_VERSION: &str = "2022-04-01";
const SCOPE_API_VERSION: &str = "2021-04-01";
const PIM_API_VERSION: &str = "2020-10-01";

/// Application id of the Microsoft Graph service principal.
pub const MSGRAPH_APP_ID: &str = "00000003-0000-0000-c000-000000000000";

/// An Azure role definition as returned by ARM.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AzureRoleDefinition {
    /// Fully qualified definition id.
    pub id: String,
    /// Role id (GUID).
    pub name: String,
    pub properties: AzureRoleProperties,
}

/// Properties of an Azure role definition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureRoleProperties {
    pub role_name: String,
    /// `BuiltInRole` or `CustomRole`.
    #[serde(rename = "type")]
    pub role_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl AzureRoleDefinition {
    /// Returns the ownership type of the definition.
    #[must_use]
    pub fn asset_type(&self) -> AssetType {
        if self.properties.role_type == "BuiltInRole" {
            AssetType::BuiltIn
        } else {
            AssetType::Custom
        }
    }
}

/// An Entra directory role definition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntraRoleDefinition {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_built_in: bool,
}

/// An application permission exposed by a service principal.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppRole {
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicePrincipal {
    #[serde(default)]
    app_roles: Vec<AppRole>,
}

/// How deep the scope walk goes below subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDepth {
    /// Management groups, subscriptions and resource groups.
    Containers,
    /// Containers plus every individual resource.
    Resources,
}

/// Source of role assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    /// Standing assignments, for tenants without PIM.
    Direct,
    /// Active PIM assignments.
    Active,
    /// Eligible PIM assignments.
    Eligible,
}

impl AssignmentKind {
    fn resource(self) -> &'static str {
        match self {
            AssignmentKind::Direct => "roleAssignments",
            AssignmentKind::Active => "roleAssignmentScheduleInstances",
            AssignmentKind::Eligible => "roleEligibilityScheduleInstances",
        }
    }

    fn api_version(self) -> &'static str {
        match self {
            AssignmentKind::Direct => ROLE_DEFINITION_API_VERSION,
            AssignmentKind::Active | AssignmentKind::Eligible => PIM_API_VERSION,
        }
    }
}

/// Reads role definitions, assignments and permissions from a live tenant.
#[derive(Debug, Clone)]
pub struct AzureTenant {
    arm: ArmClient,
    graph: GraphClient,
}

impl AzureTenant {
    /// Creates a tenant reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be created.
    pub fn new(tokens: AccessTokens, endpoints: AzureEndpoints) -> AzureResult<Self> {
        Ok(Self {
            arm: ArmClient::new(tokens.clone(), endpoints.clone())?,
            graph: GraphClient::new(tokens, endpoints)?,
        })
    }

    /// Returns true if the PIM endpoints answer for this token.
    #[instrument(skip(self))]
    pub async fn pim_enabled(&self) -> AzureResult<bool> {
        let url = self.arm.url(&format!(
            "/providers/Microsoft.Authorization/roleEligibilityScheduleInstances?$filter=asTarget()&api-version={PIM_API_VERSION}"
        ));
        let response = self.arm.get_raw(&url).await?;
        Ok(response.status() == reqwest::StatusCode::OK)
    }

    /// Returns the resource id of every scope the token can read.
    #[instrument(skip(self))]
    pub async fn scope_ids(&self, depth: ScopeDepth) -> AzureResult<Vec<String>> {
        let management_groups = BatchRequest::get(self.arm.url(&format!(
            "/providers/Microsoft.Management/managementGroups?api-version={SCOPE_API_VERSION}"
        )));
        let subscriptions = BatchRequest::get(
            self.arm
                .url(&format!("/subscriptions?api-version={SCOPE_API_VERSION}")),
        );

        let mut responses = self
            .arm
            .batch(&[management_groups.clone(), subscriptions.clone()])
            .await?;
        let mg_ids = resource_ids(take_named(&mut responses, &management_groups.name)?.into_values()?);
        let subscription_ids =
            resource_ids(take_named(&mut responses, &subscriptions.name)?.into_values()?);

        let rg_ids = self
            .list_children(&subscription_ids, "resourceGroups")
            .await?;

        let mut scopes = mg_ids;
        scopes.extend(subscription_ids);
        if depth == ScopeDepth::Resources {
            let resource_ids = self.list_children(&rg_ids, "resources").await?;
            scopes.extend(rg_ids);
            scopes.extend(resource_ids);
        } else {
            scopes.extend(rg_ids);
        }

        info!(scopes = scopes.len(), "Collected Azure scopes");
        Ok(scopes)
    }

    async fn list_children(&self, parents: &[String], child: &str) -> AzureResult<Vec<String>> {
        let requests: Vec<BatchRequest> = parents
            .iter()
            .map(|parent| {
                BatchRequest::get(self.arm.url(&format!(
                    "{parent}/{child}?api-version={SCOPE_API_VERSION}"
                )))
            })
            .collect();

        let mut ids = Vec::new();
        for response in self.arm.batch(&requests).await? {
            ids.extend(resource_ids(response.into_values()?));
        }
        Ok(ids)
    }

    /// Returns the distinct role definition ids assigned at the given scopes.
    #[instrument(skip(self, scopes), fields(scopes = scopes.len()))]
    pub async fn assigned_definition_ids(
        &self,
        scopes: &[String],
        kind: AssignmentKind,
    ) -> AzureResult<Vec<String>> {
        let requests: Vec<BatchRequest> = scopes
            .iter()
            .map(|scope| {
                BatchRequest::get(self.arm.url(&format!(
                    "{scope}/providers/Microsoft.Authorization/{}?api-version={}&$filter=atScope()",
                    kind.resource(),
                    kind.api_version()
                )))
            })
            .collect();

        let mut seen = HashSet::new();
        let mut definition_ids = Vec::new();
        for response in self.arm.batch(&requests).await? {
            for assignment in response.into_values()? {
                let Some(definition_id) = assignment
                    .pointer("/properties/roleDefinitionId")
                    .and_then(Value::as_str)
                else {
                    continue;
                };
                let role_id = definition_id.rsplit('/').next().unwrap_or(definition_id);
                if seen.insert(role_id.to_lowercase()) {
                    definition_ids.push(definition_id.to_string());
                }
            }
        }
        Ok(definition_ids)
    }

    /// Resolves fully qualified definition ids. Definitions that cannot be
    /// read (for example, deleted since assignment) are skipped.
    #[instrument(skip(self, definition_ids), fields(count = definition_ids.len()))]
    pub async fn role_definitions(
        &self,
        definition_ids: &[String],
    ) -> AzureResult<Vec<AzureRoleDefinition>> {
        let requests: Vec<BatchRequest> = definition_ids
            .iter()
            .map(|id| {
                BatchRequest::get(self.arm.url(&format!(
                    "{id}?api-version={ROLE_DEFINITION_API_VERSION}"
                )))
            })
            .collect();

        let mut definitions = Vec::new();
        for response in self.arm.batch(&requests).await? {
            if response.http_status_code != 200 {
                warn!(name = %response.name, status = response.http_status_code, "Skipping unreadable role definition");
                continue;
            }
            definitions.push(serde_json::from_value(response.content)?);
        }
        Ok(definitions)
    }

    /// Lists role definitions of one type (`BuiltInRole` or `CustomRole`)
    /// visible at the tenant root.
    pub async fn role_definitions_of_type(
        &self,
        role_type: &str,
    ) -> AzureResult<Vec<AzureRoleDefinition>> {
        let url = self.arm.url(&format!(
            "/providers/Microsoft.Authorization/roleDefinitions?$filter=type eq '{role_type}'&api-version={ROLE_DEFINITION_API_VERSION}"
        ));
        self.arm.get_all(&url).await
    }

    /// Lists custom role definitions declared at any container scope,
    /// deduplicated by role id.
    #[instrument(skip(self))]
    pub async fn custom_role_definitions_in_scopes(&self) -> AzureResult<Vec<AzureRoleDefinition>> {
        let scopes = self.scope_ids(ScopeDepth::Containers).await?;
        let requests: Vec<BatchRequest> = scopes
            .iter()
            .map(|scope| {
                BatchRequest::get(self.arm.url(&format!(
                    "{scope}/providers/Microsoft.Authorization/roleDefinitions?$filter=type eq 'CustomRole'&api-version={ROLE_DEFINITION_API_VERSION}"
                )))
            })
            .collect();

        let mut seen = HashSet::new();
        let mut definitions = Vec::new();
        for response in self.arm.batch(&requests).await? {
            if response.http_status_code != 200 {
                continue;
            }
            for value in response.into_values()? {
                let definition: AzureRoleDefinition = serde_json::from_value(value)?;
                if seen.insert(definition.name.clone()) {
                    definitions.push(definition);
                }
            }
        }
        Ok(definitions)
    }

    /// Lists Entra role definitions, optionally only the custom ones.
    #[instrument(skip(self))]
    pub async fn entra_role_definitions(
        &self,
        custom_only: bool,
    ) -> AzureResult<Vec<EntraRoleDefinition>> {
        let path = if custom_only {
            "/roleManagement/directory/roleDefinitions?$filter=isBuiltIn eq false"
        } else {
            "/roleManagement/directory/roleDefinitions"
        };
        self.graph.get_all(&self.graph.url(path)).await
    }

    /// Lists the application permissions exposed by Microsoft Graph.
    #[instrument(skip(self))]
    pub async fn graph_app_roles(&self) -> AzureResult<Vec<AppRole>> {
        let url = self
            .graph
            .url(&format!("/servicePrincipals(appId='{MSGRAPH_APP_ID}')"));
        let principal: ServicePrincipal = self.graph.get(&url).await?;
        Ok(principal.app_roles)
    }

    /// Role definitions in use: built-in roles with active or eligible PIM
    /// assignments, or every directly assigned role when PIM is unavailable.
    async fn azure_roles_in_use(&self) -> AzureResult<Vec<AzureRoleDefinition>> {
        let pim = self.pim_enabled().await?;
        let scopes = self.scope_ids(ScopeDepth::Resources).await?;

        if pim {
            let mut ids = self
                .assigned_definition_ids(&scopes, AssignmentKind::Active)
                .await?;
            ids.extend(
                self.assigned_definition_ids(&scopes, AssignmentKind::Eligible)
                    .await?,
            );
            let definitions = self.role_definitions(&ids).await?;
            Ok(definitions
                .into_iter()
                .filter(|d| d.asset_type() == AssetType::BuiltIn)
                .collect())
        } else {
            let ids = self
                .assigned_definition_ids(&scopes, AssignmentKind::Direct)
                .await?;
            self.role_definitions(&ids).await
        }
    }

    fn observed_azure_role(&self, definition: AzureRoleDefinition) -> ObservedAsset {
        ObservedAsset {
            asset_type: definition.asset_type(),
            link: self.arm.url(&format!(
                "/providers/Microsoft.Authorization/roleDefinitions/{}?api-version={ROLE_DEFINITION_API_VERSION}",
                definition.name
            )),
            id: definition.name,
            name: definition.properties.role_name,
            description: definition.properties.description.unwrap_or_default(),
        }
    }

    fn observed_entra_role(&self, definition: EntraRoleDefinition) -> ObservedAsset {
        ObservedAsset {
            asset_type: AssetType::Custom,
            link: self
                .graph
                .url(&format!("/roleManagement/directory/roleDefinitions/{}", definition.id)),
            id: definition.id,
            name: definition.display_name,
            description: definition.description.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl TenantInventory for AzureTenant {
    type Error = AzureError;

    async fn observed_assets(&self, category: AssetCategory) -> AzureResult<Vec<ObservedAsset>> {
        let observed: Vec<ObservedAsset> = match category {
            AssetCategory::AzureRole => {
                let mut definitions = self.azure_roles_in_use().await?;
                definitions.extend(self.role_definitions_of_type("CustomRole").await?);
                definitions
                    .into_iter()
                    .map(|d| self.observed_azure_role(d))
                    .collect()
            }
            AssetCategory::EntraRole => self
                .entra_role_definitions(true)
                .await?
                .into_iter()
                .map(|d| self.observed_entra_role(d))
                .collect(),
            AssetCategory::MsGraphAppPermission => Vec::new(),
        };

        info!(%category, count = observed.len(), "Observed tenant assets");
        Ok(observed)
    }

    async fn definition_ids(&self, category: AssetCategory) -> AzureResult<HashMap<String, String>> {
        let mut ids = HashMap::new();
        match category {
            AssetCategory::AzureRole => {
                let mut definitions = self.role_definitions_of_type("BuiltInRole").await?;
                definitions.extend(self.custom_role_definitions_in_scopes().await?);
                for definition in definitions {
                    ids.entry(normalize_name(&definition.properties.role_name))
                        .or_insert(definition.name);
                }
            }
            AssetCategory::EntraRole => {
                for definition in self.entra_role_definitions(false).await? {
                    ids.entry(normalize_name(&definition.display_name))
                        .or_insert(definition.id);
                }
            }
            AssetCategory::MsGraphAppPermission => {
                for role in self.graph_app_roles().await? {
                    if let Some(value) = role.value.as_deref() {
                        ids.entry(normalize_name(value)).or_insert(role.id);
                    }
                }
            }
        }

        info!(%category, count = ids.len(), "Resolved definition ids");
        Ok(ids)
    }
}

fn resource_ids(values: Vec<Value>) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.get("id").and_then(Value::as_str).map(str::to_string))
        .collect()
}

fn take_named(responses: &mut Vec<BatchResponse>, name: &str) -> AzureResult<BatchResponse> {
    let position = responses
        .iter()
        .position(|r| r.name == name)
        .ok_or_else(|| AzureError::InvalidResponse(format!("batch response '{name}' is missing")))?;
    Ok(responses.remove(position))
}
