//! Common test utilities for aztier-connector-azure integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{Request, Respond, ResponseTemplate};

use aztier_connector_azure::{AccessTokens, AzureEndpoints};

/// Endpoints pointing every API at the mock server.
pub fn endpoints(server_uri: &str) -> AzureEndpoints {
    AzureEndpoints::default()
        .with_arm(server_uri)
        .unwrap()
        .with_graph(&format!("{server_uri}/v1.0"))
        .unwrap()
        .with_upstream(&format!("{server_uri}/"))
        .unwrap()
        .with_batch_poll_fallback(Duration::from_millis(10))
}

/// Tokens accepted by the mock server.
pub fn tokens() -> AccessTokens {
    AccessTokens::new("arm-test-token", "graph-test-token").unwrap()
}

/// Wraps items in an ARM list response.
pub fn arm_list(items: Vec<Value>) -> Value {
    json!({ "value": items })
}

/// Creates an ARM role definition.
pub fn role_definition(scope: &str, role_id: &str, name: &str, role_type: &str) -> Value {
    json!({
        "id": format!("{scope}/providers/Microsoft.Authorization/roleDefinitions/{role_id}"),
        "name": role_id,
        "type": "Microsoft.Authorization/roleDefinitions",
        "properties": {
            "roleName": name,
            "type": role_type,
            "description": format!("{name} description")
        }
    })
}

/// Creates an ARM role assignment pointing at a definition.
pub fn role_assignment(scope: &str, role_id: &str) -> Value {
    json!({
        "id": format!("{scope}/providers/Microsoft.Authorization/roleAssignments/{role_id}-assignment"),
        "properties": {
            "roleDefinitionId": format!("{scope}/providers/Microsoft.Authorization/roleDefinitions/{role_id}"),
            "scope": scope
        }
    })
}

/// Creates an Entra role definition.
pub fn entra_role(id: &str, name: &str, built_in: bool) -> Value {
    json!({
        "id": id,
        "displayName": name,
        "description": format!("{name} description"),
        "isBuiltIn": built_in
    })
}

/// Answers ARM batch calls by routing every sub-request URL through a
/// handler, echoing sub-request names.
pub struct BatchResponder<F> {
    handler: F,
    calls: Arc<AtomicUsize>,
}

impl<F> BatchResponder<F>
where
    F: Fn(&str) -> (u16, Value) + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<F> Respond for BatchResponder<F>
where
    F: Fn(&str) -> (u16, Value) + Send + Sync + 'static,
{
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let responses: Vec<Value> = body["requests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|sub| {
                let (status, content) = (self.handler)(sub["url"].as_str().unwrap());
                json!({
                    "name": sub["name"],
                    "httpStatusCode": status,
                    "content": content
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "responses": responses }))
    }
}
