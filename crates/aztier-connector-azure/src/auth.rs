//! Access tokens supplied by the environment.
//!
//! Tokens are acquired outside this tool (typically by a CI login step) and
//! passed in through environment variables.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::{AzureError, AzureResult};

/// Environment variable holding the ARM access token.
pub const ARM_TOKEN_VAR: &str = "ARM_ACCESS_TOKEN";
/// Environment variable holding the Microsoft Graph access token.
pub const GRAPH_TOKEN_VAR: &str = "MSGRAPH_ACCESS_TOKEN";

/// Bearer tokens for the two Microsoft APIs.
#[derive(Clone)]
pub struct AccessTokens {
    arm: SecretString,
    graph: SecretString,
}

impl AccessTokens {
    /// Creates tokens from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` if either value is empty.
    pub fn new(arm: impl Into<String>, graph: impl Into<String>) -> AzureResult<Self> {
        let (arm, graph) = (arm.into(), graph.into());
        Self::from_lookup(|name| match name {
            ARM_TOKEN_VAR => Some(arm.clone()),
            GRAPH_TOKEN_VAR => Some(graph.clone()),
            _ => None,
        })
    }

    /// Reads both tokens from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` if either variable is unset or empty.
    pub fn from_env() -> AzureResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads both tokens through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(mut lookup: F) -> AzureResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let arm = required(&mut lookup, ARM_TOKEN_VAR)?;
        let graph = required(&mut lookup, GRAPH_TOKEN_VAR)?;
        Ok(Self { arm, graph })
    }

    pub(crate) fn arm(&self) -> &str {
        self.arm.expose_secret()
    }

    pub(crate) fn graph(&self) -> &str {
        self.graph.expose_secret()
    }
}

impl fmt::Debug for AccessTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokens")
            .field("arm", &"[REDACTED]")
            .field("graph", &"[REDACTED]")
            .finish()
    }
}

fn required<F>(lookup: &mut F, name: &'static str) -> AzureResult<SecretString>
where
    F: FnMut(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::new(value)),
        _ => Err(AzureError::MissingCredential(name)),
    }
}
