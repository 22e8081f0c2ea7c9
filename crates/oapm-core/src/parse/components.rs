use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::schema::SchemaOrRef;
use super::security::{OAuthFlow, SecurityScheme, SecuritySchemeType};

/// Reusable definitions that `$ref` pointers point into.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,

    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

impl Components {
    /// The first OAuth2 scheme's authorization-code flow, in declaration order.
    pub fn authorization_code_flow(&self) -> Option<&OAuthFlow> {
        self.security_schemes
            .values()
            .filter(|s| s.scheme_type == SecuritySchemeType::OAuth2)
            .find_map(|s| s.flows.as_ref()?.authorization_code.as_ref())
    }

    pub fn has_bearer_scheme(&self) -> bool {
        self.security_schemes.values().any(SecurityScheme::is_bearer)
    }
}
