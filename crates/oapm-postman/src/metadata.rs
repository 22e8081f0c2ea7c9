use log::warn;
use serde_json::{Value, json};

use oapm_core::config::AuthMode;
use oapm_core::parse::security::OAuthFlow;
use oapm_core::parse::spec::{OpenApiSpec, Tag};

use crate::model::{
    Auth, AuthAttribute, COLLECTION_SCHEMA_URL, Description, Folder, Info, Variable,
};

/// Collection `info`. An explicit description (from a description file) takes
/// precedence over `info.description`.
pub fn build_info(spec: &OpenApiSpec, description_override: Option<&str>) -> Info {
    let content = description_override
        .map(str::to_string)
        .or_else(|| spec.info.description.clone())
        .unwrap_or_default();
    Info {
        name: spec.info.title.clone(),
        schema: COLLECTION_SCHEMA_URL.to_string(),
        description: Description::markdown(content),
    }
}

/// Collection variables: the base URL plus the credentials the auth block
/// refers to.
pub fn build_variables(spec: &OpenApiSpec) -> Vec<Variable> {
    let base_url = spec.base_url().unwrap_or_else(|| {
        warn!("document declares no servers, baseUrl will be empty");
        String::new()
    });
    [
        ("baseUrl", base_url.as_str()),
        ("bearerToken", ""),
        ("oauthAppId", ""),
        ("oauthSecret", ""),
        ("oauthScopes", "default"),
    ]
    .into_iter()
    .map(|(key, value)| Variable {
        key: key.to_string(),
        value: value.to_string(),
    })
    .collect()
}

/// Collection-level auth. Postman allows a single scheme, so `Auto` prefers an
/// OAuth2 authorization-code flow and falls back to HTTP bearer.
pub fn build_auth(spec: &OpenApiSpec, mode: AuthMode) -> Option<Auth> {
    match mode {
        AuthMode::None => None,
        AuthMode::Bearer => Some(bearer_auth()),
        AuthMode::OAuth2 => Some(oauth2_auth(authorization_code_flow(spec))),
        AuthMode::Auto => {
            if let Some(flow) = authorization_code_flow(spec) {
                Some(oauth2_auth(Some(flow)))
            } else if has_bearer_scheme(spec) {
                Some(bearer_auth())
            } else {
                None
            }
        }
    }
}

fn authorization_code_flow(spec: &OpenApiSpec) -> Option<&OAuthFlow> {
    spec.components.as_ref()?.authorization_code_flow()
}

fn has_bearer_scheme(spec: &OpenApiSpec) -> bool {
    spec.components
        .as_ref()
        .is_some_and(|c| c.has_bearer_scheme())
}

fn attribute(key: &str, value: Value) -> AuthAttribute {
    AuthAttribute {
        key: key.to_string(),
        value,
        value_type: None,
    }
}

fn oauth2_auth(flow: Option<&OAuthFlow>) -> Auth {
    let auth_url = flow
        .and_then(|f| f.authorization_url.clone())
        .unwrap_or_default();
    let token_url = flow.and_then(|f| f.token_url.clone()).unwrap_or_default();
    let refresh_url = flow
        .and_then(|f| f.refresh_url.clone())
        .unwrap_or_else(|| token_url.clone());

    Auth::OAuth2 {
        oauth2: vec![
            attribute("authRequestParams", json!([])),
            attribute("refreshTokenUrl", json!(refresh_url)),
            attribute("state", json!("{{$randomUUID}}")),
            attribute("scope", json!("{{oauthScopes}}")),
            attribute("accessTokenUrl", json!(token_url)),
            attribute("clientId", json!("{{oauthAppId}}")),
            attribute("clientSecret", json!("{{oauthSecret}}")),
            attribute("authUrl", json!(auth_url)),
            attribute("useBrowser", json!(true)),
            attribute("tokenName", json!("access_token")),
            attribute("addTokenTo", json!("header")),
        ],
    }
}

fn bearer_auth() -> Auth {
    Auth::Bearer {
        bearer: vec![AuthAttribute {
            key: "token".to_string(),
            value: json!("{{bearerToken}}"),
            value_type: Some("string".to_string()),
        }],
    }
}

/// One empty folder per declared tag, in declaration order.
pub fn build_folders(tags: &[Tag]) -> Vec<Folder> {
    tags.iter().map(folder_for_tag).collect()
}

pub fn folder_for_tag(tag: &Tag) -> Folder {
    Folder {
        name: tag.name.clone(),
        description: Description::markdown(tag.description.clone().unwrap_or_default()),
        item: Vec::new(),
    }
}
