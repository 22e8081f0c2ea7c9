use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Project configuration loaded from `.oapm.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OapmConfig {
    pub input: String,
    pub output: String,
    /// Markdown file whose content replaces `info.description` as the
    /// collection description.
    pub description_file: Option<String>,
    /// Base URL that relative documentation links are rewritten against.
    pub docs_base_url: String,
    pub auth: AuthMode,
    /// Folder used for operations that declare no tags.
    pub default_tag: String,
    /// Append a folder for tags that are used by operations but not declared
    /// at the top level, instead of dropping those items.
    pub create_missing_folders: bool,
}

impl Default for OapmConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "postman_collection.json".to_string(),
            description_file: None,
            docs_base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            auth: AuthMode::Auto,
            default_tag: DEFAULT_TAG.to_string(),
            create_missing_folders: false,
        }
    }
}

/// How the collection-level `auth` block is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Derive from `components.securitySchemes`.
    #[default]
    Auto,
    #[serde(rename = "oauth2")]
    OAuth2,
    Bearer,
    None,
}

pub const DEFAULT_DOCS_BASE_URL: &str = "https://developers.asana.com";
pub const DEFAULT_TAG: &str = "Others";

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oapm.yaml";

/// Environment variable that overrides the configured output path.
pub const OUTPUT_ENV_VAR: &str = "POSTMAN_COLLECTION_FILE";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OapmConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OapmConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oapm configuration
input: openapi.yaml
output: postman_collection.json   # POSTMAN_COLLECTION_FILE overrides this

# Markdown used as the collection description instead of info.description
# description_file: postman_description.md

# Relative links in descriptions ([text](/docs/x)) are rewritten against this
docs_base_url: https://developers.asana.com

auth: auto                  # auto | oauth2 | bearer | none
default_tag: Others         # folder for operations without tags
create_missing_folders: false
"#
}
