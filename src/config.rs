use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumString};
use validator::Validate;

use crate::error::Result;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Slack workspace details used to link incident channels
    #[serde(default)]
    pub slack: SlackConfig,

    /// Postmortem generation settings
    #[serde(default)]
    pub postmortem: PostmortemConfig,

    /// Integration configurations
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: POSTMORTEM_)
            .add_source(
                config::Environment::with_prefix("POSTMORTEM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from an explicit file layered over the defaults.
    /// Environment variables are not consulted.
    pub fn from_file(path: &Path) -> std::result::Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Validate every configured integration section
    pub fn validate(&self) -> Result<()> {
        if let Some(notion) = &self.integrations.notion {
            notion.validate()?;
        }
        if let Some(awork) = &self.integrations.awork {
            awork.validate()?;
        }
        if let Some(zoom) = &self.integrations.zoom {
            zoom.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlackConfig {
    /// Workspace subdomain, as in `https://{workspace_id}.slack.com`
    #[serde(default)]
    pub workspace_id: String,
}

/// Which document platform receives postmortems
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PostmortemBackendKind {
    #[default]
    Notion,
    Awork,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostmortemConfig {
    /// Backend used for new postmortems
    #[serde(default)]
    pub backend: PostmortemBackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntegrationsConfig {
    pub notion: Option<NotionConfig>,
    pub awork: Option<AworkConfig>,
    pub zoom: Option<ZoomConfig>,
}

/// Notion (page/blocks) integration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotionConfig {
    /// Internal integration token
    #[validate(length(min = 1))]
    pub api_key: String,

    /// Page under which postmortems are created
    #[validate(length(min = 1))]
    pub parent: String,

    /// Page whose blocks seed every postmortem
    #[validate(length(min = 1))]
    pub template_id: String,

    #[serde(default = "default_notion_api_url")]
    pub api_url: String,

    /// Value of the `Notion-Version` header
    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

/// awork (document-management) integration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AworkConfig {
    /// API bearer token
    #[validate(length(min = 1))]
    pub api_token: String,

    /// Document under which postmortems are created
    #[validate(length(min = 1))]
    pub parent: String,

    /// Document whose HTML content is the postmortem template
    #[validate(length(min = 1))]
    pub template_id: String,

    #[serde(default = "default_awork_api_url")]
    pub api_url: String,

    /// Base for links to created documents
    #[serde(default = "default_awork_docs_url")]
    pub docs_url: String,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

/// Zoom (meeting) integration, server-to-server OAuth app
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ZoomConfig {
    #[validate(length(min = 1))]
    pub account_id: String,

    #[validate(length(min = 1))]
    pub client_id: String,

    #[validate(length(min = 1))]
    pub client_secret: String,

    #[serde(default = "default_zoom_api_url")]
    pub api_url: String,

    /// Credential exchange endpoint
    #[serde(default = "default_zoom_oauth_url")]
    pub oauth_url: String,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "incident-postmortem".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_notion_api_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_awork_api_url() -> String {
    "https://api.awork.com/api/v1".to_string()
}

fn default_awork_docs_url() -> String {
    "https://app.awork.com/docs".to_string()
}

fn default_zoom_api_url() -> String {
    "https://api.zoom.us/v2".to_string()
}

fn default_zoom_oauth_url() -> String {
    "https://zoom.us/oauth/token".to_string()
}
