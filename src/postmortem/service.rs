use crate::config::{Config, PostmortemBackendKind};
use crate::error::{AppError, Result};
use crate::integrations::{AworkClient, NotionClient};
use crate::models::{IncidentEvent, IncidentParticipant, IncidentRecord};
use crate::postmortem::generator::PostmortemGenerator;

/// Postmortem generator for the backend selected in configuration
pub enum PostmortemService {
    Notion(PostmortemGenerator<NotionClient>),
    Awork(PostmortemGenerator<AworkClient>),
}

impl PostmortemService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let workspace_id = config.slack.workspace_id.clone();

        match config.postmortem.backend {
            PostmortemBackendKind::Notion => {
                let notion = config.integrations.notion.as_ref().ok_or_else(|| {
                    AppError::Configuration(
                        "postmortem backend is notion but integrations.notion is not set"
                            .to_string(),
                    )
                })?;
                Ok(Self::Notion(PostmortemGenerator::new(
                    NotionClient::new(notion)?,
                    workspace_id,
                )))
            }
            PostmortemBackendKind::Awork => {
                let awork = config.integrations.awork.as_ref().ok_or_else(|| {
                    AppError::Configuration(
                        "postmortem backend is awork but integrations.awork is not set"
                            .to_string(),
                    )
                })?;
                Ok(Self::Awork(PostmortemGenerator::new(
                    AworkClient::new(awork)?,
                    workspace_id,
                )))
            }
        }
    }

    pub fn kind(&self) -> PostmortemBackendKind {
        match self {
            Self::Notion(_) => PostmortemBackendKind::Notion,
            Self::Awork(_) => PostmortemBackendKind::Awork,
        }
    }

    /// Create a postmortem and return its URL
    pub async fn create(
        &self,
        incident: &IncidentRecord,
        participants: &[IncidentParticipant],
        timeline: &[IncidentEvent],
        title: &str,
    ) -> Result<String> {
        match self {
            Self::Notion(generator) => {
                generator
                    .create(incident, participants, timeline, title)
                    .await
            }
            Self::Awork(generator) => {
                generator
                    .create(incident, participants, timeline, title)
                    .await
            }
        }
    }

    pub async fn connectivity_test(&self) -> bool {
        match self {
            Self::Notion(generator) => generator.connectivity_test().await,
            Self::Awork(generator) => generator.connectivity_test().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AworkConfig;

    #[test]
    fn test_from_config_requires_selected_integration() {
        let config = Config::default();
        let err = PostmortemService::from_config(&config).err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_from_config_selects_backend() {
        let mut config = Config::default();
        config.postmortem.backend = PostmortemBackendKind::Awork;
        config.integrations.awork = Some(AworkConfig {
            api_token: "token".to_string(),
            parent: "parent".to_string(),
            template_id: "template".to_string(),
            api_url: "https://api.awork.com/api/v1".to_string(),
            docs_url: "https://app.awork.com/docs".to_string(),
            timeout_secs: 10,
        });

        let service = PostmortemService::from_config(&config).unwrap();
        assert_eq!(service.kind(), PostmortemBackendKind::Awork);
    }
}
