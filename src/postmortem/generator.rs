use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::integrations::Lookup;
use crate::models::{IncidentEvent, IncidentParticipant, IncidentRecord};
use crate::postmortem::backend::PostmortemBackend;
use crate::postmortem::render::PostmortemContext;

/// Creates postmortems on a document platform.
///
/// A call either returns the URL of exactly one new resource or fails
/// before anything was created remotely; there are no retries.
pub struct PostmortemGenerator<B: PostmortemBackend> {
    backend: B,
    workspace_id: String,
}

impl<B: PostmortemBackend> PostmortemGenerator<B> {
    pub fn new(backend: B, workspace_id: impl Into<String>) -> Self {
        Self {
            backend,
            workspace_id: workspace_id.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create a postmortem titled `title` and return its URL
    pub async fn create(
        &self,
        incident: &IncidentRecord,
        participants: &[IncidentParticipant],
        timeline: &[IncidentEvent],
        title: &str,
    ) -> Result<String> {
        let backend = self.backend.name();
        let parent_id = self.backend.parent_id();

        info!(
            backend,
            title = %title,
            parent_id = %parent_id,
            "Creating postmortem"
        );

        let required = self.backend.required_resource();
        match self.backend.lookup(required).await {
            Lookup::Found(()) => {}
            Lookup::NotFound => {
                error!(backend, resource_id = %required, "Couldn't create postmortem, resource does not exist");
                return Err(AppError::ParentNotFound(required.to_string()));
            }
            Lookup::Failed(e) => {
                error!(backend, resource_id = %required, error = %e, "Couldn't create postmortem, existence check failed");
                return Err(AppError::ParentNotFound(required.to_string()));
            }
        }

        let template_id = self.backend.template_id();
        info!(backend, template_id = %template_id, "Fetching postmortem template");

        let template = match self.backend.fetch_template().await {
            Lookup::Found(template) => template,
            Lookup::NotFound => {
                error!(backend, template_id = %template_id, "Failed to retrieve template content");
                return Err(AppError::TemplateUnavailable(template_id.to_string()));
            }
            Lookup::Failed(e) => {
                error!(backend, template_id = %template_id, error = %e, "Failed to retrieve template content");
                return Err(AppError::TemplateUnavailable(template_id.to_string()));
            }
        };

        let ctx = PostmortemContext {
            incident,
            participants,
            timeline,
            workspace_id: &self.workspace_id,
        };
        let payload = self.backend.prepare(template, &ctx);

        match self.backend.create(title, parent_id, payload).await {
            Ok(url) => {
                info!(backend, url = %url, "Postmortem created successfully");
                Ok(url)
            }
            Err(e) => {
                error!(backend, title = %title, error = %e, "Error creating postmortem");
                Err(e)
            }
        }
    }

    /// Startup connectivity check
    pub async fn connectivity_test(&self) -> bool {
        self.backend
            .lookup(self.backend.required_resource())
            .await
            .is_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory backend recording what it was asked to create
    struct FakeBackend {
        exists: bool,
        template: Option<String>,
        created: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeBackend {
        fn new(exists: bool, template: Option<&str>) -> Self {
            Self {
                exists,
                template: template.map(str::to_string),
                created: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PostmortemBackend for FakeBackend {
        type Payload = String;

        fn name(&self) -> &'static str {
            "fake"
        }

        fn parent_id(&self) -> &str {
            "parent"
        }

        fn template_id(&self) -> &str {
            "template"
        }

        fn required_resource(&self) -> &str {
            "parent"
        }

        async fn lookup(&self, _id: &str) -> Lookup<()> {
            if self.exists {
                Lookup::Found(())
            } else {
                Lookup::NotFound
            }
        }

        async fn fetch_template(&self) -> Lookup<String> {
            match &self.template {
                Some(t) => Lookup::Found(t.clone()),
                None => Lookup::Failed(AppError::Network("unreachable".to_string())),
            }
        }

        fn prepare(&self, template: String, ctx: &PostmortemContext<'_>) -> String {
            crate::postmortem::render::render_template(&template, ctx)
        }

        async fn create(&self, title: &str, parent_id: &str, payload: String) -> Result<String> {
            self.created.lock().unwrap().push((
                title.to_string(),
                parent_id.to_string(),
                payload,
            ));
            Ok(format!("https://docs.example.com/{}", title))
        }
    }

    fn incident() -> IncidentRecord {
        IncidentRecord {
            severity: Some("sev2".to_string()),
            channel_id: "C1".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_renders_and_returns_url() {
        let generator = PostmortemGenerator::new(
            FakeBackend::new(true, Some("Severity: !ib-inject-severity")),
            "acme",
        );

        let url = generator
            .create(&incident(), &[], &[], "pm-1")
            .await
            .unwrap();

        assert_eq!(url, "https://docs.example.com/pm-1");
        let created = generator.backend().created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0],
            (
                "pm-1".to_string(),
                "parent".to_string(),
                "Severity: sev2".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_missing_parent_creates_nothing() {
        let generator = PostmortemGenerator::new(FakeBackend::new(false, Some("x")), "acme");

        let err = generator
            .create(&incident(), &[], &[], "pm-1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ParentNotFound(ref id) if id == "parent"));
        assert!(generator.backend().created.lock().unwrap().is_empty());
        assert!(!generator.connectivity_test().await);
    }

    #[tokio::test]
    async fn test_unavailable_template_creates_nothing() {
        let generator = PostmortemGenerator::new(FakeBackend::new(true, None), "acme");

        let err = generator
            .create(&incident(), &[], &[], "pm-1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TemplateUnavailable(ref id) if id == "template"));
        assert!(generator.backend().created.lock().unwrap().is_empty());
        assert!(generator.connectivity_test().await);
    }
}
