//! Document platforms a postmortem can be created on.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::integrations::{AworkClient, Lookup, NotionClient};
use crate::postmortem::render::{render_template, PostmortemContext};

/// A platform that instantiates postmortems from a template
#[async_trait]
pub trait PostmortemBackend: Send + Sync {
    /// What the template is fetched as and what creation consumes
    type Payload: Send + 'static;

    /// Short platform name used in logs
    fn name(&self) -> &'static str;

    /// Container new postmortems are created under
    fn parent_id(&self) -> &str;

    fn template_id(&self) -> &str;

    /// Resource that must exist before anything is fetched or created
    fn required_resource(&self) -> &str;

    async fn lookup(&self, id: &str) -> Lookup<()>;

    /// Fetch the template content
    async fn fetch_template(&self) -> Lookup<Self::Payload>;

    /// Turn the fetched template into the payload for the new resource
    fn prepare(&self, template: Self::Payload, ctx: &PostmortemContext<'_>) -> Self::Payload;

    /// Create the resource and return its URL
    async fn create(&self, title: &str, parent_id: &str, payload: Self::Payload)
        -> Result<String>;
}

/// Notion copies the template page's blocks verbatim; placeholders are not
/// substituted in block content.
#[async_trait]
impl PostmortemBackend for NotionClient {
    type Payload = Vec<Value>;

    fn name(&self) -> &'static str {
        "notion"
    }

    fn parent_id(&self) -> &str {
        self.parent()
    }

    fn template_id(&self) -> &str {
        NotionClient::template_id(self)
    }

    fn required_resource(&self) -> &str {
        self.parent()
    }

    async fn lookup(&self, id: &str) -> Lookup<()> {
        self.lookup_page(id).await
    }

    async fn fetch_template(&self) -> Lookup<Vec<Value>> {
        self.retrieve_page_blocks(NotionClient::template_id(self))
            .await
    }

    fn prepare(&self, template: Vec<Value>, _ctx: &PostmortemContext<'_>) -> Vec<Value> {
        template
    }

    async fn create(&self, title: &str, parent_id: &str, payload: Vec<Value>) -> Result<String> {
        self.create_new_page(title, parent_id, payload).await
    }
}

/// awork stores the template as HTML, rendered before upload
#[async_trait]
impl PostmortemBackend for AworkClient {
    type Payload = String;

    fn name(&self) -> &'static str {
        "awork"
    }

    fn parent_id(&self) -> &str {
        self.parent()
    }

    fn template_id(&self) -> &str {
        AworkClient::template_id(self)
    }

    fn required_resource(&self) -> &str {
        AworkClient::template_id(self)
    }

    async fn lookup(&self, id: &str) -> Lookup<()> {
        self.lookup_document(id).await
    }

    /// An empty template counts as not found
    async fn fetch_template(&self) -> Lookup<String> {
        match self
            .lookup_document_content(AworkClient::template_id(self))
            .await
        {
            Lookup::Found(content) if content.is_empty() => Lookup::NotFound,
            other => other,
        }
    }

    fn prepare(&self, template: String, ctx: &PostmortemContext<'_>) -> String {
        render_template(&template, ctx)
    }

    async fn create(&self, title: &str, parent_id: &str, payload: String) -> Result<String> {
        self.try_create_document(title, parent_id, &payload).await
    }
}
