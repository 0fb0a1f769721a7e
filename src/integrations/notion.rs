use crate::config::NotionConfig;
use crate::error::{AppError, Result};
use crate::integrations::{build_http_client, rejected, send_lookup, Lookup};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

/// Notion pages API client
#[derive(Clone)]
pub struct NotionClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) api_url: String,
    pub(crate) notion_version: String,
    pub(crate) parent: String,
    pub(crate) template_id: String,
}

#[derive(Debug, Serialize)]
struct NewPageRequest {
    parent: PageParent,
    properties: PageProperties,
    children: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct PageParent {
    page_id: String,
}

#[derive(Debug, Serialize)]
struct PageProperties {
    title: TitleProperty,
}

#[derive(Debug, Serialize)]
struct TitleProperty {
    title: Vec<RichText>,
}

#[derive(Debug, Serialize)]
struct RichText {
    text: TextContent,
}

#[derive(Debug, Serialize)]
struct TextContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct BlockChildrenResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct NewPageResponse {
    url: String,
}

impl NotionClient {
    /// Create a new Notion client
    pub fn new(config: &NotionConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            notion_version: config.notion_version.clone(),
            parent: config.parent.clone(),
            template_id: config.template_id.clone(),
        })
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.notion_version)
    }

    /// Read a page and report whether it is there
    pub async fn lookup_page(&self, page_id: &str) -> Lookup<()> {
        let request = self.authorized(
            self.client
                .get(format!("{}/pages/{}", self.api_url, page_id)),
        );

        send_lookup(request, "Failed to fetch Notion page")
            .await
            .map(|_| ())
    }

    /// Whether a page exists. Errors other than 404 also read as `false`.
    pub async fn page_exists(&self, page_id: &str) -> bool {
        match self.lookup_page(page_id).await {
            Lookup::Found(()) => true,
            Lookup::NotFound => {
                info!(page_id = %page_id, "Notion page does not exist");
                false
            }
            Lookup::Failed(e) => {
                error!(page_id = %page_id, error = %e, "Error checking Notion page existence");
                false
            }
        }
    }

    /// Top-level blocks of a page.
    ///
    /// Blocks with children are dropped: copying nested content would need a
    /// request per block and is not supported.
    pub async fn retrieve_page_blocks(&self, page_id: &str) -> Lookup<Vec<Value>> {
        let request = self.authorized(
            self.client
                .get(format!("{}/blocks/{}/children", self.api_url, page_id)),
        );

        let response = match send_lookup(request, "Failed to fetch Notion blocks").await {
            Lookup::Found(response) => response,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::Failed(e) => return Lookup::Failed(e),
        };

        match response.json::<BlockChildrenResponse>().await {
            Ok(body) => Lookup::Found(without_nested_blocks(body.results)),
            Err(e) => Lookup::Failed(AppError::from_transport(
                "Failed to parse Notion blocks",
                e,
            )),
        }
    }

    /// Create a page under `parent_page_id` and return its URL
    pub async fn create_new_page(
        &self,
        title: &str,
        parent_page_id: &str,
        blocks: Vec<Value>,
    ) -> Result<String> {
        let payload = NewPageRequest {
            parent: PageParent {
                page_id: parent_page_id.to_string(),
            },
            properties: PageProperties {
                title: TitleProperty {
                    title: vec![RichText {
                        text: TextContent {
                            content: title.to_string(),
                        },
                    }],
                },
            },
            children: blocks,
        };

        let response = self
            .authorized(self.client.post(format!("{}/pages", self.api_url)))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::from_transport("Failed to create Notion page", e))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let page: NewPageResponse = response
            .json()
            .await
            .map_err(|e| AppError::from_transport("Failed to parse Notion page", e))?;

        Ok(page.url)
    }

    /// Connectivity check against the configured parent page
    pub async fn test(&self) -> bool {
        let ok = self.page_exists(&self.parent).await;
        if !ok {
            error!(
                parent = %self.parent,
                "Notion connectivity check failed, please check Notion configuration"
            );
        }
        ok
    }
}

fn without_nested_blocks(blocks: Vec<Value>) -> Vec<Value> {
    blocks
        .into_iter()
        .filter(|block| {
            !block
                .get("has_children")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .collect()
}
