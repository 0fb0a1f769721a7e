use crate::config::AworkConfig;
use crate::error::{AppError, Result};
use crate::integrations::{build_http_client, rejected, send_lookup, Lookup};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{error, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const POSTMORTEM_EMOJI: &str = "🔥";

/// awork documents API client
#[derive(Clone)]
pub struct AworkClient {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) api_url: String,
    pub(crate) docs_url: String,
    pub(crate) parent: String,
    pub(crate) template_id: String,
}

impl AworkClient {
    /// Create a new awork client
    pub fn new(config: &AworkConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            api_token: config.api_token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            docs_url: config.docs_url.trim_end_matches('/').to_string(),
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

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.api_token)
    }

    /// Read a document and report whether it is there
    pub async fn lookup_document(&self, doc_id: &str) -> Lookup<()> {
        send_lookup(
            self.get(&format!("/documents/{}", doc_id)),
            "Failed to fetch awork document",
        )
        .await
        .map(|_| ())
    }

    /// Whether a document exists. Errors other than 404 also read as `false`.
    pub async fn document_exists(&self, doc_id: &str) -> bool {
        match self.lookup_document(doc_id).await {
            Lookup::Found(()) => true,
            Lookup::NotFound => {
                info!(doc_id = %doc_id, "awork document does not exist");
                false
            }
            Lookup::Failed(e) => {
                error!(doc_id = %doc_id, error = %e, "Error checking awork document existence");
                false
            }
        }
    }

    /// Raw document body, decoded as UTF-8
    pub async fn lookup_document_content(&self, doc_id: &str) -> Lookup<String> {
        let request = self
            .get(&format!("/documents/{}/content", doc_id))
            .query(&[("streamAsFile", "true")]);

        let response = match send_lookup(request, "Failed to fetch awork document content").await {
            Lookup::Found(response) => response,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::Failed(e) => return Lookup::Failed(e),
        };

        match response.bytes().await {
            Ok(bytes) => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
                Lookup::Found(String::from_utf8_lossy(body).into_owned())
            }
            Err(e) => Lookup::Failed(AppError::from_transport(
                "Failed to read awork document content",
                e,
            )),
        }
    }

    pub async fn get_document_content(&self, doc_id: &str) -> Option<String> {
        match self.lookup_document_content(doc_id).await {
            Lookup::Found(content) => Some(content),
            Lookup::NotFound => {
                error!(doc_id = %doc_id, "awork document content not found");
                None
            }
            Lookup::Failed(e) => {
                error!(doc_id = %doc_id, error = %e, "Error fetching awork document content");
                None
            }
        }
    }

    /// Document metadata, keeping a 404 apart from other failures
    pub async fn lookup_document_json(&self, doc_id: &str) -> Lookup<Value> {
        let response = match send_lookup(
            self.get(&format!("/documents/{}", doc_id)),
            "Failed to fetch awork document",
        )
        .await
        {
            Lookup::Found(response) => response,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::Failed(e) => return Lookup::Failed(e),
        };

        match response.json::<Value>().await {
            Ok(document) => Lookup::Found(document),
            Err(e) => Lookup::Failed(AppError::from_transport(
                "Failed to parse awork document",
                e,
            )),
        }
    }

    /// Document metadata as returned by the API
    pub async fn get_document(&self, doc_id: &str) -> Option<Value> {
        match self.lookup_document_json(doc_id).await {
            Lookup::Found(document) => Some(document),
            Lookup::NotFound => {
                error!(doc_id = %doc_id, "awork document not found");
                None
            }
            Lookup::Failed(e) => {
                error!(doc_id = %doc_id, error = %e, "Error fetching awork document");
                None
            }
        }
    }

    /// Create a document under `parent_id` and return its URL.
    ///
    /// The parent's `documentSpaceId` is required by the API, so the parent
    /// is read first and nothing is created when it or its space is missing.
    pub async fn try_create_document(
        &self,
        name: &str,
        parent_id: &str,
        content: &str,
    ) -> Result<String> {
        let parent = match self.lookup_document_json(parent_id).await {
            Lookup::Found(parent) => parent,
            Lookup::NotFound => {
                return Err(AppError::NotFound(format!(
                    "awork parent document {}",
                    parent_id
                )))
            }
            Lookup::Failed(e) => return Err(e),
        };

        let document_space_id = parent
            .get("documentSpaceId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::MissingPrerequisite(format!(
                    "parent document {} has no documentSpaceId",
                    parent_id
                ))
            })?
            .to_string();

        info!(
            parent_id = %parent_id,
            document_space_id = %document_space_id,
            "Using documentSpaceId from parent document"
        );

        let form = document_form(name, parent_id, &document_space_id, content)?;

        let response = self
            .client
            .post(format!("{}/documents", self.api_url))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::from_transport("Failed to create awork document", e))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: Value = response
            .json()
            .await
            .map_err(|e| AppError::from_transport("Failed to parse awork document", e))?;

        let doc_id = created
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::Serialization("awork response is missing the document id".to_string())
            })?;

        Ok(format!("{}/{}", self.docs_url, doc_id))
    }

    /// Like [`try_create_document`](Self::try_create_document), logging and
    /// discarding the failure reason.
    pub async fn create_document(
        &self,
        name: &str,
        parent_id: &str,
        content: &str,
    ) -> Option<String> {
        match self.try_create_document(name, parent_id, content).await {
            Ok(url) => Some(url),
            Err(e) => {
                error!(parent_id = %parent_id, error = %e, "Error creating awork document");
                None
            }
        }
    }

    /// Connectivity check against the configured template document
    pub async fn test(&self) -> bool {
        let ok = self.document_exists(&self.template_id).await;
        if !ok {
            error!(
                template_id = %self.template_id,
                "awork connectivity check failed, please check awork configuration"
            );
        }
        ok
    }
}

/// Multipart body for `POST /documents`.
///
/// Content goes in as an HTML file encoded UTF-8 with a BOM; without the BOM
/// awork guesses the charset and mangles non-ASCII text.
fn document_form(
    name: &str,
    parent_id: &str,
    document_space_id: &str,
    content: &str,
) -> Result<Form> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + content.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(content.as_bytes());

    let file = Part::bytes(bytes)
        .file_name("document.html")
        .mime_str("text/html; charset=utf-8")
        .map_err(|e| AppError::Validation(format!("Invalid content type: {}", e)))?;

    Ok(Form::new()
        .text("name", name.to_string())
        .text("emoji", POSTMORTEM_EMOJI)
        .text("parentId", parent_id.to_string())
        .text("documentSpaceId", document_space_id.to_string())
        .part("content", file))
}
