//! Clients for the third-party platforms postmortems and meetings live on.

pub mod awork;
pub mod notion;
pub mod zoom;

pub use awork::AworkClient;
pub use notion::NotionClient;
pub use zoom::ZoomClient;

use crate::error::{AppError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Outcome of reading a remote resource.
///
/// Keeps "the resource is not there" apart from "we could not tell", so
/// callers that only want a yes/no can collapse it while the detail stays
/// available for logging.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(AppError),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(e) => Lookup::Failed(e),
        }
    }
}

/// Build an HTTP client with the integration's request deadline
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Send a read request and sort the answer into found / 404 / failure
pub(crate) async fn send_lookup(request: RequestBuilder, context: &str) -> Lookup<Response> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return Lookup::Failed(AppError::from_transport(context, e)),
    };

    match response.status() {
        status if status.is_success() => Lookup::Found(response),
        StatusCode::NOT_FOUND => Lookup::NotFound,
        _ => Lookup::Failed(rejected(response).await),
    }
}

/// Turn a non-success response into an `UpstreamRejected` error
pub(crate) async fn rejected(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::UpstreamRejected { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_helpers() {
        let found: Lookup<u8> = Lookup::Found(7);
        assert!(found.is_found());
        assert_eq!(found.map(|v| v * 2).found(), Some(14));

        let missing: Lookup<u8> = Lookup::NotFound;
        assert!(!missing.is_found());
        assert!(missing.found().is_none());

        let failed: Lookup<u8> = Lookup::Failed(AppError::Network("down".to_string()));
        assert!(matches!(failed.map(|v| v + 1), Lookup::Failed(AppError::Network(_))));
    }

    #[tokio::test]
    async fn test_send_lookup_classifies_statuses() {
        let mut server = mockito::Server::new_async().await;
        let ok = server.mock("GET", "/ok").with_status(200).create_async().await;
        let missing = server.mock("GET", "/missing").with_status(404).create_async().await;
        let broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = build_http_client(5).unwrap();

        let found = send_lookup(client.get(format!("{}/ok", server.url())), "ok").await;
        assert!(found.is_found());

        let not_found = send_lookup(client.get(format!("{}/missing", server.url())), "missing").await;
        assert!(matches!(not_found, Lookup::NotFound));

        let failed = send_lookup(client.get(format!("{}/broken", server.url())), "broken").await;
        match failed {
            Lookup::Failed(AppError::UpstreamRejected { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected lookup: {:?}", other),
        }

        ok.assert_async().await;
        missing.assert_async().await;
        broken.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_lookup_transport_failure() {
        let client = build_http_client(5).unwrap();
        // Nothing listens on port 9 locally
        let lookup = send_lookup(client.get("http://127.0.0.1:9/unreachable"), "unreachable").await;
        assert!(matches!(lookup, Lookup::Failed(AppError::Network(_))));
    }

    #[tokio::test]
    async fn test_send_lookup_deadline_exceeded() {
        // Accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = build_http_client(1).unwrap();
        let lookup = send_lookup(client.get(format!("http://{}/slow", addr)), "slow").await;

        match lookup {
            Lookup::Failed(err @ AppError::Timeout(_)) => {
                assert_eq!(err.error_code(), "TIMEOUT");
                assert!(err.to_string().contains("slow"));
            }
            other => panic!("unexpected lookup: {:?}", other),
        }
        silent.abort();
    }
}
