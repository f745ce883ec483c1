//! Typed Rust client for the Nimbus Cloud compute API.
//!
//! Covers the server resource: create, get, change desired run state,
//! delete. Retry policy is the caller's concern — every call maps to
//! exactly one HTTP request.

mod types;

pub use types::*;

const BASE_URL: &str = "https://api.nimbus-cloud.ch/v1";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nimbus api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("nimbus api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The resource does not exist (404). Surfaced as its own kind so
    /// callers can treat an already-gone server as a valid state.
    #[error("resource not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Client for the Nimbus Cloud REST API.
#[derive(Clone)]
pub struct NimbusClient {
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl NimbusClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Point the client at a non-default API endpoint (test servers,
    /// regional deployments).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint,
                status,
                body,
            });
        }
        Ok(resp)
    }

    // ── Servers ──────────────────────────────────────────────────────

    pub async fn create_server(&self, req: &CreateServerRequest) -> Result<Server> {
        let resp = self
            .http
            .post(self.url("/servers"))
            .header("Authorization", self.auth())
            .json(req)
            .send()
            .await?;

        Self::check(resp, "create server")
            .await?
            .json()
            .await
            .map_err(Error::from)
    }

    pub async fn get_server(&self, server_uuid: &str) -> Result<Server> {
        let resp = self
            .http
            .get(self.url(&format!("/servers/{server_uuid}")))
            .header("Authorization", self.auth())
            .send()
            .await?;

        Self::check(resp, "get server")
            .await?
            .json()
            .await
            .map_err(Error::from)
    }

    pub async fn update_server(&self, server_uuid: &str, req: &UpdateServerRequest) -> Result<()> {
        let resp = self
            .http
            .patch(self.url(&format!("/servers/{server_uuid}")))
            .header("Authorization", self.auth())
            .json(req)
            .send()
            .await?;

        Self::check(resp, "update server").await?;
        Ok(())
    }

    pub async fn delete_server(&self, server_uuid: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/servers/{server_uuid}")))
            .header("Authorization", self.auth())
            .send()
            .await?;

        Self::check(resp, "delete server").await?;
        Ok(())
    }
}
