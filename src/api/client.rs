//! WilTV REST client
//!
//! Every authenticated call funnels through [`ApiClient::send_authorized`],
//! which attaches the session token and, when the server answers 401,
//! re-authenticates with the stored credentials and replays the request once.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::session::{SessionError, SessionStore};

/// Default production endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.wiltv.net/api";

/// WilTV API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authorized (401)")]
    Unauthorized,

    #[error("Re-login failed: {0}")]
    ReloginFailed(String),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Resource not found (404)")]
    NotFound,

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Response contained no data")]
    EmptyBody,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Session store error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// True when the user has to sign in again
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized | ApiError::ReloginFailed(_) | ApiError::LoginRejected(_)
        )
    }
}

/// Replayable description of a request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// `{"data": ...}` wrapper used by single-resource endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// `{"message": ...}` error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// WilTV API client
///
/// Cheap to clone; clones share the connection pool and the session store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client against `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Issue an authenticated request, re-logging in once on 401
    pub async fn send_authorized<T: DeserializeOwned>(&self, req: &ApiRequest) -> Result<T, ApiError> {
        let token = self.session.token();
        let response = self.send(req, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::parse(req, response).await;
        }

        warn!(path = %req.path, "authorization failed");
        let Some(credentials) = self.session.credentials() else {
            warn!(path = %req.path, "no stored credentials, cannot re-login");
            return Err(ApiError::Unauthorized);
        };

        let token = match self.relogin(&credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(path = %req.path, "re-login failed: {}", e);
                return Err(ApiError::ReloginFailed(e.to_string()));
            }
        };

        info!(path = %req.path, "re-login succeeded, retrying request");
        let retry = self.send(req, Some(&token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %req.path, "request still unauthorized after re-login");
            return Err(ApiError::Unauthorized);
        }
        Self::parse(req, retry).await
    }

    /// Issue a request that carries no token (login endpoints)
    pub(crate) async fn send_public<T: DeserializeOwned>(&self, req: &ApiRequest) -> Result<T, ApiError> {
        let response = self.send(req, None).await?;
        let status = response.status();
        if status.is_success() {
            return Self::parse(req, response).await;
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("status {}", status.as_u16()));
        warn!(path = %req.path, status = status.as_u16(), "login rejected: {}", message);
        Err(ApiError::LoginRejected(message))
    }

    async fn send(&self, req: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, req.path);
        debug!(method = %req.method, %url, "sending request");

        let mut builder = self
            .client
            .request(req.method.clone(), &url)
            .header("Accept", "application/json");
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            warn!(%url, "transport failure: {}", e);
            ApiError::RequestFailed(e)
        })
    }

    async fn parse<T: DeserializeOwned>(req: &ApiRequest, response: reqwest::Response) -> Result<T, ApiError> {
        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                if body.trim().is_empty() {
                    return Err(ApiError::EmptyBody);
                }
                serde_json::from_str(&body).map_err(|e| {
                    warn!(path = %req.path, "unparsable response: {}", e);
                    ApiError::InvalidResponse(format!("JSON parse error: {}", e))
                })
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status => {
                warn!(path = %req.path, status = status.as_u16(), "request failed");
                Err(ApiError::Status(status.as_u16()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_params() {
        let req = ApiRequest::get("/movies").param("page", 2).param("hero_section", 1);
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("hero_section".to_string(), "1".to_string())
            ]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(ApiError::Unauthorized.is_auth_failure());
        assert!(ApiError::ReloginFailed("x".into()).is_auth_failure());
        assert!(!ApiError::Status(500).is_auth_failure());
        assert!(!ApiError::NotFound.is_auth_failure());
    }

    #[test]
    fn test_data_envelope_null() {
        let env: DataEnvelope<u32> = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(env.data.is_none());
        let env: DataEnvelope<u32> = serde_json::from_str(r#"{}"#).unwrap();
        assert!(env.data.is_none());
    }
}
