use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::error::{AdminError, Result};
use crate::model::{
    EntityKind, LoginRequest, LoginResponse, Program, ProgramPayload, University,
    UniversityPayload, User,
};
use crate::session::Session;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; request paths are resolved relative to it.
    pub base_url: Url,
    /// Per-request timeout (default: 30 seconds).
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| AdminError::configuration(format!("invalid API URL {base_url:?}: {e}")))?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the Leaply API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdminError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AdminError::configuration(format!("invalid request path {path:?}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        match self.session.token() {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        }
    }

    /// Issue a request and return the parsed body (`null` when empty).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "api request");

        let mut req = self.request(method.clone(), url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api request failed");
            AdminError::from(e)
        })?;
        self.handle_response(resp).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let value = self.send(Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, &[], Some(&body)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, &[], Some(&body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, &[], None).await.map(|_| ())
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::debug!(status = status.as_u16(), message = ?message, "api error response");
            return Err(match status {
                StatusCode::UNAUTHORIZED => {
                    self.session.expire();
                    AdminError::Unauthorized {
                        status: status.as_u16(),
                        message,
                    }
                }
                StatusCode::FORBIDDEN => AdminError::Unauthorized {
                    status: status.as_u16(),
                    message,
                },
                _ => AdminError::api(status.as_u16(), message),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    // --- Endpoints ---

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let value = self.post("auth/login", credentials).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn list_universities(&self) -> Result<Vec<University>> {
        self.get(EntityKind::University.collection_path(), &[]).await
    }

    pub async fn create_university(&self, payload: &UniversityPayload) -> Result<()> {
        self.post(EntityKind::University.collection_path(), payload)
            .await
            .map(|_| ())
    }

    pub async fn update_university(&self, id: Uuid, payload: &UniversityPayload) -> Result<()> {
        self.put(&EntityKind::University.item_path(id), payload)
            .await
            .map(|_| ())
    }

    pub async fn list_programs(&self, university_id: Option<Uuid>) -> Result<Vec<Program>> {
        let query: Vec<(&str, String)> = university_id
            .map(|id| ("universityId", id.to_string()))
            .into_iter()
            .collect();
        self.get(EntityKind::Program.collection_path(), &query).await
    }

    pub async fn create_program(&self, payload: &ProgramPayload) -> Result<()> {
        self.post(EntityKind::Program.collection_path(), payload)
            .await
            .map(|_| ())
    }

    pub async fn update_program(&self, id: Uuid, payload: &ProgramPayload) -> Result<()> {
        self.put(&EntityKind::Program.item_path(id), payload)
            .await
            .map(|_| ())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.get(EntityKind::User.collection_path(), &[]).await
    }

    /// Delete any entity by kind.
    pub async fn delete_entity(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        self.delete(&kind.item_path(id)).await
    }
}

/// Pull the human-readable `message` out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let cfg = ClientConfig::new("https://api.leaply.dev/v1").unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://api.leaply.dev/v1/");
        let cfg = ClientConfig::new("https://api.leaply.dev/v1///").unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://api.leaply.dev/v1/");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::new("not a url").unwrap_err();
        assert!(matches!(err, AdminError::Configuration(_)));
    }

    #[test]
    fn test_paths_resolve_under_base() {
        let client = ApiClient::new(
            ClientConfig::new("http://localhost:8080/api").unwrap(),
            Session::anonymous(),
        )
        .unwrap();
        assert_eq!(
            client.url("/universities").unwrap().as_str(),
            "http://localhost:8080/api/universities"
        );
        assert_eq!(
            client.url("auth/login").unwrap().as_str(),
            "http://localhost:8080/api/auth/login"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message(r#"{"error":"x"}"#), None);
        assert_eq!(error_message("<html>502</html>"), None);
    }
}
