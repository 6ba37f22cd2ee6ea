//! The gateway to the remote voting API.
//!
//! [`ApiClient`] issues one-shot JSON requests: no retry, no backoff and no
//! timeout. The endpoint wrappers are grouped by area in the submodules.

use log::{info, warn};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::RequestId;

mod admin;
mod auth;
mod public;
mod voting;

pub use voting::CandidateScope;

/// An HTTP client bound to one API base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `body` (if any) as JSON to `path`, authenticating with `token` (if any),
    /// and decode the JSON response.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(method, path, &[], body, token).await
    }

    pub(crate) async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(Method::GET, path, query, None, token)
            .await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), token).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let id = RequestId::next();
        info!("->req{id} {method} {path}");

        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("<-rsp{id} no response: {e}");
            Error::Network(e)
        })?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            warn!("<-rsp{id} {status}: {message}");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        info!("<-rsp{id} {status}");

        Ok(serde_json::from_str(&text)?)
    }
}

/// Pull a human-readable message out of an error response.
///
/// JSON bodies of the form `{"error": ...}` or `{"message": ...}` yield that
/// field; other bodies are used verbatim; empty bodies fall back to the
/// status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let field = ["error", "message"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str));
        if let Some(message) = field {
            return message.to_string();
        }
    }
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Backend, VOTER_TOKEN};
    use crate::model::api::{VoteRequest, VoteResponse};
    use crate::model::{Election, Id};

    #[test]
    fn message_from_json_field() {
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid credentials"}"#),
            "Invalid credentials"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Already voted"}"#),
            "Already voted"
        );
    }

    #[test]
    fn message_from_text_or_status() {
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, "  Admins only\n"),
            "Admins only"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, r#"{"code":17}"#),
            r#"{"code":17}"#
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Bind then drop a listener so nothing is accepting on the port.
        let port = std::net::TcpListener::bind(("127.0.0.1", 0))
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = Config::for_base_url(format!("http://127.0.0.1:{port}")).unwrap();
        let api = ApiClient::new(&config).unwrap();

        let result: Result<Value> = api.get("/elections", &[], None).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[client_test]
    async fn request_without_token_or_body(api: ApiClient, backend: Backend) {
        let elections: Vec<Election> = api
            .request::<(), _>(Method::GET, "/elections", None, None)
            .await
            .unwrap();
        assert_eq!(elections[0].title, "Student Union 2026");
        assert_eq!(backend.hits("GET /elections"), 1);
    }

    #[client_test]
    async fn request_with_token_and_body(api: ApiClient, backend: Backend) {
        let body = VoteRequest {
            candidate_id: Id::Num(1),
        };
        let response: VoteResponse = api
            .request(Method::POST, "/vote", Some(&body), Some(VOTER_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.votes, 11);
        assert_eq!(backend.votes(&Id::Num(1)), Some(11));

        let err = api
            .request::<_, VoteResponse>(Method::POST, "/vote", Some(&body), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(backend.votes(&Id::Num(1)), Some(11));
    }
}
