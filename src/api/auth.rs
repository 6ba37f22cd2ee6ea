use super::ApiClient;
use crate::error::Result;
use crate::model::api::{AuthResponse, Credentials, RegisterRequest, RegisterResponse};

impl ApiClient {
    /// `POST /auth/login`. Voters and admins share the endpoint; the returned
    /// user record says which one signed in.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        credentials.validate()?;
        self.post("/auth/login", credentials, None).await
    }

    /// `POST /auth/register`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        request.validate()?;
        self.post("/auth/register", request, None).await
    }
}
