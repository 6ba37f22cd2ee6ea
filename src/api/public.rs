use super::ApiClient;
use crate::error::Result;
use crate::model::Election;

impl ApiClient {
    /// `GET /elections`. Public; the token is sent if there is one.
    pub async fn elections(&self, token: Option<&str>) -> Result<Vec<Election>> {
        self.get("/elections", &[], token).await
    }
}
