use super::ApiClient;
use crate::error::Result;
use crate::model::{Candidate, Voter};

impl ApiClient {
    /// `GET /admin/candidates`.
    pub async fn admin_candidates(&self, token: &str) -> Result<Vec<Candidate>> {
        self.get("/admin/candidates", &[], Some(token)).await
    }

    /// `GET /admin/voters`.
    pub async fn admin_voters(&self, token: &str) -> Result<Vec<Voter>> {
        self.get("/admin/voters", &[], Some(token)).await
    }
}
