use std::fmt::{Display, Formatter};

use log::warn;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::model::{api::Credentials, Role};
use crate::router::Route;
use crate::session::SessionStore;

/// Which sign-in form this is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Portal {
    Voter,
    Admin,
}

/// `/login` and `/admin/login`.
#[derive(Debug, Clone)]
pub struct LoginPage {
    portal: Portal,
    error: Option<String>,
}

impl LoginPage {
    pub fn voter() -> Self {
        Self {
            portal: Portal::Voter,
            error: None,
        }
    }

    pub fn admin() -> Self {
        Self {
            portal: Portal::Admin,
            error: None,
        }
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sign in and return where to go next. The admin form refuses accounts
    /// that aren't admins, and nothing is persisted for them.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        session: &mut SessionStore,
        credentials: &Credentials,
    ) -> Result<Route> {
        self.error = None;
        let result = self.sign_in(api, session, credentials).await;
        if let Err(e) = &result {
            warn!("Sign-in failed: {e}");
            self.error = Some(e.user_message());
        }
        result
    }

    async fn sign_in(
        &self,
        api: &ApiClient,
        session: &mut SessionStore,
        credentials: &Credentials,
    ) -> Result<Route> {
        let response = api.login(credentials).await?;
        if self.portal == Portal::Admin && !response.user.is_admin() {
            return Err(Error::WrongRole(Role::Admin));
        }
        let role = response.user.role;
        session.login(response.token, response.user)?;
        Ok(match role {
            Role::Admin => Route::Admin,
            Role::Voter => Route::Vote(None),
        })
    }
}

impl Display for LoginPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.portal {
            Portal::Voter => writeln!(f, "Voter Login")?,
            Portal::Admin => writeln!(f, "Admin Login")?,
        }
        writeln!(f, "Email, Password")?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        Ok(())
    }
}
