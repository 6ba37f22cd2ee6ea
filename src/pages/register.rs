use std::fmt::{Display, Formatter};

use log::{info, warn};

use crate::api::ApiClient;
use crate::error::Result;
use crate::model::api::RegisterRequest;
use crate::router::Route;
use crate::session::SessionStore;

/// `/register`.
#[derive(Debug, Clone, Default)]
pub struct RegisterPage {
    message: Option<String>,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Create the account. If the server signs it in straight away the
    /// session is started; either way the user is sent to `/login`.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        session: &mut SessionStore,
        request: &RegisterRequest,
    ) -> Result<Route> {
        self.message = None;
        let result: Result<Route> = async {
            if let Some((token, user)) = api.register(request).await?.into_session() {
                session.login(token, user)?;
            } else {
                info!("Registered {}; sign-in required", request.email);
            }
            Ok(Route::Login)
        }
        .await;

        self.message = Some(match &result {
            Ok(_) => "Registered successfully!".to_string(),
            Err(e) => {
                warn!("Registration failed: {e}");
                e.user_message()
            }
        });
        result
    }
}

impl Display for RegisterPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Register")?;
        writeln!(f, "Full Name, Email, Password")?;
        if let Some(message) = &self.message {
            writeln!(f, "{message}")?;
        }
        Ok(())
    }
}
