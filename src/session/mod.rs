//! The client's belief about who is signed in.
//!
//! A [`SessionStore`] is created once at startup from a [`SessionStorage`]
//! port and passed explicitly to every page. The storage is the source of
//! truth across restarts; the in-memory copy mirrors it.

mod storage;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::model::{Role, User};

pub use storage::{FileStorage, MemoryStorage, SessionStorage};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-encoded user record.
pub const USER_KEY: &str = "user";

/// A point-in-time view of the session. Either both parts are present or neither is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// A signed-in session.
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// Nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The token, or [`Error::NotAuthenticated`] so callers can stop before
    /// making a request that would be rejected anyway.
    pub fn require_token(&self) -> Result<&str> {
        self.token().ok_or(Error::NotAuthenticated)
    }

    /// Is there a session with exactly this role?
    pub fn has_role(&self, role: Role) -> bool {
        self.is_authenticated() && self.role() == Some(role)
    }
}

/// Owner of the current [`Session`] and its persistence.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    session: Session,
}

impl SessionStore {
    /// Restore the session persisted in `storage`.
    ///
    /// Anything unreadable is logged and treated as signed out: a malformed
    /// user record, a token without a user or vice versa, or a storage failure.
    pub fn load(storage: impl SessionStorage + 'static) -> Self {
        let session = match read_session(&storage) {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not read persisted session, starting signed out: {e}");
                Session::anonymous()
            }
        };
        if let Some(user) = session.user() {
            info!("Restored {} session for {:?}", user.role, user.name);
        }
        Self {
            storage: Box::new(storage),
            session,
        }
    }

    /// A store with nothing persisted beyond this process.
    pub fn in_memory() -> Self {
        Self::load(MemoryStorage::new())
    }

    /// Persist a new session, then adopt it.
    pub fn login(&mut self, token: impl Into<String>, user: User) -> Result<()> {
        let token = token.into();
        self.storage
            .set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.storage.set(TOKEN_KEY, &token)?;
        info!("Signed in as {} {:?}", user.role, user.name);
        self.session = Session::new(token, user);
        Ok(())
    }

    /// Forget the session, in storage and in memory. Memory is cleared even if
    /// storage fails, so a failed logout never leaves the user signed in here.
    pub fn logout(&mut self) -> Result<()> {
        self.session = Session::anonymous();
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        info!("Signed out");
        token.and(user)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// An owned copy, for handing to work that outlives this borrow.
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}

fn read_session(storage: &dyn SessionStorage) -> Result<Session> {
    let token = storage.get(TOKEN_KEY)?.filter(|token| !token.is_empty());
    let user = match storage.get(USER_KEY)? {
        Some(json) => match serde_json::from_str::<Option<User>>(&json) {
            Ok(user) => user,
            Err(e) => {
                warn!("Ignoring malformed persisted user: {e}");
                None
            }
        },
        None => None,
    };
    match (token, user) {
        (Some(token), Some(user)) => Ok(Session::new(token, user)),
        (None, None) => Ok(Session::anonymous()),
        (token, _) => {
            warn!(
                "Ignoring persisted session with {} but no {}",
                if token.is_some() { "a token" } else { "a user" },
                if token.is_some() { "user" } else { "token" },
            );
            Ok(Session::anonymous())
        }
    }
}
