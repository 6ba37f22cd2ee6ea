//! Paths, pages, and who may see them.
//!
//! Gating here is a convenience that keeps users away from pages they can't
//! use. It is not a security boundary: the server rejects unauthorised calls
//! on its own.

use std::fmt::{Display, Formatter};

use crate::model::{Id, Role};
use crate::session::Session;

/// Most redirects a single navigation will follow.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    AdminLogin,
    /// The ballot, optionally for one election.
    Vote(Option<Id>),
    Results,
    Admin,
}

impl Route {
    /// Match a path, ignoring any query string, fragment or trailing slash.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["admin", "login"] => Route::AdminLogin,
            ["admin"] => Route::Admin,
            ["vote"] => Route::Vote(None),
            ["vote", election] => Route::Vote(Some(Id::from(*election))),
            ["results"] => Route::Results,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::AdminLogin => "/admin/login".to_string(),
            Route::Vote(None) => "/vote".to_string(),
            Route::Vote(Some(election)) => format!("/vote/{election}"),
            Route::Results => "/results".to_string(),
            Route::Admin => "/admin".to_string(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// What to do with a request for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// Decide, for one path, whether to render its page or redirect elsewhere.
pub fn resolve(path: &str, session: &Session) -> Navigation {
    let Some(route) = Route::parse(path) else {
        return Navigation::Redirect(Route::Home);
    };
    let voter = session.has_role(Role::Voter);
    let admin = session.has_role(Role::Admin);

    match route {
        Route::Login | Route::Register if voter => Navigation::Redirect(Route::Vote(None)),
        Route::AdminLogin if admin => Navigation::Redirect(Route::Admin),
        Route::Vote(_) if !voter => Navigation::Redirect(Route::Login),
        Route::Results if !session.is_authenticated() => Navigation::Redirect(Route::Login),
        Route::Admin if !admin => Navigation::Redirect(Route::AdminLogin),
        route => Navigation::Render(route),
    }
}

/// Follow redirects from `path` to the page that finally renders.
/// Returns that page and every redirect taken on the way.
pub fn navigate(path: &str, session: &Session) -> (Route, Vec<Route>) {
    let mut redirects = Vec::new();
    let mut next = path.to_string();
    loop {
        match resolve(&next, session) {
            Navigation::Render(route) => return (route, redirects),
            Navigation::Redirect(route) => {
                next = route.path();
                redirects.push(route);
                if redirects.len() >= MAX_REDIRECTS {
                    // Unreachable with the rules above; home is always renderable.
                    return (Route::Home, redirects);
                }
            }
        }
    }
}

/// Header links for the current session.
pub fn nav_links(session: &Session) -> Vec<(&'static str, Route)> {
    if !session.is_authenticated() {
        return vec![
            ("Login", Route::Login),
            ("Register", Route::Register),
            ("Admin", Route::AdminLogin),
        ];
    }
    let mut links = vec![("Home", Route::Home)];
    if session.has_role(Role::Voter) {
        links.push(("Vote", Route::Vote(None)));
    }
    links.push(("Results", Route::Results));
    if session.has_role(Role::Admin) {
        links.push(("Admin Dashboard", Route::Admin));
    }
    links
}

/// Where to send a user who just logged out with the given role.
pub fn after_logout(role: Option<Role>) -> Route {
    match role {
        Some(Role::Admin) => Route::AdminLogin,
        _ => Route::Login,
    }
}
