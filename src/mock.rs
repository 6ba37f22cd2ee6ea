//! An in-process stand-in for the remote voting API, for tests.
//!
//! [`launch`] starts a rocket server on a free local port and returns the
//! shared [`Backend`] state, so tests can seed data, force failures and count
//! the requests each endpoint received.

use std::collections::HashMap;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::{Arc, Mutex};

use rocket::{
    config::{LogLevel, Shutdown},
    fairing::AdHoc,
    http::Status,
    request::{FromRequest, Outcome},
    serde::json::{json, Json, Value},
    Request, State,
};
use tokio::sync::oneshot;

use crate::api::ApiClient;
use crate::config::Config;
use crate::model::{
    api::{AuthResponse, Credentials, RegisterRequest, VerifyRequest, VoteRequest},
    Candidate, Election, ElectionStatus, Id, Role, User, Voter,
};
use crate::session::SessionStore;

pub type Backend = Arc<MockBackend>;

type Reply<T> = Result<Json<T>, (Status, Json<Value>)>;

pub const VOTER_EMAIL: &str = "a@x.com";
pub const VOTER_PASSWORD: &str = "p";
pub const VOTER_TOKEN: &str = "T1";
pub const ADMIN_EMAIL: &str = "admin@x.com";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const ADMIN_TOKEN: &str = "T2";
pub const VERIFIED_NAME: &str = "Ada Lovelace";
pub const VERIFIED_VOTER_ID: &str = "V-1001";
pub const BALLOT_TOKEN: &str = "B-V-1001";

struct Account {
    password: String,
    token: String,
    user: User,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, Account>,
    /// Token to the user it authenticates.
    tokens: HashMap<String, User>,
    candidates: Vec<Candidate>,
    voters: Vec<Voter>,
    elections: Vec<Election>,
    /// Endpoint to the status and message it answers with instead of its usual reply.
    failures: HashMap<String, (Status, String)>,
    /// Requests received, by `METHOD /path`.
    hits: HashMap<String, usize>,
    last_election_query: Option<String>,
    registrations_sign_in: bool,
}

pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    fn seeded() -> Self {
        let mut state = MockState::default();
        for (email, password, token, user) in [
            (VOTER_EMAIL, VOTER_PASSWORD, VOTER_TOKEN, User::example_voter()),
            (ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_TOKEN, User::example_admin()),
        ] {
            state.tokens.insert(token.to_string(), user.clone());
            state.accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    token: token.to_string(),
                    user,
                },
            );
        }
        state.candidates = vec![
            Candidate::new(1, "Alice").with_party("Blue").with_votes(10),
            Candidate::new(5, "Bob").with_party("Green").with_votes(41),
            Candidate::new(7, "Carol").with_votes(3),
        ];
        state.voters = vec![
            Voter {
                id: Id::Num(1),
                name: "Ada".into(),
                email: VOTER_EMAIL.into(),
                voter_id: Some(VERIFIED_VOTER_ID.into()),
            },
            Voter {
                id: Id::from("v2"),
                name: "Brian".into(),
                email: "b@x.com".into(),
                voter_id: None,
            },
        ];
        state.elections = vec![Election {
            id: Id::Num(3),
            title: "Student Union 2026".into(),
            status: ElectionStatus::Active,
            candidates: state.candidates.clone(),
            ..Election::fallback()
        }];
        state.registrations_sign_in = true;
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// How many requests `endpoint` (e.g. `"GET /vote/candidates"`) has received.
    pub fn hits(&self, endpoint: &str) -> usize {
        self.state().hits.get(endpoint).copied().unwrap_or(0)
    }

    /// Make `endpoint` answer with an error until [`Self::recover`] is called.
    pub fn fail(&self, endpoint: &str, status: Status, message: &str) {
        self.state()
            .failures
            .insert(endpoint.to_string(), (status, message.to_string()));
    }

    pub fn recover(&self, endpoint: &str) {
        self.state().failures.remove(endpoint);
    }

    pub fn set_votes(&self, id: &Id, votes: u64) {
        if let Some(candidate) = self.state().candidates.iter_mut().find(|c| &c.id == id) {
            candidate.votes = votes;
        }
    }

    pub fn votes(&self, id: &Id) -> Option<u64> {
        self.state()
            .candidates
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.votes)
    }

    pub fn set_elections(&self, elections: Vec<Election>) {
        self.state().elections = elections;
    }

    pub fn set_voters(&self, voters: Vec<Voter>) {
        self.state().voters = voters;
    }

    /// Whether registration answers with a session or only a bare acknowledgement.
    pub fn set_registrations_sign_in(&self, sign_in: bool) {
        self.state().registrations_sign_in = sign_in;
    }

    pub fn last_election_query(&self) -> Option<String> {
        self.state().last_election_query.clone()
    }

    /// The forced failure for `endpoint`, if any, as a rocket error reply.
    fn check(&self, endpoint: &str) -> Result<(), (Status, Json<Value>)> {
        match self.state().failures.get(endpoint) {
            Some((status, message)) => Err(error(*status, message)),
            None => Ok(()),
        }
    }

    fn user_for(&self, token: &str) -> Option<User> {
        self.state().tokens.get(token).cloned()
    }

    fn require_role(&self, token: &Bearer, role: Role) -> Result<User, (Status, Json<Value>)> {
        match self.user_for(&token.0) {
            Some(user) if user.role == role => Ok(user),
            Some(_) => Err(error(Status::Forbidden, "Access denied")),
            None => Err(error(Status::Unauthorized, "Invalid token")),
        }
    }
}

fn error(status: Status, message: &str) -> (Status, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

/// The bearer token from the `Authorization` header.
struct Bearer(String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Bearer {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req
            .headers()
            .get_one("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            Some(token) => Outcome::Success(Bearer(token.to_string())),
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

#[post("/auth/login", data = "<credentials>")]
fn login(backend: &State<Backend>, credentials: Json<Credentials>) -> Reply<AuthResponse> {
    backend.check("POST /auth/login")?;
    let state = backend.state();
    match state.accounts.get(&credentials.email) {
        Some(account) if account.password == credentials.password => Ok(Json(AuthResponse {
            token: account.token.clone(),
            user: account.user.clone(),
        })),
        _ => Err(error(Status::Unauthorized, "Invalid credentials")),
    }
}

#[post("/auth/register", data = "<request>")]
fn register(backend: &State<Backend>, request: Json<RegisterRequest>) -> Reply<Value> {
    backend.check("POST /auth/register")?;
    let mut state = backend.state();
    if state.accounts.contains_key(&request.email) {
        return Err(error(Status::Conflict, "Email already registered"));
    }
    let token = format!("T-{}", request.email);
    let user = User {
        id: Some(Id::from(request.email.as_str())),
        name: request.name.clone(),
        email: Some(request.email.clone()),
        role: Role::Voter,
    };
    state.tokens.insert(token.clone(), user.clone());
    state.accounts.insert(
        request.email.clone(),
        Account {
            password: request.password.clone(),
            token: token.clone(),
            user: user.clone(),
        },
    );
    if state.registrations_sign_in {
        Ok(Json(json!({ "token": token, "user": user })))
    } else {
        Ok(Json(json!({ "message": "Registered" })))
    }
}

#[post("/vote/verify", data = "<request>")]
fn verify(
    backend: &State<Backend>,
    _token: Option<Bearer>,
    request: Json<VerifyRequest>,
) -> Reply<Value> {
    backend.check("POST /vote/verify")?;
    if request.name != VERIFIED_NAME || request.voter_id != VERIFIED_VOTER_ID {
        return Err(error(Status::NotFound, "Voter not found"));
    }
    backend
        .state()
        .tokens
        .insert(BALLOT_TOKEN.to_string(), User::example_voter());
    Ok(Json(
        json!({ "token": BALLOT_TOKEN, "voterId": VERIFIED_VOTER_ID }),
    ))
}

#[allow(non_snake_case)]
#[get("/vote/candidates?<electionId>")]
fn ballot_candidates(
    backend: &State<Backend>,
    token: Bearer,
    electionId: Option<String>,
) -> Reply<Vec<Candidate>> {
    backend.check("GET /vote/candidates")?;
    backend.require_role(&token, Role::Voter)?;
    let mut state = backend.state();
    state.last_election_query = electionId;
    Ok(Json(state.candidates.clone()))
}

#[post("/vote", data = "<request>")]
fn vote(backend: &State<Backend>, token: Bearer, request: Json<VoteRequest>) -> Reply<Value> {
    backend.check("POST /vote")?;
    backend.require_role(&token, Role::Voter)?;
    let mut state = backend.state();
    match state
        .candidates
        .iter_mut()
        .find(|candidate| candidate.id == request.candidate_id)
    {
        Some(candidate) => {
            candidate.votes += 1;
            Ok(Json(json!({ "votes": candidate.votes })))
        }
        None => Err(error(Status::NotFound, "Candidate not found")),
    }
}

#[get("/admin/candidates")]
fn admin_candidates(backend: &State<Backend>, token: Bearer) -> Reply<Vec<Candidate>> {
    backend.check("GET /admin/candidates")?;
    backend.require_role(&token, Role::Admin)?;
    Ok(Json(backend.state().candidates.clone()))
}

#[get("/admin/voters")]
fn admin_voters(backend: &State<Backend>, token: Bearer) -> Reply<Vec<Voter>> {
    backend.check("GET /admin/voters")?;
    backend.require_role(&token, Role::Admin)?;
    Ok(Json(backend.state().voters.clone()))
}

#[get("/elections")]
fn elections(backend: &State<Backend>) -> Reply<Vec<Election>> {
    backend.check("GET /elections")?;
    Ok(Json(backend.state().elections.clone()))
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "error": "Missing token" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "error": "Not found" }))
}

/// Start the mock API on a free port and wait until it is accepting requests.
pub async fn launch() -> (String, Backend) {
    let port = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .and_then(|listener| listener.local_addr())
        .unwrap()
        .port();
    let config = rocket::Config {
        address: Ipv4Addr::LOCALHOST.into(),
        port,
        log_level: LogLevel::Off,
        shutdown: Shutdown {
            ctrlc: false,
            ..Shutdown::default()
        },
        ..rocket::Config::debug_default()
    };

    let backend: Backend = Arc::new(MockBackend::seeded());
    let (ready_tx, ready_rx) = oneshot::channel();
    let rocket = rocket::custom(config)
        .mount(
            "/",
            routes![
                login,
                register,
                verify,
                ballot_candidates,
                vote,
                admin_candidates,
                admin_voters,
                elections
            ],
        )
        .register("/", catchers![unauthorized, not_found])
        .manage(backend.clone())
        .attach(AdHoc::on_request("Count hits", |req, _| {
            Box::pin(async move {
                if let Some(backend) = req.rocket().state::<Backend>() {
                    let endpoint = format!("{} {}", req.method(), req.uri().path());
                    *backend.state().hits.entry(endpoint).or_default() += 1;
                }
            })
        }))
        .attach(AdHoc::on_liftoff("Signal ready", |_| {
            Box::pin(async move {
                let _ = ready_tx.send(());
            })
        }));

    tokio::spawn(async move {
        if let Err(e) = rocket.launch().await {
            panic!("mock API failed to launch: {e}");
        }
    });
    ready_rx.await.expect("mock API stopped before liftoff");

    (format!("http://127.0.0.1:{port}"), backend)
}

/// Everything a client test needs: a client bound to a fresh mock API, the
/// mock's state, and a session store, signed in as `login` if given.
pub async fn setup(login: Option<Role>) -> (ApiClient, Backend, SessionStore) {
    let (base_url, backend) = launch().await;
    let config = Config::for_base_url(base_url).unwrap();
    let api = ApiClient::new(&config).unwrap();

    let mut session = SessionStore::in_memory();
    let credentials = match login {
        Some(Role::Voter) => Some(Credentials::new(VOTER_EMAIL, VOTER_PASSWORD)),
        Some(Role::Admin) => Some(Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD)),
        None => None,
    };
    if let Some(credentials) = credentials {
        let response = api.login(&credentials).await.unwrap();
        session.login(response.token, response.user).unwrap();
    }

    (api, backend, session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[client_test]
    async fn login_and_list(api: ApiClient, backend: Backend) {
        let response = api
            .login(&Credentials::new(VOTER_EMAIL, VOTER_PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.token, VOTER_TOKEN);
        assert_eq!(response.user.role, Role::Voter);

        let candidates = api.ballot_candidates(None, VOTER_TOKEN).await.unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(backend.hits("GET /vote/candidates"), 1);
    }

    #[client_test]
    async fn errors_carry_server_message(api: ApiClient, backend: Backend) {
        let err = api
            .login(&Credentials::new(VOTER_EMAIL, "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message(), "Invalid credentials");

        backend.fail("GET /elections", Status::ServiceUnavailable, "Down for maintenance");
        let err = api.elections(None).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 503, .. }));
        assert_eq!(err.user_message(), "Down for maintenance");
    }

    #[client_test]
    async fn missing_token_rejected(api: ApiClient) {
        let err = api.admin_voters("nonsense").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message(), "Invalid token");

        let err = api.admin_voters(VOTER_TOKEN).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[client_test]
    async fn election_filter_is_sent(api: ApiClient, backend: Backend) {
        api.ballot_candidates(Some(&Id::Num(3)), VOTER_TOKEN)
            .await
            .unwrap();
        assert_eq!(backend.last_election_query().as_deref(), Some("3"));
    }

    #[client_test]
    async fn validation_happens_before_sending(api: ApiClient, backend: Backend) {
        let err = api.login(&Credentials::new("", "p")).await.unwrap_err();
        assert!(matches!(err, Error::Validation("Email")));
        assert_eq!(backend.hits("POST /auth/login"), 0);
    }
}
