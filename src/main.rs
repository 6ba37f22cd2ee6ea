//! Command-line front end: one subcommand per page, each routed through the
//! same access rules as the pages themselves.

use std::io::{self, BufRead, Write};

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::error;

use vote_client::{
    api::ApiClient,
    config::Config,
    error::Result,
    logging,
    model::{
        api::{Credentials, RegisterRequest, VerifyRequest},
        Id,
    },
    pages::{AdminDashboard, HomePage, LoginPage, Portal, RegisterPage, ResultsPage, VotingPage},
    router::{self, after_logout, nav_links, Navigation, Route},
    session::{FileStorage, SessionStore},
};

const PROGRAM_NAME: &str = "vote-client";

const ABOUT_TEXT: &str = "Sign in, vote, and follow results on an online voting platform.

EXIT CODES:
   0: Success.
   1: Error, or the page reported one.
   2: The page redirected elsewhere (e.g. not signed in).";

const EMAIL: &str = "EMAIL";
const PASSWORD: &str = "PASSWORD";
const NAME: &str = "NAME";
const PATH: &str = "PATH";
const VOTER_ID: &str = "VOTER_ID";
const ELECTION: &str = "ELECTION";
const CANDIDATE: &str = "CANDIDATE";
const YES: &str = "YES";
const WATCH: &str = "WATCH";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    let email = Arg::new(EMAIL)
        .long("email")
        .help("Account email")
        .action(ArgAction::Set)
        .required(true);
    let password = Arg::new(PASSWORD)
        .long("password")
        .help("Account password")
        .action(ArgAction::Set)
        .required(true);
    let name = Arg::new(NAME)
        .long("name")
        .help("Full name")
        .action(ArgAction::Set)
        .required(true);

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .subcommand(
            Command::new("login")
                .about("Sign in as a voter")
                .arg(email.clone())
                .arg(password.clone()),
        )
        .subcommand(
            Command::new("admin-login")
                .about("Sign in as an administrator")
                .arg(email.clone())
                .arg(password.clone()),
        )
        .subcommand(
            Command::new("register")
                .about("Create a voter account")
                .arg(name.clone())
                .arg(email)
                .arg(password),
        )
        .subcommand(Command::new("logout").about("Forget the current session"))
        .subcommand(Command::new("whoami").about("Show who is signed in"))
        .subcommand(
            Command::new("open")
                .about("Show the page at a path, e.g. / or /admin")
                .arg(Arg::new(PATH).action(ArgAction::Set).required(true)),
        )
        .subcommand(Command::new("elections").about("List elections (the home page)"))
        .subcommand(
            Command::new("vote")
                .about("Verify your identity, then show the ballot or vote")
                .arg(name)
                .arg(
                    Arg::new(VOTER_ID)
                        .long("voter-id")
                        .help("Voter ID")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new(ELECTION)
                        .long("election")
                        .help("Only show candidates standing in this election")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new(CANDIDATE)
                        .long("candidate")
                        .help("Vote for the candidate with this ID")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new(YES)
                        .long("yes")
                        .short('y')
                        .help("Don't ask for confirmation")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("results")
                .about("Show the current results")
                .arg(
                    Arg::new(WATCH)
                        .long("watch")
                        .short('w')
                        .help("Keep refreshing until interrupted")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("admin").about("Show the admin dashboard"))
}

/// How a command ended, short of an error.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    /// The page rendered, showing an error.
    Failed,
    Redirected(Route),
}

impl Outcome {
    /// The outcome of a page left showing `error`, if any.
    fn reported(error: Option<&str>) -> Self {
        match error {
            Some(_) => Self::Failed,
            None => Self::Done,
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Done => 0,
            Self::Failed => 1,
            Self::Redirected(_) => 2,
        }
    }
}

struct App {
    config: Config,
    api: ApiClient,
    session: SessionStore,
}

impl App {
    fn new() -> Result<Self> {
        let config = Config::load()?;
        let api = ApiClient::new(&config)?;
        let session = SessionStore::load(FileStorage::new(config.session_file()));
        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// Resolve `path` for the current session. `Err` carries the redirect.
    fn enter(&self, path: &str) -> std::result::Result<Route, Outcome> {
        match router::resolve(path, self.session.session()) {
            Navigation::Render(route) => {
                println!("{}\n", self.header());
                Ok(route)
            }
            Navigation::Redirect(to) => {
                println!("{path} redirects to {to}");
                Err(Outcome::Redirected(to))
            }
        }
    }

    fn header(&self) -> String {
        nav_links(self.session.session())
            .iter()
            .map(|(label, route)| format!("{label} ({route})"))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    async fn open(&self, path: &str) -> Result<Outcome> {
        let route = match self.enter(path) {
            Ok(route) => route,
            Err(outcome) => return Ok(outcome),
        };
        match route {
            Route::Home => {
                let page = HomePage::load(&self.api, self.session.session()).await;
                print!("{page}");
            }
            Route::Login => {
                print!("{}", LoginPage::voter());
                println!("\nSign in with `{PROGRAM_NAME} login --email <EMAIL> --password <PASSWORD>`.");
            }
            Route::AdminLogin => {
                print!("{}", LoginPage::admin());
                println!(
                    "\nSign in with `{PROGRAM_NAME} admin-login --email <EMAIL> --password <PASSWORD>`."
                );
            }
            Route::Register => {
                print!("{}", RegisterPage::new());
                println!(
                    "\nRegister with `{PROGRAM_NAME} register --name <NAME> --email <EMAIL> --password <PASSWORD>`."
                );
            }
            Route::Vote(election) => {
                print!("{}", VotingPage::new(election));
                println!("\nVerify with `{PROGRAM_NAME} vote --name <NAME> --voter-id <VOTER_ID>`.");
            }
            Route::Results => return self.show_results(false).await,
            Route::Admin => {
                let dashboard = AdminDashboard::load(&self.api, self.session.session()).await;
                print!("{dashboard}");
                if dashboard.error().is_some() {
                    return Ok(Outcome::Failed);
                }
            }
        }
        Ok(Outcome::Done)
    }

    async fn login(&mut self, portal: Portal, args: &ArgMatches) -> Result<Outcome> {
        let (path, mut page) = match portal {
            Portal::Voter => ("/login", LoginPage::voter()),
            Portal::Admin => ("/admin/login", LoginPage::admin()),
        };
        if let Err(outcome) = self.enter(path) {
            return Ok(outcome);
        }
        let credentials = Credentials::new(required(args, EMAIL), required(args, PASSWORD));
        match page.submit(&self.api, &mut self.session, &credentials).await {
            Ok(next) => {
                if let Some(user) = self.session.user() {
                    println!("Signed in as {} ({}).", user.name, user.role);
                }
                println!("Continue at {next}");
                Ok(Outcome::Done)
            }
            Err(_) => {
                print!("{page}");
                Ok(Outcome::Failed)
            }
        }
    }

    async fn register(&mut self, args: &ArgMatches) -> Result<Outcome> {
        if let Err(outcome) = self.enter("/register") {
            return Ok(outcome);
        }
        let request = RegisterRequest {
            name: required(args, NAME),
            email: required(args, EMAIL),
            password: required(args, PASSWORD),
        };
        let mut page = RegisterPage::new();
        let result = page.submit(&self.api, &mut self.session, &request).await;
        print!("{page}");
        match result {
            Ok(next) => {
                let (landing, _) = router::navigate(&next.path(), self.session.session());
                println!("Continue at {landing}");
                Ok(Outcome::Done)
            }
            Err(_) => Ok(Outcome::Failed),
        }
    }

    fn logout(&mut self) -> Result<Outcome> {
        let role = self.session.role();
        self.session.logout()?;
        println!("Signed out. Continue at {}", after_logout(role));
        Ok(Outcome::Done)
    }

    fn whoami(&self) -> Outcome {
        match self.session.user() {
            Some(user) => {
                let email = user.email.as_deref().unwrap_or("no email");
                println!("{} <{email}> ({})", user.name, user.role);
            }
            None => println!("Not signed in."),
        }
        println!("{}", self.header());
        Outcome::Done
    }

    async fn vote(&mut self, args: &ArgMatches) -> Result<Outcome> {
        let election = args
            .get_one::<String>(ELECTION)
            .map(|id| Id::from(id.as_str()));
        if let Err(outcome) = self.enter(&Route::Vote(election.clone()).path()) {
            return Ok(outcome);
        }

        let mut page = VotingPage::new(election);
        let request = VerifyRequest::new(required(args, NAME), required(args, VOTER_ID));
        let verified = page
            .verify(&self.api, self.session.session(), &request)
            .await;
        print!("{page}");
        if verified.is_err() {
            return Ok(Outcome::Failed);
        }

        let Some(candidate) = args.get_one::<String>(CANDIDATE) else {
            println!("\nVote with `--candidate <ID>`.");
            return Ok(Outcome::Done);
        };
        let candidate = Id::from(candidate.as_str());
        if let Err(e) = page.open(&candidate) {
            println!("! {}", e.user_message());
            return Ok(Outcome::Failed);
        }

        let prompt = page
            .ballot()
            .command(&candidate)
            .and_then(|command| command.prompt())
            .unwrap_or_default();
        if !args.get_flag(YES) && !ask(&prompt) {
            page.cancel(&candidate);
            println!("Vote cancelled.");
            return Ok(Outcome::Done);
        }

        let result = page
            .confirm(&candidate, &self.api, self.session.session())
            .await;
        page.unmount();
        println!();
        print!("{}", page.ballot());
        Ok(match result {
            Ok(votes) => {
                println!("Vote recorded. Candidate {candidate} now has {votes} votes.");
                Outcome::Done
            }
            Err(_) => Outcome::Failed,
        })
    }

    async fn results(&self, watch: bool) -> Result<Outcome> {
        if let Err(outcome) = self.enter("/results") {
            return Ok(outcome);
        }
        self.show_results(watch).await
    }

    /// Print the results once, or after every poll until Ctrl-C when `watch`.
    async fn show_results(&self, watch: bool) -> Result<Outcome> {
        let mut page = ResultsPage::mount(
            self.api.clone(),
            self.session.session(),
            self.config.poll_interval(),
        );
        loop {
            let more = if watch {
                tokio::select! {
                    more = page.changed() => more,
                    _ = tokio::signal::ctrl_c() => false,
                }
            } else {
                page.changed().await
            };
            if !more {
                break;
            }
            print!("{}", page.snapshot().await);
            if !watch {
                break;
            }
            println!();
        }
        let state = page.snapshot().await;
        page.unmount().await;

        Ok(Outcome::reported(state.error()))
    }
}

/// The value of an argument clap has already checked is present.
fn required(args: &ArgMatches, id: &str) -> String {
    args.get_one::<String>(id).cloned().unwrap_or_default()
}

/// Ask a yes/no question on the terminal. Anything but yes is no.
fn ask(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

async fn run(args: &ArgMatches) -> Result<Outcome> {
    let mut app = App::new()?;
    match args.subcommand() {
        Some(("login", sub)) => app.login(Portal::Voter, sub).await,
        Some(("admin-login", sub)) => app.login(Portal::Admin, sub).await,
        Some(("register", sub)) => app.register(sub).await,
        Some(("logout", _)) => app.logout(),
        Some(("whoami", _)) => Ok(app.whoami()),
        Some(("open", sub)) => app.open(&required(sub, PATH)).await,
        Some(("elections", _)) => app.open("/").await,
        Some(("vote", sub)) => app.vote(sub).await,
        Some(("results", sub)) => app.results(sub.get_flag(WATCH)).await,
        Some(("admin", _)) => app.open("/admin").await,
        // Unreachable: a subcommand is required.
        _ => Ok(Outcome::Done),
    }
}

#[tokio::main]
async fn main() {
    // Set up logging.
    if let Err(err) = logging::init() {
        eprintln!("Failed to initialise logging: {err}");
    }

    let args = cli().get_matches();
    let exit_code = match run(&args).await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {}", err.user_message());
            1
        }
    };
    std::process::exit(exit_code.into())
}
