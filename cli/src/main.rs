mod terminal;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use models::filter::categories;
use models::{CheckinCreate, EventFilter, EventInput, TeamFilter};
use portal::api::{checkins, events, teams, users};
use portal::{
    AdminError, AdminSession, ApiClient, ApiError, CallbackOutcome, CallbackPage, FileTokenStore, LoginOutcome, Origin,
    RouteDecision, SessionConfig, SessionContext, SessionError, TokenStore, protected_route,
};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;

use crate::terminal::{TerminalHost, TerminalWindow};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid app origin: {0}")]
    InvalidOrigin(String),
    #[error("no state directory; pass --state-dir or set CLUBHOUSE_STATE_DIR")]
    MissingStateDir,
    #[error("not signed in; run `clubhouse login` first")]
    NotSignedIn,
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "clubhouse", about = "Clubhouse member portal and admin CLI")]
struct Cli {
    #[arg(long, env = "CLUBHOUSE_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Origin the portal is served from; login redirects must land here.
    #[arg(long, env = "CLUBHOUSE_APP_ORIGIN", default_value = "http://localhost:3000")]
    app_origin: String,

    /// Where tokens are stored between runs. Defaults to `~/.clubhouse`.
    #[arg(long, env = "CLUBHOUSE_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the backend is up.
    Ping,
    /// Sign in with Google.
    Login {
        /// Give up after this many seconds.
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
    /// Show the signed-in member.
    Whoami,
    /// Sign out and forget the stored token.
    Logout,
    Admin(AdminCommand),
    Events(EventsCommand),
    Teams(TeamsCommand),
    Checkins(CheckinsCommand),
    Users(UsersCommand),
    Whitelist(WhitelistCommand),
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Login {
        #[arg(long, env = "CLUBHOUSE_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
}

#[derive(Args, Debug)]
struct EventsCommand {
    #[command(subcommand)]
    command: EventsSubcommand,
}

#[derive(Subcommand, Debug)]
enum EventsSubcommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// List the category options for the event filter.
    Categories,
    Get {
        id: String,
    },
    Create(EventCreateArgs),
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct EventCreateArgs {
    #[arg(long)]
    title: String,
    /// Defaults to a slug of the title.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    #[arg(long)]
    full_theme_url: Option<String>,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    team_size: String,
    #[arg(long = "type")]
    types: Vec<String>,
    #[arg(long, default_value = "")]
    rubric_url: String,
}

#[derive(Args, Debug)]
struct TeamsCommand {
    #[command(subcommand)]
    command: TeamsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TeamsSubcommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        event: Option<String>,
    },
    /// Teams the signed-in member captains or belongs to.
    Mine,
}

#[derive(Args, Debug)]
struct CheckinsCommand {
    #[command(subcommand)]
    command: CheckinsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CheckinsSubcommand {
    List {
        team_id: Uuid,
    },
    Submit {
        team_id: Uuid,
        #[arg(long = "link", required = true)]
        links: Vec<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
}

#[derive(Args, Debug)]
struct WhitelistCommand {
    #[command(subcommand)]
    command: WhitelistSubcommand,
}

#[derive(Subcommand, Debug)]
enum WhitelistSubcommand {
    List,
    Add { email: String },
    Remove { email: String },
}

struct CliContext {
    api: ApiClient,
    app_origin: Origin,
    store: Arc<dyn TokenStore>,
}

impl CliContext {
    fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base = Url::parse(&cli.base_url).map_err(|_| CliError::InvalidBaseUrl(cli.base_url.clone()))?;
        let app_origin = Origin::parse(&cli.app_origin).map_err(|_| CliError::InvalidOrigin(cli.app_origin.clone()))?;
        let state_dir = match &cli.state_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".clubhouse"))
                .ok_or(CliError::MissingStateDir)?,
        };
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::for_origin(state_dir, &app_origin));
        Ok(Self { api: ApiClient::new(base), app_origin, store })
    }

    fn session(&self, host: Arc<TerminalHost>, login_timeout: Option<Duration>) -> SessionContext {
        let mut config = SessionConfig::new(self.api.base().clone(), self.app_origin.clone());
        if let Some(limit) = login_timeout {
            config = config.with_login_timeout(limit);
        }
        SessionContext::new(config, Arc::clone(&self.store), host)
    }

    fn admin(&self) -> AdminSession {
        AdminSession::new(self.api.clone(), Arc::clone(&self.store))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = CliContext::from_cli(&cli)?;

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Login { timeout_secs } => run_login(&ctx, Duration::from_secs(timeout_secs)).await,
        Command::Whoami => run_whoami(&ctx).await,
        Command::Logout => run_logout(&ctx).await,
        Command::Admin(admin) => run_admin(&ctx, admin).await,
        Command::Events(cmd) => run_events(&ctx, cmd).await,
        Command::Teams(cmd) => run_teams(&ctx, cmd).await,
        Command::Checkins(cmd) => run_checkins(&ctx, cmd).await,
        Command::Users(cmd) => run_users(&ctx, cmd).await,
        Command::Whitelist(cmd) => run_whitelist(&ctx, cmd).await,
    }
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let url = ctx.api.endpoint(&["health"])?;
    let response = ctx.api.http().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), detail: "health check failed".to_owned() }.into());
    }
    println!("ok");
    Ok(())
}

// =============================================================================
// MEMBER SESSION
// =============================================================================

async fn run_login(ctx: &CliContext, timeout: Duration) -> Result<(), CliError> {
    let host = Arc::new(TerminalHost::new());
    let session = ctx.session(Arc::clone(&host), Some(timeout));
    let page =
        CallbackPage::with_token_cell(session.token_cell(), ctx.app_origin.clone()).with_close_delay(Duration::ZERO);

    let paste = tokio::spawn(complete_redirect(
        read_stdin_line(),
        page,
        session.port().clone(),
        host.callback_window(),
    ));
    let outcome = session.login().await;
    paste.abort();

    match outcome? {
        LoginOutcome::Authenticated(identity) => {
            println!("signed in as {} <{}>", identity.name, identity.email);
            Ok(())
        }
        LoginOutcome::Rejected => Err(CliError::LoginFailed("no usable token in the redirect".to_owned())),
        LoginOutcome::Abandoned => Err(CliError::LoginFailed(format!(
            "cancelled, or the redirect did not come from {}",
            ctx.app_origin
        ))),
        LoginOutcome::TimedOut => Err(CliError::LoginFailed("timed out".to_owned())),
    }
}

/// Read one line from stdin on a detached thread, which runtime shutdown does
/// not wait for.
fn read_stdin_line() -> oneshot::Receiver<String> {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_ok() {
            let _ = tx.send(line);
        }
    });
    rx
}

/// Wait for the pasted redirect URL and run the callback page against it
/// with the session's port as opener. An empty line or EOF closes the popup.
async fn complete_redirect(
    line: oneshot::Receiver<String>,
    page: CallbackPage,
    opener: portal::MessagePort,
    window: TerminalWindow,
) {
    let raw = line.await.map(|line| line.trim().to_owned()).unwrap_or_default();
    if raw.is_empty() {
        portal::CallbackWindow::close(&window);
        return;
    }
    match Url::parse(&raw) {
        Ok(url) => {
            let outcome = page.load(&url, Some(&opener), &window).await;
            if let CallbackOutcome::Posted { delivered: false, .. } = outcome {
                eprintln!("could not hand the redirect to the login session");
            }
        }
        Err(e) => {
            eprintln!("not a URL ({e}); login cancelled");
            portal::CallbackWindow::close(&window);
        }
    }
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.session(Arc::new(TerminalHost::new()), None);
    if let RouteDecision::Redirect(_) = protected_route(&session) {
        return Err(CliError::NotSignedIn);
    }
    match session.refresh_user().await? {
        Some(user) => print_json(&serde_json::to_value(user)?),
        None => Err(CliError::NotSignedIn),
    }
}

async fn run_logout(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.session(Arc::new(TerminalHost::new()), None);
    session.logout().await;
    println!("signed out");
    Ok(())
}

fn require_member(ctx: &CliContext) -> Result<portal::Credentials, CliError> {
    let session = ctx.session(Arc::new(TerminalHost::new()), None);
    match protected_route(&session) {
        RouteDecision::Granted(_) => Ok(session.credentials()),
        RouteDecision::Redirect(_) => Err(CliError::NotSignedIn),
    }
}

// =============================================================================
// ADMIN
// =============================================================================

async fn run_admin(ctx: &CliContext, admin: AdminCommand) -> Result<(), CliError> {
    let session = ctx.admin();
    match admin.command {
        AdminSubcommand::Login { password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Admin password: ")?,
            };
            session.login(&password).await?;
            println!("admin signed in");
            Ok(())
        }
        AdminSubcommand::Logout => {
            session.logout();
            println!("admin signed out");
            Ok(())
        }
    }
}

fn prompt(label: &str) -> Result<String, CliError> {
    eprint!("{label}");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

// =============================================================================
// CATALOGUE
// =============================================================================

async fn run_events(ctx: &CliContext, cmd: EventsCommand) -> Result<(), CliError> {
    match cmd.command {
        EventsSubcommand::List { search, category } => {
            let all = events::list(&ctx.api).await?;
            let filter = EventFilter::new(search, category);
            print_json(&serde_json::to_value(filter.apply(&all))?)
        }
        EventsSubcommand::Categories => {
            let all = events::list(&ctx.api).await?;
            print_json(&serde_json::to_value(categories(&all))?)
        }
        EventsSubcommand::Get { id } => print_json(&serde_json::to_value(events::get(&ctx.api, &id).await?)?),
        EventsSubcommand::Create(args) => {
            let input = EventInput {
                id: args.id,
                title: args.title,
                theme: args.theme,
                full_theme_url: args.full_theme_url,
                description: args.description,
                category: args.category,
                team_size: args.team_size,
                types: args.types,
                rubric_url: args.rubric_url,
            };
            let credentials = ctx.admin().credentials()?;
            print_json(&serde_json::to_value(events::create(&ctx.api, &credentials, &input).await?)?)
        }
        EventsSubcommand::Delete { id } => {
            let credentials = ctx.admin().credentials()?;
            events::delete(&ctx.api, &credentials, &id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_teams(ctx: &CliContext, cmd: TeamsCommand) -> Result<(), CliError> {
    match cmd.command {
        TeamsSubcommand::List { search, event } => {
            let all = teams::list(&ctx.api).await?;
            let filter = TeamFilter::new(search, event);
            print_json(&serde_json::to_value(filter.apply(&all))?)
        }
        TeamsSubcommand::Mine => {
            let credentials = require_member(ctx)?;
            print_json(&serde_json::to_value(teams::mine(&ctx.api, &credentials).await?)?)
        }
    }
}

async fn run_checkins(ctx: &CliContext, cmd: CheckinsCommand) -> Result<(), CliError> {
    match cmd.command {
        CheckinsSubcommand::List { team_id } => {
            print_json(&serde_json::to_value(checkins::list_for_team(&ctx.api, team_id).await?)?)
        }
        CheckinsSubcommand::Submit { team_id, links } => {
            let credentials = require_member(ctx)?;
            let body = CheckinCreate { links };
            print_json(&serde_json::to_value(checkins::create(&ctx.api, &credentials, team_id, &body).await?)?)
        }
        CheckinsSubcommand::Delete { id } => {
            let credentials = ctx.admin().credentials()?;
            checkins::delete(&ctx.api, &credentials, id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_users(ctx: &CliContext, cmd: UsersCommand) -> Result<(), CliError> {
    match cmd.command {
        UsersSubcommand::List => {
            let credentials = ctx.admin().credentials()?;
            print_json(&serde_json::to_value(users::list_users(&ctx.api, &credentials).await?)?)
        }
    }
}

async fn run_whitelist(ctx: &CliContext, cmd: WhitelistCommand) -> Result<(), CliError> {
    let credentials = ctx.admin().credentials()?;
    match cmd.command {
        WhitelistSubcommand::List => {
            print_json(&serde_json::to_value(users::list_whitelist(&ctx.api, &credentials).await?)?)
        }
        WhitelistSubcommand::Add { email } => {
            println!("added {}", users::add_whitelist(&ctx.api, &credentials, &email).await?);
            Ok(())
        }
        WhitelistSubcommand::Remove { email } => {
            println!("removed {}", users::remove_whitelist(&ctx.api, &credentials, &email).await?);
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
