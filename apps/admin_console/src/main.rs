mod config;
mod render;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console_core::{
    forms::{AcceptDraft, ReasonForm},
    reports::ReportRange,
    resources::{FILTER_NAME, FILTER_SERVICE_TYPE, FILTER_STATUS},
    AdminConsole, ClientError, ComplaintSide, FileTokenStore, HttpAdminClient,
    PageRequest, ResourceListController, Route, RouteDecision, Session, SignOutReason,
};
use shared::domain::{AccountStatus, AstroId, HoroscopeId, OrderId, ProblemId, UserId};
use shared::protocol::HoroscopeUpdate;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "admin-console", about = "Back-office console for the consultation platform")]
struct Cli {
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    token_path: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        username: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    /// Show whether a session token is stored.
    Status,
    Dashboard,
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Astros(AstrosCommand),
    #[command(subcommand)]
    Complaints(ComplaintsCommand),
    #[command(subcommand)]
    Horoscopes(HoroscopesCommand),
    #[command(subcommand)]
    Feedbacks(FeedbacksCommand),
    #[command(subcommand)]
    Reports(ReportsCommand),
}

#[derive(Args, Debug, Clone)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        name: Option<String>,
    },
    SetStatus {
        user_id: String,
        status: StatusArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for AccountStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Active => AccountStatus::Active,
            StatusArg::Inactive => AccountStatus::Inactive,
        }
    }
}

#[derive(Subcommand, Debug)]
enum AstrosCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        name: Option<String>,
    },
    ToggleStatus {
        astro_id: String,
    },
    ToggleVisibility {
        astro_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ComplaintsCommand {
    #[command(subcommand)]
    Service(ServiceComplaintsCommand),
    #[command(subcommand)]
    UserGeneral(GeneralComplaintsCommand),
    #[command(subcommand)]
    AstroGeneral(GeneralComplaintsCommand),
}

#[derive(Subcommand, Debug)]
enum ServiceComplaintsCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        service_type: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    Detail {
        order_id: String,
        /// List-side name: chat, call or video.
        #[arg(long, default_value = "chat")]
        service_type: String,
    },
    Accept {
        order_id: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "")]
        user_refund: String,
        #[arg(long, default_value = "")]
        astro_refund: String,
    },
    Reject {
        order_id: String,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
enum GeneralComplaintsCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    Close {
        problem_id: String,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
enum HoroscopesCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Upload `sign|description|YYYY-MM-DD|active` lines.
    Bulk { file: PathBuf },
    Update {
        horoscope_id: String,
        #[arg(long)]
        sign_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        #[arg(long)]
        is_active: Option<i32>,
    },
    Delete {
        horoscope_id: String,
        /// Required; deletion cannot be undone.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FeedbacksCommand {
    /// Upload a JSON object or array of objects.
    Upload { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
    Generate {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    Download {
        file_name: String,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Run the backend scheduler job now.
    Trigger,
}

impl Command {
    fn route(&self) -> Route {
        match self {
            Self::Login { .. } | Self::Logout | Self::Status => Route::Login,
            Self::Dashboard => Route::Dashboard,
            Self::Users(_) => Route::Users,
            Self::Astros(_) => Route::Astrologers,
            Self::Complaints(ComplaintsCommand::Service(_)) => Route::UserServiceComplaints,
            Self::Complaints(ComplaintsCommand::UserGeneral(_)) => Route::UserGeneralComplaints,
            Self::Complaints(ComplaintsCommand::AstroGeneral(_)) => Route::AstroGeneralComplaints,
            Self::Horoscopes(_) => Route::Horoscopes,
            Self::Feedbacks(_) => Route::Feedbacks,
            Self::Reports(_) => Route::Scheduler,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url.clone() {
        settings.api_url = api_url.trim_end_matches('/').to_string();
    }
    if let Some(token_path) = cli.token_path.clone() {
        settings.token_path = token_path;
    }
    if let Some(log_level) = cli.log_level.clone() {
        settings.log_level = log_level;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let console = build_console(&settings)?;
    run(&console, &settings, cli.command).await
}

fn build_console(settings: &Settings) -> Result<AdminConsole> {
    let store = Arc::new(FileTokenStore::new(settings.token_path.clone()));
    let session = Session::with_redirect_hook(store, |redirect| {
        if redirect.reason == SignOutReason::Unauthorized {
            warn!(
                to = redirect.to.path(),
                "session expired; run `admin-console login` to sign in again"
            );
        }
    });
    let client = HttpAdminClient::with_timeout(
        &settings.api_url,
        Arc::clone(&session),
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("invalid API URL")?;
    info!(api_url = %settings.api_url, "admin console configured");
    Ok(AdminConsole::new(Arc::new(client), session))
}

fn friendly(err: ClientError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn page_request(paging: &PageArgs, settings: &Settings) -> Result<PageRequest> {
    let limit = paging.limit.unwrap_or(settings.page_limit);
    PageRequest::new(paging.page, limit).map_err(|err| anyhow!(err))
}

async fn run(console: &AdminConsole, settings: &Settings, command: Command) -> Result<()> {
    let route = command.route();
    if route.is_protected() {
        if let RouteDecision::Redirect(Route::Login) = console.session().guard(route.path()) {
            bail!("not signed in; run `admin-console login` first");
        }
    }

    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            console
                .login(&username, &password)
                .await
                .map_err(friendly)?;
            println!("Signed in as {}", username.trim());
        }
        Command::Logout => {
            console.logout();
            println!("Signed out");
        }
        Command::Status => {
            if console.session().is_authenticated() {
                println!("Signed in ({})", settings.api_url);
            } else {
                println!("Not signed in");
            }
        }
        Command::Dashboard => {
            let overview = console.dashboard().await.map_err(friendly)?;
            render::dashboard(&overview);
        }
        Command::Users(command) => users(console, settings, command).await?,
        Command::Astros(command) => astros(console, settings, command).await?,
        Command::Complaints(command) => complaints(console, settings, command).await?,
        Command::Horoscopes(command) => horoscopes(console, settings, command).await?,
        Command::Feedbacks(FeedbacksCommand::Upload { file }) => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let (count, response) = console.upload_feedbacks(&text).await.map_err(friendly)?;
            render::ack(&response, &format!("Uploaded {count} feedback records"));
        }
        Command::Reports(command) => reports(console, command).await?,
    }
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Loads the first page and walks forward until `matches` hits a row.
async fn find_row<T>(
    list: &ResourceListController<T>,
    matches: impl Fn(&T) -> bool,
) -> Result<Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    list.refresh().await.into_result().map_err(friendly)?;
    loop {
        let snapshot = list.current();
        if let Some(found) = snapshot.items().iter().find(|row| matches(row)) {
            return Ok(Some(found.clone()));
        }
        match list.next_page().await {
            Some(outcome) => {
                outcome.into_result().map_err(friendly)?;
            }
            None => return Ok(None),
        }
    }
}

async fn load<T>(list: &ResourceListController<T>) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
{
    list.refresh().await.into_result().map_err(friendly)?;
    Ok(())
}

async fn users(console: &AdminConsole, settings: &Settings, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List { paging, name } => {
            let mut request = page_request(&paging, settings)?;
            if let Some(name) = name {
                request = request.with_filter(FILTER_NAME, name);
            }
            let list = console.users(Some(request));
            load(&list).await?;
            if let Some(page) = list.current().data {
                render::users(&page);
            }
        }
        UsersCommand::SetStatus { user_id, status } => {
            let list = console.users(None);
            let status = console
                .set_user_status(&UserId::new(user_id.clone()), status.into(), &list)
                .await
                .map_err(friendly)?;
            println!("User {user_id} is now {status}");
        }
    }
    Ok(())
}

async fn astros(console: &AdminConsole, settings: &Settings, command: AstrosCommand) -> Result<()> {
    match command {
        AstrosCommand::List { paging, name } => {
            let mut request = page_request(&paging, settings)?;
            if let Some(name) = name {
                request = request.with_filter(FILTER_NAME, name);
            }
            let list = console.astrologers(Some(request));
            load(&list).await?;
            if let Some(page) = list.current().data {
                render::astrologers(&page);
            }
        }
        AstrosCommand::ToggleStatus { astro_id } => {
            let list = console.astrologers(None);
            let astro_id = AstroId::new(astro_id);
            let astrologer = find_row(&list, |row| row.astro_id == astro_id)
                .await?
                .ok_or_else(|| anyhow!("astrologer {astro_id} not found"))?;
            let status = console
                .toggle_astrologer_status(&astrologer, &list)
                .await
                .map_err(friendly)?;
            println!("Astrologer {astro_id} is now {status}");
        }
        AstrosCommand::ToggleVisibility { astro_id } => {
            let list = console.astrologers(None);
            let astro_id = AstroId::new(astro_id);
            let astrologer = find_row(&list, |row| row.astro_id == astro_id)
                .await?
                .ok_or_else(|| anyhow!("astrologer {astro_id} not found"))?;
            let visibility = console
                .toggle_astrologer_visibility(&astrologer, &list)
                .await
                .map_err(friendly)?;
            println!("Astrologer {astro_id} is now {visibility}");
        }
    }
    Ok(())
}

async fn complaints(
    console: &AdminConsole,
    settings: &Settings,
    command: ComplaintsCommand,
) -> Result<()> {
    match command {
        ComplaintsCommand::Service(command) => service_complaints(console, settings, command).await,
        ComplaintsCommand::UserGeneral(command) => {
            general_complaints(console, settings, ComplaintSide::User, command).await
        }
        ComplaintsCommand::AstroGeneral(command) => {
            general_complaints(console, settings, ComplaintSide::Astro, command).await
        }
    }
}

async fn service_complaints(
    console: &AdminConsole,
    settings: &Settings,
    command: ServiceComplaintsCommand,
) -> Result<()> {
    match command {
        ServiceComplaintsCommand::List {
            paging,
            service_type,
            status,
        } => {
            let mut request = page_request(&paging, settings)?;
            if let Some(service_type) = service_type {
                request = request.with_filter(FILTER_SERVICE_TYPE, service_type);
            }
            if let Some(status) = status {
                request = request.with_filter(FILTER_STATUS, status);
            }
            let list = console.service_complaints(Some(request));
            load(&list).await?;
            if let Some(page) = list.current().data {
                render::service_complaints(&page);
            }
        }
        ServiceComplaintsCommand::Detail {
            order_id,
            service_type,
        } => {
            let detail = console
                .complaint_detail(&service_type, &OrderId::new(order_id))
                .await
                .map_err(friendly)?;
            render::complaint_detail(&detail);
        }
        ServiceComplaintsCommand::Accept {
            order_id,
            reason,
            user_refund,
            astro_refund,
        } => {
            let draft = AcceptDraft::from_inputs(&reason, &user_refund, &astro_refund)?;
            let list = console.service_complaints(None);
            let response = console
                .accept_complaint(&OrderId::new(order_id.clone()), &draft, &list)
                .await
                .map_err(friendly)?;
            render::ack(&response, &format!("Complaint {order_id} accepted"));
        }
        ServiceComplaintsCommand::Reject { order_id, reason } => {
            let list = console.service_complaints(None);
            let mut form = ReasonForm::default();
            form.open(OrderId::new(order_id.clone()));
            form.edit(reason);
            let response = console
                .submit_rejection(&mut form, &list)
                .await
                .map_err(friendly)?;
            render::ack(&response, &format!("Complaint {order_id} rejected"));
        }
    }
    Ok(())
}

async fn general_complaints(
    console: &AdminConsole,
    settings: &Settings,
    side: ComplaintSide,
    command: GeneralComplaintsCommand,
) -> Result<()> {
    match command {
        GeneralComplaintsCommand::List { paging } => {
            let request = page_request(&paging, settings)?;
            let list = console.general_complaints(side, Some(request));
            load(&list).await?;
            if let Some(page) = list.current().data {
                render::general_complaints(&page);
            }
        }
        GeneralComplaintsCommand::Close { problem_id, reason } => {
            let list = console.general_complaints(side, None);
            let problem_id = ProblemId::new(problem_id);
            let complaint = find_row(&list, |row| row.problem_id == problem_id)
                .await?
                .ok_or_else(|| anyhow!("complaint {problem_id} not found"))?;
            let mut form = ReasonForm::default();
            form.open(complaint);
            form.edit(reason);
            let response = console
                .submit_close(side, &mut form, &list)
                .await
                .map_err(friendly)?;
            render::ack(&response, &format!("Complaint {problem_id} closed"));
        }
    }
    Ok(())
}

async fn horoscopes(
    console: &AdminConsole,
    settings: &Settings,
    command: HoroscopesCommand,
) -> Result<()> {
    match command {
        HoroscopesCommand::List { paging } => {
            let list = console.horoscopes(Some(page_request(&paging, settings)?));
            load(&list).await?;
            if let Some(page) = list.current().data {
                render::horoscopes(&page);
            }
        }
        HoroscopesCommand::Bulk { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let (count, response) = console.upload_horoscopes(&text).await.map_err(friendly)?;
            render::ack(&response, &format!("Uploaded {count} horoscopes"));
        }
        HoroscopesCommand::Update {
            horoscope_id,
            sign_name,
            description,
            date,
            is_active,
        } => {
            let update = HoroscopeUpdate {
                sign_name,
                description,
                date,
                is_active,
            };
            let list = console.horoscopes(None);
            let updated = console
                .update_horoscope(&HoroscopeId::new(horoscope_id), &update, &list)
                .await
                .map_err(friendly)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        HoroscopesCommand::Delete { horoscope_id, yes } => {
            if !yes {
                bail!("refusing to delete horoscope {horoscope_id} without --yes");
            }
            let list = console.horoscopes(None);
            let response = console
                .delete_horoscope(&HoroscopeId::new(horoscope_id.clone()), &list)
                .await
                .map_err(friendly)?;
            render::ack(&response, &format!("Horoscope {horoscope_id} deleted"));
        }
    }
    Ok(())
}

async fn reports(console: &AdminConsole, command: ReportsCommand) -> Result<()> {
    match command {
        ReportsCommand::Generate { start, end } => {
            let today = chrono::Local::now().date_naive();
            let range = ReportRange::parse(&start, &end, today)?;
            let response = console.generate_reports(range).await.map_err(friendly)?;
            render::report(&response);
        }
        ReportsCommand::Download { file_name, dir } => {
            let path = console
                .download_report(&file_name, &dir)
                .await
                .map_err(friendly)?;
            println!("Saved {}", path.display());
        }
        ReportsCommand::Trigger => {
            let response = console.trigger_scheduler().await.map_err(friendly)?;
            render::ack(&response, "Scheduler triggered");
        }
    }
    Ok(())
}
