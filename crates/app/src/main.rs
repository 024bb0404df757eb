use std::fmt;

use prep_core::model::{Credentials, Difficulty, ParseSortKeyError, SortKey, SortState};
use services::dataset_loader::DEFAULT_DATASET;
use services::{AppServices, DatasetSource, RemoteConfig, SyncError, SyncService};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidPage { raw: String },
    InvalidDbUrl { raw: String },
    InvalidSortKey(ParseSortKeyError),
    InvalidDifficulty { raw: String },
    InvalidSyncTarget { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidPage { raw } => write!(f, "invalid --page value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSortKey(err) => write!(f, "{err}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "difficulty must be easy, medium or hard: {raw}")
            }
            ArgsError::InvalidSyncTarget { raw } => {
                write!(f, "sync target must be solved, premium or all: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app list    [--page <n>]");
    eprintln!("  app filter  [--company <name>]... [--topic <name>]... [--difficulty <level>]...");
    eprintln!("              [--search <text>] [--hide-premium | --show-premium] [--clear]");
    eprintln!("  app sort    <key>          # toggles: none -> desc -> asc -> none");
    eprintln!("  app revise  <title>");
    eprintln!("  app stats");
    eprintln!("  app options");
    eprintln!("  app login   [--session <token>] [--csrf <token>] [--cookies <raw>]");
    eprintln!("  app sync    [solved|premium|all]");
    eprintln!("  app logout");
    eprintln!();
    eprintln!("Common flags: --db <sqlite_url> --dataset <path|url>");
    eprintln!();
    eprintln!("Sort keys: title, frequency, difficulty, acceptanceRate, majorCompanies,");
    eprintln!("           otherCompanies, topics, solved (revised), lcSolved");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_DB_URL, PREP_DATASET, PREP_API_URL,");
    eprintln!("  PREP_LC_SESSION, PREP_LC_CSRF, PREP_LC_COOKIES, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncTarget {
    Solved,
    Premium,
    All,
}

#[derive(Debug, Default)]
struct FilterArgs {
    companies: Vec<String>,
    topics: Vec<String>,
    difficulties: Vec<Difficulty>,
    search: Option<String>,
    hide_premium: Option<bool>,
    clear: bool,
}

#[derive(Debug)]
enum Command {
    List { page: Option<usize> },
    Filter(FilterArgs),
    Sort { key: SortKey },
    Revise { title: String },
    Stats,
    Options,
    Login {
        session: Option<String>,
        csrf: Option<String>,
        cookies: Option<String>,
    },
    Sync(SyncTarget),
    Logout,
}

struct Args {
    db_url: String,
    dataset: DatasetSource,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PREP_DB_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "prep.sqlite3".into());
        db_url = normalize_sqlite_url(db_url);
        let mut dataset = std::env::var("PREP_DATASET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DatasetSource::parse(DEFAULT_DATASET), |v| DatasetSource::parse(&v));

        let name = args.next().unwrap_or_else(|| "list".into());
        let mut positional = Vec::new();
        let mut page = None;
        let mut filter = FilterArgs::default();
        let mut session = None;
        let mut csrf = None;
        let mut cookies = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--dataset" => dataset = DatasetSource::parse(&require_value(&mut args, "--dataset")?),
                "--page" => {
                    let value = require_value(&mut args, "--page")?;
                    let parsed = value
                        .parse::<usize>()
                        .map_err(|_| ArgsError::InvalidPage { raw: value.clone() })?;
                    page = Some(parsed);
                }
                "--company" => filter.companies.push(require_value(&mut args, "--company")?),
                "--topic" => filter.topics.push(require_value(&mut args, "--topic")?),
                "--difficulty" => {
                    let value = require_value(&mut args, "--difficulty")?;
                    let difficulty = Difficulty::parse(&value);
                    if !difficulty.is_known() {
                        return Err(ArgsError::InvalidDifficulty { raw: value });
                    }
                    filter.difficulties.push(difficulty);
                }
                "--search" => filter.search = Some(require_value(&mut args, "--search")?),
                "--hide-premium" => filter.hide_premium = Some(true),
                "--show-premium" => filter.hide_premium = Some(false),
                "--clear" => filter.clear = true,
                "--session" => session = Some(require_value(&mut args, "--session")?),
                "--csrf" => csrf = Some(require_value(&mut args, "--csrf")?),
                "--cookies" => cookies = Some(require_value(&mut args, "--cookies")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match name.as_str() {
            "list" => Command::List { page },
            "filter" => Command::Filter(filter),
            "sort" => {
                let raw = positional
                    .next()
                    .ok_or(ArgsError::MissingArgument { what: "sort key" })?;
                Command::Sort {
                    key: raw.parse().map_err(ArgsError::InvalidSortKey)?,
                }
            }
            "revise" => {
                let title: Vec<String> = positional.by_ref().collect();
                if title.is_empty() {
                    return Err(ArgsError::MissingArgument { what: "question title" });
                }
                Command::Revise {
                    title: title.join(" "),
                }
            }
            "stats" => Command::Stats,
            "options" => Command::Options,
            "login" => Command::Login {
                session,
                csrf,
                cookies,
            },
            "sync" => Command::Sync(match positional.next().as_deref() {
                None | Some("all") => SyncTarget::All,
                Some("solved") => SyncTarget::Solved,
                Some("premium") => SyncTarget::Premium,
                Some(other) => {
                    return Err(ArgsError::InvalidSyncTarget {
                        raw: other.to_string(),
                    });
                }
            }),
            "logout" => Command::Logout,
            "--help" | "-h" | "help" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self {
            db_url,
            dataset,
            command,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn env_credential(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let remote = RemoteConfig::from_env()?;
    let services = AppServices::new_sqlite(&parsed.db_url, &parsed.dataset, remote).await?;
    let catalog = services.catalog();

    match parsed.command {
        Command::List { page } => {
            let mut catalog = catalog.lock().await;
            if let Some(page) = page {
                catalog.set_page(page).await;
            }
            let view = catalog.current_page();
            let state = catalog.state();
            println!(
                "page {}/{} ({} questions)",
                view.page, view.total_pages, view.total_items
            );
            for q in &view.questions {
                let revised = if state.revised.is_set(&q.title) { "R" } else { " " };
                let solved = if state.solved.is_set(&q.title) { "S" } else { " " };
                let premium = if state.premium.is_set(&q.title) { "$" } else { " " };
                let acceptance = q
                    .acceptance_rate
                    .map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r * 100.0));
                println!(
                    "[{revised}{solved}{premium}] {:<6} {:>6}  {}",
                    q.difficulty, acceptance, q.title
                );
            }
        }
        Command::Filter(filter) => {
            let mut catalog = catalog.lock().await;
            if filter.clear {
                catalog.clear_filters().await;
            }
            if !filter.companies.is_empty() {
                catalog.set_companies(filter.companies).await;
            }
            if !filter.topics.is_empty() {
                catalog.set_topics(filter.topics).await;
            }
            if !filter.difficulties.is_empty() {
                catalog.set_difficulties(filter.difficulties).await;
            }
            if let Some(search) = filter.search {
                catalog.set_search_query(search).await;
            }
            if let Some(hide) = filter.hide_premium {
                catalog.set_hide_premium(hide).await;
            }
            let selection = &catalog.state().selection;
            println!("companies:    {:?}", selection.companies);
            println!("topics:       {:?}", selection.topics);
            println!("difficulties: {:?}", selection.difficulties);
            println!("search:       {:?}", selection.search_query);
            println!("hide premium: {}", selection.hide_premium);
            println!("matching:     {}", catalog.filtered().len());
        }
        Command::Sort { key } => {
            let mut catalog = catalog.lock().await;
            catalog.toggle_sort(key).await;
            let state = match catalog.sort_state(key) {
                SortState::Neutral => "off",
                SortState::Asc => "ascending",
                SortState::Desc => "descending",
            };
            println!("{key}: {state}");
            for (rank, entry) in catalog.state().sort.entries().iter().enumerate() {
                println!("  {}. {} {:?}", rank + 1, entry.key, entry.direction);
            }
        }
        Command::Revise { title } => {
            let mut catalog = catalog.lock().await;
            if catalog.dataset().get(&title).is_none() {
                tracing::warn!(title = %title, "title is not in the dataset");
            }
            let now = catalog.toggle_revised(&title).await;
            println!("{title}: {}", if now { "revised" } else { "not revised" });
        }
        Command::Stats => {
            let catalog = catalog.lock().await;
            let stats = catalog.stats();
            let premium = catalog.premium_summary();
            println!(
                "solved:  {} ({}% of goal)",
                stats.solved_count, stats.solved_percent
            );
            println!(
                "revised: {} ({}% of goal)",
                stats.revised_count, stats.revised_percent
            );
            if !catalog.state().selection.companies.is_empty() {
                println!(
                    "selected companies: {}/{} solved, {} remaining",
                    stats.company.solved, stats.company.total, stats.company.remaining
                );
            }
            println!(
                "premium: {} flagged of {} checked{}",
                premium.premium,
                premium.checked,
                if catalog.premium_check_complete() { "" } else { " (check incomplete)" }
            );
        }
        Command::Options => {
            let catalog = catalog.lock().await;
            let options = catalog.filter_options();
            println!("companies:    {}", options.companies.join(", "));
            println!("topics:       {}", options.topics.join(", "));
            let levels: Vec<&str> = options.difficulties.iter().map(|d| d.as_str()).collect();
            println!("difficulties: {}", levels.join(", "));
        }
        Command::Login {
            session,
            csrf,
            cookies,
        } => {
            let session = session.or_else(|| env_credential("PREP_LC_SESSION"));
            let csrf = csrf.or_else(|| env_credential("PREP_LC_CSRF"));
            let mut credentials =
                Credentials::new(session.unwrap_or_default(), csrf.unwrap_or_default())?;
            if let Some(raw) = cookies.or_else(|| env_credential("PREP_LC_COOKIES")) {
                credentials = credentials.with_all_cookies(raw);
            }
            match services.sync().login(credentials).await {
                Some(name) => println!("logged in as {name}"),
                None => println!("logged in (username unknown)"),
            }
        }
        Command::Sync(target) => {
            for line in run_sync(&services.sync(), target).await? {
                println!("{line}");
            }
        }
        Command::Logout => {
            services.sync().logout().await;
            println!("logged out");
        }
    }

    Ok(())
}

/// Run the requested syncs and describe each outcome.
///
/// With `all`, a failed solved sync is reported and the premium sync still
/// runs.
async fn run_sync(sync: &SyncService, target: SyncTarget) -> Result<Vec<String>, SyncError> {
    let mut report = Vec::new();
    if matches!(target, SyncTarget::Solved | SyncTarget::All) {
        match sync.sync_solved().await {
            Ok(count) => report.push(format!("solved: {count} questions synced")),
            Err(err) if target == SyncTarget::All => {
                tracing::warn!(error = %err, "solved sync failed, continuing with premium");
                report.push(format!("solved: sync failed: {err}"));
            }
            Err(err) => return Err(err),
        }
    }
    if matches!(target, SyncTarget::Premium | SyncTarget::All) {
        match sync.sync_premium().await {
            Ok(checked) => report.push(format!("premium: {checked} questions checked")),
            Err(SyncError::AlreadyComplete) => report.push("premium: already checked".into()),
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
