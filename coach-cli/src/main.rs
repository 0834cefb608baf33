//! Coach CLI - record expenses and get spending insights
//!
//! Usage:
//!   coach auth guest                         Continue as the demo user
//!   coach expense add --amount 12 --category "Food & Dining"
//!   coach expense import --csv expenses.csv  Import an expense export
//!   coach insights refresh                   Weekly summary insights
//!   coach summary                            Totals for the month and week

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use coach_core::time::{parse_tz, to_rfc3339_utc};
use coach_core::{
    Category, ExpenseRecord, InsightEngine, InsightRecord, Session, icon_for_label,
    weekly_breakdown,
};
use coach_ingest::{merge_imported, normalize_category, parse_expense_csv};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod state;

use config::Config;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("COACH_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "coach", version = VERSION, about = "Expense tracker with a rule-based spending coach")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.coach/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Sign in, continue as guest, sign out
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Record, list and import expenses
    Expense {
        #[command(subcommand)]
        command: ExpenseCommand,
    },

    /// Show and refresh insights
    Insights {
        #[command(subcommand)]
        command: InsightsCommand,
    },

    /// Totals: all time, this month, trailing week by category
    Summary,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Sign in with an email address
    SignIn {
        #[arg(long)]
        email: String,
    },
    /// Continue as the demo user
    Guest,
    /// Sign out and clear expenses and insights
    SignOut,
    /// Show the signed-in user
    Status,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// Record a new expense and get an instant insight
    Add {
        #[arg(long)]
        amount: f64,

        /// Category label (see `coach expense categories`)
        #[arg(long, default_value = "Other")]
        category: String,

        #[arg(long)]
        note: Option<String>,
    },
    /// List expenses, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Import expenses from a CSV export, then refresh insights
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List the available categories
    Categories,
}

#[derive(Subcommand, Debug)]
enum InsightsCommand {
    /// List retained insights, newest first
    List,
    /// Summarize the trailing week into new insights
    Refresh,
    /// Show the most recent insight
    Latest,
    /// Dismiss the most recent insight
    Dismiss,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => {
            let mut app = App::open()?;
            match command {
                AuthCommand::SignIn { email } => {
                    let user = app.session.sign_in(&email)?;
                    println!("Signed in as {}", user.uid);
                }
                AuthCommand::Guest => {
                    app.session.continue_as_guest();
                    println!("Continuing as guest (demo user)");
                }
                AuthCommand::SignOut => {
                    app.session.sign_out();
                    println!("Signed out");
                }
                AuthCommand::Status => match app.session.state().user() {
                    Some(u) => println!(
                        "Signed in as {}{}",
                        u.email.as_deref().unwrap_or(&u.uid),
                        if u.is_demo() { " (guest)" } else { "" }
                    ),
                    None => println!("Not signed in"),
                },
            }
            app.save()?;
        }

        Command::Expense { command } => {
            let mut app = App::open()?;
            match command {
                ExpenseCommand::Add { amount, category, note } => {
                    add_expense(&mut app, amount, &category, note.as_deref())?;
                }
                ExpenseCommand::List { limit } => list_expenses(&app, limit),
                ExpenseCommand::Import { csv } => {
                    let (added, insights) = import_expenses(&mut app, &csv)?;
                    println!("Imported {} new expenses from {}", added, csv.display());
                    for i in &insights {
                        print_insight(i);
                    }
                }
                ExpenseCommand::Categories => {
                    for c in Category::ALL {
                        println!("{:<18} {}", c.label(), c.icon());
                    }
                }
            }
            app.save()?;
        }

        Command::Insights { command } => {
            let mut app = App::open()?;
            match command {
                InsightsCommand::List => {
                    let items = app.session.state().insights.items();
                    if items.is_empty() {
                        println!("No insights yet. Add an expense or run: coach insights refresh");
                    }
                    for i in items {
                        print_insight(i);
                    }
                }
                InsightsCommand::Refresh => {
                    for i in refresh_insights(&mut app, Utc::now())? {
                        print_insight(&i);
                    }
                }
                InsightsCommand::Latest => match app.session.state().insights.latest() {
                    Some(i) => print_insight(i),
                    None => println!("No new insight"),
                },
                InsightsCommand::Dismiss => app.session.dismiss_latest(),
            }
            app.save()?;
        }

        Command::Summary => {
            let app = App::open()?;
            summary(&app, Utc::now())?;
        }
    }

    Ok(())
}

/// Loaded config + session, saved back after a command runs.
struct App {
    cfg: Config,
    path: PathBuf,
    session: Session,
}

impl App {
    fn open() -> Result<Self> {
        let cfg = config::load_config()?;
        let path = state::session_path()?;
        let app_state = state::load_session_from(&path, cfg.insights.retained)?;
        debug!(path = %path.display(), "loaded session");

        let engine = InsightEngine::new(cfg.insights.policy());
        Ok(Self {
            session: Session::from_entropy(app_state, engine),
            cfg,
            path,
        })
    }

    fn save(self) -> Result<()> {
        state::save_session_to(&self.path, &self.session.into_state())
    }
}

fn require_user(app: &App) -> Result<String> {
    match app.session.state().user() {
        Some(u) => Ok(u.uid.clone()),
        None => bail!("Not signed in. Run: coach auth sign-in --email <addr> (or coach auth guest)"),
    }
}

fn add_expense(app: &mut App, amount: f64, category: &str, note: Option<&str>) -> Result<()> {
    let category = normalize_category(category);
    let (expense, insight) = app
        .session
        .record_expense(amount, category.label(), note, Utc::now())?;

    println!(
        "Recorded {} in {} ({})",
        app.cfg.profile.money(expense.amount),
        expense.category,
        expense.id
    );
    print_insight(&insight);
    Ok(())
}

fn list_expenses(app: &App, limit: usize) {
    let items = &app.session.state().expenses.items;
    if items.is_empty() {
        println!("No expenses yet");
        return;
    }
    for e in items.iter().take(limit) {
        print_expense(app, e);
    }
    if items.len() > limit {
        println!("... {} more", items.len() - limit);
    }
}

fn print_expense(app: &App, e: &ExpenseRecord) {
    println!(
        "{} | {:>10} | [{}] {}{}",
        to_rfc3339_utc(e.created_at),
        app.cfg.profile.money(e.amount),
        icon_for_label(&e.category),
        e.category,
        e.note.as_deref().map(|n| format!(" - {n}")).unwrap_or_default()
    );
}

/// Merge a CSV export into the expense list, then summarize. Returns how many
/// rows were new.
fn import_expenses(app: &mut App, csv: &Path) -> Result<(usize, Vec<InsightRecord>)> {
    let uid = require_user(app)?;
    if !csv.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", csv.display());
    }

    let imported = parse_expense_csv(csv, &uid)?;
    let mut merged = app.session.state().expenses.items.clone();
    let added = merge_imported(&mut merged, imported);
    debug!(added, path = %csv.display(), "imported expenses");

    let insights = app.session.apply_snapshot(merged, Utc::now());
    Ok((added, insights))
}

fn refresh_insights(app: &mut App, now: DateTime<Utc>) -> Result<Vec<InsightRecord>> {
    require_user(app)?;
    let expenses = app.session.state().expenses.items.clone();
    Ok(app.session.apply_snapshot(expenses, now))
}

fn format_insight(i: &InsightRecord) -> String {
    let category = i
        .category
        .as_deref()
        .map(|c| format!(" ({} {})", icon_for_label(c), c))
        .unwrap_or_default();
    format!("[{} {}] {}{}", i.kind.icon(), i.kind, i.message, category)
}

fn print_insight(i: &InsightRecord) {
    println!("{}", format_insight(i));
}

fn summary(app: &App, now: DateTime<Utc>) -> Result<()> {
    let state = app.session.state();
    let profile = &app.cfg.profile;
    let tz = parse_tz(&profile.timezone)?;
    let window_days = app.session.engine().policy().window_days;

    println!("Total spent:      {}", profile.money(state.total_spent()));
    println!("This month ({}): {}", profile.timezone, profile.money(state.month_total(now, tz)));

    let weekly = weekly_breakdown(&state.expenses.items, now, window_days);
    println!(
        "Last {} days:     {} across {} expenses",
        window_days,
        profile.money(weekly.total),
        weekly.expense_count
    );
    for (label, sum) in &weekly.by_category {
        println!("  [{}] {:<18} {}", icon_for_label(label), label, profile.money(*sum));
    }
    if let Some((label, _)) = weekly.top_category() {
        println!("Top category: {}", label);
    }
    Ok(())
}
