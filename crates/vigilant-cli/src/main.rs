//! # vigilant
//!
//! Command-line front end for the inventory-expiry tracker.
//!
//! Every command opens the local mirror (and the remote store when
//! `VIGILANT_REMOTE_URL` is set), runs against the active session, and
//! exits. Simulated SMS alerts are printed to stdout.

mod config;

use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigilant_client::events::FnSink;
use vigilant_client::inventory::ItemFilter;
use vigilant_client::{AppState, DataSource, HttpRemoteStore, LocalStore, RemoteStore, Sourced};
use vigilant_shared::{Category, Item, ItemId, ItemStatus, NewItem, SmsEvent, Theme, UserProfile};

use crate::config::CliConfig;

/// Track expiry dates and get alerted before things go off.
#[derive(Parser, Debug)]
#[command(name = "vigilant", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a local account and sign in.
    Register {
        phone: String,
        password: String,
        confirm: String,
    },
    /// Sign in with phone number and password.
    Login { phone: String, password: String },
    /// Sign in as the guest profile.
    Demo,
    /// End the active session.
    Logout,
    /// Show the active session.
    Whoami,
    /// Track a new item.
    Add {
        name: String,
        /// Expiry date, YYYY-MM-DD.
        #[arg(long, short)]
        expires: String,
        #[arg(long, short, default_value = "Other")]
        category: Category,
        /// Alert this many days before expiry.
        #[arg(long, short, default_value_t = vigilant_shared::constants::DEFAULT_REMINDER_DAYS)]
        reminder_days: u32,
    },
    /// List tracked items, newest first.
    List {
        /// Only items whose name contains this text (any case).
        #[arg(long, short)]
        search: Option<String>,
        /// Only items of this category.
        #[arg(long, short)]
        category: Option<Category>,
    },
    /// Items expiring within the next few days, earliest first.
    Soon,
    /// Stop tracking an item.
    Delete { id: String },
    /// Run an expiry sweep now.
    Sweep,
    /// Show the notification log.
    Logs {
        /// Only entries whose recipient or item name contains this text.
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show the shared contact directory.
    Directory,
    /// Show freshness statistics.
    Stats,
    /// Show or change alert settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check whether the remote store answers.
    Probe,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set {
        #[arg(long)]
        sms: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,vigilant_client=debug,vigilant_store=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Load configuration and open the stores
    // -----------------------------------------------------------------------
    let config = CliConfig::from_env();
    info!(?config, "Loaded configuration");

    let local = match &config.db_path {
        Some(path) => LocalStore::open_at(path),
        None => LocalStore::open_default(),
    }
    .context("opening local database")?;

    let remote = match &config.remote_url {
        Some(url) => {
            let mut store = HttpRemoteStore::new(url, config.remote_timeout)
                .context("building remote store client")?;
            if let Some(token) = &config.remote_token {
                store = store.with_token(token.clone());
            }
            Some(Arc::new(store) as Arc<dyn RemoteStore>)
        }
        None => None,
    };

    let state = AppState::new(Arc::new(local), remote);

    // -----------------------------------------------------------------------
    // 3. Dispatch
    // -----------------------------------------------------------------------
    run(&state, cli.command).await
}

async fn run(state: &AppState, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            phone,
            password,
            confirm,
        } => {
            let user = state.auth.register(&phone, &password, &confirm).await?;
            println!("Registered {} ({})", user.display_name, user.id);
            sweep(state, &user).await?;
        }
        Commands::Login { phone, password } => {
            let user = state.auth.login(&phone, &password).await?;
            println!("Welcome back, {}", user.display_name);
            sweep(state, &user).await?;
        }
        Commands::Demo => {
            let user = state.auth.demo_login().await?;
            println!("Signed in as {}", user.display_name);
            sweep(state, &user).await?;
        }
        Commands::Logout => {
            state.auth.logout()?;
            println!("Signed out");
        }
        Commands::Whoami => match state.auth.current()? {
            Some(user) => println!(
                "{} ({}) phone: {}",
                user.display_name,
                user.id,
                user.phone.as_deref().unwrap_or("-")
            ),
            None => println!("Not signed in"),
        },
        Commands::Add {
            name,
            expires,
            category,
            reminder_days,
        } => {
            let user = state.auth.require()?;
            let new_item = NewItem {
                name,
                category,
                expiry_date: expires,
                reminder_days,
            };
            let added = state.inventory.add_item(&user.id, new_item, Utc::now()).await?;
            println!("Added {} ({}){}", added.value.name, added.value.id, note(added.source));
            sweep(state, &user).await?;
        }
        Commands::List { search, category } => {
            let user = state.auth.require()?;
            let filter = ItemFilter { search, category };
            let Sourced { value: items, source } =
                state.inventory.list_items(&user.id, &filter).await?;
            let today = Local::now().date_naive();
            for item in &items {
                print_item(item, today);
            }
            println!("{} item(s){}", items.len(), note(source));
        }
        Commands::Soon => {
            let user = state.auth.require()?;
            let today = Local::now().date_naive();
            let items = state.inventory.expiring_soon(&user.id, today).await?;
            for item in &items {
                print_item(item, today);
            }
            if items.is_empty() {
                println!("Nothing expires in the next few days");
            }
        }
        Commands::Delete { id } => {
            let user = state.auth.require()?;
            let deleted = state.inventory.delete_item(&user.id, &ItemId(id)).await?;
            println!(
                "Deleted {} ({}){}",
                deleted.value.name,
                deleted.value.id,
                note(deleted.source)
            );
        }
        Commands::Sweep => {
            let user = state.auth.require()?;
            sweep(state, &user).await?;
        }
        Commands::Logs { search } => {
            let user = state.auth.require()?;
            let logs = state
                .inventory
                .notification_logs(&user.id, search.as_deref())?;
            for entry in &logs {
                println!(
                    "{}  {:<9} {}",
                    entry.dispatched_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    entry.status.as_str(),
                    entry.content
                );
            }
            if logs.is_empty() {
                println!("No alerts sent yet");
            }
        }
        Commands::Directory => {
            state.auth.require()?;
            let Sourced { value: entries, source } = state.facade.list_directory().await?;
            for entry in &entries {
                println!(
                    "{:<16} {:<24} last seen {}",
                    entry.phone,
                    entry.display_name,
                    entry.last_seen.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
            }
            println!("{} contact(s){}", entries.len(), note(source));
        }
        Commands::Stats => {
            let user = state.auth.require()?;
            let stats = state
                .inventory
                .statistics(&user.id, Local::now().date_naive())
                .await?;
            println!(
                "total {}  fresh {}  soon {}  expired {}  invalid {}",
                stats.total, stats.fresh, stats.soon, stats.expired, stats.invalid
            );
            for (category, count) in &stats.by_category {
                println!("  {category:<10} {count}");
            }
        }
        Commands::Config { action } => {
            let user = state.auth.require()?;
            let mut settings = state.facade.get_config(&user.id)?.value;
            if let ConfigAction::Set {
                sms,
                notifications,
                theme,
                language,
            } = action
            {
                if let Some(sms) = sms {
                    settings.sms_enabled = sms;
                }
                if let Some(enabled) = notifications {
                    settings.notifications_enabled = enabled;
                }
                if let Some(theme) = theme {
                    settings.theme = theme;
                }
                if let Some(language) = language {
                    settings.language = language;
                }
                state.facade.save_config(&user.id, &settings)?;
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Probe => {
            if !state.facade.has_remote() {
                println!("No remote store configured");
            } else if state.facade.probe().await {
                println!("Remote store reachable");
            } else {
                println!("Remote store unreachable");
            }
        }
    }
    Ok(())
}

async fn sweep(state: &AppState, user: &UserProfile) -> anyhow::Result<()> {
    let sink = FnSink(|sms: &SmsEvent| {
        println!("[SMS {} -> {}] {}", sms.from, sms.to, sms.body);
    });
    let report = state.sweep.sweep(user, &sink).await?;
    if report.dispatched > 0 {
        println!("{} alert(s) sent", report.dispatched);
    }
    if report.skipped_invalid > 0 {
        println!("{} item(s) with unreadable expiry dates skipped", report.skipped_invalid);
    }
    Ok(())
}

fn print_item(item: &Item, today: NaiveDate) {
    let status = item
        .days_remaining(today)
        .map(|d| ItemStatus::from_days(d).to_string())
        .unwrap_or_else(|_| "Invalid date".to_string());
    println!(
        "{}  {:<24} {:<10} {}  {}",
        item.id, item.name, item.category, item.expiry_date, status
    );
}

fn note(source: DataSource) -> &'static str {
    match source {
        DataSource::RemoteUnavailableFallbackUsed => " (remote unavailable, saved locally)",
        DataSource::RemoteSuccess | DataSource::LocalOnly => "",
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_arguments() {
        let cli = Cli::try_parse_from([
            "vigilant", "add", "Milk", "--expires", "2026-03-12", "-c", "food",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                name,
                category,
                reminder_days,
                ..
            } => {
                assert_eq!(name, "Milk");
                assert_eq!(category, Category::Food);
                assert_eq!(reminder_days, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from(["vigilant", "list", "-s", "milk", "--category", "Medicine"])
            .unwrap();
        match cli.command {
            Commands::List { search, category } => {
                assert_eq!(search.as_deref(), Some("milk"));
                assert_eq!(category, Some(Category::Medicine));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["vigilant", "logs", "--search", "+1555"]).unwrap();
        assert!(matches!(cli.command, Commands::Logs { search: Some(ref s) } if s == "+1555"));
    }

    #[test]
    fn parses_config_set() {
        let cli = Cli::try_parse_from(["vigilant", "config", "set", "--sms", "false", "--theme", "dark"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Set {
                    sms: Some(false),
                    theme: Some(Theme::Dark),
                    ..
                }
            }
        ));
    }
}
