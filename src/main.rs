//! blip: terminal view of the Blip monitoring dashboard
//!
//! Reads the same backend as the web dashboard and prints the overview,
//! rankings and recent-activity tables, and manages saved contracts and the
//! user profile.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blip::api::{ApiClient, ProfileUpdate};
use blip::config::AppConfig;
use blip::dashboard::Dashboard;
use blip::format::{truncate_contract_id, NumberFormat};
use blip::query::QueryClient;
use blip::store::Stores;
use blip::types::{Limit, TimeRange};
use blip::views;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "blip", about = "Smart-contract monitoring from the terminal", version)]
struct Cli {
    /// Scope to one contract instead of every saved contract
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Time range, e.g. WEEK_1, MONTH_3, ALL_TIME
    #[arg(long, global = true, value_parser = parse_range)]
    range: Option<TimeRange>,

    /// Rows to fetch: 1, 5, 10, 25, 50 or 100
    #[arg(long, global = true, value_parser = parse_limit)]
    limit: Option<Limit>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Headline stats and charts
    Overview,
    RecentTx,
    RecentEvents,
    RecentAlerts,
    TopEvents,
    TopUsers,
    /// Manage saved contracts
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
    /// Show or edit the signed-in user's profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SavedCommand {
    List,
    Show {
        id: String,
    },
    Add {
        contract_id: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    Rename {
        id: String,
        nickname: String,
    },
    Remove {
        id: String,
    },
    /// Make this contract the default
    Default {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

fn parse_range(s: &str) -> Result<TimeRange, String> {
    TimeRange::from_str(s).ok_or_else(|| {
        let allowed: Vec<&str> = TimeRange::ALL.iter().map(|r| r.as_str()).collect();
        format!("unknown time range '{s}' (expected one of {})", allowed.join(", "))
    })
}

fn parse_limit(s: &str) -> Result<Limit, String> {
    s.parse::<u32>()
        .ok()
        .and_then(Limit::from_value)
        .ok_or_else(|| format!("unsupported limit '{s}' (expected 1, 5, 10, 25, 50 or 100)"))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    init_tracing(config.log.json);
    config.validate().context("Configuration validation failed")?;
    info!(config = %config, "configuration loaded");

    let client = ApiClient::connect(&config.api.base_url, config.timeout(), config.session())
        .context("Failed to build API client")?;
    let queries = Arc::new(QueryClient::new(config.query_options()));
    let stores = Stores::default();
    if let Some(range) = cli.range {
        stores.time_range.set(range);
    }
    if let Some(limit) = cli.limit {
        stores.limit.set(limit);
    }

    let dashboard = Dashboard::new(client, queries, stores);
    let scope = cli.contract.as_deref().filter(|id| !id.is_empty());
    run(&dashboard, scope, cli.limit, cli.command).await
}

/// Logs go to stderr so command output stays pipeable
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blip=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(
    dashboard: &Dashboard,
    scope: Option<&str>,
    rank_limit: Option<Limit>,
    command: Command,
) -> Result<()> {
    let time_range = dashboard.stores().time_range.get();
    let limit = dashboard.stores().limit.get();

    match command {
        Command::Overview => {
            if let Some(id) = scope {
                print_contract_header(dashboard, id).await;
            }
            print_overview(dashboard, scope, time_range).await;
        }
        Command::RecentTx => {
            let state = dashboard.recent_tx(scope, limit).await;
            print!("{}", views::render_query(&state, "transactions", views::recent_tx_table));
        }
        Command::RecentEvents => {
            let state = dashboard.recent_events(scope, limit).await;
            print!("{}", views::render_query(&state, "events", views::recent_events_table));
        }
        Command::RecentAlerts => {
            let state = dashboard.recent_alerts(scope, limit).await;
            print!("{}", views::render_query(&state, "alerts", views::recent_alerts_table));
        }
        Command::TopEvents => {
            let state = dashboard.top_events(scope, time_range, rank_limit).await;
            print!("{}", views::render_query(&state, "events", views::top_events_table));
            if let Some(events) = state.data.as_deref().filter(|e| !e.is_empty()) {
                println!();
                let items = views::top_event_items(events, scope.is_some());
                print!("{}", views::ranking_chart(&items).render());
            }
        }
        Command::TopUsers => {
            let state = dashboard.top_users(scope, time_range, rank_limit).await;
            print!("{}", views::render_query(&state, "users", views::top_users_table));
            if let Some(users) = state.data.as_deref().filter(|u| !u.is_empty()) {
                println!();
                let items = views::top_user_items(users, scope.is_some());
                print!("{}", views::ranking_chart(&items).render());
            }
        }
        Command::Saved { action } => run_saved(dashboard, action).await?,
        Command::Profile { action } => run_profile(dashboard, action).await?,
    }
    Ok(())
}

async fn print_contract_header(dashboard: &Dashboard, id: &str) {
    let state = dashboard.saved_contract(id).await;
    match state.data {
        Some(saved) => println!("{} ({})", saved.nickname, truncate_contract_id(id)),
        None => println!("{}", truncate_contract_id(id)),
    }
    println!();
}

async fn print_overview(dashboard: &Dashboard, scope: Option<&str>, time_range: TimeRange) {
    let data = dashboard.overview(scope, time_range).await;
    println!("Overview ({})", time_range.label());
    println!("{}", views::range_picker(time_range));
    print!("{}", views::render_stats(&views::overview_stats(&data, time_range)));

    if let Some(volume) = &data.tx_volume {
        println!();
        print!(
            "{}",
            views::render_series("Transaction volume", &views::volume_series(volume), NumberFormat::PLAIN)
        );
    }
    if let Some(rates) = &data.tx_success_rate {
        let points = views::success_rate_series(rates);
        println!();
        print!(
            "{}",
            views::render_series(
                &format!(
                    "Success rate (axis from {}%)",
                    views::success_rate_domain_min(&points)
                ),
                &points,
                NumberFormat::PERCENTAGE,
            )
        );
    }
    if let Some(users) = &data.unique_users {
        println!();
        print!(
            "{}",
            views::render_series("Unique users", &views::unique_users_series(users), NumberFormat::PLAIN)
        );
    }
    if let Some(fees) = &data.tx_fees {
        println!();
        print!(
            "{}",
            views::render_series("Average fee", &views::avg_fee_series(fees), NumberFormat::STROOP)
        );
    }
}

async fn run_saved(dashboard: &Dashboard, action: SavedCommand) -> Result<()> {
    match action {
        SavedCommand::List => {
            let state = dashboard.saved_contracts().await;
            print!(
                "{}",
                views::render_query(&state, "saved contracts", views::saved_contracts_table)
            );
        }
        SavedCommand::Show { id } => {
            let state = dashboard.saved_contract(&id).await;
            match state.into_result()? {
                Some(saved) => print!("{}", views::saved_contracts_table(&[saved]).render()),
                None => bail!("No saved contract with id {id}"),
            }
        }
        SavedCommand::Add {
            contract_id,
            nickname,
        } => {
            let saved = dashboard
                .create_saved_contract(&contract_id, nickname.as_deref())
                .await?;
            println!("Saved {} as {}", truncate_contract_id(&saved.contract_id), saved.nickname);
        }
        SavedCommand::Rename { id, nickname } => {
            let saved = dashboard.update_saved_contract(&id, &nickname).await?;
            println!("Renamed {} to {}", truncate_contract_id(&saved.contract_id), saved.nickname);
        }
        SavedCommand::Remove { id } => {
            dashboard.delete_saved_contract(&id).await?;
            println!("Removed {id}");
        }
        SavedCommand::Default { id } => {
            dashboard.set_default_saved_contract(&id).await?;
            println!("Default contract set to {id}");
        }
    }
    Ok(())
}

async fn run_profile(dashboard: &Dashboard, action: ProfileCommand) -> Result<()> {
    let profile = dashboard
        .user_profile()
        .await
        .into_result()?
        .context("No profile returned")?;

    match action {
        ProfileCommand::Show => print!("{}", views::profile_card(&profile)),
        ProfileCommand::Update {
            first_name,
            last_name,
            username,
            email,
        } => {
            let mut update = ProfileUpdate::from_profile(&profile);
            if let Some(v) = first_name {
                update.first_name = v;
            }
            if let Some(v) = last_name {
                update.last_name = v;
            }
            if let Some(v) = username {
                update.username = v;
            }
            if let Some(v) = email {
                update.email = v;
            }
            let updated = dashboard.update_user_profile(&update).await?;
            print!("{}", views::profile_card(&updated));
        }
    }
    Ok(())
}
