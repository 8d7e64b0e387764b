mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use backend::{AppConfig, BackendError, ContestFeed, LeaderboardPoller};
use chrono::Utc;
use clap::{Parser, Subcommand};
use console::{Term, style};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "crown", version, about = "Browse contests and live leaderboards")]
struct Cli {
    /// Print JSON instead of formatted text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Live contests with their top participants
    Contests {
        /// Music category filter ("All" shows everything)
        #[arg(long)]
        category: Option<String>,
    },
    /// Full details and leaderboard of one contest
    Contest {
        id: Uuid,
        /// Also report whether this user can join
        #[arg(long, env = "CROWN_USER")]
        user: Option<Uuid>,
    },
    /// Refresh a contest leaderboard until interrupted
    Watch {
        id: Uuid,
        /// Seconds between refreshes; defaults to the configured poll interval
        #[arg(long)]
        interval: Option<u64>,
        /// Rows to fetch per refresh; defaults to the configured detail limit
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Contest entries submitted by a user
    Submissions {
        #[arg(long, env = "CROWN_USER")]
        user: Uuid,
    },
    /// Profile, TikTok connection and joined contests of a user
    Profile {
        #[arg(long, env = "CROWN_USER")]
        user: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load config")?;
    let feed = Arc::new(ContestFeed::from_config(&config).context("Failed to build clients")?);

    match cli.command {
        Command::Contests { category } => {
            let cards = feed
                .active_contests(Utc::now(), category.as_deref())
                .await
                .context("Failed to load contests")?;
            if cli.json {
                return print_json(&cards);
            }
            if cards.is_empty() {
                println!("No live contests right now");
            }
            for card in &cards {
                println!("{}\n", render::card(card));
            }
        }
        Command::Contest { id, user } => {
            let now = Utc::now();
            let detail = match feed.contest_detail(id, now).await {
                Ok(detail) => detail,
                Err(BackendError::NotFound(_)) => {
                    eprintln!("{}", style(format!("Contest {id} not found")).red());
                    std::process::exit(1);
                }
                Err(e) => return Err(e).context("Failed to load contest"),
            };
            if cli.json {
                return print_json(&detail);
            }
            println!("{}", render::detail(&detail));
            if let Some(user) = user {
                let eligibility = feed.eligibility(&detail.contest, Some(user), now).await;
                println!("\n{}", render::eligibility(eligibility));
            }
        }
        Command::Watch {
            id,
            interval,
            limit,
        } => {
            let lb = feed.leaderboard_config();
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| lb.poll_interval());
            let limit = limit.unwrap_or(lb.detail_limit);
            watch(feed, id, limit, interval, cli.json).await?;
        }
        Command::Submissions { user } => {
            let entries = feed
                .user_entries(user, Utc::now())
                .await
                .context("Failed to load submissions")?;
            if cli.json {
                return print_json(&entries);
            }
            println!("{}", render::entries(&entries));
        }
        Command::Profile { user } => {
            let now = Utc::now();
            let overview = feed
                .profile_overview(user, now)
                .await
                .context("Failed to load profile")?;
            if cli.json {
                return print_json(&overview);
            }
            println!("{}", render::profile(&overview, now));
        }
    }

    Ok(())
}

async fn watch(
    feed: Arc<ContestFeed>,
    id: Uuid,
    limit: u32,
    interval: Duration,
    json: bool,
) -> anyhow::Result<()> {
    let contest = match feed.contest_detail(id, Utc::now()).await {
        Ok(detail) => detail.contest,
        Err(BackendError::NotFound(_)) => {
            eprintln!("{}", style(format!("Contest {id} not found")).red());
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load contest"),
    };

    let token = CancellationToken::new();
    let poller = LeaderboardPoller::spawn(feed, id, limit, interval, token.clone());
    let mut rx = poller.subscribe();
    let term = Term::stdout();

    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
        ctrl_c_token.cancel();
    });

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let Some(snapshot) = rx.borrow_and_update().clone() else {
            continue;
        };

        if json {
            println!("{}", serde_json::to_string(&snapshot)?);
            continue;
        }
        let _ = term.clear_screen();
        let status = contest.calculated_status(Utc::now());
        println!(
            "{} {}  {}",
            render::status_badge(status),
            style(&contest.name).bold(),
            contest.time_left_label(Utc::now())
        );
        println!(
            "{}\n",
            style(format!(
                "refresh #{} at {}, every {}s, Ctrl-C to stop",
                snapshot.round,
                snapshot.fetched_at.format("%H:%M:%S"),
                interval.as_secs()
            ))
            .dim()
        );
        println!("{}", render::board(&snapshot.participants));
    }

    poller.shutdown().await;
    info!(contest_id = %id, "Stopped watching");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
