//! CLI administration tool for seqlink.
//!
//! Inspects links and click analytics and repairs click counters directly
//! against the database, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Link count and top referrers
//! cargo run --bin admin -- stats
//!
//! # All links with click counts
//! cargo run --bin admin -- links
//!
//! # Apply every pending click increment now
//! cargo run --bin admin -- reconcile --yes
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same database settings as the server: `DATABASE_URL`, or `DB_HOST`,
//! `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.

use seqlink::config::{Config, mask_connection_string};
use seqlink::domain::repositories::{ClickRepository, LinkRepository};
use seqlink::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use seqlink::server::connect_pool;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// Pending clicks fetched per reconciliation round.
const RECONCILE_BATCH_SIZE: i64 = 1000;

/// CLI tool for managing seqlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show link count and top referrers
    Stats {
        /// Number of referrers to show
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// List all links with click counts
    Links,

    /// Apply click increments the server has not applied yet
    Reconcile {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    if config.uses_memory_store() {
        bail!("The admin tool needs a PostgreSQL DATABASE_URL");
    }

    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Stats { limit } => handle_stats(&pool, limit).await?,
        Commands::Links => handle_links(&pool, &config.base_url).await?,
        Commands::Reconcile { yes } => handle_reconcile(&pool, yes).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &config).await?,
    }

    Ok(())
}

/// Displays link count, click count and the most frequent referers.
async fn handle_stats(pool: &PgPool, limit: i64) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let links = PgLinkRepository::new(pool.clone());
    let clicks = PgClickRepository::new(pool.clone());

    let links_count = links.count().await?;
    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM click_events")
        .fetch_one(pool.as_ref())
        .await?;
    let pending_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM click_events WHERE counted = FALSE")
            .fetch_one(pool.as_ref())
            .await?;

    println!(
        "  Links:          {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:         {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!(
        "  Pending counts: {}",
        pending_count.to_string().yellow().bold()
    );
    println!();

    let referrers = clicks.top_referrers(limit.max(1)).await?;
    if referrers.is_empty() {
        println!("{}", "  No clicks recorded yet".yellow());
        println!();
        return Ok(());
    }

    println!("{}", "  Top referrers".bright_white().bold());
    for entry in &referrers {
        let referer = if entry.referer.is_empty() {
            "(direct)".bright_black()
        } else {
            entry.referer.cyan()
        };
        println!(
            "  {:>8}  {}",
            entry.count.to_string().bright_green(),
            referer
        );
    }
    println!();

    Ok(())
}

/// Lists every link in allocation order.
///
/// # Output Format
///
/// ```text
/// 🔗 Links
///
///   Code     Clicks    Events    Created            URL
///   ───────────────────────────────────────────────────────────────────────
///   0000     12        12        2026-03-01 10:30   https://example.com
/// ```
///
/// `Events` is the number of recorded click events. A lower `Clicks` value
/// means increments are still pending; `admin reconcile` applies them.
async fn handle_links(pool: &PgPool, base_url: &str) -> Result<()> {
    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let links = PgLinkRepository::new(pool.clone()).list_all().await?;
    let clicks = PgClickRepository::new(pool);

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!("  Create one with: POST {}/api/links", base_url.trim_end_matches('/'));
        return Ok(());
    }

    println!(
        "  {:<8} {:<9} {:<9} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Events".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(85).bright_black());

    let mut pending_links = 0;
    for link in &links {
        let events = clicks.count_for_link(&link.id).await?;
        let events_cell = if events > link.click_count {
            pending_links += 1;
            events.to_string().yellow()
        } else {
            events.to_string().bright_green()
        };

        println!(
            "  {:<8} {:<9} {:<9} {:<18} {}",
            link.id.cyan(),
            link.click_count.to_string().bright_green(),
            events_cell,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.url
        );
    }

    println!();
    println!(
        "  Total: {}",
        links.len().to_string().bright_white().bold()
    );
    if pending_links > 0 {
        println!(
            "  {}",
            format!("{pending_links} link(s) with pending increments, run `admin reconcile`")
                .yellow()
        );
    }
    println!();

    Ok(())
}

/// Applies every pending click increment.
///
/// Safe to run while the server is up: each increment is applied at most
/// once per click event no matter who applies it.
async fn handle_reconcile(pool: &PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔁 Reconcile click counters".bright_blue().bold());
    println!();

    let pending: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM click_events WHERE counted = FALSE")
            .fetch_one(pool)
            .await?;

    if pending == 0 {
        println!("{}", "✅ All click counters are up to date".green().bold());
        return Ok(());
    }

    println!("  Pending increments: {}", pending.to_string().yellow().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Apply them now?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let clicks = PgClickRepository::new(Arc::new(pool.clone()));
    let cutoff = Utc::now();
    let mut applied = 0usize;

    loop {
        let batch = clicks.uncounted_clicks(cutoff, RECONCILE_BATCH_SIZE).await?;
        if batch.is_empty() {
            break;
        }

        // A concurrent worker may apply some of these first; either way they
        // are counted afterwards and drop out of the next batch.
        for click in batch {
            if clicks.apply_click(click.click_id).await? {
                applied += 1;
            }
        }
    }

    println!();
    println!(
        "{} {}",
        "✅ Applied".green().bold(),
        format!("{applied} increments").bright_white().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());
            println!(
                "  {}",
                mask_connection_string(&config.database_url).bright_black()
            );

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}
