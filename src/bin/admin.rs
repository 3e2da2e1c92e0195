//! CLI administration tool for tinylink.
//!
//! Provides commands for initialising the database, checking connectivity,
//! and managing links without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the schema
//! cargo run --bin admin -- db init
//!
//! # Check database connection, tables and link count
//! cargo run --bin admin -- db check
//!
//! # Manage links
//! cargo run --bin admin -- links list
//! cargo run --bin admin -- links create https://example.com --code testA1
//! cargo run --bin admin -- links show testA1
//! cargo run --bin admin -- links delete testA1
//!
//! # Totals
//! cargo run --bin admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `BASE_URL` (optional): prefix used when printing short URLs

use tinylink::application::services::LinkService;
use tinylink::domain::entities::Link;
use tinylink::infrastructure::persistence::{PgLinkRepository, pool::MIGRATOR};
use tinylink::utils::base_url::short_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing tinylink.
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
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List all links, newest first
    List,

    /// Show one link
    Show {
        /// Short code
        code: String,
    },

    /// Create a link
    Create {
        /// Destination URL (http or https)
        url: String,

        /// Custom code, 6-8 letters or digits (generated if omitted)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Delete a link
    Delete {
        /// Short code
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Apply schema migrations
    Init,

    /// Check connection, list tables and count links
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let result = match cli.command {
        Commands::Links { action } => handle_link_action(action, &pool).await,
        Commands::Stats => handle_stats(&pool).await,
        Commands::Db { action } => handle_db_action(action, &pool).await,
    };

    pool.close().await;
    result
}

/// Dispatches link management commands through the link service.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let service = LinkService::new(repo);
    let base = std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());

    match action {
        LinkAction::List => list_links(&service, &base).await,
        LinkAction::Show { code } => show_link(&service, &base, &code).await,
        LinkAction::Create { url, code } => create_link(&service, &base, &url, code).await,
        LinkAction::Delete { code, yes } => delete_link(&service, &code, yes).await,
    }
}

/// Prints every link as a table.
///
/// ```text
/// 🔗 Links
///
///   Code      Clicks  Last clicked       URL
///   ──────────────────────────────────────────────────────────────
///   testA1    3       2024-01-15 10:30   https://example.com/hello
/// ```
async fn list_links(service: &LinkService<PgLinkRepository>, base: &str) -> Result<()> {
    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    let links = service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<9} {:<7} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Last clicked".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<9} {:<7} {:<18} {}",
            link.code.cyan(),
            link.clicks.to_string().bright_green(),
            format_last_clicked(link).bright_black(),
            link.url
        );
    }

    println!();
    println!(
        "  Total: {}  (short URLs under {})",
        links.len().to_string().bright_white().bold(),
        base.bright_cyan()
    );
    println!();

    Ok(())
}

/// Prints a single link with its statistics.
async fn show_link(service: &LinkService<PgLinkRepository>, base: &str, code: &str) -> Result<()> {
    let link = service
        .get_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    print_link(&link, base);
    Ok(())
}

/// Creates a link and prints the result.
async fn create_link(
    service: &LinkService<PgLinkRepository>,
    base: &str,
    url: &str,
    code: Option<String>,
) -> Result<()> {
    println!("{}", "✨ Create Link".bright_blue().bold());
    println!();

    let link = service
        .create_link(url, code.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    print_link(&link, base);
    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(
    service: &LinkService<PgLinkRepository>,
    code: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑  Delete Link".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete link '{}'?", code))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete '{}': {}", code, e))?;

    println!("{}", "✅ Link deleted".green().bold());
    Ok(())
}

fn print_link(link: &Link, base: &str) {
    println!();
    println!("  Code:         {}", link.code.cyan());
    println!("  Short URL:    {}", short_url(base, &link.code).bright_yellow());
    println!("  URL:          {}", link.url);
    println!("  Clicks:       {}", link.clicks.to_string().bright_green());
    println!("  Last clicked: {}", format_last_clicked(link));
    println!(
        "  Created:      {}",
        link.created_at.format("%Y-%m-%d %H:%M")
    );
    println!();
}

fn format_last_clicked(link: &Link) -> String {
    link.last_clicked
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

/// Displays link and click totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM links")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:   {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:  {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database setup and diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Init => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            MIGRATOR
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "✅ Database initialized".green().bold());
        }
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").execute(pool).await?;
            println!("{}", "✅ Database connection OK".green().bold());

            let tables: Vec<String> = sqlx::query_scalar(
                "SELECT table_name::TEXT FROM information_schema.tables WHERE table_schema = 'public' ORDER BY table_name",
            )
            .fetch_all(pool)
            .await?;
            println!("  Tables: {}", tables.join(", ").cyan());

            if tables.iter().any(|t| t == "links") {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                    .fetch_one(pool)
                    .await?;
                println!("  Links:  {}", count.to_string().bright_green());
            } else {
                println!(
                    "{}",
                    "⚠️  Table 'links' missing, run: admin db init".yellow()
                );
            }
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
