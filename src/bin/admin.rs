//! CLI administration tool for resume-tracker.
//!
//! Manages redirect targets, prints activity reports and performs database
//! maintenance without going through the HTTP service.
//!
//! # Usage
//!
//! ```bash
//! # Set the last-resort target of a user
//! cargo run --bin admin -- profile set jdoe https://example.com/jdoe
//!
//! # Set the fallback target for all jobs at a company
//! cargo run --bin admin -- default set jdoe ACME https://example.com/jdoe/acme
//!
//! # Set the target of one job
//! cargo run --bin admin -- target set jdoe ACME 1234 https://example.com/jdoe/acme-1234
//!
//! # Show visit counts
//! cargo run --bin admin -- redirects list jdoe
//!
//! # Activity per company
//! cargo run --bin admin -- report jdoe --limit 20
//!
//! # Database maintenance
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db ensure-index
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`

use resume_tracker::application::services::{IndexService, ReportService, TargetService};
use resume_tracker::config::{Config, mask_connection_string};
use resume_tracker::domain::entities::{IndexStatus, RedirectKey, RedirectRecord};
use resume_tracker::infrastructure::persistence::{
    PgActivityRepository, PgProfileRepository, PgRedirectRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing resume-tracker.
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
    /// Manage user profile targets
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage company default targets
    Default {
        #[command(subcommand)]
        action: DefaultAction,
    },

    /// Manage job targets
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },

    /// Inspect redirect records
    Redirects {
        #[command(subcommand)]
        action: RedirectsAction,
    },

    /// Show activity history grouped by company
    Report {
        user: String,

        /// Only report this company
        #[arg(short, long)]
        company: Option<String>,

        /// Entries per company (1-1000)
        #[arg(short, long)]
        limit: Option<i64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create or replace the profile target of a user
    Set {
        user: String,
        url: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the profile of a user
    Show { user: String },
}

#[derive(Subcommand)]
enum DefaultAction {
    /// Set the fallback target of a user at a company
    Set {
        user: String,
        company: String,
        url: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TargetAction {
    /// Set the target of one job
    Set {
        user: String,
        company: String,
        job_id: String,
        url: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RedirectsAction {
    /// List all records of a user, most visited first
    List { user: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,

    /// Create the redirect key index if it is missing
    EnsureIndex,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to {}",
                mask_connection_string(&database_url)
            )
        })?;
    let pool = Arc::new(pool);

    let redirects = Arc::new(PgRedirectRepository::new(pool.clone()));
    let profiles = Arc::new(PgProfileRepository::new(pool.clone()));
    let targets = TargetService::new(redirects.clone(), profiles);

    match cli.command {
        Commands::Profile { action } => handle_profile_action(action, &targets).await?,
        Commands::Default {
            action:
                DefaultAction::Set {
                    user,
                    company,
                    url,
                    yes,
                },
        } => {
            let key = RedirectKey::company_default(user, company);
            set_target(&targets, key, url, yes).await?;
        }
        Commands::Target {
            action:
                TargetAction::Set {
                    user,
                    company,
                    job_id,
                    url,
                    yes,
                },
        } => {
            let key = RedirectKey::new(user, company, job_id);
            set_target(&targets, key, url, yes).await?;
        }
        Commands::Redirects {
            action: RedirectsAction::List { user },
        } => list_redirects(&targets, &user).await?,
        Commands::Report {
            user,
            company,
            limit,
            json,
        } => {
            let reports = ReportService::new(Arc::new(PgActivityRepository::new(pool.clone())));
            print_report(&reports, &user, company.as_deref(), limit, json).await?;
        }
        Commands::Db { action } => {
            handle_db_action(action, &pool, IndexService::new(redirects)).await?
        }
    }

    Ok(())
}

async fn handle_profile_action(action: ProfileAction, targets: &TargetService) -> Result<()> {
    match action {
        ProfileAction::Set { user, url, yes } => {
            println!("{}", "👤 Set Profile Target".bright_blue().bold());
            println!();

            if let Ok(existing) = targets.get_profile(&user).await {
                println!(
                    "  Current: {}",
                    existing.target().unwrap_or("(none)").bright_black()
                );
                println!("  New:     {}", url.cyan());
                println!();

                if !yes && !confirm("Replace the profile target?", false)? {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let profile = targets
                .set_profile_target(&user, &url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to set profile target: {}", e))?;

            println!(
                "{} {} → {}",
                "✅ Profile saved:".green().bold(),
                profile.user.cyan(),
                profile.target().unwrap_or_default().bright_white()
            );
        }
        ProfileAction::Show { user } => match targets.get_profile(&user).await {
            Ok(profile) => {
                println!("{}", "👤 Profile".bright_blue().bold());
                println!();
                println!("  User:    {}", profile.user.cyan());
                println!(
                    "  Target:  {}",
                    profile.target().unwrap_or("(none)").bright_white()
                );
                println!(
                    "  Updated: {}",
                    profile
                        .updated_at
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                        .bright_black()
                );
            }
            Err(_) => println!("{} {}", "⚠️  No profile for".yellow(), user.cyan()),
        },
    }

    Ok(())
}

/// Sets the target of a record, asking before overwriting a different one.
async fn set_target(
    targets: &TargetService,
    key: RedirectKey,
    url: String,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🎯 Set Redirect Target".bright_blue().bold());
    println!();
    println!("  User:    {}", key.user.cyan());
    println!("  Company: {}", key.company.cyan());
    println!("  Job:     {}", key.job_id.cyan());

    let current = targets
        .list_redirects(&key.user)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .into_iter()
        .find(|record| record.key == key)
        .and_then(|record| record.target().map(str::to_string));

    if let Some(current) = current.filter(|current| *current != url) {
        println!("  Current: {}", current.bright_black());
        println!("  New:     {}", url.bright_white());
        println!();

        if !skip_confirm && !confirm("Replace the current target?", false)? {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    } else {
        println!("  Target:  {}", url.bright_white());
        println!();
    }

    let record = targets
        .set_job_target(&key, &url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to set target: {}", e))?;

    println!(
        "{} ({} visits so far)",
        "✅ Target saved".green().bold(),
        record.visits.to_string().bright_white()
    );

    Ok(())
}

/// Lists the redirect records of a user.
///
/// # Output Format
///
/// ```text
/// 📋 Redirects for jdoe
///
///   Company          Job          Visits  Last visit        Target
///   ──────────────────────────────────────────────────────────────────────
///   ACME             1234         12      2025-01-15 10:30  https://example.com/jdoe/acme
/// ```
async fn list_redirects(targets: &TargetService, user: &str) -> Result<()> {
    println!(
        "{} {}",
        "📋 Redirects for".bright_blue().bold(),
        user.cyan().bold()
    );
    println!();

    let records = targets
        .list_redirects(user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list redirects: {}", e))?;

    if records.is_empty() {
        println!("{}", "  No visits recorded".yellow());
        return Ok(());
    }

    println!(
        "  {:<16} {:<12} {:<7} {:<17} {}",
        "Company".bright_white().bold(),
        "Job".bright_white().bold(),
        "Visits".bright_white().bold(),
        "Last visit".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &records {
        print_record(record);
    }

    println!();
    println!(
        "  Total visits: {}",
        records
            .iter()
            .map(|r| r.visits)
            .sum::<i64>()
            .to_string()
            .bright_white()
            .bold()
    );

    Ok(())
}

fn print_record(record: &RedirectRecord) {
    let target = match record.target() {
        Some(target) => target.normal(),
        None => "(none)".bright_black(),
    };

    println!(
        "  {:<16} {:<12} {:<7} {:<17} {}",
        record.key.company.cyan(),
        record.key.job_id,
        record.visits.to_string().bright_green(),
        record
            .last_accessed
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black(),
        target
    );
}

async fn print_report(
    reports: &ReportService,
    user: &str,
    company: Option<&str>,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let groups = reports
        .company_history(user, company, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build report: {}", e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "📊 Activity for".bright_blue().bold(),
        user.cyan().bold()
    );

    if groups.is_empty() {
        println!();
        println!("{}", "  No activity recorded".yellow());
        return Ok(());
    }

    for group in &groups {
        println!();
        println!(
            "  {} ({} visits)",
            group.company.cyan().bold(),
            group.history_count.to_string().bright_green()
        );

        for entry in &group.history {
            println!(
                "    {}  {}  {}",
                entry
                    .ts
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .bright_black(),
                entry.url,
                entry.redirected_to.as_deref().unwrap_or("-").bright_white()
            );
        }
    }
    println!();

    Ok(())
}

/// Handles database maintenance commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, index: IndexService) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            resume_tracker::server::migrate(pool).await?;

            println!("{}", "✅ Schema up to date".green().bold());
        }
        DbAction::EnsureIndex => {
            println!("{}", "🔍 Checking redirect key index...".bright_blue());

            match index.ensure_index().await {
                Some(IndexStatus::Created) => {
                    println!("{}", "✅ Index created".green().bold())
                }
                Some(IndexStatus::AlreadyPresent) => {
                    println!("{}", "✅ Index already present".green().bold())
                }
                None => anyhow::bail!("Failed to ensure the redirect key index"),
            }
        }
    }

    Ok(())
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
