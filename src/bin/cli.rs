use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use back_office::repository::{SqliteUserRepository, UserRepository};
use back_office::{bootstrap, db};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::{Row, SqlitePool};

#[derive(Parser, Debug)]
#[command(author, version, about = "back-office admin tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Create a super admin account
    CreateSuperAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List admin accounts with role and status
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The binary CWD may differ from the crate root inside containers.
    if dotenv().is_err() {
        let crate_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            db::migrate(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            print_status(&pool).await?;
        }
        Commands::CreateSuperAdmin { name, email, password } => {
            let users = get_repository().await?;
            let user = bootstrap::create_super_admin(users.as_ref(), &name, &email, &password)
                .await
                .context("failed to create super admin")?;
            println!("Created super admin {} <{}> ({})", user.name, user.email, user.id);
        }
        Commands::ListUsers => {
            let users = get_repository().await?;
            let accounts = users.load().await?;
            println!("{:<38} {:<12} {:<9} {}", "Id", "Role", "Status", "Email");
            for user in accounts {
                println!(
                    "{:<38} {:<12} {:<9} {}",
                    user.id,
                    user.role.as_str(),
                    user.status.as_str(),
                    user.email
                );
            }
        }
    }

    Ok(())
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    db::connect(&database_url).await
}

async fn get_repository() -> anyhow::Result<Arc<dyn UserRepository>> {
    let pool = get_pool().await?;
    db::migrate(&pool).await?;
    Ok(Arc::new(SqliteUserRepository::new(pool)))
}

async fn print_status(pool: &SqlitePool) -> anyhow::Result<()> {
    let migrator = sqlx::migrate!();

    // If the migrations table doesn't exist, nothing is applied yet
    let table = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
        .fetch_optional(pool)
        .await?;
    let applied_versions: HashSet<i64> = if table.is_some() {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter() {
        let status = if applied_versions.contains(&migration.version) { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, migration.version, name);
    }

    Ok(())
}
