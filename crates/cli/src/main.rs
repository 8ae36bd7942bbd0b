//! `oc-lettings-site` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`: start the web site.
//! - `migrate`: apply schema migrations, then move legacy rows.
//! - `copy-model`: copy the records of one model into another.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use copier::{copy_model_data, CopyOptions, CopyReport, ModelRef, SqliteRegistry};

const DEFAULT_DATABASE_URL: &str = "sqlite://oc-lettings-site.sqlite3";

#[derive(Parser)]
#[command(
    name = "oc-lettings-site",
    about = "Holiday home lettings and user profiles",
    version
)]
struct Cli {
    /// SQLite database to use.
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web site.
    Serve {
        #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8000")]
        bind: String,
        /// Directory served under `/static`.
        #[arg(long, env = "STATIC_DIR", default_value = "static")]
        static_dir: PathBuf,
    },
    /// Apply schema migrations and move legacy rows into their new tables.
    Migrate {
        /// Apply the schema only.
        #[arg(long)]
        schema_only: bool,
        /// The caller is a test harness; data moves are skipped unless `--force`.
        #[arg(long)]
        test_run: bool,
        /// Move data even with `--test-run`.
        #[arg(long)]
        force: bool,
    },
    /// Copy every record of one model into another model.
    CopyModel {
        /// Source as `namespace.Type`.
        source: String,
        /// Destination as `namespace.Type`.
        destination: String,
        /// Namespaces that may own tables.
        #[arg(long, value_delimiter = ',', default_value = "auth,oc_lettings_site,lettings,profiles")]
        namespaces: Vec<String>,
        #[arg(long)]
        test_run: bool,
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, static_dir } => {
            info!("Starting web site on {bind}");
            let pool = db::pool::create_pool(&cli.database_url, 10)
                .await
                .context("failed to connect to database")?;
            web::serve(&bind, pool, static_dir).await?;
        }
        Command::Migrate { schema_only, test_run, force } => {
            info!("Running migrations against {}", cli.database_url);
            let pool = db::pool::create_pool(&cli.database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool)
                .await
                .context("schema migration failed")?;

            if !schema_only {
                let options = CopyOptions { test_run, force_run: force };
                let outcomes = copier::relocate_site_models(&pool, options)
                    .await
                    .context("data migration failed")?;
                for outcome in &outcomes {
                    match &outcome.report {
                        Some(report) => {
                            println!("{}", copy_summary(&outcome.source, &outcome.destination, report));
                        }
                        None => {
                            println!(
                                "{} -> {}: destination already populated",
                                outcome.source, outcome.destination
                            );
                        }
                    }
                }
            }
            info!("Migrations applied successfully");
        }
        Command::CopyModel { source, destination, namespaces, test_run, force } => {
            let source = parse_model(&source)?;
            let destination = parse_model(&destination)?;

            let pool = db::pool::create_pool(&cli.database_url, 2)
                .await
                .context("failed to connect to database")?;
            let namespaces: Vec<&str> = namespaces.iter().map(String::as_str).collect();
            let registry = SqliteRegistry::begin(&pool, &namespaces).await?;

            let options = CopyOptions { test_run, force_run: force };
            let report = copy_model_data(&registry, &source, &destination, options).await?;
            registry.commit().await?;

            println!("{}", copy_summary(&source, &destination, &report));
            if !report.skipped_fields.is_empty() {
                println!("fields not present on {destination}: {}", report.skipped_fields.join(", "));
            }
        }
    }

    Ok(())
}

/// One-line summary of a copy.
fn copy_summary(source: &ModelRef, destination: &ModelRef, report: &CopyReport) -> String {
    if report.skipped_run {
        format!("{source} -> {destination}: skipped (test run)")
    } else {
        format!("{source} -> {destination}: {} records copied", report.copied)
    }
}

/// Parse `namespace.Type`.
fn parse_model(text: &str) -> anyhow::Result<ModelRef> {
    let (namespace, type_name) = text
        .rsplit_once('.')
        .filter(|(ns, ty)| !ns.is_empty() && !ty.is_empty())
        .with_context(|| format!("expected `namespace.Type`, got `{text}`"))?;
    Ok(ModelRef::new(namespace, type_name))
}
