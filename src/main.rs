use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepost::config::Config;
use gatepost::db::{AppState, create_pool, init_db, queries};
use gatepost::handlers;
use gatepost::models::{CreateLicense, CreateRelease, LicenseStatus};
use gatepost::prompts::prompt_key;
use gatepost::storage::{FsBlobStore, KvStore, SqliteKvStore};

const SECONDS_PER_DAY: i64 = 86400;

#[derive(Parser, Debug)]
#[command(name = "gatepost")]
#[command(about = "License activation and update distribution server for commercial plugins")]
struct Cli {
    /// Seed the database with dev data (license, release, artifact, prompts)
    #[arg(long)]
    seed: bool,
}

/// Seeds dev data for trying the API locally.
/// Only runs in dev mode and when the dev license does not exist yet.
async fn seed_dev_data(state: &AppState, kv: &SqliteKvStore, artifact_root: &FsBlobStore) {
    const DEV_KEY: &str = "GP-DEV-0000-0000-0000";
    const DEV_SLUG: &str = "acme/seo-assistant";
    const DEV_VERSION: &str = "1.1.0";

    {
        let conn = state.db.get().expect("Failed to get db connection for seeding");
        if queries::get_license_by_key(&conn, DEV_KEY)
            .expect("Failed to look up dev license")
            .is_some()
        {
            tracing::info!("Dev data already present, skipping seed");
            return;
        }

        tracing::info!("============================================");
        tracing::info!("SEEDING DEV DATA");
        tracing::info!("============================================");

        let license = queries::create_license(
            &conn,
            &CreateLicense {
                key: DEV_KEY.to_string(),
                plan: "pro".to_string(),
                max_activations: 3,
                expires_at: Some(Utc::now().timestamp() + 365 * SECONDS_PER_DAY),
                status: LicenseStatus::Active,
            },
        )
        .expect("Failed to create dev license");
        tracing::info!("License: {} (plan: {}, max activations: {})", license.key, license.plan, license.max_activations);

        let artifact_key = format!("{}/{}.zip", DEV_SLUG, DEV_VERSION);
        let artifact_path = artifact_root.root().join(&artifact_key);
        if let Some(parent) = artifact_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create artifact directory");
        }
        std::fs::write(&artifact_path, b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0")
            .expect("Failed to write dev artifact");

        let release = queries::create_release(
            &conn,
            &CreateRelease {
                slug: DEV_SLUG.to_string(),
                version: DEV_VERSION.to_string(),
                changelog: Some("Dev release seeded locally.".to_string()),
                signature: None,
                artifact_key: artifact_key.clone(),
            },
        )
        .expect("Failed to create dev release");
        tracing::info!("Release: {} {} -> {}", release.slug, release.version, artifact_path.display());
    }

    kv.put(
        &prompt_key("v1", "common"),
        &serde_json::json!([{ "id": "greeting", "text": "You are a helpful writing assistant." }]),
    )
    .await
    .expect("Failed to seed prompts");
    tracing::info!("Prompts: {}", prompt_key("v1", "common"));

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED SUCCESSFULLY");
    tracing::info!("============================================");

    println!();
    println!("--- COPY FROM HERE ---");
    println!("  license_key: {}", DEV_KEY);
    println!("  slug: {}", DEV_SLUG);
    println!("  latest_version: {}", DEV_VERSION);
    println!("--- END COPY ---");
    println!();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatepost=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.update_token_single_use {
        tracing::info!("Update tokens are single-use");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    // Purge long-expired update tokens on startup (0 = never purge)
    if config.update_token_retention_days > 0 {
        let conn = db_pool.get().expect("Failed to get connection for purge");
        let cutoff = Utc::now().timestamp() - config.update_token_retention_days * SECONDS_PER_DAY;
        match queries::purge_expired_update_tokens(&conn, cutoff) {
            Ok(count) if count > 0 => {
                tracing::info!(
                    "Purged {} update tokens expired more than {} days ago",
                    count,
                    config.update_token_retention_days
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to purge expired update tokens: {}", e);
            }
        }
    }

    let kv = SqliteKvStore::new(db_pool.clone());
    let blobs = FsBlobStore::new(&config.artifact_dir);

    let state = AppState {
        db: db_pool,
        kv: Arc::new(kv.clone()),
        blobs: Arc::new(blobs.clone()),
        base_url: config.base_url.clone(),
        token_policy: config.token_policy(),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set GATEPOST_ENV=dev)");
        } else {
            seed_dev_data(&state, &kv, &blobs).await;
        }
    }

    let app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Gatepost server listening on {}", addr);
    tracing::info!("Serving artifacts from {}", config.artifact_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
