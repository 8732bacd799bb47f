//! Video feedback server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use video_feedback_lib::api;
use video_feedback_lib::auth::SessionKeys;
use video_feedback_lib::config::Config;
use video_feedback_lib::db::{DbPool, Repository};
use video_feedback_lib::middleware::RequestLogger;
use video_feedback_lib::services::{ChatProvider, ObjectStore, S3Storage, provider_from_settings};

/// Log a startup failure and exit.
fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", context, err);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Server misconfigured: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, S3_*, VF_SESSION_SECRET and STREAM_* must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Video Feedback Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = DbPool::new(&config.database)
        .await
        .unwrap_or_else(|e| fatal("Failed to connect to database", e));
    info!("Database connection established");

    pool.run_migrations()
        .await
        .unwrap_or_else(|e| fatal("Failed to run migrations", e));
    info!("Database migrations complete");

    let storage = S3Storage::new(&config.storage)
        .await
        .unwrap_or_else(|e| fatal("Failed to initialize object storage", e));

    let chat = provider_from_settings(&config.chat)
        .unwrap_or_else(|e| fatal("Failed to initialize chat provider", e));

    // Prepare shared state
    let repo: Arc<dyn Repository> = Arc::new(pool);
    let store: Arc<dyn ObjectStore> = Arc::new(storage);
    let chat: Arc<dyn ChatProvider> = chat;
    let repo = web::Data::from(repo);
    let store = web::Data::from(store);
    let chat = web::Data::from(chat);
    let keys = web::Data::new(SessionKeys::new(&config.session));

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let config = web::Data::new(config);

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .supports_credentials()
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(repo.clone())
            .app_data(store.clone())
            .app_data(chat.clone())
            .app_data(keys.clone())
            .app_data(config.clone())
            .configure(api::configure_routes)
    });

    server.workers(worker_count).bind(&bind_address)?.run().await
}
