use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brandhub::{AppState, config, db, scheduler, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    // Check for seed flag
    if std::env::var("SEED_DEMO").is_ok() {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let preferred_port = config.port;
    let scheduler_enabled = config.scheduler_enabled;
    let state = AppState::new(db, config);

    // Background jobs: publishing, campaigns, inbox, token refresh
    if scheduler_enabled {
        let scheduler_state = state.clone();
        tokio::spawn(async move {
            scheduler::processor::run_scheduler(scheduler_state).await;
        });
    } else {
        tracing::info!("Scheduler disabled via SCHEDULER_ENABLED=false");
    }

    let app = server::build_app(state);

    // Find available port
    let Some(port) = server::find_available_port(preferred_port) else {
        tracing::error!("No available port near {}", preferred_port);
        std::process::exit(1);
    };
    if port != preferred_port {
        tracing::warn!(
            "Preferred port {} was not available, using port {} instead",
            preferred_port,
            port
        );
    }

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("BrandHub server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
