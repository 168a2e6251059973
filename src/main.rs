//! Biblio Server - Library Loan Management System
//!
//! A Rust REST API server for managing books, borrowers, and loans.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("biblio_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Biblio Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books
        .route("/books", get(api::books::get_all_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/author/:author", get(api::books::get_books_by_author))
        .route("/books/name/:name", get(api::books::get_book_by_name))
        // Persons
        .route("/persons", get(api::persons::get_all_persons))
        .route("/persons", post(api::persons::create_person))
        .route("/persons/byname", get(api::persons::get_person_by_name))
        .route("/persons/search/:term", get(api::persons::search_persons))
        .route("/persons/:id", get(api::persons::get_person))
        .route("/persons/:id", put(api::persons::update_person))
        .route("/persons/:id", delete(api::persons::delete_person))
        // Loans
        .route("/loans", get(api::loans::get_all_loans))
        .route("/loans", post(api::loans::create_loan))
        .route("/loans/overdue", get(api::loans::get_overdue_loans))
        .route("/loans/returned", get(api::loans::get_returned_loans))
        .route(
            "/loans/person/:person_id/active",
            get(api::loans::get_active_loans_by_person),
        )
        .route(
            "/loans/person/:person_id/history",
            get(api::loans::get_loan_history_by_person),
        )
        .route(
            "/loans/book/:book_id/active",
            get(api::loans::get_active_loans_by_book),
        )
        .route(
            "/loans/book/:book_id/available",
            get(api::loans::is_book_available),
        )
        .route("/loans/:id", get(api::loans::get_loan))
        .route("/loans/:id", put(api::loans::update_loan))
        .route("/loans/:id", delete(api::loans::delete_loan))
        .route("/loans/:id/returned", get(api::loans::is_loan_returned))
        .route("/loans/:id/return", put(api::loans::return_loan))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
