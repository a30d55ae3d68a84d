use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub mod config;
pub mod connection;
pub mod routes;
pub mod state;

use shared::repositories::question_repository::InMemoryQuestionRepository;
use shared::repositories::session_registry::SessionRegistry;
use shared::services::game_session_service::GameSessionService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::notification_service::NotificationService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = config::Config::from_env();

    // Set up services
    let question_repository = Arc::new(match &config.questions_file {
        Some(path) => InMemoryQuestionRepository::from_json_file(path).unwrap_or_else(|e| {
            warn!("Falling back to sample questions: {}", e);
            InMemoryQuestionRepository::with_sample_questions()
        }),
        None => InMemoryQuestionRepository::with_sample_questions(),
    });

    let registry = Arc::new(SessionRegistry::new());
    let notification_service = Arc::new(NotificationService::new());
    let game_session_service = Arc::new(GameSessionService::new(
        registry.clone(),
        question_repository,
        notification_service.clone(),
        config.inter_round_delay(),
    ));
    let matchmaking_service = Arc::new(MatchmakingService::new(
        registry.clone(),
        notification_service.clone(),
    ));

    let app_state = state::AppState {
        matchmaking_service,
        game_session_service,
        notification_service,
    };

    // Permissive CORS for frontend development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws/game", get(routes::game::ws_handler))
        .layer(cors)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Quiz server listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
