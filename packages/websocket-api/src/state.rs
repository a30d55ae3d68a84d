use std::sync::Arc;

use shared::services::game_session_service::GameSessionService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::notification_service::NotificationService;

#[derive(Clone)]
pub struct AppState {
    pub matchmaking_service: Arc<MatchmakingService>,
    pub game_session_service: Arc<GameSessionService>,
    pub notification_service: Arc<NotificationService>,
}
