pub mod errors;
pub mod game_session_service;
pub mod matchmaking_service;
pub mod notification_service;
pub mod rating_service;
