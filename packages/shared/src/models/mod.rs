pub mod game_session;
pub mod message;
pub mod question;
