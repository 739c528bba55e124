pub mod session_strategy;
pub mod telegram_api;
