pub mod console;
pub mod telegram;
pub mod utils;

pub use console::ConsoleTelegramApi;
pub use telegram::BotApiClient;
