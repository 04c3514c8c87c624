pub mod history;
pub mod http_client;
pub mod search;

pub use history::fetch_daily_history;
pub use search::resolve_symbol;
