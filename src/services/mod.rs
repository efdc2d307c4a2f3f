pub mod careers_scraper;
pub mod discord_notifier;
pub mod job_watcher;
pub mod listing_fetcher;

pub use careers_scraper::*;
pub use discord_notifier::*;
pub use job_watcher::*;
pub use listing_fetcher::*;
