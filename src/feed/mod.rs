mod fetch;
mod parse;

pub use fetch::fetch_feed;
pub use parse::{Episode, FeedEntry, episodes_from_entries, parse_feed};
