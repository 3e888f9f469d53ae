pub mod api;
pub mod client;
pub mod parse;

pub use client::YoutubeClient;
pub use parse::{extract_video_id, parse_iso8601_duration};
