pub mod auth;
pub mod config;
pub mod context;
pub mod prompts;
pub mod status;
pub mod sync;
pub mod sync_ui;
pub mod videos;
