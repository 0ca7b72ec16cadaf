pub mod app_settings;
pub mod app_state;
pub mod details;
pub mod effects;
pub mod messages;
pub mod network;
pub mod notice;
