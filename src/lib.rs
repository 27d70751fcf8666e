pub mod application;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod ui;
