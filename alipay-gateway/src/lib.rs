pub mod adapters;
pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod repositories;
pub mod server;
pub mod services;
pub mod utils;
