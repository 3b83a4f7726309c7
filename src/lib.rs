pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod productos;
pub mod state;
