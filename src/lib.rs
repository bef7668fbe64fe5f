pub mod cache;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod observability;
pub mod session;
pub mod transport;
