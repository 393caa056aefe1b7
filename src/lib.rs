pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod store;
