pub mod api;
pub mod carrier;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod notify;
pub mod observability;
pub mod state;
pub mod store;
pub mod sync;
