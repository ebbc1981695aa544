pub mod catalog;
pub mod config;
pub mod errors;
pub mod logging;
pub mod recommend;
pub mod server;
pub mod store;
