pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod proxy;
pub mod schemas;
pub mod server;
pub mod utils;
