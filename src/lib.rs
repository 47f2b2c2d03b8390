pub mod config;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod networks;
pub mod report;
pub mod services;
