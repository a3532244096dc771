pub mod asset_models;
pub mod capture_models;
pub mod config;
pub mod error;
pub mod state;
