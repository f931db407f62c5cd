pub mod auth;
pub mod batching;
pub mod condition;
pub mod config;
pub mod db;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod rest;
pub mod static_assets;
pub mod validate;
pub mod views;
