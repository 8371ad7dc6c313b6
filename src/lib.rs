pub mod api_connection;
pub mod cli;
pub mod config;
pub mod grocery;
pub mod history;
pub mod models;
pub mod nutrition_summary;
pub mod recipe_generator;
pub mod render;
pub mod session;
pub mod storage;
pub mod telemetry;
