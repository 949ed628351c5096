pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod submissions;
