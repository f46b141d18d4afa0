// src/lib.rs

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod routes;
pub mod ssr;
pub mod state;
pub mod storage;
pub mod utils;

pub use routes::create_router;
