// src/lib.rs

pub mod codec;
pub mod config;
pub mod db;
pub mod delivery;
pub mod http;
pub mod render;
pub mod repositories;
pub mod services;
pub mod stats;
pub mod test_utils;
pub mod utils;

pub use db::Database;
pub use livedesk_common::error::Error;
pub use livedesk_common::models;
pub use http::{DefaultHttpClient, HttpClient};
