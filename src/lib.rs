// src/lib.rs

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod relay;
pub mod repl;
pub mod scenario;
pub mod secret;
pub mod session;
pub mod transcript;

pub use error::{CellmateError, Result};
