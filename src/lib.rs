//! Adserve Backend Library
//!
//! Exposes the full engine for the server binary, the seed tool, and
//! integration tests.

pub mod api;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
