//! MMGH administrative backend library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod accounts;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod mailer;
pub mod push;
pub mod records;
pub mod routes;
pub mod state;
