//! MatchPlay Core - shared pieces for tournament monitoring.
//!
//! This crate provides:
//! - Domain models for tournaments, rounds, games and standings
//! - A MatchPlay Events API client behind the `TournamentApi` trait
//! - A Slack webhook notifier behind the `Notifier` trait, with Block Kit formatting
//! - JSON config loading with built-in defaults
//! - Tournament URL helpers

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod utils;

pub use error::{ConfigError, DeliveryError, FetchError};
