//! Outbound notifications for tournament events.
//!
//! [`Notifier`] is the sink the monitor talks to; [`SlackNotifier`] is the
//! webhook-backed implementation and [`formatters`] builds its messages.

pub mod formatters;
pub mod slack;

use crate::error::DeliveryError;
use crate::models::{Game, Round, Standing, Tournament};
use async_trait::async_trait;

pub use formatters::SlackMessage;
pub use slack::SlackNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_tournament_start(&self, tournament: &Tournament) -> Result<(), DeliveryError>;

    async fn notify_round_start(&self, round: &Round, tournament_name: &str) -> Result<(), DeliveryError>;

    async fn notify_game_result(&self, game: &Game, tournament_name: &str) -> Result<(), DeliveryError>;

    async fn notify_standings(
        &self,
        standings: &[Standing],
        tournament_name: &str,
    ) -> Result<(), DeliveryError>;
}
