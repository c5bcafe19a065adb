use super::formatters::{self, SlackMessage};
use super::Notifier;
use crate::config::MonitorConfig;
use crate::error::DeliveryError;
use crate::models::{Game, Round, Standing, Tournament};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// Posts formatted tournament events to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackNotifier {
    http_client: reqwest::Client,
    webhook_url: String,
    channel: Option<String>,
    standings_top_n: usize,
}

impl std::fmt::Debug for SlackNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackNotifier")
            .field("channel", &self.channel)
            .field("standings_top_n", &self.standings_top_n)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    message: &'a SlackMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, channel: Option<String>, standings_top_n: usize) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            webhook_url: webhook_url.into(),
            channel,
            standings_top_n,
        }
    }

    pub fn from_config(webhook_url: impl Into<String>, config: &MonitorConfig) -> Self {
        Self::new(
            webhook_url,
            config.slack.channel.clone(),
            config.notifications.standings_top_n,
        )
    }

    fn payload<'a>(&'a self, message: &'a SlackMessage) -> WebhookPayload<'a> {
        WebhookPayload {
            message,
            channel: self.channel.as_deref(),
        }
    }

    /// POST one message. Failures are logged and returned; nothing is retried.
    pub async fn send_message(&self, message: &SlackMessage) -> Result<(), DeliveryError> {
        let result = self.post(message).await;
        match &result {
            Ok(()) => info!(
                "Message sent successfully to Slack: {}...",
                message.text.chars().take(50).collect::<String>()
            ),
            Err(e) => error!("Failed to send Slack message: {}", e),
        }
        result
    }

    async fn post(&self, message: &SlackMessage) -> Result<(), DeliveryError> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&self.payload(message))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_tournament_start(&self, tournament: &Tournament) -> Result<(), DeliveryError> {
        self.send_message(&formatters::tournament_start_message(tournament))
            .await
    }

    async fn notify_round_start(&self, round: &Round, tournament_name: &str) -> Result<(), DeliveryError> {
        self.send_message(&formatters::round_start_message(round, tournament_name))
            .await
    }

    async fn notify_game_result(&self, game: &Game, tournament_name: &str) -> Result<(), DeliveryError> {
        self.send_message(&formatters::game_result_message(game, tournament_name))
            .await
    }

    async fn notify_standings(
        &self,
        standings: &[Standing],
        tournament_name: &str,
    ) -> Result<(), DeliveryError> {
        let message = formatters::standings_message(
            standings,
            tournament_name,
            self.standings_top_n,
            Utc::now(),
        );
        self.send_message(&message).await
    }
}
