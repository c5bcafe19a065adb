//! Error types shared by the API client, the notifier and config loading.
//!
//! None of these are fatal to a running monitor on their own: config errors fall
//! back to defaults, delivery errors drop the notification, and fetch errors skip
//! the rest of the current poll. [`FetchError::is_fatal`] errors stop the loop,
//! but only on the first poll.

use std::path::PathBuf;
use thiserror::Error;

/// Config file could not be used; callers substitute defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure reaching or understanding the tournament API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("{url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    /// Errors that will not go away by polling again: bad credentials or an
    /// unknown tournament.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FetchError::Status {
                status: 401 | 403 | 404,
                ..
            }
        )
    }
}

/// Webhook POST failed; the notification is dropped.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}
