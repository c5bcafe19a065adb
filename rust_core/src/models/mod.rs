// Shared models for MatchPlay tournament monitoring
use serde::{Deserialize, Serialize};

// ============================================================================
// Status Enums
// ============================================================================

/// Lifecycle of the whole tournament. Drives whether polling continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TournamentStatus {
    /// Map the MatchPlay status string (`planned`, `started`, `completed`).
    pub fn from_api(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "started" | "in_progress" | "active" => TournamentStatus::InProgress,
            "completed" | "finished" => TournamentStatus::Completed,
            _ => TournamentStatus::NotStarted,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TournamentStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::NotStarted => "not_started",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
        }
    }
}

/// Status of a single round or game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    Pending,
    Active,
    Completed,
}

impl PlayStatus {
    pub fn from_api(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "started" | "active" | "in_progress" | "playing" => PlayStatus::Active,
            "completed" | "finished" => PlayStatus::Completed,
            _ => PlayStatus::Pending,
        }
    }
}

// ============================================================================
// Tournament Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub status: TournamentStatus,
}

/// A player placed on a machine for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub game_id: u64,
    pub machine_name: String,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: u64,
    pub name: String,
    pub status: PlayStatus,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePlayer {
    pub name: String,
    /// Machine score, when the scorekeeper entered one
    pub score: Option<i64>,
    /// Finishing place within the game (1 = winner)
    pub position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub round_id: Option<u64>,
    pub round_name: String,
    pub status: PlayStatus,
    pub machine: String,
    pub players: Vec<GamePlayer>,
}

/// One row of the tournament standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub position: u32,
    pub name: String,
    pub points: f64,
    pub games_played: u32,
}
