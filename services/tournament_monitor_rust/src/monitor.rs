//! Polling/dedup loop for a single tournament.
//!
//! Each poll pulls the tournament, its rounds and its games, announces rounds
//! that became active and games that completed since the last poll, and sends
//! standings on a wall-clock cadence. All tracking state lives in
//! [`MonitorState`], owned by the monitor.

use matchplay_rust_core::clients::TournamentApi;
use matchplay_rust_core::config::MonitorConfig;
use matchplay_rust_core::error::FetchError;
use matchplay_rust_core::models::{PlayStatus, Tournament, TournamentStatus};
use matchplay_rust_core::notify::Notifier;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// What the monitor has already announced. Sets only grow during a run.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub status: TournamentStatus,
    pub seen_rounds: HashSet<u64>,
    pub seen_games: HashSet<u64>,
    /// `None` until the first standings broadcast, which makes standings due
    /// on the first poll
    pub last_standings_update: Option<Instant>,
    pub start_announced: bool,
    /// Set once the first poll has been attempted. 401/403/404 only stop the
    /// monitor before this point.
    pub polled_once: bool,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            status: TournamentStatus::NotStarted,
            seen_rounds: HashSet::new(),
            seen_games: HashSet::new(),
            last_standings_update: None,
            start_announced: false,
            polled_once: false,
        }
    }
}

impl MonitorState {
    pub fn standings_due(&self, now: Instant, interval: Duration) -> bool {
        self.last_standings_update
            .map_or(true, |last| now.saturating_duration_since(last) >= interval)
    }
}

/// Outcome of one poll. Ids are listed when a notification was attempted,
/// whether or not delivery succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub status: TournamentStatus,
    pub rounds_announced: Vec<u64>,
    pub games_announced: Vec<u64>,
    pub standings_sent: bool,
}

pub struct TournamentMonitor<A, N> {
    api: A,
    notifier: N,
    tournament_id: u64,
    poll_interval: Duration,
    standings_interval: Duration,
    announce_start: bool,
    state: MonitorState,
}

impl<A: TournamentApi, N: Notifier> TournamentMonitor<A, N> {
    pub fn new(api: A, notifier: N, tournament_id: u64, config: &MonitorConfig) -> Self {
        Self {
            api,
            notifier,
            tournament_id,
            poll_interval: config.poll_interval(),
            standings_interval: config.standings_interval(),
            announce_start: config.notifications.announce_tournament_start,
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn tournament_id(&self) -> u64 {
        self.tournament_id
    }

    /// Poll until the tournament completes.
    ///
    /// A 401/403/404 on the very first poll means a bad token or an unknown
    /// tournament and is returned as an error. Every later fetch error, of any
    /// kind, is logged and retried after the normal sleep.
    pub async fn run(&mut self) -> Result<(), FetchError> {
        info!(
            "Monitoring tournament {} (poll every {}s, standings every {}m)",
            self.tournament_id,
            self.poll_interval.as_secs(),
            self.standings_interval.as_secs() / 60
        );

        loop {
            let first_poll = !self.state.polled_once;
            let result = self.poll_once(Instant::now()).await;
            self.state.polled_once = true;

            match result {
                Ok(report) => {
                    if report.status.is_terminal() {
                        info!(
                            "Tournament {} completed; stopping monitor ({} rounds, {} games announced)",
                            self.tournament_id,
                            self.state.seen_rounds.len(),
                            self.state.seen_games.len()
                        );
                        return Ok(());
                    }
                }
                Err(e) if first_poll && e.is_fatal() => {
                    error!(
                        "Unrecoverable API error for tournament {} on startup: {}",
                        self.tournament_id, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Poll failed, retrying in {}s: {}",
                        self.poll_interval.as_secs(),
                        e
                    );
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One fetch → diff → notify pass. A fetch error aborts the rest of the pass.
    pub async fn poll_once(&mut self, now: Instant) -> Result<PollReport, FetchError> {
        let tournament = self.api.get_tournament(self.tournament_id).await?;
        let (rounds, games) = self.api.get_rounds_and_games(self.tournament_id).await?;

        if tournament.status != self.state.status {
            info!(
                "Tournament {} status: {} -> {}",
                self.tournament_id,
                self.state.status.as_str(),
                tournament.status.as_str()
            );
            self.state.status = tournament.status;
        }

        let mut report = PollReport {
            status: tournament.status,
            rounds_announced: Vec::new(),
            games_announced: Vec::new(),
            standings_sent: false,
        };

        self.announce_start_once(&tournament).await;

        for round in &rounds {
            if round.status != PlayStatus::Active || self.state.seen_rounds.contains(&round.id) {
                continue;
            }
            info!(
                "New round started: {} ({} assignments)",
                round.name,
                round.assignments.len()
            );
            if let Err(e) = self.notifier.notify_round_start(round, &tournament.name).await {
                warn!("Dropping round-start notification for round {}: {}", round.id, e);
            }
            self.state.seen_rounds.insert(round.id);
            report.rounds_announced.push(round.id);
        }

        for game in &games {
            if game.status != PlayStatus::Completed || self.state.seen_games.contains(&game.id) {
                continue;
            }
            info!("Game completed: {} on {} ({})", game.id, game.machine, game.round_name);
            if let Err(e) = self.notifier.notify_game_result(game, &tournament.name).await {
                warn!("Dropping game-result notification for game {}: {}", game.id, e);
            }
            self.state.seen_games.insert(game.id);
            report.games_announced.push(game.id);
        }

        if self.state.standings_due(now, self.standings_interval) {
            let standings = self.api.get_standings(self.tournament_id).await?;
            if standings.is_empty() {
                debug!("No standings yet for tournament {}", self.tournament_id);
            } else {
                if let Err(e) = self
                    .notifier
                    .notify_standings(&standings, &tournament.name)
                    .await
                {
                    warn!("Dropping standings notification: {}", e);
                }
                self.state.last_standings_update = Some(now);
                report.standings_sent = true;
            }
        }

        Ok(report)
    }

    async fn announce_start_once(&mut self, tournament: &Tournament) {
        if !self.announce_start
            || self.state.start_announced
            || tournament.status != TournamentStatus::InProgress
        {
            return;
        }
        if let Err(e) = self.notifier.notify_tournament_start(tournament).await {
            warn!("Dropping tournament-start notification: {}", e);
        }
        self.state.start_announced = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standings_due_before_first_send() {
        let state = MonitorState::default();
        assert!(state.standings_due(Instant::now(), Duration::from_secs(1800)));
    }

    #[test]
    fn test_standings_due_respects_interval() {
        let start = Instant::now();
        let state = MonitorState {
            last_standings_update: Some(start),
            ..Default::default()
        };
        let interval = Duration::from_secs(1800);

        assert!(!state.standings_due(start, interval));
        assert!(!state.standings_due(start + Duration::from_secs(1799), interval));
        assert!(state.standings_due(start + interval, interval));
        assert!(state.standings_due(start + Duration::from_secs(7200), interval));
    }

    #[test]
    fn test_default_state_is_empty() {
        let state = MonitorState::default();
        assert_eq!(state.status, TournamentStatus::NotStarted);
        assert!(state.seen_rounds.is_empty());
        assert!(state.seen_games.is_empty());
        assert!(!state.start_announced);
        assert!(!state.polled_once);
    }
}
