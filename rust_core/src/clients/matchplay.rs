use crate::config::MonitorConfig;
use crate::error::FetchError;
use crate::models::{Assignment, Game, GamePlayer, PlayStatus, Round, Standing, Tournament, TournamentStatus};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read side of a tournament-management API.
///
/// The monitor only talks to this trait, so tests can swap in an in-memory fake.
#[async_trait]
pub trait TournamentApi: Send + Sync {
    async fn get_tournament(&self, tournament_id: u64) -> Result<Tournament, FetchError>;

    async fn get_tournament_status(
        &self,
        tournament_id: u64,
    ) -> Result<TournamentStatus, FetchError> {
        Ok(self.get_tournament(tournament_id).await?.status)
    }

    /// Rounds with their player assignments filled in
    async fn get_rounds(&self, tournament_id: u64) -> Result<Vec<Round>, FetchError>;

    async fn get_games(&self, tournament_id: u64) -> Result<Vec<Game>, FetchError>;

    async fn get_standings(&self, tournament_id: u64) -> Result<Vec<Standing>, FetchError>;

    /// Rounds and games taken from one snapshot of the tournament's games, so
    /// round assignments and game results agree within a poll.
    async fn get_rounds_and_games(
        &self,
        tournament_id: u64,
    ) -> Result<(Vec<Round>, Vec<Game>), FetchError> {
        let rounds = self.get_rounds(tournament_id).await?;
        let games = self.get_games(tournament_id).await?;
        Ok((rounds, games))
    }
}

/// Player and arena names for one tournament, used to resolve ids in games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub players: HashMap<u64, String>,
    pub arenas: HashMap<u64, String>,
}

impl Roster {
    fn player_name(&self, player_id: u64) -> String {
        self.players
            .get(&player_id)
            .cloned()
            .unwrap_or_else(|| format!("Player {}", player_id))
    }

    fn arena_name(&self, arena_id: Option<u64>) -> String {
        arena_id
            .and_then(|id| self.arenas.get(&id).cloned())
            .unwrap_or_else(|| "Unknown Machine".to_string())
    }
}

/// Round fields as listed by the rounds endpoint, before assignments are joined in.
#[derive(Debug, Clone, PartialEq)]
struct RoundSummary {
    id: u64,
    name: String,
    status: PlayStatus,
}

#[derive(Clone)]
pub struct MatchPlayClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    roster: Arc<RwLock<Option<(u64, Arc<Roster>)>>>,
}

impl std::fmt::Debug for MatchPlayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchPlayClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.api_token.is_some())
            .finish()
    }
}

impl MatchPlayClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
            api_token,
            roster: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &MonitorConfig, api_token: Option<String>) -> Self {
        Self::new(config.api.base_url.clone(), api_token, config.request_timeout())
    }

    async fn get_json(&self, path: &str) -> Result<(String, Value), FetchError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = resp.json().await?;
        Ok((url, unwrap_data(value)))
    }

    /// Cached roster for the tournament, fetching the tournament if needed.
    async fn roster_for(&self, tournament_id: u64) -> Result<Arc<Roster>, FetchError> {
        let cached = self
            .roster
            .read()
            .as_ref()
            .filter(|(id, _)| *id == tournament_id)
            .map(|(_, roster)| roster.clone());
        if let Some(roster) = cached {
            return Ok(roster);
        }

        self.get_tournament(tournament_id).await?;
        let roster = self
            .roster
            .read()
            .as_ref()
            .map(|(_, roster)| roster.clone())
            .unwrap_or_default();
        Ok(roster)
    }

    async fn fetch_round_summaries(&self, tournament_id: u64) -> Result<Vec<RoundSummary>, FetchError> {
        let (url, data) = self
            .get_json(&format!("tournaments/{}/rounds", tournament_id))
            .await?;
        parse_rounds(&data, &url)
    }

    async fn fetch_games(
        &self,
        tournament_id: u64,
        rounds: &[RoundSummary],
    ) -> Result<Vec<Game>, FetchError> {
        let roster = self.roster_for(tournament_id).await?;
        let (url, data) = self
            .get_json(&format!("tournaments/{}/games", tournament_id))
            .await?;
        let round_names: HashMap<u64, String> =
            rounds.iter().map(|r| (r.id, r.name.clone())).collect();
        parse_games(&data, &url, &roster, &round_names)
    }
}

#[async_trait]
impl TournamentApi for MatchPlayClient {
    async fn get_tournament(&self, tournament_id: u64) -> Result<Tournament, FetchError> {
        let (url, data) = self
            .get_json(&format!(
                "tournaments/{}?includePlayers=1&includeArenas=1",
                tournament_id
            ))
            .await?;
        let (tournament, roster) = parse_tournament(&data, &url, tournament_id)?;
        *self.roster.write() = Some((tournament_id, Arc::new(roster)));
        Ok(tournament)
    }

    async fn get_rounds(&self, tournament_id: u64) -> Result<Vec<Round>, FetchError> {
        let summaries = self.fetch_round_summaries(tournament_id).await?;
        let games = self.fetch_games(tournament_id, &summaries).await?;
        Ok(build_rounds(summaries, &games))
    }

    async fn get_games(&self, tournament_id: u64) -> Result<Vec<Game>, FetchError> {
        let summaries = self.fetch_round_summaries(tournament_id).await?;
        self.fetch_games(tournament_id, &summaries).await
    }

    async fn get_standings(&self, tournament_id: u64) -> Result<Vec<Standing>, FetchError> {
        let roster = self.roster_for(tournament_id).await?;
        let (url, data) = self
            .get_json(&format!("tournaments/{}/standings", tournament_id))
            .await?;
        parse_standings(&data, &url, &roster)
    }

    async fn get_rounds_and_games(
        &self,
        tournament_id: u64,
    ) -> Result<(Vec<Round>, Vec<Game>), FetchError> {
        let summaries = self.fetch_round_summaries(tournament_id).await?;
        let games = self.fetch_games(tournament_id, &summaries).await?;
        let rounds = build_rounds(summaries, &games);
        Ok((rounds, games))
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// MatchPlay wraps most payloads in `{"data": ...}`; accept bare payloads too.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn get_u64(v: &Value, key: &str) -> Option<u64> {
    let field = v.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse().ok()))
}

fn get_f64(v: &Value, key: &str) -> Option<f64> {
    let field = v.get(key)?;
    field
        .as_f64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse().ok()))
}

fn get_str(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|x| x.as_str()).map(|s| s.to_string())
}

fn value_as_u64(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn value_as_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f.round() as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn id_list(v: &Value, key: &str) -> Vec<u64> {
    v.get(key)
        .and_then(|x| x.as_array())
        .map(|arr| arr.iter().filter_map(value_as_u64).collect())
        .unwrap_or_default()
}

fn expect_array<'a>(data: &'a Value, url: &str) -> Result<&'a Vec<Value>, FetchError> {
    data.as_array().ok_or_else(|| FetchError::Decode {
        url: url.to_string(),
        reason: "expected a JSON array".to_string(),
    })
}

fn parse_tournament(
    data: &Value,
    url: &str,
    requested_id: u64,
) -> Result<(Tournament, Roster), FetchError> {
    if !data.is_object() {
        return Err(FetchError::Decode {
            url: url.to_string(),
            reason: "expected a tournament object".to_string(),
        });
    }

    let tournament = Tournament {
        id: get_u64(data, "tournamentId").unwrap_or(requested_id),
        name: get_str(data, "name").unwrap_or_else(|| format!("Tournament {}", requested_id)),
        status: TournamentStatus::from_api(&get_str(data, "status").unwrap_or_default()),
    };

    let mut roster = Roster::default();
    if let Some(players) = data["players"].as_array() {
        for player in players {
            if let (Some(id), Some(name)) = (get_u64(player, "playerId"), get_str(player, "name")) {
                roster.players.insert(id, name);
            }
        }
    }
    if let Some(arenas) = data["arenas"].as_array() {
        for arena in arenas {
            if let (Some(id), Some(name)) = (get_u64(arena, "arenaId"), get_str(arena, "name")) {
                roster.arenas.insert(id, name);
            }
        }
    }

    Ok((tournament, roster))
}

fn parse_rounds(data: &Value, url: &str) -> Result<Vec<RoundSummary>, FetchError> {
    let mut rounds = Vec::new();
    for (idx, round) in expect_array(data, url)?.iter().enumerate() {
        let Some(id) = get_u64(round, "roundId").or_else(|| get_u64(round, "id")) else {
            debug!("Skipping round without id at index {}", idx);
            continue;
        };
        let name = get_str(round, "name").unwrap_or_else(|| {
            let index = get_u64(round, "index").unwrap_or(idx as u64);
            format!("Round {}", index + 1)
        });
        rounds.push(RoundSummary {
            id,
            name,
            status: PlayStatus::from_api(&get_str(round, "status").unwrap_or_default()),
        });
    }
    Ok(rounds)
}

fn parse_games(
    data: &Value,
    url: &str,
    roster: &Roster,
    round_names: &HashMap<u64, String>,
) -> Result<Vec<Game>, FetchError> {
    let mut games = Vec::new();
    for game in expect_array(data, url)? {
        let Some(id) = get_u64(game, "gameId").or_else(|| get_u64(game, "id")) else {
            continue;
        };
        let round_id = get_u64(game, "roundId");
        let round_name = round_id
            .and_then(|rid| round_names.get(&rid).cloned())
            .unwrap_or_else(|| "Unknown Round".to_string());

        let player_ids = id_list(game, "playerIds");
        // Player ids ordered by finishing place
        let result_positions = id_list(game, "resultPositions");
        let scores: Vec<Option<i64>> = game
            .get("resultScores")
            .and_then(|x| x.as_array())
            .map(|arr| arr.iter().map(value_as_i64).collect())
            .unwrap_or_default();

        let players = player_ids
            .iter()
            .enumerate()
            .map(|(idx, player_id)| GamePlayer {
                name: roster.player_name(*player_id),
                score: scores.get(idx).copied().flatten(),
                position: result_positions
                    .iter()
                    .position(|p| p == player_id)
                    .map(|p| p as u32 + 1),
            })
            .collect();

        games.push(Game {
            id,
            round_id,
            round_name,
            status: PlayStatus::from_api(&get_str(game, "status").unwrap_or_default()),
            machine: roster.arena_name(get_u64(game, "arenaId")),
            players,
        });
    }
    Ok(games)
}

fn build_rounds(summaries: Vec<RoundSummary>, games: &[Game]) -> Vec<Round> {
    summaries
        .into_iter()
        .map(|summary| {
            let assignments = games
                .iter()
                .filter(|g| g.round_id == Some(summary.id))
                .flat_map(|g| {
                    g.players.iter().map(move |p| Assignment {
                        game_id: g.id,
                        machine_name: g.machine.clone(),
                        player_name: p.name.clone(),
                    })
                })
                .collect();
            Round {
                id: summary.id,
                name: summary.name,
                status: summary.status,
                assignments,
            }
        })
        .collect()
}

fn parse_standings(data: &Value, url: &str, roster: &Roster) -> Result<Vec<Standing>, FetchError> {
    let entries = expect_array(data, url)?;
    let mut standings = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let name = get_str(entry, "name")
            .or_else(|| get_u64(entry, "playerId").map(|id| roster.player_name(id)))
            .unwrap_or_else(|| "Unknown Player".to_string());
        standings.push(Standing {
            position: get_u64(entry, "position")
                .and_then(|p| u32::try_from(p).ok())
                .unwrap_or(idx as u32 + 1),
            name,
            points: get_f64(entry, "points").unwrap_or(0.0),
            games_played: get_u64(entry, "gamesPlayed")
                .and_then(|g| u32::try_from(g).ok())
                .unwrap_or(0),
        });
    }
    Ok(standings)
}
