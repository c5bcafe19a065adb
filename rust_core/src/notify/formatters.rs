//! Block Kit message builders for tournament events.
//!
//! Pure functions: they take domain records and return a [`SlackMessage`], so the
//! layout can be tested without a webhook.

use crate::models::{Assignment, Game, GamePlayer, Round, Standing, Tournament};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// A chat message: plain `text` fallback plus optional rich blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlackMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Value>,
}

impl SlackMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

fn header(text: &str) -> Value {
    json!({
        "type": "header",
        "text": { "type": "plain_text", "text": text, "emoji": true }
    })
}

fn section(markdown: &str) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": markdown }
    })
}

fn context(markdown: &str) -> Value {
    json!({
        "type": "context",
        "elements": [{ "type": "mrkdwn", "text": markdown }]
    })
}

fn divider() -> Value {
    json!({ "type": "divider" })
}

/// 1234567 -> "1,234,567"
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

fn medal(position: u32) -> Option<&'static str> {
    match position {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

pub fn tournament_start_message(tournament: &Tournament) -> SlackMessage {
    SlackMessage {
        text: format!("Tournament Started - {}", tournament.name),
        blocks: vec![
            header("🏁 Tournament Started"),
            section(&format!(
                "*{}* is underway! Round assignments will be posted here as each round begins.",
                tournament.name
            )),
        ],
    }
}

/// Group assignments by machine, keeping machines in first-seen order.
fn group_by_machine(assignments: &[Assignment]) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for a in assignments {
        match groups.iter_mut().find(|(machine, _)| *machine == a.machine_name) {
            Some((_, players)) => players.push(a.player_name.as_str()),
            None => groups.push((a.machine_name.as_str(), vec![a.player_name.as_str()])),
        }
    }
    groups
}

pub fn round_start_message(round: &Round, tournament_name: &str) -> SlackMessage {
    let mut blocks = vec![
        header(&format!("🎯 New Round Starting: {}", round.name)),
        section(&format!(
            "*Tournament:* {}\n*Round:* {}\n\nPlease check your game assignments below:",
            tournament_name, round.name
        )),
        divider(),
    ];

    for (machine, players) in group_by_machine(&round.assignments) {
        let mut player_text = String::new();
        for (idx, player) in players.iter().enumerate() {
            player_text.push_str(&format!("• Player {}: *{}*\n", idx + 1, player));
        }
        blocks.push(section(&format!("*🎮 {}*\n{}", machine, player_text)));
        blocks.push(divider());
    }

    blocks.push(context(
        "Remember to enter your scores in MatchPlay when finished. Good luck!",
    ));

    SlackMessage {
        text: format!("New Round Starting: {} - {}", round.name, tournament_name),
        blocks,
    }
}

pub fn game_result_message(game: &Game, tournament_name: &str) -> SlackMessage {
    let mut players: Vec<&GamePlayer> = game.players.iter().collect();
    players.sort_by_key(|p| p.position.unwrap_or(u32::MAX));

    let mut results_text = String::new();
    for player in players {
        let marker = player.position.and_then(medal).unwrap_or("🎮");
        let score = player
            .score
            .map(|s| format!("{} points", format_thousands(s)))
            .unwrap_or_else(|| "no score".to_string());
        results_text.push_str(&format!("{} *{}*: {}\n", marker, player.name, score));
    }
    if results_text.is_empty() {
        results_text.push_str("_No players recorded_");
    }

    SlackMessage {
        text: format!("Game Results - {} - {}", game.machine, tournament_name),
        blocks: vec![
            header("🏆 Game Results"),
            section(&format!(
                "*Tournament:* {}\n*Round:* {}\n*Machine:* {}",
                tournament_name, game.round_name, game.machine
            )),
            divider(),
            section(&results_text),
        ],
    }
}

pub fn standings_message(
    standings: &[Standing],
    tournament_name: &str,
    top_n: usize,
    as_of: DateTime<Utc>,
) -> SlackMessage {
    let mut sorted: Vec<&Standing> = standings.iter().collect();
    sorted.sort_by_key(|s| s.position);
    sorted.truncate(top_n);

    let mut table_text = String::new();
    for s in &sorted {
        let marker = medal(s.position)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.", s.position));
        table_text.push_str(&format!(
            "{} *{}* - {} pts ({} games)\n",
            marker, s.name, s.points, s.games_played
        ));
    }

    SlackMessage {
        text: format!("Current Tournament Standings - {}", tournament_name),
        blocks: vec![
            header("📊 Current Tournament Standings"),
            section(&format!(
                "*Tournament:* {}\n\nHere are the current top {} players:",
                tournament_name,
                sorted.len()
            )),
            divider(),
            section(&table_text),
            context(&format!(
                "As of {}. View complete standings in the MatchPlay Events app or website.",
                as_of.format("%H:%M UTC")
            )),
        ],
    }
}
