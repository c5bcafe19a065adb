//! Tournament URL helpers.

use regex::Regex;
use std::sync::OnceLock;

static TOURNAMENT_PATH: OnceLock<Option<Regex>> = OnceLock::new();

fn tournament_path() -> Option<&'static Regex> {
    TOURNAMENT_PATH
        .get_or_init(|| Regex::new(r"/tournaments/(\d+)").ok())
        .as_ref()
}

/// Pull the numeric tournament id out of a MatchPlay URL such as
/// `https://matchplay.events/tournaments/12345/view`.
///
/// Returns `None` when there is no `/tournaments/<digits>` segment or the digits
/// do not fit in a `u64`. Never panics.
pub fn extract_tournament_id(tournament_url: &str) -> Option<u64> {
    let caps = tournament_path()?.captures(tournament_url)?;
    caps.get(1)?.as_str().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_id_from_view_url() {
        assert_eq!(
            extract_tournament_id("https://matchplay.events/tournaments/12345/view"),
            Some(12345)
        );
    }

    #[test]
    fn test_extracts_id_without_trailing_segment() {
        assert_eq!(
            extract_tournament_id("https://app.matchplay.events/tournaments/98"),
            Some(98)
        );
        assert_eq!(
            extract_tournament_id("https://app.matchplay.events/tournaments/77?tab=standings"),
            Some(77)
        );
    }

    #[test]
    fn test_missing_id_is_none() {
        assert_eq!(extract_tournament_id("https://matchplay.events/no-id-here"), None);
        assert_eq!(extract_tournament_id("https://matchplay.events/tournaments/abc"), None);
        assert_eq!(extract_tournament_id(""), None);
        assert_eq!(extract_tournament_id("not a url at all"), None);
    }

    #[test]
    fn test_overflowing_id_is_none() {
        assert_eq!(
            extract_tournament_id("https://matchplay.events/tournaments/99999999999999999999999/view"),
            None
        );
    }
}
