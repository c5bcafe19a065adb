pub mod matchplay;

// Re-export commonly used types
pub use matchplay::{MatchPlayClient, Roster, TournamentApi};
