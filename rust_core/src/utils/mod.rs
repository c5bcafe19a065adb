pub mod url;

pub use url::extract_tournament_id;
