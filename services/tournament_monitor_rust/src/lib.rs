pub mod logging;
pub mod monitor;

pub use monitor::{MonitorState, PollReport, TournamentMonitor};
