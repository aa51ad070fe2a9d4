//! Terminal presentation: draws snapshots, never mutates the round.

pub mod game_common;
pub mod game_scene;

use crate::highscore::ServerUpdate;
use crate::server::store::ScoreEntry;

pub use game_scene::render_game;

/// How many leaderboard rows fit in the side panel.
const HUD_LEADERBOARD_ROWS: usize = 5;

/// Scores shown next to the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hud {
    pub local_best: u32,
    /// Last known global highscore; `None` until the server answers.
    pub global_best: Option<u64>,
    pub leaderboard: Vec<ScoreEntry>,
    /// Set when the backend is unreachable or when playing offline.
    pub server_status: Option<String>,
}

impl Hud {
    pub fn new(local_best: u32, offline: bool) -> Self {
        Self {
            local_best,
            server_status: offline.then(|| "offline".to_string()),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, update: ServerUpdate) {
        match update {
            ServerUpdate::Highscore(high) => {
                self.global_best = Some(high);
                self.server_status = None;
            }
            ServerUpdate::Leaderboard(mut entries) => {
                entries.truncate(HUD_LEADERBOARD_ROWS);
                self.leaderboard = entries;
            }
            ServerUpdate::Unreachable(_) => {
                self.server_status = Some("server unreachable".to_string());
            }
        }
    }
}
