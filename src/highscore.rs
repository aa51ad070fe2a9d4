//! Score reporting for the game client.
//!
//! The local best score is kept in ~/.parakeet/highscore.json. Finished
//! rounds are also sent to the backend on a background thread; the game
//! never waits on the network and keeps playing when the server is down.

use crate::constants::LOCAL_BEST_FILE_NAME;
use crate::server::store::ScoreEntry;
use crate::utils::persistence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalBestFile {
    best: u32,
}

/// Best score ever reached on this machine.
#[derive(Debug)]
pub struct LocalBest {
    path: PathBuf,
    best: u32,
}

impl LocalBest {
    /// ~/.parakeet/highscore.json
    pub fn open_default() -> io::Result<Self> {
        Ok(Self::open(persistence::save_path(LOCAL_BEST_FILE_NAME)?))
    }

    pub fn open(path: PathBuf) -> Self {
        let file: LocalBestFile = persistence::load_json_or_default(&path);
        Self {
            path,
            best: file.best,
        }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Store `score` if it beats the current best. Returns whether it did.
    pub fn record(&mut self, score: u32) -> io::Result<bool> {
        if score <= self.best {
            return Ok(false);
        }
        self.best = score;
        persistence::save_json(&self.path, &LocalBestFile { best: score })?;
        Ok(true)
    }
}

/// Failure talking to the backend.
#[derive(Debug)]
pub enum ClientError {
    /// Connection refused, DNS failure, timeout.
    Transport(String),
    /// The server answered with a non-2xx status.
    Status(u16, String),
    /// The response body was not the expected JSON.
    Decode(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "server unreachable: {}", msg),
            ClientError::Status(code, body) => write!(f, "server returned {}: {}", code, body),
            ClientError::Decode(e) => write!(f, "unexpected response: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ureq::Error> for ClientError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, response) => {
                ClientError::Status(code, response.into_string().unwrap_or_default())
            }
            ureq::Error::Transport(transport) => ClientError::Transport(transport.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct HighscoreBody {
    highscore: u64,
}

/// Blocking HTTP client for the score endpoints.
#[derive(Clone)]
pub struct ScoreClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ScoreClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(3))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn fetch_highscore(&self) -> Result<u64, ClientError> {
        let body: HighscoreBody = self
            .agent
            .get(&self.url("/api/highscore"))
            .call()?
            .into_json()
            .map_err(ClientError::Decode)?;
        Ok(body.highscore)
    }

    /// Submit a finished round. Returns the server's global highscore.
    pub fn submit_score(&self, score: u64) -> Result<u64, ClientError> {
        let body: HighscoreBody = self
            .agent
            .post(&self.url("/api/highscore"))
            .send_json(serde_json::json!({ "score": score }))?
            .into_json()
            .map_err(ClientError::Decode)?;
        Ok(body.highscore)
    }

    pub fn fetch_leaderboard(&self) -> Result<Vec<ScoreEntry>, ClientError> {
        self.agent
            .get(&self.url("/api/leaderboard"))
            .call()?
            .into_json()
            .map_err(ClientError::Decode)
    }
}

/// News from the background network thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerUpdate {
    Highscore(u64),
    Leaderboard(Vec<ScoreEntry>),
    Unreachable(String),
}

/// Round-end hook: records the local best and reports to the backend.
pub struct ScoreReporter {
    local: LocalBest,
    client: Option<ScoreClient>,
    tx: Sender<ServerUpdate>,
    rx: Receiver<ServerUpdate>,
}

impl ScoreReporter {
    /// `client` is `None` when playing offline.
    pub fn new(local: LocalBest, client: Option<ScoreClient>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            local,
            client,
            tx,
            rx,
        }
    }

    pub fn local_best(&self) -> u32 {
        self.local.best()
    }

    /// Fetch the global highscore and leaderboard in the background.
    pub fn refresh(&self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let tx = self.tx.clone();
        thread::spawn(move || send_snapshot(&client, &tx));
    }

    /// Handle a finished round. Returns true if it set a new local best.
    ///
    /// Only a new local best is sent to the server. Call once per round,
    /// with the score carried by the round-end event.
    pub fn round_ended(&mut self, score: u32) -> bool {
        let improved = score > self.local.best();
        if let Err(e) = self.local.record(score) {
            log::warn!("could not save local best: {}", e);
        }

        if !improved {
            return false;
        }
        if let Some(client) = self.client.clone() {
            let tx = self.tx.clone();
            thread::spawn(move || match client.submit_score(u64::from(score)) {
                Ok(_) => send_snapshot(&client, &tx),
                Err(e) => {
                    log::warn!("score submission failed: {}", e);
                    let _ = tx.send(ServerUpdate::Unreachable(e.to_string()));
                }
            });
        }
        improved
    }

    /// Updates that arrived since the last call. Never blocks.
    pub fn poll_updates(&self) -> Vec<ServerUpdate> {
        self.rx.try_iter().collect()
    }
}

fn send_snapshot(client: &ScoreClient, tx: &Sender<ServerUpdate>) {
    let update = match client.fetch_highscore() {
        Ok(high) => ServerUpdate::Highscore(high),
        Err(e) => {
            log::debug!("highscore fetch failed: {}", e);
            let _ = tx.send(ServerUpdate::Unreachable(e.to_string()));
            return;
        }
    };
    // Receiver may be gone if the game already quit
    let _ = tx.send(update);
    match client.fetch_leaderboard() {
        Ok(entries) => {
            let _ = tx.send(ServerUpdate::Leaderboard(entries));
        }
        Err(e) => log::debug!("leaderboard fetch failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("parakeet-highscore-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_local_best_only_increases() {
        let path = scratch_path("best.json");
        std::fs::remove_file(&path).ok();

        let mut local = LocalBest::open(path.clone());
        assert_eq!(local.best(), 0);
        assert!(local.record(5).unwrap());
        assert!(!local.record(3).unwrap());
        assert!(!local.record(5).unwrap());
        assert!(local.record(9).unwrap());

        let reopened = LocalBest::open(path.clone());
        assert_eq!(reopened.best(), 9);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_offline_reporter_records_locally() {
        let path = scratch_path("offline.json");
        std::fs::remove_file(&path).ok();

        let mut reporter = ScoreReporter::new(LocalBest::open(path.clone()), None);
        assert!(reporter.round_ended(4));
        assert!(!reporter.round_ended(2));
        assert_eq!(reporter.local_best(), 4);
        reporter.refresh();
        assert!(reporter.poll_updates().is_empty());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ScoreClient::new("http://localhost:3000/");
        assert_eq!(client.url("/api/highscore"), "http://localhost:3000/api/highscore");
    }
}
