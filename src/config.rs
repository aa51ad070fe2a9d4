//! Runtime configuration from command-line arguments and environment.

use crate::constants::{DATA_FILE_NAME, DEFAULT_PORT, DEFAULT_SERVER_URL};
use crate::utils::persistence;
use std::path::PathBuf;

/// Settings for the terminal game client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the score backend (`PARAKEET_SERVER`).
    pub server_url: String,
    /// Skip all network calls and keep scores local (`--offline`).
    pub offline: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            offline: false,
        }
    }
}

/// Settings for the backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON data file (`PARAKEET_DATA`); defaults to ~/.parakeet/data.json.
    pub data_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: None,
        }
    }
}

impl ServerConfig {
    /// Resolve the data file, creating ~/.parakeet/ when using the default.
    pub fn resolve_data_path(&self) -> std::io::Result<PathBuf> {
        match &self.data_path {
            Some(path) => Ok(path.clone()),
            None => persistence::save_path(DATA_FILE_NAME),
        }
    }
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(ClientConfig),
    Serve(ServerConfig),
    Version,
    Help,
}

pub const USAGE: &str = "Parakeet - flap through the pipes

Usage: parakeet [command]

Commands:
  (none)             Play in the terminal
  --offline          Play without contacting the score server
  serve[=PORT]       Run the score/leaderboard/feed backend
  --version          Show version information
  --help             Show this help message

Environment:
  PORT               Backend port (default 3000)
  PARAKEET_DATA      Backend data file (default ~/.parakeet/data.json)
  PARAKEET_SERVER    Backend URL used by the game (default http://127.0.0.1:3000)
  RUST_LOG           Log filter (e.g. info, parakeet=debug)";

/// Parse CLI arguments (without the program name). `env` looks up
/// environment variables so callers and tests can control them.
pub fn parse_args<F>(args: &[String], env: F) -> Result<Command, String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(first) = args.first() else {
        return Ok(Command::Play(client_config(&env, false)));
    };

    if args.len() > 1 {
        return Err(format!("Unexpected argument: {}", args[1]));
    }

    match first.as_str() {
        "--version" | "-v" => Ok(Command::Version),
        "--help" | "-h" => Ok(Command::Help),
        "--offline" => Ok(Command::Play(client_config(&env, true))),
        "serve" | "--serve" => {
            let port = match env("PORT") {
                Some(raw) => parse_port(&raw)?,
                None => DEFAULT_PORT,
            };
            Ok(Command::Serve(server_config(&env, port)))
        }
        other => {
            let port = other
                .strip_prefix("serve=")
                .or_else(|| other.strip_prefix("--serve="));
            match port {
                Some(raw) => Ok(Command::Serve(server_config(&env, parse_port(raw)?))),
                None => Err(format!("Unknown command: {}", other)),
            }
        }
    }
}

fn client_config<F>(env: &F, offline: bool) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    ClientConfig {
        server_url: env("PARAKEET_SERVER")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        offline,
    }
}

fn server_config<F>(env: &F, port: u16) -> ServerConfig
where
    F: Fn(&str) -> Option<String>,
{
    ServerConfig {
        port,
        data_path: env("PARAKEET_DATA").map(PathBuf::from),
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| format!("Invalid port: {}", raw))
}
