// Frame pacing (one simulation tick per rendered frame, ~60 fps)
pub const FRAME_INTERVAL_MS: u64 = 16;

// Playing field, in field units
pub const FIELD_WIDTH: f64 = 480.0;
pub const FIELD_HEIGHT: f64 = 640.0;

// Bird
pub const BIRD_X: f64 = 120.0;
pub const BIRD_RADIUS: f64 = 18.0;

// Physics (per tick)
pub const GRAVITY: f64 = 0.6;
pub const FLAP_VELOCITY: f64 = -10.0;

// Pipes
pub const SPAWN_PERIOD: u64 = 90;
pub const PIPE_GAP: f64 = 140.0;
pub const PIPE_WIDTH: f64 = 60.0;
pub const PIPE_MARGIN: f64 = 60.0;
pub const PIPE_SPEED: f64 = 3.4;
pub const PIPE_SPAWN_OFFSET: f64 = 40.0; // new pipes start just past the right edge

// Backend
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const LEADERBOARD_SIZE: usize = 10;
pub const CHAT_HISTORY_LIMIT: usize = 500;
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

// Password hashing
pub const PASSWORD_HASH_ROUNDS: u32 = 10_000;
pub const SALT_BYTES: usize = 16;

// Files under ~/.parakeet/
pub const DATA_DIR_NAME: &str = ".parakeet";
pub const DATA_FILE_NAME: &str = "data.json";
pub const LOCAL_BEST_FILE_NAME: &str = "highscore.json";
