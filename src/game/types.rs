//! Parakeet round data structures.

use crate::constants::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunable physics and geometry for a round.
///
/// `Default` is the shipped game; tests build variants (zero gravity, wider
/// gaps) to pin down individual rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub field_width: f64,
    pub field_height: f64,
    pub bird_x: f64,
    pub bird_radius: f64,
    /// Velocity change per tick (positive = downward).
    pub gravity: f64,
    /// Velocity override applied by a flap (negative = upward).
    pub flap_velocity: f64,
    /// A pipe spawns on every tick that is a multiple of this. 0 disables spawning.
    pub spawn_period: u64,
    pub pipe_gap: f64,
    pub pipe_width: f64,
    /// Minimum distance between a gap and the top/bottom of the field.
    pub pipe_margin: f64,
    /// Horizontal scroll per tick.
    pub pipe_speed: f64,
    /// How far past the right edge new pipes appear.
    pub pipe_spawn_offset: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            bird_x: BIRD_X,
            bird_radius: BIRD_RADIUS,
            gravity: GRAVITY,
            flap_velocity: FLAP_VELOCITY,
            spawn_period: SPAWN_PERIOD,
            pipe_gap: PIPE_GAP,
            pipe_width: PIPE_WIDTH,
            pipe_margin: PIPE_MARGIN,
            pipe_speed: PIPE_SPEED,
            pipe_spawn_offset: PIPE_SPAWN_OFFSET,
        }
    }
}

impl PhysicsConfig {
    /// Inclusive range of whole-unit gap tops that keep the gap on-field
    /// with the configured margin. Collapses to the margin when the gap is
    /// too tall to move.
    pub fn gap_top_range(&self) -> (i64, i64) {
        let min_top = self.pipe_margin.floor() as i64;
        let max_top = (self.field_height - self.pipe_margin - self.pipe_gap).floor() as i64;
        (min_top, max_top.max(min_top))
    }
}

/// The player-controlled bird. Only `y` and `vel` change during a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    /// Vertical velocity in units/tick (positive = downward).
    pub vel: f64,
    pub radius: f64,
}

impl Bird {
    pub fn top(&self) -> f64 {
        self.y - self.radius
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.radius
    }
}

/// A pipe pair with a vertical gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    /// Left edge.
    pub x: f64,
    /// Top of the gap.
    pub gap_top: f64,
    /// Height of the gap.
    pub gap: f64,
    pub width: f64,
    /// Whether the bird has already been credited for this pipe.
    pub scored: bool,
}

impl Pipe {
    /// Trailing (right) edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn gap_bottom(&self) -> f64 {
        self.gap_top + self.gap
    }

    /// True when the bird's horizontal extent overlaps this pipe.
    pub fn overlaps_horizontally(&self, bird: &Bird) -> bool {
        bird.x + bird.radius > self.x && bird.x - bird.radius < self.right()
    }

    /// True when the bird, horizontally overlapping, pokes out of the gap.
    pub fn blocks(&self, bird: &Bird) -> bool {
        self.overlaps_horizontally(bird)
            && (bird.top() < self.gap_top || bird.bottom() > self.gap_bottom())
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// The bird hit a pipe outside its gap.
    Pipe,
    /// The bird left the top or bottom of the field.
    Boundary,
}

/// Authoritative state of one round.
#[derive(Debug, Clone)]
pub struct ParakeetGame {
    pub config: PhysicsConfig,
    pub bird: Bird,
    /// Active pipes in spawn order, which is also left-to-right order.
    pub pipes: Vec<Pipe>,
    pub score: u32,
    /// Ticks elapsed since the round started.
    pub tick: u64,
    /// True between the first flap and the end of the round.
    pub running: bool,
    /// True once the round has ended; cleared only by `reset`.
    pub over: bool,
}

impl Default for ParakeetGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ParakeetGame {
    /// Create a round with the default physics, waiting for the first flap.
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            config,
            bird: Self::starting_bird(&config),
            pipes: Vec::new(),
            score: 0,
            tick: 0,
            running: false,
            over: false,
        }
    }

    fn starting_bird(config: &PhysicsConfig) -> Bird {
        Bird {
            x: config.bird_x,
            y: config.field_height / 2.0,
            vel: 0.0,
            radius: config.bird_radius,
        }
    }

    /// Discard the current round and return to the pre-start state.
    pub fn reset(&mut self) {
        self.bird = Self::starting_bird(&self.config);
        self.pipes.clear();
        self.score = 0;
        self.tick = 0;
        self.running = false;
        self.over = false;
    }

    /// True before the first flap of a round.
    pub fn waiting_to_start(&self) -> bool {
        !self.running && !self.over
    }

    /// Spawn a pipe past the right edge with a random gap position.
    pub fn spawn_pipe<R: Rng>(&mut self, rng: &mut R) {
        let (min_top, max_top) = self.config.gap_top_range();
        let gap_top = if max_top > min_top {
            rng.gen_range(min_top..=max_top)
        } else {
            min_top
        };

        self.pipes.push(Pipe {
            x: self.config.field_width + self.config.pipe_spawn_offset,
            gap_top: gap_top as f64,
            gap: self.config.pipe_gap,
            width: self.config.pipe_width,
            scored: false,
        });
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            bird: self.bird,
            pipes: self.pipes.clone(),
            score: self.score,
            tick: self.tick,
            running: self.running,
            over: self.over,
        }
    }
}

/// Everything a renderer needs after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub score: u32,
    pub tick: u64,
    pub running: bool,
    pub over: bool,
}
