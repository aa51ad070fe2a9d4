//! Tick and input processing for a Parakeet round.

use super::types::{EndCause, ParakeetGame};
use rand::Rng;
use serde::Serialize;

/// Input actions for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParakeetInput {
    /// Flap (Space, Up, Enter or a mouse click).
    Flap,
    /// Start a fresh round (r).
    Restart,
    /// Leave the game (q or Esc).
    Quit,
    /// Any other key.
    Other,
}

/// Something that happened during a tick, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickEvent {
    /// A pipe entered the field on this tick.
    ObstacleSpawned { tick: u64 },
    /// The bird cleared a pipe; `score` is the new total.
    ObstaclePassed { score: u32 },
    /// The round ended on this tick. Emitted once per round.
    RoundEnded { score: u32, cause: EndCause },
}

/// Result of processing a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickResult {
    pub events: Vec<TickEvent>,
}

impl TickResult {
    /// Final score if the round ended during this tick.
    pub fn round_ended(&self) -> Option<u32> {
        self.events.iter().find_map(|event| match event {
            TickEvent::RoundEnded { score, .. } => Some(*score),
            _ => None,
        })
    }

    pub fn spawned(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, TickEvent::ObstacleSpawned { .. }))
    }
}

/// Flap: override the bird's velocity and start the round if idle.
/// Does nothing once the round is over.
pub fn flap(game: &mut ParakeetGame) {
    if game.over {
        return;
    }
    game.bird.vel = game.config.flap_velocity;
    game.running = true;
}

/// Process player input. Returns false when the player asked to quit.
pub fn process_input(game: &mut ParakeetGame, input: ParakeetInput) -> bool {
    match input {
        ParakeetInput::Flap => flap(game),
        ParakeetInput::Restart => game.reset(),
        ParakeetInput::Quit => return false,
        ParakeetInput::Other => {}
    }
    true
}

/// Advance the round by one tick (called once per rendered frame).
/// Handles gravity, pipe spawning and scrolling, scoring, and collisions.
pub fn process_tick<R: Rng>(game: &mut ParakeetGame, rng: &mut R) -> TickResult {
    let mut result = TickResult::default();
    if !game.running {
        return result;
    }

    game.tick += 1;

    // Gravity
    game.bird.vel += game.config.gravity;
    game.bird.y += game.bird.vel;

    // A spawn period of 0 disables spawning
    if game.tick.checked_rem(game.config.spawn_period) == Some(0) {
        game.spawn_pipe(rng);
        result.events.push(TickEvent::ObstacleSpawned { tick: game.tick });
    }

    scroll_pipes(game);

    let hit_pipe = score_and_check_pipes(game, &mut result);
    let out_of_bounds = is_out_of_bounds(game);

    if hit_pipe {
        end_round(game, EndCause::Pipe, &mut result);
    } else if out_of_bounds {
        end_round(game, EndCause::Boundary, &mut result);
    }

    result
}

/// Move every pipe left and drop the ones that have fully left the field.
fn scroll_pipes(game: &mut ParakeetGame) {
    let speed = game.config.pipe_speed;
    for pipe in &mut game.pipes {
        pipe.x -= speed;
    }
    game.pipes.retain(|pipe| pipe.right() >= 0.0);
}

/// Credit passed pipes and report whether any pipe blocks the bird.
/// Every pipe is visited, even after a hit.
fn score_and_check_pipes(game: &mut ParakeetGame, result: &mut TickResult) -> bool {
    let bird = game.bird;
    let mut hit = false;

    for pipe in &mut game.pipes {
        if !pipe.scored && pipe.right() < bird.x {
            pipe.scored = true;
            game.score += 1;
            result
                .events
                .push(TickEvent::ObstaclePassed { score: game.score });
        }
        if pipe.blocks(&bird) {
            hit = true;
        }
    }

    hit
}

fn is_out_of_bounds(game: &ParakeetGame) -> bool {
    game.bird.top() < 0.0 || game.bird.bottom() > game.config.field_height
}

/// Transition to the ended state. The event fires only on the false → true
/// edge of `over`.
fn end_round(game: &mut ParakeetGame, cause: EndCause, result: &mut TickResult) {
    game.running = false;
    if game.over {
        return;
    }
    game.over = true;
    log::debug!(
        "round ended at tick {} with score {} ({:?})",
        game.tick,
        game.score,
        cause
    );
    result.events.push(TickEvent::RoundEnded {
        score: game.score,
        cause,
    });
}
