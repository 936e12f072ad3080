//! The reef simulation, kept free of browser types so every rule in here
//! runs under plain `cargo test`.

pub mod bubble;
pub mod pipe;
pub mod shark;
pub mod state;

use bubble::Bubble;
use pipe::PipePair;
use rand::Rng;
use shark::Shark;

pub const VIEWPORT_WIDTH: f32 = 800.0;
pub const VIEWPORT_HEIGHT: f32 = 600.0;

const INITIAL_SCROLL_SPEED: f32 = 2.0;
const SPEED_INCREMENT: f32 = 0.001;
const SPAWN_INTERVAL: f64 = 2000.0;
const FRAME_INTERVAL: f64 = 200.0;
const HOLD_DELAY: f64 = 1000.0;
const BUBBLE_COUNT: usize = 20;

pub enum TickOutcome {
    Running,
    Crashed,
}

/// Everything that moves: the shark, the live pipe pairs, the bubble field,
/// and the timers that pace spawning and animation. All timers are wall
/// clock stamps in milliseconds, compared against the `now` handed to
/// [`World::tick`].
pub struct World {
    shark: Shark,
    pipes: Vec<PipePair>,
    bubbles: Vec<Bubble>,
    score: u32,
    scroll_speed: f32,
    background_offset: f32,
    last_spawn: f64,
    last_frame_cycle: f64,
    started_at: f64,
}

impl World {
    pub fn new<R: Rng>(rng: &mut R, now: f64) -> Self {
        World {
            shark: Shark::new(),
            pipes: Vec::new(),
            bubbles: (0..BUBBLE_COUNT).map(|_| Bubble::new(rng)).collect(),
            score: 0,
            scroll_speed: INITIAL_SCROLL_SPEED,
            background_offset: 0.0,
            last_spawn: now,
            last_frame_cycle: now,
            started_at: now,
        }
    }

    /// Rewind to a fresh run. The bubble field and the background scroll are
    /// deliberately left where they are so the water does not visibly jump
    /// between runs.
    pub fn reset(&mut self, now: f64) {
        self.shark = Shark::new();
        self.pipes.clear();
        self.score = 0;
        self.scroll_speed = INITIAL_SCROLL_SPEED;
        self.last_spawn = now;
        self.last_frame_cycle = now;
        self.started_at = now;
    }

    /// One fixed step of the whole world. A crash still finishes the full
    /// step, so a pass earned in the fatal step counts; only the speed
    /// escalation is skipped.
    pub fn tick<R: Rng>(&mut self, rng: &mut R, now: f64) -> TickOutcome {
        self.background_offset =
            (self.background_offset + self.scroll_speed) % VIEWPORT_WIDTH;

        if !self.holding(now) {
            self.shark.update();
        }

        if now - self.last_spawn > SPAWN_INTERVAL {
            self.pipes.push(PipePair::spawn(rng));
            self.last_spawn = now;
        }

        let cycle_frame = now - self.last_frame_cycle > FRAME_INTERVAL;
        if cycle_frame {
            self.last_frame_cycle = now;
        }

        let shark_box = self.shark.bounding_box();
        let mut crashed = false;
        for pair in &mut self.pipes {
            pair.update(self.scroll_speed);
            if cycle_frame {
                pair.advance_frame();
            }
            if pair.collides_with(&shark_box) {
                crashed = true;
            }
            if pair.try_score(&shark_box) {
                self.score += 1;
            }
        }

        self.pipes.retain(|pair| !pair.off_screen());

        for bubble in &mut self.bubbles {
            bubble.update();
        }

        if crashed {
            TickOutcome::Crashed
        } else {
            self.scroll_speed += SPEED_INCREMENT;
            TickOutcome::Running
        }
    }

    /// Flaps are swallowed while the start-of-run hold is active.
    pub fn flap(&mut self, now: f64) {
        if !self.holding(now) {
            self.shark.flap();
        }
    }

    fn holding(&self, now: f64) -> bool {
        now - self.started_at < HOLD_DELAY
    }

    pub fn shark(&self) -> &Shark {
        &self.shark
    }

    pub fn pipes(&self) -> &[PipePair] {
        &self.pipes
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn background_offset(&self) -> f32 {
        self.background_offset
    }
}
