//! Session states are unrepresentable outside the transitions below :
//! - PUBLIC  : SessionMachine and the read-only accessors
//! - PRIVATE : the transitions, so a run can only start, crash, or restart
//!   through [`SessionMachine::transition`]

use super::{TickOutcome, World};
use rand::Rng;

/// ┌──────────── Session Transition Flow ────────────┐
/// │  From State  →  Event     →  To State           │
/// ├─────────────────────────────────────────────────┤
/// │  Ready       →  Activate  →  Playing            │
/// │  Playing     →  Activate  →  Playing (flap)     │
/// │  Playing     →  Tick      →  Playing | GameOver │
/// │  GameOver    →  Activate  →  Playing            │
/// │  Ready       →  Tick      →  Ready (inert)      │
/// │  GameOver    →  Tick      →  GameOver (inert)   │
/// └─────────────────────────────────────────────────┘
pub enum Event {
    Activate,
    Tick,
}

pub struct Ready;
pub struct Playing;
pub struct GameOver;

/// The world rides along through every transition, so the final frame of a
/// crashed run stays available behind the game-over overlay.
pub struct SessionState<S> {
    world: World,
    _state: S,
}

impl<S> SessionState<S> {
    pub fn world(&self) -> &World {
        &self.world
    }
}

impl SessionState<Ready> {
    fn new<R: Rng>(rng: &mut R, now: f64) -> Self {
        SessionState {
            world: World::new(rng, now),
            _state: Ready,
        }
    }

    fn start(mut self, now: f64) -> SessionState<Playing> {
        self.world.reset(now);
        SessionState {
            world: self.world,
            _state: Playing,
        }
    }
}

impl SessionState<Playing> {
    fn flap(&mut self, now: f64) {
        self.world.flap(now);
    }

    fn run<R: Rng>(mut self, rng: &mut R, now: f64) -> RunOutcome {
        match self.world.tick(rng, now) {
            TickOutcome::Running => RunOutcome::Continue(self),
            TickOutcome::Crashed => RunOutcome::Crashed(SessionState {
                world: self.world,
                _state: GameOver,
            }),
        }
    }
}

impl SessionState<GameOver> {
    fn new_game(mut self, now: f64) -> SessionState<Playing> {
        self.world.reset(now);
        SessionState {
            world: self.world,
            _state: Playing,
        }
    }
}

pub enum RunOutcome {
    Continue(SessionState<Playing>),
    Crashed(SessionState<GameOver>),
}

pub enum SessionMachine {
    Ready(SessionState<Ready>),
    Playing(SessionState<Playing>),
    GameOver(SessionState<GameOver>),
}

impl From<SessionState<Ready>> for SessionMachine {
    fn from(state: SessionState<Ready>) -> Self {
        SessionMachine::Ready(state)
    }
}

impl From<SessionState<Playing>> for SessionMachine {
    fn from(state: SessionState<Playing>) -> Self {
        SessionMachine::Playing(state)
    }
}

impl From<SessionState<GameOver>> for SessionMachine {
    fn from(state: SessionState<GameOver>) -> Self {
        SessionMachine::GameOver(state)
    }
}

impl From<RunOutcome> for SessionMachine {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Continue(playing_state) => playing_state.into(),
            RunOutcome::Crashed(game_over_state) => game_over_state.into(),
        }
    }
}

impl SessionMachine {
    pub fn new<R: Rng>(rng: &mut R, now: f64) -> Self {
        SessionMachine::Ready(SessionState::new(rng, now))
    }

    pub fn transition<R: Rng>(self, event: Event, rng: &mut R, now: f64) -> Self {
        use SessionMachine::*;
        match (self, event) {
            (Ready(state), Event::Activate) => state.start(now).into(),
            (Playing(mut state), Event::Activate) => {
                state.flap(now);
                state.into()
            }
            (GameOver(state), Event::Activate) => state.new_game(now).into(),
            (Playing(state), Event::Tick) => state.run(rng, now).into(),
            // idle screens do not simulate
            (machine, Event::Tick) => machine,
        }
    }

    pub fn world(&self) -> &World {
        match self {
            SessionMachine::Ready(state) => state.world(),
            SessionMachine::Playing(state) => state.world(),
            SessionMachine::GameOver(state) => state.world(),
        }
    }

    pub fn score(&self) -> u32 {
        self.world().score()
    }

    pub fn is_over(&self) -> bool {
        matches!(self, SessionMachine::GameOver(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{INITIAL_SCROLL_SPEED, VIEWPORT_HEIGHT};
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_ready_screen_does_not_simulate() {
        let mut rng = test_rng();
        let machine = SessionMachine::new(&mut rng, 0.0);
        let start_y = machine.world().shark().bounding_box().y;
        let machine = machine.transition(Event::Tick, &mut rng, 5000.0);
        assert!(matches!(machine, SessionMachine::Ready(_)));
        assert_relative_eq!(machine.world().shark().bounding_box().y, start_y);
        assert_eq!(machine.score(), 0);
    }

    #[test]
    fn test_activation_starts_the_run() {
        let mut rng = test_rng();
        let machine = SessionMachine::new(&mut rng, 0.0);
        let machine = machine.transition(Event::Activate, &mut rng, 0.0);
        assert!(matches!(machine, SessionMachine::Playing(_)));
    }

    #[test]
    fn test_flap_is_swallowed_during_the_hold() {
        let mut rng = test_rng();
        let machine = SessionMachine::new(&mut rng, 0.0);
        let machine = machine.transition(Event::Activate, &mut rng, 0.0);
        let machine = machine.transition(Event::Activate, &mut rng, 500.0);
        let machine = machine.transition(Event::Tick, &mut rng, 500.0);
        assert_relative_eq!(
            machine.world().shark().bounding_box().y,
            VIEWPORT_HEIGHT / 2.0
        );
    }

    #[test]
    fn test_activation_mid_run_flaps() {
        let mut rng = test_rng();
        let mut machine = SessionMachine::new(&mut rng, 0.0);
        machine = machine.transition(Event::Activate, &mut rng, 0.0);
        let mut now = 0.0;
        while now < 1500.0 {
            now += 16.0;
            machine = machine.transition(Event::Tick, &mut rng, now);
        }
        let falling_y = machine.world().shark().bounding_box().y;
        machine = machine.transition(Event::Activate, &mut rng, now);
        machine = machine.transition(Event::Tick, &mut rng, now + 16.0);
        assert!(machine.world().shark().bounding_box().y < falling_y);
    }

    #[test]
    fn test_no_input_run_settles_on_the_floor_before_first_spawn() {
        let mut rng = test_rng();
        let mut machine = SessionMachine::new(&mut rng, 0.0);
        machine = machine.transition(Event::Activate, &mut rng, 0.0);
        let mut now = 0.0;
        while now < 1900.0 {
            now += 16.0;
            machine = machine.transition(Event::Tick, &mut rng, now);
        }
        assert!(matches!(machine, SessionMachine::Playing(_)));
        let world = machine.world();
        assert_relative_eq!(world.shark().bounding_box().bottom(), VIEWPORT_HEIGHT);
        assert!(world.pipes().is_empty());
        assert_eq!(world.score(), 0);
    }

    #[test]
    fn test_crash_freezes_the_session_until_reactivation() {
        let mut rng = test_rng();
        let mut machine = SessionMachine::new(&mut rng, 0.0);
        machine = machine.transition(Event::Activate, &mut rng, 0.0);

        // flapping every step holds the shark at the ceiling until a top
        // pipe drifts into it
        let mut now = 0.0;
        while !machine.is_over() {
            now += 100.0;
            machine = machine.transition(Event::Activate, &mut rng, now);
            machine = machine.transition(Event::Tick, &mut rng, now);
            assert!(now < 200_000.0, "expected a collision by now");
        }

        let frozen_score = machine.score();
        let frozen_y = machine.world().shark().bounding_box().y;
        for _ in 0..10 {
            now += 16.0;
            machine = machine.transition(Event::Tick, &mut rng, now);
        }
        assert!(machine.is_over());
        assert_eq!(machine.score(), frozen_score);
        assert_relative_eq!(machine.world().shark().bounding_box().y, frozen_y);

        // restarting clears the run but keeps the bubble field
        let bubbles: Vec<f32> = machine
            .world()
            .bubbles()
            .iter()
            .map(|b| b.bounding_box().y)
            .collect();
        machine = machine.transition(Event::Activate, &mut rng, now);
        assert!(matches!(machine, SessionMachine::Playing(_)));
        assert_eq!(machine.score(), 0);
        assert!(machine.world().pipes().is_empty());
        assert_relative_eq!(machine.world().scroll_speed(), INITIAL_SCROLL_SPEED);
        assert_relative_eq!(
            machine.world().shark().bounding_box().y,
            VIEWPORT_HEIGHT / 2.0
        );
        let after: Vec<f32> = machine
            .world()
            .bubbles()
            .iter()
            .map(|b| b.bounding_box().y)
            .collect();
        assert_eq!(bubbles, after);
    }
}
