use super::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::engine::Rect;
use rand::Rng;

const PIPE_WIDTH: f32 = VIEWPORT_WIDTH * 0.1;
const PIPE_GAP: f32 = 200.0;
const MIDLINE: f32 = VIEWPORT_HEIGHT / 2.0;
const FRAME_COUNT: usize = 4;

#[derive(Debug, Clone)]
pub struct Pipe {
    bounds: Rect,
    inverted: bool,
    drift: f32,
    frame: usize,
}

impl Pipe {
    fn new<R: Rng>(rng: &mut R, inverted: bool, gap_y: f32) -> Self {
        let height = VIEWPORT_HEIGHT * rng.gen_range(0.2..0.5);
        let y = if inverted {
            gap_y - PIPE_GAP / 2.0 - height
        } else {
            gap_y + PIPE_GAP / 2.0
        };
        Pipe {
            bounds: Rect::new(VIEWPORT_WIDTH, y, PIPE_WIDTH, height),
            inverted,
            drift: rng.gen_range(-1.0..1.0),
            frame: 0,
        }
    }

    /// Scroll left and drift vertically. A top pipe never crosses below the
    /// midline and a bottom pipe never above it; the drift reflects instead.
    fn update(&mut self, scroll_speed: f32) {
        self.bounds.x -= scroll_speed;
        self.bounds.y += self.drift;

        if self.inverted && self.bounds.bottom() > MIDLINE {
            self.bounds.y = MIDLINE - self.bounds.height;
            self.drift = -self.drift;
        } else if !self.inverted && self.bounds.y < MIDLINE {
            self.bounds.y = MIDLINE;
            self.drift = -self.drift;
        }
    }

    fn advance_frame(&mut self) {
        self.frame = (self.frame + 1) % FRAME_COUNT;
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounds
    }

    fn off_screen(&self) -> bool {
        self.bounds.right() < 0.0
    }
}

/// Top and bottom pipe sharing one gap, scored as a unit.
#[derive(Debug, Clone)]
pub struct PipePair {
    top: Pipe,
    bottom: Pipe,
    passed: bool,
}

impl PipePair {
    /// Roll a gap center that keeps the whole gap on screen, then hang one
    /// pipe above it and stand one below it.
    pub fn spawn<R: Rng>(rng: &mut R) -> Self {
        let gap_y = rng.gen_range(PIPE_GAP / 2.0..VIEWPORT_HEIGHT - PIPE_GAP / 2.0);
        PipePair {
            top: Pipe::new(rng, true, gap_y),
            bottom: Pipe::new(rng, false, gap_y),
            passed: false,
        }
    }

    pub fn update(&mut self, scroll_speed: f32) {
        self.top.update(scroll_speed);
        self.bottom.update(scroll_speed);
    }

    pub fn advance_frame(&mut self) {
        self.top.advance_frame();
        self.bottom.advance_frame();
    }

    pub fn off_screen(&self) -> bool {
        self.top.off_screen()
    }

    pub fn collides_with(&self, shark: &Rect) -> bool {
        self.top.bounding_box().intersects(shark) || self.bottom.bounding_box().intersects(shark)
    }

    /// Awards the pass exactly once, the first time the pair's trailing edge
    /// is strictly left of the shark's leading edge.
    pub fn try_score(&mut self, shark: &Rect) -> bool {
        if !self.passed && self.top.bounding_box().right() < shark.x {
            self.passed = true;
            true
        } else {
            false
        }
    }

    pub fn top(&self) -> &Pipe {
        &self.top
    }

    pub fn bottom(&self) -> &Pipe {
        &self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_spawn_keeps_the_gap_on_screen() {
        let mut rng = test_rng();
        for _ in 0..100 {
            let pair = PipePair::spawn(&mut rng);
            let top = pair.top.bounds;
            let bottom = pair.bottom.bounds;
            assert_relative_eq!(top.x, VIEWPORT_WIDTH);
            assert_relative_eq!(bottom.x, VIEWPORT_WIDTH);
            assert_relative_eq!(bottom.y - top.bottom(), PIPE_GAP, epsilon = 1e-3);
            assert!(top.bottom() >= 0.0);
            assert!(bottom.y <= VIEWPORT_HEIGHT);
            assert!(top.height >= VIEWPORT_HEIGHT * 0.2);
            assert!(top.height < VIEWPORT_HEIGHT * 0.5);
        }
    }

    #[test]
    fn test_drift_reflects_at_the_midline() {
        let mut rng = test_rng();
        let mut pair = PipePair::spawn(&mut rng);

        pair.bottom.bounds.y = MIDLINE + 0.5;
        pair.bottom.drift = -2.0;
        pair.bottom.update(0.0);
        assert_relative_eq!(pair.bottom.bounds.y, MIDLINE);
        assert_relative_eq!(pair.bottom.drift, 2.0);

        pair.top.bounds.y = MIDLINE - pair.top.bounds.height + 0.5;
        pair.top.drift = 2.0;
        pair.top.update(0.0);
        assert_relative_eq!(pair.top.bounds.bottom(), MIDLINE, epsilon = 1e-3);
        assert_relative_eq!(pair.top.drift, -2.0);
    }

    #[test]
    fn test_pair_scores_once_after_passing() {
        let mut rng = test_rng();
        let mut pair = PipePair::spawn(&mut rng);
        let shark = Rect::new(100.0, 100.0, 80.0, 40.0);

        // trailing edge flush with the leading edge is not a pass yet
        pair.top.bounds.x = shark.x - PIPE_WIDTH;
        pair.bottom.bounds.x = pair.top.bounds.x;
        assert!(!pair.try_score(&shark));

        pair.top.bounds.x -= 1.0;
        assert!(pair.try_score(&shark));
        assert!(!pair.try_score(&shark));
    }

    #[test]
    fn test_pair_culled_only_when_fully_off_screen() {
        let mut rng = test_rng();
        let mut pair = PipePair::spawn(&mut rng);
        pair.top.bounds.x = -PIPE_WIDTH;
        assert!(!pair.off_screen());
        pair.top.bounds.x = -PIPE_WIDTH - 0.1;
        assert!(pair.off_screen());
    }

    #[test]
    fn test_collision_checks_both_pipes() {
        let mut rng = test_rng();
        let mut pair = PipePair::spawn(&mut rng);
        let shark = Rect::new(100.0, 100.0, 80.0, 40.0);

        pair.top.bounds = Rect::new(150.0, 0.0, PIPE_WIDTH, 120.0);
        pair.bottom.bounds = Rect::new(150.0, 500.0, PIPE_WIDTH, 100.0);
        assert!(pair.collides_with(&shark));

        pair.top.bounds.y = 300.0;
        assert!(!pair.collides_with(&shark));

        let sunk = Rect::new(100.0, 560.0, 80.0, 40.0);
        assert!(pair.collides_with(&sunk));
    }
}
