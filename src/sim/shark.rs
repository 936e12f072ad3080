use super::VIEWPORT_HEIGHT;
use crate::engine::{Point, Rect};

const WIDTH: f32 = 80.0;
const HEIGHT: f32 = 40.0;
const START_X: f32 = 100.0;
const GRAVITY: f32 = 0.25;
const FLAP_POWER: f32 = -5.0;

#[derive(Debug, Clone)]
pub struct Shark {
    position: Point,
    velocity: f32,
}

impl Shark {
    pub fn new() -> Self {
        Shark {
            position: Point {
                x: START_X,
                y: VIEWPORT_HEIGHT / 2.0,
            },
            velocity: 0.0,
        }
    }

    /// One gravity step. The position is clamped to the viewport but the
    /// velocity is left alone, so a shark pinned to an edge still has to
    /// burn off its accumulated speed.
    pub fn update(&mut self) {
        self.velocity += GRAVITY;
        self.position.y += self.velocity;

        if self.position.y < 0.0 {
            self.position.y = 0.0;
        }
        if self.position.y + HEIGHT > VIEWPORT_HEIGHT {
            self.position.y = VIEWPORT_HEIGHT - HEIGHT;
        }
    }

    pub fn flap(&mut self) {
        self.velocity = FLAP_POWER;
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, WIDTH, HEIGHT)
    }
}

impl Default for Shark {
    fn default() -> Self {
        Shark::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gravity_accelerates_the_fall() {
        let mut shark = Shark::new();
        shark.update();
        assert_relative_eq!(shark.velocity, GRAVITY);
        assert_relative_eq!(shark.position.y, VIEWPORT_HEIGHT / 2.0 + GRAVITY);
        shark.update();
        assert_relative_eq!(shark.velocity, 2.0 * GRAVITY);
    }

    #[test]
    fn test_flap_overrides_downward_velocity() {
        let mut shark = Shark::new();
        for _ in 0..10 {
            shark.update();
        }
        shark.flap();
        assert_relative_eq!(shark.velocity, FLAP_POWER);
        shark.update();
        assert_relative_eq!(shark.velocity, FLAP_POWER + GRAVITY);
    }

    #[test]
    fn test_position_stays_inside_the_viewport() {
        let mut shark = Shark::new();
        for _ in 0..600 {
            shark.update();
            let bounds = shark.bounding_box();
            assert!(bounds.y >= 0.0);
            assert!(bounds.bottom() <= VIEWPORT_HEIGHT);
        }
        // resting on the floor with velocity still accumulating
        assert_relative_eq!(shark.bounding_box().bottom(), VIEWPORT_HEIGHT);
        assert!(shark.velocity > 0.0);
    }

    #[test]
    fn test_flap_lifts_off_the_floor() {
        let mut shark = Shark::new();
        for _ in 0..600 {
            shark.update();
        }
        let floor_y = shark.bounding_box().y;
        shark.flap();
        shark.update();
        assert!(shark.bounding_box().y < floor_y);
    }
}
