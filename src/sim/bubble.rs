use super::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::engine::Rect;
use rand::Rng;

const BASE_SIZE: f32 = 20.0;

/// Purely decorative; bubbles never collide with anything.
#[derive(Debug, Clone)]
pub struct Bubble {
    bounds: Rect,
    speed: f32,
}

impl Bubble {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let size = BASE_SIZE * rng.gen_range(0.5..1.0);
        Bubble {
            bounds: Rect::new(
                rng.gen_range(0.0..VIEWPORT_WIDTH),
                rng.gen_range(0.0..VIEWPORT_HEIGHT),
                size,
                size,
            ),
            speed: rng.gen_range(1.0..3.0),
        }
    }

    /// Rise, and wrap back in below the floor once fully above the ceiling.
    pub fn update(&mut self) {
        self.bounds.y -= self.speed;
        if self.bounds.bottom() < 0.0 {
            self.bounds.y = VIEWPORT_HEIGHT + self.bounds.height;
        }
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_new_bubbles_start_inside_the_viewport() {
        let mut rng = test_rng();
        for _ in 0..100 {
            let bubble = Bubble::new(&mut rng);
            let bounds = bubble.bounding_box();
            assert!(bounds.x >= 0.0 && bounds.x < VIEWPORT_WIDTH);
            assert!(bounds.y >= 0.0 && bounds.y < VIEWPORT_HEIGHT);
            assert!(bounds.width >= BASE_SIZE * 0.5 && bounds.width < BASE_SIZE);
            assert_relative_eq!(bounds.width, bounds.height);
            assert!(bubble.speed >= 1.0 && bubble.speed < 3.0);
        }
    }

    #[test]
    fn test_bubbles_rise_along_a_fixed_column() {
        let mut rng = test_rng();
        let mut bubble = Bubble::new(&mut rng);
        let x = bubble.bounds.x;
        let y = bubble.bounds.y;
        bubble.update();
        assert_relative_eq!(bubble.bounds.x, x);
        assert_relative_eq!(bubble.bounds.y, y - bubble.speed);
    }

    #[test]
    fn test_wrap_waits_until_fully_above_the_ceiling() {
        let mut rng = test_rng();
        let mut bubble = Bubble::new(&mut rng);
        let height = bubble.bounds.height;
        bubble.speed = 2.0;

        // ends the step with its bottom flush against the ceiling : no wrap
        bubble.bounds.y = -height + 2.0;
        bubble.update();
        assert_relative_eq!(bubble.bounds.bottom(), 0.0, epsilon = 1e-3);

        // one more step clears the ceiling and wraps in below the floor
        bubble.update();
        assert_relative_eq!(bubble.bounds.y, VIEWPORT_HEIGHT + height);
    }
}
