use crate::{
    config::FallbackConfig,
    geometry::displacement,
    types::{GestureKind, GestureResult, Point},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Four-way swipe classifier over net displacement. It ignores the shape of
/// the stroke entirely, so it is only consulted when the template matcher has
/// nothing usable.
#[derive(Clone, Copy, Debug)]
pub struct DirectionFallback {
    min_displacement_px: f32,
    confidence: f32,
}

impl Default for DirectionFallback {
    fn default() -> Self {
        Self::new(&FallbackConfig::default())
    }
}

impl DirectionFallback {
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            min_displacement_px: config.min_displacement_px,
            confidence: config.confidence,
        }
    }

    /// `None` covers empty paths and jitter under the displacement floor.
    pub fn direction(&self, path: &[Point]) -> Option<Direction> {
        let (dx, dy) = displacement(path)?;
        if !(dx.is_finite() && dy.is_finite()) {
            return None;
        }
        let abs_dx = dx.abs();
        let abs_dy = dy.abs();
        if abs_dx.max(abs_dy) < self.min_displacement_px {
            return None;
        }

        // Screen y grows downward.
        if abs_dx >= abs_dy {
            if dx >= 0.0 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            }
        } else if dy >= 0.0 {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }

    pub fn classify(&self, path: &[Point]) -> Option<GestureResult> {
        let direction = self.direction(path)?;
        Some(GestureResult::new(
            GestureKind::Symbol,
            direction.label(),
            self.confidence,
        ))
    }
}
