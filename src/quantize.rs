//! Accumulated motion → compass direction.

use crate::action::Direction;

/// A quantized swipe vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantized {
    pub direction: Direction,
    /// Chebyshev length of the vector, `max(|dx|, |dy|)`.
    pub magnitude: f64,
}

/// Map an accumulated `(dx, dy)` to one of four directions.
///
/// The axis with the larger absolute component wins, and ties go to the
/// horizontal axis.  The magnitude is the larger absolute component rather
/// than the Euclidean length, so a diagonal swipe does not reach the
/// threshold sooner than an axis-aligned one.
///
/// Screen coordinates: positive `dy` points down.
pub fn quantize(dx: f64, dy: f64) -> Quantized {
    let abs_x = dx.abs();
    let abs_y = dy.abs();

    let direction = if abs_x >= abs_y {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };

    Quantized {
        direction,
        magnitude: abs_x.max(abs_y),
    }
}
