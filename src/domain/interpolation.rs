use glam::Vec2;

use crate::core::Transform;

/// Values that can be blended between two solver states.
pub trait Lerp: Copy {
    fn lerp(&self, other: &Self, alpha: f32) -> Self;
}

impl Lerp for Transform {
    fn lerp(&self, other: &Self, alpha: f32) -> Self {
        Transform::lerp(self, other, alpha)
    }
}

impl Lerp for [Vec2; 2] {
    fn lerp(&self, other: &Self, alpha: f32) -> Self {
        [self[0].lerp(other[0], alpha), self[1].lerp(other[1], alpha)]
    }
}

/// Previous / latest solver state plus the blended value handed to rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Interpolated<T> {
    /// Snapshot taken right before the last solver step
    pub previous: T,
    /// Latest solver state
    pub current: T,
    /// Blend of the two for this frame
    pub value: T,
}

impl<T: Lerp> Interpolated<T> {
    pub fn new(value: T) -> Self {
        Self {
            previous: value,
            current: value,
            value,
        }
    }

    /// Jump to `value` without any smoothing (teleports, creation).
    pub fn reset(&mut self, value: T) {
        *self = Self::new(value);
    }

    pub fn store_previous(&mut self, value: T) {
        self.previous = value;
    }

    /// `alpha = 0` yields the previous snapshot, `alpha = 1` the latest state.
    pub fn blend(&mut self, current: T, alpha: f32) -> T {
        let alpha = alpha.clamp(0.0, 1.0);
        self.current = current;
        self.value = self.previous.lerp(&current, alpha);
        self.value
    }
}
