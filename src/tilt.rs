//! Mouse-relative 3D tilt for hover cards.
//!
//! The card rotates toward the pointer while it is hovered and settles flat
//! when the pointer leaves. Lifted items inside the card translate by their
//! own offset only while the card is hovered.

use std::time::Duration;

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Full swing of each rotation axis, in degrees.
pub const TILT_RANGE_DEG: f32 = 20.0;
/// Time the visible rotation takes to reach a new target.
pub const TWEEN_DURATION: Duration = Duration::from_millis(200);
pub const DEFAULT_PERSPECTIVE: f32 = 1000.0;

/// Tilt state of one card.
#[derive(Debug, Clone)]
pub struct CardTilt {
    /// Pointer position normalized to the card, `(0.5, 0.5)` at rest.
    pointer: Vec2,
    entered: bool,
    /// Visible rotation in degrees (`x` about the horizontal axis).
    rotation: Vec2,
    from: Vec2,
    to: Vec2,
    elapsed: Duration,
}

impl Default for CardTilt {
    fn default() -> Self {
        Self::new()
    }
}

impl CardTilt {
    pub fn new() -> Self {
        Self {
            pointer: Vec2::splat(0.5),
            entered: false,
            rotation: Vec2::ZERO,
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            elapsed: TWEEN_DURATION,
        }
    }

    pub fn enter(&mut self) {
        self.entered = true;
        self.retarget();
    }

    pub fn leave(&mut self) {
        self.entered = false;
        self.pointer = Vec2::splat(0.5);
        self.retarget();
    }

    /// Track the pointer over a card at `origin` with `size`, all in the same
    /// pixel space.
    pub fn pointer_move(&mut self, origin: Vec2, size: Vec2, point: Vec2) {
        self.pointer = if size.x > 0.0 && size.y > 0.0 {
            ((point - origin) / size).clamp(Vec2::ZERO, Vec2::ONE)
        } else {
            Vec2::splat(0.5)
        };
        self.retarget();
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Rotation the card is heading for, in degrees.
    pub fn target(&self) -> Vec2 {
        if self.entered {
            // rotateX follows the vertical position, rotateY the horizontal one
            Vec2::new(
                self.pointer.y * TILT_RANGE_DEG - TILT_RANGE_DEG * 0.5,
                self.pointer.x * TILT_RANGE_DEG - TILT_RANGE_DEG * 0.5,
            )
        } else {
            Vec2::ZERO
        }
    }

    /// Advance the tween by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(TWEEN_DURATION);
        let t = self.elapsed.as_secs_f32() / TWEEN_DURATION.as_secs_f32();
        self.rotation = self.from.lerp(self.to, t);
    }

    /// Visible rotation in degrees.
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn is_settled(&self) -> bool {
        self.elapsed >= TWEEN_DURATION
    }

    /// Translation of a lifted item with the given offset.
    pub fn item_translation(&self, offset: Vec3) -> Vec3 {
        if self.entered {
            offset
        } else {
            Vec3::ZERO
        }
    }

    /// `perspective(p) rotateX(x) rotateY(y)` in card-centered pixel space
    /// (y down).
    pub fn transform(&self, perspective: f32) -> Mat4 {
        perspective_matrix(perspective)
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
    }

    fn retarget(&mut self) {
        let target = self.target();
        if target != self.to {
            self.from = self.rotation;
            self.to = target;
            self.elapsed = Duration::ZERO;
        }
    }
}

fn perspective_matrix(distance: f32) -> Mat4 {
    if distance <= 0.0 || !distance.is_finite() {
        return Mat4::IDENTITY;
    }
    Mat4::from_cols(
        Vec4::X,
        Vec4::Y,
        Vec4::new(0.0, 0.0, 1.0, -1.0 / distance),
        Vec4::W,
    )
}
