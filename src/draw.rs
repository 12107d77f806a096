//! Drawing particles onto a 2D context.
//!
//! [`DrawContext`] is the small subset of a canvas-style 2D API the field
//! needs: clear, a global alpha, and filled circles painted either solid or
//! with a radial fade. [`draw`] turns a particle set into those calls and
//! never touches simulation state.

use glam::Vec2;

use crate::color::Color;
use crate::particle::Particle;

/// Fraction of a particle's alpha used for its halo.
pub const HALO_ALPHA: f32 = 0.3;
/// Fraction of a particle's alpha used for its highlight dot.
pub const HIGHLIGHT_ALPHA: f32 = 0.8;
/// Highlight offset (up and left) as a fraction of the radius.
pub const HIGHLIGHT_OFFSET: f32 = 0.3;
/// Highlight radius as a fraction of the radius.
pub const HIGHLIGHT_RADIUS: f32 = 0.2;

/// How a circle is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Uniform color.
    Solid(Color),
    /// Radial gradient from the color at the center to transparent at the rim.
    RadialFade(Color),
}

/// A 2D drawing context.
pub trait DrawContext {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Alpha multiplier applied to subsequent fills.
    fn set_global_alpha(&mut self, alpha: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint);
}

/// Draw every particle: halo, core disc, then highlight dot.
pub fn draw(ctx: &mut impl DrawContext, particles: &[Particle], color: Color) {
    for p in particles {
        ctx.set_global_alpha(p.alpha * HALO_ALPHA);
        ctx.fill_circle(p.position, p.radius * p.glow, Paint::RadialFade(color));

        ctx.set_global_alpha(p.alpha);
        ctx.fill_circle(p.position, p.radius, Paint::Solid(color));

        ctx.set_global_alpha(p.alpha * HIGHLIGHT_ALPHA);
        ctx.fill_circle(
            p.position - Vec2::splat(p.radius * HIGHLIGHT_OFFSET),
            p.radius * HIGHLIGHT_RADIUS,
            Paint::Solid(Color::WHITE),
        );
    }
}

/// One recorded call on a [`CommandRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    GlobalAlpha(f32),
    FillCircle { center: Vec2, radius: f32, paint: Paint },
}

/// A [`DrawContext`] that records calls instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of circle fills recorded so far.
    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count()
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Change the reported size. Recorded commands are kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl DrawContext for CommandRecorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparkle() -> Particle {
        Particle {
            position: Vec2::new(10.0, 20.0),
            velocity: Vec2::ZERO,
            base_radius: 2.0,
            radius: 2.0,
            alpha: 0.5,
            twinkle_speed: 0.02,
            twinkle_direction: 1.0,
            pulse_speed: 0.01,
            glow: 3.0,
        }
    }

    #[test]
    fn test_draw_emits_halo_core_highlight() {
        let color = Color::parse("#7C3AED").unwrap();
        let mut ctx = CommandRecorder::new(64, 64);
        draw(&mut ctx, &[sparkle()], color);

        assert_eq!(
            ctx.commands(),
            &[
                DrawCommand::GlobalAlpha(0.5 * HALO_ALPHA),
                DrawCommand::FillCircle {
                    center: Vec2::new(10.0, 20.0),
                    radius: 6.0,
                    paint: Paint::RadialFade(color),
                },
                DrawCommand::GlobalAlpha(0.5),
                DrawCommand::FillCircle {
                    center: Vec2::new(10.0, 20.0),
                    radius: 2.0,
                    paint: Paint::Solid(color),
                },
                DrawCommand::GlobalAlpha(0.5 * HIGHLIGHT_ALPHA),
                DrawCommand::FillCircle {
                    center: Vec2::new(9.4, 19.4),
                    radius: 0.4,
                    paint: Paint::Solid(Color::WHITE),
                },
            ]
        );
    }

    #[test]
    fn test_draw_three_fills_per_particle() {
        let mut ctx = CommandRecorder::new(64, 64);
        let particles = vec![sparkle(); 7];
        draw(&mut ctx, &particles, Color::WHITE);
        assert_eq!(ctx.fill_count(), 21);

        ctx.take();
        draw(&mut ctx, &[], Color::WHITE);
        assert!(ctx.commands().is_empty());
    }
}
