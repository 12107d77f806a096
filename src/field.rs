//! Particle simulation.
//!
//! [`step`] advances a particle set by one rendered frame. It needs no
//! drawing context, so the motion rules can be exercised on their own:
//!
//! - position moves by velocity and wraps around the bounds (torus, not clamp);
//!   an axis with a zero bound holds still
//! - alpha moves by the twinkle speed and reflects at the floor/ceiling
//! - radius is recomputed from the base radius and the clock (pulse)

use glam::Vec2;

use crate::particle::Particle;

/// Per-frame inputs shared by every particle in a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Wrap bounds in pixels (surface width and height).
    pub bounds: Vec2,
    pub alpha_floor: f32,
    pub alpha_ceiling: f32,
    /// Clock reading driving the pulse, in milliseconds.
    pub time_ms: f64,
}

impl StepContext {
    pub fn new(bounds: Vec2, alpha_floor: f32, alpha_ceiling: f32, time_ms: f64) -> Self {
        Self {
            bounds,
            alpha_floor,
            alpha_ceiling,
            time_ms,
        }
    }
}

/// Wrap `value` into `[0, extent)`. Non-positive extents collapse to 0.
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    if extent.is_nan() || extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// One axis of motion. An axis without a positive extent (a collapsed
/// container) holds its coordinate.
#[inline]
fn advance_axis(value: f32, delta: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        wrap_coordinate(value + delta, extent)
    } else {
        value
    }
}

/// Radius of a pulsing particle at `time_ms`.
#[inline]
pub fn pulse_radius(base_radius: f32, pulse_speed: f32, time_ms: f64) -> f32 {
    let phase = time_ms * pulse_speed as f64;
    base_radius * (0.85 + 0.3 * phase.sin() as f32)
}

impl Particle {
    /// Advance this particle by one frame.
    pub fn update(&mut self, ctx: &StepContext) {
        self.position = Vec2::new(
            advance_axis(self.position.x, self.velocity.x, ctx.bounds.x),
            advance_axis(self.position.y, self.velocity.y, ctx.bounds.y),
        );

        self.alpha += self.twinkle_direction * self.twinkle_speed;
        if self.alpha > ctx.alpha_ceiling {
            self.alpha = ctx.alpha_ceiling;
            self.twinkle_direction = -1.0;
        } else if self.alpha < ctx.alpha_floor {
            self.alpha = ctx.alpha_floor;
            self.twinkle_direction = 1.0;
        }

        self.radius = pulse_radius(self.base_radius, self.pulse_speed, ctx.time_ms);
    }
}

/// Advance every particle by one frame.
pub fn step(particles: &mut [Particle], ctx: &StepContext) {
    for particle in particles.iter_mut() {
        particle.update(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SparklesConfig;
    use crate::particle::{spawn_field, SeededSource};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn particle(position: Vec2, velocity: Vec2) -> Particle {
        Particle {
            position,
            velocity,
            base_radius: 1.0,
            radius: 1.0,
            alpha: 0.5,
            twinkle_speed: 0.03,
            twinkle_direction: 1.0,
            pulse_speed: 0.01,
            glow: 3.0,
        }
    }

    #[test]
    fn test_wrap_coordinate() {
        assert_eq!(wrap_coordinate(5.0, 10.0), 5.0);
        assert_eq!(wrap_coordinate(10.0, 10.0), 0.0);
        assert_eq!(wrap_coordinate(-1.0, 10.0), 9.0);
        assert_eq!(wrap_coordinate(25.0, 10.0), 5.0);
        assert_eq!(wrap_coordinate(-1e-30, 10.0), 0.0);
        assert_eq!(wrap_coordinate(3.0, 0.0), 0.0);
        assert_eq!(wrap_coordinate(f32::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_position_stays_in_bounds_for_any_velocity() {
        let mut rng = SmallRng::seed_from_u64(99);
        let bounds = Vec2::new(37.0, 11.0);
        let ctx = StepContext::new(bounds, 0.2, 0.8, 0.0);

        let mut particles: Vec<Particle> = (0..200)
            .map(|_| {
                particle(
                    Vec2::new(rng.gen_range(0.0..37.0), rng.gen_range(0.0..11.0)),
                    Vec2::new(rng.gen_range(-500.0..500.0), rng.gen_range(-0.01..0.01)),
                )
            })
            .collect();

        for _ in 0..1_000 {
            step(&mut particles, &ctx);
            for p in &particles {
                assert!(p.position.x >= 0.0 && p.position.x < bounds.x, "x = {}", p.position.x);
                assert!(p.position.y >= 0.0 && p.position.y < bounds.y, "y = {}", p.position.y);
            }
        }
    }

    #[test]
    fn test_alpha_reflects_between_floor_and_ceiling() {
        let config = SparklesConfig::default();
        let mut source = SeededSource::new(5);
        let mut particles = spawn_field(&config, 400, 400, &mut source);
        let ctx = StepContext::new(Vec2::new(400.0, 400.0), 0.2, 0.8, 0.0);

        let mut saw_fade = false;
        for _ in 0..5_000 {
            step(&mut particles, &ctx);
            for p in &particles {
                assert!(p.alpha >= 0.2 && p.alpha <= 0.8, "alpha = {}", p.alpha);
                saw_fade |= p.twinkle_direction < 0.0;
            }
        }
        assert!(saw_fade);
    }

    #[test]
    fn test_alpha_direction_flips_at_bounds() {
        let ctx = StepContext::new(Vec2::new(10.0, 10.0), 0.2, 0.8, 0.0);
        let mut p = particle(Vec2::ZERO, Vec2::ZERO);
        p.alpha = 0.79;

        p.update(&ctx);
        assert_eq!(p.alpha, 0.8);
        assert_eq!(p.twinkle_direction, -1.0);

        p.alpha = 0.21;
        p.update(&ctx);
        assert_eq!(p.alpha, 0.2);
        assert_eq!(p.twinkle_direction, 1.0);
    }

    #[test]
    fn test_radius_is_a_function_of_time() {
        let mut a = particle(Vec2::ZERO, Vec2::ZERO);
        let mut b = a.clone();
        b.alpha = 0.3;

        let ctx = StepContext::new(Vec2::new(10.0, 10.0), 0.2, 0.8, 1234.5);
        a.update(&ctx);
        b.update(&ctx);
        assert_eq!(a.radius, b.radius);
        assert_eq!(a.radius, pulse_radius(1.0, 0.01, 1234.5));

        // sin(0) = 0
        assert!((pulse_radius(2.0, 0.01, 0.0) - 1.7).abs() < 1e-6);
        for t in [0.0, 10.0, 157.0, 1e9] {
            let r = pulse_radius(1.0, 0.01, t);
            assert!(r >= 0.55 - 1e-6 && r <= 1.15 + 1e-6);
        }
    }

    #[test]
    fn test_out_of_bounds_particle_wraps_on_next_step() {
        // a particle left behind by a shrink
        let mut p = particle(Vec2::new(700.0, 120.0), Vec2::new(0.1, 0.0));
        let ctx = StepContext::new(Vec2::new(500.0, 100.0), 0.2, 0.8, 0.0);
        p.update(&ctx);
        assert!(p.position.x < 500.0);
        assert!(p.position.y < 100.0);
        assert!((p.position.x - 200.1).abs() < 1e-3);
    }

    #[test]
    fn test_zero_bounds_hold_position() {
        let mut p = particle(Vec2::new(3.0, 4.0), Vec2::new(1.0, 1.0));
        p.update(&StepContext::new(Vec2::ZERO, 0.2, 0.8, 500.0));
        assert_eq!(p.position, Vec2::new(3.0, 4.0));
        // twinkle and pulse keep running
        assert!((p.alpha - 0.53).abs() < 1e-6);
        assert_eq!(p.radius, pulse_radius(1.0, 0.01, 500.0));

        // only the collapsed axis holds
        p.update(&StepContext::new(Vec2::new(10.0, 0.0), 0.2, 0.8, 0.0));
        assert_eq!(p.position, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn test_field_survives_collapse_to_zero() {
        let config = SparklesConfig::default();
        let mut particles = spawn_field(&config, 400, 300, &mut SeededSource::new(21));
        let full = StepContext::new(Vec2::new(400.0, 300.0), 0.2, 0.8, 0.0);
        let collapsed = StepContext::new(Vec2::ZERO, 0.2, 0.8, 0.0);

        let before: Vec<Vec2> = particles.iter().map(|p| p.position).collect();
        for _ in 0..10 {
            step(&mut particles, &collapsed);
        }
        let held: Vec<Vec2> = particles.iter().map(|p| p.position).collect();
        assert_eq!(before, held);

        for _ in 0..20 {
            step(&mut particles, &full);
        }
        let mut distinct: Vec<(u32, u32)> = particles
            .iter()
            .map(|p| (p.position.x.to_bits(), p.position.y.to_bits()))
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        assert!(particles.len() > 100);
        assert!(distinct.len() > particles.len() / 2, "{} distinct positions", distinct.len());
        for p in &particles {
            assert!(p.position.x >= 0.0 && p.position.x < 400.0);
            assert!(p.position.y >= 0.0 && p.position.y < 300.0);
        }
    }
}
