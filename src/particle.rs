//! Particles and how they are spawned.
//!
//! Every random quantity a particle needs is drawn once, at creation, from a
//! [`ParticleSource`]. After that a particle evolves deterministically, so a
//! field seeded with the same source always plays back the same way.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SparklesConfig;
use crate::field::wrap_coordinate;

/// Supplier of uniform random draws in `[0, 1)` used at spawn time.
///
/// The default is [`SeededSource`]; tests inject fixed sequences.
pub trait ParticleSource {
    fn next_unit(&mut self) -> f32;
}

/// [`ParticleSource`] backed by a small, fast, seedable RNG.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: SmallRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed from the clock; differs on every run.
    pub fn from_time() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::new(seed)
    }
}

impl ParticleSource for SeededSource {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.rng.gen()
    }
}

/// Cycles through a fixed list of draws. Handy for reproducible layouts.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    /// Values are clamped into `[0, 1)`; an empty list yields 0.5 forever.
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f32::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }
}

impl ParticleSource for SequenceSource {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// A single twinkling point sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position in surface pixels.
    pub position: Vec2,
    /// Pixels moved per rendered frame.
    pub velocity: Vec2,
    /// Radius the pulse oscillates around.
    pub base_radius: f32,
    /// Radius at the last step.
    pub radius: f32,
    pub alpha: f32,
    /// Alpha change per rendered frame.
    pub twinkle_speed: f32,
    /// `1.0` while brightening, `-1.0` while fading.
    pub twinkle_direction: f32,
    /// Radians of pulse phase per millisecond.
    pub pulse_speed: f32,
    /// Halo radius as a multiple of the current radius.
    pub glow: f32,
}

impl Particle {
    /// Draw a new particle inside a `width` x `height` area.
    pub fn spawn(
        config: &SparklesConfig,
        width: f32,
        height: f32,
        source: &mut impl ParticleSource,
    ) -> Self {
        let x = wrap_coordinate(source.next_unit() * width, width);
        let y = wrap_coordinate(source.next_unit() * height, height);
        let base_radius = config.min_size + source.next_unit() * (config.max_size - config.min_size);
        let vx = (source.next_unit() - 0.5) * 0.25 * config.speed_factor;
        let vy = (source.next_unit() - 0.5) * 0.25 * config.speed_factor;
        let alpha = (0.3 + source.next_unit() * 0.5).clamp(config.alpha_floor, config.alpha_ceiling);
        let twinkle_speed = 0.02 + source.next_unit() * 0.015;
        let twinkle_direction = if source.next_unit() > 0.5 { 1.0 } else { -1.0 };
        let pulse_speed = 0.005 + source.next_unit() * 0.01;
        let glow = 2.0 + source.next_unit() * 2.0;

        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            base_radius,
            radius: base_radius,
            alpha,
            twinkle_speed,
            twinkle_direction,
            pulse_speed,
            glow,
        }
    }
}

/// Spawn the full particle set for a container of the given size.
pub fn spawn_field(
    config: &SparklesConfig,
    width: u32,
    height: u32,
    source: &mut impl ParticleSource,
) -> Vec<Particle> {
    let count = config.particle_count(width, height);
    (0..count)
        .map(|_| Particle::spawn(config, width as f32, height as f32, source))
        .collect()
}
