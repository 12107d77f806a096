//! Configuration surface for a sparkle field.
//!
//! # Usage
//!
//! ```ignore
//! let config = SparklesConfig::default()
//!     .with_sizes(0.6, 1.4)
//!     .with_density(20.0)
//!     .with_speed_factor(0.5);
//! config.validate()?;
//! ```
//!
//! Configs can also be loaded from JSON; missing fields take their defaults
//! and colors are CSS strings:
//!
//! ```json
//! { "particle_density": 20, "particle_color": "#C4B5FD", "background": "transparent" }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ConfigError;

/// Area in square pixels that one unit of density "buys" one particle in.
pub const AREA_PER_DENSITY_UNIT: f64 = 3500.0;

/// Upper bound on particles per field regardless of area or density.
pub const DEFAULT_MAX_PARTICLES: u32 = 180;

/// Slowest accepted frame cap.
pub const MIN_TARGET_FPS: f32 = 1.0;

/// Configuration for a [`Sparkles`](crate::Sparkles) field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparklesConfig {
    /// Identifier given to the injected drawing surface.
    pub id: String,
    /// Backdrop color of the container.
    pub background: Color,
    /// Smallest base radius in pixels.
    pub min_size: f32,
    /// Largest base radius in pixels.
    pub max_size: f32,
    /// Scales the particle count relative to container area.
    pub particle_density: f32,
    /// Shared color for every particle and its glow.
    pub particle_color: Color,
    /// Scales per-particle velocity magnitude.
    pub speed_factor: f32,
    /// Lowest opacity a particle twinkles down to.
    pub alpha_floor: f32,
    /// Highest opacity a particle twinkles up to.
    pub alpha_ceiling: f32,
    /// Rendered frames per second; extra host frames are skipped.
    pub target_fps: f32,
    /// Quiet period before a resize is applied to the surface.
    pub resize_debounce_ms: u64,
    /// Cap on the particle count.
    pub max_particles: u32,
}

impl Default for SparklesConfig {
    fn default() -> Self {
        Self {
            id: "sparkles-canvas".to_string(),
            background: Color::TRANSPARENT,
            min_size: 0.6,
            max_size: 2.0,
            particle_density: 25.0,
            particle_color: Color::WHITE,
            speed_factor: 0.6,
            alpha_floor: 0.2,
            alpha_ceiling: 0.8,
            target_fps: 45.0,
            resize_debounce_ms: 200,
            max_particles: DEFAULT_MAX_PARTICLES,
        }
    }
}

impl SparklesConfig {
    /// Full-page hero backdrop: smaller, sparser and slower sparkles.
    pub fn backdrop() -> Self {
        Self {
            id: "tsparticles".to_string(),
            max_size: 1.4,
            particle_density: 20.0,
            speed_factor: 0.5,
            ..Self::default()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "backdrop" => Some(Self::backdrop()),
            _ => None,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_sizes(mut self, min_size: f32, max_size: f32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.particle_density = density;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.particle_color = color;
        self
    }

    pub fn with_speed_factor(mut self, speed_factor: f32) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    pub fn with_twinkle_range(mut self, floor: f32, ceiling: f32) -> Self {
        self.alpha_floor = floor;
        self.alpha_ceiling = ceiling;
        self
    }

    pub fn with_target_fps(mut self, fps: f32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Minimum time between two rendered frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps as f64)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Number of particles for a container of the given size.
    ///
    /// `min(max_particles, floor(area / (3500 / density)))`.
    pub fn particle_count(&self, width: u32, height: u32) -> usize {
        if self.particle_density <= 0.0 || !self.particle_density.is_finite() {
            return 0;
        }
        let area = width as f64 * height as f64;
        let per_particle = AREA_PER_DENSITY_UNIT / self.particle_density as f64;
        let target = (area / per_particle).floor();
        target.min(self.max_particles as f64) as usize
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("min_size", self.min_size),
            ("max_size", self.max_size),
            ("particle_density", self.particle_density),
            ("speed_factor", self.speed_factor),
            ("alpha_floor", self.alpha_floor),
            ("alpha_ceiling", self.alpha_ceiling),
            ("target_fps", self.target_fps),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{} must be finite", name)));
        }

        if self.min_size < 0.0 || self.max_size < self.min_size {
            return Err(ConfigError::Invalid(format!(
                "sizes must satisfy 0 <= min_size <= max_size (got {} and {})",
                self.min_size, self.max_size
            )));
        }
        if self.particle_density < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "particle_density must not be negative (got {})",
                self.particle_density
            )));
        }
        if self.speed_factor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "speed_factor must not be negative (got {})",
                self.speed_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha_floor)
            || !(0.0..=1.0).contains(&self.alpha_ceiling)
            || self.alpha_floor > self.alpha_ceiling
        {
            return Err(ConfigError::Invalid(format!(
                "twinkle range must satisfy 0 <= alpha_floor <= alpha_ceiling <= 1 (got {} and {})",
                self.alpha_floor, self.alpha_ceiling
            )));
        }
        if self.target_fps < MIN_TARGET_FPS {
            return Err(ConfigError::Invalid(format!(
                "target_fps must be at least {} (got {})",
                MIN_TARGET_FPS, self.target_fps
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
