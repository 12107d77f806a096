//! # sparkfield
//!
//! Twinkling, drifting particle fields for decorative backdrops.
//!
//! A [`Sparkles`] field fills its container with semi-transparent point
//! sprites that drift at constant velocity, wrap around the edges, fade
//! between an opacity floor and ceiling, and pulse in size. The field does
//! not own a window or a timer: it is mounted on a [`Host`] that supplies a
//! drawing surface, frame callbacks and resize notifications.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sparkfield::prelude::*;
//!
//! let host = OffscreenHost::new(Size::new(640, 360));
//! let mut sparkles = Sparkles::mount(host.clone(), SparklesConfig::default())?;
//!
//! for _ in 0..120 {
//!     for frame in host.tick() {
//!         sparkles.on_frame(frame, host.now());
//!     }
//! }
//!
//! if let Some(canvas) = sparkles.surface() {
//!     canvas.save_png("sparkles.png", host.background())?;
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Simulation and drawing
//!
//! [`field::step`] advances particles (position, opacity, radius) and
//! [`draw::draw`] paints them into any [`DrawContext`]. Both are plain
//! functions over a particle slice, so they can be driven without a host.
//!
//! ### Lifecycle
//!
//! Mounting acquires a surface, a resize listener and a frame registration,
//! held together in [`FieldResources`]. They are released exactly once,
//! whether the field is unmounted, dropped or reconfigured. A host without a
//! drawing context yields an inert, degraded field instead of an error.
//!
//! ### Frame pacing
//!
//! The host may deliver frames faster than `target_fps`; the field keeps its
//! registration alive and only renders when a [`FrameThrottle`] allows it.
//! Resize bursts are collapsed by a [`Debouncer`].
//!
//! ### Hosts
//!
//! - [`OffscreenHost`]: manual clock, for snapshots and tests
//! - [`WindowHost`]: winit window presented through wgpu, see [`run_showcase`]
//!
//! ## Decorations
//!
//! [`BeamGlow`] is a pointer-tracked background glow with throttled,
//! frame-coalesced pointer updates; [`CardTilt`] is the tween math for
//! mouse-relative 3D card tilt.

pub mod beams;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod field;
pub mod gpu;
pub mod host;
pub mod limiter;
pub mod offscreen;
pub mod particle;
pub mod raster;
pub mod sparkles;
pub mod tilt;
pub mod time;
pub mod window;

pub use beams::{BeamConfig, BeamGlow};
pub use color::Color;
pub use config::SparklesConfig;
pub use draw::{draw, CommandRecorder, DrawCommand, DrawContext, Paint};
pub use error::{ColorError, ConfigError, GpuError, ShowcaseError, SnapshotError};
pub use field::{step, StepContext};
pub use glam::{Vec2, Vec3, Vec4};
pub use host::{EventKind, FrameHandle, Host, ListenerHandle, Size};
pub use limiter::{Debouncer, FrameThrottle, RateLimiter};
pub use offscreen::OffscreenHost;
pub use particle::{Particle, ParticleSource, SeededSource, SequenceSource};
pub use raster::PixelCanvas;
pub use sparkles::{FieldResources, Sparkles};
pub use tilt::CardTilt;
pub use time::FrameClock;
pub use window::{run_showcase, WindowHost};

/// Common imports.
pub mod prelude {
    pub use crate::beams::{BeamConfig, BeamGlow};
    pub use crate::color::Color;
    pub use crate::config::SparklesConfig;
    pub use crate::draw::{DrawContext, Paint};
    pub use crate::host::{EventKind, EventSource, FrameScheduler, Host, Size, SurfaceProvider};
    pub use crate::offscreen::OffscreenHost;
    pub use crate::particle::{ParticleSource, SeededSource, SequenceSource};
    pub use crate::raster::PixelCanvas;
    pub use crate::sparkles::Sparkles;
    pub use crate::tilt::CardTilt;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3, Vec4};
}
