//! The sparkle field renderer.
//!
//! [`Sparkles`] mounts into a host container, owns the particle set and the
//! host registrations it made, and renders on the host's frame callbacks.
//!
//! # Lifecycle
//!
//! ```text
//! mount ──> Running ──(unmount / drop / reconfigure)──> Released
//!   │
//!   └─(no 2D context)──> Degraded (background only, nothing registered)
//! ```
//!
//! Everything acquired at mount lives in one [`FieldResources`] value. Its
//! `release` consumes it, so the frame registration is canceled, the
//! listeners are removed and the surface is detached exactly once, whichever
//! way the renderer goes away.

use std::time::Duration;

use glam::Vec2;
use tracing::{debug, info, warn};

use crate::config::SparklesConfig;
use crate::draw::{draw, DrawContext};
use crate::error::ConfigError;
use crate::field::{step, StepContext};
use crate::host::{EventKind, FrameHandle, Host, ListenerHandle, Size, Surface};
use crate::limiter::{Debouncer, FrameThrottle};
use crate::particle::{spawn_field, Particle, ParticleSource, SeededSource};

/// Host registrations held for the mounted lifetime of a field.
#[derive(Debug)]
pub struct FieldResources<S> {
    surface: S,
    frame: Option<FrameHandle>,
    listeners: Vec<ListenerHandle>,
}

impl<S: Surface> FieldResources<S> {
    fn acquire<H: Host<Surface = S>>(host: &mut H, surface: S) -> Self {
        let listeners = vec![host.listen(EventKind::Resize)];
        let frame = Some(host.request_frame());
        Self {
            surface,
            frame,
            listeners,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    pub fn listeners(&self) -> &[ListenerHandle] {
        &self.listeners
    }

    fn release<H: Host<Surface = S>>(self, host: &mut H) {
        if let Some(frame) = self.frame {
            host.cancel_frame(frame);
        }
        for listener in self.listeners {
            host.unlisten(listener);
        }
        host.detach_surface(self.surface);
    }
}

struct Running<S> {
    resources: FieldResources<S>,
    particles: Vec<Particle>,
    bounds: Vec2,
    throttle: FrameThrottle,
    resize: Debouncer,
    frames_rendered: u64,
}

enum FieldState<S> {
    Running(Running<S>),
    Degraded,
    Released,
}

/// A mounted sparkle field.
pub struct Sparkles<H: Host> {
    host: H,
    config: SparklesConfig,
    state: FieldState<H::Surface>,
}

impl<H: Host> Sparkles<H> {
    /// Mount with particles drawn from a time-seeded RNG.
    pub fn mount(host: H, config: SparklesConfig) -> Result<Self, ConfigError> {
        Self::mount_with_source(host, config, &mut SeededSource::from_time())
    }

    /// Mount with particles drawn from `source`.
    ///
    /// Fails only on invalid configuration. A host without a drawing
    /// context yields a degraded (inert) field, not an error.
    pub fn mount_with_source(
        host: H,
        config: SparklesConfig,
        source: &mut impl ParticleSource,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sparkles = Self {
            host,
            config,
            state: FieldState::Released,
        };
        sparkles.state = sparkles.acquire(source);
        Ok(sparkles)
    }

    fn acquire(&mut self, source: &mut impl ParticleSource) -> FieldState<H::Surface> {
        self.host.set_background(self.config.background);

        let size = self.host.measure();
        let Some(surface) = self.host.create_surface(&self.config.id, size) else {
            warn!(id = %self.config.id, "no 2D drawing context available, sparkle field disabled");
            return FieldState::Degraded;
        };

        let particles = spawn_field(&self.config, size.width, size.height, source);
        let resources = FieldResources::acquire(&mut self.host, surface);
        info!(
            id = %self.config.id,
            width = size.width,
            height = size.height,
            particles = particles.len(),
            "sparkle field mounted"
        );

        FieldState::Running(Running {
            resources,
            particles,
            bounds: Vec2::new(size.width as f32, size.height as f32),
            throttle: FrameThrottle::new(self.config.frame_interval()),
            resize: Debouncer::new(self.config.resize_debounce()),
            frames_rendered: 0,
        })
    }

    fn release(&mut self) {
        match std::mem::replace(&mut self.state, FieldState::Released) {
            FieldState::Running(running) => {
                running.resources.release(&mut self.host);
                debug!(id = %self.config.id, frames = running.frames_rendered, "sparkle field released");
            }
            FieldState::Degraded | FieldState::Released => {}
        }
    }

    /// Deliver a fired frame callback at host time `now`.
    ///
    /// Re-registers for the next frame, applies a due resize, then renders
    /// if the frame throttle allows. Returns whether anything was drawn.
    /// Handles this field did not register are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) -> bool {
        let FieldState::Running(running) = &mut self.state else {
            return false;
        };
        if running.resources.frame != Some(handle) {
            return false;
        }
        running.resources.frame = Some(self.host.request_frame());

        Self::apply_resize(&self.host, &self.config, running, now);

        if !running.throttle.ready(now) {
            return false;
        }

        let ctx = StepContext::new(
            running.bounds,
            self.config.alpha_floor,
            self.config.alpha_ceiling,
            now.as_secs_f64() * 1000.0,
        );
        let surface = &mut running.resources.surface;
        surface.clear();
        step(&mut running.particles, &ctx);
        draw(surface, &running.particles, self.config.particle_color);
        running.frames_rendered += 1;
        true
    }

    /// Deliver a resize notification. The surface follows after the debounce window.
    pub fn on_resize(&mut self, now: Duration) {
        if let FieldState::Running(running) = &mut self.state {
            running.resize.trigger(now);
        }
    }

    /// Apply a resize whose debounce window has elapsed. Returns whether
    /// the surface was resized.
    pub fn poll(&mut self, now: Duration) -> bool {
        match &mut self.state {
            FieldState::Running(running) => Self::apply_resize(&self.host, &self.config, running, now),
            _ => false,
        }
    }

    fn apply_resize(host: &H, config: &SparklesConfig, running: &mut Running<H::Surface>, now: Duration) -> bool {
        if !running.resize.poll(now) {
            return false;
        }
        let size = host.measure();
        running.resources.surface.set_size(size);
        // particles are not renormalized; they wrap into the new bounds as they move
        running.bounds = Vec2::new(size.width as f32, size.height as f32);
        debug!(id = %config.id, width = size.width, height = size.height, "sparkle surface resized");
        true
    }

    /// Tear down and mount again with a new configuration.
    ///
    /// The old registrations are released even if the new config is rejected;
    /// in that case the field stays released.
    pub fn reconfigure(&mut self, config: SparklesConfig) -> Result<(), ConfigError> {
        self.reconfigure_with_source(config, &mut SeededSource::from_time())
    }

    pub fn reconfigure_with_source(
        &mut self,
        config: SparklesConfig,
        source: &mut impl ParticleSource,
    ) -> Result<(), ConfigError> {
        self.release();
        config.validate()?;
        self.config = config;
        self.state = self.acquire(source);
        Ok(())
    }

    /// Tear down explicitly. Dropping the field does the same.
    pub fn unmount(mut self) {
        self.release();
    }

    pub fn config(&self) -> &SparklesConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, FieldState::Running(_))
    }

    /// True when mounted without a drawing context.
    pub fn is_degraded(&self) -> bool {
        matches!(self.state, FieldState::Degraded)
    }

    pub fn particles(&self) -> &[Particle] {
        match &self.state {
            FieldState::Running(running) => &running.particles,
            _ => &[],
        }
    }

    pub fn resources(&self) -> Option<&FieldResources<H::Surface>> {
        match &self.state {
            FieldState::Running(running) => Some(&running.resources),
            _ => None,
        }
    }

    pub fn surface(&self) -> Option<&H::Surface> {
        self.resources().map(FieldResources::surface)
    }

    /// Surface size, or zero when not running.
    pub fn surface_size(&self) -> Size {
        self.surface()
            .map(|s| {
                let (width, height) = s.size();
                Size::new(width, height)
            })
            .unwrap_or(Size::ZERO)
    }

    pub fn frames_rendered(&self) -> u64 {
        match &self.state {
            FieldState::Running(running) => running.frames_rendered,
            _ => 0,
        }
    }
}

impl<H: Host> Drop for Sparkles<H> {
    fn drop(&mut self) {
        self.release();
    }
}
