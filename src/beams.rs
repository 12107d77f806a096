//! Pointer-tracked background glow.
//!
//! A blurred conic-gradient blob sits at the viewport center and leans a
//! few pixels toward the cursor. Pointer events arrive far more often than
//! frames, so [`BeamGlow`] accepts at most one move per `pointer_interval_ms`
//! and commits the accepted position on the next frame; a newer accepted
//! move replaces one still waiting for its frame.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::host::{EventKind, FrameHandle, Host, ListenerHandle};
use crate::limiter::{Debouncer, RateLimiter};

/// Configuration for a [`BeamGlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Start with the cursor at the viewport center instead of the origin.
    pub initial_centered: bool,
    /// Pixels the glow leans when the cursor is at a viewport edge (times two).
    pub cursor_influence: f32,
    pub pointer_interval_ms: u64,
    pub resize_debounce_ms: u64,
    /// Conic gradient stops, evenly spaced around the circle.
    pub palette: [Color; 5],
    /// Overall opacity of the glow layer.
    pub opacity: f32,
    /// Glow radius as a fraction of the smaller viewport side.
    pub radius_fraction: f32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            initial_centered: false,
            cursor_influence: 40.0,
            pointer_interval_ms: 50,
            resize_debounce_ms: 250,
            palette: [
                Color::from_rgba8(0x93, 0x33, 0xea, 0xff),
                Color::from_rgba8(0x7c, 0x3a, 0xed, 0xff),
                Color::from_rgba8(0x63, 0x66, 0xf1, 0xff),
                Color::from_rgba8(0x3b, 0x82, 0xf6, 0xff),
                Color::from_rgba8(0x8b, 0x5c, 0xf6, 0xff),
            ],
            opacity: 0.3,
            radius_fraction: 0.2,
        }
    }
}

impl BeamConfig {
    pub fn centered(mut self) -> Self {
        self.initial_centered = true;
        self
    }
}

#[derive(Debug)]
struct BeamRegistrations {
    listeners: Vec<ListenerHandle>,
    /// Accepted pointer position waiting for its frame.
    pending: Option<(FrameHandle, Vec2)>,
}

/// A mounted pointer-tracked glow.
pub struct BeamGlow<H: Host> {
    host: H,
    config: BeamConfig,
    cursor: Vec2,
    viewport: Vec2,
    limiter: RateLimiter,
    resize: Debouncer,
    registrations: Option<BeamRegistrations>,
}

impl<H: Host> BeamGlow<H> {
    pub fn mount(mut host: H, config: BeamConfig) -> Self {
        let size = host.measure();
        let viewport = Vec2::new(size.width as f32, size.height as f32);
        let cursor = if config.initial_centered {
            viewport * 0.5
        } else {
            Vec2::ZERO
        };

        let listeners = vec![
            host.listen(EventKind::Resize),
            host.listen(EventKind::PointerMove),
        ];

        Self {
            limiter: RateLimiter::new(Duration::from_millis(config.pointer_interval_ms)),
            resize: Debouncer::new(Duration::from_millis(config.resize_debounce_ms)),
            host,
            config,
            cursor,
            viewport,
            registrations: Some(BeamRegistrations {
                listeners,
                pending: None,
            }),
        }
    }

    /// Deliver a pointer move. Returns whether the move was accepted.
    pub fn on_pointer_move(&mut self, position: Vec2, now: Duration) -> bool {
        let Some(registrations) = self.registrations.as_mut() else {
            return false;
        };
        if !self.limiter.try_acquire(now) {
            return false;
        }
        if let Some((stale, _)) = registrations.pending.take() {
            self.host.cancel_frame(stale);
        }
        let frame = self.host.request_frame();
        registrations.pending = Some((frame, position));
        true
    }

    /// Deliver a fired frame. Commits the waiting pointer position if the
    /// frame is ours; returns whether the cursor changed.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        let Some(registrations) = self.registrations.as_mut() else {
            return false;
        };
        match registrations.pending {
            Some((frame, position)) if frame == handle => {
                registrations.pending = None;
                self.cursor = position;
                true
            }
            _ => false,
        }
    }

    pub fn on_resize(&mut self, now: Duration) {
        if self.registrations.is_some() {
            self.resize.trigger(now);
        }
    }

    /// Re-measure the viewport once the resize burst has gone quiet.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.registrations.is_none() || !self.resize.poll(now) {
            return false;
        }
        let size = self.host.measure();
        self.viewport = Vec2::new(size.width as f32, size.height as f32);
        debug!(width = size.width, height = size.height, "beam viewport resized");
        true
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    /// Displacement of the glow from the viewport center, in pixels.
    pub fn offset(&self) -> Vec2 {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return Vec2::ZERO;
        }
        (self.cursor / self.viewport - Vec2::splat(0.5)) * self.config.cursor_influence
    }

    /// Where the glow is drawn.
    pub fn center(&self) -> Vec2 {
        self.viewport * 0.5 + self.offset()
    }

    /// Glow radius in pixels.
    pub fn radius(&self) -> f32 {
        self.viewport.min_element() * self.config.radius_fraction
    }

    pub fn is_mounted(&self) -> bool {
        self.registrations.is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn release(&mut self) {
        if let Some(registrations) = self.registrations.take() {
            if let Some((frame, _)) = registrations.pending {
                self.host.cancel_frame(frame);
            }
            for listener in registrations.listeners {
                self.host.unlisten(listener);
            }
            self.resize.cancel();
        }
    }

    pub fn unmount(mut self) {
        self.release();
    }
}

impl<H: Host> Drop for BeamGlow<H> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Size;
    use crate::offscreen::OffscreenHost;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_initial_cursor() {
        let host = OffscreenHost::new(Size::new(800, 600));
        let glow = BeamGlow::mount(host.clone(), BeamConfig::default());
        assert_eq!(glow.cursor(), Vec2::ZERO);
        assert_eq!(glow.offset(), Vec2::new(-20.0, -20.0));

        let glow = BeamGlow::mount(host.clone(), BeamConfig::default().centered());
        assert_eq!(glow.cursor(), Vec2::new(400.0, 300.0));
        assert_eq!(glow.offset(), Vec2::ZERO);
        assert_eq!(glow.center(), Vec2::new(400.0, 300.0));
        assert_eq!(glow.radius(), 120.0);
    }

    #[test]
    fn test_pointer_moves_are_throttled() {
        let host = OffscreenHost::new(Size::new(800, 600));
        let mut glow = BeamGlow::mount(host.clone(), BeamConfig::default());

        let accepted = (0..20)
            .filter(|&i| glow.on_pointer_move(Vec2::new(i as f32, 0.0), ms(1000 + i * 10)))
            .count();
        // moves at 1000..1190ms every 10ms, one per 50ms window
        assert_eq!(accepted, 4);
    }

    #[test]
    fn test_pointer_update_is_coalesced_onto_next_frame() {
        let host = OffscreenHost::new(Size::new(800, 600));
        let mut glow = BeamGlow::mount(host.clone(), BeamConfig::default());

        assert!(glow.on_pointer_move(Vec2::new(100.0, 100.0), ms(0)));
        // nothing changes until the frame fires
        assert_eq!(glow.cursor(), Vec2::ZERO);

        // a later accepted move replaces the waiting one
        assert!(glow.on_pointer_move(Vec2::new(600.0, 450.0), ms(60)));
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.frames_canceled(), 1);

        let fired = host.tick();
        assert_eq!(fired.len(), 1);
        assert!(glow.on_frame(fired[0]));
        assert_eq!(glow.cursor(), Vec2::new(600.0, 450.0));
        assert_eq!(glow.offset(), Vec2::new(10.0, 10.0));
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_viewport_resize_is_debounced() {
        let host = OffscreenHost::new(Size::new(800, 600));
        let mut glow = BeamGlow::mount(host.clone(), BeamConfig::default());

        host.set_size(Size::new(1000, 500));
        glow.on_resize(ms(0));
        glow.on_resize(ms(100));
        assert!(!glow.poll(ms(300)));
        assert_eq!(glow.viewport(), Vec2::new(800.0, 600.0));
        assert!(glow.poll(ms(350)));
        assert_eq!(glow.viewport(), Vec2::new(1000.0, 500.0));
    }

    #[test]
    fn test_zero_viewport_has_no_offset() {
        let host = OffscreenHost::new(Size::ZERO);
        let mut glow = BeamGlow::mount(host.clone(), BeamConfig::default());
        glow.on_pointer_move(Vec2::new(5.0, 5.0), ms(0));
        for frame in host.tick() {
            glow.on_frame(frame);
        }
        assert_eq!(glow.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_drop_releases_registrations() {
        let host = OffscreenHost::new(Size::new(800, 600));
        {
            let mut glow = BeamGlow::mount(host.clone(), BeamConfig::default());
            assert_eq!(host.listener_count(EventKind::PointerMove), 1);
            assert_eq!(host.listener_count(EventKind::Resize), 1);
            glow.on_pointer_move(Vec2::new(1.0, 1.0), ms(0));
            assert_eq!(host.pending_frames(), 1);
        }
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(EventKind::PointerMove), 0);
        assert_eq!(host.listener_count(EventKind::Resize), 0);
    }
}
