//! Host-side timing.
//!
//! Components take timestamps as a [`Duration`] since the host's origin.
//! [`FrameClock`] is how a real-time host produces them, and it keeps a
//! running FPS figure for the window title.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // once per redraw:
//! let now = clock.tick();
//! sparkles.on_frame(frame, now);
//! println!("FPS: {:.1}", clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Monotonic timestamps plus frame-rate accounting.
#[derive(Debug)]
pub struct FrameClock {
    /// Host time origin.
    origin: Instant,
    /// Total ticks since creation.
    frames: u64,
    /// Last computed frames per second.
    fps: f32,
    /// Tick count when `fps` was last computed.
    fps_frames: u64,
    /// When `fps` was last computed.
    fps_since: Instant,
    /// How often `fps` is recomputed.
    fps_window: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            frames: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_since: now,
            fps_window: Duration::from_millis(500),
        }
    }

    /// Time since the origin, without counting a frame.
    #[inline]
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Count a frame and return the current timestamp.
    pub fn tick(&mut self) -> Duration {
        let instant = Instant::now();
        self.frames += 1;

        let window = instant.duration_since(self.fps_since);
        if window >= self.fps_window {
            let frames = self.frames - self.fps_frames;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frames = self.frames;
            self.fps_since = instant;
        }

        instant.duration_since(self.origin)
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second over the last measurement window.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
