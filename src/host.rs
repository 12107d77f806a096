//! Host collaborators.
//!
//! Components do not own a window, a timer or an event loop. A host supplies
//! them through three capabilities:
//!
//! - [`SurfaceProvider`]: measures the container and injects/detaches drawing surfaces
//! - [`FrameScheduler`]: one-shot per-frame callbacks, identified by [`FrameHandle`]
//! - [`EventSource`]: resize and pointer subscriptions, identified by [`ListenerHandle`]
//!
//! Host values are cheap handles onto shared host state (the way a DOM
//! handle is), so every component keeps its own clone for its whole mounted
//! lifetime and can release what it registered on any exit path.
//!
//! The host delivers callbacks by calling the component: `on_frame` with the
//! [`FrameHandle`] that fired, `on_resize`/`on_pointer_move` for events.

use crate::draw::DrawContext;

/// Container dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const ZERO: Size = Size::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Registration of a pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Registration of an event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(pub u64);

/// Events a component can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    PointerMove,
}

/// A drawing surface injected into the container.
pub trait Surface: DrawContext {
    /// Change the buffer size. Discards the current pixels.
    fn set_size(&mut self, size: Size);
}

/// Measures the container and manages drawing surfaces inside it.
pub trait SurfaceProvider {
    type Surface: Surface;

    /// Current rendered size of the container.
    fn measure(&self) -> Size;

    /// Style the container backdrop. Applies even when no surface can be made.
    fn set_background(&mut self, background: crate::color::Color);

    /// Create and inject a surface, or `None` if no 2D context is available.
    fn create_surface(&mut self, id: &str, size: Size) -> Option<Self::Surface>;

    /// Remove a surface from the container.
    fn detach_surface(&mut self, surface: Self::Surface);
}

/// One-shot per-frame callbacks.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending frame. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Resize and pointer notifications.
pub trait EventSource {
    fn listen(&mut self, kind: EventKind) -> ListenerHandle;

    /// Remove a listener. Unknown handles are ignored.
    fn unlisten(&mut self, handle: ListenerHandle);
}

/// Everything a component needs from its runtime.
pub trait Host: SurfaceProvider + FrameScheduler + EventSource {}

impl<T: SurfaceProvider + FrameScheduler + EventSource> Host for T {}

impl Surface for crate::raster::PixelCanvas {
    fn set_size(&mut self, size: Size) {
        self.resize(size.width, size.height);
    }
}

impl Surface for crate::draw::CommandRecorder {
    fn set_size(&mut self, size: Size) {
        self.resize(size.width, size.height);
    }
}
