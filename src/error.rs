//! Error types for sparkfield.
//!
//! The particle renderer itself never fails at runtime (a missing drawing
//! context degrades it to an empty panel). These errors cover the fallible
//! edges around it: parsing colors and configuration, writing snapshots,
//! and bringing up the GPU presenter and window.

use std::fmt;

/// A color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorError {
    /// The rejected input.
    pub input: String,
}

impl ColorError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid color '{}'. Expected #RGB, #RRGGBB, #RRGGBBAA, rgb(), rgba() or a color name.",
            self.input
        )
    }
}

impl std::error::Error for ColorError {}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    Io(std::io::Error),
    /// The file is not valid JSON or does not match the schema.
    Parse(serde_json::Error),
    /// A value is out of its allowed range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur while writing a surface snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// The surface has no pixels to write.
    Empty,
    /// Failed to encode or write the image.
    Image(image::ImageError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Empty => write!(f, "Surface is empty (zero width or height), nothing to write"),
            SnapshotError::Image(e) => write!(f, "Failed to write image: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Image(e) => Some(e),
            SnapshotError::Empty => None,
        }
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(e: image::ImageError) -> Self {
        SnapshotError::Image(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the showcase window.
#[derive(Debug)]
pub enum ShowcaseError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for ShowcaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowcaseError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ShowcaseError::Window(e) => write!(f, "Failed to create window: {}", e),
            ShowcaseError::Gpu(e) => write!(f, "GPU error: {}", e),
            ShowcaseError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ShowcaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShowcaseError::EventLoop(e) => Some(e),
            ShowcaseError::Window(e) => Some(e),
            ShowcaseError::Gpu(e) => Some(e),
            ShowcaseError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ShowcaseError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ShowcaseError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ShowcaseError {
    fn from(e: winit::error::OsError) -> Self {
        ShowcaseError::Window(e)
    }
}

impl From<GpuError> for ShowcaseError {
    fn from(e: GpuError) -> Self {
        ShowcaseError::Gpu(e)
    }
}

impl From<ConfigError> for ShowcaseError {
    fn from(e: ConfigError) -> Self {
        ShowcaseError::Config(e)
    }
}
