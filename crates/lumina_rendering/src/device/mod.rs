//! Graphics device boundary.
//!
//! The renderer never talks to a graphics API directly. Everything it needs
//! is expressed through [`GraphicsDevice`]: structured/constant buffers that
//! can be mapped for writing, resource and target binding, and the three
//! ways of consuming the pipeline (indexed draws, full-screen primitives and
//! compute dispatches).
//!
//! Buffers are opaque handles. Growing a buffer means creating a new handle
//! and releasing the old one; there is no in-place resize.

mod buffer;
mod headless;

pub use buffer::GrowableBuffer;
pub use headless::{DeviceCommand, HeadlessDevice};

use thiserror::Error;

/// Handle to a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// Handle to a render target (also bindable as a texture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(pub u32);

/// Pipeline stage a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Vertex stage.
    Vertex,
    /// Pixel stage.
    Pixel,
    /// Compute stage.
    Compute,
}

/// Buffer usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Structured buffer of `count` elements of `stride` bytes.
    Structured,
    /// Constant buffer; `count` is always 1.
    Constant,
}

/// Parameters for buffer creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Debug label.
    pub label: &'static str,
    /// Usage.
    pub kind: BufferKind,
    /// Element size in bytes.
    pub stride: u32,
    /// Element count.
    pub count: u32,
    /// Whether the CPU maps the buffer for writing every frame.
    pub mappable: bool,
}

impl BufferDescriptor {
    /// Describes a CPU-writable structured buffer.
    #[must_use]
    pub const fn structured(label: &'static str, stride: u32, count: u32) -> Self {
        Self {
            label,
            kind: BufferKind::Structured,
            stride,
            count,
            mappable: true,
        }
    }

    /// Describes a CPU-writable constant buffer of `size` bytes.
    #[must_use]
    pub const fn constant(label: &'static str, size: u32) -> Self {
        Self {
            label,
            kind: BufferKind::Constant,
            stride: size,
            count: 1,
            mappable: true,
        }
    }

    /// Total size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.stride as usize * self.count as usize
    }
}

/// Errors reported by a graphics device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Buffer creation failed.
    #[error("buffer creation failed: {0}")]
    CreateFailed(String),

    /// Mapping a buffer for writing failed.
    #[error("buffer map failed: {0}")]
    MapFailed(String),

    /// The handle does not name a live buffer.
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    /// The data does not fit in the buffer.
    #[error("upload of {needed} bytes into a {capacity}-byte buffer")]
    TooSmall {
        /// Bytes to upload.
        needed: usize,
        /// Buffer size.
        capacity: usize,
    },
}

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// The graphics device as seen by the renderer.
///
/// Implementations are driven from a single thread: the one that owns the
/// [`crate::Renderer`].
pub trait GraphicsDevice {
    /// Creates a buffer.
    ///
    /// # Errors
    ///
    /// [`DeviceError::CreateFailed`] when the device cannot allocate it.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> DeviceResult<BufferHandle>;

    /// Releases a buffer. Unknown handles are ignored.
    fn release_buffer(&mut self, buffer: BufferHandle);

    /// Maps a buffer for writing.
    ///
    /// # Errors
    ///
    /// [`DeviceError::MapFailed`] or [`DeviceError::UnknownBuffer`].
    fn map_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<&mut [u8]>;

    /// Ends a mapping started by [`GraphicsDevice::map_buffer`].
    fn unmap_buffer(&mut self, buffer: BufferHandle);

    /// Binds constant buffers starting at `first_slot`.
    fn set_constant_buffers(
        &mut self,
        stage: Stage,
        first_slot: u32,
        buffers: &[Option<BufferHandle>],
    );

    /// Binds buffer resources starting at `first_slot`.
    fn set_resources(&mut self, stage: Stage, first_slot: u32, resources: &[Option<BufferHandle>]);

    /// Binds a render target as a readable texture.
    fn set_texture(&mut self, stage: Stage, slot: u32, texture: Option<TargetHandle>);

    /// Sets the render target. `None` restores the default target.
    fn set_render_target(&mut self, target: Option<TargetHandle>);

    /// Draws non-indexed primitives with no vertex buffer bound.
    fn draw_primitive(&mut self, vertex_count: u32, first_vertex: u32);

    /// Draws indexed, instanced geometry.
    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    );

    /// Dispatches compute thread groups.
    fn dispatch(&mut self, x: u32, y: u32, z: u32);

    /// The internal color buffer every camera renders into.
    fn screen_target(&self) -> TargetHandle;
}

/// Writes `bytes` to the start of `buffer` through map/unmap.
///
/// # Errors
///
/// The map failure, or [`DeviceError::TooSmall`] when `bytes` does not fit.
pub fn upload<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    buffer: BufferHandle,
    bytes: &[u8],
) -> DeviceResult<()> {
    let mapped = device.map_buffer(buffer)?;
    if mapped.len() < bytes.len() {
        let capacity = mapped.len();
        device.unmap_buffer(buffer);
        return Err(DeviceError::TooSmall {
            needed: bytes.len(),
            capacity,
        });
    }
    mapped[..bytes.len()].copy_from_slice(bytes);
    device.unmap_buffer(buffer);
    Ok(())
}
