//! Device buffers that only ever grow.

use bytemuck::Pod;

use super::{upload, BufferDescriptor, BufferHandle, DeviceError, GraphicsDevice};
use crate::config::BufferGrowth;
use crate::error::{RenderError, RenderResult};

/// A structured buffer that is created lazily and replaced by a larger one
/// when the data outgrows it. Capacity never shrinks.
#[derive(Debug)]
pub struct GrowableBuffer {
    /// Debug label passed to the device.
    label: &'static str,
    /// Element size in bytes.
    stride: u32,
    /// Live handle, if created.
    handle: Option<BufferHandle>,
    /// Element capacity of the live handle.
    capacity: usize,
    /// Number of device allocations made so far.
    allocations: u32,
}

impl GrowableBuffer {
    /// Creates an unallocated buffer for elements of `stride` bytes.
    #[must_use]
    pub const fn new(label: &'static str, stride: u32) -> Self {
        Self {
            label,
            stride,
            handle: None,
            capacity: 0,
            allocations: 0,
        }
    }

    /// Creates an unallocated buffer for elements of type `T`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_type<T: Pod>(label: &'static str) -> Self {
        Self::new(label, std::mem::size_of::<T>() as u32)
    }

    /// Live handle, if the buffer has been created.
    #[must_use]
    pub const fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    /// Element capacity of the live handle (0 before creation).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of device allocations made so far.
    #[must_use]
    pub const fn allocations(&self) -> u32 {
        self.allocations
    }

    /// Makes sure the buffer holds at least `required` elements.
    ///
    /// Returns `true` when a new device buffer was created. On failure the
    /// previous handle stays live.
    ///
    /// # Errors
    ///
    /// [`RenderError::BufferCreate`] if the device refuses the allocation.
    pub fn ensure_capacity<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        required: usize,
        growth: BufferGrowth,
        minimum: usize,
    ) -> RenderResult<bool> {
        if self.handle.is_some() && required <= self.capacity {
            return Ok(false);
        }

        let capacity = growth.capacity_for(required, minimum).max(self.capacity);
        let count = u32::try_from(capacity).map_err(|_| RenderError::BufferCreate {
            label: self.label,
            reason: DeviceError::CreateFailed(format!("{capacity} elements exceed u32")),
        })?;
        let descriptor = BufferDescriptor::structured(self.label, self.stride, count);
        let handle = device
            .create_buffer(&descriptor)
            .map_err(|reason| RenderError::BufferCreate {
                label: self.label,
                reason,
            })?;

        if let Some(previous) = self.handle.replace(handle) {
            device.release_buffer(previous);
        }
        tracing::debug!(
            "Buffer '{}' grown from {} to {} elements",
            self.label,
            self.capacity,
            capacity
        );
        self.capacity = capacity;
        self.allocations += 1;
        Ok(true)
    }

    /// Grows if needed, then writes `data` to the start of the buffer.
    ///
    /// Empty `data` still creates the buffer so it can be bound.
    ///
    /// # Errors
    ///
    /// [`RenderError::BufferCreate`] or [`RenderError::BufferMap`].
    pub fn upload<D: GraphicsDevice + ?Sized, T: Pod>(
        &mut self,
        device: &mut D,
        data: &[T],
        growth: BufferGrowth,
        minimum: usize,
    ) -> RenderResult<bool> {
        let grew = self.ensure_capacity(device, data.len(), growth, minimum)?;
        if data.is_empty() {
            return Ok(grew);
        }
        let Some(handle) = self.handle else {
            return Ok(grew);
        };
        upload(device, handle, bytemuck::cast_slice(data)).map_err(|reason| {
            RenderError::BufferMap {
                label: self.label,
                reason,
            }
        })?;
        Ok(grew)
    }
}
