//! Growable per-type light collections backed by a GPU buffer.

use bytemuck::Pod;

use crate::config::BufferGrowth;
use crate::device::{BufferHandle, GraphicsDevice, GrowableBuffer};
use crate::error::RenderResult;

/// A GPU light record type.
pub trait LightRecord: Pod + Send + Sync + 'static {
    /// Label of the backing buffer.
    const LABEL: &'static str;
}

/// Light records for one frame plus the buffer they are uploaded into.
///
/// Records are cleared at the start of each gather and only appended to
/// afterwards. The backing buffer is created on first upload and replaced
/// only when the record count exceeds its capacity.
#[derive(Debug)]
pub struct LightCollection<T: LightRecord> {
    /// This frame's records.
    records: Vec<T>,
    /// Backing buffer.
    buffer: GrowableBuffer,
}

impl<T: LightRecord> LightCollection<T> {
    /// Creates an empty collection with no buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            buffer: GrowableBuffer::for_type::<T>(T::LABEL),
        }
    }

    /// Drops this frame's records, keeping the allocation and the buffer.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Appends a record and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, record: T) -> u32 {
        let index = self.records.len() as u32;
        self.records.push(record);
        index
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// This frame's records.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Backing buffer handle, if created.
    #[must_use]
    pub fn buffer(&self) -> Option<BufferHandle> {
        self.buffer.handle()
    }

    /// Element capacity of the backing buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of device allocations made for the backing buffer.
    #[must_use]
    pub fn allocations(&self) -> u32 {
        self.buffer.allocations()
    }

    /// Creates or grows the backing buffer to fit the current records.
    ///
    /// # Errors
    ///
    /// [`crate::RenderError::BufferCreate`] if the device refuses.
    pub fn create_buffer<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        growth: BufferGrowth,
        minimum: usize,
    ) -> RenderResult<bool> {
        self.buffer
            .ensure_capacity(device, self.records.len(), growth, minimum)
    }

    /// Creates or grows the backing buffer, then uploads the records.
    ///
    /// # Errors
    ///
    /// [`crate::RenderError::BufferCreate`] or [`crate::RenderError::BufferMap`].
    pub fn update_buffer<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        growth: BufferGrowth,
        minimum: usize,
    ) -> RenderResult<bool> {
        self.buffer.upload(device, &self.records, growth, minimum)
    }
}

impl<T: LightRecord> Default for LightCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}
