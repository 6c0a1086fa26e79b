//! Headless graphics device.
//!
//! Keeps buffer contents in memory and records every command, so a whole
//! frame can run without a GPU and be inspected afterwards.

use std::collections::{HashMap, HashSet};

use bytemuck::Pod;

use super::{
    BufferDescriptor, BufferHandle, DeviceError, DeviceResult, GraphicsDevice, Stage,
    TargetHandle,
};

/// A command issued to a [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// A buffer was created.
    CreateBuffer {
        /// New handle.
        buffer: BufferHandle,
        /// Debug label.
        label: &'static str,
        /// Size in bytes.
        size: usize,
    },
    /// A buffer was released.
    ReleaseBuffer(BufferHandle),
    /// A buffer was mapped.
    Map(BufferHandle),
    /// A buffer was unmapped.
    Unmap(BufferHandle),
    /// Constant buffers were bound.
    SetConstantBuffers {
        /// Stage.
        stage: Stage,
        /// First slot.
        first_slot: u32,
        /// Bound buffers.
        buffers: Vec<Option<BufferHandle>>,
    },
    /// Buffer resources were bound.
    SetResources {
        /// Stage.
        stage: Stage,
        /// First slot.
        first_slot: u32,
        /// Bound resources.
        resources: Vec<Option<BufferHandle>>,
    },
    /// A texture was bound.
    SetTexture {
        /// Stage.
        stage: Stage,
        /// Slot.
        slot: u32,
        /// Bound texture.
        texture: Option<TargetHandle>,
    },
    /// The render target changed.
    SetRenderTarget(Option<TargetHandle>),
    /// Non-indexed primitives were drawn.
    DrawPrimitive {
        /// Vertex count.
        vertex_count: u32,
        /// First vertex.
        first_vertex: u32,
    },
    /// Indexed, instanced geometry was drawn.
    DrawIndexedInstanced {
        /// Index count.
        index_count: u32,
        /// Instance count.
        instance_count: u32,
    },
    /// A compute dispatch.
    Dispatch([u32; 3]),
}

/// Storage behind one buffer handle.
#[derive(Debug)]
struct HeadlessBuffer {
    /// Creation parameters.
    descriptor: BufferDescriptor,
    /// Contents.
    data: Vec<u8>,
}

/// In-memory [`GraphicsDevice`] that records every command.
#[derive(Debug)]
pub struct HeadlessDevice {
    /// Live buffers.
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    /// Next handle id.
    next_id: u32,
    /// Command log.
    commands: Vec<DeviceCommand>,
    /// Fail the next `create_buffer` call.
    fail_next_create: bool,
    /// Buffer labels whose maps fail.
    failing_maps: HashSet<&'static str>,
    /// Internal color buffer.
    screen: TargetHandle,
}

impl HeadlessDevice {
    /// Creates an empty device.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_id: 1,
            commands: Vec::with_capacity(256),
            fail_next_create: false,
            failing_maps: HashSet::new(),
            screen: TargetHandle(0),
        }
    }

    /// Recorded commands, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Returns and clears the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of live buffers.
    #[must_use]
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Raw contents of a live buffer.
    #[must_use]
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.data.as_slice())
    }

    /// Creation parameters of a live buffer.
    #[must_use]
    pub fn buffer_descriptor(&self, buffer: BufferHandle) -> Option<BufferDescriptor> {
        self.buffers.get(&buffer).map(|b| b.descriptor)
    }

    /// Contents of a live buffer reinterpreted as `T` elements.
    #[must_use]
    pub fn read_buffer<T: Pod>(&self, buffer: BufferHandle) -> Option<Vec<T>> {
        self.buffer_data(buffer).map(|data| {
            data.chunks_exact(std::mem::size_of::<T>())
                .map(bytemuck::pod_read_unaligned)
                .collect()
        })
    }

    /// Makes the next `create_buffer` call fail.
    pub fn fail_next_create(&mut self) {
        self.fail_next_create = true;
    }

    /// Makes every map of buffers labelled `label` fail until cleared.
    pub fn fail_maps_for(&mut self, label: &'static str) {
        self.failing_maps.insert(label);
    }

    /// Clears all injected failures.
    pub fn clear_failures(&mut self) {
        self.fail_next_create = false;
        self.failing_maps.clear();
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> DeviceResult<BufferHandle> {
        if std::mem::take(&mut self.fail_next_create) {
            return Err(DeviceError::CreateFailed(format!(
                "injected failure for '{}'",
                descriptor.label
            )));
        }

        let buffer = BufferHandle(self.next_id);
        self.next_id += 1;
        let size = descriptor.size();
        self.buffers.insert(
            buffer,
            HeadlessBuffer {
                descriptor: *descriptor,
                data: vec![0; size],
            },
        );
        self.commands.push(DeviceCommand::CreateBuffer {
            buffer,
            label: descriptor.label,
            size,
        });
        Ok(buffer)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_some() {
            self.commands.push(DeviceCommand::ReleaseBuffer(buffer));
        }
    }

    fn map_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<&mut [u8]> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(DeviceError::UnknownBuffer(buffer))?;
        if self.failing_maps.contains(entry.descriptor.label) {
            return Err(DeviceError::MapFailed(format!(
                "injected failure for '{}'",
                entry.descriptor.label
            )));
        }
        self.commands.push(DeviceCommand::Map(buffer));
        Ok(entry.data.as_mut_slice())
    }

    fn unmap_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(DeviceCommand::Unmap(buffer));
    }

    fn set_constant_buffers(
        &mut self,
        stage: Stage,
        first_slot: u32,
        buffers: &[Option<BufferHandle>],
    ) {
        self.commands.push(DeviceCommand::SetConstantBuffers {
            stage,
            first_slot,
            buffers: buffers.to_vec(),
        });
    }

    fn set_resources(&mut self, stage: Stage, first_slot: u32, resources: &[Option<BufferHandle>]) {
        self.commands.push(DeviceCommand::SetResources {
            stage,
            first_slot,
            resources: resources.to_vec(),
        });
    }

    fn set_texture(&mut self, stage: Stage, slot: u32, texture: Option<TargetHandle>) {
        self.commands.push(DeviceCommand::SetTexture {
            stage,
            slot,
            texture,
        });
    }

    fn set_render_target(&mut self, target: Option<TargetHandle>) {
        self.commands.push(DeviceCommand::SetRenderTarget(target));
    }

    fn draw_primitive(&mut self, vertex_count: u32, first_vertex: u32) {
        self.commands.push(DeviceCommand::DrawPrimitive {
            vertex_count,
            first_vertex,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        _first_index: u32,
        _base_vertex: i32,
        _first_instance: u32,
    ) {
        self.commands.push(DeviceCommand::DrawIndexedInstanced {
            index_count,
            instance_count,
        });
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.commands.push(DeviceCommand::Dispatch([x, y, z]));
    }

    fn screen_target(&self) -> TargetHandle {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::upload;

    #[test]
    fn test_upload_roundtrip_and_log() {
        let mut device = HeadlessDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor::structured("lights", 4, 4))
            .unwrap();

        upload(&mut device, buffer, bytemuck::cast_slice(&[5u32, 6])).unwrap();
        assert_eq!(device.read_buffer::<u32>(buffer).unwrap(), vec![5, 6, 0, 0]);
        assert!(device.commands().contains(&DeviceCommand::Map(buffer)));
        assert!(device.commands().contains(&DeviceCommand::Unmap(buffer)));
    }

    #[test]
    fn test_read_buffer_as_records() {
        let mut device = HeadlessDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor::structured("records", 8, 3))
            .unwrap();
        upload(&mut device, buffer, bytemuck::cast_slice(&[[1.5f32, -2.0], [4.0, 8.0]])).unwrap();

        let records = device.read_buffer::<[f32; 2]>(buffer).unwrap();
        assert_eq!(records, vec![[1.5, -2.0], [4.0, 8.0], [0.0, 0.0]]);
        assert_eq!(device.read_buffer::<u32>(BufferHandle(999)), None);
    }

    #[test]
    fn test_upload_too_large() {
        let mut device = HeadlessDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor::structured("lights", 4, 1))
            .unwrap();
        let result = upload(&mut device, buffer, &[0u8; 8]);
        assert_eq!(
            result,
            Err(DeviceError::TooSmall {
                needed: 8,
                capacity: 4
            })
        );
    }

    #[test]
    fn test_injected_map_failure() {
        let mut device = HeadlessDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor::structured("tiles", 8, 2))
            .unwrap();
        device.fail_maps_for("tiles");
        assert!(matches!(
            device.map_buffer(buffer),
            Err(DeviceError::MapFailed(_))
        ));

        device.clear_failures();
        assert!(device.map_buffer(buffer).is_ok());
    }
}
