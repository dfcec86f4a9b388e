use std::marker::PhantomData;
use std::mem;
use crate::error::ReadbackError;
use crate::renderer::wgpu_context::WgpuContext;
use wgpu::{util::DeviceExt, Buffer};

/// A fixed-length GPU buffer of `T` elements.
#[derive(Debug)]
pub struct GpuBuffer<T> {
    buffer: wgpu::Buffer,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> GpuBuffer<T> {
    /// Creates the buffer with its initial contents already in place.
    pub fn new(wgpu_context: &WgpuContext, label: &str, data: &[T], usage: wgpu::BufferUsages) -> Self {
        let buffer = wgpu_context.get_device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: usage | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        });

        Self { buffer, len: data.len(), _marker: PhantomData }
    }

    /// Creates a buffer for `len` elements without writing anything into it.
    pub fn uninitialized(wgpu_context: &WgpuContext, label: &str, len: usize, usage: wgpu::BufferUsages) -> Self {
        let buffer = wgpu_context.get_device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: Self::bytes_for(len),
            usage: usage | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        Self { buffer, len, _marker: PhantomData }
    }

    pub fn bytes_for(len: usize) -> u64 {
        len as u64 * mem::size_of::<T>() as u64
    }

    /// Overwrites the start of the buffer with `data`.
    pub fn write(&self, wgpu_context: &WgpuContext, data: &[T]) {
        debug_assert!(data.len() <= self.len);
        wgpu_context.get_queue().write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }

    /// Downloads the buffer contents to the CPU.
    ///
    /// Blocks until every submitted command has finished, so this is meant for
    /// diagnostics and tests, never for the frame loop.
    pub fn download(&self, wgpu_context: &WgpuContext) -> Result<Vec<T>, ReadbackError> {
        let device = wgpu_context.get_device();
        let queue = wgpu_context.get_queue();

        let size = Self::bytes_for(self.len);
        if size == 0 {
            return Ok(Vec::new());
        }

        // The CPU can only map buffers created with MAP_READ, copy into one first
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer (Download)"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Download Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, size);
        queue.submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        device.poll(wgpu::wgt::PollType::Wait).map_err(ReadbackError::Poll)?;

        receiver.recv().map_err(|_| ReadbackError::Disconnected)??;

        // Copy through a byte view of the output, the mapping may be less aligned than `T`
        let mut downloaded = vec![T::zeroed(); self.len];
        let mapped_range = buffer_slice.get_mapped_range();
        bytemuck::cast_slice_mut::<T, u8>(&mut downloaded).copy_from_slice(&mapped_range[..]);
        drop(mapped_range);
        staging_buffer.unmap();

        Ok(downloaded)
    }

    pub fn size_bytes(&self) -> u64 {
        self.buffer.size()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn byte_sizes_are_computed_in_64_bits() {
        assert_eq!(GpuBuffer::<Vec4>::bytes_for(0), 0);
        assert_eq!(GpuBuffer::<Vec4>::bytes_for(50_000), 800_000);
        // 2^28 particles of 16 bytes no longer fit a 32-bit usize
        assert_eq!(GpuBuffer::<Vec4>::bytes_for(1 << 28), 1u64 << 32);
        assert_eq!(GpuBuffer::<[u8; 4]>::bytes_for(u32::MAX as usize), 4 * u64::from(u32::MAX));
    }
}
