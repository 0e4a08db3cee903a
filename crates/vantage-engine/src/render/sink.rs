use std::sync::Arc;

use glam::Mat4;

use super::error::SinkError;

/// Size in bytes of a column-major `mat4x4<f32>`.
pub const MAT4_SIZE: wgpu::BufferAddress = std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress;

/// Destination for a render object's matrix.
///
/// Writes are synchronous and only ever issued from the render thread.
pub trait MatrixSink: Send + Sync {
    fn write(&self, matrix: &Mat4) -> Result<(), SinkError>;
}

/// A 64-byte uniform buffer slot written through the queue.
///
/// The write lands before the next submitted command buffer, which is what
/// the draw phase records into.
#[derive(Clone)]
pub struct UniformSlot {
    label: &'static str,
    queue: Arc<wgpu::Queue>,
    buffer: Arc<wgpu::Buffer>,
}

impl UniformSlot {
    pub fn new(label: &'static str, queue: Arc<wgpu::Queue>, buffer: Arc<wgpu::Buffer>) -> Self {
        Self {
            label,
            queue,
            buffer,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl MatrixSink for UniformSlot {
    fn write(&self, matrix: &Mat4) -> Result<(), SinkError> {
        if self.buffer.size() < MAT4_SIZE {
            return Err(SinkError::Rejected(format!(
                "uniform `{}` is {} bytes, need {MAT4_SIZE}",
                self.label,
                self.buffer.size()
            )));
        }

        let cols = matrix.to_cols_array();
        self.queue
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(&cols));
        Ok(())
    }
}

impl<S: MatrixSink + ?Sized> MatrixSink for Arc<S> {
    fn write(&self, matrix: &Mat4) -> Result<(), SinkError> {
        (**self).write(matrix)
    }
}
