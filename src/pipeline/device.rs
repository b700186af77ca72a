use crate::core::geometry::GeometryData;
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// Opaque reference to geometry uploaded to a [`RenderDevice`].
/// Buffers are immutable once uploaded and live as long as the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which index list of an uploaded buffer a draw consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

/// Where the normal attribute comes from for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalSource {
    /// The per-vertex normal stream of the bound buffer.
    Buffer,
    /// One value for every vertex, with the stream disabled.
    Constant(Vector3<f32>),
}

/// The GPU-facing half of the pipeline.
///
/// Uniform setters update state that applies to every following draw, mirroring a
/// fixed shader program with four uniforms (projection, model-view, normal matrix,
/// color) and two vertex streams (position, normal). Calls are assumed to succeed
/// once the device exists.
pub trait RenderDevice {
    /// Viewport size in pixels, fixed for the lifetime of the device.
    fn viewport(&self) -> (usize, usize);

    fn upload(&mut self, geometry: &GeometryData) -> BufferHandle;

    /// Clears color and depth.
    fn clear(&mut self);

    fn set_projection(&mut self, projection: &Matrix4<f32>);

    fn set_model_view(&mut self, model_view: &Matrix4<f32>);

    fn set_normal_matrix(&mut self, normal: &Matrix3<f32>);

    fn set_color(&mut self, color: &Vector4<f32>);

    fn set_normal_source(&mut self, source: NormalSource);

    /// Draws the first `count` indices of the chosen index list.
    fn draw_indexed(&mut self, buffer: BufferHandle, primitive: Primitive, count: usize);
}
