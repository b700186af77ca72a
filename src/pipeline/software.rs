use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::GeometryData;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::error::{Result, SketchError};
use crate::pipeline::device::{BufferHandle, NormalSource, Primitive, RenderDevice};
use crate::pipeline::shaders::FlatShader;
use log::{debug, warn};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use rayon::prelude::*;

/// Uniform state shared by every draw until overwritten.
#[derive(Debug, Clone)]
struct Uniforms {
    projection: Matrix4<f32>,
    model_view: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,
    color: Vector4<f32>,
    normal_source: NormalSource,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            projection: Matrix4::identity(),
            model_view: Matrix4::identity(),
            normal_matrix: Matrix3::identity(),
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            normal_source: NormalSource::Buffer,
        }
    }
}

/// CPU implementation of [`RenderDevice`] drawing into a [`FrameBuffer`].
pub struct SoftwareDevice {
    buffers: Vec<GeometryData>,
    uniforms: Uniforms,
    clear_color: Vector3<f32>,
    framebuffer: FrameBuffer,
    rasterizer: Rasterizer,
}

impl SoftwareDevice {
    /// Creates a device with back-face culling on and no fill offset.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SketchError::Initialization(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }

        debug!("Software device created with a {width}x{height} viewport");
        Ok(Self {
            buffers: Vec::new(),
            uniforms: Uniforms::default(),
            clear_color: Vector3::new(0.95, 0.95, 0.95),
            framebuffer: FrameBuffer::new(width, height),
            rasterizer: Rasterizer::new(),
        })
    }

    /// Sets the clear color. Alpha is accepted for symmetry with the color
    /// uniform and ignored, since the framebuffer is opaque.
    pub fn with_clear_color(mut self, color: Vector4<f32>) -> Self {
        self.clear_color = color.xyz();
        self
    }

    pub fn with_back_face_culling(mut self, enabled: bool) -> Self {
        self.rasterizer
            .set_cull_mode(if enabled { CullMode::Back } else { CullMode::None });
        self
    }

    /// Depth bias added to filled triangles.
    pub fn with_polygon_offset(mut self, offset: f32) -> Self {
        self.rasterizer.depth_offset = offset;
        self
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    fn shader(&self) -> FlatShader {
        FlatShader::new(
            &self.uniforms.projection,
            &self.uniforms.model_view,
            self.uniforms.normal_matrix,
            self.uniforms.color,
        )
    }
}

impl RenderDevice for SoftwareDevice {
    fn viewport(&self) -> (usize, usize) {
        (self.framebuffer.width, self.framebuffer.height)
    }

    fn upload(&mut self, geometry: &GeometryData) -> BufferHandle {
        let handle = BufferHandle::new(self.buffers.len() as u32);
        self.buffers.push(geometry.clone());
        handle
    }

    fn clear(&mut self) {
        self.framebuffer.clear(self.clear_color, f32::INFINITY);
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.uniforms.projection = *projection;
    }

    fn set_model_view(&mut self, model_view: &Matrix4<f32>) {
        self.uniforms.model_view = *model_view;
    }

    fn set_normal_matrix(&mut self, normal: &Matrix3<f32>) {
        self.uniforms.normal_matrix = *normal;
    }

    fn set_color(&mut self, color: &Vector4<f32>) {
        self.uniforms.color = *color;
    }

    fn set_normal_source(&mut self, source: NormalSource) {
        self.uniforms.normal_source = source;
    }

    fn draw_indexed(&mut self, buffer: BufferHandle, primitive: Primitive, count: usize) {
        let shader = self.shader();
        let Some(geometry) = self.buffers.get(buffer.index()) else {
            warn!("Draw skipped: buffer {} was never uploaded", buffer.index());
            return;
        };

        // Vertex stage, once per vertex.
        let normal_source = self.uniforms.normal_source;
        let processed: Vec<_> = (0..geometry.vertex_count())
            .into_par_iter()
            .map(|i| {
                let normal = match normal_source {
                    NormalSource::Buffer => geometry.normal(i),
                    NormalSource::Constant(n) => n,
                };
                shader.vertex(&geometry.position(i), &normal)
            })
            .collect();

        match primitive {
            Primitive::Triangles => {
                let count = count.min(geometry.triangle_indices.len());
                for tri in geometry.triangle_indices[..count].chunks_exact(3) {
                    let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| processed[i as usize]);
                    self.rasterizer.rasterize_triangle(
                        &mut self.framebuffer,
                        &shader,
                        &[a.0, b.0, c.0],
                        &[a.1, b.1, c.1],
                    );
                }
            }
            Primitive::Lines => {
                let count = count.min(geometry.line_indices.len());
                for line in geometry.line_indices[..count].chunks_exact(2) {
                    let a = processed[line[0] as usize];
                    let b = processed[line[1] as usize];
                    self.rasterizer.rasterize_line(
                        &mut self.framebuffer,
                        &shader,
                        &[a.0, b.0],
                        &[a.1, b.1],
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn quad() -> GeometryData {
        let mut g = GeometryData::default();
        for (x, y) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            g.push_vertex(Point3::new(x, y, 0.0), Vector3::z());
        }
        g.triangle_indices = vec![0, 1, 2, 0, 2, 3];
        g.line_indices = vec![0, 1, 1, 2, 2, 3, 3, 0];
        g
    }

    #[test]
    fn zero_viewport_fails() {
        assert!(matches!(
            SoftwareDevice::new(0, 10),
            Err(SketchError::Initialization(_))
        ));
    }

    #[test]
    fn clear_then_fill_with_uniform_color() {
        let mut device = SoftwareDevice::new(20, 20).unwrap();
        let handle = device.upload(&quad());

        device.clear();
        assert_eq!(
            device.framebuffer().get_pixel(10, 10),
            Some(Vector3::new(0.95, 0.95, 0.95))
        );

        device.set_color(&Vector4::new(0.0, 0.0, 1.0, 1.0));
        device.draw_indexed(handle, Primitive::Triangles, 6);
        assert_eq!(device.framebuffer().get_pixel(10, 10), Some(Vector3::z()));
        assert_eq!(
            device.framebuffer().get_pixel(1, 1),
            Some(Vector3::new(0.95, 0.95, 0.95))
        );
    }

    #[test]
    fn partial_count_draws_first_triangle_only() {
        let mut device = SoftwareDevice::new(20, 20).unwrap();
        let handle = device.upload(&quad());
        device.clear();
        device.set_color(&Vector4::new(1.0, 0.0, 0.0, 1.0));
        device.draw_indexed(handle, Primitive::Triangles, 3);

        // Lower right half belongs to the first triangle (0, 1, 2).
        assert_eq!(device.framebuffer().get_pixel(13, 13), Some(Vector3::x()));
        assert_eq!(
            device.framebuffer().get_pixel(7, 7),
            Some(Vector3::new(0.95, 0.95, 0.95))
        );
    }

    #[test]
    fn unknown_buffer_is_ignored() {
        let mut device = SoftwareDevice::new(4, 4).unwrap();
        device.clear();
        device.draw_indexed(BufferHandle::new(7), Primitive::Lines, 2);
        assert_eq!(
            device.framebuffer().get_pixel(2, 2),
            Some(Vector3::new(0.95, 0.95, 0.95))
        );
    }
}
