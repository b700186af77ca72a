use crate::core::color::BLACK;
use crate::pipeline::device::{NormalSource, Primitive, RenderDevice};
use crate::scene::graph::SceneGraph;
use log::trace;
use nalgebra::Vector3;

/// Issues the per-frame draw sequence for a scene through a [`RenderDevice`].
///
/// `render` takes `&mut self`, so a frame always finishes before the next one starts.
pub struct Renderer<D: RenderDevice> {
    device: D,
    frames: u64,
}

impl<D: RenderDevice> Renderer<D> {
    pub fn new(device: D) -> Self {
        Self { device, frames: 0 }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Draws one frame.
    ///
    /// The eye is re-derived from the orbit before the view matrix is built, so any
    /// direct edit of `eye.x`/`eye.z` since the last frame is overwritten here.
    pub fn render(&mut self, scene: &mut SceneGraph) {
        self.device.clear();

        let (camera, models) = scene.split_mut();

        let projection = camera.update_projection();
        self.device.set_projection(&projection);

        camera.apply_orbit();
        let view = camera.look_at();

        for model in models.iter_mut() {
            model.compute_matrices(&view);

            self.device.set_model_view(model.model_view_matrix());
            self.device.set_normal_matrix(model.normal_matrix());
            self.device.set_color(&model.color);

            let style = model.fill_style;
            if style.has_fill() {
                self.device.set_normal_source(NormalSource::Buffer);
                self.device.draw_indexed(
                    model.buffer(),
                    Primitive::Triangles,
                    model.triangle_index_count(),
                );
            }
            if style.has_wireframe() {
                // Edges are unlit black regardless of the model color.
                self.device
                    .set_normal_source(NormalSource::Constant(Vector3::zeros()));
                self.device.set_color(&BLACK);
                self.device
                    .draw_indexed(model.buffer(), Primitive::Lines, model.line_index_count());
            }
        }

        self.frames += 1;
        trace!("Frame {} rendered ({} models)", self.frames, models.len());
    }
}
