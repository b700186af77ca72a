use crate::scene::camera::Camera;
use crate::scene::model::Model;

/// Position of a model in its [`SceneGraph`]. Only the graph that returned it
/// can resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(usize);

/// Flat, insertion-ordered model list plus the one camera.
///
/// Models are appended during setup and never removed, so handles stay valid for
/// the life of the graph.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    camera: Camera,
    models: Vec<Model>,
}

impl SceneGraph {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            models: Vec::new(),
        }
    }

    pub fn add_model(&mut self, model: Model) -> ModelHandle {
        self.models.push(model);
        ModelHandle(self.models.len() - 1)
    }

    pub fn model(&self, handle: ModelHandle) -> &Model {
        &self.models[handle.0]
    }

    pub fn model_mut(&mut self, handle: ModelHandle) -> &mut Model {
        &mut self.models[handle.0]
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [Model] {
        &mut self.models
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Camera and models borrowed mutably at once, for the draw traversal.
    pub fn split_mut(&mut self) -> (&mut Camera, &mut [Model]) {
        (&mut self.camera, &mut self.models)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
