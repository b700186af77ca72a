use crate::error::Result;
use crate::io::config::Config;
use crate::pipeline::device::RenderDevice;
use crate::pipeline::renderer::Renderer;
use crate::scene::animation::{AnimationDriver, Animator};
use crate::scene::camera::Camera;
use crate::scene::graph::SceneGraph;
use crate::scene::primitives::{GeometryProvider, PrimitiveRegistry};
use crate::sketches::SketchKind;
use crate::ui::input::{Dispatch, InputController, KeyEvent};
use log::info;
use std::time::Duration;

/// Single owner of all mutable sketch state.
///
/// Every trigger (start, key press, timer tick) runs to completion and ends in a
/// render, so the renderer never sees a half-applied change.
pub struct Session<D: RenderDevice> {
    sketch: SketchKind,
    scene: SceneGraph,
    renderer: Renderer<D>,
    input: InputController,
    driver: AnimationDriver,
    animator: Box<dyn Animator>,
}

impl<D: RenderDevice> Session<D> {
    /// Builds the configured sketch with the built-in primitives and renders once.
    pub fn start(device: D, config: &Config) -> Result<Self> {
        Self::start_with_provider(device, config, &PrimitiveRegistry::builtin())
    }

    pub fn start_with_provider(
        mut device: D,
        config: &Config,
        provider: &dyn GeometryProvider,
    ) -> Result<Self> {
        let sketch = config.sketch;
        let (width, height) = device.viewport();

        let mut camera = Camera::new(width as f32 / height.max(1) as f32);
        camera.orbit_distance = sketch.orbit_distance();
        config.camera.apply(&mut camera);

        let mut scene = SceneGraph::new(camera);
        let animator = sketch.build(&mut scene, provider, &mut device, config.animation.seed)?;

        let input = InputController::new(config.input.apply(sketch.key_bindings())?);

        let mut driver = AnimationDriver::new(config.animation.period());
        driver.set_enabled(config.animation.start_enabled);

        info!(
            "Starting '{}' sketch: {}x{} viewport, {} models",
            sketch,
            width,
            height,
            scene.len()
        );

        let mut session = Self {
            sketch,
            scene,
            renderer: Renderer::new(device),
            input,
            driver,
            animator,
        };
        session.render();
        Ok(session)
    }

    /// Applies a key event and renders, whether or not the key was bound.
    pub fn handle_key(&mut self, event: KeyEvent) -> Dispatch {
        let dispatch = self
            .input
            .handle(event, self.scene.camera_mut(), &mut self.driver);
        self.render();
        dispatch
    }

    /// Feeds elapsed time to the animation timer and runs every due tick.
    /// Returns the number of frames rendered.
    pub fn advance(&mut self, delta: Duration) -> usize {
        let due = self.driver.advance(delta);
        (0..due).filter(|_| self.tick()).count()
    }

    /// One timer tick; renders only if the tick changed the scene.
    pub fn tick(&mut self) -> bool {
        let changed = self.driver.tick(&mut self.scene, self.animator.as_mut());
        if changed {
            self.render();
        }
        changed
    }

    /// Enables or pauses animation without a key press (headless runs).
    pub fn set_animation_enabled(&mut self, enabled: bool) {
        self.driver.set_enabled(enabled);
    }

    pub fn render(&mut self) {
        self.renderer.render(&mut self.scene);
    }

    pub fn sketch(&self) -> SketchKind {
        self.sketch
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn device(&self) -> &D {
        self.renderer.device()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.renderer.frames_rendered()
    }
}
