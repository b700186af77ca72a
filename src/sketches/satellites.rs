use crate::error::Result;
use crate::pipeline::device::RenderDevice;
use crate::scene::animation::{Animator, Tick};
use crate::scene::graph::{ModelHandle, SceneGraph};
use crate::scene::model::{FillStyle, Model, ModelDesc};
use crate::scene::primitives::{GeometryKind, GeometryProvider};
use nalgebra::Vector3;

const SATELLITE_SCALE: f32 = 0.5;
/// Offset of each orbit centre from the torus.
const ORBIT_OFFSET: f32 = 1.3;

/// A white torus tumbling about X while four spheres circle it on tilted orbits.
#[derive(Debug, Clone)]
pub struct Satellites {
    torus: ModelHandle,
    light_blue: ModelHandle,
    pink: ModelHandle,
    blue: ModelHandle,
    yellow: ModelHandle,
}

impl Satellites {
    pub fn build<D: RenderDevice>(
        scene: &mut SceneGraph,
        provider: &dyn GeometryProvider,
        device: &mut D,
    ) -> Result<Self> {
        let mut add = |desc: ModelDesc| -> Result<ModelHandle> {
            Ok(scene.add_model(Model::create(&desc, provider, device)?))
        };

        let torus = add(ModelDesc::new(GeometryKind::Torus, FillStyle::Fill, [1.0, 1.0, 1.0, 1.0]))?;
        add(ModelDesc::new(GeometryKind::Plane, FillStyle::Wireframe, [1.0, 1.0, 1.0, 1.0])
            .translate(0.0, -1.0, 0.0))?;

        let satellite = |color: [f32; 4], x: f32, z: f32| {
            ModelDesc::new(GeometryKind::Sphere, FillStyle::Fill, color)
                .translate(x, 0.0, z)
                .uniform_scale(SATELLITE_SCALE)
        };
        let light_blue = add(satellite([0.0, 1.0, 1.0, 1.0], 1.0, -1.0))?;
        let pink = add(satellite([1.0, 0.0, 1.0, 1.0], -1.0, -1.0))?;
        let blue = add(satellite([0.0, 0.0, 1.0, 1.0], 1.0, 1.0))?;
        let yellow = add(satellite([1.0, 1.0, 0.0, 1.0], -1.0, 1.0))?;

        let satellites = Self {
            torus,
            light_blue,
            pink,
            blue,
            yellow,
        };
        satellites.place(scene, 0.0);
        Ok(satellites)
    }

    pub fn torus(&self) -> ModelHandle {
        self.torus
    }

    /// Handles in the order light blue, pink, blue, yellow.
    pub fn satellites(&self) -> [ModelHandle; 4] {
        [self.light_blue, self.pink, self.blue, self.yellow]
    }

    /// Puts every satellite at its orbit position for `angle`.
    fn place(&self, scene: &mut SceneGraph, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let r = ORBIT_OFFSET + cos;

        scene.model_mut(self.blue).set_translate(Vector3::new(r, 0.0, -sin));
        scene.model_mut(self.light_blue).set_translate(Vector3::new(0.0, r, -2.0 * sin));
        scene.model_mut(self.pink).set_translate(Vector3::new(0.0, -r, 2.0 * sin));
        scene.model_mut(self.yellow).set_translate(Vector3::new(-r, 0.0, sin));
    }
}

impl Animator for Satellites {
    fn animate(&mut self, scene: &mut SceneGraph, tick: Tick) {
        scene.model_mut(self.torus).rotate.x += tick.step;
        self.place(scene, tick.angle);
    }
}
