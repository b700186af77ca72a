use crate::error::Result;
use crate::pipeline::device::RenderDevice;
use crate::scene::animation::{Animator, Tick};
use crate::scene::graph::{ModelHandle, SceneGraph};
use crate::scene::model::{FillStyle, Model, ModelDesc};
use crate::scene::primitives::{GeometryKind, GeometryProvider};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

const TORUS_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
const NUCLEUS_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// (translate, scale) of each atom, with its spin rate per tick.
const ATOMS: [([f32; 3], f32, f32); 5] = [
    ([0.0, 0.5, 1.0], 0.7, PI / 36.0),
    ([1.5, -0.5, 0.0], 0.5, PI / 12.0),
    ([2.5, -1.5, -1.0], 0.4, PI / 18.0),
    ([-1.5, -0.5, 0.0], 0.5, PI / 24.0),
    ([-2.5, -1.5, -1.0], 0.4, PI / 45.0),
];

/// Initial Z rotation of the three electron rings.
const RING_TILTS: [f32; 3] = [PI / 5.0, PI / 2.0, 4.0 * PI / 5.0];

/// Nucleus particle offsets and their scale relative to the atom.
const NUCLEUS: [([f32; 3], f32); 13] = [
    ([0.0, 0.0, 0.0], 1.0),
    ([0.0, 0.15, 0.0], 0.8),
    ([0.0, -0.15, 0.0], 0.8),
    ([0.0, 0.15, 0.1], 0.8),
    ([0.0, -0.15, 0.1], 1.0),
    ([0.0, 0.15, -0.1], 0.8),
    ([0.0, -0.15, -0.1], 0.8),
    ([0.15, 0.1, 0.0], 1.0),
    ([0.15, -0.1, 0.1], 0.8),
    ([0.15, -0.1, -0.1], 0.8),
    ([-0.15, -0.1, 0.1], 1.0),
    ([-0.15, -0.1, -0.1], 0.8),
    ([-0.15, 0.1, 0.0], 0.8),
];

const RAIN_DROPS: usize = 20;
const RAIN_SCALE: [f32; 3] = [0.05, 0.2, 0.05];
pub const RAIN_TOP: f32 = 2.0;
pub const RAIN_BOTTOM: f32 = -2.0;
pub const RAIN_SPEED: f32 = 0.09;

#[derive(Debug, Clone)]
struct Atom {
    rings: [ModelHandle; 3],
    rate: f32,
}

/// Five atoms with spinning electron rings, and teardrops falling in a loop.
#[derive(Debug, Clone)]
pub struct Atoms {
    atoms: Vec<Atom>,
    rain: Vec<ModelHandle>,
}

impl Atoms {
    pub fn build<D: RenderDevice>(
        scene: &mut SceneGraph,
        provider: &dyn GeometryProvider,
        device: &mut D,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut add = |desc: ModelDesc| -> Result<ModelHandle> {
            Ok(scene.add_model(Model::create(&desc, provider, device)?))
        };

        let mut atoms = Vec::with_capacity(ATOMS.len());
        for ([x, y, z], scale, rate) in ATOMS {
            let mut rings = Vec::with_capacity(3);
            for tilt in RING_TILTS {
                rings.push(add(ModelDesc::new(GeometryKind::Torus, FillStyle::Fill, TORUS_COLOR)
                    .translate(x, y, z)
                    .rotate(0.0, 0.0, tilt)
                    .uniform_scale(scale))?);
            }
            for ([dx, dy, dz], relative) in NUCLEUS {
                add(ModelDesc::new(GeometryKind::Sphere, FillStyle::Fill, NUCLEUS_COLOR)
                    .translate(x + dx, y + dy, z + dz)
                    .uniform_scale(relative * scale))?;
            }
            atoms.push(Atom {
                rings: [rings[0], rings[1], rings[2]],
                rate,
            });
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut rain = Vec::with_capacity(RAIN_DROPS);
        for _ in 0..RAIN_DROPS {
            let x = rng.random_range(-5.0..5.0);
            let y = rng.random_range(RAIN_BOTTOM..RAIN_TOP);
            let z = rng.random_range(-2.0..2.0);
            let [sx, sy, sz] = RAIN_SCALE;
            rain.push(add(ModelDesc::new(GeometryKind::Teardrop, FillStyle::Fill, TORUS_COLOR)
                .translate(x, y, z)
                .scale(sx, sy, sz))?);
        }

        debug!("Atoms sketch: {} atoms, {} rain drops", atoms.len(), rain.len());
        Ok(Self { atoms, rain })
    }

    /// Ring handles of every atom, in build order.
    pub fn rings(&self) -> impl Iterator<Item = [ModelHandle; 3]> + '_ {
        self.atoms.iter().map(|atom| atom.rings)
    }

    pub fn rain(&self) -> &[ModelHandle] {
        &self.rain
    }
}

/// Lowers a drop by one step, restarting at the top once it reaches the bottom.
pub fn fall(y: f32) -> f32 {
    let y = y - RAIN_SPEED;
    if y <= RAIN_BOTTOM { RAIN_TOP } else { y }
}

impl Animator for Atoms {
    fn animate(&mut self, scene: &mut SceneGraph, _tick: Tick) {
        for atom in &self.atoms {
            let r = atom.rate;
            let [first, second, third] = atom.rings;

            let rotate = &mut scene.model_mut(first).rotate;
            rotate.z += r;
            rotate.x += r;
            scene.model_mut(second).rotate.x += r;
            let rotate = &mut scene.model_mut(third).rotate;
            rotate.z += r;
            rotate.x += r;
        }

        for &drop in &self.rain {
            let translate = &mut scene.model_mut(drop).translate;
            translate.y = fall(translate.y);
        }
    }
}
