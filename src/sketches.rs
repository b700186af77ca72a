//! The two scenes shipped with the crate. Each builds its fixed model set and
//! returns the animator that owns the handles of its animated subjects.

pub mod atoms;
pub mod satellites;

use crate::error::Result;
use crate::pipeline::device::RenderDevice;
use crate::scene::animation::Animator;
use crate::scene::graph::SceneGraph;
use crate::scene::primitives::GeometryProvider;
use crate::ui::input::KeyBindings;
use serde::Deserialize;
use std::fmt;

pub use atoms::Atoms;
pub use satellites::Satellites;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SketchKind {
    /// Torus with four orbiting spheres above a wireframe floor.
    #[default]
    Satellites,
    /// Five spinning atoms in falling rain.
    Atoms,
}

impl SketchKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Satellites => "satellites",
            Self::Atoms => "atoms",
        }
    }

    /// Initial camera orbit radius.
    pub fn orbit_distance(self) -> f32 {
        match self {
            Self::Satellites => 5.0,
            Self::Atoms => 4.0,
        }
    }

    /// One-line summary of the default keys.
    pub fn controls(self) -> &'static str {
        match self {
            Self::Satellites => {
                "O/F/P projection, C orbit, H eye height, D distance, V fovy, B extent, K animation (shift inverts)"
            }
            Self::Atoms => {
                "O/F/P projection, arrows orbit/eye height, WASD pan, R distance, V fovy, B extent, K animation"
            }
        }
    }

    pub fn key_bindings(self) -> KeyBindings {
        match self {
            Self::Satellites => KeyBindings::satellites(),
            Self::Atoms => KeyBindings::atoms(),
        }
    }

    /// Adds the sketch's models to `scene` and returns its animator.
    /// `seed` fixes the scatter of randomly placed models.
    pub fn build<D: RenderDevice>(
        self,
        scene: &mut SceneGraph,
        provider: &dyn GeometryProvider,
        device: &mut D,
        seed: Option<u64>,
    ) -> Result<Box<dyn Animator>> {
        Ok(match self {
            Self::Satellites => Box::new(Satellites::build(scene, provider, device)?),
            Self::Atoms => Box::new(Atoms::build(scene, provider, device, seed)?),
        })
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
