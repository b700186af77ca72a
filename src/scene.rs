pub mod animation;
pub mod camera;
pub mod graph;
pub mod model;
pub mod primitives;

pub use animation::{AnimationDriver, Animator, Tick};
pub use camera::{Camera, ProjectionMode};
pub use graph::{ModelHandle, SceneGraph};
pub use model::{FillStyle, Model, ModelDesc};
pub use primitives::{GeometryKind, GeometryProvider, PrimitiveRegistry};
