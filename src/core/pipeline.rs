use nalgebra::{Point3, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Values that can be blended across a primitive with barycentric or linear weights.
///
/// Send + Sync because fragments of one triangle are shaded on several rayon workers.
pub trait Interpolatable:
    Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl<T> Interpolatable for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> + Send + Sync {}

/// The programmable stages of the software pipeline.
pub trait Shader: Send + Sync {
    /// Per-vertex output interpolated for every fragment.
    type Varying: Interpolatable;

    /// Maps one vertex (position and normal attribute) to clip space.
    fn vertex(&self, position: &Point3<f32>, normal: &Vector3<f32>) -> (Vector4<f32>, Self::Varying);

    /// Final linear RGB color for a fragment.
    fn fragment(&self, varying: Self::Varying) -> Vector3<f32>;
}
