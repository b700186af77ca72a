use crate::core::pipeline::Shader;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};

/// Unlit shader: every fragment takes the uniform color.
///
/// The eye-space normal rides along in the varying but does not affect the output.
pub struct FlatShader {
    /// Projection · model-view.
    pub mvp_matrix: Matrix4<f32>,
    pub normal_matrix: Matrix3<f32>,
    pub color: Vector4<f32>,
}

/// Interpolated per-fragment data.
#[derive(Debug, Clone, Copy)]
pub struct FlatVarying {
    pub color: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl std::ops::Add for FlatVarying {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            color: self.color + rhs.color,
            normal: self.normal + rhs.normal,
        }
    }
}

impl std::ops::Mul<f32> for FlatVarying {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            color: self.color * rhs,
            normal: self.normal * rhs,
        }
    }
}

impl FlatShader {
    pub fn new(
        projection: &Matrix4<f32>,
        model_view: &Matrix4<f32>,
        normal_matrix: Matrix3<f32>,
        color: Vector4<f32>,
    ) -> Self {
        Self {
            mvp_matrix: projection * model_view,
            normal_matrix,
            color,
        }
    }
}

impl Shader for FlatShader {
    type Varying = FlatVarying;

    fn vertex(&self, position: &Point3<f32>, normal: &Vector3<f32>) -> (Vector4<f32>, FlatVarying) {
        let clip_pos = self.mvp_matrix * position.to_homogeneous();
        let varying = FlatVarying {
            color: self.color.xyz(),
            normal: self.normal_matrix * normal,
        };
        (clip_pos, varying)
    }

    fn fragment(&self, varying: FlatVarying) -> Vector3<f32> {
        varying.color
    }
}
