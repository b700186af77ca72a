use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3, Vector4};
use std::f32::consts::TAU;

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the 4x4 matrices used by the pipeline.
/// Right-handed, column vectors, clip space in [-1, 1] on every axis
/// (the same conventions as the WebGL matrix helpers the sketches were tuned against).
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Rotation about the X-axis, counter-clockwise looking down -X.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation about the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation about the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Non-uniform scale. Negative or zero factors are passed through untouched.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Model matrix `T · Rx · Ry · Rz · S`.
    ///
    /// Scale is innermost and translation outermost: a local point is scaled, then
    /// rotated about the local origin (Z first, X last), then moved to its world position.
    pub fn model(
        translate: &Vector3<f32>,
        rotate: &Vector3<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(translate)
            * Self::rotation_x(rotate.x)
            * Self::rotation_y(rotate.y)
            * Self::rotation_z(rotate.z)
            * Self::scaling_nonuniform(scale)
    }

    /// Look-at view matrix. Returns identity when `eye` and `target` coincide.
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        let forward = eye - target;
        if forward.norm_squared() < 1e-12 {
            return Matrix4::identity();
        }

        // Camera looks down -Z in view space
        let z_axis = forward.normalize();
        let x_axis = up.cross(&z_axis).try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
        let y_axis = z_axis.cross(&x_axis);

        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        rotation * Self::translation(&-eye.coords)
    }

    /// Symmetric perspective projection from a vertical field of view.
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,               0.0,
            0.0,              f,   0.0,               0.0,
            0.0,              0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0,              0.0, -1.0,              0.0,
        )
    }

    /// Off-axis perspective projection from near-plane extents.
    pub fn frustum(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * near * rl, 0.0,             (right + left) * rl, 0.0,
            0.0,             2.0 * near * tb, (top + bottom) * tb, 0.0,
            0.0,             0.0,             (far + near) * nf,   2.0 * far * near * nf,
            0.0,             0.0,             -1.0,                0.0,
        )
    }

    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl, 0.0,      0.0,      -(right + left) * rl,
            0.0,      2.0 * tb, 0.0,      -(top + bottom) * tb,
            0.0,      0.0,      2.0 * nf, (far + near) * nf,
            0.0,      0.0,      0.0,      1.0,
        )
    }

    /// Inverse-transpose of the upper 3x3 block.
    /// `None` when that block is singular (e.g. a zero scale factor).
    pub fn normal_matrix(matrix: &Matrix4<f32>) -> Option<Matrix3<f32>> {
        let upper: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        upper.try_inverse().map(|inv| inv.transpose())
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Transforms a point by a 4x4 matrix, including the homogeneous divide.
#[inline]
pub fn transform_point(matrix: &Matrix4<f32>, point: &Point3<f32>) -> Point3<f32> {
    apply_perspective_division(&(matrix * point.to_homogeneous()))
}

/// Clip space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// NDC -> screen pixels. Screen +Y points down.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

/// Wraps an angle into `[0, 2π)`.
///
/// `rem_euclid` alone rounds tiny negative angles up to exactly `TAU`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped < TAU { wrapped } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn model_matrix_scales_before_translating() {
        let m = TransformFactory::model(
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::zeros(),
            &Vector3::new(2.0, 2.0, 2.0),
        );
        let p = transform_point(&m, &Point3::new(1.0, 0.0, 0.0));
        assert_close(p.x, 3.0);
        assert_close(p.y, 0.0);
        assert_close(p.z, 0.0);
    }

    #[test]
    fn model_matrix_rotates_z_before_x() {
        // Rz(90) takes +X to +Y, then Rx(90) takes +Y to +Z.
        let m = TransformFactory::model(
            &Vector3::zeros(),
            &Vector3::new(FRAC_PI_2, 0.0, FRAC_PI_2),
            &Vector3::new(1.0, 1.0, 1.0),
        );
        let p = transform_point(&m, &Point3::new(1.0, 0.0, 0.0));
        assert_close(p.x, 0.0);
        assert_close(p.y, 0.0);
        assert_close(p.z, 1.0);
    }

    #[test]
    fn view_moves_eye_to_origin_looking_down_negative_z() {
        let eye = Point3::new(0.0, 1.0, 4.0);
        let v = TransformFactory::view(&eye, &Point3::origin(), &Vector3::y());
        let at_eye = transform_point(&v, &eye);
        assert_close(at_eye.coords.norm(), 0.0);

        let center = transform_point(&v, &Point3::origin());
        assert_close(center.x, 0.0);
        assert_close(center.y, 0.0);
        assert_close(center.z, -(17.0f32).sqrt());
    }

    #[test]
    fn view_is_identity_for_degenerate_eye() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(TransformFactory::view(&p, &p, &Vector3::y()), Matrix4::identity());
    }

    #[test]
    fn frustum_maps_near_corners_to_clip_corners() {
        let f = TransformFactory::frustum(-0.6, 0.6, -0.6, 0.6, 1.0, 10.0);
        let corner = transform_point(&f, &Point3::new(0.6, 0.6, -1.0));
        assert_close(corner.x, 1.0);
        assert_close(corner.y, 1.0);
        assert_close(corner.z, -1.0);

        let far = transform_point(&f, &Point3::new(0.0, 0.0, -10.0));
        assert_close(far.z, 1.0);
    }

    #[test]
    fn symmetric_frustum_matches_perspective() {
        let fovy = PI / 3.0;
        let half = (fovy / 2.0).tan();
        let f = TransformFactory::frustum(-half, half, -half, half, 1.0, 10.0);
        let p = TransformFactory::perspective(1.0, fovy, 1.0, 10.0);
        assert!((f - p).amax() < 1e-5);
    }

    #[test]
    fn orthographic_box_maps_to_unit_cube() {
        let o = TransformFactory::orthographic(-2.0, 2.0, -2.0, 2.0, -10.0, 10.0);
        let p = transform_point(&o, &Point3::new(2.0, -2.0, -10.0));
        assert_close(p.x, 1.0);
        assert_close(p.y, -1.0);
        assert_close(p.z, 1.0);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let m = TransformFactory::scaling_nonuniform(&Vector3::new(2.0, 1.0, 1.0));
        let n = TransformFactory::normal_matrix(&m).unwrap();
        assert_close(n[(0, 0)], 0.5);
        assert_close(n[(1, 1)], 1.0);

        let singular = TransformFactory::scaling_nonuniform(&Vector3::new(0.0, 1.0, 1.0));
        assert!(TransformFactory::normal_matrix(&singular).is_none());
    }

    #[test]
    fn wrapped_angles_stay_below_full_turn() {
        assert_eq!(wrap_angle(-1e-7), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert_close(wrap_angle(-FRAC_PI_2), 3.0 * FRAC_PI_2);
        assert_close(wrap_angle(3.0 * PI), PI);
        for k in 1..1000 {
            let a = wrap_angle(-(k as f32) * 1e-9);
            assert!((0.0..TAU).contains(&a), "{a}");
        }
    }
}
