use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Signed doubled area of triangle (a, b, c) in screen space.
/// Negative for triangles that are counter-clockwise in NDC (screen Y points down).
#[inline(always)]
pub fn edge_function(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Barycentric weights of `p` with respect to triangle (v0, v1, v2).
///
/// `None` for degenerate triangles.
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v0: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
) -> Option<Vector3<f32>> {
    let area = edge_function(v0, v1, v2);
    if area.abs() < EPSILON {
        return None;
    }
    let inv_area = 1.0 / area;

    let w0 = edge_function(v1, v2, p) * inv_area;
    let w1 = edge_function(v2, v0, p) * inv_area;
    Some(Vector3::new(w0, w1, 1.0 - w0 - w1))
}

#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Re-weights screen-space barycentrics by 1/w so attributes interpolate
/// linearly in view space rather than in screen space.
pub fn perspective_correct_barycentric(bary: Vector3<f32>, w: [f32; 3]) -> Option<Vector3<f32>> {
    let weighted = Vector3::new(bary.x / w[0], bary.y / w[1], bary.z / w[2]);
    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON || !sum.is_finite() {
        return None;
    }
    Some(weighted / sum)
}
