use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// Clip planes in homogeneous space as (axis, sign): a point is inside when
/// `sign * p[axis] <= p.w`. 0=X, 1=Y, 2=Z.
const CLIP_PLANES: [(usize, f32); 6] = [
    (0, 1.0),  // Right
    (0, -1.0), // Left
    (1, 1.0),  // Top
    (1, -1.0), // Bottom
    (2, 1.0),  // Far
    (2, -1.0), // Near
];

/// Draws clip-space triangles and lines into a [`FrameBuffer`].
pub struct Rasterizer {
    pub cull_mode: CullMode,
    /// Added to the depth of filled fragments so coplanar wireframe lines win
    /// the depth test (the software counterpart of a polygon offset).
    pub depth_offset: f32,
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
            depth_offset: 0.0,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Rasterize a single triangle given clip-space coordinates and corresponding varyings.
    ///
    /// The triangle is clipped against the view volume in homogeneous clip space
    /// (Sutherland–Hodgman), then the resulting convex polygon is fanned out and
    /// filled with perspective-correct varyings and a depth test.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        // A triangle clipped by six planes has at most 9 vertices.
        let mut current_poly: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);
        let mut clip_buffer: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);

        for i in 0..3 {
            current_poly.push((clip_coords[i], varyings[i]));
        }

        for &(axis, sign) in &CLIP_PLANES {
            if current_poly.is_empty() {
                return;
            }
            clip_polygon_against_plane(&current_poly, &mut clip_buffer, axis, sign);
            std::mem::swap(&mut current_poly, &mut clip_buffer);
        }

        if current_poly.len() < 3 {
            return;
        }

        let v0 = current_poly[0];
        for i in 1..(current_poly.len() - 1) {
            let v1 = current_poly[i];
            let v2 = current_poly[i + 1];

            self.rasterize_triangle_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
            );
        }
    }

    /// Rasterize a line segment. The segment is clipped parametrically against the
    /// same six planes, then stepped one pixel at a time along its major axis.
    /// Lines are never culled and never receive the fill depth offset.
    pub fn rasterize_line<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 2],
        varyings: &[S::Varying; 2],
    ) {
        let Some((a, b)) = clip_line(
            (clip_coords[0], varyings[0]),
            (clip_coords[1], varyings[1]),
        ) else {
            return;
        };

        if a.0.w.abs() < 1e-6 || b.0.w.abs() < 1e-6 {
            return;
        }

        let width = framebuffer.width as f32;
        let height = framebuffer.height as f32;

        let ndc_a = apply_perspective_division(&a.0);
        let ndc_b = apply_perspective_division(&b.0);
        let screen_a = ndc_to_screen(ndc_a.x, ndc_a.y, width, height);
        let screen_b = ndc_to_screen(ndc_b.x, ndc_b.y, width, height);

        let delta = screen_b - screen_a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        let inv_w = [1.0 / a.0.w, 1.0 / b.0.w];

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = screen_a + delta * t;
            if p.x < 0.0 || p.y < 0.0 {
                continue;
            }

            // NDC depth is affine in screen space; varyings need the 1/w correction.
            let z_ndc = ndc_a.z + (ndc_b.z - ndc_a.z) * t;
            let depth = z_ndc * 0.5 + 0.5;

            let wa = (1.0 - t) * inv_w[0];
            let wb = t * inv_w[1];
            let sum = wa + wb;
            if sum.abs() < 1e-9 {
                continue;
            }
            let varying = a.1 * (wa / sum) + b.1 * (wb / sum);

            let x = p.x.floor() as usize;
            let y = p.y.floor() as usize;
            if framebuffer.in_bounds(x, y) {
                framebuffer.plot(x, y, depth, shader.fragment(varying));
            }
        }
    }

    /// Internal function to rasterize a triangle that is guaranteed to be inside the frustum.
    /// Performs perspective division, viewport transform, and pixel shading.
    fn rasterize_triangle_clipped<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.width as f32;
        let height = framebuffer.height as f32;

        // 1. Perspective division & viewport transform
        let mut screen_coords = [Point2::origin(); 3];
        let mut ndc_z = [0.0; 3];
        let mut w_values = [0.0; 3];

        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }

            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            ndc_z[i] = ndc.z;
            screen_coords[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // 2. Backface culling. Screen Y points down, so counter-clockwise
        // (front-facing) triangles have a negative signed area here.
        let v0 = screen_coords[0];
        let v1 = screen_coords[1];
        let v2 = screen_coords[2];
        let edge1 = v1 - v0;
        let edge2 = v2 - v1;
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;

        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        // 3. Bounding box with scissor
        let (min_x, min_y, max_x, max_y) = compute_bounding_box(&screen_coords);

        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.width as i32
            || min_y >= framebuffer.height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = (max_x.min(framebuffer.width as i32 - 1)) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = (max_y.min(framebuffer.height as i32 - 1)) as usize;

        let depth_offset = self.depth_offset;

        // 4. Pixel loop, one rayon task per scanline.
        framebuffer
            .par_rows_mut(start_y..end_y + 1)
            .for_each(|mut row| {
                let y = row.y;
                for x in start_x..=end_x {
                    let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

                    let Some(bary) =
                        barycentric_coordinates(pixel_center, v0, v1, v2)
                    else {
                        continue;
                    };
                    if !is_inside_triangle(bary) {
                        continue;
                    }

                    let z_ndc = bary.x * ndc_z[0] + bary.y * ndc_z[1] + bary.z * ndc_z[2];
                    let depth = z_ndc * 0.5 + 0.5 + depth_offset;

                    let Some(corrected) = perspective_correct_barycentric(bary, w_values) else {
                        continue;
                    };
                    let varying = varyings[0] * corrected.x
                        + varyings[1] * corrected.y
                        + varyings[2] * corrected.z;

                    row.test_and_set(x, depth, shader.fragment(varying));
                }
            });
    }
}

/// Clips a polygon against one plane, writing the result to `output` (cleared first).
fn clip_polygon_against_plane<V: Interpolatable>(
    input: &[(Vector4<f32>, V)],
    output: &mut Vec<(Vector4<f32>, V)>,
    axis: usize,
    sign: f32,
) {
    output.clear();

    let Some(&last) = input.last() else {
        return;
    };

    let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

    let mut prev = last;
    let mut prev_inside = is_inside(&prev.0);

    for curr in input {
        let curr_inside = is_inside(&curr.0);

        if curr_inside {
            if !prev_inside {
                if let Some(inter) = intersect_edge_plane(prev, *curr, axis, sign) {
                    output.push(inter);
                }
            }
            output.push(*curr);
        } else if prev_inside {
            if let Some(inter) = intersect_edge_plane(prev, *curr, axis, sign) {
                output.push(inter);
            }
        }

        prev = *curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of segment (a, b) with the plane `sign * P[axis] = P.w`,
/// interpolating position and varying together.
#[inline(always)]
fn intersect_edge_plane<V: Interpolatable>(
    a: (Vector4<f32>, V),
    b: (Vector4<f32>, V),
    axis: usize,
    sign: f32,
) -> Option<(Vector4<f32>, V)> {
    let ac = a.0[axis];
    let bc = b.0[axis];
    let aw = a.0.w;
    let bw = b.0.w;

    let denom = sign * (bc - ac) - (bw - aw);
    if denom.abs() < 1e-9 {
        return None;
    }

    let t = (aw - sign * ac) / denom;
    if !t.is_finite() {
        return None;
    }

    let pos = a.0 + (b.0 - a.0) * t;
    let vary = a.1 * (1.0 - t) + b.1 * t;
    Some((pos, vary))
}

/// Parametric (Liang–Barsky style) clip of a segment against all six planes.
/// `None` when the segment lies entirely outside the view volume.
fn clip_line<V: Interpolatable>(
    a: (Vector4<f32>, V),
    b: (Vector4<f32>, V),
) -> Option<((Vector4<f32>, V), (Vector4<f32>, V))> {
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for &(axis, sign) in &CLIP_PLANES {
        // Signed distance to the plane; inside when >= 0.
        let da = a.0.w - sign * a.0[axis];
        let db = b.0.w - sign * b.0[axis];

        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            t0 = t0.max(da / (da - db));
        } else if db < 0.0 {
            t1 = t1.min(da / (da - db));
        }
        if t0 > t1 {
            return None;
        }
    }

    let lerp = |t: f32| (a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t);
    Some((lerp(t0), lerp(t1)))
}

fn compute_bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}
