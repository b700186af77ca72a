use crate::core::math::transform::{TransformFactory, wrap_angle};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::Deserialize;

/// Near/far planes for frustum and perspective projections.
const NEAR: f32 = 1.0;
const FAR: f32 = 10.0;
/// Depth range of the orthographic box.
const ORTHO_DEPTH: f32 = 10.0;

/// Extent restored when switching to an orthographic projection.
pub const ORTHOGRAPHIC_EXTENT: f32 = 2.0;
/// Extent restored when switching to a frustum projection.
pub const FRUSTUM_EXTENT: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[serde(alias = "ortho")]
    Orthographic,
    Frustum,
    #[default]
    Perspective,
}

/// Orbit camera: `eye.x`/`eye.z` are derived from `center`, `orbit_distance`
/// and `orbit_angle` every frame, `eye.y` is free.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Half-size of the ortho box, or twice the half-size of the frustum near plane.
    pub near_plane_extent: f32,
    pub projection_mode: ProjectionMode,
    /// Radians from +Z in the XZ plane, kept in [0, 2π).
    pub orbit_angle: f32,
    pub orbit_distance: f32,
    /// Viewport width / height, fixed at creation.
    pub aspect: f32,

    // --- Cached Matrices ---
    view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    /// Default viewpoint: eye (0, 1, 4) looking at the origin, 60° perspective.
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Point3::new(0.0, 1.0, 4.0),
            center: Point3::origin(),
            up: Vector3::y(),
            fovy: 60f32.to_radians(),
            near_plane_extent: ORTHOGRAPHIC_EXTENT,
            projection_mode: ProjectionMode::Perspective,
            orbit_angle: 0.0,
            orbit_distance: 4.0,
            aspect,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
        }
    }

    /// Switches projection. Orthographic and frustum reset the near-plane
    /// extent to their fixed defaults; perspective leaves it alone.
    pub fn select_projection(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
        match mode {
            ProjectionMode::Orthographic => self.near_plane_extent = ORTHOGRAPHIC_EXTENT,
            ProjectionMode::Frustum => self.near_plane_extent = FRUSTUM_EXTENT,
            ProjectionMode::Perspective => {}
        }
    }

    /// Projection matrix for the current mode and parameters.
    pub fn projection(&self) -> Matrix4<f32> {
        let v = self.near_plane_extent;
        match self.projection_mode {
            ProjectionMode::Orthographic => {
                TransformFactory::orthographic(-v, v, -v, v, -ORTHO_DEPTH, ORTHO_DEPTH)
            }
            ProjectionMode::Frustum => {
                let h = v / 2.0;
                TransformFactory::frustum(-h, h, -h, h, NEAR, FAR)
            }
            ProjectionMode::Perspective => {
                TransformFactory::perspective(self.aspect, self.fovy, NEAR, FAR)
            }
        }
    }

    /// Recomputes and caches the projection matrix.
    pub fn update_projection(&mut self) -> Matrix4<f32> {
        self.projection_matrix = self.projection();
        self.projection_matrix
    }

    /// Places the eye on the orbit around `center`. `eye.y` is untouched.
    pub fn apply_orbit(&mut self) {
        let (sin, cos) = self.orbit_angle.sin_cos();
        self.eye.x = self.center.x + self.orbit_distance * sin;
        self.eye.z = self.center.z + self.orbit_distance * cos;
    }

    /// Recomputes and caches the view matrix from `eye`, `center`, `up`.
    pub fn look_at(&mut self) -> Matrix4<f32> {
        self.view_matrix = TransformFactory::view(&self.eye, &self.center, &self.up);
        self.view_matrix
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    // --- Adjusters ---

    pub fn orbit_by(&mut self, delta: f32) {
        self.orbit_angle = wrap_angle(self.orbit_angle + delta);
    }

    pub fn raise_eye(&mut self, delta: f32) {
        self.eye.y += delta;
    }

    /// Changes the orbit distance, never below zero.
    pub fn change_distance(&mut self, delta: f32) {
        self.orbit_distance = (self.orbit_distance + delta).max(0.0);
    }

    pub fn change_fovy(&mut self, delta: f32) {
        self.fovy += delta;
    }

    pub fn change_extent(&mut self, delta: f32) {
        self.near_plane_extent += delta;
    }

    /// Moves eye and center together along X.
    pub fn pan_x(&mut self, delta: f32) {
        self.eye.x += delta;
        self.center.x += delta;
    }

    /// Moves eye and center together along Y.
    pub fn pan_y(&mut self, delta: f32) {
        self.eye.y += delta;
        self.center.y += delta;
    }
}
