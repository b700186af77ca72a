//! Built-in tessellations and the registry that resolves a primitive kind to one.
//!
//! Every generator samples a parametric surface over a `(u, v)` grid. Quads are split
//! as (a, b, c) and (a, c, d) with `b` one step along `u` and `d` one step along `v`;
//! each surface is parameterised so that this winding is counter-clockwise when seen
//! from outside.

use crate::core::geometry::{GeometryData, MAX_VERTICES};
use crate::error::{Result, SketchError};
use log::debug;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum GeometryKind {
    Torus,
    Sphere,
    Plane,
    /// Drop shape with its tip at +Y.
    Teardrop,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 4] = [Self::Torus, Self::Sphere, Self::Plane, Self::Teardrop];

    pub fn name(self) -> &'static str {
        match self {
            Self::Torus => "torus",
            Self::Sphere => "sphere",
            Self::Plane => "plane",
            Self::Teardrop => "tropfen",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryKind {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "torus" => Ok(Self::Torus),
            "sphere" => Ok(Self::Sphere),
            "plane" => Ok(Self::Plane),
            "tropfen" | "teardrop" => Ok(Self::Teardrop),
            _ => Err(SketchError::UnknownGeometryKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for GeometryKind {
    type Error = SketchError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Source of vertex data for a primitive kind.
pub trait GeometryProvider {
    fn produce(&self, kind: GeometryKind) -> Result<GeometryData>;

    fn produce_named(&self, name: &str) -> Result<GeometryData> {
        self.produce(name.parse()?)
    }
}

pub type GeometryFn = fn() -> Result<GeometryData>;

/// Kind → generator map. Output is validated before it is handed out.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveRegistry {
    generators: HashMap<GeometryKind, GeometryFn>,
}

impl PrimitiveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four built-in shapes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(GeometryKind::Torus, || torus(32, 16, 1.0, 0.25));
        registry.register(GeometryKind::Sphere, || sphere(32, 16, 1.0));
        registry.register(GeometryKind::Plane, || plane(10, 2.0));
        registry.register(GeometryKind::Teardrop, || teardrop(24, 16));
        registry
    }

    /// Installs (or replaces) the generator for `kind`.
    pub fn register(&mut self, kind: GeometryKind, generator: GeometryFn) {
        self.generators.insert(kind, generator);
    }

    pub fn contains(&self, kind: GeometryKind) -> bool {
        self.generators.contains_key(&kind)
    }
}

impl GeometryProvider for PrimitiveRegistry {
    fn produce(&self, kind: GeometryKind) -> Result<GeometryData> {
        let generator = self
            .generators
            .get(&kind)
            .ok_or_else(|| SketchError::UnknownGeometryKind(kind.name().to_string()))?;

        let data = generator()?;
        data.validate(kind.name())?;
        debug!(
            "Produced {}: {} vertices, {} triangles, {} lines",
            kind,
            data.vertex_count(),
            data.triangle_indices.len() / 3,
            data.line_indices.len() / 2
        );
        Ok(data)
    }
}

/// Samples `surface` on an `(n_u + 1) x (n_v + 1)` grid over `[0,1]²` and
/// emits triangle and grid-edge line indices.
///
/// Fails if either resolution is zero or the grid needs more vertices than
/// 16-bit indices can address.
fn parametric_grid(
    name: &str,
    n_u: usize,
    n_v: usize,
    surface: impl Fn(f32, f32) -> (Point3<f32>, Vector3<f32>),
) -> Result<GeometryData> {
    let invalid = |reason: String| SketchError::InvalidGeometry {
        kind: name.to_string(),
        reason,
    };
    if n_u == 0 || n_v == 0 {
        return Err(invalid(format!("empty {n_u}x{n_v} grid")));
    }
    let stride = n_u + 1;
    let vertices = stride.saturating_mul(n_v + 1);
    if vertices > MAX_VERTICES {
        return Err(invalid(format!(
            "{n_u}x{n_v} grid needs {vertices} vertices, more than 16-bit indices address"
        )));
    }

    let mut data = GeometryData::default();

    for j in 0..=n_v {
        let v = j as f32 / n_v as f32;
        for i in 0..=n_u {
            let u = i as f32 / n_u as f32;
            let (position, normal) = surface(u, v);
            data.push_vertex(position, normal);
        }
    }

    let idx = |i: usize, j: usize| (j * stride + i) as u16;

    for j in 0..n_v {
        for i in 0..n_u {
            let (a, b, c, d) = (idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1));
            data.triangle_indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    for j in 0..=n_v {
        for i in 0..=n_u {
            if i < n_u {
                data.line_indices.extend_from_slice(&[idx(i, j), idx(i + 1, j)]);
            }
            if j < n_v {
                data.line_indices.extend_from_slice(&[idx(i, j), idx(i, j + 1)]);
            }
        }
    }

    Ok(data)
}

/// UV sphere centred at the origin, poles on the Y axis.
pub fn sphere(n_u: usize, n_v: usize, radius: f32) -> Result<GeometryData> {
    parametric_grid("sphere", n_u, n_v, |u, v| {
        let (su, cu) = (u * TAU).sin_cos();
        let (sv, cv) = (v * PI).sin_cos();
        let normal = Vector3::new(sv * cu, cv, sv * su);
        (Point3::from(normal * radius), normal)
    })
}

/// Torus lying in the XY plane around the Z axis.
pub fn torus(n_u: usize, n_v: usize, major: f32, minor: f32) -> Result<GeometryData> {
    parametric_grid("torus", n_u, n_v, |u, v| {
        let (su, cu) = (u * TAU).sin_cos();
        let (sv, cv) = (v * TAU).sin_cos();
        let ring = major + minor * cv;
        let position = Point3::new(ring * cu, ring * su, minor * sv);
        let normal = Vector3::new(cv * cu, cv * su, sv);
        (position, normal)
    })
}

/// Square in the XZ plane at y = 0, facing +Y.
pub fn plane(divisions: usize, half_extent: f32) -> Result<GeometryData> {
    parametric_grid("plane", divisions, divisions, |u, v| {
        let x = (2.0 * u - 1.0) * half_extent;
        let z = (1.0 - 2.0 * v) * half_extent;
        (Point3::new(x, 0.0, z), Vector3::y())
    })
}

/// Surface of revolution around Y with profile radius `0.5 (1 - cos t) sin t`,
/// `y = cos t`: a sharp tip at +Y and a rounded bottom at -Y.
pub fn teardrop(n_u: usize, n_v: usize) -> Result<GeometryData> {
    parametric_grid("tropfen", n_u, n_v, |u, v| {
        let (su, cu) = (u * TAU).sin_cos();
        let (st, ct) = (v * PI).sin_cos();

        let radius = 0.5 * (1.0 - ct) * st;
        let d_radius = 0.5 * (st * st + ct - ct * ct);
        let position = Point3::new(radius * cu, ct, radius * su);

        let normal = Vector3::new(st * cu, d_radius, st * su)
            .try_normalize(1e-6)
            .unwrap_or_else(|| Vector3::new(0.0, ct.signum(), 0.0));
        (position, normal)
    })
}
