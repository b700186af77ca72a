use crate::error::{Result, SketchError};
use nalgebra::{Point3, Vector3};

/// Largest vertex count addressable by 16-bit indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Raw vertex/index buffers for one primitive, laid out the way they are uploaded:
/// three floats per position and per normal, 16-bit index lists for lines and triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub line_indices: Vec<u16>,
    pub triangle_indices: Vec<u16>,
}

impl GeometryData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn position(&self, index: usize) -> Point3<f32> {
        let i = index * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    pub fn normal(&self, index: usize) -> Vector3<f32> {
        let i = index * 3;
        Vector3::new(self.normals[i], self.normals[i + 1], self.normals[i + 2])
    }

    pub fn push_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>) {
        self.positions.extend_from_slice(&[position.x, position.y, position.z]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
    }

    /// Checks the provider contract: parallel position/normal arrays,
    /// a 16-bit addressable vertex count, and in-range, complete index lists.
    pub fn validate(&self, kind: &str) -> Result<()> {
        let invalid = |reason: String| SketchError::InvalidGeometry {
            kind: kind.to_string(),
            reason,
        };

        if self.positions.len() % 3 != 0 {
            return Err(invalid(format!(
                "position array length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if self.positions.len() != self.normals.len() {
            return Err(invalid(format!(
                "{} position floats but {} normal floats",
                self.positions.len(),
                self.normals.len()
            )));
        }

        let n = self.vertex_count();
        if n > MAX_VERTICES {
            return Err(invalid(format!(
                "{n} vertices exceed the 16-bit index range"
            )));
        }
        if self.triangle_indices.len() % 3 != 0 {
            return Err(invalid("triangle index list is not a multiple of 3".into()));
        }
        if self.line_indices.len() % 2 != 0 {
            return Err(invalid("line index list is not a multiple of 2".into()));
        }

        let out_of_range = self
            .triangle_indices
            .iter()
            .chain(self.line_indices.iter())
            .find(|&&i| i as usize >= n);
        if let Some(i) = out_of_range {
            return Err(invalid(format!("index {i} out of range for {n} vertices")));
        }

        Ok(())
    }
}
