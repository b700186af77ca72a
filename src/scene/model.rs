use crate::core::math::transform::TransformFactory;
use crate::error::{Result, SketchError};
use crate::pipeline::device::{BufferHandle, RenderDevice};
use crate::scene::primitives::{GeometryKind, GeometryProvider};
use log::debug;
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::Deserialize;
use std::str::FromStr;

/// Which index lists of a model are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FillStyle {
    Fill,
    Wireframe,
    FillAndWireframe,
}

impl FillStyle {
    pub fn has_fill(self) -> bool {
        matches!(self, Self::Fill | Self::FillAndWireframe)
    }

    pub fn has_wireframe(self) -> bool {
        matches!(self, Self::Wireframe | Self::FillAndWireframe)
    }
}

impl FromStr for FillStyle {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fill" => Ok(Self::Fill),
            "wireframe" => Ok(Self::Wireframe),
            "fillwireframe" => Ok(Self::FillAndWireframe),
            _ => Err(SketchError::UnknownFillStyle(s.to_string())),
        }
    }
}

impl TryFrom<String> for FillStyle {
    type Error = SketchError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Creation parameters for a [`Model`].
#[derive(Debug, Clone)]
pub struct ModelDesc {
    pub kind: GeometryKind,
    pub fill_style: FillStyle,
    pub color: Vector4<f32>,
    pub translate: Vector3<f32>,
    pub rotate: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl ModelDesc {
    /// Unit-scale, unrotated model at the origin.
    pub fn new(kind: GeometryKind, fill_style: FillStyle, color: [f32; 4]) -> Self {
        Self {
            kind,
            fill_style,
            color: Vector4::from(color),
            translate: Vector3::zeros(),
            rotate: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
        }
    }

    pub fn translate(mut self, x: f32, y: f32, z: f32) -> Self {
        self.translate = Vector3::new(x, y, z);
        self
    }

    pub fn rotate(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotate = Vector3::new(x, y, z);
        self
    }

    pub fn scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    pub fn uniform_scale(self, s: f32) -> Self {
        self.scale(s, s, s)
    }
}

/// A drawable: uploaded geometry, material, local transform and the matrices
/// derived from it each frame.
#[derive(Debug, Clone)]
pub struct Model {
    pub geometry_kind: GeometryKind,
    pub fill_style: FillStyle,
    pub color: Vector4<f32>,
    pub translate: Vector3<f32>,
    /// Euler angles in radians, applied X, then Y, then Z.
    pub rotate: Vector3<f32>,
    pub scale: Vector3<f32>,
    start_position: Vector3<f32>,

    model_matrix: Matrix4<f32>,
    model_view_matrix: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,

    buffer: BufferHandle,
    line_index_count: usize,
    triangle_index_count: usize,
}

impl Model {
    /// Produces and validates the geometry for `desc.kind`, uploads it once, and
    /// zeroes the derived matrices. Any provider's output is checked here, so a
    /// malformed buffer never reaches the device.
    pub fn create<D: RenderDevice>(
        desc: &ModelDesc,
        provider: &dyn GeometryProvider,
        device: &mut D,
    ) -> Result<Self> {
        let geometry = provider.produce(desc.kind)?;
        geometry.validate(desc.kind.name())?;
        let buffer = device.upload(&geometry);
        debug!("Model {} uploaded as buffer {}", desc.kind, buffer.index());

        Ok(Self {
            geometry_kind: desc.kind,
            fill_style: desc.fill_style,
            color: desc.color,
            translate: desc.translate,
            rotate: desc.rotate,
            scale: desc.scale,
            start_position: desc.translate,
            model_matrix: Matrix4::zeros(),
            model_view_matrix: Matrix4::zeros(),
            normal_matrix: Matrix3::zeros(),
            buffer,
            line_index_count: geometry.line_indices.len(),
            triangle_index_count: geometry.triangle_indices.len(),
        })
    }

    pub fn set_translate(&mut self, translate: Vector3<f32>) {
        self.translate = translate;
    }

    pub fn set_rotate(&mut self, rotate: Vector3<f32>) {
        self.rotate = rotate;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    pub fn set_color(&mut self, color: Vector4<f32>) {
        self.color = color;
    }

    /// Translation at creation time.
    pub fn start_position(&self) -> Vector3<f32> {
        self.start_position
    }

    /// Rebuilds the model, model-view and normal matrices for this frame.
    ///
    /// If the upper 3x3 of the model matrix is singular (a zero scale factor) the
    /// previous normal matrix is kept.
    pub fn compute_matrices(&mut self, view: &Matrix4<f32>) {
        self.model_matrix = TransformFactory::model(&self.translate, &self.rotate, &self.scale);
        self.model_view_matrix = view * self.model_matrix;
        if let Some(normal) = TransformFactory::normal_matrix(&self.model_matrix) {
            self.normal_matrix = normal;
        }
    }

    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model_matrix
    }

    pub fn model_view_matrix(&self) -> &Matrix4<f32> {
        &self.model_view_matrix
    }

    pub fn normal_matrix(&self) -> &Matrix3<f32> {
        &self.normal_matrix
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    pub fn line_index_count(&self) -> usize {
        self.line_index_count
    }

    pub fn triangle_index_count(&self) -> usize {
        self.triangle_index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::GeometryData;
    use crate::pipeline::software::SoftwareDevice;
    use crate::scene::primitives::PrimitiveRegistry;
    use nalgebra::Point3;

    fn create(desc: &ModelDesc) -> Model {
        let mut device = SoftwareDevice::new(8, 8).unwrap();
        Model::create(desc, &PrimitiveRegistry::builtin(), &mut device).unwrap()
    }

    #[test]
    fn scale_applies_before_translate() {
        let desc = ModelDesc::new(GeometryKind::Sphere, FillStyle::Fill, [1.0; 4])
            .translate(1.0, 0.0, 0.0)
            .uniform_scale(2.0);
        let mut model = create(&desc);
        assert_eq!(*model.model_matrix(), Matrix4::zeros());

        model.compute_matrices(&Matrix4::identity());
        let world = model.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((world - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-6);
        assert_eq!(model.model_view_matrix(), model.model_matrix());
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let desc = ModelDesc::new(GeometryKind::Teardrop, FillStyle::Fill, [1.0; 4])
            .scale(0.05, 0.2, 0.05);
        let mut model = create(&desc);
        model.compute_matrices(&Matrix4::identity());

        let n = model.normal_matrix();
        assert!((n[(0, 0)] - 20.0).abs() < 1e-3);
        assert!((n[(1, 1)] - 5.0).abs() < 1e-4);
    }

    #[test]
    fn singular_scale_keeps_previous_normal_matrix() {
        let desc = ModelDesc::new(GeometryKind::Torus, FillStyle::Wireframe, [0.0; 4]);
        let mut model = create(&desc);
        model.compute_matrices(&Matrix4::identity());
        let before = *model.normal_matrix();

        model.set_scale(Vector3::new(0.0, 1.0, 1.0));
        model.compute_matrices(&Matrix4::identity());
        assert_eq!(*model.normal_matrix(), before);
    }

    #[test]
    fn start_position_survives_mutation() {
        let desc = ModelDesc::new(GeometryKind::Plane, FillStyle::Wireframe, [1.0; 4])
            .translate(0.0, -1.0, 0.0);
        let mut model = create(&desc);
        model.set_translate(Vector3::new(5.0, 5.0, 5.0));
        assert_eq!(model.start_position(), Vector3::new(0.0, -1.0, 0.0));
        assert!(model.line_index_count() > 0);
        assert!(model.triangle_index_count() > 0);
    }

    /// Hands out a triangle whose last index points past the vertex list.
    struct OutOfRange;

    impl GeometryProvider for OutOfRange {
        fn produce(&self, _kind: GeometryKind) -> Result<GeometryData> {
            let mut data = GeometryData::default();
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
                data.push_vertex(Point3::new(x, y, 0.0), Vector3::z());
            }
            data.triangle_indices = vec![0, 1, 7];
            Ok(data)
        }
    }

    #[test]
    fn malformed_provider_output_is_rejected_before_upload() {
        let mut device = SoftwareDevice::new(8, 8).unwrap();
        let desc = ModelDesc::new(GeometryKind::Sphere, FillStyle::Fill, [1.0; 4]);

        let result = Model::create(&desc, &OutOfRange, &mut device);
        assert!(matches!(
            result,
            Err(SketchError::InvalidGeometry { kind, .. }) if kind == "sphere"
        ));

        // Nothing was uploaded, so the next buffer handle is still the first.
        assert_eq!(device.upload(&GeometryData::default()).index(), 0);
    }

    #[test]
    fn fill_style_names() {
        assert_eq!("FillWireframe".parse::<FillStyle>().unwrap(), FillStyle::FillAndWireframe);
        assert!(FillStyle::FillAndWireframe.has_fill());
        assert!(!FillStyle::Wireframe.has_fill());
        assert!(matches!(
            "dotted".parse::<FillStyle>(),
            Err(SketchError::UnknownFillStyle(_))
        ));
    }
}
