use crate::error::{Result, SketchError};
use crate::scene::camera::{Camera, ProjectionMode};
use crate::sketches::SketchKind;
use crate::ui::input::{Action, Binding, CameraField, Key, KeyBindings, SignSource};
use nalgebra::{Point3, Vector3, Vector4};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sketch: SketchKind,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    600
}
fn default_title() -> String {
    "Orbit Sketch".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    #[serde(default = "default_true")]
    pub cull_back_faces: bool,
    /// Depth bias for filled triangles, keeps coplanar wireframe lines visible.
    #[serde(default = "default_polygon_offset")]
    pub polygon_offset: f32,
    /// Headless output file. Empty means a timestamped name.
    #[serde(default)]
    pub output: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
            cull_back_faces: true,
            polygon_offset: default_polygon_offset(),
            output: String::new(),
        }
    }
}

fn default_clear_color() -> [f32; 4] {
    [0.95, 0.95, 0.95, 1.0]
}
fn default_polygon_offset() -> f32 {
    5e-5
}
fn default_true() -> bool {
    true
}

/// Optional overrides of the sketch's initial camera.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CameraConfig {
    pub eye: Option<[f32; 3]>,
    pub center: Option<[f32; 3]>,
    pub up: Option<[f32; 3]>,
    /// Degrees.
    pub fovy: Option<f32>,
    pub near_plane_extent: Option<f32>,
    pub projection: Option<ProjectionMode>,
    /// Degrees.
    pub orbit_angle: Option<f32>,
    pub orbit_distance: Option<f32>,
}

impl CameraConfig {
    pub fn apply(&self, camera: &mut Camera) {
        if let Some(eye) = self.eye {
            camera.eye = Point3::from(eye);
        }
        if let Some(center) = self.center {
            camera.center = Point3::from(center);
        }
        if let Some(up) = self.up {
            camera.up = Vector3::from(up);
        }
        if let Some(fovy) = self.fovy {
            camera.fovy = fovy.to_radians();
        }
        if let Some(mode) = self.projection {
            camera.select_projection(mode);
        }
        // After the projection so an explicit extent wins over the mode default.
        if let Some(extent) = self.near_plane_extent {
            camera.near_plane_extent = extent;
        }
        if let Some(angle) = self.orbit_angle {
            camera.orbit_angle = 0.0;
            camera.orbit_by(angle.to_radians());
        }
        if let Some(distance) = self.orbit_distance {
            camera.orbit_distance = distance.max(0.0);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    #[serde(default)]
    pub start_enabled: bool,
    /// Seed for scattered particles; random when absent.
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            start_enabled: false,
            seed: None,
        }
    }
}

impl AnimationConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

fn default_period_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// Drop the sketch's built-in key table before applying `bindings`.
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// One `[[input.bindings]]` entry.
///
/// `action` is a camera field (`orbit_angle`, `eye_height`, `orbit_distance`,
/// `fovy`, `near_plane_extent`, `pan_x`, `pan_y`), a projection
/// (`orthographic`, `frustum`, `perspective`), `toggle_animation`, or `none`
/// to unbind the key.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub action: String,
    /// Step for camera fields; defaults to the field's usual step.
    pub step: Option<f32>,
    #[serde(default = "default_true")]
    pub shift_inverts: bool,
}

impl BindingConfig {
    fn action(&self) -> Result<Option<Action>> {
        let name = self.action.to_ascii_lowercase();
        let action = match name.as_str() {
            "none" => return Ok(None),
            "toggle_animation" | "toggle" => Action::ToggleAnimation,
            "orthographic" | "ortho" => Action::Projection(ProjectionMode::Orthographic),
            "frustum" => Action::Projection(ProjectionMode::Frustum),
            "perspective" => Action::Projection(ProjectionMode::Perspective),
            _ => {
                let field: CameraField = name.parse()?;
                Action::Adjust(Binding {
                    field,
                    step: self.step.unwrap_or_else(|| field.default_step()),
                    sign: if self.shift_inverts {
                        SignSource::ShiftInverts
                    } else {
                        SignSource::Fixed
                    },
                })
            }
        };
        Ok(Some(action))
    }
}

impl InputConfig {
    /// Applies the configured entries on top of `defaults`.
    pub fn apply(&self, defaults: KeyBindings) -> Result<KeyBindings> {
        let mut bindings = if self.replace_defaults {
            KeyBindings::default()
        } else {
            defaults
        };

        for entry in &self.bindings {
            let key: Key = entry.key.parse()?;
            match entry.action()? {
                Some(action) => bindings.bind(key, action),
                None => bindings.unbind(key),
            }
        }
        Ok(bindings)
    }
}

impl RenderConfig {
    pub fn clear_color(&self) -> Vector4<f32> {
        Vector4::from(self.clear_color)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SketchError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// A default configuration for `sketch`.
    pub fn for_sketch(sketch: SketchKind) -> Self {
        Self {
            sketch,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.sketch, SketchKind::Satellites);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.animation.period(), Duration::from_millis(50));
        assert!(config.render.cull_back_faces);
        assert!(config.input.bindings.is_empty());
    }

    #[test]
    fn sections_parse() {
        let config = Config::from_toml_str(
            r#"
            sketch = "atoms"

            [window]
            width = 320
            height = 240

            [camera]
            projection = "ortho"
            fovy = 45.0
            orbit_distance = 6.0

            [animation]
            start_enabled = true
            seed = 7

            [[input.bindings]]
            key = "x"
            action = "eye_height"
            step = 0.2
            shift_inverts = false

            [[input.bindings]]
            key = "k"
            action = "none"
            "#,
        )
        .unwrap();

        assert_eq!(config.sketch, SketchKind::Atoms);
        assert_eq!(config.window.height, 240);
        assert_eq!(config.camera.projection, Some(ProjectionMode::Orthographic));
        assert_eq!(config.animation.seed, Some(7));

        let bindings = config.input.apply(KeyBindings::atoms()).unwrap();
        let x = bindings.adjustment_for(Key::Letter('X')).unwrap();
        assert_eq!(x.field, CameraField::EyeHeight);
        assert_eq!(x.step, 0.2);
        assert_eq!(x.sign, SignSource::Fixed);
        assert!(!bindings.toggles(Key::Letter('K')));
        assert!(bindings.adjustment_for(Key::Letter('R')).is_some());

        let mut camera = Camera::new(1.0);
        config.camera.apply(&mut camera);
        assert_eq!(camera.near_plane_extent, 2.0);
        assert!((camera.fovy - 45f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.orbit_distance, 6.0);
    }

    #[test]
    fn bad_binding_is_reported() {
        let config = Config::from_toml_str(
            r#"
            [[input.bindings]]
            key = "q"
            action = "zoom"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.input.apply(KeyBindings::satellites()),
            Err(SketchError::InvalidBinding(_))
        ));
    }

    #[test]
    fn unknown_sketch_fails_to_parse() {
        assert!(matches!(
            Config::from_toml_str(r#"sketch = "galaxy""#),
            Err(SketchError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_config_error() {
        assert!(matches!(
            Config::load("does/not/exist.toml"),
            Err(SketchError::Config { .. })
        ));
    }
}
