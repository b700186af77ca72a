use crate::error::{Result, SketchError};
use crate::scene::animation::AnimationDriver;
use crate::scene::camera::{Camera, ProjectionMode};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

const DELTA_ROTATE: f32 = PI / 100.0;
const DELTA_TRANSLATE: f32 = 0.05;
const DELTA_FOVY_DEG: f32 = 5.0;
const DELTA_EXTENT: f32 = 0.1;

/// A physical key. Letters are stored upper-case, so matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Letter(char),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl Key {
    /// `None` for anything but an ASCII letter.
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Self::Letter(c.to_ascii_uppercase()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(c) => write!(f, "{c}"),
            Self::ArrowLeft => f.write_str("Left"),
            Self::ArrowRight => f.write_str("Right"),
            Self::ArrowUp => f.write_str("Up"),
            Self::ArrowDown => f.write_str("Down"),
        }
    }
}

impl FromStr for Key {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let arrow = lower.strip_prefix("arrow").unwrap_or(&lower);
        match arrow {
            "left" => return Ok(Self::ArrowLeft),
            "right" => return Ok(Self::ArrowRight),
            "up" => return Ok(Self::ArrowUp),
            "down" => return Ok(Self::ArrowDown),
            _ => {}
        }

        let mut chars = lower.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Key::letter(c).ok_or_else(|| SketchError::InvalidBinding(format!("unsupported key '{s}'")))
            }
            _ => Err(SketchError::InvalidBinding(format!("unsupported key '{s}'"))),
        }
    }
}

/// One key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key, shift: bool) -> Self {
        Self { key, shift }
    }
}

/// Camera parameter an adjustment key nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraField {
    OrbitAngle,
    EyeHeight,
    OrbitDistance,
    FieldOfView,
    NearPlaneExtent,
    /// Eye and center together along X.
    PanX,
    /// Eye and center together along Y.
    PanY,
}

impl CameraField {
    pub fn default_step(self) -> f32 {
        match self {
            Self::OrbitAngle => DELTA_ROTATE,
            Self::FieldOfView => DELTA_FOVY_DEG.to_radians(),
            Self::NearPlaneExtent => DELTA_EXTENT,
            Self::EyeHeight | Self::OrbitDistance | Self::PanX | Self::PanY => DELTA_TRANSLATE,
        }
    }

    pub fn apply(self, camera: &mut Camera, delta: f32) {
        match self {
            Self::OrbitAngle => camera.orbit_by(delta),
            Self::EyeHeight => camera.raise_eye(delta),
            Self::OrbitDistance => camera.change_distance(delta),
            Self::FieldOfView => camera.change_fovy(delta),
            Self::NearPlaneExtent => camera.change_extent(delta),
            Self::PanX => camera.pan_x(delta),
            Self::PanY => camera.pan_y(delta),
        }
    }
}

impl FromStr for CameraField {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "orbit_angle" | "orbit" => Ok(Self::OrbitAngle),
            "eye_height" => Ok(Self::EyeHeight),
            "orbit_distance" | "distance" => Ok(Self::OrbitDistance),
            "field_of_view" | "fovy" => Ok(Self::FieldOfView),
            "near_plane_extent" | "extent" => Ok(Self::NearPlaneExtent),
            "pan_x" => Ok(Self::PanX),
            "pan_y" => Ok(Self::PanY),
            _ => Err(SketchError::InvalidBinding(format!("unknown camera field '{s}'"))),
        }
    }
}

/// How the sign of an adjustment is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignSource {
    /// Shift held negates the step.
    ShiftInverts,
    /// The step is applied as-is; shift is ignored.
    Fixed,
}

/// A key's camera adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub field: CameraField,
    pub step: f32,
    pub sign: SignSource,
}

impl Binding {
    /// Field's default step, inverted by shift.
    pub fn shifted(field: CameraField) -> Self {
        Self {
            field,
            step: field.default_step(),
            sign: SignSource::ShiftInverts,
        }
    }

    /// Signed step that ignores shift.
    pub fn fixed(field: CameraField, step: f32) -> Self {
        Self {
            field,
            step,
            sign: SignSource::Fixed,
        }
    }

    pub fn delta(&self, shift: bool) -> f32 {
        match self.sign {
            SignSource::ShiftInverts if shift => -self.step,
            _ => self.step,
        }
    }
}

/// Everything a key can do, used when installing bindings from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Projection(ProjectionMode),
    Adjust(Binding),
    ToggleAnimation,
}

/// Declarative key table with three independent command groups.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    projection: HashMap<Key, ProjectionMode>,
    adjust: HashMap<Key, Binding>,
    toggle: HashSet<Key>,
}

impl KeyBindings {
    /// Keys common to both sketches: O/F/P projections, V/B lens, K animation.
    fn common() -> Self {
        let mut bindings = Self::default();
        bindings.bind(Key::Letter('O'), Action::Projection(ProjectionMode::Orthographic));
        bindings.bind(Key::Letter('F'), Action::Projection(ProjectionMode::Frustum));
        bindings.bind(Key::Letter('P'), Action::Projection(ProjectionMode::Perspective));
        bindings.bind(Key::Letter('V'), Action::Adjust(Binding::shifted(CameraField::FieldOfView)));
        bindings.bind(Key::Letter('B'), Action::Adjust(Binding::shifted(CameraField::NearPlaneExtent)));
        bindings.bind(Key::Letter('K'), Action::ToggleAnimation);
        bindings
    }

    /// C orbits, H raises the eye, D changes the orbit distance.
    pub fn satellites() -> Self {
        let mut bindings = Self::common();
        bindings.bind(Key::Letter('C'), Action::Adjust(Binding::shifted(CameraField::OrbitAngle)));
        bindings.bind(Key::Letter('H'), Action::Adjust(Binding::shifted(CameraField::EyeHeight)));
        bindings.bind(Key::Letter('D'), Action::Adjust(Binding::shifted(CameraField::OrbitDistance)));
        bindings
    }

    /// R changes the orbit distance, WASD pans, arrows orbit and raise the eye.
    pub fn atoms() -> Self {
        use CameraField::*;

        let mut bindings = Self::common();
        bindings.bind(Key::Letter('R'), Action::Adjust(Binding::shifted(OrbitDistance)));

        let fixed = [
            (Key::Letter('W'), PanY, DELTA_TRANSLATE),
            (Key::Letter('S'), PanY, -DELTA_TRANSLATE),
            (Key::Letter('A'), PanX, -DELTA_TRANSLATE),
            (Key::Letter('D'), PanX, DELTA_TRANSLATE),
            (Key::ArrowLeft, OrbitAngle, -DELTA_ROTATE),
            (Key::ArrowRight, OrbitAngle, DELTA_ROTATE),
            (Key::ArrowUp, EyeHeight, DELTA_TRANSLATE),
            (Key::ArrowDown, EyeHeight, -DELTA_TRANSLATE),
        ];
        for (key, field, step) in fixed {
            bindings.bind(key, Action::Adjust(Binding::fixed(field, step)));
        }
        bindings
    }

    /// Adds `action` to `key`, replacing whatever the key did in that group.
    pub fn bind(&mut self, key: Key, action: Action) {
        match action {
            Action::Projection(mode) => {
                self.projection.insert(key, mode);
            }
            Action::Adjust(binding) => {
                self.adjust.insert(key, binding);
            }
            Action::ToggleAnimation => {
                self.toggle.insert(key);
            }
        }
    }

    /// Removes every action bound to `key`.
    pub fn unbind(&mut self, key: Key) {
        self.projection.remove(&key);
        self.adjust.remove(&key);
        self.toggle.remove(&key);
    }

    pub fn projection_for(&self, key: Key) -> Option<ProjectionMode> {
        self.projection.get(&key).copied()
    }

    pub fn adjustment_for(&self, key: Key) -> Option<&Binding> {
        self.adjust.get(&key)
    }

    pub fn toggles(&self, key: Key) -> bool {
        self.toggle.contains(&key)
    }
}

/// What one key event changed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dispatch {
    pub projection: Option<ProjectionMode>,
    pub adjusted: Option<CameraField>,
    pub toggled: bool,
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        self.projection.is_some() || self.adjusted.is_some() || self.toggled
    }
}

/// Applies key events to the camera and animation driver through a [`KeyBindings`] table.
#[derive(Debug, Clone)]
pub struct InputController {
    bindings: KeyBindings,
}

impl InputController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    /// Runs the projection, adjustment and toggle groups in that order.
    /// Unbound keys change nothing.
    pub fn handle(
        &self,
        event: KeyEvent,
        camera: &mut Camera,
        driver: &mut AnimationDriver,
    ) -> Dispatch {
        let mut dispatch = Dispatch::default();

        if let Some(mode) = self.bindings.projection_for(event.key) {
            camera.select_projection(mode);
            dispatch.projection = Some(mode);
        }

        if let Some(binding) = self.bindings.adjustment_for(event.key) {
            binding.field.apply(camera, binding.delta(event.shift));
            dispatch.adjusted = Some(binding.field);
        }

        if self.bindings.toggles(event.key) {
            driver.toggle();
            dispatch.toggled = true;
        }

        if dispatch.is_handled() {
            debug!("Key {} (shift: {}) -> {:?}", event.key, event.shift, dispatch);
        }
        dispatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(c: char, shift: bool) -> KeyEvent {
        KeyEvent::new(Key::letter(c).unwrap(), shift)
    }

    #[test]
    fn keys_parse_from_config_names() {
        assert_eq!("k".parse::<Key>().unwrap(), Key::Letter('K'));
        assert_eq!("ArrowLeft".parse::<Key>().unwrap(), Key::ArrowLeft);
        assert_eq!("down".parse::<Key>().unwrap(), Key::ArrowDown);
        assert!("F5".parse::<Key>().is_err());
        assert!(Key::letter('%').is_none());
    }

    #[test]
    fn lower_and_upper_case_are_the_same_key() {
        let controller = InputController::new(KeyBindings::satellites());
        let mut camera = Camera::new(1.0);
        let mut driver = AnimationDriver::default();

        controller.handle(press('v', false), &mut camera, &mut driver);
        controller.handle(press('V', true), &mut camera, &mut driver);
        assert!((camera.fovy - 60f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn shift_inverts_satellite_orbit() {
        let controller = InputController::new(KeyBindings::satellites());
        let mut camera = Camera::new(1.0);
        let mut driver = AnimationDriver::default();

        controller.handle(press('c', false), &mut camera, &mut driver);
        assert!((camera.orbit_angle - DELTA_ROTATE).abs() < 1e-6);

        controller.handle(press('c', true), &mut camera, &mut driver);
        controller.handle(press('c', true), &mut camera, &mut driver);
        assert!((camera.orbit_angle - (std::f32::consts::TAU - DELTA_ROTATE)).abs() < 1e-5);
    }

    #[test]
    fn atoms_pan_ignores_shift() {
        let controller = InputController::new(KeyBindings::atoms());
        let mut camera = Camera::new(1.0);
        let mut driver = AnimationDriver::default();

        controller.handle(press('a', true), &mut camera, &mut driver);
        assert!((camera.center.x + DELTA_TRANSLATE).abs() < 1e-6);
        assert!((camera.eye.x + DELTA_TRANSLATE).abs() < 1e-6);

        controller.handle(KeyEvent::new(Key::ArrowUp, true), &mut camera, &mut driver);
        assert!((camera.eye.y - 1.05).abs() < 1e-6);
        assert_eq!(camera.center.y, 0.0);
    }

    #[test]
    fn d_means_different_things_per_sketch() {
        let mut driver = AnimationDriver::default();

        let mut camera = Camera::new(1.0);
        InputController::new(KeyBindings::satellites()).handle(press('d', false), &mut camera, &mut driver);
        assert!((camera.orbit_distance - 4.05).abs() < 1e-6);

        let mut camera = Camera::new(1.0);
        InputController::new(KeyBindings::atoms()).handle(press('d', false), &mut camera, &mut driver);
        assert_eq!(camera.orbit_distance, 4.0);
        assert!((camera.center.x - DELTA_TRANSLATE).abs() < 1e-6);
    }

    #[test]
    fn projection_and_toggle_groups() {
        let controller = InputController::new(KeyBindings::atoms());
        let mut camera = Camera::new(1.0);
        let mut driver = AnimationDriver::default();

        camera.near_plane_extent = 5.0;
        let dispatch = controller.handle(press('f', false), &mut camera, &mut driver);
        assert_eq!(dispatch.projection, Some(ProjectionMode::Frustum));
        assert_eq!(camera.near_plane_extent, 1.2);

        assert!(controller.handle(press('k', false), &mut camera, &mut driver).toggled);
        assert!(driver.is_enabled());
        controller.handle(press('K', true), &mut camera, &mut driver);
        assert!(!driver.is_enabled());
    }

    #[test]
    fn unbound_key_is_ignored() {
        let controller = InputController::new(KeyBindings::satellites());
        let mut camera = Camera::new(1.0);
        let before = camera.clone();
        let mut driver = AnimationDriver::default();

        let dispatch = controller.handle(press('z', false), &mut camera, &mut driver);
        assert!(!dispatch.is_handled());
        assert_eq!(camera.eye, before.eye);
        assert_eq!(camera.orbit_angle, before.orbit_angle);
    }

    #[test]
    fn key_in_several_groups_applies_all_in_order() {
        let mut bindings = KeyBindings::satellites();
        bindings.bind(Key::Letter('O'), Action::Adjust(Binding::shifted(CameraField::NearPlaneExtent)));
        let controller = InputController::new(bindings);
        let mut camera = Camera::new(1.0);
        let mut driver = AnimationDriver::default();

        camera.near_plane_extent = 9.0;
        controller.handle(press('o', false), &mut camera, &mut driver);
        // Reset to 2.0 first, then nudged.
        assert!((camera.near_plane_extent - 2.1).abs() < 1e-6);

        let mut bindings = controller.bindings().clone();
        bindings.unbind(Key::Letter('O'));
        assert!(bindings.projection_for(Key::Letter('O')).is_none());
        assert!(bindings.adjustment_for(Key::Letter('O')).is_none());
    }
}
