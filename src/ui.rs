pub mod input;

pub use input::{Action, Binding, CameraField, InputController, Key, KeyBindings, KeyEvent, SignSource};
