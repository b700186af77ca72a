pub mod device;
pub mod renderer;
pub mod shaders;
pub mod software;

pub use device::{BufferHandle, NormalSource, Primitive, RenderDevice};
pub use renderer::Renderer;
pub use software::SoftwareDevice;
