pub mod flat;

pub use flat::FlatShader;
