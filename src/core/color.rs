use nalgebra::{Vector3, Vector4};

/// Opaque black, used for wireframe edges.
pub const BLACK: Vector4<f32> = Vector4::new(0.0, 0.0, 0.0, 1.0);

/// Quantizes a linear 0..1 channel to 8 bits. Out-of-range values saturate.
#[inline]
pub fn channel_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Opaque RGBA8 pixel for a color. The canvas is never blended, so alpha is dropped.
#[inline]
pub fn to_rgba8(color: &Vector3<f32>) -> [u8; 4] {
    [
        channel_to_u8(color.x),
        channel_to_u8(color.y),
        channel_to_u8(color.z),
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_saturate() {
        assert_eq!(to_rgba8(&Vector3::new(-1.0, 0.5, 2.0)), [0, 128, 255, 255]);
    }
}
