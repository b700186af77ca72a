use crate::core::framebuffer::FrameBuffer;
use crate::error::{Result, SketchError};
use image::RgbaImage;
use log::info;
use std::path::Path;

/// Copies the framebuffer into an RGBA image, top row first.
pub fn framebuffer_to_image(framebuffer: &FrameBuffer) -> Result<RgbaImage> {
    RgbaImage::from_raw(
        framebuffer.width as u32,
        framebuffer.height as u32,
        framebuffer.to_rgba8(),
    )
    .ok_or_else(|| SketchError::Initialization("framebuffer size does not match its pixel data".into()))
}

/// Saves the framebuffer as an image; the format follows the file extension.
pub fn save_framebuffer<P: AsRef<Path>>(framebuffer: &FrameBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    framebuffer_to_image(framebuffer)?.save(path)?;
    info!(
        "Saved {}x{} frame to '{}'",
        framebuffer.width,
        framebuffer.height,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn image_matches_framebuffer() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.clear(Vector3::new(1.0, 0.0, 0.0), f32::INFINITY);
        fb.plot(2, 1, 0.0, Vector3::new(0.0, 0.0, 1.0));

        let image = framebuffer_to_image(&fb).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(2, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn png_is_written() {
        let fb = FrameBuffer::new(4, 4);
        let path = std::env::temp_dir().join(format!("orbit_sketch_{}.png", std::process::id()));
        save_framebuffer(&fb, &path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
