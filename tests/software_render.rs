use orbit_sketch::app::{create_device, run_headless};
use orbit_sketch::core::framebuffer::FrameBuffer;
use orbit_sketch::io::config::Config;
use orbit_sketch::pipeline::SoftwareDevice;
use orbit_sketch::session::Session;
use orbit_sketch::sketches::SketchKind;
use orbit_sketch::ui::{Key, KeyEvent};

#[cfg(test)]
mod software_render_tests {
    use super::*;

    fn small_config(sketch: SketchKind) -> Config {
        let mut config = Config::for_sketch(sketch);
        config.window.width = 64;
        config.window.height = 48;
        config.animation.seed = Some(3);
        config
    }

    fn start(sketch: SketchKind) -> Session<SoftwareDevice> {
        let config = small_config(sketch);
        Session::start(create_device(&config).unwrap(), &config).unwrap()
    }

    fn covered_pixels(fb: &FrameBuffer) -> usize {
        let mut count = 0;
        for y in 0..fb.height {
            for x in 0..fb.width {
                let color = fb.get_pixel(x, y).unwrap();
                if (color.x - 0.95).abs() > 0.01
                    || (color.y - 0.95).abs() > 0.01
                    || (color.z - 0.95).abs() > 0.01
                {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_satellites_first_frame() {
        let session = start(SketchKind::Satellites);
        let fb = session.device().framebuffer();

        assert_eq!((fb.width, fb.height), (64, 48));

        let corner = fb.get_pixel(0, 0).unwrap();
        assert!(
            (corner.x - 0.95).abs() < 1e-6,
            "Top-left pixel should be the clear color, got {:?}",
            corner
        );

        let covered = covered_pixels(fb);
        assert!(covered > 50, "Expected visible models, only {} pixels drawn", covered);
        assert!(covered < 64 * 48, "Background should remain visible");
    }

    #[test]
    fn test_projection_key_changes_frame() {
        let mut session = start(SketchKind::Satellites);
        let before = session.device().framebuffer().to_rgba8();

        let dispatch = session.handle_key(KeyEvent::new(Key::Letter('O'), false));
        assert!(dispatch.is_handled());

        let after = session.device().framebuffer().to_rgba8();
        assert_ne!(before, after, "Orthographic projection should change the image");
    }

    #[test]
    fn test_atoms_animation_changes_frame() {
        let mut session = start(SketchKind::Atoms);
        let before = session.device().framebuffer().to_rgba8();

        session.set_animation_enabled(true);
        for _ in 0..4 {
            assert!(session.tick(), "Enabled tick should render");
        }

        let after = session.device().framebuffer().to_rgba8();
        assert_ne!(before, after, "Spinning rings and rain should change the image");
        assert_eq!(session.frames_rendered(), 5);
    }

    #[test]
    fn test_headless_run_writes_image() {
        let path = std::env::temp_dir().join(format!(
            "orbit_sketch_headless_{}.png",
            std::process::id()
        ));
        let config = small_config(SketchKind::Atoms);

        let written = run_headless(&config, 3, Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let image = image::open(&path).unwrap();
        assert_eq!(image.width(), 64);
        assert_eq!(image.height(), 48);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let mut config = small_config(SketchKind::Satellites);
        config.window.width = 0;
        assert!(create_device(&config).is_err());
    }
}
