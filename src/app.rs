use crate::error::{Result, SketchError};
use crate::io::config::Config;
use crate::io::image::save_framebuffer;
use crate::pipeline::software::SoftwareDevice;
use crate::session::Session;
use crate::ui::input::{Key, KeyEvent};
use chrono::Local;
use egui::{ColorImage, TextureHandle, TextureOptions, Vec2};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Builds the software device described by the `[window]` and `[render]` sections.
pub fn create_device(config: &Config) -> Result<SoftwareDevice> {
    Ok(SoftwareDevice::new(config.window.width, config.window.height)?
        .with_clear_color(config.render.clear_color())
        .with_back_face_culling(config.render.cull_back_faces)
        .with_polygon_offset(config.render.polygon_offset))
}

/// Maps an egui key to a sketch key. Only letters and arrows are used.
fn map_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::ArrowLeft => Some(Key::ArrowLeft),
        egui::Key::ArrowRight => Some(Key::ArrowRight),
        egui::Key::ArrowUp => Some(Key::ArrowUp),
        egui::Key::ArrowDown => Some(Key::ArrowDown),
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::letter(c),
                _ => None,
            }
        }
    }
}

/// Window front end: shows the software framebuffer and forwards keys and frame time.
pub struct SketchApp {
    session: Session<SoftwareDevice>,
    texture: Option<TextureHandle>,
    shown_frame: u64,
    last_update: Instant,
}

impl SketchApp {
    pub fn new(session: Session<SoftwareDevice>, _cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session,
            texture: None,
            shown_frame: 0,
            last_update: Instant::now(),
        }
    }

    fn key_events(ctx: &egui::Context) -> Vec<KeyEvent> {
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => map_key(*key).map(|k| KeyEvent::new(k, modifiers.shift)),
                    _ => None,
                })
                .collect()
        })
    }

    /// Re-uploads the framebuffer if a frame was rendered since the last upload.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let frame = self.session.frames_rendered();
        if self.texture.is_some() && frame == self.shown_frame {
            return;
        }

        let framebuffer = self.session.device().framebuffer();
        let image = ColorImage::from_rgba_unmultiplied(
            [framebuffer.width, framebuffer.height],
            &framebuffer.to_rgba8(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => self.texture = Some(ctx.load_texture("frame", image, TextureOptions::NEAREST)),
        }
        self.shown_frame = frame;
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for event in Self::key_events(ctx) {
            let dispatch = self.session.handle_key(event);
            if !dispatch.is_handled() {
                debug!("Unbound key {}", event.key);
            }
        }

        let now = Instant::now();
        self.session.advance(now - self.last_update);
        self.last_update = now;

        self.sync_texture(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(Vec2::new(
                        texture.size()[0] as f32,
                        texture.size()[1] as f32,
                    )));
                }
            });

        // The clock only needs servicing while ticks have an effect.
        if self.session.driver().is_enabled() {
            ctx.request_repaint_after(self.session.driver().period());
        }
    }
}

/// Opens a fixed-size window running the configured sketch.
pub fn run_gui(config: Config) -> Result<()> {
    let device = create_device(&config)?;
    let session = Session::start(device, &config)?;

    info!("Controls: {}", session.sketch().controls());

    let size = [config.window.width as f32, config.window.height as f32];
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        &config.window.title,
        options,
        Box::new(|cc| Ok(Box::new(SketchApp::new(session, cc)))),
    )
    .map_err(|e| SketchError::Initialization(format!("window: {e}")))
}

/// Timestamped output name, e.g. `sketch_atoms_20260101_120000.png`.
pub fn timestamped_output(config: &Config) -> PathBuf {
    PathBuf::from(format!(
        "sketch_{}_{}.png",
        config.sketch,
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Renders without a window, optionally runs `ticks` enabled animation ticks, and
/// saves the last frame. Returns the written path.
pub fn run_headless(config: &Config, ticks: u32, output: Option<PathBuf>) -> Result<PathBuf> {
    let device = create_device(config)?;
    let mut session = Session::start(device, config)?;

    if ticks > 0 {
        session.set_animation_enabled(true);
        let rendered = (0..ticks).filter(|_| session.tick()).count();
        info!("Ran {ticks} animation ticks ({rendered} frames)");
    }

    let path = output
        .or_else(|| (!config.render.output.is_empty()).then(|| PathBuf::from(&config.render.output)))
        .unwrap_or_else(|| timestamped_output(config));

    save_framebuffer(session.device().framebuffer(), &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egui_keys_map_to_sketch_keys() {
        assert_eq!(map_key(egui::Key::K), Some(Key::Letter('K')));
        assert_eq!(map_key(egui::Key::ArrowDown), Some(Key::ArrowDown));
        assert_eq!(map_key(egui::Key::Num1), None);
        assert_eq!(map_key(egui::Key::Escape), None);
    }

    #[test]
    fn timestamped_name_mentions_sketch() {
        let config = Config::for_sketch(crate::sketches::SketchKind::Atoms);
        let name = timestamped_output(&config);
        let name = name.to_string_lossy();
        assert!(name.starts_with("sketch_atoms_"));
        assert!(name.ends_with(".png"));
    }
}
