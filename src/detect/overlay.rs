use super::model::Detection;
use std::sync::Mutex;

/// Caption padding in pixels
const CAPTION_PAD: f32 = 6.0;
/// Height of the caption background box
const CAPTION_HEIGHT: f32 = 22.0;

/// Write-only drawing sink for the detection overlay.
///
/// The loop is the single writer; implementations map these calls onto
/// whatever surface the presentation layer provides (a canvas, a frame
/// buffer, a command log in tests).
pub trait OverlaySurface: Send + Sync {
    /// Surface size in pixels (width, height)
    fn size(&self) -> (f32, f32);
    fn clear(&self);
    fn stroke_rect(&self, x: f32, y: f32, width: f32, height: f32);
    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32);
    fn fill_text(&self, text: &str, x: f32, y: f32);
    /// Rendered width of `text` in pixels
    fn measure_text(&self, text: &str) -> f32;
}

/// Draw bounding boxes and captions for one inference pass.
///
/// The caption sits above its box, clamped so it never draws past the top
/// edge of the surface.
pub fn draw_detections(surface: &dyn OverlaySurface, detections: &[Detection]) {
    surface.clear();
    for detection in detections {
        let b = detection.bbox;
        surface.stroke_rect(b.x, b.y, b.width, b.height);

        let caption = format!(
            "{} {:.0}%",
            detection.display_label(),
            detection.confidence * 100.0
        );
        let text_width = surface.measure_text(&caption);
        surface.fill_rect(
            b.x,
            (b.y - 24.0).max(CAPTION_PAD),
            text_width + CAPTION_PAD * 2.0,
            CAPTION_HEIGHT,
        );
        surface.fill_text(
            &caption,
            b.x + CAPTION_PAD,
            (b.y - 8.0).max(CAPTION_PAD + 6.0),
        );
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    StrokeRect { x: f32, y: f32, width: f32, height: f32 },
    FillRect { x: f32, y: f32, width: f32, height: f32 },
    FillText { text: String, x: f32, y: f32 },
}

/// Overlay surface that records drawing calls instead of rasterizing.
/// Used by tests and headless runs.
#[derive(Debug)]
pub struct CommandSurface {
    size: (f32, f32),
    commands: Mutex<Vec<DrawCommand>>,
}

impl CommandSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: (width, height),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.lock().expect("command log poisoned").clone()
    }
}

impl OverlaySurface for CommandSurface {
    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn clear(&self) {
        self.commands
            .lock()
            .expect("command log poisoned")
            .push(DrawCommand::Clear);
    }

    fn stroke_rect(&self, x: f32, y: f32, width: f32, height: f32) {
        self.commands
            .lock()
            .expect("command log poisoned")
            .push(DrawCommand::StrokeRect { x, y, width, height });
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32) {
        self.commands
            .lock()
            .expect("command log poisoned")
            .push(DrawCommand::FillRect { x, y, width, height });
    }

    fn fill_text(&self, text: &str, x: f32, y: f32) {
        self.commands
            .lock()
            .expect("command log poisoned")
            .push(DrawCommand::FillText {
                text: text.to_string(),
                x,
                y,
            });
    }

    fn measure_text(&self, text: &str) -> f32 {
        // 14px font approximation, good enough for layout
        text.len() as f32 * 7.0
    }
}
