use egui::{Pos2, Rect, Vec2};

/// Where the canvas sits on screen.
///
/// The canvas is letterboxed into the available area keeping its aspect
/// ratio; this converts pointer positions into canvas pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    /// Screen rectangle the canvas image occupies
    pub rect: Rect,
    /// Canvas size in pixels
    pub canvas_size: Vec2,
}

impl CanvasView {
    pub fn fit(available: Rect, canvas_size: Vec2) -> Self {
        let scale = (available.width() / canvas_size.x)
            .min(available.height() / canvas_size.y)
            .max(f32::EPSILON);
        let rect = Rect::from_center_size(available.center(), canvas_size * scale);
        Self { rect, canvas_size }
    }

    /// Screen points per canvas pixel
    pub fn scale(&self) -> f32 {
        self.rect.width() / self.canvas_size.x
    }

    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        ((screen - self.rect.min) / self.scale()).to_pos2()
    }

    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        self.rect.min + canvas.to_vec2() * self.scale()
    }
}
