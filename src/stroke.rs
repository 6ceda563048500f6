use egui::Pos2;
use serde::{Deserialize, Serialize};

/// One continuous pointer drag over the canvas.
///
/// Points are in canvas pixel coordinates. A line with no points is the
/// "open" slot that the next drag fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    points: Vec<Pos2>,
    size: f32,
}

impl Line {
    pub fn new(size: f32) -> Self {
        Self {
            points: Vec::new(),
            size,
        }
    }

    pub fn with_points(size: f32, points: Vec<Pos2>) -> Self {
        Self { points, size }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Brush diameter in canvas pixels
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    // The brush size is taken when the first point lands, so a slider change
    // mid-drag does not reshape the stroke.
    pub(crate) fn push(&mut self, point: Pos2, size: f32) {
        if self.points.is_empty() {
            self.size = size;
        }
        self.points.push(point);
    }
}
