use egui::Pos2;
use image::RgbaImage;
use std::sync::Arc;

use crate::stroke::Line;

/// A group of strokes undone as one unit, plus the image the inpainting
/// service returned for it (if any).
#[derive(Clone)]
pub struct EditBatch {
    lines: Vec<Line>,
    render: Option<Arc<RgbaImage>>,
}

// Custom Debug implementation so renders print as dimensions, not pixels
impl std::fmt::Debug for EditBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditBatch")
            .field("lines", &self.lines.len())
            .field("render", &self.render.as_ref().map(|img| img.dimensions()))
            .finish()
    }
}

impl EditBatch {
    fn open() -> Self {
        Self {
            lines: vec![Line::new(0.0)],
            render: None,
        }
    }

    fn with_render(render: Arc<RgbaImage>) -> Self {
        Self {
            render: Some(render),
            ..Self::open()
        }
    }

    /// All strokes, including the trailing open one if present
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Strokes that carry points
    pub fn committed(&self) -> &[Line] {
        match self.lines.last() {
            Some(last) if last.is_empty() => &self.lines[..self.lines.len() - 1],
            _ => &self.lines,
        }
    }

    pub fn render(&self) -> Option<&Arc<RgbaImage>> {
        self.render.as_ref()
    }

    /// True if the batch holds nothing but an empty slot
    pub fn is_bare(&self) -> bool {
        self.render.is_none() && self.committed().is_empty()
    }

    fn is_open(&self) -> bool {
        self.lines.last().is_some_and(Line::is_empty)
    }

    fn seal(&mut self) {
        if self.is_open() {
            self.lines.pop();
        }
    }
}

/// Ordered edit batches for the loaded file.
///
/// Never empty, and the last batch always ends with an empty stroke ready
/// to receive points. In non-HD mode every stroke gets its own batch and a
/// render is stored on the batch of the stroke it was made from, so one
/// undo takes both away. In HD mode strokes pile up in the current batch
/// until a render closes it.
#[derive(Debug, Clone)]
pub struct EditHistory {
    batches: Vec<EditBatch>,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self {
            batches: vec![EditBatch::open()],
        }
    }

    /// Drop everything and start again from one empty batch
    pub fn reset(&mut self) {
        self.batches.clear();
        self.batches.push(EditBatch::open());
    }

    pub fn batches(&self) -> &[EditBatch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of batches holding a stroke or a render
    pub fn committed_len(&self) -> usize {
        self.batches.iter().filter(|batch| !batch.is_bare()).count()
    }

    pub fn current(&self) -> &EditBatch {
        // The constructor seeds one batch and nothing removes the last one.
        &self.batches[self.batches.len() - 1]
    }

    fn current_mut(&mut self) -> &mut EditBatch {
        let last = self.batches.len() - 1;
        &mut self.batches[last]
    }

    /// Every stroke with points, oldest first, across all batches
    pub fn all_lines(&self) -> impl Iterator<Item = &Line> {
        self.batches
            .iter()
            .flat_map(|batch| batch.lines.iter())
            .filter(|line| !line.is_empty())
    }

    /// The newest render at or before the current batch
    pub fn latest_render(&self) -> Option<&Arc<RgbaImage>> {
        self.batches.iter().rev().find_map(|batch| batch.render.as_ref())
    }

    /// Extend the open stroke of the current batch
    pub fn push_point(&mut self, point: Pos2, size: f32) {
        let batch = self.current_mut();
        if batch.lines.is_empty() {
            batch.lines.push(Line::new(size));
        }
        if let Some(line) = batch.lines.last_mut() {
            line.push(point, size);
        }
    }

    /// Commit the open stroke and open a new one.
    ///
    /// Returns false when the open stroke had no points; the slot is then
    /// reused as is.
    pub fn add_line(&mut self, use_hd: bool) -> bool {
        if self.current().is_open() {
            return false;
        }
        if use_hd {
            self.current_mut().lines.push(Line::new(0.0));
        } else {
            self.batches.push(EditBatch::open());
        }
        log::debug!("Committed stroke, {} batches", self.batches.len());
        true
    }

    /// Open a new stroke next to a finished one in the current batch.
    ///
    /// Returns false when the open stroke is still empty.
    pub fn start_line(&mut self) -> bool {
        if self.current().is_open() {
            return false;
        }
        self.current_mut().lines.push(Line::new(0.0));
        true
    }

    /// Store a fresh render.
    ///
    /// HD wraps it in a new batch that collects the next strokes. Non-HD
    /// attaches it to the batch holding the strokes it was made from and
    /// opens a new batch after it. Either way a trailing bare batch is
    /// dropped first.
    pub fn push_render(&mut self, render: Arc<RgbaImage>, use_hd: bool) {
        if self.batches.len() > 1 && self.current().is_bare() {
            self.batches.pop();
        }
        self.current_mut().seal();
        if use_hd {
            self.batches.push(EditBatch::with_render(render));
        } else {
            self.current_mut().render = Some(render);
            self.batches.push(EditBatch::open());
        }
        log::debug!("Stored render, {} batches", self.batches.len());
    }

    pub fn can_undo(&self) -> bool {
        self.batches.len() > 1 || !self.batches[0].is_bare()
    }

    /// Remove the most recent stroke or batch.
    ///
    /// HD mode peels strokes off the current batch one at a time before it
    /// drops whole batches. Returns false if there was nothing to undo.
    pub fn undo(&mut self, use_hd: bool) -> bool {
        if !self.can_undo() {
            return false;
        }

        if self.batches.len() > 1 && self.current().is_bare() {
            self.batches.pop();
        }

        let target = self.current_mut();
        if use_hd && !target.committed().is_empty() {
            target.seal();
            target.lines.pop();
        } else if self.batches.len() > 1 {
            self.batches.pop();
        } else {
            let first = &mut self.batches[0];
            first.lines.clear();
            first.render = None;
        }

        self.reopen(use_hd);
        log::debug!("Undo, {} batches left", self.batches.len());
        true
    }

    fn reopen(&mut self, use_hd: bool) {
        if self.current().is_open() {
            return;
        }
        if use_hd || self.current().is_bare() {
            self.current_mut().lines.push(Line::new(0.0));
        } else {
            self.batches.push(EditBatch::open());
        }
    }
}
