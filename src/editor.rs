//! The editor state provider.
//!
//! [`Editor`] owns everything about the image being cleaned up: the source
//! file, its decoded pixels, the visible canvas, the mask sent to the
//! inpainting service and the history of edit batches. UI code holds an
//! `Editor` and calls its operations from event handlers; nothing in here
//! knows about egui.
//!
//! # Batching
//!
//! In non-HD mode every committed stroke becomes its own batch and its
//! render is stored with it, so each undo removes one stroke together with
//! the render it produced. In HD mode strokes accumulate in the current
//! batch until [`Editor::render`] wraps the result in a new batch; undo then
//! peels strokes off one by one before dropping whole renders.

use egui::Pos2;
use image::RgbaImage;
use std::sync::Arc;

use crate::canvas::{self, Canvas};
use crate::config::EditorConfig;
use crate::download;
use crate::error::{EditorError, EditorResult};
use crate::history::EditHistory;
use crate::render::{RenderJob, RenderOutcome};
use crate::services::{AnalyticsEvent, DownloadMode, ExportFile, Services, SourceFile};
use crate::stroke::Line;
use crate::util::time;

pub struct Editor {
    services: Services,
    config: EditorConfig,
    file: Option<SourceFile>,
    original: Option<Arc<RgbaImage>>,
    canvas: Option<Canvas>,
    mask: Option<Canvas>,
    history: EditHistory,
    use_hd: bool,
    pro_styled: bool,
    // Bumped on every canvas change
    revision: u64,
    // Bumped whenever the history is re-seeded; stale renders are dropped
    generation: u64,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("file", &self.file)
            .field("canvas", &self.canvas)
            .field("history", &self.history)
            .field("use_hd", &self.use_hd)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Editor {
    /// An editor with no file loaded. HD defaults to the user's tier.
    pub fn new(services: Services, config: EditorConfig) -> Self {
        let use_hd = services.user.is_pro();
        Self {
            services,
            config,
            file: None,
            original: None,
            canvas: None,
            mask: None,
            history: EditHistory::new(),
            use_hd,
            pro_styled: use_hd,
            revision: 0,
            generation: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.config.brush_size = size.max(1.0);
    }

    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    pub fn original(&self) -> Option<&Arc<RgbaImage>> {
        self.original.as_ref()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// The mask from the most recent render request
    pub fn mask(&self) -> Option<&Canvas> {
        self.mask.as_ref()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Strokes of the batch being drawn into
    pub fn current_lines(&self) -> &[Line] {
        self.history.current().lines()
    }

    pub fn use_hd(&self) -> bool {
        self.use_hd
    }

    /// Whether the UI should wear its "pro" styling
    pub fn is_pro_styled(&self) -> bool {
        self.pro_styled
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Load a new image and start a fresh history
    pub fn set_file(&mut self, file: SourceFile) -> EditorResult<()> {
        let original = image::load_from_memory(&file.bytes)?.to_rgba8();
        log::info!(
            "Loaded {} ({}x{})",
            file.name,
            original.width(),
            original.height()
        );
        self.original = Some(Arc::new(original));
        self.file = Some(file);
        self.reseed();
        self.resize_canvas()?;
        self.draw()
    }

    /// Switch between HD and preview editing. Always starts a fresh history.
    pub fn set_use_hd(&mut self, use_hd: bool) -> EditorResult<()> {
        self.use_hd = use_hd;
        self.pro_styled = use_hd;
        self.reseed();
        if self.original.is_some() {
            self.resize_canvas()?;
            self.draw()?;
        }
        Ok(())
    }

    fn reseed(&mut self) {
        self.history.reset();
        self.mask = None;
        self.generation += 1;
    }

    fn resize_canvas(&mut self) -> EditorResult<()> {
        let original = self.original.as_ref().ok_or(EditorError::NoCanvas)?;
        let (width, height) = canvas_dimensions(
            original.dimensions(),
            self.use_hd,
            self.config.preview_max_dimension,
        );
        self.canvas = Some(Canvas::new(width, height)?);
        self.mask = None;
        Ok(())
    }

    /// Extend the stroke being drawn. Coordinates are canvas pixels.
    pub fn add_point(&mut self, point: Pos2) {
        self.history.push_point(point, self.config.brush_size);
    }

    /// Begin a new stroke. One that is still waiting for a render stays in
    /// the current batch alongside it.
    pub fn start_stroke(&mut self) {
        self.history.start_line();
    }

    /// Commit the stroke being drawn and open the next one
    pub fn add_line(&mut self) -> EditorResult<()> {
        if self.history.add_line(self.use_hd) && self.canvas.is_some() {
            self.draw()?;
        }
        Ok(())
    }

    /// Undo the latest stroke or batch. Returns false if there was nothing
    /// to undo.
    pub fn undo(&mut self) -> EditorResult<bool> {
        if !self.history.undo(self.use_hd) {
            log::warn!("No edit to undo");
            return Ok(false);
        }
        if self.canvas.is_some() {
            self.draw()?;
        }
        Ok(true)
    }

    /// Repaint the visible canvas: the latest render (or the original)
    /// with the current batch's strokes highlighted on top.
    pub fn draw(&mut self) -> EditorResult<()> {
        let original = self.original.as_ref().ok_or(EditorError::NoCanvas)?;
        let canvas = self.canvas.as_mut().ok_or(EditorError::NoCanvas)?;
        if canvas.width() == 0 || canvas.height() == 0 {
            return Err(EditorError::ZeroSizeCanvas);
        }

        canvas.clear();
        let base = self.history.latest_render().unwrap_or(original);
        canvas.draw_image(base);
        canvas.draw_lines(self.history.current().lines(), self.config.highlight_color);
        self.revision += 1;
        Ok(())
    }

    /// Send the image and every stroke so far to the inpainting service and
    /// show the result.
    ///
    /// Failures are reported to analytics and the user before being
    /// returned.
    pub async fn render(&mut self) -> EditorResult<()> {
        let job = self.begin_render()?;
        let outcome = job.run().await;
        self.finish_render(outcome)
    }

    /// Build the mask and package the request. The returned job can run on
    /// any executor.
    pub fn begin_render(&mut self) -> EditorResult<RenderJob> {
        self.prepare_render().map_err(|err| {
            self.report_render_failure(&err);
            err
        })
    }

    fn prepare_render(&mut self) -> EditorResult<RenderJob> {
        let file = self.file.clone().ok_or(EditorError::NoCanvas)?;
        let [width, height] = self.canvas.as_ref().ok_or(EditorError::NoCanvas)?.size();
        let mask = canvas::render_mask(self.history.all_lines(), width, height)?;
        let data_url = mask.to_data_url()?;
        self.mask = Some(mask);
        log::info!("Rendering {} with {} strokes", file.name, self.history.all_lines().count());
        Ok(RenderJob::new(self.services.clone(), file, data_url, self.generation))
    }

    /// Apply the result of a [`RenderJob`]
    pub fn finish_render(&mut self, outcome: RenderOutcome) -> EditorResult<()> {
        if outcome.generation != self.generation {
            log::warn!("Dropping render for a history that has since been reset");
            return Ok(());
        }

        match outcome.result {
            Ok(render) => {
                let (width, height) = render.dimensions();
                self.services.analytics.log_event(AnalyticsEvent::InpaintProcessed {
                    duration_secs: time::elapsed_secs(outcome.started_at),
                    width,
                    height,
                });
                self.history.push_render(Arc::new(render), self.use_hd);
                log::info!("Render finished ({width}x{height})");
                self.draw()
            }
            Err(err) => {
                self.report_render_failure(&err);
                // Keep the unrendered stroke highlighted
                self.draw()?;
                Err(err)
            }
        }
    }

    fn report_render_failure(&self, err: &EditorError) {
        log::error!("Render failed: {err}");
        self.services.analytics.log_event(AnalyticsEvent::InpaintFailed {
            error: err.to_string(),
        });
        self.services.alerts.alert(&err.to_string());
    }

    /// The image a download would produce: full resolution in HD, the
    /// visible canvas otherwise.
    pub fn final_image(&self) -> EditorResult<RgbaImage> {
        if self.use_hd {
            let original = self.original.as_ref().ok_or(EditorError::NoCanvas)?;
            let render = self.history.latest_render().map(|render| render.as_ref());
            Ok(download::full_resolution(original, render))
        } else {
            let canvas = self.canvas.as_ref().ok_or(EditorError::NoCanvas)?;
            Ok(canvas.image().clone())
        }
    }

    /// Export the final image, through the share sheet when one exists
    pub fn download(&self) -> EditorResult<DownloadMode> {
        let file = self.file.as_ref().ok_or(EditorError::NoCanvas)?;
        let image = self.final_image()?;
        let (name, format) = download::export_target(&file.name, &self.config.download_suffix);
        let export = ExportFile {
            name,
            mime: format.to_mime_type(),
            bytes: canvas::encode(&image, format)?,
        };

        let exporter = &self.services.exporter;
        let result = if exporter.can_share() {
            exporter.share(export).map(|()| DownloadMode::Share)
        } else {
            exporter.download(export).map(|()| DownloadMode::Download)
        };
        let mode = result.map_err(|err| {
            log::error!("Download failed: {err}");
            err
        })?;

        log::info!("Downloaded {} via {mode:?}", file.name);
        self.services.analytics.log_event(AnalyticsEvent::Download { mode });
        Ok(mode)
    }
}

/// Canvas size for an image: full size in HD, otherwise capped so the
/// longest side is at most `max_dimension` (0 means uncapped).
pub fn canvas_dimensions((width, height): (u32, u32), use_hd: bool, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if use_hd || max_dimension == 0 || longest <= max_dimension {
        return (width, height);
    }
    let scale = max_dimension as f64 / longest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_dimensions() {
        assert_eq!(canvas_dimensions((1440, 720), false, 720), (720, 360));
        assert_eq!(canvas_dimensions((1440, 720), true, 720), (1440, 720));
        assert_eq!(canvas_dimensions((300, 200), false, 720), (300, 200));
        assert_eq!(canvas_dimensions((5000, 1), false, 720), (720, 1));
        assert_eq!(canvas_dimensions((5000, 10), false, 0), (5000, 10));
    }
}
