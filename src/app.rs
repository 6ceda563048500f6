use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::file_handler::{self, FileHandler};
use crate::panels;
use crate::render::{RenderJob, RenderOutcome};
use crate::services::{Alerts, Services, SourceFile};

/// We derive Deserialize/Serialize so we can persist app settings on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppSettings {
    pub config: EditorConfig,
    /// Last HD choice; `None` defers to the user's tier
    pub use_hd: Option<bool>,
}

/// What the binary was started with
#[derive(Debug, Default, Clone)]
pub struct Launch {
    pub file: Option<PathBuf>,
    /// Overrides the persisted config when set
    pub config: Option<EditorConfig>,
}

/// Alerts queued for the modal window, oldest first
#[derive(Debug, Default)]
pub struct ModalAlerts {
    pending: Mutex<Vec<String>>,
}

impl ModalAlerts {
    pub fn current(&self) -> Option<String> {
        self.pending.lock().first().cloned()
    }

    pub fn dismiss(&self) {
        let mut pending = self.pending.lock();
        if !pending.is_empty() {
            pending.remove(0);
        }
    }
}

impl Alerts for ModalAlerts {
    fn alert(&self, message: &str) {
        self.pending.lock().push(message.to_owned());
    }
}

pub struct InpaintApp {
    editor: Editor,
    settings: AppSettings,
    alerts: Arc<ModalAlerts>,
    file_handler: FileHandler,
    canvas_texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    pending_render: Arc<Mutex<Option<RenderOutcome>>>,
    render_in_flight: bool,
    applied_pro_style: Option<bool>,
}

impl InpaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, launch: Launch) -> Self {
        let mut settings: AppSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        if let Some(config) = launch.config {
            settings.config = config;
        }

        let mut app = Self::with_settings(settings);
        if let Some(path) = launch.file {
            match file_handler::load_path(&path) {
                Ok(file) => app.open(file),
                Err(err) => app.alerts.alert(&format!("Cannot open {}: {err}", path.display())),
            }
        }
        app
    }

    fn with_settings(settings: AppSettings) -> Self {
        let alerts = Arc::new(ModalAlerts::default());
        let services = Services::local(settings.config.download_dir.clone()).with_alerts(alerts.clone());
        let mut editor = Editor::new(services, settings.config.clone());
        if let Some(use_hd) = settings.use_hd {
            if let Err(err) = editor.set_use_hd(use_hd) {
                log::warn!("Failed to restore HD setting: {err}");
            }
        }

        Self {
            editor,
            settings,
            alerts,
            file_handler: FileHandler::new(),
            canvas_texture: None,
            texture_revision: 0,
            pending_render: Arc::new(Mutex::new(None)),
            render_in_flight: false,
            applied_pro_style: None,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn render_in_flight(&self) -> bool {
        self.render_in_flight
    }

    pub fn open(&mut self, file: SourceFile) {
        let name = file.name.clone();
        if let Err(err) = self.editor.set_file(file) {
            log::error!("Failed to open {name}: {err}");
            self.alerts.alert(&format!("Cannot open {name}: {err}"));
        }
    }

    pub fn set_use_hd(&mut self, use_hd: bool) {
        if let Err(err) = self.editor.set_use_hd(use_hd) {
            self.alerts.alert(&err.to_string());
        }
    }

    pub fn undo(&mut self) {
        if let Err(err) = self.editor.undo() {
            self.alerts.alert(&err.to_string());
        }
    }

    pub fn download(&mut self) {
        if let Err(err) = self.editor.download() {
            self.alerts.alert(&format!("Download failed: {err}"));
        }
    }

    /// Pointer released over the canvas
    pub fn finish_stroke(&mut self, ctx: &egui::Context) {
        if self.editor.use_hd() {
            if let Err(err) = self.editor.add_line() {
                self.alerts.alert(&err.to_string());
            }
        } else {
            // Preview mode renders every stroke straight away
            self.start_render(ctx);
        }
    }

    pub fn start_render(&mut self, ctx: &egui::Context) {
        // Failures are already alerted by the editor
        let Ok(job) = self.editor.begin_render() else {
            return;
        };
        self.render_in_flight = true;
        spawn_render(job, self.pending_render.clone(), ctx.clone());
    }

    fn poll_render(&mut self) {
        let Some(outcome) = self.pending_render.lock().take() else {
            return;
        };
        self.render_in_flight = false;
        if let Err(err) = self.editor.finish_render(outcome) {
            log::debug!("Render result not applied: {err}");
        }
    }

    /// The canvas as a texture, re-uploaded when the editor redrew it
    pub fn canvas_texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        let canvas = self.editor.canvas()?;
        let revision = self.editor.revision();
        if self.canvas_texture.is_none() || self.texture_revision != revision {
            let [width, height] = canvas.size();
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [width as usize, height as usize],
                canvas.image().as_raw(),
            );
            match &mut self.canvas_texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.canvas_texture = Some(ctx.load_texture("canvas", image, egui::TextureOptions::LINEAR));
                }
            }
            self.texture_revision = revision;
        }
        self.canvas_texture.as_ref()
    }

    fn apply_style(&mut self, ctx: &egui::Context) {
        let pro = self.editor.is_pro_styled();
        if self.applied_pro_style == Some(pro) {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        if pro {
            visuals.selection.bg_fill = egui::Color32::from_rgb(200, 150, 30);
            visuals.hyperlink_color = egui::Color32::from_rgb(240, 190, 60);
        }
        ctx.set_visuals(visuals);
        self.applied_pro_style = Some(pro);
    }

    fn show_alert(&self, ctx: &egui::Context) {
        let Some(message) = self.alerts.current() else {
            return;
        };
        egui::Window::new("Something went wrong")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alerts.dismiss();
                }
            });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_render(job: RenderJob, slot: Arc<Mutex<Option<RenderOutcome>>>, ctx: egui::Context) {
    std::thread::spawn(move || {
        let outcome = futures::executor::block_on(job.run());
        *slot.lock() = Some(outcome);
        ctx.request_repaint();
    });
}

#[cfg(target_arch = "wasm32")]
fn spawn_render(job: RenderJob, slot: Arc<Mutex<Option<RenderOutcome>>>, ctx: egui::Context) {
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = job.run().await;
        *slot.lock() = Some(outcome);
        ctx.request_repaint();
    });
}

impl eframe::App for InpaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.config = self.editor.config().clone();
        self.settings.use_hd = Some(self.editor.use_hd());
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_render();

        if let Some(file) = self.file_handler.take_dropped(ctx) {
            self.open(file);
        }

        let undo_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Z);
        if !self.render_in_flight && ctx.input_mut(|i| i.consume_shortcut(&undo_shortcut)) {
            self.undo();
        }

        self.apply_style(ctx);

        egui::SidePanel::left("tools_panel")
            .resizable(false)
            .show(ctx, |ui| panels::tools_panel(self, ui));

        panels::central_panel(self, ctx);

        self.show_alert(ctx);
    }
}
