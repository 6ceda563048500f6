#![allow(dead_code)]

use futures::future::BoxFuture;
use image::{ImageFormat, Rgba, RgbaImage};
use inpaint_editor::services::{
    Alerts, Analytics, AnalyticsEvent, ExportFile, Exporter, FixedTier, InpaintRequest,
    InpaintService, StaticToken,
};
use inpaint_editor::{EditorConfig, Services, ServiceError, SourceFile};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::Arc;

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

pub fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, color)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn red_file(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, png(width, height, RED))
}

/// Captures everything the editor reports
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<AnalyticsEvent>>,
    pub alerts: Mutex<Vec<String>>,
    pub shared: Mutex<Vec<ExportFile>>,
    pub downloaded: Mutex<Vec<ExportFile>>,
    pub can_share: bool,
}

impl Recorder {
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(AnalyticsEvent::name).collect()
    }
}

impl Analytics for Recorder {
    fn log_event(&self, event: AnalyticsEvent) {
        self.events.lock().push(event);
    }
}

impl Alerts for Recorder {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_owned());
    }
}

impl Exporter for Recorder {
    fn can_share(&self) -> bool {
        self.can_share
    }

    fn share(&self, file: ExportFile) -> std::io::Result<()> {
        self.shared.lock().push(file);
        Ok(())
    }

    fn download(&self, file: ExportFile) -> std::io::Result<()> {
        self.downloaded.lock().push(file);
        Ok(())
    }
}

/// Answers every request with a solid image, or a fixed error
pub struct FakeInpainter {
    pub result: Result<(u32, u32, Rgba<u8>), ServiceError>,
    pub requests: Mutex<Vec<InpaintRequest>>,
}

impl FakeInpainter {
    pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            result: Ok((width, height, color)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ServiceError) -> Self {
        Self {
            result: Err(err),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl InpaintService for FakeInpainter {
    fn inpaint(&self, request: InpaintRequest) -> BoxFuture<'_, Result<Vec<u8>, ServiceError>> {
        self.requests.lock().push(request);
        let result = self
            .result
            .clone()
            .map(|(width, height, color)| png(width, height, color));
        Box::pin(async move { result })
    }
}

pub fn services(recorder: &Arc<Recorder>, inpainter: &Arc<FakeInpainter>, pro: bool) -> Services {
    Services {
        inpaint: inpainter.clone(),
        token: Arc::new(StaticToken::new("test-token")),
        analytics: recorder.clone(),
        user: Arc::new(FixedTier(pro)),
        exporter: recorder.clone(),
        alerts: recorder.clone(),
    }
}

pub fn config() -> EditorConfig {
    EditorConfig {
        brush_size: 6.0,
        highlight_color: [0, 0, 255, 128],
        ..EditorConfig::default()
    }
}
