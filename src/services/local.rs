use futures::future::{self, BoxFuture};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use std::path::PathBuf;

use super::{Alerts, ExportFile, Exporter, InpaintRequest, InpaintService, TokenProvider, UserService};
use crate::canvas;
use crate::error::ServiceError;

/// In-process inpainting by onion peeling.
///
/// Each pass fills the hole pixels that touch known pixels with the average
/// of their known 8-neighbours; filled pixels become known for the next
/// pass, so colour propagates from the hole border inwards.
#[derive(Debug, Clone)]
pub struct LocalInpainter {
    /// Upper bound on peeling passes; large holes stop filling after this
    pub max_passes: usize,
}

impl Default for LocalInpainter {
    fn default() -> Self {
        Self { max_passes: 4096 }
    }
}

impl LocalInpainter {
    pub fn fill(&self, source: &RgbaImage, hole_mask: &GrayImage) -> RgbaImage {
        let (w, h) = source.dimensions();
        let mut out = source.clone();
        let mut live_mask = hole_mask.clone();

        for _ in 0..self.max_passes {
            let mut layer: Vec<(u32, u32, Rgba<u8>)> = Vec::new();
            for (x, y, hole) in live_mask.enumerate_pixels() {
                if hole.0[0] == 0 {
                    continue;
                }
                if let Some(color) = average_known_neighbours(&out, &live_mask, x, y) {
                    layer.push((x, y, color));
                }
            }
            if layer.is_empty() {
                break;
            }
            for (x, y, color) in layer {
                out.put_pixel(x, y, color);
                live_mask.put_pixel(x, y, Luma([0]));
            }
        }

        log::debug!("Local inpaint filled a {w}x{h} image");
        out
    }

    fn run(&self, request: &InpaintRequest) -> Result<Vec<u8>, ServiceError> {
        let source = image::load_from_memory(&request.file.bytes)
            .map_err(|err| ServiceError::Request(format!("cannot decode {}: {err}", request.file.name)))?
            .to_rgba8();
        let mask = canvas::decode_data_url(&request.mask).map_err(ServiceError::Request)?;
        let mask = if mask.dimensions() == source.dimensions() {
            mask
        } else {
            imageops::resize(&mask, source.width(), source.height(), FilterType::Nearest)
        };

        let hole_mask = GrayImage::from_fn(source.width(), source.height(), |x, y| {
            Luma([if mask.get_pixel(x, y).0[3] > 127 { 255 } else { 0 }])
        });
        let filled = self.fill(&source, &hole_mask);

        canvas::encode(&filled, ImageFormat::Png).map_err(|err| ServiceError::Request(err.to_string()))
    }
}

fn average_known_neighbours(img: &RgbaImage, mask: &GrayImage, x: u32, y: u32) -> Option<Rgba<u8>> {
    let (w, h) = img.dimensions();
    let mut sum = [0u32; 4];
    let mut count = 0u32;
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            if mask.get_pixel(nx as u32, ny as u32).0[0] != 0 {
                continue;
            }
            let p = img.get_pixel(nx as u32, ny as u32).0;
            for (total, value) in sum.iter_mut().zip(p) {
                *total += value as u32;
            }
            count += 1;
        }
    }
    (count > 0).then(|| Rgba(sum.map(|s| ((s + count / 2) / count) as u8)))
}

impl InpaintService for LocalInpainter {
    fn inpaint(&self, request: InpaintRequest) -> BoxFuture<'_, Result<Vec<u8>, ServiceError>> {
        Box::pin(async move {
            if request.token.is_empty() {
                return Err(ServiceError::Request("missing auth token".to_owned()));
            }
            self.run(&request)
        })
    }
}

/// Hands out the same token every time
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> BoxFuture<'_, Result<String, ServiceError>> {
        Box::pin(future::ready(Ok(self.0.clone())))
    }
}

/// A user whose tier never changes
#[derive(Debug, Clone, Copy)]
pub struct FixedTier(pub bool);

impl UserService for FixedTier {
    fn is_pro(&self) -> bool {
        self.0
    }
}

/// Writes downloads into a directory; sharing is not available
#[derive(Debug, Clone)]
pub struct FsExporter {
    dir: PathBuf,
}

impl FsExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Exporter for FsExporter {
    fn share(&self, file: ExportFile) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("sharing {} is not supported here", file.name),
        ))
    }

    fn download(&self, file: ExportFile) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&file.name);
        std::fs::write(&path, &file.bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), file.bytes.len());
        Ok(())
    }
}

/// Alerts that only reach the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl Alerts for LogAlerts {
    fn alert(&self, message: &str) {
        log::error!("{message}");
    }
}
