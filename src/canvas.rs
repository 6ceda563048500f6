use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use egui::Pos2;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::{EditorError, EditorResult};
use crate::stroke::Line;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// An RGBA raster the editor composites into.
///
/// Used both for the visible canvas and for the off-screen mask sent to the
/// inpainting service.
#[derive(Clone, PartialEq)]
pub struct Canvas {
    image: RgbaImage,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("size", &self.image.dimensions())
            .finish()
    }
}

impl Canvas {
    /// A transparent canvas. Zero-sized canvases are rejected.
    pub fn new(width: u32, height: u32) -> EditorResult<Self> {
        if width == 0 || height == 0 {
            return Err(EditorError::ZeroSizeCanvas);
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.image.width(), self.image.height()]
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Paint `source` over the whole canvas, scaling it to fit
    pub fn draw_image(&mut self, source: &RgbaImage) {
        if source.dimensions() == self.image.dimensions() {
            imageops::overlay(&mut self.image, source, 0, 0);
        } else {
            let scaled = imageops::resize(source, self.width(), self.height(), FilterType::Triangle);
            imageops::overlay(&mut self.image, &scaled, 0, 0);
        }
    }

    /// Overlay strokes in a flat colour. Overlapping strokes do not
    /// darken each other.
    pub fn draw_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a Line>, color: [u8; 4]) {
        let coverage = stroke_coverage(lines, self.width(), self.height());
        let alpha = color[3] as f32 / 255.0;
        for (pixel, cover) in self.image.pixels_mut().zip(coverage.pixels()) {
            if cover.0[0] == 0 {
                continue;
            }
            let a = alpha * cover.0[0] as f32 / 255.0;
            let [r, g, b, da] = pixel.0;
            let blend = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
            let out_alpha = (a * 255.0 + da as f32 * (1.0 - a)).round() as u8;
            *pixel = Rgba([blend(color[0], r), blend(color[1], g), blend(color[2], b), out_alpha]);
        }
    }

    pub fn to_png_bytes(&self) -> EditorResult<Vec<u8>> {
        encode(&self.image, ImageFormat::Png)
    }

    /// The canvas as a `data:image/png;base64,...` URL
    pub fn to_data_url(&self) -> EditorResult<String> {
        let png = self.to_png_bytes()?;
        Ok(format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(png)))
    }
}

/// Rebuild the inpainting mask: every stroke in opaque white on a
/// transparent background.
pub fn render_mask<'a>(
    lines: impl IntoIterator<Item = &'a Line>,
    width: u32,
    height: u32,
) -> EditorResult<Canvas> {
    let mut mask = Canvas::new(width, height)?;
    mask.draw_lines(lines, [255, 255, 255, 255]);
    Ok(mask)
}

/// Decode a PNG data URL produced by [`Canvas::to_data_url`]
pub fn decode_data_url(url: &str) -> Result<RgbaImage, String> {
    let payload = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| "not a PNG data URL".to_owned())?;
    let bytes = BASE64.decode(payload).map_err(|err| err.to_string())?;
    image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|err| err.to_string())
}

pub(crate) fn encode(image: &RgbaImage, format: ImageFormat) -> EditorResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut bytes), format)?,
        _ => image.write_to(&mut Cursor::new(&mut bytes), format)?,
    }
    Ok(bytes)
}

/// Rasterise strokes as round-capped capsules. 255 marks covered pixels.
fn stroke_coverage<'a>(lines: impl IntoIterator<Item = &'a Line>, width: u32, height: u32) -> GrayImage {
    let mut coverage = GrayImage::new(width, height);
    for line in lines {
        let radius = (line.size() / 2.0).max(0.5);
        let points = line.points();
        match points {
            [] => {}
            [single] => stamp_segment(&mut coverage, *single, *single, radius),
            _ => {
                for pair in points.windows(2) {
                    stamp_segment(&mut coverage, pair[0], pair[1], radius);
                }
            }
        }
    }
    coverage
}

fn stamp_segment(coverage: &mut GrayImage, a: Pos2, b: Pos2, radius: f32) {
    let (width, height) = coverage.dimensions();
    let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as u32;
    let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as u32;
    let max_x = (a.x.max(b.x) + radius).ceil().min(width as f32 - 1.0);
    let max_y = (a.y.max(b.y) + radius).ceil().min(height as f32 - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }

    let ab = b - a;
    let len_sq = ab.length_sq();
    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
            let t = if len_sq > 0.0 {
                ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = a + ab * t;
            if (p - closest).length() <= radius {
                coverage.put_pixel(x, y, Luma([255]));
            }
        }
    }
}
