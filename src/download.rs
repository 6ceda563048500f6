use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

/// Insert `suffix` before the file extension: `cat.jpg` -> `cat_cleanup.jpg`.
/// Names without an extension (or dotfiles) get the suffix appended.
pub fn output_name(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{suffix}.{ext}"),
        _ => format!("{name}{suffix}"),
    }
}

/// Output name and encoding for a download.
///
/// The format follows the extension when the encoder supports it; anything
/// else is written as PNG and renamed to match.
pub fn export_target(name: &str, suffix: &str) -> (String, ImageFormat) {
    let output = output_name(name, suffix);
    match ImageFormat::from_path(&output) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Tiff)) => {
            (output, format)
        }
        _ => {
            let stem = match name.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem,
                _ => name,
            };
            (format!("{stem}{suffix}.png"), ImageFormat::Png)
        }
    }
}

/// The edited image at the original's full resolution
pub fn full_resolution(original: &RgbaImage, latest_render: Option<&RgbaImage>) -> RgbaImage {
    let base = latest_render.unwrap_or(original);
    if base.dimensions() == original.dimensions() {
        base.clone()
    } else {
        imageops::resize(base, original.width(), original.height(), FilterType::Lanczos3)
    }
}
