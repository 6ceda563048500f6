use eframe::egui;
use std::path::Path;

use crate::services::SourceFile;

/// Picks up image files dropped onto the window
pub struct FileHandler {
    processed_files: Vec<String>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self {
            processed_files: Vec::new(),
        }
    }

    /// The newest image dropped since the last call, if any
    pub fn take_dropped(&mut self, ctx: &egui::Context) -> Option<SourceFile> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let mut latest = None;

        for file in &dropped {
            let file_name = display_name(file);
            if self.processed_files.contains(&file_name) {
                continue;
            }
            if !is_image_file(file) {
                log::warn!("Dropped file is not a supported type: {}", file_name);
                continue;
            }
            match read_dropped(file) {
                Some(source) => {
                    self.processed_files.push(file_name);
                    latest = Some(source);
                }
                None => log::warn!("Dropped file has no accessible data: {}", file_name),
            }
        }

        if dropped.is_empty() {
            self.processed_files.clear();
        }
        latest
    }
}

/// Read an image from disk
pub fn load_path(path: &Path) -> std::io::Result<SourceFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_owned());
    log::info!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(SourceFile::new(name, bytes))
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.name.clone());
    has_image_extension(&name)
}

fn has_image_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => matches!(
            ext.to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tif" | "tiff"
        ),
        None => false,
    }
}

fn read_dropped(file: &egui::DroppedFile) -> Option<SourceFile> {
    if let Some(bytes) = &file.bytes {
        let name = if file.name.is_empty() { "image.png" } else { &file.name };
        return Some(SourceFile::new(name, bytes.to_vec()));
    }

    // On the web there is no filesystem to fall back to
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        return match load_path(path) {
            Ok(source) => Some(source),
            Err(err) => {
                log::error!("Failed to read image file: {}: {}", path.display(), err);
                None
            }
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert!(has_image_extension("holiday.JPG"));
        assert!(has_image_extension("/tmp/a.b/scan.tiff"));
        assert!(!has_image_extension("notes.txt"));
        assert!(!has_image_extension("README"));
    }

    #[test]
    fn test_dropped_bytes_keep_their_name() {
        let file = egui::DroppedFile {
            name: "cat.png".to_owned(),
            mime: "image/png".to_owned(),
            bytes: Some(vec![1u8, 2, 3].into()),
            ..Default::default()
        };
        assert!(is_image_file(&file));
        let source = read_dropped(&file).unwrap();
        assert_eq!(source.name, "cat.png");
        assert_eq!(&source.bytes[..], &[1, 2, 3]);
    }
}
