use eframe::egui;

use crate::import::ImportQueue;

/// Turns files dropped on the window into image imports
#[derive(Default)]
pub struct FileHandler {
    processed_files: Vec<String>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues every newly dropped image file for decoding.
    /// Returns the number of files queued.
    pub fn queue_dropped_files(&mut self, ctx: &egui::Context, queue: &mut ImportQueue) -> usize {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            // a new drop may legitimately reuse a name
            self.processed_files.clear();
            return 0;
        }

        let mut queued = 0;
        for file in &dropped {
            let file_name = display_name(file);

            if self.processed_files.contains(&file_name) {
                continue;
            }
            self.processed_files.push(file_name.clone());

            if !is_image_file(file) {
                log::warn!("Dropped file is not a supported type: {}", file_name);
                continue;
            }

            match read_bytes(file) {
                Some(bytes) => {
                    queue.request(&layer_name(&file_name), bytes);
                    queued += 1;
                }
                None => log::warn!("Dropped file has no accessible data: {}", file_name),
            }
        }
        queued
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop images to add them as layers",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
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

/// Layer name for an imported file: its file name without directories or extension.
fn layer_name(file_name: &str) -> String {
    let path = std::path::Path::new(file_name);
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_owned())
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file.path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| file.name.clone());
    std::path::Path::new(&name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
        })
        .unwrap_or(false)
}

fn read_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    match &file.bytes {
        Some(bytes) => Some(bytes.to_vec()),
        None => read_path(file),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_path(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    let path = file.path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::error!("Failed to read image file: {}: {}", path.display(), err);
            None
        }
    }
}

// Browsers only hand over file contents, never paths
#[cfg(target_arch = "wasm32")]
fn read_path(_file: &egui::DroppedFile) -> Option<Vec<u8>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_name_strips_path_and_extension() {
        assert_eq!(layer_name("/tmp/photos/cat.png"), "cat");
        assert_eq!(layer_name("sketch.jpeg"), "sketch");
        assert_eq!(layer_name("unknown"), "unknown");
    }

    #[test]
    fn test_image_detection() {
        let by_mime = egui::DroppedFile {
            mime: "image/png".to_owned(),
            ..Default::default()
        };
        let by_name = egui::DroppedFile {
            name: "scan.BMP".to_owned(),
            ..Default::default()
        };
        let text = egui::DroppedFile {
            name: "notes.txt".to_owned(),
            ..Default::default()
        };
        assert!(is_image_file(&by_mime));
        assert!(is_image_file(&by_name));
        assert!(!is_image_file(&text));
    }
}
