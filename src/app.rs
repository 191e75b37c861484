use std::collections::BTreeMap;

use crate::config::PaintConfig;
use crate::debounce::ResizeDebouncer;
use crate::file_handler::FileHandler;
use crate::import::ImportQueue;
use crate::input::TouchPoint;
use crate::panels;
use crate::session::Session;
use crate::texture_manager::TextureManager;
use crate::util::time;

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PaintApp {
    pub(crate) config: PaintConfig,
    // Created on the first frame, once the canvas size is known
    #[serde(skip)]
    pub(crate) session: Option<Session>,
    #[serde(skip)]
    pub(crate) canvas_texture: Option<egui::TextureHandle>,
    #[serde(skip)]
    pub(crate) uploaded_revision: Option<u64>,
    #[serde(skip)]
    pub(crate) thumbnails: TextureManager,
    #[serde(skip)]
    pub(crate) imports: ImportQueue,
    #[serde(skip)]
    pub(crate) files: FileHandler,
    #[serde(skip)]
    pub(crate) resize: ResizeDebouncer,
    /// Touch contacts currently on the canvas, by egui touch id
    #[serde(skip)]
    pub(crate) touches: BTreeMap<u64, TouchPoint>,
    #[serde(skip)]
    pub(crate) pointer_inside: bool,
    #[serde(skip)]
    pub(crate) confirm_clear: bool,
    #[serde(skip)]
    pub(crate) status: Option<String>,
    /// Text of the hex color field while it is being edited
    #[serde(skip)]
    pub(crate) hex_input: String,
}

impl Default for PaintApp {
    fn default() -> Self {
        Self::with_config(PaintConfig::default())
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous app state (if any).
        if let Some(storage) = cc.storage {
            if let Some(app) = eframe::get_value::<PaintApp>(storage, eframe::APP_KEY) {
                log::info!("Restored saved settings");
                return Self::with_config(app.config);
            }
        }
        Self::default()
    }

    pub fn with_config(config: PaintConfig) -> Self {
        Self {
            resize: ResizeDebouncer::new(config.resize_debounce_ms),
            config,
            session: None,
            canvas_texture: None,
            uploaded_revision: None,
            thumbnails: TextureManager::new(64),
            imports: ImportQueue::new(),
            files: FileHandler::new(),
            touches: BTreeMap::new(),
            pointer_inside: false,
            confirm_clear: false,
            status: None,
            hex_input: String::new(),
        }
    }

    /// Encodes the drawing and hands it to the platform.
    pub(crate) fn download(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        self.status = Some(match session.download_png() {
            Ok(export) => save_export(&export.filename, &export.bytes),
            Err(err) => {
                log::error!("Export failed: {err}");
                format!("Export failed: {err}")
            }
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_export(filename: &str, bytes: &[u8]) -> String {
    match std::fs::write(filename, bytes) {
        Ok(()) => format!("Saved {filename}"),
        Err(err) => {
            log::error!("Failed to write {filename}: {err}");
            format!("Failed to write {filename}: {err}")
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn save_export(filename: &str, _bytes: &[u8]) -> String {
    log::warn!("Saving {filename} is not supported in the browser build");
    format!("Saving {filename} is not supported here")
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(session) = &self.session {
            self.config.brush = *session.brush();
            self.config.initial_tool = session.tool();
        }
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = time::now_millis();
        self.thumbnails.begin_frame();

        self.files.preview_files_being_dropped(ctx);
        self.files.queue_dropped_files(ctx, &mut self.imports);
        if let Some(session) = &mut self.session {
            session.apply_imports(self.imports.drain_finished());
        }
        if self.imports.pending_count() > 0 {
            ctx.request_repaint();
        }

        panels::tools_panel(self, ctx);
        panels::layers_panel(self, ctx);
        panels::central_panel(self, ctx, now);
        panels::confirm_clear_dialog(self, ctx);
    }
}
