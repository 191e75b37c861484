use futures::channel::oneshot;
use image::RgbaImage;

use crate::error::{PaintError, PaintResult};

/// Decodes any supported image format into RGBA.
pub fn decode_image(bytes: &[u8]) -> PaintResult<RgbaImage> {
    let image = image::load_from_memory(bytes)?;
    log::debug!("Decoded image: {}x{}", image.width(), image.height());
    Ok(image.to_rgba8())
}

/// A decode that finished, successfully or not.
#[derive(Debug)]
pub struct FinishedImport {
    pub name: String,
    pub result: PaintResult<RgbaImage>,
}

struct PendingImport {
    name: String,
    receiver: oneshot::Receiver<PaintResult<RgbaImage>>,
}

/// Image decodes in flight.
///
/// Decoding happens off the UI path; the UI polls [`ImportQueue::drain_finished`]
/// once per frame and turns each success into a layer.
#[derive(Default)]
pub struct ImportQueue {
    pending: Vec<PendingImport>,
}

impl ImportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts decoding `bytes`; the result is later reported under `name`.
    pub fn request(&mut self, name: &str, bytes: Vec<u8>) {
        log::info!("Decoding {} ({} bytes)", name, bytes.len());
        let (sender, receiver) = oneshot::channel();
        spawn_decode(bytes, sender);
        self.pending.push(PendingImport {
            name: name.to_string(),
            receiver,
        });
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Takes every decode that has completed, leaving the rest in flight.
    pub fn drain_finished(&mut self) -> Vec<FinishedImport> {
        let mut finished = Vec::new();
        self.pending.retain_mut(|pending| match pending.receiver.try_recv() {
            Ok(None) => true,
            Ok(Some(result)) => {
                finished.push(FinishedImport {
                    name: pending.name.clone(),
                    result,
                });
                false
            }
            Err(oneshot::Canceled) => {
                finished.push(FinishedImport {
                    name: pending.name.clone(),
                    result: Err(PaintError::ImportCancelled),
                });
                false
            }
        });
        finished
    }

    /// Waits for every decode in flight.
    pub async fn finish_all(&mut self) -> Vec<FinishedImport> {
        let mut finished = Vec::new();
        for pending in self.pending.drain(..) {
            let result = pending
                .receiver
                .await
                .unwrap_or(Err(PaintError::ImportCancelled));
            finished.push(FinishedImport {
                name: pending.name,
                result,
            });
        }
        finished
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_decode(bytes: Vec<u8>, sender: oneshot::Sender<PaintResult<RgbaImage>>) {
    std::thread::spawn(move || {
        // the queue may have been dropped; nobody is waiting then
        let _ = sender.send(decode_image(&bytes));
    });
}

#[cfg(target_arch = "wasm32")]
fn spawn_decode(bytes: Vec<u8>, sender: oneshot::Sender<PaintResult<RgbaImage>>) {
    wasm_bindgen_futures::spawn_local(async move {
        let _ = sender.send(decode_image(&bytes));
    });
}
