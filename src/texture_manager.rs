use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::imageops;

use crate::layer::LayerId;
use crate::surface::{PixelBuffer, RasterSurface};

/// Longest edge of a layer thumbnail, in pixels.
pub const THUMBNAIL_EDGE: u32 = 40;

/// Caches one thumbnail texture per layer, keyed by the layer's content revision
pub struct TextureManager {
    /// Cache of textures by (layer id, revision)
    texture_cache: HashMap<(LayerId, u64), TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<(LayerId, u64), u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or creates the thumbnail texture for a layer at the given revision
    pub fn thumbnail(
        &mut self,
        layer: LayerId,
        revision: u64,
        buffer: &PixelBuffer,
        ctx: &Context,
    ) -> TextureId {
        let cache_key = (layer, revision);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return handle.id();
        }

        // Older revisions of this layer are stale now
        self.invalidate_layer(layer);
        self.prune_cache_if_needed();

        let name = format!("layer_{}_v{}", layer, revision);
        let handle = ctx.load_texture(&name, thumbnail_image(buffer), TextureOptions::LINEAR);
        let id = handle.id();

        self.texture_cache.insert(cache_key, handle);
        self.last_used.insert(cache_key, self.current_frame);
        id
    }

    /// Invalidates all textures for a specific layer
    pub fn invalidate_layer(&mut self, layer: LayerId) {
        let keys_to_remove: Vec<(LayerId, u64)> = self
            .texture_cache
            .keys()
            .filter(|(id, _)| *id == layer)
            .cloned()
            .collect();

        for key in keys_to_remove {
            self.texture_cache.remove(&key);
            self.last_used.remove(&key);
        }
    }

    /// Prunes the cache if it exceeds the maximum size
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<((LayerId, u64), u64)> =
            self.last_used.iter().map(|(k, v)| (*k, *v)).collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() + 1 - self.max_cache_size.max(1);
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }
}

/// Downscales a layer buffer so its longest edge is at most [`THUMBNAIL_EDGE`].
pub fn thumbnail_image(buffer: &PixelBuffer) -> ColorImage {
    let (w, h) = buffer.size();
    let [tw, th] = thumbnail_size((w, h));
    if (tw, th) == (w, h) {
        return buffer.to_color_image();
    }
    let small = imageops::thumbnail(buffer.as_image(), tw, th);
    ColorImage::from_rgba_unmultiplied([tw as usize, th as usize], small.as_raw())
}

/// Size of the thumbnail for a layer of `(width, height)`.
pub fn thumbnail_size((width, height): (u32, u32)) -> [u32; 2] {
    let longest = width.max(height).max(1);
    if longest <= THUMBNAIL_EDGE {
        return [width, height];
    }
    let scale = THUMBNAIL_EDGE as f32 / longest as f32;
    [
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    ]
}
