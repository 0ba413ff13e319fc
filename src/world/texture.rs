// Named repository of RGBA textures used by walls, overlays and sprites.
// The renderer looks textures up by name only; it never touches image files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use once_cell::unsync::OnceCell;
use thiserror::Error;
use tracing::{debug, warn};

use crate::renderer::font;

/// Width and height of generated textures; wall `texture_x` is in `0..64`.
pub const TEXTURE_SIZE: usize = 64;

/// Hard limit for fetching + decoding a single image.
pub const LOAD_TIMEOUT: Duration = Duration::from_millis(5000);

/// Texture names the map and renderer agree on.
pub mod names {
    pub const STONE_WALL: &str = "stone_wall";
    pub const SECRET_WALL: &str = "secret_wall";
    pub const SECRET_WALL_DEBUG: &str = "secret_wall_debug";
    pub const DOOR_OPEN: &str = "door_open";
    pub const DOOR_CLOSED: &str = "door_closed";
    pub const DOOR_OPEN_DEBUG: &str = "door_open_debug";
    pub const DOOR_CLOSED_DEBUG: &str = "door_closed_debug";

    /// `(source, red-tinted target)` pairs built on demand in debug mode.
    pub const DEBUG_VARIANTS: [(&str, &str); 3] = [
        (SECRET_WALL, SECRET_WALL_DEBUG),
        (DOOR_OPEN, DOOR_OPEN_DEBUG),
        (DOOR_CLOSED, DOOR_CLOSED_DEBUG),
    ];
}

/// CPU-side storage: RGBA bytes, row-major, 4 bytes per texel.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Wrap an RGBA buffer, checking it matches the dimensions.
    pub fn from_rgba(
        name: impl Into<String>,
        w: usize,
        h: usize,
        pixels: Vec<u8>,
    ) -> Result<Self, TextureError> {
        if w == 0 || h == 0 {
            return Err(TextureError::BadDimensions { w, h });
        }
        let expected = w * h * 4;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            w,
            h,
            pixels,
        })
    }

    pub fn solid(name: impl Into<String>, w: usize, h: usize, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            w,
            h,
            pixels: rgba.repeat(w * h),
        }
    }

    /// Bounds-checked texel fetch.
    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let i = (y * self.w + x) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Placeholder for a texture that could not be loaded: a coloured
    /// 64×64 block with a "MISSING / TEXTURE" label.
    pub fn fallback(name: impl Into<String>) -> Self {
        let name = name.into();
        let [r, g, b] = FallbackCategory::classify(&name).rgb();
        let mut tex = Self::solid(name, TEXTURE_SIZE, TEXTURE_SIZE, [r, g, b, 255]);
        tex.burn_label("MISSING", 18);
        tex.burn_label("TEXTURE", 34);
        tex
    }

    /// Red-tinted copy: R ×1.5 (clamped), G and B ×0.5, alpha kept.
    pub fn tinted_red(&self, name: impl Into<String>) -> Self {
        let mut pixels = self.pixels.clone();
        for px in pixels.chunks_exact_mut(4) {
            px[0] = (px[0] as f32 * 1.5).min(255.0) as u8;
            px[1] = (px[1] as f32 * 0.5) as u8;
            px[2] = (px[2] as f32 * 0.5) as u8;
        }
        Self {
            name: name.into(),
            w: self.w,
            h: self.h,
            pixels,
        }
    }

    /// Draw white centred text into the buffer at row `y`.
    fn burn_label(&mut self, text: &str, y: i32) {
        let scale = 2;
        let x0 = (self.w as i32 - font::text_width(text, scale)) / 2;
        let (w, h) = (self.w as i32, self.h as i32);
        let pixels = &mut self.pixels;
        font::rasterize(text, scale, |dx, dy| {
            let (x, y) = (x0 + dx, y + dy);
            if (0..w).contains(&x) && (0..h).contains(&y) {
                let i = (y * w + x) as usize * 4;
                pixels[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        });
    }
}

/// Colour family of a fallback texture, derived from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackCategory {
    Wall,
    Door,
    Other,
}

impl FallbackCategory {
    pub fn classify(name: &str) -> Self {
        if name.contains("wall") {
            FallbackCategory::Wall
        } else if name.contains("door") {
            FallbackCategory::Door
        } else {
            FallbackCategory::Other
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            FallbackCategory::Wall => [136, 136, 136],
            FallbackCategory::Door => [139, 90, 43],
            FallbackCategory::Other => [102, 102, 102],
        }
    }
}

/// What a texture is used for; decides the overlay set and load fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    Wall,
    Overlay,
    Sprite,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture dimensions {w}×{h} are empty")]
    BadDimensions { w: usize, h: usize },

    #[error("pixel buffer holds {found} bytes, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode `{}`: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("loading `{}` timed out", .0.display())]
    Timeout(PathBuf),
}

/// One asset to fetch in [`TextureStore::load_many`].
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub name: String,
    pub path: PathBuf,
    pub kind: TextureKind,
}

impl LoadRequest {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: TextureKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }
}

struct Entry {
    kind: TextureKind,
    /// Encoded image bytes awaiting their first decode.
    encoded: Option<Vec<u8>>,
    decoded: OnceCell<Texture>,
}

/// Name → texture cache.
///
/// * Entries registered with [`insert_encoded`](Self::insert_encoded) are
///   decoded on first access.
/// * Iteration order is by name, so anything derived from the store
///   (e.g. the overlay set) is deterministic.
///
/// **Thread-safety:** single-threaded like the render loop; lazy decoding
/// uses `unsync::OnceCell`.
#[derive(Default)]
pub struct TextureStore {
    entries: BTreeMap<String, Entry>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<TextureKind> {
        self.entries.get(name).map(|e| e.kind)
    }

    /// Decoded texture for `name`, decoding lazily on first call.
    ///
    /// Returns `None` only for names that were never registered. Bytes that
    /// fail to decode resolve to the fallback texture.
    pub fn pixel_data(&self, name: &str) -> Option<&Texture> {
        let entry = self.entries.get(name)?;
        Some(entry.decoded.get_or_init(|| {
            let bytes = entry.encoded.as_deref().unwrap_or_default();
            match decode_rgba(name, bytes, Path::new(name)) {
                Ok(tex) => tex,
                Err(err) => {
                    warn!(texture = name, %err, "lazy decode failed, using fallback");
                    Texture::fallback(name)
                }
            }
        }))
    }

    /// Names of the registered depth-overlay textures, sorted.
    pub fn overlay_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.kind == TextureKind::Overlay)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert (or replace) a decoded texture.
    pub fn insert(&mut self, name: impl Into<String>, kind: TextureKind, tex: Texture) -> &Texture {
        let name = name.into();
        self.entries.remove(&name);
        let entry = self.entries.entry(name).or_insert_with(|| Entry {
            kind,
            encoded: None,
            decoded: OnceCell::new(),
        });
        entry.decoded.get_or_init(|| tex)
    }

    /// Register encoded image bytes; decoding happens on first lookup.
    pub fn insert_encoded(&mut self, name: impl Into<String>, kind: TextureKind, bytes: Vec<u8>) {
        self.entries.insert(
            name.into(),
            Entry {
                kind,
                encoded: Some(bytes),
                decoded: OnceCell::new(),
            },
        );
    }

    /// Red-tinted copy of `source` stored under `target`; built at most once.
    pub fn get_or_create_tinted(&mut self, source: &str, target: &str) -> Option<&Texture> {
        if !self.contains(target) {
            let tinted = self.pixel_data(source)?.tinted_red(target);
            let kind = self.kind(source).unwrap_or(TextureKind::Wall);
            debug!(source, target, "built tinted variant");
            self.insert(target, kind, tinted);
        }
        self.pixel_data(target)
    }

    /// Build every debug variant whose source texture is present.
    pub fn ensure_debug_variants(&mut self) {
        for (source, target) in names::DEBUG_VARIANTS {
            self.get_or_create_tinted(source, target);
        }
    }

    /// Load one image under `name`. Never fails: a missing, corrupt or slow
    /// image is replaced by [`Texture::fallback`].
    pub fn load_texture(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        kind: TextureKind,
    ) -> &Texture {
        let path = path.as_ref();
        let tex = match fetch_image(name, path, LOAD_TIMEOUT) {
            Ok(tex) => {
                debug!(texture = name, path = %path.display(), "loaded");
                tex
            }
            Err(err) => {
                warn!(texture = name, %err, "using fallback texture");
                Texture::fallback(name)
            }
        };
        self.insert(name, kind, tex)
    }

    /// Fetch a batch of images concurrently with one shared deadline.
    ///
    /// Wall textures fall back to placeholders on failure; overlays and
    /// sprites are skipped so the renderer can degrade on its own.
    /// Returns the number of images that loaded successfully.
    pub fn load_many(&mut self, requests: impl IntoIterator<Item = LoadRequest>) -> usize {
        let pending: Vec<_> = requests
            .into_iter()
            .map(|req| {
                let rx = spawn_fetch(req.name.clone(), req.path.clone());
                (req, rx)
            })
            .collect();

        let deadline = Instant::now() + LOAD_TIMEOUT;
        let mut loaded = 0;
        for (req, rx) in pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let result = rx
                .recv_timeout(remaining)
                .unwrap_or_else(|_| Err(TextureError::Timeout(req.path.clone())));
            match (result, req.kind) {
                (Ok(tex), kind) => {
                    debug!(texture = %req.name, "loaded");
                    self.insert(req.name, kind, tex);
                    loaded += 1;
                }
                (Err(err), TextureKind::Wall) => {
                    warn!(texture = %req.name, %err, "using fallback texture");
                    let tex = Texture::fallback(&req.name);
                    self.insert(req.name, TextureKind::Wall, tex);
                }
                (Err(err), kind) => {
                    warn!(texture = %req.name, ?kind, %err, "skipping asset");
                }
            }
        }
        loaded
    }
}

/*──────────────────────── image helpers ──────────────────────────────*/

fn decode_rgba(name: &str, bytes: &[u8], path: &Path) -> Result<Texture, TextureError> {
    let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Texture::from_rgba(name, w as usize, h as usize, rgba.into_raw())
}

fn spawn_fetch(name: String, path: PathBuf) -> mpsc::Receiver<Result<Texture, TextureError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = std::fs::read(&path)
            .map_err(|source| TextureError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|bytes| decode_rgba(&name, &bytes, &path));
        // receiver may have given up already
        let _ = tx.send(result);
    });
    rx
}

/// Read + decode on a worker thread, abandoning it after `timeout`.
fn fetch_image(name: &str, path: &Path, timeout: Duration) -> Result<Texture, TextureError> {
    spawn_fetch(name.to_owned(), path.to_path_buf())
        .recv_timeout(timeout)
        .unwrap_or_else(|_| Err(TextureError::Timeout(path.to_path_buf())))
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
