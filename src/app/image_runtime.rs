//! Background thumbnail decoding to keep the UI thread responsive.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;
use tokio::sync::mpsc;

/// Longest edge, in pixels, of a decoded thumbnail.
pub const THUMBNAIL_EDGE: u32 = 480;

pub struct ThumbnailLoaded {
    /// Collection generation the request was made for.
    pub generation: u64,
    pub path: PathBuf,
    pub result: anyhow::Result<Arc<RgbaImage>>,
}

pub fn spawn_thumbnail(tx: mpsc::UnboundedSender<ThumbnailLoaded>, generation: u64, path: PathBuf) {
    std::thread::spawn(move || {
        let result = decode_thumbnail(&path);
        let _ = tx.send(ThumbnailLoaded {
            generation,
            path,
            result,
        });
    });
}

fn decode_thumbnail(path: &std::path::Path) -> anyhow::Result<Arc<RgbaImage>> {
    let img = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
    Ok(Arc::new(img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgba8()))
}
