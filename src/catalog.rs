//! Photo catalog: turns a directory of images into the ordered collection.
//!
//! Images are discovered by content type and ordered by file name.  An
//! optional `gallery.toml` manifest next to them supplies titles and shooting
//! metadata:
//!
//! ```text
//! hero = photo-01.jpg
//!
//! [photo-01.jpg]
//! title = Midnight City
//! location = Tokyo
//! date = 2024/05/12
//! camera = Sony A7R IV
//! lens = 35mm f/1.4
//! settings = 1/60s, f/1.4, ISO 800
//! description = Rain on the crossing.
//! high_res = full/photo-01.jpg
//! glow = #ff8800,#220044
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::WalkDir;

use crate::core::photo::{GlowColors, Photo};
use crate::error::GalleryError;

pub const MANIFEST_NAME: &str = "gallery.toml";

/// Extensions accepted when content sniffing is inconclusive.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

/// A loaded collection.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub root: PathBuf,
    pub photos: Vec<Photo>,
    /// Photo id chosen for the cover, if the manifest names one.
    pub hero: Option<String>,
}

/// Load every image directly inside `dir`, applying the manifest if present.
pub fn load(dir: &Path) -> Result<Catalog, GalleryError> {
    if !dir.is_dir() {
        return Err(GalleryError::MissingDirectory(dir.to_path_buf()));
    }

    let manifest_path = dir.join(MANIFEST_NAME);
    let manifest = if manifest_path.is_file() {
        let text = std::fs::read_to_string(&manifest_path).map_err(|source| GalleryError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        parse_manifest(&text, &manifest_path)?
    } else {
        Manifest::default()
    };

    let mut photos = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_image(path) {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let mut photo = Photo::new(name.as_str(), path, default_title(path));
        photo.aspect_ratio = image::image_dimensions(path)
            .ok()
            .filter(|&(w, h)| w > 0 && h > 0)
            .map(|(w, h)| w as f64 / h as f64);
        if let Some(meta) = manifest.entries.get(&name) {
            meta.apply(&mut photo, dir);
        }
        photos.push(photo);
    }

    for name in manifest.entries.keys() {
        if !photos.iter().any(|p| &p.id == name) {
            tracing::warn!("manifest entry {name:?} has no matching image");
        }
    }

    if photos.is_empty() {
        return Err(GalleryError::Empty(dir.to_path_buf()));
    }
    tracing::debug!("catalog: {} photos from {}", photos.len(), dir.display());

    Ok(Catalog {
        root: dir.to_path_buf(),
        photos,
        hero: manifest.hero,
    })
}

fn is_image(path: &Path) -> bool {
    // Uses shared-mime-info magic when available; extension otherwise.
    if tree_magic_mini::from_filepath(path).is_some_and(|m| m.starts_with("image/")) {
        return true;
    }
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['-', '_'], " "))
        .unwrap_or_default()
}

/// Normalise `YYYY/MM/DD` and `YYYY-MM-DD` to `YYYY/MM/DD`; anything else
/// is kept verbatim.
pub fn normalise_date(raw: &str) -> String {
    ["%Y/%m/%d", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

// ───────────────────────────────────────── manifest ──────────

#[derive(Debug, Default)]
struct Manifest {
    hero: Option<String>,
    entries: HashMap<String, ManifestEntry>,
}

#[derive(Debug, Default)]
struct ManifestEntry {
    fields: HashMap<String, String>,
}

impl ManifestEntry {
    fn get(&self, key: &str) -> Option<String> {
        self.fields.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn apply(&self, photo: &mut Photo, dir: &Path) {
        if let Some(title) = self.get("title") {
            photo.title = title;
        }
        photo.location = self.get("location");
        photo.date = self.get("date").map(|d| normalise_date(&d));
        photo.camera = self.get("camera");
        photo.lens = self.get("lens");
        photo.settings = self.get("settings");
        photo.description = self.get("description").map(|d| d.replace("\\n", "\n"));
        photo.high_res_src = self.get("high_res").map(|p| dir.join(p));
        photo.glow_colors = self.get("glow").and_then(|g| GlowColors::parse(&g));
    }
}

const ENTRY_KEYS: &[&str] = &[
    "title",
    "location",
    "date",
    "camera",
    "lens",
    "settings",
    "description",
    "high_res",
    "glow",
];

fn parse_manifest(text: &str, path: &Path) -> Result<Manifest, GalleryError> {
    let err = |line: usize, message: String| GalleryError::Manifest {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut manifest = Manifest::default();
    let mut current: Option<String> = None;

    for (i, line) in text.lines().enumerate() {
        let lineno = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let Some(name) = rest.strip_suffix(']') else {
                return Err(err(lineno, "unterminated section header".into()));
            };
            let name = unquote(name.trim());
            if name.is_empty() {
                return Err(err(lineno, "empty section name".into()));
            }
            manifest.entries.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(err(lineno, format!("expected `key = value`, got {line:?}")));
        };
        let key = key.trim();
        let value = unquote(value.trim());

        match &current {
            None if key == "hero" => manifest.hero = Some(value),
            None => tracing::debug!("manifest: ignoring top-level key {key:?}"),
            Some(name) => {
                if !ENTRY_KEYS.contains(&key) {
                    tracing::debug!("manifest: ignoring key {key:?} in [{name}]");
                    continue;
                }
                if let Some(entry) = manifest.entries.get_mut(name) {
                    entry.fields.insert(key.to_string(), value);
                }
            }
        }
    }

    Ok(manifest)
}

fn unquote(s: &str) -> String {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .to_string()
}
