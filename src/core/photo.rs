//! Photo records as supplied by the catalog.

use std::path::PathBuf;

/// Shown in place of an optional field that was never filled in.
pub const NOT_SET: &str = "not set";
/// Shown when a photo has no description.
pub const NO_DESCRIPTION: &str = "no description";

/// A pair of RGB colours used for the ambient glow behind a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlowColors {
    pub from: [u8; 3],
    pub to: [u8; 3],
}

impl GlowColors {
    /// Parse `"#rrggbb,#rrggbb"`.
    pub fn parse(s: &str) -> Option<Self> {
        let (a, b) = s.split_once(',')?;
        Some(Self {
            from: parse_hex_rgb(a.trim())?,
            to: parse_hex_rgb(b.trim())?,
        })
    }
}

fn parse_hex_rgb(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// One photo in the collection.  Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    /// Unique, stable identity (the file name relative to the gallery root).
    pub id: String,
    pub src: PathBuf,
    /// Optional larger rendition, preferred for the cover image.
    pub high_res_src: Option<PathBuf>,
    /// Display title; doubles as the alt text.
    pub title: String,
    pub location: Option<String>,
    pub date: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub settings: Option<String>,
    pub description: Option<String>,
    pub glow_colors: Option<GlowColors>,
    /// Width / height of the source image, once known.
    pub aspect_ratio: Option<f64>,
}

impl Photo {
    pub fn new(id: impl Into<String>, src: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            high_res_src: None,
            title: title.into(),
            location: None,
            date: None,
            camera: None,
            lens: None,
            settings: None,
            description: None,
            glow_colors: None,
            aspect_ratio: None,
        }
    }

    /// Source for the hero/cover rendition: `high_res_src`, else `src`.
    pub fn hero_src(&self) -> &PathBuf {
        self.high_res_src.as_ref().unwrap_or(&self.src)
    }

    /// Camera and lens on separate lines, skipping whichever is missing.
    pub fn equipment(&self) -> Option<String> {
        let parts: Vec<&str> = [self.camera.as_deref(), self.lens.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// Field value for display, with the "not set" placeholder for gaps.
pub fn or_not_set(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_SET,
    }
}

/// Description for display, with its own placeholder.
pub fn or_no_description(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NO_DESCRIPTION,
    }
}

/// The photo used for the cover: `hero_id` if present, else the first.
pub fn hero_photo<'a>(photos: &'a [Photo], hero_id: Option<&str>) -> Option<&'a Photo> {
    hero_id
        .and_then(|id| photos.iter().find(|p| p.id == id))
        .or_else(|| photos.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_src_prefers_high_res() {
        let mut p = Photo::new("1", "a.jpg", "A");
        assert_eq!(p.hero_src(), &PathBuf::from("a.jpg"));
        p.high_res_src = Some(PathBuf::from("a@2x.jpg"));
        assert_eq!(p.hero_src(), &PathBuf::from("a@2x.jpg"));
    }

    #[test]
    fn missing_fields_render_placeholders() {
        assert_eq!(or_not_set(None), NOT_SET);
        assert_eq!(or_not_set(Some("  ")), NOT_SET);
        assert_eq!(or_not_set(Some("Tokyo")), "Tokyo");
        assert_eq!(or_no_description(Some("")), NO_DESCRIPTION);
    }

    #[test]
    fn equipment_joins_available_parts() {
        let mut p = Photo::new("1", "a.jpg", "A");
        assert_eq!(p.equipment(), None);
        p.lens = Some("35mm f/1.4".into());
        assert_eq!(p.equipment().as_deref(), Some("35mm f/1.4"));
        p.camera = Some("Sony A7R IV".into());
        assert_eq!(p.equipment().as_deref(), Some("Sony A7R IV\n35mm f/1.4"));
    }

    #[test]
    fn hero_falls_back_to_first() {
        let photos = vec![Photo::new("1", "a.jpg", "A"), Photo::new("2", "b.jpg", "B")];
        assert_eq!(hero_photo(&photos, Some("2")).map(|p| p.id.as_str()), Some("2"));
        assert_eq!(hero_photo(&photos, Some("9")).map(|p| p.id.as_str()), Some("1"));
        assert_eq!(hero_photo(&photos, None).map(|p| p.id.as_str()), Some("1"));
        assert!(hero_photo(&[], None).is_none());
    }

    #[test]
    fn glow_colors_parse() {
        let g = GlowColors::parse("#ff8800, #001122").unwrap();
        assert_eq!(g.from, [0xff, 0x88, 0x00]);
        assert_eq!(g.to, [0x00, 0x11, 0x22]);
        assert!(GlowColors::parse("#ff8800").is_none());
        assert!(GlowColors::parse("#ff88,#001122").is_none());
    }
}
