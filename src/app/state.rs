//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use ratatui::layout::Rect;

use crate::catalog::{self, Catalog};
use crate::config::AppConfig;
use crate::core::center::InputProfile;
use crate::core::observer::FrameOverlapObserver;
use crate::core::photo::{hero_photo, Photo};
use crate::core::registry::{LayoutMode, SectionId, StripMetrics};
use crate::core::snap::{self, ScrollCommand, WheelDelta};
use crate::core::viewport::ViewportEngine;
use crate::ui::detail::DetailHitZones;
use crate::ui::layout;
use crate::ui::smooth_scroll::ScrollAnimator;
use crate::ui::strip::StripHit;

use super::image_runtime::ThumbnailLoaded;
use super::overlay::DetailOverlay;

/// Fraction of the remaining distance covered per frame.
const SCROLL_SPEED: f64 = 0.3;

/// Top-level application state.
pub struct AppState {
    pub config: AppConfig,
    pub engine: ViewportEngine<FrameOverlapObserver>,
    pub scroll: ScrollAnimator,
    /// Directory the collection was loaded from (for reloads).
    pub gallery_root: PathBuf,
    /// Photo id shown on the cover.
    pub hero_id: Option<String>,
    /// Open detail overlay, if any.  While open it owns all input.
    pub detail: Option<DetailOverlay>,
    /// Decoded thumbnails keyed by source path.
    pub thumbnails: HashMap<PathBuf, Arc<RgbaImage>>,
    pending_thumbnails: HashSet<PathBuf>,
    failed_thumbnails: HashSet<PathBuf>,
    thumbnail_requests: Vec<PathBuf>,
    /// Bumped on every collection swap; stale decodes are dropped.
    pub collection_generation: u64,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Area the strip was last laid out for.
    pub strip_area: Option<Rect>,
    /// Clickable regions from the last strip render.
    pub strip_hits: Vec<StripHit>,
    /// Clickable regions from the last overlay render.
    pub detail_hit_zones: Option<DetailHitZones>,
}

impl AppState {
    /// Mounts the collection straight away.  Geometry is empty until the
    /// first [`resize`](Self::resize) supplies a real strip area.
    pub fn new(catalog: Catalog, config: AppConfig) -> Self {
        let mut engine = ViewportEngine::new(FrameOverlapObserver::new(), config.engine_config());
        engine.mount(
            Arc::new(catalog.photos),
            LayoutMode::default(),
            StripMetrics::default(),
        );
        let hero_id = config.hero.clone().or(catalog.hero);
        let mut state = Self {
            config,
            engine,
            scroll: ScrollAnimator::new(SCROLL_SPEED),
            gallery_root: catalog.root,
            hero_id,
            detail: None,
            thumbnails: HashMap::new(),
            pending_thumbnails: HashSet::new(),
            failed_thumbnails: HashSet::new(),
            thumbnail_requests: Vec::new(),
            collection_generation: 0,
            should_quit: false,
            status_message: None,
            strip_area: None,
            strip_hits: Vec::new(),
            detail_hit_zones: None,
        };
        state.request_hero();
        state
    }

    pub fn hero(&self) -> Option<&Photo> {
        hero_photo(self.engine.photos(), self.hero_id.as_deref())
    }

    /// Position of a section's photo in the collection.
    pub fn photo_index(&self, id: &SectionId) -> Option<usize> {
        let photo_id = id.photo_id()?;
        self.engine.photos().iter().position(|p| p.id == photo_id)
    }

    // ── layout ──────────────────────────────────────────────────

    /// Lay the strip out for `area`.  Unchanged areas are ignored.
    pub fn resize(&mut self, area: Rect) {
        if self.strip_area == Some(area) {
            return;
        }
        self.strip_area = Some(area);
        let mode = layout::layout_mode(area, self.config.narrow_width);
        self.engine.set_layout(mode, layout::strip_metrics(area));

        let max = self.engine.registry().max_scroll();
        if self.engine.snap_active() {
            // Re-anchor on the current section; its offset moved with the layout.
            if let Some(ScrollCommand::SmoothTo(x)) =
                self.engine.scroll_to_index(self.engine.snap_index())
            {
                self.scroll.jump_to(x, max);
            }
        } else {
            self.scroll.clamp(max);
        }
    }

    /// Swap in a freshly loaded collection.
    pub fn replace_collection(&mut self, catalog: Catalog) {
        self.collection_generation = self.collection_generation.wrapping_add(1);
        self.thumbnails.clear();
        self.pending_thumbnails.clear();
        self.failed_thumbnails.clear();
        self.thumbnail_requests.clear();
        self.detail = None;
        self.detail_hit_zones = None;
        self.hero_id = self.config.hero.clone().or(catalog.hero);
        self.gallery_root = catalog.root;

        self.engine.set_photos(Arc::new(catalog.photos));
        let max = self.engine.registry().max_scroll();
        match self.engine.scroll_to_index(0) {
            Some(ScrollCommand::SmoothTo(x)) => self.scroll.jump_to(x, max),
            _ => self.scroll.clamp(max),
        }
        self.request_hero();
    }

    /// Re-read the gallery directory.  Failures keep the current collection.
    pub fn reload(&mut self) {
        match catalog::load(&self.gallery_root) {
            Ok(catalog) => {
                let n = catalog.photos.len();
                self.replace_collection(catalog);
                self.status_message = Some(format!("Reloaded {n} photos"));
            }
            Err(e) => {
                tracing::warn!("reload failed: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    // ── scrolling ───────────────────────────────────────────────

    pub fn apply(&mut self, command: Option<ScrollCommand>) {
        if let Some(command) = command {
            self.scroll
                .apply(command, self.engine.registry().max_scroll());
        }
    }

    pub fn on_wheel(&mut self, delta: WheelDelta, now: Instant) {
        let command = self.engine.on_wheel(delta, now);
        self.apply(command);
    }

    pub fn step(&mut self, forward: bool) {
        let command = self.engine.step(forward);
        self.apply(command);
    }

    pub fn scroll_to_index(&mut self, index: usize) {
        let command = self.engine.scroll_to_index(index);
        self.apply(command);
    }

    /// Flip snap navigation.  Entering snap mode aligns to the nearest section.
    pub fn toggle_snap(&mut self) {
        let enabled = !self.engine.config().snap_navigation;
        self.engine.set_snap_navigation(enabled);
        self.config.snap_navigation = enabled;
        if self.engine.snap_active() {
            self.scroll_to_index(self.engine.snap_index());
        }
        self.status_message = Some(match (enabled, self.engine.snap_active()) {
            (false, _) => "Free scroll".into(),
            (true, true) => "Snap navigation".into(),
            (true, false) => "Snap navigation (off in narrow layout)".into(),
        });
    }

    /// Switch between the pointer and touch center bands.
    pub fn toggle_touch(&mut self) {
        let profile = match self.engine.config().input_profile {
            InputProfile::Pointer => InputProfile::Touch,
            InputProfile::Touch => InputProfile::Pointer,
        };
        self.engine.set_input_profile(profile);
        self.config.touch_primary = profile == InputProfile::Touch;
        self.status_message = Some(match profile {
            InputProfile::Pointer => "Pointer center band".into(),
            InputProfile::Touch => "Touch center band".into(),
        });
    }

    /// Section the user is looking at: the snap index in snap mode,
    /// otherwise whichever section's resting offset is nearest.
    pub fn current_section(&self) -> usize {
        if self.engine.snap_active() {
            self.engine.snap_index()
        } else {
            snap::nearest_index(self.engine.registry(), self.scroll.target())
        }
    }

    /// Advance animations and apply whatever crossed an overlap checkpoint.
    pub fn tick(&mut self, now: Instant) {
        self.engine.tick(now);
        self.scroll.tick();
        self.engine.on_scroll(self.scroll.offset());
        let update = self.engine.frame();
        for id in &update.revealed {
            self.request_section(id);
        }
        if !update.revealed.is_empty() {
            tracing::debug!(
                "revealed {}/{} sections",
                self.engine.revealed_count(),
                self.engine.registry().count()
            );
        }
        if update.centered_changed {
            tracing::trace!("centered: {:?}", self.engine.centered());
        }
    }

    // ── detail overlay ──────────────────────────────────────────

    pub fn open_detail(&mut self, photo_index: usize) {
        self.detail = DetailOverlay::open(Arc::clone(self.engine.photos()), photo_index);
        self.request_detail_image();
    }

    /// Open the centered photo, falling back to the nearest one.
    pub fn open_focused(&mut self) {
        let index = self
            .engine
            .centered()
            .and_then(|id| self.photo_index(id))
            .or_else(|| {
                let section = self.engine.registry().get(self.current_section())?;
                self.photo_index(&section.id)
            })
            .unwrap_or(0);
        self.open_detail(index);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.detail_hit_zones = None;
    }

    pub fn detail_next(&mut self) {
        if self.detail.as_mut().is_some_and(|d| d.on_next()) {
            self.request_detail_image();
        }
    }

    pub fn detail_prev(&mut self) {
        if self.detail.as_mut().is_some_and(|d| d.on_prev()) {
            self.request_detail_image();
        }
    }

    // ── thumbnails ──────────────────────────────────────────────

    /// Paths queued for decoding since the last call.
    pub fn take_thumbnail_requests(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.thumbnail_requests)
    }

    /// Sources whose decode failed in the current collection.
    pub fn failed_thumbnails(&self) -> &HashSet<PathBuf> {
        &self.failed_thumbnails
    }

    /// Store a finished decode.  Returns `false` for stale or failed ones.
    pub fn on_thumbnail(&mut self, loaded: ThumbnailLoaded) -> bool {
        if loaded.generation != self.collection_generation {
            return false;
        }
        self.pending_thumbnails.remove(&loaded.path);
        match loaded.result {
            Ok(img) => {
                self.thumbnails.insert(loaded.path, img);
                true
            }
            Err(e) => {
                tracing::warn!("thumbnail: {e:#}");
                self.failed_thumbnails.insert(loaded.path);
                false
            }
        }
    }

    fn request_section(&mut self, id: &SectionId) {
        match id {
            SectionId::Cover => self.request_hero(),
            SectionId::Photo(_) => {
                let src = self
                    .photo_index(id)
                    .map(|i| self.engine.photos()[i].src.clone());
                if let Some(src) = src {
                    self.request_thumbnail(src);
                }
            }
        }
    }

    fn request_hero(&mut self) {
        if let Some(src) = self.hero().map(|p| p.hero_src().clone()) {
            self.request_thumbnail(src);
        }
    }

    fn request_detail_image(&mut self) {
        if let Some(src) = self.detail.as_ref().map(|d| d.current().src.clone()) {
            self.request_thumbnail(src);
        }
    }

    fn request_thumbnail(&mut self, path: PathBuf) {
        if self.thumbnails.contains_key(&path)
            || self.pending_thumbnails.contains(&path)
            || self.failed_thumbnails.contains(&path)
        {
            return;
        }
        self.pending_thumbnails.insert(path.clone());
        self.thumbnail_requests.push(path);
    }
}
