// ── Application state ─────────────────────────────────────────────────────────
//
// A single `App` is created on startup and owned by the main window for its
// whole lifetime.  It holds the DPI the window is currently rendered at and
// the settings, and turns events into the text and geometry the window should
// show.  All mutations happen on the UI thread; nothing here calls Win32.

use std::path::PathBuf;

use crate::{
    config::Settings,
    content,
    error::Result,
    layout::{self, Layout, Rect, BASE_DPI},
    stats::Statistics,
};

// ── ContentUpdate ─────────────────────────────────────────────────────────────

/// What the window must change after the text was edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentUpdate {
    pub(crate) title: String,
    /// New statistics line, or `None` to leave the current one in place.
    pub(crate) status: Option<String>,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub(crate) struct App {
    settings: Settings,
    /// DPI of the monitor the window is on; only WM_DPICHANGED changes it.
    dpi: u32,
}

impl App {
    pub(crate) fn new(settings: Settings, dpi: u32) -> Self {
        Self { settings, dpi: sane_dpi(dpi) }
    }

    pub(crate) fn dpi(&self) -> u32 {
        self.dpi
    }

    pub(crate) fn set_dpi(&mut self, dpi: u32) {
        log::debug!("dpi {} -> {}", self.dpi, dpi);
        self.dpi = sane_dpi(dpi);
    }

    /// Scale a 96-DPI pixel constant to the current DPI.
    pub(crate) fn to_dpi_aware_pixels(&self, px: i32) -> i32 {
        layout::scale(px, self.dpi)
    }

    /// Width and height of the main window at creation.
    pub(crate) fn initial_size(&self) -> (i32, i32) {
        (
            self.to_dpi_aware_pixels(self.settings.initial_width),
            self.to_dpi_aware_pixels(self.settings.initial_height),
        )
    }

    /// Pixel height for the font of both edit controls.
    pub(crate) fn font_height(&self) -> i32 {
        layout::font_height(self.settings.font_size, self.dpi)
    }

    /// Child control rectangles for the given client area.
    pub(crate) fn layout(&self, client: Rect) -> Layout {
        layout::layout_subcontrols(client, self.to_dpi_aware_pixels(self.settings.status_height))
    }

    /// Enforce the minimum window size on a WM_SIZING rectangle.
    pub(crate) fn clamp_sizing(&self, proposed: Rect) -> Rect {
        layout::clamp_to_min(
            proposed,
            self.to_dpi_aware_pixels(self.settings.min_width),
            self.to_dpi_aware_pixels(self.settings.min_height),
        )
    }

    /// React to an edit of the scratchpad text.
    ///
    /// Empty text only resets the title; the statistics line keeps showing
    /// whatever it showed before.
    pub(crate) fn content_changed(&self, text: &str) -> ContentUpdate {
        if text.is_empty() {
            return ContentUpdate { title: content::EMPTY_TITLE.to_owned(), status: None };
        }
        ContentUpdate {
            title: content::window_title(text),
            status: Some(Statistics::from_text(text).to_string()),
        }
    }

    // ── File save ─────────────────────────────────────────────────────────────

    /// Write `text` to `path` as UTF-8, returning the path actually written
    /// (long paths gain a `\\?\` prefix).
    pub(crate) fn save(&self, path: PathBuf, text: &str) -> Result<PathBuf> {
        let path = content::to_long_path(path);
        content::write_utf8(&path, text)?;
        log::info!("saved {} bytes to {}", text.len(), path.display());
        Ok(path)
    }
}

/// Windows reports 0 when a DPI query fails.
fn sane_dpi(dpi: u32) -> u32 {
    if dpi == 0 {
        BASE_DPI
    } else {
        dpi
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::NOT_ENOUGH_NUMBERS;

    fn app(dpi: u32) -> App {
        App::new(Settings::default(), dpi)
    }

    #[test]
    fn zero_dpi_falls_back_to_base() {
        assert_eq!(app(0).dpi(), BASE_DPI);
        let mut a = app(96);
        a.set_dpi(0);
        assert_eq!(a.dpi(), BASE_DPI);
    }

    #[test]
    fn initial_size_scales_with_dpi() {
        assert_eq!(app(96).initial_size(), (800, 600));
        assert_eq!(app(144).initial_size(), (1200, 900));
    }

    #[test]
    fn dpi_change_rescales_later_measurements() {
        let mut a = app(96);
        let client = Rect::from_size(0, 0, 800, 600);
        assert_eq!(a.layout(client).status.height(), 24);

        a.set_dpi(192);
        assert_eq!(a.layout(client).status.height(), 48);
        assert_eq!(a.layout(client).content.height(), 552);
    }

    #[test]
    fn sizing_clamps_to_scaled_minimum() {
        let a = app(120);
        let r = a.clamp_sizing(Rect::from_size(0, 0, 100, 100));
        assert_eq!((r.width(), r.height()), (500, 250));
    }

    #[test]
    fn huge_minimum_width_does_not_overflow_sizing() {
        let s = Settings::from_json(r#"{"min_width": 2147483647}"#).expect("parse");
        let r = App::new(s, 96).clamp_sizing(Rect::from_size(10, 20, 100, 100));
        assert_eq!(r.left, 10);
        assert_eq!(r.width(), crate::config::MAX_PIXELS);
        assert_eq!(r.height(), 200);
    }

    #[test]
    fn huge_initial_width_stays_positive_at_high_dpi() {
        let s = Settings::from_json(r#"{"initial_width": 2000000000}"#).expect("parse");
        let a = App::new(s, 192);
        assert_eq!(a.initial_size(), (2 * crate::config::MAX_PIXELS, 1200));
        assert_eq!(a.font_height(), 42);
    }

    #[test]
    fn font_height_follows_dpi() {
        assert_eq!(app(96).font_height(), 21);
        assert_eq!(app(192).font_height(), 42);
    }

    #[test]
    fn empty_content_only_resets_title() {
        let update = app(96).content_changed("");
        assert_eq!(update.title, "Scratchpad4k (empty)");
        assert_eq!(update.status, None);
    }

    #[test]
    fn content_with_numbers_updates_title_and_status() {
        let update = app(96).content_changed("3 and 7 and 2");
        assert_eq!(update.title, "3 and 7 and 2 -- Scratchpad4k (13 wchars)");
        assert_eq!(
            update.status.as_deref(),
            Some("Avg=4 +-3, Min=2, Max=7, Sum=12, nNumbers=3")
        );
    }

    #[test]
    fn content_without_enough_numbers_reports_so() {
        let update = app(96).content_changed("todo\n1 thing");
        assert_eq!(update.title, "todo -- Scratchpad4k (12 wchars)");
        assert_eq!(update.status.as_deref(), Some(NOT_ENOUGH_NUMBERS));
    }

    #[test]
    fn save_writes_content_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");

        let written = app(96).save(path.clone(), "a\r\nb\n").expect("save");
        assert_eq!(written, path);
        assert_eq!(std::fs::read(&path).expect("read"), b"a\r\nb\n");
    }

    #[test]
    fn save_error_is_propagated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no-such-dir").join("notes.txt");
        assert!(app(96).save(path, "x").is_err());
    }
}
