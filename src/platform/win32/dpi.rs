#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    Graphics::Gdi::{CreateFontIndirectW, DeleteObject, HFONT, HGDIOBJ},
    UI::{
        HiDpi::{
            GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
            SystemParametersInfoForDpi, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        },
        WindowsAndMessaging::{NONCLIENTMETRICSW, SPI_GETNONCLIENTMETRICS},
    },
};

use crate::{
    error::{Result, ScratchpadError},
    layout::BASE_DPI,
};

use super::last_error;

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    let result = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
    if let Err(e) = result {
        // Already set by a manifest, or pre-1703 Windows.  Not fatal.
        log::debug!("SetProcessDpiAwarenessContext: {e}");
    }
}

/// Return the DPI for `hwnd`. Falls back to BASE_DPI (96) on failure.
pub(crate) fn get_for_window(hwnd: HWND) -> u32 {
    // SAFETY: hwnd is a valid window handle provided by the caller.
    let v = unsafe { GetDpiForWindow(hwnd) };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

/// Return the primary-monitor system DPI. Used before window creation.
pub(crate) fn get_system_dpi() -> u32 {
    // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
    let v = unsafe { GetDpiForSystem() };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

// ── ControlFont ───────────────────────────────────────────────────────────────

/// RAII handle to the font shared by both edit controls.
///
/// Based on the system menu font at the given DPI, with the height replaced.
/// `DeleteObject` runs on `Drop`, so keep this alive for as long as any
/// control still uses it.
pub(crate) struct ControlFont(HFONT);

impl ControlFont {
    pub(crate) fn for_dpi(dpi: u32, height: i32) -> Result<Self> {
        let mut metrics = NONCLIENTMETRICSW {
            cbSize: std::mem::size_of::<NONCLIENTMETRICSW>() as u32,
            ..Default::default()
        };

        // SAFETY: `metrics` is a correctly sized NONCLIENTMETRICSW with cbSize
        // set; SPI_GETNONCLIENTMETRICS writes only within it.
        unsafe {
            SystemParametersInfoForDpi(
                SPI_GETNONCLIENTMETRICS.0,
                metrics.cbSize,
                Some(&mut metrics as *mut NONCLIENTMETRICSW as *mut core::ffi::c_void),
                0,
                dpi,
            )
        }
        .map_err(|e| ScratchpadError::win32("SystemParametersInfoForDpi", &e))?;

        metrics.lfMenuFont.lfHeight = height;

        // SAFETY: lfMenuFont is a fully initialised LOGFONTW filled in above.
        let font = unsafe { CreateFontIndirectW(&metrics.lfMenuFont) };
        if font.is_invalid() {
            return Err(last_error("CreateFontIndirectW"));
        }
        log::debug!("control font created: {height}px at {dpi} dpi");
        Ok(Self(font))
    }

    pub(crate) fn handle(&self) -> HFONT {
        self.0
    }
}

impl Drop for ControlFont {
    fn drop(&mut self) {
        // SAFETY: self.0 came from a successful CreateFontIndirectW and is
        // deleted exactly once.  The owner swaps a new font into the controls
        // before dropping the old one.
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.0 .0));
        }
    }
}
