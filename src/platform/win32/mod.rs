// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module tree in the codebase where `unsafe` code is
// permitted.  Every `unsafe` block MUST carry a `// SAFETY:` comment that
// states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod dialogs; // save dialog, error boxes
pub mod window; // class registration, dispatch proc, message loop

pub(crate) mod dpi; // per-monitor DPI v2 helpers, control font
pub(crate) mod edit; // EDIT child controls
pub(crate) mod scratchpad; // the main window controller

use windows::Win32::Foundation::{GetLastError, HWND};

use crate::{error::ScratchpadError, router::WindowId};

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Null-terminated UTF-16 copy of `s`, for `PCWSTR` parameters.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The router's view of a window handle.
pub(crate) fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as isize)
}

/// Inverse of [`window_id`].
pub(crate) fn hwnd_of(id: WindowId) -> HWND {
    HWND(id.0 as *mut core::ffi::c_void)
}

/// Capture the current Win32 last-error code and wrap it in a `ScratchpadError`.
///
/// Call immediately after a Win32 function that signals failure: `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
pub(crate) fn last_error(function: &'static str) -> ScratchpadError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    ScratchpadError::Win32 { function, code: code.0 }
}
