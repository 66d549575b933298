// ── EDIT child controls ───────────────────────────────────────────────────────
//
// Safe wrapper over the two standard `EDIT` controls of the main window: the
// multiline text region and the read-only statistics line.  Callers never
// send control messages themselves.
//
// The child HWNDs are destroyed by Windows together with the parent; no
// explicit cleanup is needed.

#![allow(unsafe_code)]

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, WPARAM},
        UI::{
            Input::KeyboardAndMouse::SetFocus,
            WindowsAndMessaging::{
                CreateWindowExW, GetWindowTextLengthW, GetWindowTextW, PostMessageW,
                SendMessageW, SetWindowPos, SetWindowTextW, SWP_NOACTIVATE, SWP_NOZORDER,
                WINDOW_STYLE, WM_SETFONT, WS_CHILD, WS_EX_CLIENTEDGE, WS_VISIBLE, WS_VSCROLL,
            },
        },
    },
};

use crate::{
    error::{Result, ScratchpadError},
    layout::Rect,
};

use super::{dpi::ControlFont, wide};

// ── Edit control constants (winuser.h) ────────────────────────────────────────

const ES_MULTILINE: u32 = 0x0004;
const ES_AUTOVSCROLL: u32 = 0x0040;
const ES_AUTOHSCROLL: u32 = 0x0080;
const ES_READONLY: u32 = 0x0800;

/// Select a character range.  WPARAM=start, LPARAM=end; `0, -1` selects all.
const EM_SETSEL: u32 = 0x00B1;

/// WM_COMMAND notification code: the control is about to redraw changed text.
pub(crate) const EN_UPDATE: u16 = 0x0400;

// ── EditControl ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditKind {
    /// Multiline, user-editable scratchpad text.
    Content,
    /// Single-line, read-only statistics.
    Status,
}

/// A hosted `EDIT` child window.  Copyable: it is only a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EditControl {
    hwnd: HWND,
}

impl EditControl {
    /// Create an edit control of `kind` inside `hwnd_parent`, at zero size.
    /// The caller positions it with [`move_to`](Self::move_to).
    pub(crate) fn create(hwnd_parent: HWND, hinstance: HINSTANCE, kind: EditKind) -> Result<Self> {
        let style = match kind {
            EditKind::Content => {
                WS_CHILD | WS_VISIBLE | WS_VSCROLL | WINDOW_STYLE(ES_MULTILINE | ES_AUTOVSCROLL)
            }
            EditKind::Status => WS_CHILD | WS_VISIBLE | WINDOW_STYLE(ES_READONLY | ES_AUTOHSCROLL),
        };

        // SAFETY: "EDIT" is a system class that always exists.  hwnd_parent
        // and hinstance are valid handles of the window being set up.
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_CLIENTEDGE,
                w!("EDIT"),
                PCWSTR::null(),
                style,
                0, 0, 0, 0,
                hwnd_parent,
                None,
                hinstance,
                None,
            )
        }
        .map_err(|e| ScratchpadError::win32("CreateWindowExW (EDIT)", &e))?;

        log::trace!("created {kind:?} edit control {:?}", hwnd.0);
        Ok(Self { hwnd })
    }

    /// The control's window handle.  Valid until the parent is destroyed.
    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Full text of the control.
    pub(crate) fn text(&self) -> String {
        // SAFETY: hwnd valid; GetWindowTextLengthW is a read-only query.
        let len = unsafe { GetWindowTextLengthW(self.hwnd) };
        if len <= 0 {
            return String::new();
        }

        let mut buf = vec![0u16; len as usize + 1];
        // SAFETY: buf holds len+1 units; GetWindowTextW writes at most
        // buf.len() units including the terminating null.
        let copied = unsafe { GetWindowTextW(self.hwnd, &mut buf) };
        buf.truncate(copied.max(0) as usize);
        String::from_utf16_lossy(&buf)
    }

    /// Replace the control's text.
    pub(crate) fn set_text(&self, text: &str) {
        let text_wide = wide(text);
        // SAFETY: hwnd valid; text_wide is null-terminated and outlives the call.
        if let Err(e) = unsafe { SetWindowTextW(self.hwnd, PCWSTR(text_wide.as_ptr())) } {
            log::warn!("SetWindowTextW on edit control: {e}");
        }
    }

    pub(crate) fn focus(&self) {
        // SAFETY: hwnd is a valid child window on this thread.
        // The previously focused window returned by SetFocus is not needed.
        unsafe {
            let _ = SetFocus(self.hwnd);
        }
    }

    /// Select all text once the current message has been processed.
    pub(crate) fn select_all(&self) {
        select_all_in(self.hwnd);
    }

    pub(crate) fn set_font(&self, font: &ControlFont) {
        // SAFETY: hwnd valid; the font handle stays alive in the owner until a
        // replacement has been set.  LPARAM(1) asks the control to redraw.
        unsafe {
            let _ = SendMessageW(self.hwnd, WM_SETFONT, WPARAM(font.handle().0 as usize), LPARAM(1));
        }
    }

    pub(crate) fn move_to(&self, r: Rect) {
        // SAFETY: hwnd is a valid child window; the flags keep Z order and
        // activation untouched.
        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                None,
                r.left,
                r.top,
                r.width(),
                r.height(),
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }
}

/// Post `EM_SETSEL(0, -1)` to `hwnd`.
///
/// Posted rather than sent: a focus change queued just before would otherwise
/// reset the selection.
pub(crate) fn select_all_in(hwnd: HWND) {
    // SAFETY: PostMessageW only queues the message; an invalid or null hwnd
    // makes it fail, which is harmless here.
    unsafe {
        let _ = PostMessageW(hwnd, EM_SETSEL, WPARAM(0), LPARAM(-1));
    }
}
