// ── Common dialogs ─────────────────────────────────────────────────────────────
//
// Thin wrappers around the Win32 Save dialog and message boxes.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::{ffi::OsString, os::windows::ffi::OsStringExt, path::PathBuf};

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        UI::{
            Controls::Dialogs::{
                CommDlgExtendedError, GetSaveFileNameW, OFN_DONTADDTORECENT, OFN_FORCESHOWHIDDEN,
                OFN_LONGNAMES, OFN_NOTESTFILECREATE, OFN_OVERWRITEPROMPT, OPENFILENAMEW,
            },
            WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK},
        },
    },
};

use crate::error::{Result, ScratchpadError};

use super::wide;

// ── Buffer size ───────────────────────────────────────────────────────────────

/// Maximum path length in `WCHAR`s, including the null terminator.
/// `MAX_PATH` (260) is too short for modern Windows paths; use 32 768 which
/// is the documented maximum for `\\?\` extended paths.
const PATH_BUF_LEN: usize = 32_768;

// ── Save dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Save As" dialog with `suggested_name` pre-filled.
///
/// Returns `Ok(None)` when the user cancels; any other failure of the dialog
/// is an error carrying the `CommDlgExtendedError` code.
pub(crate) fn show_save_dialog(hwnd_owner: HWND, suggested_name: &str) -> Result<Option<PathBuf>> {
    // Leave room for the terminating null even if the suggestion were huge.
    let mut buf: Vec<u16> = suggested_name
        .encode_utf16()
        .take(PATH_BUF_LEN - 1)
        .chain(std::iter::repeat(0))
        .take(PATH_BUF_LEN)
        .collect();

    let filter: Vec<u16> = "All Files (*.*)\0*.*\0Text Files (*.txt)\0*.txt\0\0"
        .encode_utf16()
        .collect();

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: hwnd_owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        Flags: OFN_DONTADDTORECENT
            | OFN_FORCESHOWHIDDEN
            | OFN_LONGNAMES
            | OFN_NOTESTFILECREATE
            | OFN_OVERWRITEPROMPT,
        ..Default::default()
    };

    // SAFETY: `ofn` is fully initialised; `buf` and `filter` outlive this
    // call.  GetSaveFileNameW reads and writes only within the buffers we
    // provided.  The function is called on the UI thread (required for modal
    // dialogs).
    let ok = unsafe { GetSaveFileNameW(&mut ofn) };
    if ok.as_bool() {
        return Ok(Some(path_from_buf(&buf)));
    }

    // SAFETY: reads the thread's common-dialog error state, set by the call
    // above; no other dialog ran in between.
    let code = unsafe { CommDlgExtendedError() }.0;
    if code == 0 {
        // Zero means the user dismissed the dialog.
        Ok(None)
    } else {
        Err(ScratchpadError::SaveDialog { code })
    }
}

// ── Message boxes ─────────────────────────────────────────────────────────────

/// Modal error box owned by `hwnd_owner`.
pub(crate) fn show_error(hwnd_owner: HWND, caption: &str, message: &str) {
    let msg_wide = wide(message);
    let caption_wide = wide(caption);

    // SAFETY: msg_wide and caption_wide are valid null-terminated UTF-16
    // strings that remain allocated for the duration of the MessageBoxW call.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            hwnd_owner,
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(caption_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

/// Show a modal error dialog with no owner window.
///
/// Used by `main()` when `run()` returns an error, and by the dispatch proc
/// when the router is misused.
pub(crate) fn show_error_dialog(message: &str) {
    show_error(HWND::default(), "Scratchpad4k: Fatal Error", message);
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Convert a null-terminated UTF-16 buffer to a `PathBuf`, without loss.
fn path_from_buf(buf: &[u16]) -> PathBuf {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    PathBuf::from(OsString::from_wide(&buf[..len]))
}
