// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Scratchpad4k return `error::Result<T>`.  Fatal
// errors end up in `main()` as a modal dialog; recoverable ones (saving) are
// reported by the window that triggered them.

use thiserror::Error;

use crate::router::RouterError;

/// Every error that Scratchpad4k can produce.
#[derive(Debug, Error)]
pub(crate) enum ScratchpadError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// The common save dialog failed for a reason other than cancellation.
    #[error("GetSaveFileNameW failed (extended error code: {code:#06x})")]
    SaveDialog { code: u32 },

    /// A standard I/O error (file open, write, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file exists but is not valid JSON for `Settings`.
    #[error("invalid settings file: {0}")]
    Config(#[from] serde_json::Error),

    /// The window router was misused.
    #[error(transparent)]
    Router(#[from] RouterError),
}

// Convert a windows-crate error (HRESULT) directly into a ScratchpadError so
// that `?` can be used on `windows::core::Result<T>` in the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for ScratchpadError {
    fn from(e: windows::core::Error) -> Self {
        Self::win32("windows", &e)
    }
}

#[cfg(windows)]
impl ScratchpadError {
    /// Attach the failing function's name to a windows-crate error.
    pub(crate) fn win32(function: &'static str, e: &windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 { function, code: e.code().0 as u32 }
    }
}

/// Convenience alias used throughout the crate.
pub(crate) type Result<T> = std::result::Result<T, ScratchpadError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_displays_function_and_hex_code() {
        let e = ScratchpadError::Win32 { function: "CreateWindowExW", code: 5 };
        assert_eq!(e.to_string(), "CreateWindowExW failed (error 0x00000005)");
    }

    #[test]
    fn save_dialog_error_displays_extended_code() {
        let e = ScratchpadError::SaveDialog { code: 0x3002 };
        assert_eq!(
            e.to_string(),
            "GetSaveFileNameW failed (extended error code: 0x3002)"
        );
    }

    #[test]
    fn router_errors_are_transparent() {
        let e: ScratchpadError = RouterError::BindPending.into();
        assert_eq!(e.to_string(), RouterError::BindPending.to_string());
    }
}
