// ── Platform layer ────────────────────────────────────────────────────────────
//
// All OS interaction lives below this module.  The rest of the crate works on
// plain Rust types (`WindowId`, `Message`, `Rect`) and never sees a Win32
// handle.  Off Windows the module is empty and the binary refuses to start.

#[cfg(windows)]
pub(crate) mod win32;
