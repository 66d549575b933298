// ── Window class, dispatch, message loop ──────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class with `dispatch_proc` as its WndProc.
//   • Route every message of that class through the installed `WindowRouter`.
//   • Run the Win32 message loop, letting the main window preview key
//     messages before they are translated and dispatched.

#![allow(unsafe_code)]

use std::cell::Cell;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{GetStockObject, HBRUSH, WHITE_BRUSH},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            DispatchMessageW, GetMessageW, LoadCursorW, RegisterClassExW, TranslateMessage,
            CS_HREDRAW, CS_VREDRAW, IDC_ARROW, MSG, WNDCLASSEXW,
        },
    },
};

use crate::{
    config,
    error::{Result, ScratchpadError},
    router::{Message, RouterError, WindowRouter},
};

use super::{dialogs, dpi, last_error, scratchpad::ScratchpadWindow, window_id};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
pub(crate) const CLASS_NAME: PCWSTR = w!("scratchpad4k-main");

// ── Public API ────────────────────────────────────────────────────────────────

/// Set up the router and the main window, then drive the message loop until
/// the user quits.
pub(crate) fn run() -> Result<()> {
    let t0 = std::time::Instant::now();

    dpi::init();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(None) }.map_err(ScratchpadError::from)?;

    // HINSTANCE and HMODULE represent the same underlying value on Windows
    // (guaranteed by the Win32 ABI).
    let hinstance = HINSTANCE(hmodule.0);

    let settings = config::load();
    register_class(hinstance)?;

    let router = WindowRouter::install()?;
    let window = ScratchpadWindow::create(&router, hinstance, settings)?;
    log::debug!("window visible in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    let result = message_loop(&window);

    // Destroy while the router is still installed so the teardown messages
    // reach the controller, which unbinds itself on WM_NCDESTROY.
    window.destroy();
    drop(window);
    drop(router);
    result
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: LoadCursorW with IDC_ARROW always succeeds; the arrow cursor is
    // a built-in resource guaranteed to exist on all Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(ScratchpadError::from)?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
    // Casting to HBRUSH is correct: stock brush objects are compatible types.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(dispatch_proc),
        hInstance: hinstance,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }

    Ok(())
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop(window: &ScratchpadWindow) -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; None retrieves messages for
        // all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved: exit the loop cleanly.
            0 => break,
            _ => {
                if window.preview_message(&msg) {
                    continue;
                }
                // SAFETY: msg was populated by a successful GetMessageW call.
                // TranslateMessage return value (whether it generated WM_CHAR)
                // and DispatchMessageW's LRESULT are intentionally unused.
                unsafe {
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                }
            }
        }
    }

    log::debug!("message loop finished (exit code {})", msg.wParam.0);
    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: dispatch_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; handlers must not store pointers derived from lparam.
unsafe extern "system" fn dispatch_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let window = window_id(hwnd);
    let Some(router) = WindowRouter::installed() else {
        fatal(RouterError::NotInstalled { window: window.0, message: msg }.into());
    };

    match router.route(window, Message::new(msg, wparam.0, lparam.0)) {
        Ok(result) => LRESULT(result),
        Err(e) => fatal(e.into()),
    }
}

/// Report a protocol error and end the process.
///
/// Unwinding out of `dispatch_proc` is not an option, and continuing would
/// leave a window without an owner.
///
/// The error box runs a nested message loop, so further messages can land
/// here again before `exit`; only the first failure shows a dialog.
fn fatal(e: ScratchpadError) -> ! {
    log::error!("{e}");
    if enter_failure() {
        dialogs::show_error_dialog(&e.to_string());
    }
    std::process::exit(1);
}

thread_local! {
    static FAILING: Cell<bool> = const { Cell::new(false) };
}

/// `true` for the first call on this thread, `false` afterwards.
fn enter_failure() -> bool {
    !FAILING.with(|failing| failing.replace(true))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_failure_is_reported() {
        assert!(enter_failure());
        assert!(!enter_failure());
        assert!(!enter_failure());
    }
}
