// ── Main window controller ────────────────────────────────────────────────────
//
// `ScratchpadWindow` owns the top-level window and its two edit controls.  It
// is the router's handler for the top-level HWND and the message loop's key
// previewer.  Decisions (text, geometry, shortcuts) come from `App`,
// `content` and `keys`; this file only applies them through Win32.
//
// Handlers run re-entrantly: `SetWindowTextW`, `SetWindowPos` and friends send
// messages back into `process_message` before they return.  State therefore
// lives in `Cell`/`RefCell`, and no borrow is held across a Win32 call.

#![allow(unsafe_code)]

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, RECT, WPARAM},
        Graphics::Gdi::{GetMonitorInfoW, MonitorFromWindow, MONITORINFO, MONITOR_DEFAULTTONULL},
        UI::{
            Input::KeyboardAndMouse::{GetFocus, GetKeyState, VK_CONTROL},
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, GetWindowRect,
                PostQuitMessage, SetWindowPos, SetWindowTextW, ShowWindow, UpdateWindow, MSG,
                SWP_ASYNCWINDOWPOS, SWP_NOACTIVATE, SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER,
                SW_SHOW, WINDOW_EX_STYLE, WM_ACTIVATE, WM_CLOSE, WM_COMMAND, WM_DPICHANGED,
                WM_KEYDOWN, WM_KEYUP, WM_NCDESTROY, WM_SIZE, WM_SIZING, WS_OVERLAPPEDWINDOW,
            },
        },
    },
};

use crate::{
    app::App,
    config::Settings,
    content::{self, APP_NAME},
    error::{Result, ScratchpadError},
    keys::{self, Focus, KeyAction, KeyEvent, KeyPhase},
    layout::{self, Rect},
    router::{Message, MessageHandler, WindowId, WindowRouter},
};

use super::{
    dialogs, dpi,
    dpi::ControlFont,
    edit::{self, EditControl, EditKind, EN_UPDATE},
    hwnd_of, wide, window::CLASS_NAME, window_id,
};

/// `LOWORD(wParam)` of WM_ACTIVATE when the window is losing activation.
const WA_INACTIVE: usize = 0;

/// Return value for a handled message.
const MESSAGE_PROCESSED: isize = 0;

// ── Child controls ────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct Controls {
    content: EditControl,
    status: EditControl,
}

// ── ScratchpadWindow ──────────────────────────────────────────────────────────

pub(crate) struct ScratchpadWindow {
    app: RefCell<App>,
    hinstance: HINSTANCE,
    /// Null until `CreateWindowExW` returns.
    hwnd: Cell<HWND>,
    /// `None` until the children exist; messages arrive before that.
    controls: Cell<Option<Controls>>,
    font: RefCell<Option<ControlFont>>,
    /// Weak: the router holds this window strongly while it is bound.
    router: Weak<WindowRouter>,
}

impl ScratchpadWindow {
    /// Create, lay out and show the main window, bound to `router`.
    pub(crate) fn create(
        router: &Rc<WindowRouter>,
        hinstance: HINSTANCE,
        settings: Settings,
    ) -> Result<Rc<Self>> {
        let window = Rc::new(Self {
            app: RefCell::new(App::new(settings, dpi::get_system_dpi())),
            hinstance,
            hwnd: Cell::new(HWND::default()),
            controls: Cell::new(None),
            font: RefCell::new(None),
            router: Rc::downgrade(router),
        });

        let (width, height) = window.app.borrow().initial_size();
        let title = wide(APP_NAME);
        let handler: Rc<dyn MessageHandler> = window.clone();

        let id = router.create_bound(handler, || {
            // SAFETY: CLASS_NAME was registered by `window::run`; title is a
            // null-terminated UTF-16 buffer alive for the call.  None parent
            // creates a top-level window.
            let hwnd = unsafe {
                CreateWindowExW(
                    WINDOW_EX_STYLE(0),
                    CLASS_NAME,
                    PCWSTR(title.as_ptr()),
                    WS_OVERLAPPEDWINDOW,
                    0,
                    0,
                    width,
                    height,
                    None,
                    None,
                    hinstance,
                    None,
                )
            }
            .map_err(|e| ScratchpadError::win32("CreateWindowExW", &e))?;
            Ok(window_id(hwnd))
        })?;

        debug_assert!(router.is_bound(id) && !router.has_pending_bind());

        let hwnd = hwnd_of(id);
        window.hwnd.set(hwnd);
        log::info!("main window created ({width}x{height})");

        // The window may have landed on a monitor other than the primary one.
        window.app.borrow_mut().set_dpi(dpi::get_for_window(hwnd));

        window.center_on_monitor();
        if let Err(e) = window.create_subcontrols() {
            // Tear the half-built window down while the router still routes
            // its final messages.
            window.destroy();
            return Err(e);
        }
        window.layout_subcontrols();

        // SAFETY: hwnd was just created and is valid.  ShowWindow returns the
        // previous visibility state; UpdateWindow returns a success BOOL -
        // both are intentionally ignored here.
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }

        Ok(window)
    }

    /// Destroy the top-level window (and with it the children).
    pub(crate) fn destroy(&self) {
        let hwnd = self.hwnd.replace(HWND::default());
        if hwnd == HWND::default() {
            return;
        }
        self.controls.set(None);
        // SAFETY: hwnd is our own top-level window, still alive.  Teardown
        // messages are routed back here while the router is installed.
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
    }

    // ── Construction helpers ──────────────────────────────────────────────────

    fn create_subcontrols(&self) -> Result<()> {
        let hwnd = self.hwnd.get();
        let controls = Controls {
            content: EditControl::create(hwnd, self.hinstance, EditKind::Content)?,
            status: EditControl::create(hwnd, self.hinstance, EditKind::Status)?,
        };
        self.controls.set(Some(controls));
        self.apply_font()
    }

    /// (Re)build the control font for the current DPI and hand it to both
    /// controls.  The old font is released only after the swap.
    fn apply_font(&self) -> Result<()> {
        let Some(controls) = self.controls.get() else {
            return Ok(());
        };
        let (dpi, height) = {
            let app = self.app.borrow();
            (app.dpi(), app.font_height())
        };

        let font = ControlFont::for_dpi(dpi, height)?;
        controls.content.set_font(&font);
        controls.status.set_font(&font);
        let previous = self.font.replace(Some(font));
        drop(previous);
        Ok(())
    }

    fn center_on_monitor(&self) {
        let hwnd = self.hwnd.get();
        let mut window_rect = RECT::default();

        // SAFETY: hwnd is valid; window_rect and mi are correctly sized
        // out-parameters.  Failures leave the window where it is.
        unsafe {
            if GetWindowRect(hwnd, &mut window_rect).is_err() {
                return;
            }
            let monitor = MonitorFromWindow(hwnd, MONITOR_DEFAULTTONULL);
            if monitor.is_invalid() {
                return;
            }
            let mut mi = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !GetMonitorInfoW(monitor, &mut mi).as_bool() {
                return;
            }

            let centered = layout::center_in(from_rect(&window_rect), from_rect(&mi.rcWork));
            let _ = SetWindowPos(
                hwnd,
                None,
                centered.left,
                centered.top,
                0,
                0,
                SWP_ASYNCWINDOWPOS | SWP_NOACTIVATE | SWP_NOOWNERZORDER | SWP_NOSIZE,
            );
        }
    }

    // ── Layout ────────────────────────────────────────────────────────────────

    fn layout_subcontrols(&self) {
        let Some(controls) = self.controls.get() else {
            return;
        };
        let mut client = RECT::default();
        // SAFETY: hwnd is valid; client is a correctly sized out-parameter.
        if unsafe { GetClientRect(self.hwnd.get(), &mut client) }.is_err() {
            return;
        }

        let placed = self.app.borrow().layout(from_rect(&client));
        controls.content.move_to(placed.content);
        controls.status.move_to(placed.status);
    }

    // ── Event handlers ────────────────────────────────────────────────────────

    fn on_content_changed(&self) {
        let Some(controls) = self.controls.get() else {
            return;
        };
        let text = controls.content.text();
        let update = self.app.borrow().content_changed(&text);

        if let Some(status) = &update.status {
            controls.status.set_text(status);
        }
        self.set_title(&update.title);
    }

    fn on_dpi_changed(&self, new_dpi: u32, suggested: &RECT) {
        self.app.borrow_mut().set_dpi(new_dpi);
        if let Err(e) = self.apply_font() {
            log::warn!("keeping previous font after DPI change: {e}");
        }

        // SAFETY: hwnd is valid; the suggested rectangle comes from Windows.
        // The resulting WM_SIZE re-runs the layout at the new DPI.
        unsafe {
            let _ = SetWindowPos(
                self.hwnd.get(),
                None,
                suggested.left,
                suggested.top,
                suggested.right - suggested.left,
                suggested.bottom - suggested.top,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn on_save_content_command(&self) {
        let Some(controls) = self.controls.get() else {
            return;
        };
        let text = controls.content.text();
        let suggestion = content::suggest_file_name(&text);

        let path = match dialogs::show_save_dialog(self.hwnd.get(), &suggestion) {
            Ok(Some(path)) => path,
            Ok(None) => {
                log::debug!("save cancelled");
                return;
            }
            Err(e) => {
                self.report_save_error(&e);
                return;
            }
        };

        let saved = self.app.borrow().save(path, &text);
        if let Err(e) = saved {
            self.report_save_error(&e);
        }
    }

    fn report_save_error(&self, e: &ScratchpadError) {
        log::warn!("save failed: {e}");
        dialogs::show_error(self.hwnd.get(), "Save failed", &e.to_string());
    }

    fn set_title(&self, title: &str) {
        let title_wide = wide(title);
        // SAFETY: hwnd valid; title_wide is null-terminated and outlives the call.
        if let Err(e) = unsafe { SetWindowTextW(self.hwnd.get(), PCWSTR(title_wide.as_ptr())) } {
            log::warn!("SetWindowTextW on main window: {e}");
        }
    }

    // ── Key preview ───────────────────────────────────────────────────────────

    /// Inspect a message before it is translated and dispatched.
    ///
    /// Returns `true` if the message was handled and must not be dispatched.
    pub(crate) fn preview_message(&self, msg: &MSG) -> bool {
        let phase = match msg.message {
            WM_KEYDOWN => KeyPhase::Down,
            WM_KEYUP => KeyPhase::Up,
            _ => return false,
        };
        let Some(controls) = self.controls.get() else {
            return false;
        };

        // SAFETY: GetKeyState/GetFocus only read this thread's input state.
        let (ctrl, focused) = unsafe { (GetKeyState(VK_CONTROL.0 as i32) < 0, GetFocus()) };
        let focus = if focused == controls.content.hwnd() {
            Focus::Content
        } else if focused == controls.status.hwnd() {
            Focus::Status
        } else {
            Focus::Elsewhere
        };

        let event = KeyEvent { phase, key: msg.wParam.0 as u16, ctrl };
        let Some(action) = keys::preview(event, focus) else {
            return false;
        };
        log::trace!("key {:#04x} {phase:?} -> {action:?}", event.key);

        match action {
            KeyAction::Quit => {
                // SAFETY: posts WM_QUIT to this thread's queue.
                unsafe { PostQuitMessage(0) };
            }
            KeyAction::FocusStatus => {
                controls.status.focus();
                // Read-only, so selecting everything is harmless.
                controls.status.select_all();
            }
            KeyAction::FocusContent => controls.content.focus(),
            KeyAction::Save => self.on_save_content_command(),
            KeyAction::SelectAll => edit::select_all_in(focused),
            KeyAction::Swallow => {}
        }
        true
    }
}

// ── Message handling ──────────────────────────────────────────────────────────

impl MessageHandler for ScratchpadWindow {
    fn process_message(&self, window: WindowId, message: Message) -> isize {
        let hwnd = hwnd_of(window);

        match message.id {
            WM_CLOSE => {
                // SAFETY: posts WM_QUIT; the loop in `window::run` then
                // destroys this window.
                unsafe { PostQuitMessage(0) };
                return MESSAGE_PROCESSED;
            }

            WM_SIZING => {
                // SAFETY: for WM_SIZING, lParam points to a RECT owned by
                // Windows that the handler may modify for this call only.
                let proposed = unsafe { &mut *(message.lparam as *mut RECT) };
                let clamped = self.app.borrow().clamp_sizing(from_rect(proposed));
                proposed.right = clamped.right;
                proposed.bottom = clamped.bottom;
                return 1;
            }

            WM_SIZE => {
                self.layout_subcontrols();
                return MESSAGE_PROCESSED;
            }

            WM_ACTIVATE => {
                if loword(message.wparam) != WA_INACTIVE {
                    if let Some(controls) = self.controls.get() {
                        controls.content.focus();
                        return MESSAGE_PROCESSED;
                    }
                }
            }

            WM_DPICHANGED => {
                let new_dpi = loword(message.wparam) as u32;
                // SAFETY: for WM_DPICHANGED, lParam points to a RECT with the
                // suggested window position, valid for this call.
                let suggested = unsafe { *(message.lparam as *const RECT) };
                self.on_dpi_changed(new_dpi, &suggested);
                return MESSAGE_PROCESSED;
            }

            WM_COMMAND => {
                if let Some(controls) = self.controls.get() {
                    let from_content = message.lparam == window_id(controls.content.hwnd()).0;
                    if from_content && hiword(message.wparam) == EN_UPDATE {
                        self.on_content_changed();
                        return MESSAGE_PROCESSED;
                    }
                }
            }

            WM_NCDESTROY => {
                if let Some(router) = self.router.upgrade() {
                    router.unbind(window);
                }
            }

            _ => {}
        }

        // Default processing for all unhandled messages.
        // SAFETY: hwnd and message parameters are valid: provided by Windows.
        unsafe { DefWindowProcW(hwnd, message.id, WPARAM(message.wparam), LPARAM(message.lparam)) }.0
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn from_rect(r: &RECT) -> Rect {
    Rect { left: r.left, top: r.top, right: r.right, bottom: r.bottom }
}

fn loword(v: usize) -> usize {
    v & 0xFFFF
}

fn hiword(v: usize) -> u16 {
    ((v >> 16) & 0xFFFF) as u16
}
