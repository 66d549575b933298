// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Off Windows only the platform-neutral core is built, for its tests.
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod config;
mod content;
mod error;
mod keys;
mod layout;
mod platform;
mod router;
mod stats;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(windows)]
    if let Err(e) = platform::win32::window::run() {
        // Startup failed before or during the message loop.
        // Show a modal error dialog: the only safe output path in a GUI app.
        log::error!("{e}");
        platform::win32::dialogs::show_error_dialog(&e.to_string());
        std::process::exit(1);
    }

    #[cfg(not(windows))]
    {
        log::error!("{} only runs on Windows", content::APP_NAME);
        std::process::exit(1);
    }
}
