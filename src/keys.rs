// ── Keyboard shortcuts ────────────────────────────────────────────────────────
//
// Decides which key messages the main window intercepts before they reach the
// edit controls.  The message loop asks `preview` about every WM_KEYDOWN /
// WM_KEYUP; `Some(action)` means the message is consumed.

// Virtual-key codes (winuser.h).
pub(crate) const VK_TAB: u16 = 0x09;
pub(crate) const VK_ESCAPE: u16 = 0x1B;
pub(crate) const VK_A: u16 = 0x41;
pub(crate) const VK_S: u16 = 0x53;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyPhase {
    Down,
    Up,
}

/// One key message, reduced to what the shortcut table needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyEvent {
    pub(crate) phase: KeyPhase,
    pub(crate) key: u16,
    /// Control was held when the message was generated.
    pub(crate) ctrl: bool,
}

/// Which of our controls owns the keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Content,
    Status,
    Elsewhere,
}

/// What the main window does with an intercepted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Quit,
    /// Focus the status line and select all of it (it is read-only).
    FocusStatus,
    FocusContent,
    Save,
    SelectAll,
    /// Eat the message so the control does not act on it (e.g. the beep an
    /// edit control gives for Ctrl+S).
    Swallow,
}

/// The shortcut table.
///
/// | Key | Phase | Action |
/// |---|---|---|
/// | Esc | down | quit |
/// | Tab | down | toggle focus content ⇄ status |
/// | Ctrl+S | up / down | save / swallow |
/// | Ctrl+A | up / down | select all in focused control / swallow |
pub(crate) fn preview(event: KeyEvent, focus: Focus) -> Option<KeyAction> {
    use KeyPhase::{Down, Up};

    match (event.key, event.phase) {
        (VK_ESCAPE, Down) => return Some(KeyAction::Quit),
        (VK_TAB, Down) => match focus {
            Focus::Content => return Some(KeyAction::FocusStatus),
            Focus::Status => return Some(KeyAction::FocusContent),
            Focus::Elsewhere => {}
        },
        _ => {}
    }

    if !event.ctrl {
        return None;
    }
    match (event.key, event.phase) {
        (VK_S, Up) => Some(KeyAction::Save),
        (VK_A, Up) => Some(KeyAction::SelectAll),
        (VK_S | VK_A, Down) => Some(KeyAction::Swallow),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
