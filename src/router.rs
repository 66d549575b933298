// ── Window message router ─────────────────────────────────────────────────────
//
// Maps window identifiers to the handler that owns them.  Win32 hands every
// window of a class to one `extern "system"` procedure with no context
// pointer, so the procedure asks the router which handler a message belongs
// to.
//
// A handler cannot be registered under an identifier that does not exist yet,
// and Win32 sends several messages (WM_GETMINMAXINFO, WM_NCCREATE, …) from
// inside `CreateWindowExW` before it returns the HWND.  The router therefore
// keeps a single pending slot: the next unknown identifier that receives a
// message is bound to the pending handler.
//
// No `unsafe` and no Win32 types here; the platform layer converts HWND/WPARAM/
// LPARAM into `WindowId`/`Message` at the boundary.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use thiserror::Error;

// ── Identifiers & messages ────────────────────────────────────────────────────

/// Opaque identifier of one window, assigned by the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WindowId(pub(crate) isize);

/// A raw window message, in toolkit-neutral form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) id: u32,
    pub(crate) wparam: usize,
    pub(crate) lparam: isize,
}

impl Message {
    pub(crate) fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self { id, wparam, lparam }
    }
}

/// Anything that owns windows and interprets their messages.
///
/// Takes `&self`: the toolkit re-enters the handler while it is still running
/// (e.g. `SetWindowTextW` sends `WM_SETTEXT` synchronously), so implementors
/// keep their mutable state in `Cell`/`RefCell` and never hold a borrow across
/// a toolkit call.
pub(crate) trait MessageHandler {
    fn process_message(&self, window: WindowId, message: Message) -> isize;
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Protocol misuse.  All of these are programming errors, not user errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum RouterError {
    #[error("a handler is already waiting to be bound to the next new window")]
    BindPending,

    #[error("message {message:#06x} arrived for unknown window {window:#x} and no handler is pending")]
    UnboundWindow { window: isize, message: u32 },

    #[error("a window router is already installed on this thread")]
    AlreadyInstalled,

    #[error("message {message:#06x} arrived for window {window:#x} but no window router is installed")]
    NotInstalled { window: isize, message: u32 },
}

// ── Installed router slot ─────────────────────────────────────────────────────

thread_local! {
    /// The router consulted by the Win32 window procedure.  Weak so that the
    /// owner (`main`'s `run`) decides the router's lifetime.
    static INSTALLED: RefCell<Weak<WindowRouter>> = RefCell::new(Weak::new());
}

// ── WindowRouter ──────────────────────────────────────────────────────────────

pub(crate) struct WindowRouter {
    /// Handler waiting for the next unknown window.
    pending: RefCell<Option<Rc<dyn MessageHandler>>>,
    handlers: RefCell<HashMap<WindowId, Rc<dyn MessageHandler>>>,
    /// `true` only for the instance created by `install`.
    installed: bool,
}

impl WindowRouter {
    /// A free-standing router, not reachable from the window procedure.
    pub(crate) fn new() -> Self {
        Self {
            pending: RefCell::new(None),
            handlers: RefCell::new(HashMap::new()),
            installed: false,
        }
    }

    /// Create the router that the window procedure dispatches through.
    ///
    /// Only one may be alive per thread; dropping it uninstalls it.
    pub(crate) fn install() -> Result<Rc<Self>, RouterError> {
        INSTALLED.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.upgrade().is_some() {
                return Err(RouterError::AlreadyInstalled);
            }
            let mut router = Self::new();
            router.installed = true;
            let router = Rc::new(router);
            *slot = Rc::downgrade(&router);
            log::debug!("window router installed");
            Ok(router)
        })
    }

    /// The currently installed router, if any.
    pub(crate) fn installed() -> Option<Rc<Self>> {
        INSTALLED.with(|slot| slot.borrow().upgrade())
    }

    /// Bind `handler` to whichever unknown window receives a message next.
    pub(crate) fn bind_to_next_new_window(
        &self,
        handler: Rc<dyn MessageHandler>,
    ) -> Result<(), RouterError> {
        let mut pending = self.pending.borrow_mut();
        if pending.is_some() {
            return Err(RouterError::BindPending);
        }
        *pending = Some(handler);
        Ok(())
    }

    /// Forward `message` to the handler owning `window`, binding the pending
    /// handler first if `window` has not been seen before.
    pub(crate) fn route(&self, window: WindowId, message: Message) -> Result<isize, RouterError> {
        let handler = self.handler_for(window, message.id)?;
        // No router borrow is held here, so the handler may re-enter `route`.
        Ok(handler.process_message(window, message))
    }

    /// Forget `window`.  No-op if it was never bound.
    pub(crate) fn unbind(&self, window: WindowId) {
        if self.handlers.borrow_mut().remove(&window).is_some() {
            log::debug!("unbound window {:#x}", window.0);
        }
    }

    /// Reserve the pending slot, run `create`, and make sure the identifier it
    /// returns ends up bound to `handler`.
    ///
    /// Callers never observe the half-registered state: on success the window
    /// is bound (whether or not `create` already routed a message to it), and
    /// on failure the pending slot is empty again.
    pub(crate) fn create_bound<F>(
        &self,
        handler: Rc<dyn MessageHandler>,
        create: F,
    ) -> crate::error::Result<WindowId>
    where
        F: FnOnce() -> crate::error::Result<WindowId>,
    {
        self.bind_to_next_new_window(handler)?;
        let created = create();
        let unclaimed = self.pending.borrow_mut().take();
        let window = created?;
        if let Some(handler) = unclaimed {
            log::trace!("window {:#x} created without messages; binding now", window.0);
            self.handlers.borrow_mut().entry(window).or_insert(handler);
        }
        Ok(window)
    }

    pub(crate) fn is_bound(&self, window: WindowId) -> bool {
        self.handlers.borrow().contains_key(&window)
    }

    pub(crate) fn has_pending_bind(&self) -> bool {
        self.pending.borrow().is_some()
    }

    fn handler_for(
        &self,
        window: WindowId,
        message: u32,
    ) -> Result<Rc<dyn MessageHandler>, RouterError> {
        if let Some(handler) = self.handlers.borrow().get(&window) {
            return Ok(Rc::clone(handler));
        }

        let handler = self
            .pending
            .borrow_mut()
            .take()
            .ok_or(RouterError::UnboundWindow { window: window.0, message })?;
        log::debug!("bound window {:#x} (first message {message:#06x})", window.0);
        self.handlers.borrow_mut().insert(window, Rc::clone(&handler));
        Ok(handler)
    }
}

impl Drop for WindowRouter {
    fn drop(&mut self) {
        if self.installed {
            INSTALLED.with(|slot| *slot.borrow_mut() = Weak::new());
            log::debug!("window router uninstalled");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::ScratchpadError;

    const WM_FIRST: u32 = 0x0024;
    const WM_SECOND: u32 = 0x0081;

    /// Records every message it sees and answers with a fixed tag.
    struct Recorder {
        tag: isize,
        seen: RefCell<Vec<(WindowId, u32)>>,
    }

    impl Recorder {
        fn new(tag: isize) -> Rc<Self> {
            Rc::new(Self { tag, seen: RefCell::new(Vec::new()) })
        }
    }

    impl MessageHandler for Recorder {
        fn process_message(&self, window: WindowId, message: Message) -> isize {
            self.seen.borrow_mut().push((window, message.id));
            self.tag
        }
    }

    fn msg(id: u32) -> Message {
        Message::new(id, 0, 0)
    }

    #[test]
    fn pending_bind_attaches_to_first_unknown_window() {
        let router = WindowRouter::new();
        let rec = Recorder::new(7);
        router.bind_to_next_new_window(rec.clone()).unwrap();

        assert_eq!(router.route(WindowId(100), msg(WM_FIRST)), Ok(7));
        assert!(router.is_bound(WindowId(100)));
        assert!(!router.has_pending_bind());
        assert_eq!(*rec.seen.borrow(), vec![(WindowId(100), WM_FIRST)]);
    }

    #[test]
    fn bound_window_keeps_its_handler_without_new_bind() {
        let router = WindowRouter::new();
        let rec = Recorder::new(1);
        router.bind_to_next_new_window(rec.clone()).unwrap();
        router.route(WindowId(5), msg(WM_FIRST)).unwrap();

        // Nothing pending any more, yet the known window still routes.
        assert_eq!(router.route(WindowId(5), msg(WM_SECOND)), Ok(1));
        assert_eq!(rec.seen.borrow().len(), 2);
    }

    #[test]
    fn second_bind_while_pending_is_rejected() {
        let router = WindowRouter::new();
        router.bind_to_next_new_window(Recorder::new(1)).unwrap();
        assert_eq!(
            router.bind_to_next_new_window(Recorder::new(2)),
            Err(RouterError::BindPending)
        );
    }

    #[test]
    fn bind_is_allowed_again_after_pending_is_consumed() {
        let router = WindowRouter::new();
        let a = Recorder::new(1);
        let b = Recorder::new(2);
        router.bind_to_next_new_window(a).unwrap();
        router.route(WindowId(1), msg(WM_FIRST)).unwrap();
        router.bind_to_next_new_window(b).unwrap();

        assert_eq!(router.route(WindowId(2), msg(WM_FIRST)), Ok(2));
        assert_eq!(router.route(WindowId(1), msg(WM_FIRST)), Ok(1));
    }

    #[test]
    fn unknown_window_without_pending_bind_is_an_error() {
        let router = WindowRouter::new();
        assert_eq!(
            router.route(WindowId(0x42), msg(WM_FIRST)),
            Err(RouterError::UnboundWindow { window: 0x42, message: WM_FIRST })
        );
    }

    #[test]
    fn unbind_removes_mapping_and_tolerates_unknown_ids() {
        let router = WindowRouter::new();
        router.bind_to_next_new_window(Recorder::new(1)).unwrap();
        router.route(WindowId(9), msg(WM_FIRST)).unwrap();

        router.unbind(WindowId(9));
        router.unbind(WindowId(9));
        router.unbind(WindowId(1234));
        assert!(!router.is_bound(WindowId(9)));
        assert!(router.route(WindowId(9), msg(WM_FIRST)).is_err());
    }

    #[test]
    fn handler_may_reenter_the_router() {
        struct Nested {
            router: Weak<WindowRouter>,
            depth: Cell<u32>,
        }
        impl MessageHandler for Nested {
            fn process_message(&self, window: WindowId, message: Message) -> isize {
                self.depth.set(self.depth.get() + 1);
                if message.id == WM_FIRST {
                    let router = self.router.upgrade().unwrap();
                    return router.route(window, msg(WM_SECOND)).unwrap() + 1;
                }
                10
            }
        }

        let router = Rc::new(WindowRouter::new());
        let handler = Rc::new(Nested { router: Rc::downgrade(&router), depth: Cell::new(0) });
        router.bind_to_next_new_window(handler.clone()).unwrap();

        assert_eq!(router.route(WindowId(3), msg(WM_FIRST)), Ok(11));
        assert_eq!(handler.depth.get(), 2);
    }

    #[test]
    fn create_bound_binds_window_that_routed_during_creation() {
        let router = WindowRouter::new();
        let rec = Recorder::new(4);
        let id = router
            .create_bound(rec.clone(), || {
                router.route(WindowId(77), msg(WM_FIRST)).unwrap();
                Ok(WindowId(77))
            })
            .unwrap();

        assert_eq!(id, WindowId(77));
        assert!(router.is_bound(id));
        assert!(!router.has_pending_bind());
        assert_eq!(rec.seen.borrow().len(), 1);
    }

    #[test]
    fn create_bound_binds_window_that_saw_no_messages() {
        let router = WindowRouter::new();
        let id = router.create_bound(Recorder::new(3), || Ok(WindowId(8))).unwrap();

        assert!(router.is_bound(id));
        assert!(!router.has_pending_bind());
        assert_eq!(router.route(id, msg(WM_FIRST)), Ok(3));
    }

    #[test]
    fn create_bound_failure_leaves_nothing_pending() {
        let router = WindowRouter::new();
        let result = router.create_bound(Recorder::new(1), || {
            Err(ScratchpadError::Win32 { function: "CreateWindowExW", code: 8 })
        });

        assert!(result.is_err());
        assert!(!router.has_pending_bind());
        assert!(router.bind_to_next_new_window(Recorder::new(2)).is_ok());
    }

    #[test]
    fn create_bound_rejects_when_bind_already_pending() {
        let router = WindowRouter::new();
        router.bind_to_next_new_window(Recorder::new(1)).unwrap();
        let result = router.create_bound(Recorder::new(2), || Ok(WindowId(1)));
        assert!(matches!(
            result,
            Err(ScratchpadError::Router(RouterError::BindPending))
        ));
    }

    #[test]
    fn only_one_router_installed_at_a_time() {
        let first = WindowRouter::install().unwrap();
        assert!(matches!(WindowRouter::install(), Err(RouterError::AlreadyInstalled)));
        assert!(Rc::ptr_eq(&WindowRouter::installed().unwrap(), &first));

        // A free-standing router does not disturb the installed one.
        drop(WindowRouter::new());
        assert!(WindowRouter::installed().is_some());

        drop(first);
        assert!(WindowRouter::installed().is_none());
        let again = WindowRouter::install().unwrap();
        drop(again);
    }

    #[test]
    fn installed_router_starts_empty_and_routes() {
        let router = WindowRouter::install().unwrap();
        assert!(!router.has_pending_bind());
        assert!(!router.is_bound(WindowId(7)));

        let handler = Recorder::new(5);
        router.bind_to_next_new_window(handler.clone()).unwrap();
        assert_eq!(router.route(WindowId(7), msg(WM_FIRST)).unwrap(), 5);
        assert!(router.is_bound(WindowId(7)));
        drop(router);
    }
}
