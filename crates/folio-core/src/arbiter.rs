//! Shared navigation flags and the passive-suppression check
//!
//! One `ModeArbiter` exists per page session. The navigation controller and
//! the progress mapper each hold a clone; UI layers observe changes through
//! [`ModeArbiter::subscribe`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub is_animating: bool,
    pub is_auto_scrolling: bool,
    pub is_smart_scrolling: bool,
    pub current_page: usize,
}

impl SessionFlags {
    /// No navigation owns the viewport
    pub fn is_idle(&self) -> bool {
        !self.is_animating && !self.is_auto_scrolling && !self.is_smart_scrolling
    }
}

/// Which flags a navigation raises for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationLock {
    pub animating: bool,
    pub auto_scrolling: bool,
    pub smart_scrolling: bool,
}

impl NavigationLock {
    pub const PAGE: Self = Self {
        animating: true,
        auto_scrolling: false,
        smart_scrolling: false,
    };
    pub const AUTO: Self = Self {
        animating: true,
        auto_scrolling: true,
        smart_scrolling: false,
    };
    pub const SMART: Self = Self {
        animating: true,
        auto_scrolling: true,
        smart_scrolling: true,
    };
}

#[derive(Debug, Clone)]
pub struct ModeArbiter {
    tx: Arc<watch::Sender<SessionFlags>>,
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeArbiter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionFlags::default());
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current flags
    pub fn flags(&self) -> SessionFlags {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionFlags> {
        self.tx.subscribe()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.tx.borrow().is_animating
    }

    #[inline]
    pub fn is_auto_scrolling(&self) -> bool {
        self.tx.borrow().is_auto_scrolling
    }

    #[inline]
    pub fn is_smart_scrolling(&self) -> bool {
        self.tx.borrow().is_smart_scrolling
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.tx.borrow().current_page
    }

    /// Passive ticks are skipped while a smart navigation owns the viewport
    #[inline]
    pub fn passive_suppressed(&self) -> bool {
        self.is_smart_scrolling()
    }

    /// Passive path: record the page derived from progress
    pub fn set_current_page(&self, page: usize) {
        self.tx.send_if_modified(|flags| {
            if flags.current_page == page {
                return false;
            }
            trace!(from = flags.current_page, to = page, "Current page changed");
            flags.current_page = page;
            true
        });
    }

    /// Raise every flag of `lock` in one update
    pub fn begin(&self, lock: NavigationLock) {
        self.tx.send_modify(|flags| {
            flags.is_animating = lock.animating;
            flags.is_auto_scrolling = lock.auto_scrolling;
            flags.is_smart_scrolling = lock.smart_scrolling;
        });
    }

    /// Clear every navigation flag in one update and settle on `page`
    pub fn release(&self, page: usize) {
        self.tx.send_modify(|flags| {
            flags.is_animating = false;
            flags.is_auto_scrolling = false;
            flags.is_smart_scrolling = false;
            flags.current_page = page;
        });
    }

    /// Back to the initial state (unmount)
    pub fn reset(&self) {
        self.tx.send_replace(SessionFlags::default());
    }
}
