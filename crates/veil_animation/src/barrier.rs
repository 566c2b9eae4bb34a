//! Completion barrier
//!
//! Gates a teardown action behind several independent animations. Each
//! participant calls [`CompletionBarrier::arrive`] when it finishes; the action
//! runs once the expected number of arrivals is reached, after which the
//! counter starts over.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared arrival counter with a release action
#[derive(Clone)]
pub struct CompletionBarrier {
    inner: Rc<BarrierInner>,
}

struct BarrierInner {
    expected: u32,
    arrived: Cell<u32>,
    releases: Cell<u32>,
    on_release: RefCell<Box<dyn FnMut()>>,
}

impl CompletionBarrier {
    /// Barrier that releases after `expected` arrivals (at least one)
    pub fn new<F: FnMut() + 'static>(expected: u32, on_release: F) -> Self {
        Self {
            inner: Rc::new(BarrierInner {
                expected: expected.max(1),
                arrived: Cell::new(0),
                releases: Cell::new(0),
                on_release: RefCell::new(Box::new(on_release)),
            }),
        }
    }

    /// Record one completion. Returns `true` if this arrival released the
    /// barrier.
    pub fn arrive(&self) -> bool {
        let arrived = self.inner.arrived.get() + 1;
        if arrived < self.inner.expected {
            self.inner.arrived.set(arrived);
            return false;
        }

        self.inner.arrived.set(0);
        self.inner.releases.set(self.inner.releases.get() + 1);
        tracing::debug!("completion barrier released after {} arrivals", arrived);
        let mut release = self.inner.on_release.borrow_mut();
        (*release)();
        true
    }

    /// Arrivals recorded since the last release
    pub fn arrived(&self) -> u32 {
        self.inner.arrived.get()
    }

    pub fn expected(&self) -> u32 {
        self.inner.expected
    }

    /// How many times the barrier has released
    pub fn releases(&self) -> u32 {
        self.inner.releases.get()
    }
}

impl std::fmt::Debug for CompletionBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionBarrier")
            .field("expected", &self.inner.expected)
            .field("arrived", &self.inner.arrived.get())
            .field("releases", &self.inner.releases.get())
            .finish()
    }
}
