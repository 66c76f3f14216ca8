//! Mock renderer surface for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::playback::{CompletionSignal, RendererSurface, UnitBinding, UnitId};

/// A recorded surface call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Attached(UnitId),
    /// Attach returned false.
    Refused(UnitId),
    Started(UnitId),
    Detached(UnitId),
}

#[derive(Default)]
struct Inner {
    attached: Option<UnitId>,
    bindings: HashMap<UnitId, BindingInfo>,
    signals: HashMap<UnitId, CompletionSignal>,
    events: Vec<SurfaceEvent>,
    attach_count: usize,
    busy_refusals: usize,
}

/// What the surface saw of a binding, minus the signal.
#[derive(Debug, Clone)]
pub struct BindingInfo {
    pub clips: usize,
    pub decode_gamma: Option<String>,
    pub has_completion: bool,
}

/// Mock implementation of the RendererSurface trait.
///
/// Provides controllable behavior for testing:
/// - Record attach/start/detach calls
/// - Simulate a missing device or refused attaches
/// - Deliver completion on demand, or as soon as a unit starts
///
/// # Example
///
/// ```rust,ignore
/// use loopstage_core::testing::MockSurface;
///
/// let surface = Arc::new(MockSurface::new());
/// // ... controller attaches and starts a unit ...
/// let unit = surface.attached().unwrap();
/// assert!(surface.complete(unit));
/// ```
pub struct MockSurface {
    supported: AtomicBool,
    refuse: AtomicBool,
    auto_complete: AtomicBool,
    inner: Mutex<Inner>,
}

impl Default for MockSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            supported: AtomicBool::new(true),
            refuse: AtomicBool::new(false),
            auto_complete: AtomicBool::new(false),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Report whether a device exists.
    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    /// Make every attach fail.
    pub fn refuse_attach(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Deliver completion as soon as a unit is started.
    pub fn auto_complete(&self, enabled: bool) {
        self.auto_complete.store(enabled, Ordering::SeqCst);
    }

    /// Deliver the completion signal of `unit`. Returns false if there is no
    /// signal left to deliver or the hook did not run.
    pub fn complete(&self, unit: UnitId) -> bool {
        // Hook runs without the lock held.
        match self.take_signal(unit) {
            Some(signal) => signal.notify(),
            None => false,
        }
    }

    /// Take the completion signal handed over on attach.
    pub fn take_signal(&self, unit: UnitId) -> Option<CompletionSignal> {
        self.lock().signals.remove(&unit)
    }

    pub fn attached(&self) -> Option<UnitId> {
        self.lock().attached
    }

    pub fn binding(&self, unit: UnitId) -> Option<BindingInfo> {
        self.lock().bindings.get(&unit).cloned()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().events.clone()
    }

    /// Successful attaches.
    pub fn attach_count(&self) -> usize {
        self.lock().attach_count
    }

    /// Attaches refused because another unit was still attached.
    pub fn busy_refusals(&self) -> usize {
        self.lock().busy_refusals
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RendererSurface for MockSurface {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    fn attach(&self, binding: UnitBinding) -> bool {
        let mut inner = self.lock();
        let unit = binding.unit;

        if !self.is_supported() || self.refuse.load(Ordering::SeqCst) {
            inner.events.push(SurfaceEvent::Refused(unit));
            return false;
        }
        if inner.attached.is_some() {
            inner.busy_refusals += 1;
            inner.events.push(SurfaceEvent::Refused(unit));
            return false;
        }

        inner.bindings.insert(
            unit,
            BindingInfo {
                clips: binding.clips.len(),
                decode_gamma: binding.decode_gamma.clone(),
                has_completion: binding.completion.is_some(),
            },
        );
        if let Some(signal) = binding.completion {
            inner.signals.insert(unit, signal);
        }
        inner.attached = Some(unit);
        inner.attach_count += 1;
        inner.events.push(SurfaceEvent::Attached(unit));
        true
    }

    fn start(&self, unit: UnitId) {
        self.lock().events.push(SurfaceEvent::Started(unit));
        if self.auto_complete.load(Ordering::SeqCst) {
            self.complete(unit);
        }
    }

    fn detach(&self, unit: UnitId) {
        let mut inner = self.lock();
        if inner.attached != Some(unit) {
            return;
        }
        inner.attached = None;
        inner.signals.remove(&unit);
        inner.events.push(SurfaceEvent::Detached(unit));
    }
}
