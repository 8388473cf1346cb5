//! Synchronous observer registry for cover events.
//!
//! Handlers are invoked on the thread that performed the mutation, after the
//! cover point's lock has been released, in the order the events were emitted.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use holdfast_core::events::{CoverEvent, CoverEventKind};

type Handler = Arc<dyn Fn(&CoverEvent) + Send + Sync>;

/// Dispatches [`CoverEvent`]s to registered handlers.
#[derive(Default)]
pub struct CoverEventBus {
    handlers: RwLock<Vec<(Option<CoverEventKind>, Handler)>>,
}

impl CoverEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe<F>(&self, kind: CoverEventKind, handler: F)
    where
        F: Fn(&CoverEvent) + Send + Sync + 'static,
    {
        self.handlers.write().push((Some(kind), Arc::new(handler)));
    }

    /// Register a handler for every event kind.
    pub fn subscribe_all<F>(&self, handler: F)
    where
        F: Fn(&CoverEvent) + Send + Sync + 'static,
    {
        self.handlers.write().push((None, Arc::new(handler)));
    }

    /// Register a recorder that buffers every event until drained.
    pub fn recorder(&self) -> EventRecorder {
        let recorder = EventRecorder::default();
        let sink = recorder.clone();
        self.subscribe_all(move |event| sink.events.lock().push(event.clone()));
        recorder
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Deliver events in order. Handlers may subscribe further handlers;
    /// those only see later publishes.
    pub fn publish(&self, events: &[CoverEvent]) {
        if events.is_empty() {
            return;
        }
        let handlers: Vec<(Option<CoverEventKind>, Handler)> = self.handlers.read().clone();
        for event in events {
            let kind = event.kind();
            for (filter, handler) in &handlers {
                if filter.is_none_or(|k| k == kind) {
                    handler(event);
                }
            }
        }
    }
}

/// Buffer of events captured by [`CoverEventBus::recorder`].
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<CoverEvent>>>,
}

impl EventRecorder {
    /// Take every event recorded so far.
    pub fn drain(&self) -> Vec<CoverEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}
