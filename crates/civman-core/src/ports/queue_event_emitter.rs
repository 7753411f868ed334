//! Queue event emitter port.
//!
//! Lets the queue publish [`QueueEvent`]s without knowing how they are
//! delivered (broadcast channel, terminal renderer, test recorder).

use crate::download::QueueEvent;

/// Port for emitting queue events.
///
/// Implementations must not block.
pub trait QueueEventEmitterPort: Send + Sync {
    /// Emit a queue event.
    fn emit(&self, event: QueueEvent);
}

/// An emitter that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopQueueEmitter;

impl NoopQueueEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl QueueEventEmitterPort for NoopQueueEmitter {
    fn emit(&self, _event: QueueEvent) {
        // Intentionally do nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_noop_emitter() {
        let emitter: Arc<dyn QueueEventEmitterPort> = Arc::new(NoopQueueEmitter::new());
        emitter.emit(QueueEvent::queue_changed(0, 0));
    }
}
