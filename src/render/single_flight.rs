use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot guard: at most one holder at a time, and a busy slot turns new attempts away
/// instead of queueing them.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot if it is free. The slot is released when the permit drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<FlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlightPermit {
                guard: Arc::clone(self),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of holding a [`SingleFlight`] slot; movable into a background task.
#[derive(Debug)]
pub struct FlightPermit {
    guard: Arc<SingleFlight>,
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/single_flight.rs"]
mod tests;
