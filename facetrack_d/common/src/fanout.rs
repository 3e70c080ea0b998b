use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::Result;
use log::error;

use crate::TrackingResult;

pub type ResultListener = Box<dyn FnMut(&TrackingResult) -> Result<()> + Send>;

/// Handle returned on registration. Identifies the listener for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Synchronous delivery of each result to every registered listener.
///
/// Ids are handed out in increasing order, so iterating the map visits
/// listeners in registration order.
#[derive(Default)]
pub struct ResultFanout {
    listeners: BTreeMap<ListenerId, ResultListener>,
    next_id: u64,
}

impl ResultFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: ResultListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Returns whether the listener was registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Deliver `result` to every listener. A listener that errors or panics
    /// is logged and skipped; the rest still run. Returns the failure count.
    pub fn deliver(&mut self, result: &TrackingResult) -> usize {
        let mut failures = 0;
        for (id, listener) in self.listeners.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| listener(result))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    error!(
                        "Result listener {:?} failed on frame {}: {}",
                        id, result.frame_id, e
                    );
                }
                Err(_) => {
                    failures += 1;
                    error!(
                        "Result listener {:?} panicked on frame {}",
                        id, result.frame_id
                    );
                }
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ResultFanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultFanout")
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
