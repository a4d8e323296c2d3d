//! Single-flight slot shared by callers waiting on the same computation.

use crate::candidate::CandidateSet;
use crate::error::Result;
use parking_lot::{Condvar, Mutex};

/// Holds the outcome of one in-progress computation.
///
/// The leader calls [`Flight::complete`] exactly once; followers block in
/// [`Flight::wait`] until then and all receive a clone of the same outcome.
pub(crate) struct Flight<L> {
    outcome: Mutex<Option<Result<CandidateSet<L>>>>,
    done: Condvar,
}

impl<L: Clone> Flight<L> {
    pub(crate) fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    pub(crate) fn complete(&self, outcome: Result<CandidateSet<L>>) {
        let mut slot = self.outcome.lock();
        *slot = Some(outcome);
        self.done.notify_all();
    }

    pub(crate) fn wait(&self) -> Result<CandidateSet<L>> {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.done.wait(&mut slot);
        }
    }
}
