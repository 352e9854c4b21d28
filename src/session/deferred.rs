// ABOUTME: Work queued by command handlers to run once the current protocol step is over
// ABOUTME: Keeps the message sink from being called while session state is mid-update

use crate::session::traits::MessageSink;
use std::collections::VecDeque;

/// A unit of deferred work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Deliver a decoded heat pump message to the sink
    Notify(String),
}

/// FIFO of deferred work, drained between protocol steps
#[derive(Debug, Default)]
pub struct DeferredQueue {
    pending: VecDeque<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, work: Deferred) {
        self.pending.push_back(work);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run everything queued so far, oldest first
    pub fn drain(&mut self, sink: &mut dyn MessageSink) {
        while let Some(work) = self.pending.pop_front() {
            match work {
                Deferred::Notify(message) => sink.on_message(message),
            }
        }
    }
}
