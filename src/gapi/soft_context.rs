use crate::gapi::context::{ContextHandle, NativeContext};
use crate::gapi::errors::ErrorCode;
use log::trace;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How many codes a [`SoftContext`] keeps before it starts dropping new ones.
pub const SOFT_QUEUE_CAPACITY: usize = 8;

static HANDLES_ISSUED: AtomicUsize = AtomicUsize::new(0);

/// # Software Context
///
/// An in-process stand-in for a native context: it owns a bounded FIFO error queue and
/// behaves like the native error query on it. Used to drive validation scopes without a
/// driver, in the demo binary and in tests.
///
/// Every instance gets a fresh, never-reused handle.
#[derive(Debug)]
pub struct SoftContext {
    handle: ContextHandle,
    error_checking: bool,
    queue: Mutex<VecDeque<ErrorCode>>,
    polls: AtomicUsize,
}

impl SoftContext {
    pub fn new(error_checking: bool) -> Self {
        let issued = HANDLES_ISSUED.fetch_add(1, Ordering::Relaxed);
        Self {
            handle: ContextHandle::new(NonZeroUsize::MIN.saturating_add(issued)),
            error_checking,
            queue: Mutex::new(VecDeque::with_capacity(SOFT_QUEUE_CAPACITY)),
            polls: AtomicUsize::new(0),
        }
    }

    /// Queues a code, as a failing native call would.
    ///
    /// The sentinel is never queued, and codes beyond [`SOFT_QUEUE_CAPACITY`] are lost.
    pub fn raise(&self, code: ErrorCode) {
        if code.is_sentinel() {
            return;
        }
        let mut queue = self.queue.lock();
        if queue.len() < SOFT_QUEUE_CAPACITY {
            queue.push_back(code);
        } else {
            trace!("{}: error queue full, dropping {}", self.handle, code);
        }
    }

    /// Number of codes waiting to be polled.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// How many times the error queue has been polled so far.
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::Relaxed)
    }
}

impl NativeContext for SoftContext {
    fn handle(&self) -> ContextHandle {
        self.handle
    }

    fn error_checking(&self) -> bool {
        self.error_checking
    }

    fn poll_next_error(&self) -> ErrorCode {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.queue.lock().pop_front().unwrap_or(ErrorCode::NoError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn polls_in_fifo_order_then_sentinel() {
        let ctx = SoftContext::new(true);
        ctx.raise(ErrorCode::InvalidEnum);
        ctx.raise(ErrorCode::OutOfMemory);

        assert_eq!(ctx.poll_next_error(), ErrorCode::InvalidEnum);
        assert_eq!(ctx.poll_next_error(), ErrorCode::OutOfMemory);
        assert_eq!(ctx.poll_next_error(), ErrorCode::NoError);
        assert_eq!(ctx.poll_next_error(), ErrorCode::NoError);
        assert_eq!(ctx.polls(), 4);
    }

    #[test]
    fn queue_is_bounded() {
        let ctx = SoftContext::new(true);
        for _ in 0..SOFT_QUEUE_CAPACITY + 3 {
            ctx.raise(ErrorCode::InvalidValue);
        }
        ctx.raise(ErrorCode::NoError);
        assert_eq!(ctx.pending(), SOFT_QUEUE_CAPACITY);
    }

    #[test]
    fn handles_are_unique() {
        let a = SoftContext::new(true);
        let b = SoftContext::new(false);
        assert_ne!(a.handle(), b.handle());
    }
}
