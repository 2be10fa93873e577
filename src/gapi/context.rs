use crate::gapi::errors::ErrorCode;
use std::fmt;
use std::num::NonZeroUsize;

/// Opaque identity of a native graphics context.
///
/// Only ever used as a registry key: this layer never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(NonZeroUsize);

impl ContextHandle {
    pub const fn new(raw: NonZeroUsize) -> Self {
        Self(raw)
    }

    /// Wraps a raw native handle. A null (zero) handle is `None`.
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    pub fn raw(&self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx@{:#x}", self.raw())
    }
}

/// # Native Context
///
/// The capabilities a validation scope needs from a live native context.
/// Creation and destruction of the context happen elsewhere.
///
/// # Raw polling
///
/// [`NativeContext::poll_next_error`] must call the native error query directly.
/// Wrapping it in a [`crate::ValidationScope`] would recurse forever, since asking for the
/// error state is itself a native call that could be checked.
pub trait NativeContext {
    fn handle(&self) -> ContextHandle;

    /// Per-context switch for error checking, e.g. set for debug contexts only.
    fn error_checking(&self) -> bool;

    /// Retrieves and clears one pending code. Returns [`ErrorCode::NoError`] once the queue is empty.
    fn poll_next_error(&self) -> ErrorCode;
}

impl<C: NativeContext + ?Sized> NativeContext for &C {
    fn handle(&self) -> ContextHandle {
        (**self).handle()
    }

    fn error_checking(&self) -> bool {
        (**self).error_checking()
    }

    fn poll_next_error(&self) -> ErrorCode {
        (**self).poll_next_error()
    }
}
