use crate::gapi::context::ContextHandle;
use crate::gapi::errors::{ErrorCode, ScopeError};
use lazy_static::lazy_static;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The error history of one context: every code recorded by its latest check,
/// trailing sentinel included.
///
/// Each slot carries its own lock, so several threads sharing a context cannot
/// corrupt the history. They can still interleave whole transactions.
#[derive(Debug, Default)]
pub struct ContextHistory {
    codes: Mutex<Vec<ErrorCode>>,
}

impl ContextHistory {
    /// Replaces the history with the codes drained from `poll`, up to and including the sentinel.
    ///
    /// Returns a copy of what was recorded.
    pub(crate) fn record_drain(&self, mut poll: impl FnMut() -> ErrorCode) -> Vec<ErrorCode> {
        let mut codes = self.codes.lock();
        codes.clear();
        loop {
            let code = poll();
            codes.push(code);
            if code.is_sentinel() {
                break;
            }
        }
        codes.clone()
    }

    pub fn snapshot(&self) -> Vec<ErrorCode> {
        self.codes.lock().clone()
    }
}

pub type HistoryHandle = Arc<ContextHistory>;

/// # Context Error Registry
///
/// Maps every context seen so far to its [`ContextHistory`].
///
/// Slots are created on first use and never removed; their number is bounded by the
/// number of contexts an application creates.
/// The map lock only guards the check-and-insert step and is released before anything
/// is drained.
#[derive(Debug, Default)]
pub struct ErrorRegistry {
    histories: Mutex<HashMap<ContextHandle, HistoryHandle>>,
}

lazy_static! {
    static ref CONTEXT_ERRORS: ErrorRegistry = ErrorRegistry::new();
}

/// The process-wide registry used by validation scopes.
pub fn registry() -> &'static ErrorRegistry {
    &CONTEXT_ERRORS
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the history slot of `context`, creating it if this is the first time it is seen.
    ///
    /// # Errors
    /// [`ScopeError::MissingContext`] if no context is given.
    pub fn get_or_create_history(
        &self,
        context: Option<ContextHandle>,
    ) -> Result<HistoryHandle, ScopeError> {
        let context = context.ok_or(ScopeError::MissingContext)?;
        let mut histories = self.histories.lock();
        let history = histories.entry(context).or_insert_with(|| {
            debug!("Registering error history for {context}.");
            Arc::new(ContextHistory::default())
        });
        Ok(Arc::clone(history))
    }

    /// The codes recorded by the latest check on `context`, if it was ever checked.
    pub fn history(&self, context: ContextHandle) -> Option<Vec<ErrorCode>> {
        let history = self.histories.lock().get(&context).cloned()?;
        Some(history.snapshot())
    }

    pub fn len(&self) -> usize {
        self.histories.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn handle(raw: usize) -> Option<ContextHandle> {
        ContextHandle::from_raw(raw)
    }

    #[test]
    fn missing_context_is_rejected() {
        let registry = ErrorRegistry::new();
        assert_eq!(
            registry.get_or_create_history(None).unwrap_err(),
            ScopeError::MissingContext
        );
        assert_eq!(
            registry.get_or_create_history(handle(0)).unwrap_err(),
            ScopeError::MissingContext
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn one_slot_per_context() {
        let registry = ErrorRegistry::new();
        let first = registry.get_or_create_history(handle(7)).unwrap();
        let again = registry.get_or_create_history(handle(7)).unwrap();
        let other = registry.get_or_create_history(handle(8)).unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn new_slot_starts_empty() {
        let registry = ErrorRegistry::new();
        let ctx = handle(3).unwrap();
        assert_eq!(registry.history(ctx), None);
        registry.get_or_create_history(Some(ctx)).unwrap();
        assert_eq!(registry.history(ctx), Some(vec![]));
    }

    #[test]
    fn drain_overwrites_previous_contents() {
        let history = ContextHistory::default();
        let mut queue = vec![ErrorCode::InvalidValue, ErrorCode::InvalidEnum].into_iter();
        let recorded = history.record_drain(|| queue.next().unwrap_or(ErrorCode::NoError));
        assert_eq!(
            recorded,
            vec![ErrorCode::InvalidValue, ErrorCode::InvalidEnum, ErrorCode::NoError]
        );

        history.record_drain(|| ErrorCode::NoError);
        assert_eq!(history.snapshot(), vec![ErrorCode::NoError]);
    }
}
