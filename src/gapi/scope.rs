use crate::gapi::config::{TRACE_DRAINS_ENABLED, error_checking_globally_enabled};
use crate::gapi::context::NativeContext;
use crate::gapi::errors::{GraphicsError, ScopeError};
use crate::gapi::registry::{HistoryHandle, registry};
use log::{debug, error, trace};

/// Whether scopes on `context` check anything.
///
/// Both the global switch (the `validation` feature and the runtime override) and the
/// context's own flag must be on.
pub fn is_error_checking_enabled<C: NativeContext + ?Sized>(context: &C) -> bool {
    error_checking_globally_enabled() && context.error_checking()
}

#[derive(Debug)]
enum ScopeState {
    /// Checking is off for this context. Nothing is ever drained.
    Disabled,
    /// The queue was reset, the check is pending.
    Armed(HistoryHandle),
    /// The check ran. Nothing is left to do on drop.
    Checked,
}

/// # Validation Scope
///
/// Attributes native errors to exactly one operation.
///
/// Created right before the native call: it resets the context's error queue so that
/// leftovers from earlier, unrelated calls are not blamed on this one. Released right
/// after: it drains the queue again, records every code into the context's history and
/// fails if anything but the sentinel came out.
///
/// # Guaranteed release
///
/// Bind the scope and call [`ValidationScope::release`]: it is the only way to get the failure
/// back. A scope that is dropped without being released (early return, `?`, unwinding) still
/// runs the check, but a failure found then is only logged at `error` level and the caller
/// sees nothing. Do not rely on `let _scope = ...` to report errors; use [`checked`] when the
/// operation fits in a closure.
///
/// A scope is single-use. Each native operation needs its own.
#[derive(Debug)]
#[must_use = "a validation scope checks the native error queue when it is released"]
pub struct ValidationScope<'a, C: NativeContext + ?Sized> {
    context: &'a C,
    state: ScopeState,
}

/// Opens a validation scope on `context`. See [`ValidationScope::new`].
pub fn create_scope<C: NativeContext + ?Sized>(
    context: Option<&C>,
) -> Result<ValidationScope<'_, C>, ScopeError> {
    ValidationScope::new(context)
}

impl<'a, C: NativeContext + ?Sized> ValidationScope<'a, C> {
    /// Arms a scope on `context`.
    ///
    /// # Errors
    /// [`ScopeError::MissingContext`] if `context` is `None`. Nothing is drained in that case.
    pub fn new(context: Option<&'a C>) -> Result<Self, ScopeError> {
        let context = context.ok_or(ScopeError::MissingContext)?;
        if !is_error_checking_enabled(context) {
            return Ok(Self {
                context,
                state: ScopeState::Disabled,
            });
        }

        let history = registry().get_or_create_history(Some(context.handle()))?;
        Self::reset_errors(context);
        Ok(Self {
            context,
            state: ScopeState::Armed(history),
        })
    }

    pub fn context(&self) -> &'a C {
        self.context
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, ScopeState::Armed(_))
    }

    /// Checks the error queue and ends the scope.
    ///
    /// # Errors
    /// [`ScopeError::Graphics`] with every code observed since the scope was armed,
    /// in the order the native queue returned them.
    pub fn release(mut self) -> Result<(), ScopeError> {
        self.check_errors()
    }

    /// Polls and discards until the sentinel comes out.
    fn reset_errors(context: &C) {
        let mut discarded = 0usize;
        loop {
            let code = context.poll_next_error();
            if code.is_sentinel() {
                break;
            }
            trace!("{}: discarding stale {}", context.handle(), code);
            discarded += 1;
        }
        if discarded > 0 {
            crate::warn_warning!(
                "{}: {} error(s) left over from earlier calls were discarded",
                context.handle(),
                discarded
            );
        }
        debug!("{}: validation scope armed", context.handle());
    }

    fn check_errors(&mut self) -> Result<(), ScopeError> {
        let ScopeState::Armed(history) = std::mem::replace(&mut self.state, ScopeState::Checked)
        else {
            return Ok(());
        };

        let context = self.context;
        // Always the raw query: checking it would recurse.
        let recorded = history.record_drain(|| context.poll_next_error());
        if TRACE_DRAINS_ENABLED {
            trace!("{}: drained {:?}", context.handle(), recorded);
        }

        match GraphicsError::from_drain(&recorded) {
            None => {
                crate::trace_success!("{}: no native errors", context.handle());
                Ok(())
            }
            Some(err) => Err(err.into()),
        }
    }
}

impl<C: NativeContext + ?Sized> Drop for ValidationScope<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.check_errors() {
            error!(
                "{}: native error(s) on unreleased validation scope: {}",
                self.context.handle(),
                err
            );
        }
    }
}

/// Runs `op` on `context` inside a validation scope.
///
/// Returns what `op` returned, or the aggregated native errors it caused.
pub fn checked<C, T>(context: Option<&C>, op: impl FnOnce(&C) -> T) -> Result<T, ScopeError>
where
    C: NativeContext + ?Sized,
{
    let scope = create_scope(context)?;
    let value = op(scope.context());
    scope.release()?;
    Ok(value)
}

/// Wraps a single native call in a validation scope.
///
/// ```ignore
/// let texture = gl_call!(&ctx, gl.create_texture())?;
/// ```
#[macro_export]
macro_rules! gl_call {
    ($ctx:expr, $call:expr) => {
        $crate::checked(::core::option::Option::Some($ctx), |_| $call)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gapi::errors::ErrorCode;
    use crate::gapi::soft_context::SoftContext;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_context_never_arms() {
        let err = create_scope::<SoftContext>(None).unwrap_err();
        assert_eq!(err, ScopeError::MissingContext);
    }

    #[test]
    fn disabled_context_is_transparent() {
        let ctx = SoftContext::new(false);
        ctx.raise(ErrorCode::InvalidOperation);

        let scope = create_scope(Some(&ctx)).unwrap();
        assert!(!scope.is_armed());
        ctx.raise(ErrorCode::InvalidValue);
        assert_eq!(scope.release(), Ok(()));

        assert_eq!(ctx.polls(), 0);
        assert_eq!(ctx.pending(), 2);
        assert_eq!(registry().history(ctx.handle()), None);
    }

    #[cfg(not(feature = "validation"))]
    #[test]
    fn validation_off_never_arms() {
        let ctx = SoftContext::new(true);
        let scope = create_scope(Some(&ctx)).unwrap();
        ctx.raise(ErrorCode::InvalidEnum);

        assert!(!scope.is_armed());
        assert_eq!(scope.release(), Ok(()));
        assert_eq!(ctx.polls(), 0);
        assert_eq!(ctx.pending(), 1);
    }

    #[cfg(feature = "validation")]
    #[test]
    fn clean_operation_records_only_the_sentinel() {
        let ctx = SoftContext::new(true);
        let scope = create_scope(Some(&ctx)).unwrap();
        assert!(scope.is_armed());
        assert_eq!(scope.release(), Ok(()));
        assert_eq!(
            registry().history(ctx.handle()),
            Some(vec![ErrorCode::NoError])
        );
    }

    #[cfg(feature = "validation")]
    #[test]
    fn single_error_is_reported_alone() {
        let ctx = SoftContext::new(true);
        let scope = create_scope(Some(&ctx)).unwrap();
        ctx.raise(ErrorCode::InvalidOperation);

        let err = scope.release().unwrap_err();
        let message = err.to_string();
        assert_eq!(message, "InvalidOperation");
        assert!(!message.contains("NoError"));
    }

    #[cfg(feature = "validation")]
    #[test]
    fn reset_discards_stale_errors() {
        let ctx = SoftContext::new(true);
        ctx.raise(ErrorCode::InvalidValue);
        ctx.raise(ErrorCode::StackOverflow);

        let scope = create_scope(Some(&ctx)).unwrap();
        assert_eq!(ctx.pending(), 0);
        assert_eq!(scope.release(), Ok(()));
    }

    #[cfg(feature = "validation")]
    #[test]
    fn drop_runs_the_check() {
        let ctx = SoftContext::new(true);
        {
            let _scope = create_scope(Some(&ctx)).unwrap();
            ctx.raise(ErrorCode::OutOfMemory);
        }
        assert_eq!(ctx.pending(), 0);
        assert_eq!(
            registry().history(ctx.handle()),
            Some(vec![ErrorCode::OutOfMemory, ErrorCode::NoError])
        );
    }

    #[cfg(feature = "validation")]
    #[test]
    fn checked_returns_the_operation_result() {
        let ctx = SoftContext::new(true);
        assert_eq!(checked(Some(&ctx), |_| 42), Ok(42));

        let err = checked(Some(&ctx), |ctx| ctx.raise(ErrorCode::InvalidEnum)).unwrap_err();
        assert_eq!(
            err.graphics().map(GraphicsError::codes),
            Some(&[ErrorCode::InvalidEnum][..])
        );
    }

    #[cfg(feature = "validation")]
    #[test]
    fn works_through_trait_objects() {
        let ctx = SoftContext::new(true);
        let dyn_ctx: &dyn NativeContext = &ctx;
        let scope = create_scope(Some(dyn_ctx)).unwrap();
        ctx.raise(ErrorCode::InvalidFramebufferOperation);
        assert!(scope.release().is_err());
    }
}
