//! Scoped, per-context error checking for GL-style native graphics calls.
//!
//! The native API reports failures through a per-context error queue that has to be
//! drained one code at a time. A [`ValidationScope`] brackets one native call: it empties
//! the queue before the call and drains it again afterwards, failing with every code the
//! call left behind.
//!
//! ```
//! use glscope::{ErrorCode, SoftContext, checked};
//!
//! let ctx = SoftContext::new(true);
//! let result = checked(Some(&ctx), |ctx| ctx.raise(ErrorCode::InvalidEnum));
//! if glscope::error_checking_globally_enabled() {
//!     assert_eq!(result.unwrap_err().to_string(), "InvalidEnum");
//! } else {
//!     assert_eq!(result, Ok(()));
//! }
//! ```

pub mod gapi;
pub mod log;

pub use gapi::config::{VALIDATION_ENABLED, error_checking_globally_enabled};
pub use gapi::context::{ContextHandle, NativeContext};
pub use gapi::errors::{ErrorCode, GraphicsError, ScopeError};
pub use gapi::registry::{ContextHistory, ErrorRegistry, HistoryHandle, registry};
pub use gapi::scope::{ValidationScope, checked, create_scope, is_error_checking_enabled};
pub use gapi::soft_context::{SOFT_QUEUE_CAPACITY, SoftContext};
