use std::fmt;
use thiserror::Error;

/// A code retrieved from the native error queue.
///
/// The native API keeps a bounded backlog of pending codes per context. Each poll
/// returns and clears one of them; [`ErrorCode::NoError`] means the backlog is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The sentinel. No error is pending, the queue has been drained.
    NoError,
    /// An unacceptable value was specified for an enumerated argument.
    /// The offending command is ignored and has no other side effect than to set the error flag.
    InvalidEnum,
    /// A numeric argument is out of range.
    /// The offending command is ignored and has no other side effect than to set the error flag.
    InvalidValue,
    /// The specified operation is not allowed in the current state.
    /// Usually a call sequencing mistake, e.g. drawing without a bound program.
    InvalidOperation,
    /// An operation would have caused an internal stack to overflow.
    StackOverflow,
    /// An operation would have caused an internal stack to underflow.
    StackUnderflow,
    /// There is not enough memory left to execute the command.
    /// The state of the context is undefined after this one is recorded.
    OutOfMemory,
    /// The framebuffer object is not complete.
    /// Returned by any command that reads or writes the currently bound framebuffer.
    InvalidFramebufferOperation,
    /// The context was lost, typically after a driver reset.
    /// Nothing but recreating the context recovers from this.
    ContextLost,
    /// A code this layer has no name for. Carries the raw native value.
    Unknown(u32),
}

impl ErrorCode {
    pub const RAW_NO_ERROR: u32 = 0;
    pub const RAW_INVALID_ENUM: u32 = 0x0500;
    pub const RAW_INVALID_VALUE: u32 = 0x0501;
    pub const RAW_INVALID_OPERATION: u32 = 0x0502;
    pub const RAW_STACK_OVERFLOW: u32 = 0x0503;
    pub const RAW_STACK_UNDERFLOW: u32 = 0x0504;
    pub const RAW_OUT_OF_MEMORY: u32 = 0x0505;
    pub const RAW_INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;
    pub const RAW_CONTEXT_LOST: u32 = 0x0507;

    /// Maps a raw native value to its code.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            Self::RAW_NO_ERROR => Self::NoError,
            Self::RAW_INVALID_ENUM => Self::InvalidEnum,
            Self::RAW_INVALID_VALUE => Self::InvalidValue,
            Self::RAW_INVALID_OPERATION => Self::InvalidOperation,
            Self::RAW_STACK_OVERFLOW => Self::StackOverflow,
            Self::RAW_STACK_UNDERFLOW => Self::StackUnderflow,
            Self::RAW_OUT_OF_MEMORY => Self::OutOfMemory,
            Self::RAW_INVALID_FRAMEBUFFER_OPERATION => Self::InvalidFramebufferOperation,
            Self::RAW_CONTEXT_LOST => Self::ContextLost,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            Self::NoError => Self::RAW_NO_ERROR,
            Self::InvalidEnum => Self::RAW_INVALID_ENUM,
            Self::InvalidValue => Self::RAW_INVALID_VALUE,
            Self::InvalidOperation => Self::RAW_INVALID_OPERATION,
            Self::StackOverflow => Self::RAW_STACK_OVERFLOW,
            Self::StackUnderflow => Self::RAW_STACK_UNDERFLOW,
            Self::OutOfMemory => Self::RAW_OUT_OF_MEMORY,
            Self::InvalidFramebufferOperation => Self::RAW_INVALID_FRAMEBUFFER_OPERATION,
            Self::ContextLost => Self::RAW_CONTEXT_LOST,
            Self::Unknown(raw) => *raw,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::NoError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({raw:#06x})"),
            // The variant name is the user-facing name.
            named => write!(f, "{named:?}"),
        }
    }
}

/// One or more native errors observed while checking a single operation.
///
/// `codes` is in the order the native queue produced them and never contains the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct GraphicsError {
    codes: Vec<ErrorCode>,
}

impl GraphicsError {
    /// Builds the aggregated error out of a recorded drain.
    ///
    /// Everything from the first sentinel on is ignored. Returns `None` when nothing but the
    /// sentinel was recorded.
    pub fn from_drain(recorded: &[ErrorCode]) -> Option<Self> {
        let codes = recorded
            .iter()
            .take_while(|code| !code.is_sentinel())
            .copied()
            .collect::<Vec<_>>();
        if codes.is_empty() {
            None
        } else {
            Some(Self { codes })
        }
    }

    pub fn codes(&self) -> &[ErrorCode] {
        &self.codes
    }

    /// The comma-joined names of every observed code, e.g. `"InvalidEnum, InvalidValue"`.
    pub fn message(&self) -> String {
        self.codes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything a validation scope can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The scope was requested without a context. Raised before anything is drained.
    #[error("Missing graphics context.")]
    MissingContext,
    /// The post-operation drain found real error codes.
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

impl ScopeError {
    /// The aggregated native error, if that is what this is.
    pub fn graphics(&self) -> Option<&GraphicsError> {
        match self {
            Self::Graphics(err) => Some(err),
            Self::MissingContext => None,
        }
    }
}
