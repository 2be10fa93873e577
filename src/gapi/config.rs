use lazy_static::lazy_static;

pub const VALIDATION_ENABLED: bool = cfg!(feature = "validation");
pub const TRACE_DRAINS_ENABLED: bool = cfg!(feature = "trace_drains");

/// Environment variable that can switch error checking off at runtime.
pub const ERROR_CHECKING_ENV: &str = "GLSCOPE_ERROR_CHECKING";

lazy_static! {
    // Read once, the first time a scope asks.
    static ref ERROR_CHECKING_OVERRIDE: bool = std::env::var(ERROR_CHECKING_ENV)
        .ok()
        .and_then(|value| parse_toggle(&value))
        .unwrap_or(true);
}

/// Parses an on/off switch. Anything unrecognised is `None`.
pub fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Runtime half of the global switch, see [`ERROR_CHECKING_ENV`].
pub fn error_checking_override() -> bool {
    *ERROR_CHECKING_OVERRIDE
}

/// Whether scopes check anything at all in this process.
pub fn error_checking_globally_enabled() -> bool {
    VALIDATION_ENABLED && error_checking_override()
}
