use ::log::{debug, error, info};
use anyhow::{Result, anyhow};
use glscope::log::log::init_log;
use glscope::{
    ErrorCode, NativeContext, ScopeError, SoftContext, create_scope, gl_call, info_success,
    registry, warn_warning,
};
use std::error::Error;

fn main() -> Result<()> {
    if let Err(err) = run() {
        error!("Oops! Something went wrong: {}", err);

        let mut source = err.source();
        while let Some(cause) = source {
            error!("Caused by: {}", cause);
            source = cause.source();
        }

        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    init_log()?;

    if !glscope::error_checking_globally_enabled() {
        warn_warning!("Error checking is disabled for this build, scopes will not report anything.");
    }

    debug!("Creating context...");
    let ctx1 = SoftContext::new(true);
    info_success!("Context {} created!", ctx1.handle());

    // A mistake from earlier that nobody checked.
    ctx1.raise(ErrorCode::InvalidValue);

    let scope = create_scope(Some(&ctx1))?;
    // The checked operation itself misbehaves.
    ctx1.raise(ErrorCode::InvalidEnum);
    match scope.release() {
        Err(ScopeError::Graphics(err)) => {
            info!("Operation on {} failed with: {}", ctx1.handle(), err);
            info!("Recorded history: {:?}", registry().history(ctx1.handle()));
        }
        Err(other) => return Err(other.into()),
        Ok(()) if glscope::error_checking_globally_enabled() => {
            return Err(anyhow!("InvalidEnum went unnoticed"));
        }
        Ok(()) => {}
    }

    gl_call!(&ctx1, ())?;
    info_success!("Clean operation on {} checked!", ctx1.handle());

    let release_ctx = SoftContext::new(false);
    release_ctx.raise(ErrorCode::OutOfMemory);
    gl_call!(&release_ctx, ())?;
    info!(
        "Context {} has checking off: {} poll(s), {} pending error(s) left alone",
        release_ctx.handle(),
        release_ctx.polls(),
        release_ctx.pending()
    );

    match create_scope::<SoftContext>(None) {
        Err(ScopeError::MissingContext) => info!("A scope without a context is refused."),
        Err(other) => return Err(other.into()),
        Ok(_) => return Err(anyhow!("scope created without a context")),
    }

    Ok(())
}
