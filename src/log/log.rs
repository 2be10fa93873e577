use env_logger::Builder;
use env_logger::fmt::{Color, Formatter};
use log::{Level, LevelFilter, Record};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

const SUCCESS_TINT: (u8, u8, u8) = (0, 255, 0); // pure green
const WARNING_TINT: (u8, u8, u8) = (255, 255, 0); // pure yellow

/// 50 / 50 blend of two RGB colors
#[inline]
fn blend((r1, g1, b1): (u8, u8, u8), (r2, g2, b2): (u8, u8, u8)) -> (u8, u8, u8) {
    (
        ((r1 as u16 + r2 as u16) / 2) as u8,
        ((g1 as u16 + g2 as u16) / 2) as u8,
        ((b1 as u16 + b2 as u16) / 2) as u8,
    )
}

#[inline]
fn base_rgb(level: Level) -> (u8, u8, u8) {
    match level {
        Level::Error => (255, 0, 0),     // red
        Level::Warn => (255, 255, 0),    // yellow
        Level::Info => (255, 255, 255),  // white
        Level::Debug => (200, 200, 255), // blue
        Level::Trace => (220, 220, 220), // grey
    }
}

fn record_rgb(level: Level, target: &str) -> (u8, u8, u8) {
    match target {
        "success" => blend(base_rgb(level), SUCCESS_TINT),
        "warning" => blend(base_rgb(level), WARNING_TINT),
        _ => base_rgb(level),
    }
}

/// `file:line:1` relative to the crate root, so terminals and IDEs can link it.
fn source_location(file: Option<&str>, line: Option<u32>) -> String {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut full = PathBuf::from(file.unwrap_or("unknown"));
    if full.is_relative() {
        full = env::current_dir().unwrap_or_default().join(full);
    }
    let rel = full
        .strip_prefix(manifest_dir)
        .unwrap_or(&full)
        .to_string_lossy()
        .replace('\\', "/");
    format!("{rel}:{}:1", line.unwrap_or(0))
}

/// Installs the global logger.
///
/// Everything down to `Trace` is shown unless `RUST_LOG` says otherwise.
/// Calling it twice is an error from `env_logger`, which callers may ignore.
pub fn init_log() -> anyhow::Result<()> {
    Builder::new()
        .format(|buf: &mut Formatter, record: &Record| {
            let mut style = buf.style();
            let rgb = record_rgb(record.level(), record.target());
            style.set_color(Color::Rgb(rgb.0, rgb.1, rgb.2));

            match record.level() {
                Level::Error | Level::Warn => style.set_bold(true),
                Level::Trace => style.set_dimmed(true),
                _ => style.set_bold(false),
            };

            // The location part carries no ANSI codes so it stays clickable.
            writeln!(
                buf,
                "[{} {}] {}  \n{}",
                chrono::Local::now().format("%H:%M:%S"),
                style.value(record.level()),
                style.value(record.args()),
                source_location(record.file(), record.line())
            )
        })
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .try_init()
        .map_err(Into::into)
}

#[macro_export]
macro_rules! info_success {
    ($($arg:tt)*) => {
        ::log::info!(target: "success", "[SUCCESS] {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! trace_success {
    ($($arg:tt)*) => {
        ::log::trace!(target: "success", "[SUCCESS] {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn_warning
{ ($($arg:tt)*) => { ::log::warn! (target: "warning",  "[WARNING] {}",  format!($($arg)*)); }; }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tints_by_target() {
        assert_eq!(record_rgb(Level::Error, "glscope"), (255, 0, 0));
        assert_eq!(record_rgb(Level::Error, "success"), (127, 127, 0));
        assert_eq!(record_rgb(Level::Info, "warning"), (255, 255, 127));
    }

    #[test]
    fn location_is_relative_to_the_crate() {
        let file = concat!(env!("CARGO_MANIFEST_DIR"), "/src/log/log.rs");
        assert_eq!(source_location(Some(file), Some(42)), "src/log/log.rs:42:1");
        assert!(source_location(None, None).ends_with("unknown:0:1"));
    }
}
