//! ANSI terminal styling helpers

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Enable or disable ANSI styling for the whole process.
pub fn set_colors(enabled: bool) {
    COLORS_ENABLED.store(enabled, Ordering::Relaxed);
}

fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

/// Whether the summary should be styled: `--no-color` always wins, then
/// the `NO_COLOR` convention, then TTY detection.
pub fn detect_colors(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// 256-color palette indices
pub mod colors {
    pub const GREY: u8 = 102; // Punctuation, secondary
    pub const AQUA: u8 = 109; // Numbers, info
    pub const ORANGE: u8 = 208; // Warnings
    pub const RED: u8 = 167; // Errors, failed thresholds
    pub const BLUE: u8 = 68; // Names, labels
    pub const GREEN: u8 = 71; // Success, passing thresholds
    pub const YELLOW: u8 = 185; // Redirect statuses
    pub const WHITE: u8 = 250; // Primary text
}

/// ANSI escape code constants
pub const RESET: &str = "\x1b[0m";

/// Generate foreground color escape code
#[inline]
pub fn fg(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

/// Generate bold foreground color escape code
#[inline]
pub fn bold_fg(color: u8) -> String {
    format!("\x1b[1;38;5;{}m", color)
}

/// Colorize text with a foreground color
#[inline]
pub fn colorize(text: &str, color: u8) -> String {
    if !colors_enabled() {
        return text.to_string();
    }
    format!("{}{}{}", fg(color), text, RESET)
}

/// Colorize text with bold foreground color
#[inline]
pub fn bold(text: &str, color: u8) -> String {
    if !colors_enabled() {
        return text.to_string();
    }
    format!("{}{}{}", bold_fg(color), text, RESET)
}

/// Success message (green)
#[inline]
pub fn success(text: &str) -> String {
    bold(text, colors::GREEN)
}

/// Error message (red)
#[inline]
pub fn error(text: &str) -> String {
    bold(text, colors::RED)
}

/// Info message (aqua)
#[inline]
pub fn info(text: &str) -> String {
    colorize(text, colors::AQUA)
}

/// Label/name (blue)
#[inline]
pub fn label(text: &str) -> String {
    colorize(text, colors::BLUE)
}

/// Number (aqua)
#[inline]
pub fn number(text: &str) -> String {
    colorize(text, colors::AQUA)
}

/// Secondary/muted text (grey)
#[inline]
pub fn muted(text: &str) -> String {
    colorize(text, colors::GREY)
}

/// Color an HTTP status code by its class
pub fn http_status(code: u16) -> String {
    let color = match code / 100 {
        2 => colors::GREEN,
        3 => colors::YELLOW,
        4 => colors::ORANGE,
        5 => colors::RED,
        _ => colors::GREY,
    };
    colorize(&code.to_string(), color)
}
