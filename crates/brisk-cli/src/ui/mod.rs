//! Terminal status lines.
//!
//! Messages go to stderr so stdout stays clean. Colors follow `--no-color`,
//! `NO_COLOR` and `FORCE_COLOR`, falling back to TTY detection.
//!
//! ```no_run
//! use brisk_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Dependencies pre-bundled");
//! ui::warning("No package.json dependencies found");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, print_banner};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` enables them even without a
/// terminal, otherwise colors are used when stderr is attended.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
