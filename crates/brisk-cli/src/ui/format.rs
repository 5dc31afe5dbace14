//! Formatting for durations and the startup banner.

use std::time::Duration;

use owo_colors::OwoColorize;

use super::colors_enabled;

/// Format a duration in the most readable unit.
///
/// ```
/// use std::time::Duration;
/// use brisk_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the dev server banner to stderr.
pub fn print_banner(url: &str, ready_in: Duration) {
    let version = env!("CARGO_PKG_VERSION");
    let ready = format!("ready in {}", format_duration(ready_in));

    if colors_enabled() {
        eprintln!(
            "\n  {} {}  {}\n",
            "brisk".green().bold(),
            format!("v{version}").dimmed(),
            ready.dimmed()
        );
        eprintln!("  {} {}\n", "➜  Local:".bold(), url.cyan());
    } else {
        eprintln!("\n  brisk v{version}  {ready}\n");
        eprintln!("  ➜  Local: {url}\n");
    }
}
