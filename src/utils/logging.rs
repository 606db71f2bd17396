// file: src/utils/logging.rs
// description: Tracing subscriber initialization and tagged outcome formatting

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_ok(msg: &str) -> String {
    format!("{} {}", "[OK]".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "[ERROR]".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "[WARN]".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "[INFO]".blue().bold(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_survive_without_color() {
        colored::control::set_override(false);
        assert_eq!(format_ok("done"), "[OK] done");
        assert_eq!(format_warning("careful"), "[WARN] careful");
        assert_eq!(format_error("broken"), "[ERROR] broken");
        assert_eq!(format_info("note"), "[INFO] note");
        colored::control::unset_override();
    }
}
