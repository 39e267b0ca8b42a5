use std::io::Write;

use env_logger::{fmt::Color, Builder, Env};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use indicatif_log_bridge::LogWrapper;
use log::{Level, LevelFilter};
use once_cell::sync::OnceCell;

static INSTANCE: OnceCell<Logger> = OnceCell::new();

/// Diagnostic-stream setup for epcr-rs, wired to the `Q` flag: quiet runs
/// (the default) keep warnings and errors only, `Q=0` adds the progress
/// chatter. Progress bars share the stream through [`Logger::attach`].
#[derive(Debug)]
pub struct Logger {
    multi_pg: MultiProgress,
}

impl Logger {
    /// Install the global logger. Repeated calls are ignored, so tests may
    /// race through here freely. The `EPCR_LOG` environment variable
    /// overrides the `Q`-derived filter.
    pub fn init(quiet: bool) {
        let level = match quiet {
            true  => LevelFilter::Warn,
            false => LevelFilter::Info,
        };

        let logger = Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                let mut tag = buf.style();
                let color = match record.level() {
                    Level::Error => Color::Red,
                    Level::Warn  => Color::Yellow,
                    Level::Info  => Color::Green,
                    _            => Color::Blue,
                };
                tag.set_color(color).set_bold(true);

                match record.level() {
                    // Errors are terminal here: keep the source location.
                    Level::Error => writeln!(
                        buf,
                        "{}: {} (at {}:{})",
                        tag.value("error"),
                        record.args(),
                        record.file().unwrap_or("?"),
                        record.line().unwrap_or(0)
                    ),
                    level => writeln!(
                        buf,
                        "{}: {}",
                        tag.value(level.to_string().to_lowercase()),
                        record.args()
                    ),
                }
            })
            .parse_env(Env::default().filter("EPCR_LOG"))
            .build();

        // The bridge routes log lines around any live progress bars, but
        // leaves the max level to us.
        let filter = logger.filter();
        let multi_pg = MultiProgress::new();
        if LogWrapper::new(multi_pg.clone(), logger).try_init().is_err() {
            return;
        }
        log::set_max_level(filter);
        let _ = INSTANCE.set(Self { multi_pg });
    }

    /// Register a progress bar with the shared draw target. Falls back to
    /// a hidden bar when no logger is active (quiet runs, unit tests).
    pub fn attach(bar: ProgressBar) -> ProgressBar {
        match INSTANCE.get() {
            Some(logger) => logger.multi_pg.add(bar),
            None => {
                bar.set_draw_target(ProgressDrawTarget::hidden());
                bar
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_init_filters_below_warn_and_sticks() {
        Logger::init(true);
        assert_eq!(log::max_level(), LevelFilter::Warn);
        // A second init is a no-op: the filter does not move.
        Logger::init(false);
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }

    #[test]
    fn attach_returns_a_usable_bar() {
        let bar = Logger::attach(ProgressBar::new(10));
        bar.inc(10);
        bar.finish_and_clear();
    }
}
