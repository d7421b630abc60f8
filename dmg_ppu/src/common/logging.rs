//! Utilities for configuring logging
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Once;

use colored::*;
use env_logger::Logger;
use log::LevelFilter;
use log::Log;
use log::Record;

static ONCE_INIT: Once = Once::new();

static TRACE_CONTEXT_LINES: usize = 20;

/// Name of the environment variable holding env_logger style filters, e.g.
/// `DMG_PPU_LOG=dmg_ppu::ppu=debug`.
pub const LOG_ENV_VAR: &str = "DMG_PPU_LOG";

/// Logger for the PPU: env_logger filters, one coloured letter per level.
///
/// The renderers emit one trace record per scanline (and one more per window line), which is
/// over 8,000 records a second at full speed. These are held back in a ring buffer and only the
/// last `TRACE_CONTEXT_LINES` are printed, right before a warning or other higher level record,
/// so they show which lines led up to it.
struct PpuLogger {
    /// Contains the last `TRACE_CONTEXT_LINES` of trace-level logs.
    trace_logs: Mutex<VecDeque<String>>,
    logger: Logger,
}

impl PpuLogger {
    pub fn new(logger: Logger) -> Self {
        log::set_max_level(logger.filter());
        Self {
            trace_logs: Mutex::new(VecDeque::new()),
            logger,
        }
    }

    fn format_record(&self, record: &Record) -> String {
        let message = record.args().to_string();
        match record.level() {
            log::Level::Error => format!("{} {}", "E".red().bold(), message.red()),
            log::Level::Warn => format!("{} {}", "W".yellow().bold(), message.yellow()),
            log::Level::Info => format!("{} {}", "I".blue().bold(), message.normal()),
            log::Level::Debug => format!("{} {}", "D".blue(), message.normal()),
            log::Level::Trace => format!("{}", message.dimmed()),
        }
    }
}

impl Log for PpuLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.logger.matches(record) {
            return;
        }
        let record_str = self.format_record(record);
        let mut trace_logs = self
            .trace_logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if record.level() == LevelFilter::Trace {
            trace_logs.push_front(record_str);
            trace_logs.truncate(TRACE_CONTEXT_LINES);
        } else {
            if trace_logs.len() == TRACE_CONTEXT_LINES {
                println!("{}", "...".dimmed());
            }
            for log in trace_logs.drain(0..).rev() {
                println!("{}", log);
            }
            println!("{}", record_str);
        }
    }

    fn flush(&self) {}
}

fn install(default_filters: &str) {
    let filter_config = std::env::var(LOG_ENV_VAR).unwrap_or(default_filters.to_string());
    let filter = env_logger::builder().parse_filters(&filter_config).build();
    if log::set_boxed_logger(Box::new(PpuLogger::new(filter))).is_err() {
        log::warn!("A logger was already installed, {LOG_ENV_VAR} is ignored");
    }
}

/// Installs the logger for binaries. Defaults to errors only.
pub fn init() {
    ONCE_INIT.call_once(|| install("error"));
}

/// Installs the logger for tests. `verbose` enables info level and PPU mode transitions.
pub fn test_init(verbose: bool) {
    ONCE_INIT.call_once(|| {
        install(if verbose {
            "info,dmg_ppu::ppu=debug"
        } else {
            "warn"
        })
    });
}
