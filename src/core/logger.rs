// iwhois - Systemd-Style Logger
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Systemd-style logging compatible with journald
//!
//! Terminal output is `<timestamp> [LEVEL] message`, colored when stderr is a
//! TTY. In journald mode every record is emitted as `PRIORITY=`/`MESSAGE=`
//! fields so journald can index it.

use std::fmt;

use chrono::Local;
use once_cell::sync::OnceCell;

/// Syslog priorities, lower is more severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    pub fn priority(self) -> u8 {
        self as u8
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warning => "WARN",
            LogLevel::Notice => "NOTE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[1;31m",
            LogLevel::Warning => "\x1b[1;33m",
            LogLevel::Notice => "\x1b[1;36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Debug => "\x1b[2m",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where records go and how they look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Terminal { colors: bool, timestamps: bool },
    Journald,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub format: LogFormat,
    /// Prefix records with the emitting module path
    pub show_target: bool,
}

impl LoggerConfig {
    /// `--debug` and `--trace` lower the threshold; `--trace` also shows
    /// module paths.
    pub fn from_args(debug: bool, trace: bool, journald: bool) -> Self {
        let format = if journald {
            LogFormat::Journald
        } else {
            LogFormat::Terminal {
                colors: atty::is(atty::Stream::Stderr),
                timestamps: true,
            }
        };

        Self {
            min_level: if debug || trace { LogLevel::Debug } else { LogLevel::Info },
            format,
            show_target: trace,
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::from_args(false, false, false)
    }
}

static LOGGER: OnceCell<Logger> = OnceCell::new();

#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Install the process-wide logger. Can only be done once.
    pub fn init(config: LoggerConfig) -> Result<(), LoggerError> {
        LOGGER
            .set(Self::new(config))
            .map_err(|_| LoggerError::AlreadyInitialized)
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.config.min_level
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if self.enabled(level) {
            eprintln!("{}", self.render(level, target, message));
        }
    }

    fn render(&self, level: LogLevel, target: &str, message: &str) -> String {
        let target = (self.config.show_target && !target.is_empty()).then_some(target);

        match self.config.format {
            LogFormat::Journald => {
                let mut record = format!("PRIORITY={}\nMESSAGE={}\n", level.priority(), message);
                if let Some(target) = target {
                    record.push_str(&format!("CODE_FILE={}\n", target));
                }
                record.push_str("SYSLOG_IDENTIFIER=iwhois\n");
                record
            }
            LogFormat::Terminal { colors, timestamps } => {
                let mut line = String::new();
                if timestamps {
                    line.push_str(&Local::now().format("%Y-%m-%d %H:%M:%S ").to_string());
                }

                // Start-up status lines ("[   OK   ] ...") bring their own marker
                let body = if is_status_line(message) {
                    message.to_string()
                } else {
                    match target {
                        Some(target) => format!("[{}] {}: {}", level, target, message),
                        None => format!("[{}] {}", level, message),
                    }
                };

                if colors {
                    line.push_str(&format!("{}{}\x1b[0m", level.ansi(), body));
                } else {
                    line.push_str(&body);
                }
                line
            }
        }
    }
}

fn is_status_line(message: &str) -> bool {
    ["[*]", "[   OK   ]", "[  FAILED ]"]
        .iter()
        .any(|marker| message.starts_with(marker))
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level(
            $crate::core::logger::LogLevel::Error,
            module_path!(),
            &format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level(
            $crate::core::logger::LogLevel::Warning,
            module_path!(),
            &format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level(
            $crate::core::logger::LogLevel::Info,
            module_path!(),
            &format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level(
            $crate::core::logger::LogLevel::Debug,
            module_path!(),
            &format!($($arg)*),
        )
    };
}

/// Used by the `log_*!` macros. Records are dropped until [`Logger::init`].
pub fn log_with_level(level: LogLevel, target: &str, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.log(level, target, message);
    }
}

pub fn log_init_start(component: &str) {
    log_with_level(LogLevel::Notice, "", &format!("[*] Loading {}...", component));
}

pub fn log_init_ok_with_details(component: &str, details: &str) {
    log_with_level(LogLevel::Info, "", &format!("[   OK   ] Loaded {} ({})", component, details));
}

pub fn log_init_failed(component: &str, error: &str) {
    log_with_level(LogLevel::Error, "", &format!("[  FAILED ] Loading {}: {}", component, error));
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Logger already initialized")]
    AlreadyInitialized,
}

pub fn init_from_args(debug: bool, trace: bool, journald: bool) -> Result<(), LoggerError> {
    Logger::init(LoggerConfig::from_args(debug, trace, journald))
}
