// src/utils/log.rs

//! Line-oriented console logging for the archiver run.
//!
//! Small and deliberately synchronous: one line per event, prefixed with a
//! wall-clock time and a level tag. Warnings and errors go to stderr so a
//! piped run keeps its report clean.

#![allow(dead_code)]

use std::sync::OnceLock;

use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info ",
            LogLevel::Warn => "warn ",
            LogLevel::Error => "error",
        }
    }

    /// Parse a config-file level string; anything unrecognized means info.
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

static MIN_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Set the minimum level once per process; later calls are ignored.
pub fn init(level: &str) {
    let _ = MIN_LEVEL.set(LogLevel::parse(level));
}

fn enabled(level: LogLevel) -> bool {
    level >= MIN_LEVEL.get().copied().unwrap_or(LogLevel::Info)
}

fn line(level: LogLevel, message: &str) -> String {
    format!("{} {} {}", Local::now().format("%H:%M:%S"), level.tag(), message)
}

fn emit(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }
    match level {
        LogLevel::Warn | LogLevel::Error => eprintln!("{}", line(level, message)),
        _ => println!("{}", line(level, message)),
    }
}

pub fn debug(message: &str) {
    emit(LogLevel::Debug, message);
}

pub fn info(message: &str) {
    emit(LogLevel::Info, message);
}

pub fn warn(message: &str) {
    emit(LogLevel::Warn, message);
}

pub fn error(message: &str) {
    emit(LogLevel::Error, message);
}

/// Completion notice, always printed regardless of level.
pub fn success(message: &str) {
    println!("{}", line(LogLevel::Info, &format!("ok: {}", message)));
}

/// Progress marker for one stage of the run.
pub fn step(current: usize, total: usize, message: &str) {
    emit(LogLevel::Info, &format!("({}/{}) {}", current, total, message));
}

/// Banner printed once at the start of a run.
pub fn header(title: &str) {
    if !enabled(LogLevel::Info) {
        return;
    }
    let rule = "-".repeat(title.len() + 8);
    println!("{}", line(LogLevel::Info, &rule));
    println!("{}", line(LogLevel::Info, &format!("    {}", title)));
    println!("{}", line(LogLevel::Info, &rule));
}

/// Indented detail under the previous step line.
pub fn sub_item(message: &str) {
    emit(LogLevel::Info, &format!("  - {}", message));
}

/// Key/value recap printed at the end of a run.
pub fn summary(title: &str, items: &[(&str, String)]) {
    if !enabled(LogLevel::Info) {
        return;
    }
    println!();
    println!("{}", line(LogLevel::Info, &format!("{}:", title)));
    for (key, value) in items {
        println!("{}", line(LogLevel::Info, &format!("  {} = {}", key, value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(LogLevel::parse("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::parse(" WARNING "), LogLevel::Warn);
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Info);
    }

    #[test]
    fn test_line_carries_tag_and_message() {
        let rendered = line(LogLevel::Error, "boom");
        assert!(rendered.ends_with("error boom"));
    }
}
