use std::sync::Arc;

use once_cell::sync::Lazy;

use super::format::JsonSink;
use super::level::env_level;
use super::logger::Logger;
use super::options::SinkOptions;
use super::process::ProcessSink;
use super::record::Attr;

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(|| {
    let json = JsonSink::new(SinkOptions::new().with_level(env_level()));
    Logger::new(Arc::new(ProcessSink::new(Arc::new(json))))
});

/// Returns the process-wide default logger: process-stamped JSON on stdout,
/// minimum level taken from `LOG_LEVEL`.
pub fn default_logger() -> Logger {
    DEFAULT_LOGGER.clone()
}

pub fn debug(message: impl Into<String>, attrs: Vec<Attr>) {
    DEFAULT_LOGGER.debug(message, attrs);
}

pub fn info(message: impl Into<String>, attrs: Vec<Attr>) {
    DEFAULT_LOGGER.info(message, attrs);
}

pub fn warn(message: impl Into<String>, attrs: Vec<Attr>) {
    DEFAULT_LOGGER.warn(message, attrs);
}

pub fn error(message: impl Into<String>, attrs: Vec<Attr>) {
    DEFAULT_LOGGER.error(message, attrs);
}
