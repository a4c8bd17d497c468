use std::io::Write;
use std::sync::Arc;

use super::level::Level;
use super::record::Attr;
use super::writer::SharedWriter;

/// Hook applied to every emitted attribute before it is formatted.
///
/// The first argument is the group path the attribute sits under (empty for
/// root-level attributes and built-in fields such as `time` and `msg`).
pub type ReplaceAttr = dyn Fn(&[String], Attr) -> Attr + Send + Sync;

/// Configuration shared by the format sinks.
///
/// ```rust
/// use svckit::logging::{Level, MemoryWriter, SinkOptions};
///
/// let buf = MemoryWriter::new();
/// let opts = SinkOptions::new()
///     .with_writer(buf.clone())
///     .with_level(Level::Debug);
/// ```
#[derive(Clone)]
pub struct SinkOptions {
    pub(crate) writer: SharedWriter,
    pub(crate) level: Level,
    pub(crate) replace_attr: Option<Arc<ReplaceAttr>>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            writer: SharedWriter::stdout(),
            level: Level::Info,
            replace_attr: None,
        }
    }
}

impl SinkOptions {
    pub fn new() -> Self {
        Default::default()
    }

    /// Redirects output away from stdout.
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = SharedWriter::new(writer);
        self
    }

    /// Sets the minimum level the sink reports as enabled.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Installs a hook that can rename or rewrite attributes before output.
    pub fn with_replace_attr(
        mut self,
        replace: impl Fn(&[String], Attr) -> Attr + Send + Sync + 'static,
    ) -> Self {
        self.replace_attr = Some(Arc::new(replace));
        self
    }

    pub(crate) fn apply_replace(&self, groups: &[String], attr: Attr) -> Attr {
        match &self.replace_attr {
            Some(replace) => replace(groups, attr),
            None => attr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::record::Value;
    use crate::logging::MemoryWriter;

    #[test]
    fn defaults() {
        let opts = SinkOptions::new();
        assert_eq!(opts.level, Level::Info);
        assert!(opts.replace_attr.is_none());
    }

    #[test]
    fn replace_attr_hook_applies() {
        let opts = SinkOptions::new()
            .with_writer(MemoryWriter::new())
            .with_level(Level::Debug)
            .with_replace_attr(|_, attr| {
                if attr.key == "test_key" {
                    Attr::string(attr.key, "modified")
                } else {
                    attr
                }
            });

        assert_eq!(opts.level, Level::Debug);

        let replaced = opts.apply_replace(&[], Attr::string("test_key", "original"));
        assert_eq!(replaced.value, Value::Text("modified".into()));

        let untouched = opts.apply_replace(&[], Attr::string("other", "original"));
        assert_eq!(untouched.value, Value::Text("original".into()));
    }
}
