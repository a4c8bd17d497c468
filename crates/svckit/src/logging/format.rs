use std::io::Write;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde_json::{Map, Value as JsonValue};

use super::error::Error;
use super::level::Level;
use super::options::SinkOptions;
use super::record::{Attr, Record, Value};
use super::sink::Sink;

/// Attributes attached via `with_attrs`, remembered together with the group
/// path that was open at attach time.
#[derive(Clone, Default)]
struct Decoration {
    attrs: Vec<(Vec<String>, Attr)>,
    groups: Vec<String>,
}

impl Decoration {
    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut next = self.clone();
        next.attrs
            .extend(attrs.into_iter().map(|attr| (self.groups.clone(), attr)));
        next
    }

    fn with_group(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.groups.push(name.to_string());
        next
    }
}

/// Formats each record as a single JSON line.
///
/// Built-in fields are `time` (RFC 3339, millisecond precision), `level`,
/// and `msg`. Group prefixes nest as JSON objects.
pub struct JsonSink {
    opts: SinkOptions,
    decoration: Decoration,
}

impl JsonSink {
    pub fn new(opts: SinkOptions) -> Self {
        Self {
            opts,
            decoration: Decoration::default(),
        }
    }
}

impl Sink for JsonSink {
    fn enabled(&self, level: Level) -> bool {
        level >= self.opts.level
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        let mut root = Map::new();
        for attr in builtin_attrs(record) {
            let attr = self.opts.apply_replace(&[], attr);
            insert_nested(&mut root, &[], &attr.key, json_value(&attr.value));
        }
        for (path, attr) in &self.decoration.attrs {
            let attr = self.opts.apply_replace(path, attr.clone());
            insert_nested(&mut root, path, &attr.key, json_value(&attr.value));
        }
        for attr in record.attrs() {
            let attr = self.opts.apply_replace(&self.decoration.groups, attr.clone());
            insert_nested(
                &mut root,
                &self.decoration.groups,
                &attr.key,
                json_value(&attr.value),
            );
        }

        let mut line = serde_json::to_vec(&JsonValue::Object(root))?;
        line.push(b'\n');
        let mut writer = self.opts.writer.clone();
        writer.write_all(&line)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        Arc::new(Self {
            opts: self.opts.clone(),
            decoration: self.decoration.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self {
            opts: self.opts.clone(),
            decoration: self.decoration.with_group(name),
        })
    }

    fn close(&self) -> Result<(), Error> {
        let mut writer = self.opts.writer.clone();
        writer.flush()?;
        Ok(())
    }
}

/// Formats each record as a single `key=value` line.
///
/// Group prefixes flatten to dotted keys (`group.key=value`), as do nested
/// group values.
pub struct TextSink {
    opts: SinkOptions,
    decoration: Decoration,
}

impl TextSink {
    pub fn new(opts: SinkOptions) -> Self {
        Self {
            opts,
            decoration: Decoration::default(),
        }
    }

    fn emit(&self, parts: &mut Vec<String>, path: &[String], attr: Attr) {
        let attr = self.opts.apply_replace(path, attr);
        match attr.value {
            Value::Group(attrs) => {
                let mut child_path = path.to_vec();
                child_path.push(attr.key);
                for child in attrs {
                    self.emit(parts, &child_path, child);
                }
            }
            value => {
                let key = qualify(path, &attr.key);
                parts.push(format!("{key}={}", text_value(&value)));
            }
        }
    }
}

impl Sink for TextSink {
    fn enabled(&self, level: Level) -> bool {
        level >= self.opts.level
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        let mut parts = Vec::new();
        for attr in builtin_attrs(record) {
            self.emit(&mut parts, &[], attr);
        }
        for (path, attr) in &self.decoration.attrs {
            self.emit(&mut parts, path, attr.clone());
        }
        for attr in record.attrs() {
            self.emit(&mut parts, &self.decoration.groups, attr.clone());
        }

        let mut line = parts.join(" ");
        line.push('\n');
        let mut writer = self.opts.writer.clone();
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        Arc::new(Self {
            opts: self.opts.clone(),
            decoration: self.decoration.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self {
            opts: self.opts.clone(),
            decoration: self.decoration.with_group(name),
        })
    }

    fn close(&self) -> Result<(), Error> {
        let mut writer = self.opts.writer.clone();
        writer.flush()?;
        Ok(())
    }
}

fn builtin_attrs(record: &Record) -> [Attr; 3] {
    [
        Attr::string(
            "time",
            record.time.to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Attr::string("level", record.level.as_str()),
        Attr::string("msg", record.message.clone()),
    ]
}

fn json_value(value: &Value) -> JsonValue {
    match value {
        Value::Text(text) => JsonValue::String(text.clone()),
        Value::Int(n) => serde_json::json!(n),
        Value::Float(f) => serde_json::json!(f),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Duration(d) => serde_json::json!(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)),
        Value::Group(attrs) => {
            let mut map = Map::new();
            for attr in attrs {
                map.insert(attr.key.clone(), json_value(&attr.value));
            }
            JsonValue::Object(map)
        }
    }
}

fn insert_nested(map: &mut Map<String, JsonValue>, path: &[String], key: &str, value: JsonValue) {
    match path.split_first() {
        None => {
            map.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.clone())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !entry.is_object() {
                *entry = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(child) = entry {
                insert_nested(child, rest, key, value);
            }
        }
    }
}

fn qualify(path: &[String], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path.join("."), key)
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::Text(text) => quote(text),
        other => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    let needs_quoting = text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=');
    if needs_quoting {
        format!("{text:?}")
    } else {
        text.to_string()
    }
}
