use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use super::error::Error;
use super::level::Level;
use super::record::{Attr, Record, Value};
use super::sink::Sink;

const DEFAULT_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

/// Configuration of the Rollbar exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbarConfig {
    pub access_token: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub code_version: String,
    #[serde(default)]
    pub host: String,
    /// Minimum level shipped to Rollbar.
    #[serde(default = "default_level")]
    pub level: Level,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_level() -> Level {
    Level::Error
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl RollbarConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            environment: String::new(),
            code_version: String::new(),
            host: String::new(),
            level: default_level(),
            endpoint: default_endpoint(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_code_version(mut self, code_version: impl Into<String>) -> Self {
        self.code_version = code_version.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

struct Delivery {
    tx: Mutex<Option<Sender<JsonValue>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Ships matching records to the Rollbar item API.
///
/// Payloads are serialized on the calling thread and handed to a dedicated
/// delivery thread, so `handle` never blocks on the network. Delivery is
/// best-effort: failed posts are dropped. [`RollbarSink::close`] stops the
/// worker after draining queued items; decorated copies share the worker,
/// and closing any one of them shuts delivery down for all.
pub struct RollbarSink {
    config: RollbarConfig,
    delivery: Arc<Delivery>,
    attrs: Vec<(Vec<String>, Attr)>,
    groups: Vec<String>,
}

impl RollbarSink {
    pub fn new(config: RollbarConfig) -> Self {
        let (tx, rx) = mpsc::channel::<JsonValue>();
        let endpoint = config.endpoint.clone();
        let token = config.access_token.clone();
        let worker = thread::Builder::new()
            .name("rollbar-delivery".into())
            .spawn(move || {
                let client = reqwest::blocking::Client::new();
                while let Ok(payload) = rx.recv() {
                    let _ = client
                        .post(&endpoint)
                        .header("X-Rollbar-Access-Token", token.as_str())
                        .json(&payload)
                        .send();
                }
            })
            .ok();

        Self {
            config,
            delivery: Arc::new(Delivery {
                tx: Mutex::new(Some(tx)),
                worker: Mutex::new(worker),
            }),
            attrs: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn payload(&self, record: &Record) -> JsonValue {
        let mut custom = Map::new();
        for (path, attr) in &self.attrs {
            insert_custom(&mut custom, path, attr);
        }
        for attr in record.attrs() {
            insert_custom(&mut custom, &self.groups, attr);
        }

        json!({
            "data": {
                "environment": self.config.environment,
                "code_version": self.config.code_version,
                "level": record.level.as_str().to_ascii_lowercase(),
                "timestamp": record.time.timestamp(),
                "language": "rust",
                "server": { "host": self.config.host },
                "body": { "message": { "body": record.message } },
                "custom": custom,
            }
        })
    }
}

impl Sink for RollbarSink {
    fn enabled(&self, level: Level) -> bool {
        level >= self.config.level
    }

    /// Enqueues the record for delivery. Records below the configured level
    /// are skipped so that a verbose sibling sink does not flood Rollbar
    /// through a shared fan-out.
    fn handle(&self, record: &Record) -> Result<(), Error> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let payload = self.payload(record);
        let tx = self
            .delivery
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = tx.as_ref() {
            let _ = tx.send(payload);
        }
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        let mut next_attrs = self.attrs.clone();
        next_attrs.extend(attrs.into_iter().map(|attr| (self.groups.clone(), attr)));
        Arc::new(Self {
            config: self.config.clone(),
            delivery: self.delivery.clone(),
            attrs: next_attrs,
            groups: self.groups.clone(),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        let mut groups = self.groups.clone();
        groups.push(name.to_string());
        Arc::new(Self {
            config: self.config.clone(),
            delivery: self.delivery.clone(),
            attrs: self.attrs.clone(),
            groups,
        })
    }

    fn close(&self) -> Result<(), Error> {
        self.delivery
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let worker = self
            .delivery
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
        Ok(())
    }
}

fn insert_custom(custom: &mut Map<String, JsonValue>, path: &[String], attr: &Attr) {
    match path.split_first() {
        None => {
            custom.insert(attr.key.clone(), custom_value(&attr.value));
        }
        Some((head, rest)) => {
            let entry = custom
                .entry(head.clone())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !entry.is_object() {
                *entry = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(child) = entry {
                insert_custom(child, rest, attr);
            }
        }
    }
}

fn custom_value(value: &Value) -> JsonValue {
    match value {
        Value::Text(text) => JsonValue::String(text.clone()),
        Value::Int(n) => json!(n),
        Value::Float(f) => json!(f),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Duration(d) => json!(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)),
        Value::Group(attrs) => {
            let mut map = Map::new();
            for attr in attrs {
                map.insert(attr.key.clone(), custom_value(&attr.value));
            }
            JsonValue::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RollbarConfig {
        RollbarConfig::new("DUMMY")
            .with_environment("local")
            .with_code_version("v1")
            .with_host("test")
            .with_endpoint("http://127.0.0.1:9/")
    }

    #[test]
    fn gates_on_the_configured_level() {
        let sink = RollbarSink::new(test_config());
        assert!(!sink.enabled(Level::Info));
        assert!(!sink.enabled(Level::Warn));
        assert!(sink.enabled(Level::Error));
        sink.close().unwrap();
    }

    #[test]
    fn payload_shape() {
        let sink = RollbarSink::new(test_config().with_level(Level::Warn));

        let mut record = Record::new(Level::Error, "This is test");
        record.add_attr(Attr::string("request-id", "abc"));
        let payload = sink.payload(&record);

        assert_eq!(payload["data"]["environment"], "local");
        assert_eq!(payload["data"]["code_version"], "v1");
        assert_eq!(payload["data"]["level"], "error");
        assert_eq!(payload["data"]["server"]["host"], "test");
        assert_eq!(payload["data"]["body"]["message"]["body"], "This is test");
        assert_eq!(payload["data"]["custom"]["request-id"], "abc");
        sink.close().unwrap();
    }

    #[test]
    fn decorations_land_in_custom_data() {
        let root = RollbarSink::new(test_config());
        let decorated = root
            .with_group("request")
            .with_attrs(vec![Attr::string("id", "42")]);

        // The decorated copy is still a RollbarSink under the trait object;
        // exercise it through handle, then inspect a payload built the same
        // way.
        let mut record = Record::new(Level::Error, "boom");
        record.add_attr(Attr::int("attempt", 3));
        decorated.handle(&record).unwrap();

        let mirror = RollbarSink {
            config: root.config.clone(),
            delivery: root.delivery.clone(),
            attrs: vec![(vec!["request".into()], Attr::string("id", "42"))],
            groups: vec!["request".into()],
        };
        let payload = mirror.payload(&record);
        assert_eq!(payload["data"]["custom"]["request"]["id"], "42");
        assert_eq!(payload["data"]["custom"]["request"]["attempt"], 3);

        root.close().unwrap();
    }

    #[test]
    fn close_is_idempotent_and_shared() {
        let root = RollbarSink::new(test_config());
        let copy = root.with_attrs(vec![Attr::string("k", "v")]);

        assert!(copy.close().is_ok());
        assert!(root.close().is_ok());

        // After close the queue is gone; handle still succeeds.
        assert!(root.handle(&Record::new(Level::Error, "late")).is_ok());
    }
}
