use opentelemetry::{KeyValue, Value as OtelValue};

use crate::logging::{Attr, Value};

/// Converts one log attribute into a span attribute.
///
/// Durations become nanosecond integers; nested groups are rendered as
/// text, since span attributes are flat.
pub fn key_value(attr: &Attr) -> KeyValue {
    KeyValue::new(attr.key.clone(), otel_value(&attr.value))
}

/// Converts a slice of log attributes, preserving order.
pub fn key_values(attrs: &[Attr]) -> Vec<KeyValue> {
    attrs.iter().map(key_value).collect()
}

impl From<&Attr> for KeyValue {
    fn from(attr: &Attr) -> Self {
        key_value(attr)
    }
}

fn otel_value(value: &Value) -> OtelValue {
    match value {
        Value::Text(text) => OtelValue::String(text.clone().into()),
        Value::Int(n) => OtelValue::I64(*n),
        Value::Float(f) => OtelValue::F64(*f),
        Value::Bool(b) => OtelValue::Bool(*b),
        Value::Duration(d) => OtelValue::I64(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)),
        Value::Group(_) => OtelValue::String(value.to_string().into()),
    }
}
