use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The selectable sink kinds, for config-driven wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Json,
    Text,
    Rollbar,
    Datadog,
}

impl SinkKind {
    pub const ALL: [SinkKind; 4] = [
        SinkKind::Json,
        SinkKind::Text,
        SinkKind::Rollbar,
        SinkKind::Datadog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Json => "json",
            SinkKind::Text => "text",
            SinkKind::Rollbar => "rollbar",
            SinkKind::Datadog => "datadog",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sink kind.
#[derive(Debug, thiserror::Error)]
#[error("unknown sink kind: {0}")]
pub struct ParseKindError(String);

impl FromStr for SinkKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(SinkKind::Json),
            "text" => Ok(SinkKind::Text),
            "rollbar" => Ok(SinkKind::Rollbar),
            "datadog" => Ok(SinkKind::Datadog),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in SinkKind::ALL {
            assert_eq!(kind.as_str().parse::<SinkKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert!("sentry".parse::<SinkKind>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&SinkKind::Datadog).unwrap(), "\"datadog\"");
        let kind: SinkKind = serde_json::from_str("\"rollbar\"").unwrap();
        assert_eq!(kind, SinkKind::Rollbar);
    }
}
