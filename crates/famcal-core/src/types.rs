use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Origin of an event record without database dependencies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    #[default]
    Manual,
    Ics,
    Google,
    Outlook,
}

impl EventSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Ics => "ics",
            Self::Google => "google",
            Self::Outlook => "outlook",
        }
    }

    /// Parses a source tag (case-insensitive).
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidInput` if the tag is not a known source.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "manual" => Self::Manual,
            "ics" => Self::Ics,
            "google" => Self::Google,
            "outlook" => Self::Outlook,
            _ => return Err(CoreError::InvalidInput(format!("unknown event source: {s}"))),
        })
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parse() {
        assert_eq!(EventSource::parse("manual").unwrap(), EventSource::Manual);
        assert_eq!(EventSource::parse("GOOGLE").unwrap(), EventSource::Google);
        assert!(EventSource::parse("caldav").is_err());
    }

    #[test]
    fn source_round_trip() {
        for source in [
            EventSource::Manual,
            EventSource::Ics,
            EventSource::Google,
            EventSource::Outlook,
        ] {
            assert_eq!(EventSource::parse(source.as_str()).unwrap(), source);
        }
    }
}
