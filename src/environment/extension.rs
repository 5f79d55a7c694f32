//! IDE extension identifiers
//!
//! Extensions are addressed as `publisher.name-version`, the same form
//! VS Code uses for its on-disk extension directories. That string is
//! also the cache path segment and the install path segment.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pinned VS Code extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Extension {
    pub publisher: String,
    pub name: String,
    pub version: String,
}

impl Extension {
    pub fn new(
        publisher: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            publisher: publisher.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}-{}", self.publisher, self.name, self.version)
    }
}

fn valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for Extension {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EnvError::InvalidExtension {
            id: s.to_string(),
            reason: reason.to_string(),
        };

        let (publisher, rest) = s.split_once('.').ok_or_else(|| invalid("missing publisher"))?;
        // Names may contain dashes, versions may not
        let (name, version) = rest.rsplit_once('-').ok_or_else(|| invalid("missing version"))?;

        for (label, segment) in [("publisher", publisher), ("name", name), ("version", version)] {
            if !valid_segment(segment) || segment.contains("..") {
                return Err(invalid(&format!("invalid {}", label)));
            }
        }

        Ok(Self::new(publisher, name, version))
    }
}

impl TryFrom<String> for Extension {
    type Error = EnvError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Extension> for String {
    fn from(ext: Extension) -> Self {
        ext.to_string()
    }
}
