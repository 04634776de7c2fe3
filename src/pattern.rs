//! Pattern handling for scope, reference, archive and package filters
//!
//! Every pattern list follows the same convention: `None` means
//! "no filtering", never "match nothing".

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::model::Container;

/// Pattern compilation errors
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Split a comma separated pattern list.
///
/// Entries are trimmed and empty entries dropped. Absent or blank input
/// yields `None`.
pub fn parse_patterns(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }

    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// A `componentId:suffix` archive exclusion pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePattern {
    pub component: String,
    pub suffix: String,
}

impl ArchivePattern {
    /// Parse a pattern; anything but exactly two colon separated parts is `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts: Vec<&str> = raw.split(':').collect();
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        match parts.as_slice() {
            [component, suffix] => Some(Self {
                component: component.to_string(),
                suffix: suffix.to_string(),
            }),
            _ => None,
        }
    }

    pub fn matches(&self, container: &Container) -> bool {
        container.component.id == self.component && container.name.ends_with(&self.suffix)
    }
}

/// Archive containers to leave out of the scan
#[derive(Debug, Clone, Default)]
pub struct ArchiveFilter {
    patterns: Vec<ArchivePattern>,
}

impl ArchiveFilter {
    pub fn new(raw: &[String]) -> Self {
        let patterns = raw
            .iter()
            .filter_map(|p| {
                let parsed = ArchivePattern::parse(p);
                if parsed.is_none() {
                    debug!("Ignoring malformed archive pattern: {}", p);
                }
                parsed
            })
            .collect();
        Self { patterns }
    }

    /// Whether the container is an archive matched by one of the patterns.
    /// Directory containers are never excluded.
    pub fn excludes(&self, container: &Container) -> bool {
        container.is_archive() && self.patterns.iter().any(|p| p.matches(container))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A regular expression that must match a whole component id
#[derive(Debug, Clone)]
pub struct IdPattern {
    source: String,
    regex: Regex,
}

impl IdPattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            PatternError::Invalid {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Package name regular expressions, matched anywhere in the name
#[derive(Debug, Clone, Default)]
pub struct PackagePatterns {
    patterns: Vec<Regex>,
}

impl PackagePatterns {
    pub fn compile(raw: &[String]) -> Result<Self, PatternError> {
        let patterns = raw
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| PatternError::Invalid {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, package: &str) -> bool {
        self.patterns.iter().any(|r| r.is_match(package))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
