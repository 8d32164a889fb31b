//! Location value: a place in a file

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

static LOCATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?):(\d+)(?::(\d+))?$").expect("valid location regex"));

/// Immutable `(path, line, column)` triple.
///
/// Used for identity comparisons only: two bookmarks at equal locations are
/// considered the same mark by toggle semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    /// 1-based line number
    pub line: u32,
    /// 0-based column
    pub col: u32,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, line: u32, col: u32) -> Self {
        Self {
            path: path.into(),
            line,
            col,
        }
    }

    /// True if this location lies in `path`.
    pub fn is_in(&self, path: &Path) -> bool {
        self.path == path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.col)
    }
}

/// Parses `path:line` or `path:line:col`.
impl FromStr for Location {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = LOCATION_REGEX
            .captures(s.trim())
            .ok_or_else(|| DomainError::InvalidLocation(s.to_string()))?;

        let number = |idx: usize| -> Result<u32, DomainError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| DomainError::InvalidLocation(s.to_string())),
                None => Ok(0),
            }
        };

        Ok(Self {
            path: PathBuf::from(&caps[1]),
            line: number(2)?,
            col: number(3)?,
        })
    }
}
