use std::fmt;

use thiserror::Error;

pub const PROJECT_PREFIX: &str = "project_";
pub const FILTER_PREFIX: &str = "filter_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceParseError {
    #[error("Unknown source kind: {0}")]
    UnknownKind(String),
    #[error("Bad source id: {0}")]
    BadId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Project { id: i64 },
    Filter { id: i64 },
}

impl Source {
    pub fn parse(reference: &str) -> Result<Self, SourceParseError> {
        if let Some(id) = reference.strip_prefix(PROJECT_PREFIX) {
            let id = parse_id(reference, id)?;
            Ok(Source::Project { id })
        } else if let Some(id) = reference.strip_prefix(FILTER_PREFIX) {
            let id = parse_id(reference, id)?;
            Ok(Source::Filter { id })
        } else {
            Err(SourceParseError::UnknownKind(reference.to_string()))
        }
    }
}

fn parse_id(reference: &str, id: &str) -> Result<i64, SourceParseError> {
    id.parse()
        .map_err(|_| SourceParseError::BadId(reference.to_string()))
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Project { id } => write!(f, "{}{}", PROJECT_PREFIX, id),
            Source::Filter { id } => write!(f, "{}{}", FILTER_PREFIX, id),
        }
    }
}
