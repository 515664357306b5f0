use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    User,
    Group,
    ProjectRole,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::User => "USER",
            SubjectType::Group => "GROUP",
            SubjectType::ProjectRole => "PROJECT_ROLE",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(SubjectType::User),
            "GROUP" => Ok(SubjectType::Group),
            "PROJECT_ROLE" => Ok(SubjectType::ProjectRole),
            other => Err(format!("Unknown subject type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Use,
    Admin,
}

impl AccessLevel {
    pub fn from_flags(admin: bool) -> Self {
        if admin { AccessLevel::Admin } else { AccessLevel::Use }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    User { key: String },
    Group { name: String },
    ProjectRole { project_id: i64, role_id: i64 },
}

impl Subject {
    /// Parses a stored `(type, reference)` pair. Project-role references are
    /// `<project id>:<role id>`; anything else yields `None`.
    pub fn parse(subject_type: SubjectType, reference: &str) -> Option<Self> {
        match subject_type {
            SubjectType::User => Some(Subject::User {
                key: reference.to_string(),
            }),
            SubjectType::Group => Some(Subject::Group {
                name: reference.to_string(),
            }),
            SubjectType::ProjectRole => {
                let (project, role) = reference.split_once(':')?;
                let project_id = project.trim().parse().ok()?;
                let role_id = role.trim().parse().ok()?;
                Some(Subject::ProjectRole {
                    project_id,
                    role_id,
                })
            }
        }
    }

    pub fn subject_type(&self) -> SubjectType {
        match self {
            Subject::User { .. } => SubjectType::User,
            Subject::Group { .. } => SubjectType::Group,
            Subject::ProjectRole { .. } => SubjectType::ProjectRole,
        }
    }

    pub fn reference(&self) -> String {
        match self {
            Subject::User { key } => key.clone(),
            Subject::Group { name } => name.clone(),
            Subject::ProjectRole {
                project_id,
                role_id,
            } => format!("{}:{}", project_id, role_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub subject_type: SubjectType,
    pub subject: String,
    pub admin: bool,
    #[serde(rename = "use")]
    pub use_: bool,
}

impl Permission {
    pub fn new(subject: &Subject, admin: bool, use_: bool) -> Self {
        Self {
            subject_type: subject.subject_type(),
            subject: subject.reference(),
            admin,
            use_,
        }
    }

    pub fn from_item(item: &PermissionItem) -> Self {
        Self {
            subject_type: item.subject_type,
            subject: item.subject.clone(),
            admin: item.access == AccessLevel::Admin,
            use_: true,
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        Subject::parse(self.subject_type, &self.subject)
    }

    pub fn access_level(&self) -> AccessLevel {
        AccessLevel::from_flags(self.admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionItem {
    pub subject_type: SubjectType,
    pub subject: String,
    pub access: AccessLevel,
}
