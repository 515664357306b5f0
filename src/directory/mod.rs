pub mod static_directory;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use static_directory::{DirectoryError, StaticDirectory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub key: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub avatar_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRole {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: i64,
    pub name: String,
}

/// Result of looking a filter up under a user's security context. A filter
/// can come back together with errors; callers treat any error as fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterLookup {
    pub filter: Option<SavedFilter>,
    pub errors: Vec<String>,
}

impl FilterLookup {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn formatted_errors(&self) -> String {
        self.errors.join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait UserDirectory {
    fn find_user_by_key(&self, key: &str) -> Option<User>;
    fn find_group_by_name(&self, name: &str) -> Option<Group>;
    fn is_user_in_group(&self, user: &User, group: &Group) -> bool;
}

#[cfg_attr(test, mockall::automock)]
pub trait ProjectDirectory {
    fn find_project_by_id(&self, project_id: i64) -> Option<Project>;
    fn find_project_role_by_id(&self, role_id: i64) -> Option<ProjectRole>;
    fn has_project_role(&self, user: &User, role_id: i64, project_id: i64) -> bool;
    fn has_browse_permission(&self, user: &User, project: &Project) -> bool;
}

#[cfg_attr(test, mockall::automock)]
pub trait FilterDirectory {
    fn find_filter_by_id(&self, filter_id: i64) -> Option<SavedFilter>;
    fn find_saved_filter_by_id(&self, filter_id: i64, user: &User) -> FilterLookup;
}

#[cfg_attr(test, mockall::automock)]
pub trait FieldDirectory {
    fn find_custom_field_by_id(&self, field_id: &str) -> Option<CustomField>;
}

#[derive(Clone)]
pub struct Directories {
    pub users: Arc<dyn UserDirectory>,
    pub projects: Arc<dyn ProjectDirectory>,
    pub filters: Arc<dyn FilterDirectory>,
    pub fields: Arc<dyn FieldDirectory>,
}

impl Directories {
    pub fn from_shared<D>(directory: Arc<D>) -> Self
    where
        D: UserDirectory + ProjectDirectory + FilterDirectory + FieldDirectory + 'static,
    {
        Self {
            users: directory.clone(),
            projects: directory.clone(),
            filters: directory.clone(),
            fields: directory,
        }
    }
}
