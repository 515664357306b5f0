use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    CustomField, FieldDirectory, FilterDirectory, FilterLookup, Group, Project,
    ProjectDirectory, ProjectRole, SavedFilter, User, UserDirectory,
};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read directory fixture: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse directory fixture: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Fixture {
    #[serde(default)]
    users: Vec<UserEntry>,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
    #[serde(default)]
    roles: Vec<ProjectRole>,
    #[serde(default)]
    filters: Vec<FilterEntry>,
    #[serde(default)]
    custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserEntry {
    #[serde(flatten)]
    user: User,
    #[serde(default)]
    groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectEntry {
    #[serde(flatten)]
    project: Project,
    #[serde(default)]
    browsers: Vec<String>,
    #[serde(default)]
    roles: Vec<RoleMembership>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoleMembership {
    role_id: i64,
    #[serde(default)]
    members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FilterEntry {
    #[serde(flatten)]
    filter: SavedFilter,
    owner: String,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    shared_with: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, UserEntry>,
    groups: HashMap<String, Group>,
    projects: HashMap<i64, ProjectEntry>,
    roles: HashMap<i64, ProjectRole>,
    filters: HashMap<i64, FilterEntry>,
    custom_fields: HashMap<String, CustomField>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(content: &str) -> Result<Self, DirectoryError> {
        let fixture: Fixture = toml::from_str(content)?;
        let mut directory = Self::new();
        for entry in fixture.users {
            directory.users.insert(entry.user.key.clone(), entry);
        }
        for group in fixture.groups {
            directory.groups.insert(group.name.clone(), group);
        }
        for entry in fixture.projects {
            directory.projects.insert(entry.project.id, entry);
        }
        for role in fixture.roles {
            directory.roles.insert(role.id, role);
        }
        for entry in fixture.filters {
            directory.filters.insert(entry.filter.id, entry);
        }
        for field in fixture.custom_fields {
            directory.custom_fields.insert(field.id.clone(), field);
        }
        tracing::debug!(
            "Loaded directory fixture: {} users, {} groups, {} projects, {} filters",
            directory.users.len(),
            directory.groups.len(),
            directory.projects.len(),
            directory.filters.len()
        );
        Ok(directory)
    }

    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn with_user(mut self, key: &str, groups: &[&str]) -> Self {
        let user = User {
            key: key.to_string(),
            name: key.to_string(),
            display_name: key.to_string(),
            email: format!("{}@example.com", key),
            avatar_url: None,
        };
        for group in groups {
            self.groups.insert(
                group.to_string(),
                Group {
                    name: group.to_string(),
                },
            );
        }
        self.users.insert(
            key.to_string(),
            UserEntry {
                user,
                groups: groups.iter().map(|g| g.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_group(mut self, name: &str) -> Self {
        self.groups.insert(
            name.to_string(),
            Group {
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_project(mut self, id: i64, key: &str, name: &str, browsers: &[&str]) -> Self {
        self.projects.insert(
            id,
            ProjectEntry {
                project: Project {
                    id,
                    key: key.to_string(),
                    name: name.to_string(),
                    avatar_id: None,
                },
                browsers: browsers.iter().map(|b| b.to_string()).collect(),
                roles: Vec::new(),
            },
        );
        self
    }

    pub fn with_role(mut self, project_id: i64, role_id: i64, name: &str, members: &[&str]) -> Self {
        self.roles.insert(
            role_id,
            ProjectRole {
                id: role_id,
                name: name.to_string(),
            },
        );
        if let Some(entry) = self.projects.get_mut(&project_id) {
            entry.roles.push(RoleMembership {
                role_id,
                members: members.iter().map(|m| m.to_string()).collect(),
            });
        }
        self
    }

    pub fn with_filter(mut self, id: i64, name: &str, owner: &str, shared_with: &[&str]) -> Self {
        self.filters.insert(
            id,
            FilterEntry {
                filter: SavedFilter {
                    id,
                    name: name.to_string(),
                },
                owner: owner.to_string(),
                public: false,
                shared_with: shared_with.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_custom_field(mut self, id: &str, name: &str) -> Self {
        self.custom_fields.insert(
            id.to_string(),
            CustomField {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn without_project(mut self, id: i64) -> Self {
        self.projects.remove(&id);
        self
    }

    pub fn without_filter(mut self, id: i64) -> Self {
        self.filters.remove(&id);
        self
    }

    pub fn without_user(mut self, key: &str) -> Self {
        self.users.remove(key);
        self
    }
}

impl UserDirectory for StaticDirectory {
    fn find_user_by_key(&self, key: &str) -> Option<User> {
        self.users.get(key).map(|entry| entry.user.clone())
    }

    fn find_group_by_name(&self, name: &str) -> Option<Group> {
        self.groups.get(name).cloned()
    }

    fn is_user_in_group(&self, user: &User, group: &Group) -> bool {
        self.users
            .get(&user.key)
            .map(|entry| entry.groups.iter().any(|g| *g == group.name))
            .unwrap_or(false)
    }
}

impl ProjectDirectory for StaticDirectory {
    fn find_project_by_id(&self, project_id: i64) -> Option<Project> {
        self.projects.get(&project_id).map(|entry| entry.project.clone())
    }

    fn find_project_role_by_id(&self, role_id: i64) -> Option<ProjectRole> {
        self.roles.get(&role_id).cloned()
    }

    fn has_project_role(&self, user: &User, role_id: i64, project_id: i64) -> bool {
        self.projects
            .get(&project_id)
            .map(|entry| {
                entry
                    .roles
                    .iter()
                    .any(|r| r.role_id == role_id && r.members.contains(&user.key))
            })
            .unwrap_or(false)
    }

    fn has_browse_permission(&self, user: &User, project: &Project) -> bool {
        self.projects
            .get(&project.id)
            .map(|entry| entry.browsers.contains(&user.key))
            .unwrap_or(false)
    }
}

impl FilterDirectory for StaticDirectory {
    fn find_filter_by_id(&self, filter_id: i64) -> Option<SavedFilter> {
        self.filters.get(&filter_id).map(|entry| entry.filter.clone())
    }

    fn find_saved_filter_by_id(&self, filter_id: i64, user: &User) -> FilterLookup {
        match self.filters.get(&filter_id) {
            None => FilterLookup {
                filter: None,
                errors: vec![format!("Filter with id {} does not exist", filter_id)],
            },
            Some(entry)
                if entry.public || entry.owner == user.key || entry.shared_with.contains(&user.key) =>
            {
                FilterLookup {
                    filter: Some(entry.filter.clone()),
                    errors: Vec::new(),
                }
            }
            Some(_) => FilterLookup {
                filter: None,
                errors: vec![format!(
                    "Filter with id {} is not shared with {}",
                    filter_id, user.key
                )],
            },
        }
    }
}

impl FieldDirectory for StaticDirectory {
    fn find_custom_field_by_id(&self, field_id: &str) -> Option<CustomField> {
        self.custom_fields.get(field_id).cloned()
    }
}
