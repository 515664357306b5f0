use crate::calendar::{Permission, Subject};
use crate::directory::{Group, User, UserDirectory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSubject {
    User(User),
    Group(Group),
    ProjectRole { project_id: i64, role_id: i64 },
}

pub struct SubjectResolver<'a> {
    users: &'a dyn UserDirectory,
}

impl<'a> SubjectResolver<'a> {
    pub fn new(users: &'a dyn UserDirectory) -> Self {
        Self { users }
    }

    pub fn resolve(&self, permission: &Permission) -> Option<ResolvedSubject> {
        match permission.subject()? {
            Subject::User { key } => self.users.find_user_by_key(&key).map(ResolvedSubject::User),
            Subject::Group { name } => self
                .users
                .find_group_by_name(&name)
                .map(ResolvedSubject::Group),
            Subject::ProjectRole {
                project_id,
                role_id,
            } => Some(ResolvedSubject::ProjectRole {
                project_id,
                role_id,
            }),
        }
    }
}
