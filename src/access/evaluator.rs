use crate::calendar::{Calendar, Permission};
use crate::directory::{ProjectDirectory, User, UserDirectory};

use super::subject_resolver::{ResolvedSubject, SubjectResolver};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    pub can_use: bool,
    pub can_admin: bool,
}

impl Access {
    pub fn has_any(&self) -> bool {
        self.can_use || self.can_admin
    }
}

pub struct AccessEvaluator<'a> {
    users: &'a dyn UserDirectory,
    projects: &'a dyn ProjectDirectory,
}

impl<'a> AccessEvaluator<'a> {
    pub fn new(users: &'a dyn UserDirectory, projects: &'a dyn ProjectDirectory) -> Self {
        Self { users, projects }
    }

    pub fn evaluate(&self, calendar: &Calendar, user: &User) -> Access {
        self.evaluate_grants(&calendar.permissions, user)
    }

    pub fn evaluate_grants(&self, permissions: &[Permission], user: &User) -> Access {
        let mut can_admin = false;
        let mut can_use = false;
        for permission in permissions {
            if !(permission.admin || permission.use_) {
                continue;
            }
            if !self.subject_matches(permission, user) {
                continue;
            }
            can_admin |= permission.admin;
            can_use |= permission.use_;
        }
        Access {
            can_use: can_use || can_admin,
            can_admin,
        }
    }

    pub fn has_admin_permission(&self, calendar: &Calendar, user: &User) -> bool {
        self.evaluate(calendar, user).can_admin
    }

    fn subject_matches(&self, permission: &Permission, user: &User) -> bool {
        let resolver = SubjectResolver::new(self.users);
        match resolver.resolve(permission) {
            Some(ResolvedSubject::User(subject)) => subject.key == user.key,
            Some(ResolvedSubject::Group(group)) => self.users.is_user_in_group(user, &group),
            Some(ResolvedSubject::ProjectRole {
                project_id,
                role_id,
            }) => self.projects.has_project_role(user, role_id, project_id),
            None => {
                tracing::debug!(
                    "Skipping unresolvable {} grant '{}'",
                    permission.subject_type,
                    permission.subject
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SubjectType;
    use crate::directory::{MockProjectDirectory, StaticDirectory};
    use proptest::prelude::*;

    fn grant(subject_type: SubjectType, subject: &str, admin: bool, use_: bool) -> Permission {
        Permission {
            subject_type,
            subject: subject.to_string(),
            admin,
            use_,
        }
    }

    fn test_directory() -> StaticDirectory {
        StaticDirectory::new()
            .with_user("alice", &["developers"])
            .with_user("bob", &[])
            .with_group("managers")
            .with_project(10000, "CAL", "Calendar", &["alice", "bob"])
            .with_role(10000, 10002, "Developers", &["bob"])
    }

    fn user(directory: &StaticDirectory, key: &str) -> User {
        directory.find_user_by_key(key).unwrap()
    }

    #[test]
    fn calendar_without_matching_grants_yields_no_access() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let grants = vec![grant(SubjectType::User, "bob", true, true)];

        let access = evaluator.evaluate_grants(&grants, &user(&directory, "alice"));

        assert_eq!(access, Access::default());
        assert!(!access.has_any());
    }

    #[test]
    fn user_grant_matches_only_exact_key() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let grants = vec![grant(SubjectType::User, "alice", false, true)];

        assert!(evaluator.evaluate_grants(&grants, &user(&directory, "alice")).can_use);
        assert!(!evaluator.evaluate_grants(&grants, &user(&directory, "bob")).can_use);
    }

    #[test]
    fn admin_grant_implies_use() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let grants = vec![grant(SubjectType::User, "alice", true, false)];

        let access = evaluator.evaluate_grants(&grants, &user(&directory, "alice"));

        assert!(access.can_admin);
        assert!(access.can_use);
    }

    #[test]
    fn group_grant_matches_members_only() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let grants = vec![grant(SubjectType::Group, "developers", false, true)];

        assert!(evaluator.evaluate_grants(&grants, &user(&directory, "alice")).can_use);
        assert!(!evaluator.evaluate_grants(&grants, &user(&directory, "bob")).can_use);
    }

    #[test]
    fn project_role_grant_delegates_to_role_check() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let grants = vec![grant(SubjectType::ProjectRole, "10000:10002", true, true)];

        assert!(evaluator.evaluate_grants(&grants, &user(&directory, "bob")).can_admin);
        assert!(!evaluator.evaluate_grants(&grants, &user(&directory, "alice")).can_admin);
    }

    #[test]
    fn malformed_project_role_never_reaches_role_check() {
        let directory = test_directory();
        let mut projects = MockProjectDirectory::new();
        projects.expect_has_project_role().never();
        let evaluator = AccessEvaluator::new(&directory, &projects);
        let grants = vec![
            grant(SubjectType::ProjectRole, "10000", true, true),
            grant(SubjectType::ProjectRole, "x:y", true, true),
        ];

        let access = evaluator.evaluate_grants(&grants, &user(&directory, "bob"));

        assert_eq!(access, Access::default());
    }

    #[test]
    fn rights_are_ored_across_overlapping_grants() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let grants = vec![
            grant(SubjectType::User, "alice", false, true),
            grant(SubjectType::Group, "developers", true, false),
            grant(SubjectType::Group, "managers", true, true),
        ];

        let access = evaluator.evaluate_grants(&grants, &user(&directory, "alice"));

        assert!(access.can_admin);
        assert!(access.can_use);
    }

    #[test]
    fn grant_for_deleted_user_is_ignored() {
        let directory = test_directory();
        let evaluator = AccessEvaluator::new(&directory, &directory);
        let alice = user(&directory, "alice");
        let pruned = directory.clone().without_user("alice");
        let evaluator_after_delete = AccessEvaluator::new(&pruned, &pruned);
        let grants = vec![grant(SubjectType::User, "alice", true, true)];

        assert!(evaluator.evaluate_grants(&grants, &alice).can_admin);
        assert!(!evaluator_after_delete.evaluate_grants(&grants, &alice).can_admin);
    }

    fn arb_grant() -> impl Strategy<Value = Permission> {
        let subjects = prop_oneof![
            Just((SubjectType::User, "alice")),
            Just((SubjectType::User, "bob")),
            Just((SubjectType::User, "ghost")),
            Just((SubjectType::Group, "developers")),
            Just((SubjectType::Group, "managers")),
            Just((SubjectType::ProjectRole, "10000:10002")),
            Just((SubjectType::ProjectRole, "10000:")),
        ];
        (subjects, any::<bool>(), any::<bool>())
            .prop_map(|((subject_type, subject), admin, use_)| grant(subject_type, subject, admin, use_))
    }

    fn arb_grants_and_permutation() -> impl Strategy<Value = (Vec<Permission>, Vec<Permission>)> {
        prop::collection::vec(arb_grant(), 0..10)
            .prop_flat_map(|grants| (Just(grants.clone()), Just(grants).prop_shuffle()))
    }

    proptest! {
        #[test]
        fn access_is_invariant_under_grant_reordering(
            (grants, shuffled) in arb_grants_and_permutation(),
            requester in prop_oneof![Just("alice"), Just("bob")],
        ) {
            let directory = test_directory();
            let evaluator = AccessEvaluator::new(&directory, &directory);
            let user = user(&directory, requester);

            prop_assert_eq!(
                evaluator.evaluate_grants(&grants, &user),
                evaluator.evaluate_grants(&shuffled, &user)
            );
        }

        #[test]
        fn admin_always_implies_use(
            (grants, _shuffled) in arb_grants_and_permutation(),
            requester in prop_oneof![Just("alice"), Just("bob")],
        ) {
            let directory = test_directory();
            let evaluator = AccessEvaluator::new(&directory, &directory);
            let access = evaluator.evaluate_grants(&grants, &user(&directory, requester));

            prop_assert!(!access.can_admin || access.can_use);
        }
    }
}
