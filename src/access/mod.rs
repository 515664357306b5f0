pub mod evaluator;
pub mod subject_resolver;

pub use evaluator::{Access, AccessEvaluator};
pub use subject_resolver::{ResolvedSubject, SubjectResolver};
