use std::fmt;

use futures::future::LocalBoxFuture;

use crate::asserter::CaseError;
use crate::asserter::Checks;
use crate::client::ApiClient;

pub mod fixtures;
pub mod posts;

pub type CaseFn =
    for<'a> fn(&'a ApiClient, &'a mut Checks) -> LocalBoxFuture<'a, Result<(), CaseError>>;

/// One independent scenario. The metadata is what the reports show.
#[derive(Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: &'static str,
    pub checks: &'static str,
    pub run: CaseFn,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// The registered cases, in the order they run.
#[derive(Debug, Clone)]
pub struct Suite {
    name: &'static str,
    cases: Vec<TestCase>,
}

impl Suite {
    pub fn new(name: &'static str, cases: Vec<TestCase>) -> Self {
        Self { name, cases }
    }

    pub fn posts() -> Self {
        Self::new("posts", posts::cases())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.cases.iter().map(|case| case.name).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cases.iter().any(|case| case.name == name)
    }

    /// Keeps the named cases, in registration order. No names keeps all.
    pub fn select(&self, only: &[String]) -> Suite {
        if only.is_empty() {
            return self.clone();
        }

        Suite {
            name: self.name,
            cases: self
                .cases
                .iter()
                .filter(|case| only.iter().any(|name| name == case.name))
                .copied()
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn registers_every_posts_case_once() {
        let suite = Suite::posts();
        let names = suite.names();
        let unique: HashSet<_> = names.iter().collect();

        assert_eq!(suite.len(), 13);
        assert_eq!(unique.len(), names.len());
        assert_eq!(names[0], "get_all_posts");
        assert_eq!(names[12], "filter_posts_by_user_id");
    }

    #[test]
    fn select_keeps_registration_order() {
        let suite = Suite::posts();
        let only = vec!["delete_post".to_string(), "get_all_posts".to_string()];

        let selected = suite.select(&only);

        assert_eq!(selected.names(), vec!["get_all_posts", "delete_post"]);
        assert_eq!(selected.name(), "posts");
    }

    #[test]
    fn select_nothing_keeps_everything() {
        let suite = Suite::posts();

        assert_eq!(suite.select(&[]).len(), suite.len());
        assert!(suite.contains("partial_update_empty_data"));
        assert!(!suite.contains("test_partial_update_empty_data"));
    }
}
