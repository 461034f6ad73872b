//! Route table: built once, then resolved concurrently without locks.

use crate::error::{RouteError, RouteNotFound};
use crate::routing::pattern::{normalize_method, split_path, RoutePattern};
use std::collections::HashMap;

/// Collects routes during module initialization.
pub struct RouteTableBuilder<H> {
    exact: HashMap<(String, String), usize>,
    parameterized: Vec<usize>,
    routes: Vec<(RoutePattern, H)>,
}

impl<H> Default for RouteTableBuilder<H> {
    fn default() -> Self {
        RouteTableBuilder {
            exact: HashMap::new(),
            parameterized: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl<H> RouteTableBuilder<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: &str, template: &str, handler: H) -> Result<Self, RouteError> {
        let pattern = RoutePattern::parse(method, template)?;
        if self.routes.iter().any(|(p, _)| *p == pattern) {
            return Err(RouteError::Duplicate {
                method: pattern.method().to_string(),
                template: template.to_string(),
            });
        }
        let idx = self.routes.len();
        if pattern.is_exact() {
            self.exact
                .insert((pattern.method().to_string(), pattern.literal_path()), idx);
        } else {
            self.parameterized.push(idx);
        }
        self.routes.push((pattern, handler));
        Ok(self)
    }

    pub fn build(self) -> RouteTable<H> {
        RouteTable {
            exact: self.exact,
            parameterized: self.parameterized,
            routes: self.routes,
        }
    }
}

/// Immutable method+path -> handler table.
pub struct RouteTable<H> {
    exact: HashMap<(String, String), usize>,
    /// Indexes into `routes`, in registration order.
    parameterized: Vec<usize>,
    routes: Vec<(RoutePattern, H)>,
}

impl<H> RouteTable<H> {
    pub fn builder() -> RouteTableBuilder<H> {
        RouteTableBuilder::new()
    }

    /// Exact match first; otherwise the matching parameterized pattern with the
    /// fewest parameters, earliest registration breaking ties.
    pub fn resolve(&self, method: &str, path: &str) -> Result<&H, RouteNotFound> {
        let method = normalize_method(method);
        let literal = path.strip_prefix('/').unwrap_or(path);
        if let Some(&idx) = self.exact.get(&(method.clone(), literal.to_string())) {
            return Ok(&self.routes[idx].1);
        }

        let segments = split_path(path);
        let best = self
            .parameterized
            .iter()
            .map(|&idx| &self.routes[idx])
            .filter(|(pattern, _)| pattern.matches(&method, &segments))
            .enumerate()
            .min_by_key(|(order, (pattern, _))| (pattern.param_count(), *order))
            .map(|(_, (_, handler))| handler);
        match best {
            Some(handler) => Ok(handler),
            None => Err(RouteNotFound {
                method,
                path: path.to_string(),
            }),
        }
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter().map(|(p, _)| p)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn table(routes: &[(&str, &str, &'static str)]) -> RouteTable<&'static str> {
        routes
            .iter()
            .try_fold(RouteTable::builder(), |b, (m, t, h)| b.route(m, t, *h))
            .unwrap()
            .build()
    }

    #[test]
    fn exact_beats_parameter_in_either_order() {
        let param_first = table(&[
            ("GET", "/customers/{id}", "by_id"),
            ("GET", "/customers/active", "active"),
        ]);
        let literal_first = table(&[
            ("GET", "/customers/active", "active"),
            ("GET", "/customers/{id}", "by_id"),
        ]);
        for t in [&param_first, &literal_first] {
            assert_eq!(t.resolve("GET", "/customers/active"), Ok(&"active"));
            assert_eq!(t.resolve("GET", "/customers/42"), Ok(&"by_id"));
        }
    }

    #[test]
    fn fewer_parameters_win() {
        let t = table(&[("GET", "/a/{x}/{y}", "xy"), ("GET", "/a/{x}/c", "xc")]);
        assert_eq!(t.resolve("GET", "/a/1/c"), Ok(&"xc"));
        assert_eq!(t.resolve("GET", "/a/1/d"), Ok(&"xy"));
    }

    #[test]
    fn earliest_registration_breaks_ties() {
        let t = table(&[("GET", "/a/{x}/c", "first"), ("GET", "/a/b/{y}", "second")]);
        assert_eq!(t.resolve("GET", "/a/b/c"), Ok(&"first"));
        let t = table(&[("GET", "/a/b/{y}", "first"), ("GET", "/a/{x}/c", "second")]);
        assert_eq!(t.resolve("GET", "/a/b/c"), Ok(&"first"));
    }

    #[test]
    fn unknown_method_or_path_is_not_found() {
        let t = table(&[
            ("GET", "/customers/{id}", "get"),
            ("PUT", "/customers/{id}", "put"),
        ]);
        assert_eq!(
            t.resolve("PATCH", "/customers/1"),
            Err(RouteNotFound {
                method: "PATCH".into(),
                path: "/customers/1".into(),
            })
        );
        assert!(t.resolve("GET", "/customers").is_err());
        assert!(t.resolve("GET", "/customers/1/notes").is_err());
    }

    #[test]
    fn empty_segment_does_not_fill_a_parameter() {
        let t = table(&[("GET", "/customers/{id}", "get")]);
        assert_eq!(
            t.resolve("GET", "/customers/"),
            Err(RouteNotFound {
                method: "GET".into(),
                path: "/customers/".into(),
            })
        );
        assert!(t.resolve("GET", "//1").is_err());
    }

    #[test]
    fn method_is_case_insensitive_and_leading_slash_optional() {
        let t = table(&[("POST", "/support-tickets", "create"), ("DELETE", "/customers/{id}", "del")]);
        assert_eq!(t.resolve("post", "support-tickets"), Ok(&"create"));
        assert_eq!(t.resolve("Delete", "customers/9"), Ok(&"del"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = RouteTable::builder()
            .route("GET", "/customers/{id}", 1)
            .unwrap()
            .route("get", "/customers/{id}", 2)
            .err()
            .unwrap();
        assert_eq!(
            err,
            RouteError::Duplicate {
                method: "GET".into(),
                template: "/customers/{id}".into(),
            }
        );
        // same shape under a different parameter name is a distinct pattern
        assert!(RouteTable::builder()
            .route("GET", "/customers/{id}", 1)
            .unwrap()
            .route("GET", "/customers/{key}", 2)
            .is_ok());
    }

    #[test]
    fn routes_listed_in_registration_order() {
        let t = table(&[("GET", "/customers", "list"), ("GET", "/customers/{id}", "get")]);
        let listed: Vec<String> = t.routes().map(ToString::to_string).collect();
        assert_eq!(listed, vec!["GET /customers", "GET /customers/{id}"]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn concurrent_resolution_shares_the_table() {
        let t = Arc::new(table(&[
            ("GET", "/customers", "list"),
            ("GET", "/customers/{id}", "get"),
        ]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let t = Arc::clone(&t);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        assert_eq!(t.resolve("GET", &format!("/customers/{}", i * 100 + n)), Ok(&"get"));
                        assert_eq!(t.resolve("GET", "/customers"), Ok(&"list"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
